use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::dto::{AccountsDto, CustomerDto};
use super::value_objects::is_ten_digit_number;

// ============================================================================
// Field Validation
// ============================================================================
//
// Each rule reports against the JSON field name. Only the first violation
// per field is kept, so a field yields at most one message.
//
// ============================================================================

pub const NAME_MIN_LENGTH: usize = 5;
pub const NAME_MAX_LENGTH: usize = 30;

// Column widths in the schema
pub const EMAIL_MAX_LENGTH: usize = 100;
pub const ACCOUNT_TYPE_MAX_LENGTH: usize = 100;
pub const BRANCH_ADDRESS_MAX_LENGTH: usize = 200;

pub const MSG_NAME_EMPTY: &str = "Name can not be a null or empty";
pub const MSG_NAME_LENGTH: &str = "The length of the customer name should be between 5 and 30";
pub const MSG_EMAIL_EMPTY: &str = "Email address can not be a null or empty";
pub const MSG_EMAIL_INVALID: &str = "Email address should be a valid value";
pub const MSG_EMAIL_LENGTH: &str = "Email address can not be longer than 100 characters";
pub const MSG_MOBILE_NUMBER: &str = "Mobile number must be 10 digits";
pub const MSG_ACCOUNT_NUMBER_EMPTY: &str = "AccountNumber can not be a null or empty";
pub const MSG_ACCOUNT_NUMBER_DIGITS: &str = "AccountNumber must be 10 digits";
pub const MSG_ACCOUNT_TYPE_EMPTY: &str = "AccountType can not be a null or empty";
pub const MSG_ACCOUNT_TYPE_LENGTH: &str = "AccountType can not be longer than 100 characters";
pub const MSG_BRANCH_ADDRESS_EMPTY: &str = "BranchAddress can not be a null or empty";
pub const MSG_BRANCH_ADDRESS_LENGTH: &str = "BranchAddress can not be longer than 200 characters";

/// Field name -> violation message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation unless the field already has one
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

impl Validate for CustomerDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name_length = self.name.chars().count();
        if self.name.trim().is_empty() {
            errors.add("name", MSG_NAME_EMPTY);
        } else if !(NAME_MIN_LENGTH..=NAME_MAX_LENGTH).contains(&name_length) {
            errors.add("name", MSG_NAME_LENGTH);
        }

        if self.email.trim().is_empty() {
            errors.add("email", MSG_EMAIL_EMPTY);
        } else if self.email.chars().count() > EMAIL_MAX_LENGTH {
            errors.add("email", MSG_EMAIL_LENGTH);
        } else if !is_valid_email(&self.email) {
            errors.add("email", MSG_EMAIL_INVALID);
        }

        check_mobile_number("mobileNumber", &self.mobile_number, &mut errors);

        if let Some(accounts_dto) = &self.accounts_dto {
            accounts_dto.check("accountsDto.", &mut errors);
        }

        errors.into_result()
    }
}

impl Validate for AccountsDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.check("", &mut errors);
        errors.into_result()
    }
}

impl AccountsDto {
    fn check(&self, prefix: &str, errors: &mut ValidationErrors) {
        if self.account_number == 0 {
            errors.add(format!("{prefix}accountNumber"), MSG_ACCOUNT_NUMBER_EMPTY);
        } else if !is_ten_digit_number(self.account_number) {
            errors.add(format!("{prefix}accountNumber"), MSG_ACCOUNT_NUMBER_DIGITS);
        }

        if self.account_type.trim().is_empty() {
            errors.add(format!("{prefix}accountType"), MSG_ACCOUNT_TYPE_EMPTY);
        } else if self.account_type.chars().count() > ACCOUNT_TYPE_MAX_LENGTH {
            errors.add(format!("{prefix}accountType"), MSG_ACCOUNT_TYPE_LENGTH);
        }

        if self.branch_address.trim().is_empty() {
            errors.add(format!("{prefix}branchAddress"), MSG_BRANCH_ADDRESS_EMPTY);
        } else if self.branch_address.chars().count() > BRANCH_ADDRESS_MAX_LENGTH {
            errors.add(format!("{prefix}branchAddress"), MSG_BRANCH_ADDRESS_LENGTH);
        }
    }
}

/// Validate a mobile number supplied outside a dto (query strings)
pub fn validate_mobile_number(field: &str, value: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_mobile_number(field, value, &mut errors);
    errors.into_result()
}

fn check_mobile_number(field: &str, value: &str, errors: &mut ValidationErrors) {
    if value.len() != 10 || !value.bytes().all(|b| b.is_ascii_digit()) {
        errors.add(field, MSG_MOBILE_NUMBER);
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };

    !local.is_empty()
        && !local.contains('@')
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

// ============================================================================
// Unit Tests
// ============================================================================
