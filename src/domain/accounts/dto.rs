use serde::{Deserialize, Serialize};

// ============================================================================
// Transfer Objects
// ============================================================================
//
// Request/response shapes. Missing JSON fields default to empty values so
// that absent input is reported by validation, not by the JSON parser.
//
// ============================================================================

/// Customer details, optionally carrying the customer's account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts_dto: Option<AccountsDto>,
}

/// Account details; `account_number` of 0 means "not supplied"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsDto {
    #[serde(default)]
    pub account_number: i64,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub branch_address: String,
}
