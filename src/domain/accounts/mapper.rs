use super::dto::{AccountsDto, CustomerDto};
use super::entities::{Account, Audit, Customer, NewCustomer};

// ============================================================================
// Entity <-> DTO field copy
// ============================================================================

impl From<&Customer> for CustomerDto {
    fn from(customer: &Customer) -> Self {
        Self {
            name: customer.name.clone(),
            email: customer.email.clone(),
            mobile_number: customer.mobile_number.clone(),
            accounts_dto: None,
        }
    }
}

impl From<&Account> for AccountsDto {
    fn from(account: &Account) -> Self {
        Self {
            account_number: account.account_number,
            account_type: account.account_type.clone(),
            branch_address: account.branch_address.clone(),
        }
    }
}

impl NewCustomer {
    pub fn from_dto(dto: &CustomerDto, audit: Audit) -> Self {
        Self {
            name: dto.name.clone(),
            email: dto.email.clone(),
            mobile_number: dto.mobile_number.clone(),
            audit,
        }
    }
}

impl Customer {
    /// Overwrite the mutable customer fields from a dto
    pub fn apply_dto(&mut self, dto: &CustomerDto) {
        self.name = dto.name.clone();
        self.email = dto.email.clone();
        self.mobile_number = dto.mobile_number.clone();
    }
}

impl Account {
    /// Overwrite the mutable account fields; the account number is the key
    /// and never changes
    pub fn apply_dto(&mut self, dto: &AccountsDto) {
        self.account_type = dto.account_type.clone();
        self.branch_address = dto.branch_address.clone();
    }
}

impl CustomerDto {
    pub fn with_account(mut self, account: &Account) -> Self {
        self.accounts_dto = Some(AccountsDto::from(account));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> Customer {
        Customer {
            customer_id: 7,
            name: "Madan Reddy".to_string(),
            email: "madan@example.com".to_string(),
            mobile_number: "4354437687".to_string(),
            audit: Audit::created("ACCOUNTS_MS"),
        }
    }

    fn account() -> Account {
        Account {
            account_number: 1_234_567_890,
            customer_id: 7,
            account_type: "SAVINGS".to_string(),
            branch_address: "123 Main Street, New York".to_string(),
            audit: Audit::created("ACCOUNTS_MS"),
        }
    }

    #[test]
    fn test_customer_to_dto_with_account() {
        let dto = CustomerDto::from(&customer()).with_account(&account());

        assert_eq!(dto.name, "Madan Reddy");
        assert_eq!(dto.mobile_number, "4354437687");
        let accounts_dto = dto.accounts_dto.unwrap();
        assert_eq!(accounts_dto.account_number, 1_234_567_890);
        assert_eq!(accounts_dto.account_type, "SAVINGS");
    }

    #[test]
    fn test_apply_dto_keeps_identity() {
        let mut customer = customer();
        customer.apply_dto(&CustomerDto {
            name: "Madan Kumar".to_string(),
            email: "kumar@example.com".to_string(),
            mobile_number: "9999999999".to_string(),
            accounts_dto: None,
        });
        assert_eq!(customer.customer_id, 7);
        assert_eq!(customer.name, "Madan Kumar");
        assert_eq!(customer.mobile_number, "9999999999");

        let mut account = account();
        account.apply_dto(&AccountsDto {
            account_number: 1_999_999_999,
            account_type: "Current".to_string(),
            branch_address: "1 Harbour Road".to_string(),
        });
        assert_eq!(account.account_number, 1_234_567_890);
        assert_eq!(account.customer_id, 7);
        assert_eq!(account.account_type, "Current");
        assert_eq!(account.branch_address, "1 Harbour Road");
    }
}
