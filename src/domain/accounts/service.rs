use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AccountsConfig;
use crate::metrics::Metrics;
use crate::store::{Repository, ACCOUNTS_PKEY, CUSTOMER_MOBILE_NUMBER_KEY};

use super::dto::CustomerDto;
use super::entities::{Account, Audit, Customer, NewCustomer};
use super::errors::{AccountsError, FailureKind};
use super::value_objects::{AccountNumberSource, RandomAccountNumbers, SAVINGS};

// ============================================================================
// Accounts Service
// ============================================================================
//
// Orchestrates: DTO -> entities -> one unit of work -> commit
//
// Every operation runs inside a single transaction; an early return drops
// the unit of work and rolls back whatever it wrote.
//
// ============================================================================

pub struct AccountsService {
    repository: Arc<dyn Repository>,
    account_numbers: Arc<dyn AccountNumberSource>,
    settings: AccountsConfig,
    metrics: Arc<Metrics>,
}

impl AccountsService {
    pub fn new(repository: Arc<dyn Repository>, settings: AccountsConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            repository,
            account_numbers: Arc::new(RandomAccountNumbers),
            settings,
            metrics,
        }
    }

    pub fn with_account_numbers(mut self, account_numbers: Arc<dyn AccountNumberSource>) -> Self {
        self.account_numbers = account_numbers;
        self
    }

    /// Register a customer and open their savings account
    pub async fn create_account(&self, customer_dto: &CustomerDto) -> Result<(), AccountsError> {
        self.observe("create", self.create(customer_dto)).await
    }

    /// Customer plus account for a mobile number
    pub async fn fetch_account(&self, mobile_number: &str) -> Result<CustomerDto, AccountsError> {
        self.observe("fetch", self.fetch(mobile_number)).await
    }

    /// Overwrite account and customer fields, keyed by the account number.
    /// Returns false, touching nothing, when the dto carries no account.
    pub async fn update_account(&self, customer_dto: &CustomerDto) -> Result<bool, AccountsError> {
        self.observe("update", self.update(customer_dto)).await
    }

    /// Remove the customer and every account referencing them
    pub async fn delete_account(&self, mobile_number: &str) -> Result<bool, AccountsError> {
        self.observe("delete", self.delete(mobile_number)).await
    }

    async fn create(&self, customer_dto: &CustomerDto) -> Result<(), AccountsError> {
        let mut uow = self.repository.begin().await?;

        let new_customer = NewCustomer::from_dto(customer_dto, Audit::created(&self.settings.audit_actor));
        let customer = uow.insert_customer(new_customer).await.map_err(|e| {
            if e.is_unique_violation_of(CUSTOMER_MOBILE_NUMBER_KEY) {
                AccountsError::CustomerAlreadyExists(customer_dto.mobile_number.clone())
            } else {
                AccountsError::from(e)
            }
        })?;

        let account = self.new_account(&customer);
        uow.insert_account(&account).await.map_err(|e| {
            if e.is_unique_violation_of(ACCOUNTS_PKEY) {
                AccountsError::AccountNumberCollision(account.account_number)
            } else {
                AccountsError::from(e)
            }
        })?;

        uow.commit().await?;

        tracing::info!(
            customer_id = customer.customer_id,
            account_number = account.account_number,
            mobile_number = %customer.mobile_number,
            "Opened account"
        );

        Ok(())
    }

    async fn fetch(&self, mobile_number: &str) -> Result<CustomerDto, AccountsError> {
        let mut uow = self.repository.begin().await?;

        let customer = uow
            .find_customer_by_mobile_number(mobile_number)
            .await?
            .ok_or_else(|| AccountsError::not_found("Customer", "Mobile Number", mobile_number))?;

        let account = uow
            .find_account_by_customer_id(customer.customer_id)
            .await?
            .ok_or_else(|| AccountsError::not_found("Account", "Customer Id", customer.customer_id))?;

        tracing::debug!(
            customer_id = customer.customer_id,
            account_number = account.account_number,
            "Fetched account"
        );

        Ok(CustomerDto::from(&customer).with_account(&account))
    }

    async fn update(&self, customer_dto: &CustomerDto) -> Result<bool, AccountsError> {
        let Some(accounts_dto) = &customer_dto.accounts_dto else {
            tracing::debug!(mobile_number = %customer_dto.mobile_number, "Update without account details, skipping");
            return Ok(false);
        };

        let actor = &self.settings.audit_actor;
        let mut uow = self.repository.begin().await?;

        let mut account = uow
            .find_account_by_number(accounts_dto.account_number)
            .await?
            .ok_or_else(|| AccountsError::not_found("Account", "AccountNumber", accounts_dto.account_number))?;
        account.apply_dto(accounts_dto);
        account.audit.touch(actor);
        let account = uow.update_account(&account).await?;

        let customer_id = account.customer_id;
        let mut customer = uow
            .find_customer_by_id(customer_id)
            .await?
            .ok_or_else(|| AccountsError::not_found("Customer", "CustomerID", customer_id))?;
        customer.apply_dto(customer_dto);
        customer.audit.touch(actor);
        uow.update_customer(&customer).await.map_err(|e| {
            if e.is_unique_violation_of(CUSTOMER_MOBILE_NUMBER_KEY) {
                AccountsError::CustomerAlreadyExists(customer_dto.mobile_number.clone())
            } else {
                AccountsError::from(e)
            }
        })?;

        uow.commit().await?;

        tracing::info!(
            customer_id,
            account_number = account.account_number,
            "Updated account and customer"
        );

        Ok(true)
    }

    async fn delete(&self, mobile_number: &str) -> Result<bool, AccountsError> {
        let mut uow = self.repository.begin().await?;

        let customer = uow
            .find_customer_by_mobile_number(mobile_number)
            .await?
            .ok_or_else(|| AccountsError::not_found("Customer", "Mobile Number", mobile_number))?;

        let removed_accounts = uow.delete_accounts_by_customer_id(customer.customer_id).await?;
        uow.delete_customer_by_id(customer.customer_id).await?;
        uow.commit().await?;

        tracing::info!(
            customer_id = customer.customer_id,
            removed_accounts,
            "Deleted customer and accounts"
        );

        Ok(true)
    }

    fn new_account(&self, customer: &Customer) -> Account {
        Account {
            account_number: self.account_numbers.next_account_number(),
            customer_id: customer.customer_id,
            account_type: SAVINGS.to_string(),
            branch_address: self.settings.branch_address.clone(),
            audit: Audit::created(&self.settings.audit_actor),
        }
    }

    /// Time an operation and count its outcome
    async fn observe<T>(
        &self,
        operation: &'static str,
        work: impl Future<Output = Result<T, AccountsError>>,
    ) -> Result<T, AccountsError> {
        let started = Instant::now();
        let result = work.await;
        let elapsed = started.elapsed().as_secs_f64();

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind().label(),
        };
        self.metrics.record_operation(operation, outcome, elapsed);

        if let Err(e) = &result {
            match e.kind() {
                FailureKind::Unclassified => tracing::error!(operation, error = %e, "Operation failed"),
                _ => tracing::warn!(operation, error = %e, "Operation rejected"),
            }
        }

        result
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::accounts::{AccountsDto, FailureKind, ACCOUNT_NUMBER_MIN, ACCOUNT_NUMBER_SPAN};
    use crate::store::InMemoryRepository;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Hands out the same number every time
    struct FixedAccountNumbers(i64);

    impl AccountNumberSource for FixedAccountNumbers {
        fn next_account_number(&self) -> i64 {
            self.0
        }
    }

    /// Hands out consecutive numbers starting at the given value
    struct SequentialAccountNumbers(AtomicI64);

    impl AccountNumberSource for SequentialAccountNumbers {
        fn next_account_number(&self) -> i64 {
            self.0.fetch_add(1, Ordering::SeqCst)
        }
    }

    fn create_service() -> (AccountsService, InMemoryRepository, Arc<Metrics>) {
        let repository = InMemoryRepository::new();
        let metrics = Arc::new(Metrics::new().unwrap());
        let service = AccountsService::new(Arc::new(repository.clone()), AccountsConfig::default(), metrics.clone());
        (service, repository, metrics)
    }

    fn create_customer_dto(mobile_number: &str) -> CustomerDto {
        CustomerDto {
            name: "Madan Reddy".to_string(),
            email: "madan@example.com".to_string(),
            mobile_number: mobile_number.to_string(),
            accounts_dto: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_fetch() {
        let (service, _, _) = create_service();
        let input = create_customer_dto("4354437687");

        service.create_account(&input).await.unwrap();
        let fetched = service.fetch_account("4354437687").await.unwrap();

        assert_eq!(fetched.name, input.name);
        assert_eq!(fetched.email, input.email);
        assert_eq!(fetched.mobile_number, input.mobile_number);

        let account = fetched.accounts_dto.unwrap();
        assert!(account.account_number >= ACCOUNT_NUMBER_MIN);
        assert!(account.account_number < ACCOUNT_NUMBER_MIN + ACCOUNT_NUMBER_SPAN);
        assert_eq!(account.account_type, SAVINGS);
        assert_eq!(account.branch_address, "123 Main Street, New York");
    }

    #[tokio::test]
    async fn test_create_uses_configured_branch_address() {
        let repository = InMemoryRepository::new();
        let settings = AccountsConfig {
            branch_address: "1 Harbour Road".to_string(),
            ..AccountsConfig::default()
        };
        let service = AccountsService::new(Arc::new(repository), settings, Arc::new(Metrics::new().unwrap()));

        service.create_account(&create_customer_dto("4354437687")).await.unwrap();
        let fetched = service.fetch_account("4354437687").await.unwrap();

        assert_eq!(fetched.accounts_dto.unwrap().branch_address, "1 Harbour Road");
    }

    #[tokio::test]
    async fn test_create_twice_fails_with_already_exists() {
        let (service, repository, metrics) = create_service();

        service.create_account(&create_customer_dto("4354437687")).await.unwrap();
        let before = service.fetch_account("4354437687").await.unwrap();

        let mut second = create_customer_dto("4354437687");
        second.name = "Someone Else".to_string();
        let err = service.create_account(&second).await.unwrap_err();

        assert!(matches!(err, AccountsError::CustomerAlreadyExists(_)));
        assert!(err.to_string().contains("4354437687"));
        assert_eq!(repository.row_counts().await, (1, 1));
        assert_eq!(service.fetch_account("4354437687").await.unwrap(), before);
        assert_eq!(
            metrics.operations_total.with_label_values(&["create", "already_exists"]).get(),
            1
        );
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_creates_have_one_winner() {
        let (service, repository, _) = create_service();
        let service = service.with_account_numbers(Arc::new(SequentialAccountNumbers(AtomicI64::new(1_500_000_000))));
        let input = create_customer_dto("4354437687");

        let (first, second) = tokio::join!(service.create_account(&input), service.create_account(&input));

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(AccountsError::CustomerAlreadyExists(m)) if m == "4354437687"))
                .count(),
            1
        );
        assert_eq!(repository.row_counts().await, (1, 1));
    }

    #[tokio::test]
    async fn test_account_number_collision_rolls_back_customer() {
        let (service, repository, _) = create_service();
        let service = service.with_account_numbers(Arc::new(FixedAccountNumbers(1_234_567_890)));

        service.create_account(&create_customer_dto("1111111111")).await.unwrap();
        let err = service.create_account(&create_customer_dto("2222222222")).await.unwrap_err();

        assert!(matches!(err, AccountsError::AccountNumberCollision(1_234_567_890)));
        assert_eq!(err.kind(), FailureKind::Unclassified);
        assert_eq!(repository.row_counts().await, (1, 1));

        let missing = service.fetch_account("2222222222").await.unwrap_err();
        assert_eq!(missing.kind(), FailureKind::NotFound);
    }

    #[tokio::test]
    async fn test_fetch_unknown_mobile_number() {
        let (service, _, _) = create_service();

        let err = service.fetch_account("9999999999").await.unwrap_err();

        match &err {
            AccountsError::ResourceNotFound { resource, field, value } => {
                assert_eq!(*resource, "Customer");
                assert_eq!(*field, "Mobile Number");
                assert_eq!(value, "9999999999");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_customer_without_account() {
        let (service, repository, _) = create_service();

        let mut uow = repository.begin().await.unwrap();
        let customer = uow
            .insert_customer(NewCustomer::from_dto(&create_customer_dto("4354437687"), Audit::created("TEST")))
            .await
            .unwrap();
        uow.commit().await.unwrap();

        let err = service.fetch_account("4354437687").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Account not found with the given input data Customer Id : '{}'", customer.customer_id)
        );
    }

    #[tokio::test]
    async fn test_update_without_account_is_noop() {
        let (service, _, _) = create_service();
        service.create_account(&create_customer_dto("4354437687")).await.unwrap();
        let before = service.fetch_account("4354437687").await.unwrap();

        let mut change = create_customer_dto("4354437687");
        change.name = "Changed Name".to_string();
        let updated = service.update_account(&change).await.unwrap();

        assert!(!updated);
        assert_eq!(service.fetch_account("4354437687").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_changes_account_and_customer() {
        let (service, _, _) = create_service();
        service.create_account(&create_customer_dto("4354437687")).await.unwrap();
        let current = service.fetch_account("4354437687").await.unwrap();
        let account_number = current.accounts_dto.as_ref().unwrap().account_number;

        let change = CustomerDto {
            name: "Madan Kumar".to_string(),
            email: "kumar@example.com".to_string(),
            mobile_number: "5555555555".to_string(),
            accounts_dto: Some(AccountsDto {
                account_number,
                account_type: "Current".to_string(),
                branch_address: "1 Harbour Road".to_string(),
            }),
        };
        assert!(service.update_account(&change).await.unwrap());

        let fetched = service.fetch_account("5555555555").await.unwrap();
        assert_eq!(fetched, change);
        assert_eq!(
            service.fetch_account("4354437687").await.unwrap_err().kind(),
            FailureKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_update_stamps_audit_columns() {
        let (service, repository, _) = create_service();
        service.create_account(&create_customer_dto("4354437687")).await.unwrap();
        let account_number = service
            .fetch_account("4354437687")
            .await
            .unwrap()
            .accounts_dto
            .unwrap()
            .account_number;

        let mut change = create_customer_dto("4354437687");
        change.accounts_dto = Some(AccountsDto {
            account_number,
            account_type: "SAVINGS".to_string(),
            branch_address: "1 Harbour Road".to_string(),
        });
        service.update_account(&change).await.unwrap();

        let mut uow = repository.begin().await.unwrap();
        let account = uow.find_account_by_number(account_number).await.unwrap().unwrap();
        let customer = uow.find_customer_by_id(account.customer_id).await.unwrap().unwrap();

        assert_eq!(account.audit.created_by, "ACCOUNTS_MS");
        assert_eq!(account.audit.updated_by.as_deref(), Some("ACCOUNTS_MS"));
        assert!(account.audit.updated_at.is_some());
        assert_eq!(customer.audit.updated_by.as_deref(), Some("ACCOUNTS_MS"));
    }

    #[tokio::test]
    async fn test_update_unknown_account_number() {
        let (service, _, _) = create_service();

        let mut change = create_customer_dto("4354437687");
        change.accounts_dto = Some(AccountsDto {
            account_number: 1_234_567_890,
            account_type: "SAVINGS".to_string(),
            branch_address: "1 Harbour Road".to_string(),
        });

        let err = service.update_account(&change).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Account not found with the given input data AccountNumber : '1234567890'"
        );
    }

    #[tokio::test]
    async fn test_update_to_taken_mobile_number_rolls_back() {
        let (service, _, _) = create_service();
        let service = service.with_account_numbers(Arc::new(SequentialAccountNumbers(AtomicI64::new(1_500_000_000))));
        service.create_account(&create_customer_dto("1111111111")).await.unwrap();
        service.create_account(&create_customer_dto("2222222222")).await.unwrap();
        let before = service.fetch_account("2222222222").await.unwrap();

        let mut change = create_customer_dto("1111111111");
        change.accounts_dto = Some(AccountsDto {
            account_number: 1_500_000_001,
            account_type: "Current".to_string(),
            branch_address: "1 Harbour Road".to_string(),
        });
        let err = service.update_account(&change).await.unwrap_err();

        assert!(matches!(err, AccountsError::CustomerAlreadyExists(ref m) if m == "1111111111"));
        // The account half of the update was rolled back with the customer half
        assert_eq!(service.fetch_account("2222222222").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_delete_removes_customer_and_accounts() {
        let (service, repository, _) = create_service();
        service.create_account(&create_customer_dto("4354437687")).await.unwrap();
        service.create_account(&create_customer_dto("1111111111")).await.unwrap();

        assert!(service.delete_account("4354437687").await.unwrap());

        assert_eq!(repository.row_counts().await, (1, 1));
        let err = service.fetch_account("4354437687").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotFound);
        assert!(service.fetch_account("1111111111").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_unknown_mobile_number() {
        let (service, _, _) = create_service();

        let err = service.delete_account("4354437687").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Customer not found with the given input data Mobile Number : '4354437687'"
        );
    }

    #[tokio::test]
    async fn test_mobile_number_reusable_after_delete() {
        let (service, _, _) = create_service();
        service.create_account(&create_customer_dto("4354437687")).await.unwrap();
        service.delete_account("4354437687").await.unwrap();

        assert!(service.create_account(&create_customer_dto("4354437687")).await.is_ok());
    }
}
