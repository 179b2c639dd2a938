// ============================================================================
// Store - Customer and Account persistence
// ============================================================================
//
// The lifecycle service talks to storage through two traits:
// - Repository: opens units of work, answers health pings
// - UnitOfWork: one transaction; every customer/account query and write
//   runs on it, and nothing is visible until `commit`. Dropping an
//   uncommitted unit of work rolls it back.
//
// Implementations:
// - PostgresRepository: sqlx over a PgPool
// - InMemoryRepository: same constraint semantics, used by tests and local
//   runs with `database.url = "memory"`
//
// ============================================================================

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::domain::accounts::{Account, Customer, NewCustomer};

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// Unique constraint on customer.mobile_number
pub const CUSTOMER_MOBILE_NUMBER_KEY: &str = "customer_mobile_number_key";

/// Primary key on accounts.account_number
pub const ACCOUNTS_PKEY: &str = "accounts_pkey";

/// Foreign key accounts.customer_id -> customer.customer_id
pub const ACCOUNTS_CUSTOMER_ID_FKEY: &str = "accounts_customer_id_fkey";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    #[error("No {table} row with key {key}")]
    MissingRow { table: &'static str, key: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn is_unique_violation_of(&self, name: &str) -> bool {
        matches!(self, StoreError::UniqueViolation { constraint } if constraint == name)
    }
}

#[async_trait]
pub trait Repository: Send + Sync {
    /// Start a transaction
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;

    /// Cheap round-trip used by the health endpoint
    async fn ping(&self) -> Result<(), StoreError>;

    fn backend(&self) -> &'static str;
}

#[async_trait]
pub trait UnitOfWork: Send {
    async fn find_customer_by_mobile_number(&mut self, mobile_number: &str) -> Result<Option<Customer>, StoreError>;

    async fn find_customer_by_id(&mut self, customer_id: i64) -> Result<Option<Customer>, StoreError>;

    /// Insert and return the row with its generated identifier
    async fn insert_customer(&mut self, customer: NewCustomer) -> Result<Customer, StoreError>;

    async fn update_customer(&mut self, customer: &Customer) -> Result<Customer, StoreError>;

    /// Returns the number of rows removed
    async fn delete_customer_by_id(&mut self, customer_id: i64) -> Result<u64, StoreError>;

    async fn find_account_by_number(&mut self, account_number: i64) -> Result<Option<Account>, StoreError>;

    async fn find_account_by_customer_id(&mut self, customer_id: i64) -> Result<Option<Account>, StoreError>;

    async fn insert_account(&mut self, account: &Account) -> Result<Account, StoreError>;

    async fn update_account(&mut self, account: &Account) -> Result<Account, StoreError>;

    /// Returns the number of rows removed
    async fn delete_accounts_by_customer_id(&mut self, customer_id: i64) -> Result<u64, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
