use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};

use crate::config::DatabaseConfig;
use crate::domain::accounts::{Account, Customer, NewCustomer};

use super::{Repository, StoreError, UnitOfWork};

// ============================================================================
// Postgres Repository
// ============================================================================
//
// Schema lives in ./migrations and is applied at startup. Constraint names
// in the schema are the ones the service matches on (see store/mod.rs).
//
// ============================================================================

#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        tracing::info!(max_connections = config.max_connections, "Connected to Postgres");
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresUnitOfWork { tx }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

struct PostgresUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

/// Lift constraint violations out of the driver error
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or_default().to_string();
        if db_err.is_unique_violation() {
            return StoreError::UniqueViolation { constraint };
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::ForeignKeyViolation { constraint };
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn find_customer_by_mobile_number(&mut self, mobile_number: &str) -> Result<Option<Customer>, StoreError> {
        sqlx::query_as::<_, Customer>(
            "SELECT customer_id, name, email, mobile_number,
                    created_at, created_by, updated_at, updated_by
             FROM customer
             WHERE mobile_number = $1",
        )
        .bind(mobile_number)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(classify)
    }

    async fn find_customer_by_id(&mut self, customer_id: i64) -> Result<Option<Customer>, StoreError> {
        sqlx::query_as::<_, Customer>(
            "SELECT customer_id, name, email, mobile_number,
                    created_at, created_by, updated_at, updated_by
             FROM customer
             WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(classify)
    }

    async fn insert_customer(&mut self, customer: NewCustomer) -> Result<Customer, StoreError> {
        sqlx::query_as::<_, Customer>(
            "INSERT INTO customer (
                name, email, mobile_number, created_at, created_by, updated_at, updated_by
             ) VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING customer_id, name, email, mobile_number,
                       created_at, created_by, updated_at, updated_by",
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.mobile_number)
        .bind(customer.audit.created_at)
        .bind(&customer.audit.created_by)
        .bind(customer.audit.updated_at)
        .bind(&customer.audit.updated_by)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(classify)
    }

    async fn update_customer(&mut self, customer: &Customer) -> Result<Customer, StoreError> {
        sqlx::query_as::<_, Customer>(
            "UPDATE customer
             SET name = $2, email = $3, mobile_number = $4, updated_at = $5, updated_by = $6
             WHERE customer_id = $1
             RETURNING customer_id, name, email, mobile_number,
                       created_at, created_by, updated_at, updated_by",
        )
        .bind(customer.customer_id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.mobile_number)
        .bind(customer.audit.updated_at)
        .bind(&customer.audit.updated_by)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(classify)?
        .ok_or(StoreError::MissingRow {
            table: "customer",
            key: customer.customer_id,
        })
    }

    async fn delete_customer_by_id(&mut self, customer_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM customer WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&mut *self.tx)
            .await
            .map_err(classify)?;
        Ok(result.rows_affected())
    }

    async fn find_account_by_number(&mut self, account_number: i64) -> Result<Option<Account>, StoreError> {
        sqlx::query_as::<_, Account>(
            "SELECT account_number, customer_id, account_type, branch_address,
                    created_at, created_by, updated_at, updated_by
             FROM accounts
             WHERE account_number = $1",
        )
        .bind(account_number)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(classify)
    }

    async fn find_account_by_customer_id(&mut self, customer_id: i64) -> Result<Option<Account>, StoreError> {
        sqlx::query_as::<_, Account>(
            "SELECT account_number, customer_id, account_type, branch_address,
                    created_at, created_by, updated_at, updated_by
             FROM accounts
             WHERE customer_id = $1
             ORDER BY account_number ASC
             LIMIT 1",
        )
        .bind(customer_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(classify)
    }

    async fn insert_account(&mut self, account: &Account) -> Result<Account, StoreError> {
        sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (
                account_number, customer_id, account_type, branch_address,
                created_at, created_by, updated_at, updated_by
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING account_number, customer_id, account_type, branch_address,
                       created_at, created_by, updated_at, updated_by",
        )
        .bind(account.account_number)
        .bind(account.customer_id)
        .bind(&account.account_type)
        .bind(&account.branch_address)
        .bind(account.audit.created_at)
        .bind(&account.audit.created_by)
        .bind(account.audit.updated_at)
        .bind(&account.audit.updated_by)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(classify)
    }

    async fn update_account(&mut self, account: &Account) -> Result<Account, StoreError> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts
             SET account_type = $2, branch_address = $3, updated_at = $4, updated_by = $5
             WHERE account_number = $1
             RETURNING account_number, customer_id, account_type, branch_address,
                       created_at, created_by, updated_at, updated_by",
        )
        .bind(account.account_number)
        .bind(&account.account_type)
        .bind(&account.branch_address)
        .bind(account.audit.updated_at)
        .bind(&account.audit.updated_by)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(classify)?
        .ok_or(StoreError::MissingRow {
            table: "accounts",
            key: account.account_number,
        })
    }

    async fn delete_accounts_by_customer_id(&mut self, customer_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&mut *self.tx)
            .await
            .map_err(classify)?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        this.tx.commit().await.map_err(classify)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
//
// Queries themselves need a running Postgres and are not exercised here.
//
// ============================================================================
