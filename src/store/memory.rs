use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::accounts::{Account, Customer, NewCustomer};

use super::{
    Repository, StoreError, UnitOfWork, ACCOUNTS_CUSTOMER_ID_FKEY, ACCOUNTS_PKEY, CUSTOMER_MOBILE_NUMBER_KEY,
};

// ============================================================================
// In-Memory Repository
// ============================================================================
//
// Mirrors the Postgres schema constraints:
// - unique mobile number       -> UniqueViolation(customer_mobile_number_key)
// - account number primary key -> UniqueViolation(accounts_pkey)
// - account -> customer FK     -> ForeignKeyViolation(accounts_customer_id_fkey)
//
// A unit of work holds the state lock for its whole lifetime and edits a
// private copy; commit swaps the copy in. Transactions are therefore fully
// serialized.
//
// ============================================================================

#[derive(Debug, Clone, Default)]
struct MemoryState {
    customers: BTreeMap<i64, Customer>,
    accounts: BTreeMap<i64, Account>,
    last_customer_id: i64,
}

#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// (customers, accounts) currently committed
    #[cfg(test)]
    pub async fn row_counts(&self) -> (usize, usize) {
        let state = self.state.lock().await;
        (state.customers.len(), state.accounts.len())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryUnitOfWork { guard, working }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

impl InMemoryUnitOfWork {
    fn mobile_number_taken(&self, mobile_number: &str, except: Option<i64>) -> bool {
        self.working
            .customers
            .values()
            .any(|c| c.mobile_number == mobile_number && Some(c.customer_id) != except)
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn find_customer_by_mobile_number(&mut self, mobile_number: &str) -> Result<Option<Customer>, StoreError> {
        Ok(self
            .working
            .customers
            .values()
            .find(|c| c.mobile_number == mobile_number)
            .cloned())
    }

    async fn find_customer_by_id(&mut self, customer_id: i64) -> Result<Option<Customer>, StoreError> {
        Ok(self.working.customers.get(&customer_id).cloned())
    }

    async fn insert_customer(&mut self, customer: NewCustomer) -> Result<Customer, StoreError> {
        if self.mobile_number_taken(&customer.mobile_number, None) {
            return Err(StoreError::UniqueViolation {
                constraint: CUSTOMER_MOBILE_NUMBER_KEY.to_string(),
            });
        }

        self.working.last_customer_id += 1;
        let row = Customer {
            customer_id: self.working.last_customer_id,
            name: customer.name,
            email: customer.email,
            mobile_number: customer.mobile_number,
            audit: customer.audit,
        };
        self.working.customers.insert(row.customer_id, row.clone());
        Ok(row)
    }

    async fn update_customer(&mut self, customer: &Customer) -> Result<Customer, StoreError> {
        if self.mobile_number_taken(&customer.mobile_number, Some(customer.customer_id)) {
            return Err(StoreError::UniqueViolation {
                constraint: CUSTOMER_MOBILE_NUMBER_KEY.to_string(),
            });
        }

        let row = self
            .working
            .customers
            .get_mut(&customer.customer_id)
            .ok_or(StoreError::MissingRow {
                table: "customer",
                key: customer.customer_id,
            })?;

        // created_* columns are never rewritten by an update
        row.name = customer.name.clone();
        row.email = customer.email.clone();
        row.mobile_number = customer.mobile_number.clone();
        row.audit.updated_at = customer.audit.updated_at;
        row.audit.updated_by = customer.audit.updated_by.clone();
        Ok(row.clone())
    }

    async fn delete_customer_by_id(&mut self, customer_id: i64) -> Result<u64, StoreError> {
        if self.working.accounts.values().any(|a| a.customer_id == customer_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: ACCOUNTS_CUSTOMER_ID_FKEY.to_string(),
            });
        }
        Ok(self.working.customers.remove(&customer_id).map_or(0, |_| 1))
    }

    async fn find_account_by_number(&mut self, account_number: i64) -> Result<Option<Account>, StoreError> {
        Ok(self.working.accounts.get(&account_number).cloned())
    }

    async fn find_account_by_customer_id(&mut self, customer_id: i64) -> Result<Option<Account>, StoreError> {
        Ok(self
            .working
            .accounts
            .values()
            .find(|a| a.customer_id == customer_id)
            .cloned())
    }

    async fn insert_account(&mut self, account: &Account) -> Result<Account, StoreError> {
        if self.working.accounts.contains_key(&account.account_number) {
            return Err(StoreError::UniqueViolation {
                constraint: ACCOUNTS_PKEY.to_string(),
            });
        }
        if !self.working.customers.contains_key(&account.customer_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: ACCOUNTS_CUSTOMER_ID_FKEY.to_string(),
            });
        }

        self.working.accounts.insert(account.account_number, account.clone());
        Ok(account.clone())
    }

    async fn update_account(&mut self, account: &Account) -> Result<Account, StoreError> {
        let row = self
            .working
            .accounts
            .get_mut(&account.account_number)
            .ok_or(StoreError::MissingRow {
                table: "accounts",
                key: account.account_number,
            })?;

        row.account_type = account.account_type.clone();
        row.branch_address = account.branch_address.clone();
        row.audit.updated_at = account.audit.updated_at;
        row.audit.updated_by = account.audit.updated_by.clone();
        Ok(row.clone())
    }

    async fn delete_accounts_by_customer_id(&mut self, customer_id: i64) -> Result<u64, StoreError> {
        let before = self.working.accounts.len();
        self.working.accounts.retain(|_, a| a.customer_id != customer_id);
        Ok((before - self.working.accounts.len()) as u64)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let InMemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
