use chrono::{DateTime, Utc};

// ============================================================================
// Persisted Entities
// ============================================================================

/// Audit columns shared by every table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Audit {
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
}

impl Audit {
    pub fn created(actor: &str) -> Self {
        Self {
            created_at: Utc::now(),
            created_by: actor.to_string(),
            updated_at: None,
            updated_by: None,
        }
    }

    pub fn touch(&mut self, actor: &str) {
        self.updated_at = Some(Utc::now());
        self.updated_by = Some(actor.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Customer {
    pub customer_id: i64,
    pub name: String,
    pub email: String,
    pub mobile_number: String,
    #[sqlx(flatten)]
    pub audit: Audit,
}

/// Customer row before the store assigns its identifier
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub mobile_number: String,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Account {
    pub account_number: i64,
    pub customer_id: i64,
    pub account_type: String,
    pub branch_address: String,
    #[sqlx(flatten)]
    pub audit: Audit,
}
