// ============================================================================
// Accounts Domain - Customer + Account lifecycle
// ============================================================================
//
// This module contains ALL account-opening code:
// - Value objects (account type, account number generation)
// - Entities (Customer, Account, audit columns)
// - Transfer objects (CustomerDto, AccountsDto)
// - Mapper (entity <-> dto field copy)
// - Validation (per-field constraint checks)
// - Errors (AccountsError enum)
// - Service (AccountsService: create / fetch / update / delete)
//
// ============================================================================

pub mod value_objects;
pub mod entities;
pub mod dto;
pub mod mapper;
pub mod validation;
pub mod errors;
pub mod service;

// Re-export for convenience
pub use value_objects::*;
pub use entities::*;
pub use dto::*;
pub use validation::*;
pub use errors::*;
pub use service::*;
