// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each bounded context has its own subdirectory with:
// - Value objects and constants
// - Persisted entities and transfer objects
// - Mapping between the two
// - Validation rules
// - Errors
// - Lifecycle service
//
// Persistence lives in src/store/, HTTP plumbing in src/api/.
//
// ============================================================================

pub mod accounts;
