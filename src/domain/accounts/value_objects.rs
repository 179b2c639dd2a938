use rand::Rng;

// ============================================================================
// Accounts Value Objects
// ============================================================================

/// Account type assigned to every account opened through the service
pub const SAVINGS: &str = "SAVINGS";

/// Smallest generated account number
pub const ACCOUNT_NUMBER_MIN: i64 = 1_000_000_000;

/// Width of the generated range: numbers fall in [MIN, MIN + SPAN)
pub const ACCOUNT_NUMBER_SPAN: i64 = 900_000_000;

/// Source of fresh account numbers
///
/// Numbers are not checked against existing accounts; a collision surfaces
/// from the store as a primary key violation.
pub trait AccountNumberSource: Send + Sync {
    fn next_account_number(&self) -> i64;
}

/// Uniformly random 10-digit account numbers
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomAccountNumbers;

impl AccountNumberSource for RandomAccountNumbers {
    fn next_account_number(&self) -> i64 {
        ACCOUNT_NUMBER_MIN + rand::thread_rng().gen_range(0..ACCOUNT_NUMBER_SPAN)
    }
}

/// True when `value` has exactly ten decimal digits
pub fn is_ten_digit_number(value: i64) -> bool {
    (1_000_000_000..=9_999_999_999).contains(&value)
}

// ============================================================================
// Unit Tests
// ============================================================================
