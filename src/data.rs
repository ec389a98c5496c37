//! Card input fixtures.
//!
//! The backend under test is seeded with two well-known card numbers — one
//! it approves and one it declines — plus anything else, which fails basic
//! validation client-side. The helpers here produce syntactically valid
//! defaults around those numbers and the variants the negative scenarios
//! need (past years, random cvc/owner values).
//!
//! The harness core never validates a `CardInput`: the five fields are
//! transmitted to the form exactly as given, because validity is the
//! application's concern.

use chrono::{Datelike, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Card number the backend is seeded to approve.
pub const APPROVED_NUMBER: &str = "4444 4444 4444 4441";
/// Card number the backend is seeded to decline.
pub const DECLINED_NUMBER: &str = "4444 4444 4444 4442";
/// Card number that fails basic validation and never reaches the backend.
pub const ILLEGAL_NUMBER: &str = "4444 4444 4444 4444";

const CVC_POOL: &[&str] = &[
    "123", "999", "985", "015", "888", "656", "001", "234", "601", "111",
];

const OWNER_POOL: &[&str] = &[
    "Jane Doe",
    "John Smith",
    "Alice Brown",
    "Robert Wilson",
    "Maria Garcia",
    "James Miller",
];

/// One card submission: five strings, transmitted as-is.
///
/// Immutable once handed to the form; build variants up front with the
/// `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInput {
    /// 16 digits grouped in fours.
    pub number: String,
    /// Two-digit expiry month.
    pub expiry_month: String,
    /// Two-digit expiry year.
    pub expiry_year: String,
    /// Cardholder name.
    pub owner_name: String,
    /// Three-digit security code.
    pub cvc: String,
}

impl CardInput {
    /// A valid card the backend approves.
    #[must_use]
    pub fn approved() -> Self {
        Self::with_number(APPROVED_NUMBER)
    }

    /// A valid card the backend declines.
    #[must_use]
    pub fn declined() -> Self {
        Self::with_number(DECLINED_NUMBER)
    }

    /// A card number that fails basic validation client-side.
    #[must_use]
    pub fn illegal() -> Self {
        Self::with_number(ILLEGAL_NUMBER)
    }

    fn with_number(number: &str) -> Self {
        Self {
            number: number.to_string(),
            expiry_month: "01".to_string(),
            expiry_year: valid_expiry_year(),
            owner_name: random_owner(),
            cvc: random_cvc(),
        }
    }

    /// Replaces the expiry month.
    #[must_use]
    pub fn with_month(mut self, month: impl Into<String>) -> Self {
        self.expiry_month = month.into();
        self
    }

    /// Replaces the expiry year.
    #[must_use]
    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.expiry_year = year.into();
        self
    }

    /// Replaces the owner name.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner_name = owner.into();
        self
    }

    /// Replaces the security code.
    #[must_use]
    pub fn with_cvc(mut self, cvc: impl Into<String>) -> Self {
        self.cvc = cvc.into();
        self
    }
}

/// Two-digit year two years in the future — always a valid expiry.
#[must_use]
pub fn valid_expiry_year() -> String {
    two_digit_year(Utc::now().year() + 2)
}

/// Two-digit year two years in the past — always an expired card.
#[must_use]
pub fn expired_year() -> String {
    two_digit_year(Utc::now().year() - 2)
}

fn two_digit_year(year: i32) -> String {
    format!("{:02}", year.rem_euclid(100))
}

/// A syntactically valid cvc from a fixed pool.
#[must_use]
pub fn random_cvc() -> String {
    let mut rng = rand::thread_rng();
    (*CVC_POOL.choose(&mut rng).expect("pool is non-empty")).to_string()
}

/// A plausible cardholder name from a fixed pool.
#[must_use]
pub fn random_owner() -> String {
    let mut rng = rand::thread_rng();
    (*OWNER_POOL.choose(&mut rng).expect("pool is non-empty")).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_carry_their_numbers() {
        assert_eq!(CardInput::approved().number, APPROVED_NUMBER);
        assert_eq!(CardInput::declined().number, DECLINED_NUMBER);
        assert_eq!(CardInput::illegal().number, ILLEGAL_NUMBER);
    }

    #[test]
    fn defaults_are_syntactically_valid() {
        let card = CardInput::approved();
        assert_eq!(card.expiry_month, "01");
        assert_eq!(card.expiry_year.len(), 2);
        assert_eq!(card.cvc.len(), 3);
        assert!(card.cvc.chars().all(|c| c.is_ascii_digit()));
        assert!(!card.owner_name.is_empty());
    }

    #[test]
    fn year_helpers_are_two_digits() {
        assert_eq!(valid_expiry_year().len(), 2);
        assert_eq!(expired_year().len(), 2);
        assert_ne!(valid_expiry_year(), expired_year());
    }

    #[test]
    fn variant_setters_replace_single_fields() {
        let card = CardInput::approved().with_month("22").with_year("");
        assert_eq!(card.expiry_month, "22");
        assert_eq!(card.expiry_year, "");
        assert_eq!(card.number, APPROVED_NUMBER);
    }
}
