//! Entity model for houses and their dependent records.
//!
//! # Responsibility
//! - Define the persisted shapes of `House`, `Address` and `Garage`.
//! - Describe which fields are mutable and how they are validated.
//! - Provide predicate values used by `Repository::fetch_where`.
//!
//! # Invariants
//! - Ids are assigned by the store and never rewritten by an edit.
//! - `Address::house_id` / `Garage::house_id` always point at an existing house.

pub mod address;
pub mod filter;
pub mod garage;
pub mod house;

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use address::{Address, AddressId, NewAddress};
pub use filter::{DependentFilter, HouseFilter};
pub use garage::{Garage, GarageId, NewGarage};
pub use house::{House, HouseId, NewHouse};

/// Discriminates the three stored record kinds in errors and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    House,
    Address,
    Garage,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::House => "house",
            Self::Address => "address",
            Self::Garage => "garage",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared behavior of every stored record kind.
///
/// Implemented by [`House`], [`Address`] and [`Garage`]; repositories are
/// generic over it.
pub trait Entity: Clone {
    /// Insert shape without a store-assigned id.
    type Draft;
    /// Predicate value accepted by `fetch_where`.
    type Filter: Default;

    const KIND: EntityKind;

    fn id(&self) -> i64;

    /// Copies every mutable field of `edited` onto `self`.
    ///
    /// Identity and foreign keys are left untouched.
    fn apply_edits(&mut self, edited: &Self);

    fn validate(&self) -> Result<(), ValidationError>;
}

/// Field-level rejection of an entity or draft.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required text is empty after trimming.
    Blank { field: &'static str },
    /// Text exceeds the column bound (counted in chars).
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    /// Numeric value is negative, NaN or infinite.
    OutOfRange { field: &'static str, value: f64 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank { field } => write!(f, "`{field}` must not be blank"),
            Self::TooLong { field, max, actual } => {
                write!(f, "`{field}` is {actual} chars, limit is {max}")
            }
            Self::OutOfRange { field, value } => {
                write!(f, "`{field}` must be a finite non-negative number, got {value}")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    limit_text(field, value, max)
}

pub(crate) fn limit_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

pub(crate) fn require_measure(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::OutOfRange { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{limit_text, require_measure, require_text, ValidationError};

    #[test]
    fn require_text_rejects_whitespace_only() {
        assert_eq!(
            require_text("owner", "   ", 100),
            Err(ValidationError::Blank { field: "owner" })
        );
    }

    #[test]
    fn limit_text_counts_chars_not_bytes() {
        assert!(limit_text("postal_code", "ÄÖÜäöüß123", 10).is_ok());
        assert!(matches!(
            limit_text("postal_code", "12345678901", 10),
            Err(ValidationError::TooLong { actual: 11, .. })
        ));
    }

    #[test]
    fn require_measure_rejects_nan_and_negative() {
        assert!(require_measure("area", f64::NAN).is_err());
        assert!(require_measure("area", -1.0).is_err());
        assert!(require_measure("area", 0.0).is_ok());
    }
}
