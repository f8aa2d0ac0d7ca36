//! Address record owned by a house.

use super::{limit_text, require_text, DependentFilter, Entity, EntityKind, HouseId};
use super::ValidationError;
use serde::{Deserialize, Serialize};

pub type AddressId = i64;

const STREET_MAX_CHARS: usize = 100;
const CITY_MAX_CHARS: usize = 50;
const POSTAL_CODE_MAX_CHARS: usize = 10;
const COUNTRY_MAX_CHARS: usize = 100;
const NOTES_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub house_id: HouseId,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    /// Free text; may be empty.
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
    pub house_id: HouseId,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub notes: String,
}

impl NewAddress {
    pub fn new(
        house_id: HouseId,
        street: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            house_id,
            street: street.into(),
            city: city.into(),
            postal_code: postal_code.into(),
            country: country.into(),
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn into_address(self, id: AddressId) -> Address {
        Address {
            id,
            house_id: self.house_id,
            street: self.street,
            city: self.city,
            postal_code: self.postal_code,
            country: self.country,
            notes: self.notes,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(
            &self.street,
            &self.city,
            &self.postal_code,
            &self.country,
            &self.notes,
        )
    }
}

impl Entity for Address {
    type Draft = NewAddress;
    type Filter = DependentFilter;

    const KIND: EntityKind = EntityKind::Address;

    fn id(&self) -> i64 {
        self.id
    }

    fn apply_edits(&mut self, edited: &Self) {
        self.street.clone_from(&edited.street);
        self.city.clone_from(&edited.city);
        self.postal_code.clone_from(&edited.postal_code);
        self.country.clone_from(&edited.country);
        self.notes.clone_from(&edited.notes);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(
            &self.street,
            &self.city,
            &self.postal_code,
            &self.country,
            &self.notes,
        )
    }
}

fn validate_fields(
    street: &str,
    city: &str,
    postal_code: &str,
    country: &str,
    notes: &str,
) -> Result<(), ValidationError> {
    require_text("street", street, STREET_MAX_CHARS)?;
    require_text("city", city, CITY_MAX_CHARS)?;
    require_text("postal_code", postal_code, POSTAL_CODE_MAX_CHARS)?;
    require_text("country", country, COUNTRY_MAX_CHARS)?;
    limit_text("notes", notes, NOTES_MAX_CHARS)
}
