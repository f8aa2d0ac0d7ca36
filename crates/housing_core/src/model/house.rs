//! House record.

use super::{require_measure, require_text, Entity, EntityKind, HouseFilter, ValidationError};
use serde::{Deserialize, Serialize};

/// Store-assigned house identity.
pub type HouseId = i64;

pub const OWNER_MAX_CHARS: usize = 100;

/// Persisted house row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct House {
    pub id: HouseId,
    pub owner: String,
    pub year_built: i32,
    /// Floor area in square meters.
    pub area: f64,
    pub floors: i32,
}

/// House insert request; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHouse {
    pub owner: String,
    pub year_built: i32,
    pub area: f64,
    pub floors: i32,
}

impl NewHouse {
    pub fn new(owner: impl Into<String>, year_built: i32, area: f64, floors: i32) -> Self {
        Self {
            owner: owner.into(),
            year_built,
            area,
            floors,
        }
    }

    /// Materializes the row once the store has picked `id`.
    pub fn into_house(self, id: HouseId) -> House {
        House {
            id,
            owner: self.owner,
            year_built: self.year_built,
            area: self.area,
            floors: self.floors,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.owner, self.area)
    }
}

impl Entity for House {
    type Draft = NewHouse;
    type Filter = HouseFilter;

    const KIND: EntityKind = EntityKind::House;

    fn id(&self) -> i64 {
        self.id
    }

    fn apply_edits(&mut self, edited: &Self) {
        self.owner.clone_from(&edited.owner);
        self.year_built = edited.year_built;
        self.area = edited.area;
        self.floors = edited.floors;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.owner, self.area)
    }
}

fn validate_fields(owner: &str, area: f64) -> Result<(), ValidationError> {
    require_text("owner", owner, OWNER_MAX_CHARS)?;
    require_measure("area", area)
}
