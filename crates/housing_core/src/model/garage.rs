//! Garage record owned by a house.

use super::{require_measure, require_text, DependentFilter, Entity, EntityKind, HouseId};
use super::ValidationError;
use serde::{Deserialize, Serialize};

pub type GarageId = i64;

const KIND_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Garage {
    pub id: GarageId,
    pub house_id: HouseId,
    /// Construction type, e.g. `detached` or `carport`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Floor area in square meters.
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGarage {
    pub house_id: HouseId,
    #[serde(rename = "type")]
    pub kind: String,
    pub size: f64,
}

impl NewGarage {
    pub fn new(house_id: HouseId, kind: impl Into<String>, size: f64) -> Self {
        Self {
            house_id,
            kind: kind.into(),
            size,
        }
    }

    pub fn into_garage(self, id: GarageId) -> Garage {
        Garage {
            id,
            house_id: self.house_id,
            kind: self.kind,
            size: self.size,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.kind, self.size)
    }
}

impl Entity for Garage {
    type Draft = NewGarage;
    type Filter = DependentFilter;

    const KIND: EntityKind = EntityKind::Garage;

    fn id(&self) -> i64 {
        self.id
    }

    fn apply_edits(&mut self, edited: &Self) {
        self.kind.clone_from(&edited.kind);
        self.size = edited.size;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.kind, self.size)
    }
}

fn validate_fields(kind: &str, size: f64) -> Result<(), ValidationError> {
    require_text("type", kind, KIND_MAX_CHARS)?;
    require_measure("size", size)
}
