//! Predicate values accepted by `Repository::fetch_where`.
//!
//! Stores either compile these into SQL or evaluate [`HouseFilter::matches`]
//! directly; both paths must select the same rows.

use super::{Address, Garage, House, HouseId};
use serde::{Deserialize, Serialize};

/// Conjunction of optional house criteria. `Default` matches every house.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseFilter {
    /// Owner must contain this text, ASCII case-insensitively.
    pub owner_contains: Option<String>,
    pub year_built: Option<i32>,
    pub floors: Option<i32>,
}

impl HouseFilter {
    pub fn is_unrestricted(&self) -> bool {
        self.owner_contains.is_none() && self.year_built.is_none() && self.floors.is_none()
    }

    pub fn matches(&self, house: &House) -> bool {
        let owner_ok = self.owner_contains.as_deref().map_or(true, |needle| {
            house
                .owner
                .to_ascii_lowercase()
                .contains(&needle.to_ascii_lowercase())
        });
        let year_ok = self.year_built.map_or(true, |year| house.year_built == year);
        let floors_ok = self.floors.map_or(true, |floors| house.floors == floors);
        owner_ok && year_ok && floors_ok
    }
}

/// Selects addresses or garages, optionally scoped to one owning house.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentFilter {
    pub house_id: Option<HouseId>,
}

impl DependentFilter {
    pub fn of_house(house_id: HouseId) -> Self {
        Self {
            house_id: Some(house_id),
        }
    }

    pub fn matches_address(&self, address: &Address) -> bool {
        self.house_id.map_or(true, |id| address.house_id == id)
    }

    pub fn matches_garage(&self, garage: &Garage) -> bool {
        self.house_id.map_or(true, |id| garage.house_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::HouseFilter;
    use crate::model::NewHouse;

    #[test]
    fn owner_match_ignores_ascii_case() {
        let house = NewHouse::new("Alice Smith", 1990, 100.0, 2).into_house(1);
        let filter = HouseFilter {
            owner_contains: Some("SMITH".to_string()),
            ..HouseFilter::default()
        };
        assert!(filter.matches(&house));
    }

    #[test]
    fn all_criteria_must_hold() {
        let house = NewHouse::new("Alice", 1990, 100.0, 2).into_house(1);
        let filter = HouseFilter {
            owner_contains: Some("ali".to_string()),
            year_built: Some(1990),
            floors: Some(3),
        };
        assert!(!filter.matches(&house));
        assert!(HouseFilter::default().matches(&house));
    }
}
