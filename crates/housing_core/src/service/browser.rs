//! Presentation-facing facade: view lists, filter inputs, selection, actions.
//!
//! # Responsibility
//! - Own the `ViewList`s a UI binds to and the current `Selection`.
//! - Run search, selection, update and delete actions against the store and
//!   reconcile the lists with what was persisted.
//!
//! # Invariants
//! - A failed action leaves every list and the selection as they were.
//! - Search and selection replace whole lists; updates replace one element
//!   in place; delete removes exactly one house.
//! - Selecting a house always reloads its addresses and garages.

use crate::model::{Address, Entity, Garage, House};
use crate::repo::{HousingStore, RepoResult, Repository};
use crate::service::filter::{self, FilterInput};
use crate::service::loader::load_dependents;
use crate::service::mutation::{cascade_delete_house, update_entity};
use crate::service::ServiceError;
use crate::view::{Selection, ViewList, ViewSnapshot};
use log::{info, warn};
use std::ops::RangeInclusive;

/// Values offered by the floor-count filter picker.
pub const FLOORS_OPTIONS: RangeInclusive<i32> = 1..=10;

/// House registry state for one presentation session.
pub struct HouseBrowser<S: HousingStore> {
    store: S,
    houses: ViewList<House>,
    addresses: ViewList<Address>,
    garages: ViewList<Garage>,
    floors_options: Vec<i32>,
    filter: FilterInput,
    selection: Selection,
}

impl<S: HousingStore> HouseBrowser<S> {
    /// Creates the facade and loads every house into the house list.
    pub fn new(store: S) -> RepoResult<Self> {
        let all_houses = Repository::<House>::fetch_all(&store)?;
        let mut houses = ViewList::new();
        houses.replace_all(all_houses);
        info!(
            "event=browser_open module=service status=ok houses={}",
            houses.len()
        );

        Ok(Self {
            store,
            houses,
            addresses: ViewList::new(),
            garages: ViewList::new(),
            floors_options: FLOORS_OPTIONS.collect(),
            filter: FilterInput::default(),
            selection: Selection::Unselected,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn houses(&self) -> &ViewList<House> {
        &self.houses
    }

    pub fn addresses(&self) -> &ViewList<Address> {
        &self.addresses
    }

    pub fn garages(&self) -> &ViewList<Garage> {
        &self.garages
    }

    pub fn floors_options(&self) -> &[i32] {
        &self.floors_options
    }

    pub fn filter(&self) -> &FilterInput {
        &self.filter
    }

    pub fn set_owner_filter(&mut self, owner: impl Into<String>) {
        self.filter.owner = owner.into();
    }

    pub fn set_year_built_filter(&mut self, year_built: impl Into<String>) {
        self.filter.year_built = year_built.into();
    }

    pub fn set_floors_filter(&mut self, floors: Option<i32>) {
        self.filter.floors = floors;
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_house(&self) -> Option<&House> {
        self.selection.house()
    }

    /// Writes the selection slot and reloads dependents for it.
    pub fn set_selected_house(&mut self, house: Option<House>) -> RepoResult<()> {
        let (addresses, garages) = load_dependents(&self.store, house.as_ref())?;
        self.addresses.replace_all(addresses);
        self.garages.replace_all(garages);
        self.selection = match house {
            Some(house) => Selection::Selected(house),
            None => Selection::Unselected,
        };
        Ok(())
    }

    /// Reloads dependents of the current selection.
    pub fn select_house(&mut self) -> RepoResult<()> {
        let selected = self.selection.house().cloned();
        self.set_selected_house(selected)
    }

    pub fn deselect(&mut self) {
        self.addresses.clear();
        self.garages.clear();
        self.selection = Selection::Unselected;
    }

    /// Loads dependents of `house` into the address and garage lists.
    ///
    /// `None` clears both lists. The selection slot is not changed.
    pub fn load_dependents(
        &mut self,
        house: Option<&House>,
    ) -> RepoResult<(Vec<Address>, Vec<Garage>)> {
        let (addresses, garages) = load_dependents(&self.store, house)?;
        self.addresses.replace_all(addresses.clone());
        self.garages.replace_all(garages.clone());
        Ok((addresses, garages))
    }

    /// Runs the search using the current filter inputs.
    pub fn search(&mut self) -> RepoResult<&[House]> {
        let criteria = self.filter.to_filter();
        let found = Repository::<House>::fetch_where(&self.store, &criteria)?;
        info!(
            "event=house_search module=service status=ok owner_set={} year_set={} floors_set={} results={}",
            criteria.owner_contains.is_some(),
            criteria.year_built.is_some(),
            criteria.floors.is_some(),
            found.len()
        );
        self.houses.replace_all(found);
        Ok(self.houses.items())
    }

    /// Runs a search with explicit criteria, bypassing the filter inputs.
    pub fn search_with(
        &mut self,
        owner_substring: Option<&str>,
        year_built: Option<&str>,
        floors: Option<i32>,
    ) -> RepoResult<&[House]> {
        let found = filter::search(&self.store, owner_substring, year_built, floors)?;
        self.houses.replace_all(found);
        Ok(self.houses.items())
    }

    pub fn update_house(&mut self, edited: &House) -> Result<House, ServiceError> {
        let updated = log_update(update_entity(&self.store, edited), edited)?;
        self.houses.replace_entity(updated.clone());
        if self.selected_house().map(|house| house.id) == Some(updated.id) {
            self.selection = Selection::Selected(updated.clone());
        }
        Ok(updated)
    }

    pub fn update_address(&mut self, edited: &Address) -> Result<Address, ServiceError> {
        let updated = log_update(update_entity(&self.store, edited), edited)?;
        self.addresses.replace_entity(updated.clone());
        Ok(updated)
    }

    pub fn update_garage(&mut self, edited: &Garage) -> Result<Garage, ServiceError> {
        let updated = log_update(update_entity(&self.store, edited), edited)?;
        self.garages.replace_entity(updated.clone());
        Ok(updated)
    }

    /// Deletes `house` with its addresses and garages.
    ///
    /// `None` is a no-op. On success the house leaves the house list, the
    /// dependent lists are cleared and the selection is reset.
    pub fn delete_house(&mut self, house: Option<&House>) -> Result<(), ServiceError> {
        let Some(house) = house else {
            return Ok(());
        };

        match cascade_delete_house(&self.store, house) {
            Ok(report) => {
                info!(
                    "event=house_delete module=service status=ok house_id={} addresses_removed={} garages_removed={}",
                    report.house_id, report.addresses_removed, report.garages_removed
                );
            }
            Err(err) => {
                warn!(
                    "event=house_delete module=service status=error house_id={} error={err}",
                    house.id
                );
                return Err(err);
            }
        }

        self.houses.remove_entity(house.id);
        self.addresses.clear();
        self.garages.clear();
        self.selection = Selection::Unselected;
        Ok(())
    }

    /// Deletes the selected house, if any.
    pub fn delete(&mut self) -> Result<(), ServiceError> {
        let selected = self.selection.house().cloned();
        self.delete_house(selected.as_ref())
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            houses: self.houses.clone(),
            addresses: self.addresses.clone(),
            garages: self.garages.clone(),
            floors_options: self.floors_options.clone(),
            filter: self.filter.clone(),
            selection: self.selection.clone(),
        }
    }
}

fn log_update<T: Entity>(
    result: Result<T, ServiceError>,
    edited: &T,
) -> Result<T, ServiceError> {
    match &result {
        Ok(_) => info!(
            "event=entity_update module=service status=ok kind={} id={}",
            T::KIND,
            edited.id()
        ),
        Err(ServiceError::NotFound { .. }) => warn!(
            "event=entity_update module=service status=not_found kind={} id={}",
            T::KIND,
            edited.id()
        ),
        Err(err) => warn!(
            "event=entity_update module=service status=error kind={} id={} error={err}",
            T::KIND,
            edited.id()
        ),
    }
    result
}
