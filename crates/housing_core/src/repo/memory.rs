//! In-memory implementation of the housing repositories.
//!
//! Mirrors the SQLite store's unit-of-work behavior: writes go to a staged
//! copy of the tables, `persist` swaps it in after an integrity check. Used
//! by tests, with a write journal and an injectable persist failure.

use crate::model::{
    Address, DependentFilter, Entity, EntityKind, Garage, House, HouseFilter, NewAddress,
    NewGarage, NewHouse,
};
use crate::repo::{RepoError, RepoResult, Repository, UnitOfWork};
use std::cell::RefCell;
use std::collections::HashSet;

/// One write-side call observed by the store, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Add { kind: EntityKind, id: i64 },
    Update { kind: EntityKind, id: i64 },
    Remove { kind: EntityKind, id: i64 },
    Persist,
    Discard,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    houses: Vec<House>,
    addresses: Vec<Address>,
    garages: Vec<Garage>,
    last_house_id: i64,
    last_address_id: i64,
    last_garage_id: i64,
}

impl Tables {
    fn orphan_message(&self) -> Option<String> {
        let house_ids: HashSet<i64> = self.houses.iter().map(|house| house.id).collect();
        if let Some(address) = self
            .addresses
            .iter()
            .find(|address| !house_ids.contains(&address.house_id))
        {
            return Some(format!(
                "address {} references missing house {}",
                address.id, address.house_id
            ));
        }
        self.garages
            .iter()
            .find(|garage| !house_ids.contains(&garage.house_id))
            .map(|garage| {
                format!(
                    "garage {} references missing house {}",
                    garage.id, garage.house_id
                )
            })
    }
}

/// Single-threaded in-memory store.
///
/// `RefCell` keeps the `&self` repository signatures without locking.
#[derive(Default)]
pub struct MemoryHousingStore {
    committed: RefCell<Tables>,
    pending: RefCell<Option<Tables>>,
    journal: RefCell<Vec<StoreOp>>,
    simulate_persist_error: RefCell<bool>,
}

impl MemoryHousingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `persist` fail with `RepoError::Unavailable`.
    pub fn set_simulate_persist_error(&self, simulate: bool) {
        *self.simulate_persist_error.borrow_mut() = simulate;
    }

    /// Write-side calls recorded since creation or the last `clear_journal`.
    pub fn journal(&self) -> Vec<StoreOp> {
        self.journal.borrow().clone()
    }

    pub fn clear_journal(&self) {
        self.journal.borrow_mut().clear();
    }

    fn record(&self, op: StoreOp) {
        self.journal.borrow_mut().push(op);
    }

    fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        let pending = self.pending.borrow();
        match pending.as_ref() {
            Some(tables) => f(tables),
            None => f(&self.committed.borrow()),
        }
    }

    fn write<R>(&self, f: impl FnOnce(&mut Tables) -> RepoResult<R>) -> RepoResult<R> {
        let mut pending = self.pending.borrow_mut();
        let tables = pending.get_or_insert_with(|| self.committed.borrow().clone());
        f(tables)
    }

    fn update_in<T: Entity>(
        &self,
        entity: &T,
        rows: impl FnOnce(&mut Tables) -> &mut Vec<T>,
    ) -> RepoResult<()> {
        entity.validate()?;
        self.write(|tables| {
            let row = rows(tables)
                .iter_mut()
                .find(|row| row.id() == entity.id())
                .ok_or_else(|| RepoError::not_found::<T>(entity.id()))?;
            row.apply_edits(entity);
            Ok(())
        })?;
        self.record(StoreOp::Update {
            kind: T::KIND,
            id: entity.id(),
        });
        Ok(())
    }

    fn remove_in<T: Entity>(
        &self,
        entity: &T,
        rows: impl FnOnce(&mut Tables) -> &mut Vec<T>,
    ) -> RepoResult<()> {
        self.write(|tables| {
            let rows = rows(tables);
            let index = rows
                .iter()
                .position(|row| row.id() == entity.id())
                .ok_or_else(|| RepoError::not_found::<T>(entity.id()))?;
            rows.remove(index);
            Ok(())
        })?;
        self.record(StoreOp::Remove {
            kind: T::KIND,
            id: entity.id(),
        });
        Ok(())
    }
}

impl UnitOfWork for MemoryHousingStore {
    fn persist(&self) -> RepoResult<()> {
        let Some(tables) = self.pending.borrow_mut().take() else {
            return Ok(());
        };
        self.record(StoreOp::Persist);

        if *self.simulate_persist_error.borrow() {
            return Err(RepoError::Unavailable("simulated persist error".to_string()));
        }
        if let Some(message) = tables.orphan_message() {
            return Err(RepoError::Integrity(message));
        }

        *self.committed.borrow_mut() = tables;
        Ok(())
    }

    fn discard(&self) -> RepoResult<()> {
        if self.pending.borrow_mut().take().is_some() {
            self.record(StoreOp::Discard);
        }
        Ok(())
    }

    fn has_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }
}

impl Repository<House> for MemoryHousingStore {
    fn fetch_where(&self, filter: &HouseFilter) -> RepoResult<Vec<House>> {
        Ok(self.read(|tables| {
            tables
                .houses
                .iter()
                .filter(|house| filter.matches(house))
                .cloned()
                .collect()
        }))
    }

    fn fetch_by_id(&self, id: i64) -> RepoResult<Option<House>> {
        Ok(self.read(|tables| tables.houses.iter().find(|house| house.id == id).cloned()))
    }

    fn add(&self, draft: &NewHouse) -> RepoResult<House> {
        draft.validate()?;
        let house = self.write(|tables| {
            tables.last_house_id += 1;
            let house = draft.clone().into_house(tables.last_house_id);
            tables.houses.push(house.clone());
            Ok(house)
        })?;
        self.record(StoreOp::Add {
            kind: EntityKind::House,
            id: house.id,
        });
        Ok(house)
    }

    fn update(&self, house: &House) -> RepoResult<()> {
        self.update_in(house, |tables| &mut tables.houses)
    }

    fn remove(&self, house: &House) -> RepoResult<()> {
        self.remove_in(house, |tables| &mut tables.houses)
    }
}

impl Repository<Address> for MemoryHousingStore {
    fn fetch_where(&self, filter: &DependentFilter) -> RepoResult<Vec<Address>> {
        Ok(self.read(|tables| {
            tables
                .addresses
                .iter()
                .filter(|address| filter.matches_address(address))
                .cloned()
                .collect()
        }))
    }

    fn fetch_by_id(&self, id: i64) -> RepoResult<Option<Address>> {
        Ok(self.read(|tables| {
            tables
                .addresses
                .iter()
                .find(|address| address.id == id)
                .cloned()
        }))
    }

    fn add(&self, draft: &NewAddress) -> RepoResult<Address> {
        draft.validate()?;
        let address = self.write(|tables| {
            tables.last_address_id += 1;
            let address = draft.clone().into_address(tables.last_address_id);
            tables.addresses.push(address.clone());
            Ok(address)
        })?;
        self.record(StoreOp::Add {
            kind: EntityKind::Address,
            id: address.id,
        });
        Ok(address)
    }

    fn update(&self, address: &Address) -> RepoResult<()> {
        self.update_in(address, |tables| &mut tables.addresses)
    }

    fn remove(&self, address: &Address) -> RepoResult<()> {
        self.remove_in(address, |tables| &mut tables.addresses)
    }
}

impl Repository<Garage> for MemoryHousingStore {
    fn fetch_where(&self, filter: &DependentFilter) -> RepoResult<Vec<Garage>> {
        Ok(self.read(|tables| {
            tables
                .garages
                .iter()
                .filter(|garage| filter.matches_garage(garage))
                .cloned()
                .collect()
        }))
    }

    fn fetch_by_id(&self, id: i64) -> RepoResult<Option<Garage>> {
        Ok(self.read(|tables| tables.garages.iter().find(|garage| garage.id == id).cloned()))
    }

    fn add(&self, draft: &NewGarage) -> RepoResult<Garage> {
        draft.validate()?;
        let garage = self.write(|tables| {
            tables.last_garage_id += 1;
            let garage = draft.clone().into_garage(tables.last_garage_id);
            tables.garages.push(garage.clone());
            Ok(garage)
        })?;
        self.record(StoreOp::Add {
            kind: EntityKind::Garage,
            id: garage.id,
        });
        Ok(garage)
    }

    fn update(&self, garage: &Garage) -> RepoResult<()> {
        self.update_in(garage, |tables| &mut tables.garages)
    }

    fn remove(&self, garage: &Garage) -> RepoResult<()> {
        self.remove_in(garage, |tables| &mut tables.garages)
    }
}
