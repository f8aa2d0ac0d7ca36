//! Explicit in-memory view state handed to a presentation layer.
//!
//! # Responsibility
//! - Hold the house/address/garage lists a UI renders.
//! - Expose replace/update/remove operations instead of change events.
//!
//! # Invariants
//! - Every mutation bumps the list `revision`; callers diff by comparing
//!   revisions or `ViewSnapshot`s.
//! - `replace_entity` never changes list length or order.

use crate::model::{Address, Entity, Garage, House};
use crate::service::filter::FilterInput;
use serde::Serialize;

/// Ordered list with a change counter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewList<T> {
    items: Vec<T>,
    revision: u64,
}

impl<T> Default for ViewList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            revision: 0,
        }
    }
}

impl<T> ViewList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Clear-then-repopulate.
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.revision += 1;
    }

    /// Overwrites the first element matching `predicate` in place.
    ///
    /// Returns the index written, or `None` (list untouched) when no element
    /// matches.
    pub fn replace_where(&mut self, predicate: impl Fn(&T) -> bool, item: T) -> Option<usize> {
        let index = self.items.iter().position(predicate)?;
        self.items[index] = item;
        self.revision += 1;
        Some(index)
    }

    /// Removes the first element matching `predicate`.
    pub fn remove_where(&mut self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        let index = self.items.iter().position(predicate)?;
        self.revision += 1;
        Some(self.items.remove(index))
    }
}

impl<T: Entity> ViewList<T> {
    pub fn position_of(&self, id: i64) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn replace_entity(&mut self, entity: T) -> Option<usize> {
        let id = entity.id();
        self.replace_where(|item| item.id() == id, entity)
    }

    pub fn remove_entity(&mut self, id: i64) -> Option<T> {
        self.remove_where(|item| item.id() == id)
    }
}

/// Selection slot state machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "house", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Unselected,
    Selected(House),
}

impl Selection {
    pub fn house(&self) -> Option<&House> {
        match self {
            Self::Unselected => None,
            Self::Selected(house) => Some(house),
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected(_))
    }
}

/// Owned copy of the whole view state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub houses: ViewList<House>,
    pub addresses: ViewList<Address>,
    pub garages: ViewList<Garage>,
    pub floors_options: Vec<i32>,
    pub filter: FilterInput,
    pub selection: Selection,
}
