//! Store-side halves of the update and cascade-delete actions.
//!
//! # Invariants
//! - Each action ends in exactly one `persist`, or a `discard` on failure.
//! - Updates copy mutable fields onto the persisted row; ids and
//!   `house_id` are never taken from the edited value.
//! - Cascade delete removes addresses, then garages, then the house.

use crate::model::{Address, DependentFilter, Entity, Garage, House};
use crate::repo::{HousingStore, RepoResult, Repository, UnitOfWork};
use crate::service::ServiceError;
use log::warn;

/// Row counts removed by [`cascade_delete_house`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeReport {
    pub house_id: i64,
    pub addresses_removed: usize,
    pub garages_removed: usize,
}

/// Applies the mutable fields of `edited` to the stored row and persists.
///
/// Returns the row as persisted. `NotFound` when `edited.id()` is unknown, in
/// which case nothing is written.
pub fn update_entity<T, S>(store: &S, edited: &T) -> Result<T, ServiceError>
where
    T: Entity,
    S: Repository<T> + UnitOfWork,
{
    let Some(mut current) = store.fetch_by_id(edited.id())? else {
        return Err(ServiceError::NotFound {
            kind: T::KIND,
            id: edited.id(),
        });
    };

    current.apply_edits(edited);
    run_unit(store, || store.update(&current))?;
    Ok(current)
}

/// Removes `house` and every address and garage referencing it in one unit.
pub fn cascade_delete_house<S: HousingStore>(
    store: &S,
    house: &House,
) -> Result<CascadeReport, ServiceError> {
    run_unit(store, || {
        let dependents = DependentFilter::of_house(house.id);

        let addresses = Repository::<Address>::fetch_where(store, &dependents)?;
        if !addresses.is_empty() {
            Repository::<Address>::remove_range(store, &addresses)?;
        }

        let garages = Repository::<Garage>::fetch_where(store, &dependents)?;
        if !garages.is_empty() {
            Repository::<Garage>::remove_range(store, &garages)?;
        }

        Repository::<House>::remove(store, house)?;

        Ok(CascadeReport {
            house_id: house.id,
            addresses_removed: addresses.len(),
            garages_removed: garages.len(),
        })
    })
}

fn run_unit<S, R>(store: &S, work: impl FnOnce() -> RepoResult<R>) -> Result<R, ServiceError>
where
    S: UnitOfWork + ?Sized,
{
    match work() {
        Ok(value) => {
            store.persist()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(discard_err) = store.discard() {
                warn!("event=unit_discard module=service status=error error={discard_err}");
            }
            Err(err.into())
        }
    }
}
