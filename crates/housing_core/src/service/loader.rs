//! Dependent record loading for a selected house.

use crate::model::{Address, DependentFilter, Garage, House};
use crate::repo::{RepoResult, Repository};

/// Addresses and garages owned by `house`, in store order.
///
/// `None` yields two empty lists without touching the store.
pub fn load_dependents<S>(
    store: &S,
    house: Option<&House>,
) -> RepoResult<(Vec<Address>, Vec<Garage>)>
where
    S: Repository<Address> + Repository<Garage>,
{
    let Some(house) = house else {
        return Ok((Vec::new(), Vec::new()));
    };

    let filter = DependentFilter::of_house(house.id);
    let addresses = Repository::<Address>::fetch_where(store, &filter)?;
    let garages = Repository::<Garage>::fetch_where(store, &filter)?;
    Ok((addresses, garages))
}
