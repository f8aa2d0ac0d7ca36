//! Core data access for the housing registry.
//! Houses, their addresses and garages: filtering, selection, edits and
//! cascade deletes over a pluggable store, with an explicit view state.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::{
    Address, AddressId, DependentFilter, Entity, EntityKind, Garage, GarageId, House,
    HouseFilter, HouseId, NewAddress, NewGarage, NewHouse, ValidationError,
};
pub use repo::{
    HousingStore, MemoryHousingStore, RepoError, RepoResult, Repository, SqliteHousingStore,
    StoreOp, UnitOfWork,
};
pub use service::browser::{HouseBrowser, FLOORS_OPTIONS};
pub use service::filter::{compose_filter, search, FilterInput};
pub use service::loader::load_dependents;
pub use service::mutation::{cascade_delete_house, update_entity, CascadeReport};
pub use service::ServiceError;
pub use view::{Selection, ViewList, ViewSnapshot};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
