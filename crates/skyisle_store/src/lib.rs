//! Persistence engine for islands: backend selection, schema setup, the
//! per-kind in-memory repositories and the [`IslandStore`] that coordinates
//! them.

pub mod config;
pub mod connection;
pub mod datastore;
mod db;
pub mod migration;
pub mod outcome;
pub mod record;
pub mod repository;
pub mod store;

pub use skyisle_core::*;

pub use config::{DatabaseConfig, IsleConfig, NetworkConfig, PoolConfig};
pub use connection::connect;
pub use datastore::{default_sqlite_path, load_or_init_config, open_store};
pub use outcome::{BlockTally, DemoteOutcome, Denial, Outcome, Placement};
pub use record::Record;
pub use repository::{FlushReport, Flushable, Repository};
pub use store::IslandStore;
