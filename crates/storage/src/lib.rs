//! Persistence layer: the sea-orm implementation of the engine's storage
//! traits, plus the in-memory pending-status store.

pub mod entities;
mod repo;
mod status;

pub use status::MemoryStatusStore;

use sea_orm::DatabaseConnection;

/// Database-backed [`engine::Repo`]. Cloning is cheap: the underlying
/// connection is a pool handle.
#[derive(Clone, Debug)]
pub struct Storage {
    db: DatabaseConnection,
}

impl Storage {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}
