pub mod accessor;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;

pub use accessor::{AccessorError, DataAccessor, Entity};
pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryAccessor;

/// Backing store the running server was started with
#[derive(Clone)]
pub enum Storage {
    Memory,
    Postgres(DatabaseManager),
}

impl Storage {
    pub fn label(&self) -> &'static str {
        match self {
            Storage::Memory => "memory",
            Storage::Postgres(_) => "postgres",
        }
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        match self {
            Storage::Memory => Ok(()),
            Storage::Postgres(db) => db.health_check().await,
        }
    }

    pub async fn close(&self) {
        if let Storage::Postgres(db) = self {
            db.close().await;
        }
    }
}
