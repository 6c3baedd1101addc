//! Store module
//!
//! Persistence layer: one repository per record family, PostgreSQL via sqlx.
//! Repositories load plain records, hand them to the engines, and write the
//! mutated state back; they hold no game logic of their own.

pub mod buildings;
pub mod catalog;
pub mod convicts;
pub mod credits;
pub mod prices;
pub mod privateers;
pub mod sessions;

pub use buildings::BuildingRepository;
pub use catalog::{CatalogEntry, CatalogRepository, Category};
pub use convicts::{Convict, ConvictRepository};
pub use credits::CreditRepository;
pub use prices::GoodPriceRepository;
pub use privateers::PrivateerRepository;
pub use sessions::{Session, SessionRepository};

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}
