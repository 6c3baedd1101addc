//! colony_ledger Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod audit;
pub mod domain;
pub mod engine;
pub mod handlers;
pub mod store;

// Private modules (used only by the binaries)
pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use domain::{DomainError, ModeratorContext, Money, MoneyError, Table};
pub use engine::{Building, BuildingKind, Credit, GoodPrice, PriceDefaults, Privateer, ShipKind};
pub use error::{AppError, AppResult};
