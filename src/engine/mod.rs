//! Engine module
//!
//! The four pure-logic engines behind the console: dynamic goods pricing,
//! business income accrual, credit obligations, and privateer tenure.
//! Engines mutate in-memory records and take `now` explicitly; persistence
//! belongs to the handlers.

pub mod accrual;
pub mod credit;
pub mod pricing;
pub mod privateer;

pub use accrual::{Building, BuildingKind};
pub use credit::Credit;
pub use pricing::{GoodPrice, PriceDefaults};
pub use privateer::{Privateer, ShipKind};
