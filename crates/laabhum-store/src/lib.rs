//! In-memory store for the Laabhum order-management core.
//!
//! [`Repository`] owns every entity map (orders, positions, trades, scalper
//! and CTC orders, market conditions) behind one reader/writer lock. No
//! persistence: state lives for the life of the process.

pub mod filter;
pub mod repository;

pub use filter::OrderFilter;
pub use repository::{Inserted, Repository, StatusUpdate};
