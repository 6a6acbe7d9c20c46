//! Order management for Laabhum.
//!
//! # Key Components
//!
//! - [`OrderService`]: create, submit, execute, cancel and modify orders;
//!   scalper sizing; CTC orders; position close
//! - [`CascadeEngine`]: parent/child bulk and single-child operations
//! - [`OrderRequest`]: typed client request with boundary validation
//! - [`scalper_quantity`]: risk-based sizing

pub mod cascade;
pub mod requests;
pub mod service;
pub mod sizing;

pub use cascade::CascadeEngine;
pub use requests::{OrderChanges, OrderRequest, RequestedType};
pub use service::{CloseReason, OrderService, OrderServiceConfig};
pub use sizing::{scalper_quantity, DEFAULT_ACCOUNT_BALANCE};
