//! Integration tests for laabhum-engine.
//!
//! These tests verify the interaction between components:
//! - Order service and store through the wired application
//! - Parent/child cascades
//! - Position monitor driven by stored market conditions

pub mod common;
