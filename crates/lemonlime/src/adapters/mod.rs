//! Adapters Layer - Ports & Adapters Pattern
//!
//! Connects the blocking advance loop to the host's execution model.
//!
//! # Hexagonal Architecture
//! - Inbound: caller threads register and pop events directly on the domain
//! - Outbound: [`BangDriver`] owns the background thread running the loop

pub mod driver;

pub use driver::{BangDriver, DriverHandle};
