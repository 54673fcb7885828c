//! Infrastructure Layer - External Technology Stack
//!
//! Concrete implementations that depend on external libraries.
//!
//! # Responsibilities
//! - Configuration files (TOML via `toml`)
//! - Identifier generation (`uuid`)

pub mod config;
pub mod ids;

pub use config::SynchronizerConfig;
pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
