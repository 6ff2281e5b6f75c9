//! # waitroom-core
//!
//! Core crate for the waitroom slot broker. Contains configuration
//! schemas, typed identifiers, the snapshot-store trait, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other waitroom crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
