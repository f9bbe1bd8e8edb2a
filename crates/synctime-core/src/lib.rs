//! # synctime-core
//!
//! Core crate for the SyncTime notification client. Contains configuration
//! schemas, typed identifiers, filter facets, and the unified error system.
//!
//! This crate has **no** internal dependencies on other SyncTime crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
