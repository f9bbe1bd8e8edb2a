//! Core type definitions used across the SyncTime workspace.

pub mod filter;
pub mod id;

pub use filter::{StatusFilter, TypeFilter};
pub use id::*;
