//! Core types for EventHub.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod status;
pub mod timestamp;

pub use id::*;
pub use status::*;
