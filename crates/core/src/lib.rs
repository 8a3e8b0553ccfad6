//! EventHub Core - Shared types library.
//!
//! This crate provides the typed records exchanged with the EventHub REST API:
//! - `admin` - Server-rendered administration panel
//! - `cli` - Command-line tools for scripted admin operations
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O and no HTTP clients. Every
//! payload is parsed into one of these records at the boundary, so a response
//! with an unexpected shape fails at decode time instead of rendering blanks.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, status enums and timestamp parsing
//! - [`models`] - Teambuilding, event, registration and dashboard records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
