//! Configuration management for the capability runtime.
//!
//! [`schema`] defines the typed settings and their defaults; [`loader`] reads
//! them from an optional JSON file and applies environment overrides.

#![warn(missing_docs, clippy::pedantic)]

pub mod loader;
pub mod schema;

pub use loader::{load, load_from};
pub use schema::RuntimeConfig;
