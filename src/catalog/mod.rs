//! Mod catalog layer
//!
//! # Modules
//!
//! - [`types`]: `Mod`, `Artifact`, `ModVersion` and friends
//! - [`database`]: Trait for the locally synchronized catalog
//! - [`sqlite`]: SQLite-backed catalog database
//! - [`provider`]: Trait for remote catalog queries
//! - [`modrinth`]: HTTP provider for Modrinth-compatible APIs
//! - [`error`]: Error types for storage and remote operations

pub mod database;
pub mod error;
pub mod modrinth;
pub mod provider;
pub mod sqlite;
pub mod types;
