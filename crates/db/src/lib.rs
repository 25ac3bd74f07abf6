//! Model layer, schema revisions, and migration runner for Hallmark.
//!
//! This crate provides:
//! - `SeaORM` entity definitions and the schema metadata derived from them
//! - Ordered schema revisions
//! - The migration runner, in offline (SQL script) and online (live database) modes

pub mod entities;
pub mod metadata;
pub mod migration;
pub mod runner;

pub use metadata::SchemaMetadata;
pub use runner::{MigrationError, MigrationMode, MigrationRuntime, RunReport};
