//! `SeaORM` entities and the schema metadata derived from them.

pub mod admin_users;
pub mod reports;

use once_cell::sync::Lazy;

use crate::metadata::SchemaMetadata;

static METADATA: Lazy<SchemaMetadata> = Lazy::new(|| {
    SchemaMetadata::new()
        .with_entity::<reports::Entity>()
        .with_entity::<admin_users::Entity>()
});

/// Schema metadata for every entity in the model layer.
///
/// Built once and owned here for the life of the process; callers only borrow it.
#[must_use]
pub fn metadata() -> &'static SchemaMetadata {
    &METADATA
}
