//! Secondary indices on single document fields.
//!
//! A [`FieldIndex`] maps the values of one top-level field to the IDs of the
//! documents holding them. It lives in its own file next to the collection
//! directory and is maintained explicitly, either by a full rebuild from the
//! collection or by incremental updates with specific documents.

mod field_index;
mod index_key;
mod index_map;

pub use field_index::*;
pub use index_key::*;
pub use index_map::*;
