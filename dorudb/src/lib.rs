//! # DoruDB - Embedded JSON Document Store
//!
//! DoruDB keeps each JSON document in its own file, groups documents into
//! directory-based collections and offers optional single-field secondary
//! indices. There is no server: the library works directly on a directory and
//! coordinates concurrent readers and writers, in one process or several,
//! through advisory file locks.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dorudb::{doc, Doru};
//! use dorudb::collection::FindOptions;
//! use dorudb::filter::field;
//!
//! # fn main() -> dorudb::errors::DoruResult<()> {
//! let db = Doru::open("db")?;
//!
//! // IDs are assigned when absent
//! let task = db.create("tasks", doc! { "title": "write docs", "status": "open" })?;
//! assert_eq!(task.id()?, Some(1));
//!
//! // Indices are explicit and kept up to date by the caller
//! db.rebuild_index("tasks", "status", None)?;
//!
//! let open = db.find_all("tasks", &FindOptions::new().filter(field("status").eq("open")))?;
//! assert_eq!(open.len(), 1);
//! assert_eq!(db.count("tasks", &FindOptions::new())?, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## On-disk Layout
//!
//! ```text
//! <root>/tasks/0000000001      document 1 of "tasks", compact JSON
//! <root>/tasks.status          index on field "status" of "tasks"
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents, query options and plans
//! - [`common`] - Constants, file locking and naming helpers
//! - [`errors`] - Error types and result definitions
//! - [`filter`] - Field filters
//! - [`index`] - Secondary indices
//! - [`store`] - Locked file I/O
//! - [`doru`] - The store handle
//! - [`doru_builder`] - Builder for opening a store
//! - [`doru_config`] - Store configuration

pub mod collection;
pub mod common;
pub mod doru;
pub mod doru_builder;
pub mod doru_config;
pub mod errors;
pub mod filter;
pub mod index;
pub mod store;

pub use doru::Doru;
pub use doru_builder::DoruBuilder;
pub use doru_config::DoruConfig;

#[doc(hidden)]
pub use serde_json;

#[cfg(test)]
#[ctor::ctor]
fn init() {
    colog::init();
}
