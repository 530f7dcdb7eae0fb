//! Documents, query options and the operations behind a collection.
//!
//! A collection is a directory of documents, one file per document, named
//! after the document's zero-padded ID. Collections are created implicitly by
//! the first write and removed by [`Doru::truncate`](crate::Doru::truncate).
//!
//! ```rust,no_run
//! use dorudb::{doc, Doru};
//! use dorudb::collection::FindOptions;
//! use dorudb::filter::field;
//!
//! # fn main() -> dorudb::errors::DoruResult<()> {
//! let db = Doru::open("db")?;
//! db.create("tasks", doc! { "title": "ship it", "status": "open" })?;
//!
//! let open = db.find_all("tasks", &FindOptions::new().filter(field("status").eq("open")))?;
//! assert_eq!(open.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Document IDs
//!
//! Every stored document has an integer `id`. It is either supplied by the
//! caller or taken from a per-collection counter, which is seeded from the
//! highest ID on disk when the store is opened.

mod document;
mod find_options;
mod find_plan;
pub(crate) mod operation;

pub use document::*;
pub use find_options::*;
pub use find_plan::*;
