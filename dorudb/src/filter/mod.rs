//! Filters for selecting documents.
//!
//! A [`Filter`] is a set of per-field terms that must all hold. A term is an
//! exact value or a predicate:
//!
//! ```rust
//! use dorudb::filter::{field, Filter};
//!
//! let open = field("status").eq("open");
//! let recent = Filter::new().matching("year", |v| v.as_u64().is_some_and(|y| y >= 2020));
//! let both = open.and(recent);
//! assert_eq!(both.len(), 2);
//! ```
//!
//! A filter with exactly one term on an indexed field is answered from the
//! index; every other filter is evaluated during a full collection scan.

mod filter;
mod fluent;

pub use filter::*;
pub use fluent::*;
