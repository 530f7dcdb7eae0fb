//! Locked file I/O for documents and index files.
//!
//! [`DocumentStore`] is the only component that touches the filesystem. It
//! has no notion of indices or queries: it reads and writes one file at a
//! time under an advisory lock and manages collection directories.

mod document_store;

pub use document_store::*;
