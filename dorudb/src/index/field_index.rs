use super::{IndexFile, IndexKey};
use crate::collection::{Document, FindOptions};
use crate::common::document_key;
use crate::errors::{DoruError, DoruResult, ErrorKind};
use crate::filter::FilterTerm;
use crate::store::DocumentStore;
use serde_json::Value;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

/// A secondary index over one top-level field of one collection.
///
/// The index is persisted as a single file, `<root>/<collection>.<field>`,
/// holding `{"options": ..., "kv": {...}}`. Each operation reads the file
/// afresh and rewrites it in full, so the index never caches content between
/// calls and changes made by another process are picked up.
///
/// The index is not kept in sync with document writes automatically. Stale
/// entries are tolerated: callers re-check documents read through it.
#[derive(Clone)]
pub struct FieldIndex {
    inner: Arc<FieldIndexInner>,
}

impl FieldIndex {
    pub fn new(store: DocumentStore, collection: &str, field: &str) -> Self {
        let path = store.index_path(collection, field);
        FieldIndex {
            inner: Arc::new(FieldIndexInner {
                store,
                collection: collection.to_string(),
                field: field.to_string(),
                path,
            }),
        }
    }
}

impl Deref for FieldIndex {
    type Target = FieldIndexInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct FieldIndexInner {
    store: DocumentStore,
    collection: String,
    field: String,
    path: PathBuf,
}

impl FieldIndexInner {
    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Loads the index file; a missing or unreadable file is an empty index.
    pub fn load(&self) -> DoruResult<IndexFile> {
        Ok(self.store.read_json::<IndexFile>(&self.path)?.unwrap_or_default())
    }

    /// Returns the opaque options stored with the index.
    pub fn options(&self) -> DoruResult<Option<Value>> {
        Ok(self.load()?.options)
    }

    /// Replaces the mapping with one built from `documents`.
    ///
    /// Options given here replace the stored ones; `None` keeps what the file
    /// already carries.
    ///
    /// # Returns
    ///
    /// The number of documents scanned.
    pub fn rebuild(&self, documents: &[Document], options: Option<Value>) -> DoruResult<usize> {
        let options = match options {
            Some(options) => Some(options),
            None => self.load()?.options,
        };

        let mut file = IndexFile::new(options);
        for document in documents {
            self.index_document(&mut file, document);
        }

        self.save(&file)?;
        log::debug!(
            "Rebuilt index {} from {} documents, {} keys",
            self.path.display(),
            documents.len(),
            file.kv.len()
        );
        Ok(documents.len())
    }

    /// Incorporates `documents` without discarding unrelated entries.
    ///
    /// Documents without the field, with an unindexable value, or without an
    /// integer ID are skipped. Applying the same documents twice leaves the
    /// index unchanged.
    pub fn update(&self, documents: &[Document]) -> DoruResult<()> {
        let mut file = self.load()?;
        let mut changed = 0usize;
        for document in documents {
            if self.index_document(&mut file, document) {
                changed += 1;
            }
        }

        self.save(&file)?;
        log::debug!(
            "Updated index {}: {} of {} documents added entries",
            self.path.display(),
            changed,
            documents.len()
        );
        Ok(())
    }

    /// Like [`update`](Self::update) for raw JSON input.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidInput`] unless `input` is an object or an array of
    /// objects.
    pub fn update_value(&self, input: &Value) -> DoruResult<()> {
        let documents = match input {
            Value::Object(map) => vec![Document::from(map.clone())],
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => Ok(Document::from(map.clone())),
                    _ => Err(invalid_input()),
                })
                .collect::<DoruResult<Vec<_>>>()?,
            _ => return Err(invalid_input()),
        };
        self.update(&documents)
    }

    /// Lists the document keys recorded in this index.
    ///
    /// Only the filter term on this index's own field is applied: an exact
    /// value selects the matching key, a predicate is called with each key.
    /// Without a term every ID is returned. IDs follow key order, reversed
    /// when `options` asks for inverted results. Offset and limit are not
    /// applied here.
    pub fn lookup(&self, options: &FindOptions) -> DoruResult<Vec<String>> {
        let file = self.load()?;
        let term = options.get_filter().term(&self.field);

        let mut keys = Vec::new();
        for (key, entry) in &file.kv {
            if let Some(term) = term {
                if !key_matches(term, key) {
                    continue;
                }
            }
            keys.extend(entry.ids().iter().map(|id| document_key(*id)));
        }

        if options.is_inverted() {
            keys.reverse();
        }
        Ok(keys)
    }

    /// Removes the index file. A missing file is not an error.
    pub fn drop_file(&self) -> DoruResult<()> {
        if !self.store.remove(&self.path)? {
            log::debug!("Index file {} was already absent", self.path.display());
        }
        Ok(())
    }

    fn save(&self, file: &IndexFile) -> DoruResult<()> {
        self.store.write_json(&self.path, file)
    }

    fn index_document(&self, file: &mut IndexFile, document: &Document) -> bool {
        let Some(key) = document.get(&self.field).and_then(IndexKey::from_value) else {
            return false;
        };

        match document.id() {
            Ok(Some(id)) => file.insert(key, id),
            Ok(None) => {
                log::warn!(
                    "Skipping document without ID while indexing {}.{}",
                    self.collection,
                    self.field
                );
                false
            }
            Err(e) => {
                log::warn!(
                    "Skipping document while indexing {}.{}: {}",
                    self.collection,
                    self.field,
                    e
                );
                false
            }
        }
    }
}

fn key_matches(term: &FilterTerm, key: &IndexKey) -> bool {
    match term {
        FilterTerm::Equals(expected) => IndexKey::from_value(expected).is_some_and(|k| &k == key),
        FilterTerm::Predicate(_) => term.matches(&key.to_value()),
    }
}

fn invalid_input() -> DoruError {
    log::error!("Index input must be an object or an array of objects");
    DoruError::new(
        "Input must be an object or an array of objects.",
        ErrorKind::InvalidInput,
    )
}
