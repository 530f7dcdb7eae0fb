use crate::collection::{Document, DocumentId};
use crate::common::{parse_document_key, validate_collection_name, MAX_DOC_ID};
use crate::errors::{DoruError, DoruResult, ErrorKind};
use crate::store::DocumentStore;
use dashmap::DashMap;
use std::ops::Deref;
use std::sync::Arc;

/// Document writes and per-collection ID allocation.
#[derive(Clone)]
pub(crate) struct WriteOperations {
    inner: Arc<WriteOperationsInner>,
}

impl WriteOperations {
    pub fn new(store: DocumentStore) -> Self {
        WriteOperations {
            inner: Arc::new(WriteOperationsInner {
                store,
                counters: DashMap::new(),
            }),
        }
    }
}

impl Deref for WriteOperations {
    type Target = WriteOperationsInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub(crate) struct WriteOperationsInner {
    store: DocumentStore,
    // last ID handed out or seen, per collection
    counters: DashMap<String, u64>,
}

impl WriteOperationsInner {
    /// Seeds the counter of `collection` from the highest document on disk.
    pub fn seed_counter(&self, collection: &str) -> DoruResult<u64> {
        let highest = self.highest_id(collection)?;
        self.counters.insert(collection.to_string(), highest);
        log::debug!("Counter for {} seeded at {}", collection, highest);
        Ok(highest)
    }

    /// Returns the next ID for `collection`.
    pub fn allocate_id(&self, collection: &str) -> DoruResult<u64> {
        validate_collection_name(collection)?;
        self.ensure_seeded(collection)?;

        let mut counter = self.counters.entry(collection.to_string()).or_insert(0);
        if *counter >= MAX_DOC_ID {
            log::error!("ID space of {} is exhausted", collection);
            return Err(DoruError::new(
                &format!("No IDs left in collection {}", collection),
                ErrorKind::InternalError,
            ));
        }
        *counter += 1;
        Ok(*counter)
    }

    pub fn create(&self, collection: &str, mut document: Document) -> DoruResult<Document> {
        validate_collection_name(collection)?;
        self.store.ensure_collection(collection)?;

        let id = match document.id()? {
            Some(id) => {
                self.advance_counter(collection, id)?;
                id
            }
            None => {
                let id = self.allocate_id(collection)?;
                document.set_id(id);
                id
            }
        };

        let path = self.store.document_path(collection, id);
        if self.store.exists(&path) {
            log::error!("Document {} already exists in {}", id, collection);
            return Err(DoruError::new(
                &format!("Duplicate ID {} in collection {}", id, collection),
                ErrorKind::DuplicateId,
            ));
        }

        self.store.write(&path, &document)?;
        log::debug!("Created document {} in {}", id, collection);
        Ok(document)
    }

    pub fn update(&self, collection: &str, document: Document) -> DoruResult<Document> {
        validate_collection_name(collection)?;

        let id = match document.id()? {
            Some(id) if id != 0 => id,
            _ => {
                log::error!("Update on {} without document ID", collection);
                return Err(DoruError::new(
                    "Object does not have an ID",
                    ErrorKind::MissingId,
                ));
            }
        };

        self.store.ensure_collection(collection)?;
        self.advance_counter(collection, id)?;
        self.store
            .write(&self.store.document_path(collection, id), &document)?;
        log::debug!("Updated document {} in {}", id, collection);
        Ok(document)
    }

    pub fn delete<T: DocumentId>(&self, collection: &str, target: T) -> DoruResult<bool> {
        validate_collection_name(collection)?;
        let id = target.document_id()?;
        let removed = self.store.remove(&self.store.document_path(collection, id))?;
        log::debug!("Delete of {} in {}: {}", id, collection, removed);
        Ok(removed)
    }

    pub fn truncate(&self, collection: &str) -> DoruResult<bool> {
        validate_collection_name(collection)?;
        let removed = self.store.remove_collection(collection)?;
        self.counters.remove(collection);
        if removed {
            log::info!("Truncated collection {}", collection);
        }
        Ok(removed)
    }

    fn ensure_seeded(&self, collection: &str) -> DoruResult<()> {
        if !self.counters.contains_key(collection) {
            let highest = self.highest_id(collection)?;
            self.counters.entry(collection.to_string()).or_insert(highest);
        }
        Ok(())
    }

    fn advance_counter(&self, collection: &str, id: u64) -> DoruResult<()> {
        self.ensure_seeded(collection)?;
        let mut counter = self.counters.entry(collection.to_string()).or_insert(0);
        if id > *counter {
            *counter = id;
        }
        Ok(())
    }

    fn highest_id(&self, collection: &str) -> DoruResult<u64> {
        match self.store.list(collection, true)?.first() {
            Some(key) => parse_document_key(key),
            None => Ok(0),
        }
    }
}
