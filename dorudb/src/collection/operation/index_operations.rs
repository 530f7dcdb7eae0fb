use super::read_operations::read_collection;
use crate::collection::Document;
use crate::common::{validate_collection_name, validate_field_name};
use crate::errors::DoruResult;
use crate::index::FieldIndex;
use crate::store::DocumentStore;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

type IndexTable = BTreeMap<String, BTreeMap<String, FieldIndex>>;

/// Tracks the indices known to an open store and maintains them.
#[derive(Clone)]
pub(crate) struct IndexOperations {
    inner: Arc<IndexOperationsInner>,
}

impl IndexOperations {
    pub fn new(store: DocumentStore) -> Self {
        IndexOperations {
            inner: Arc::new(IndexOperationsInner {
                store,
                table: RwLock::new(BTreeMap::new()),
            }),
        }
    }
}

impl Deref for IndexOperations {
    type Target = IndexOperationsInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub(crate) struct IndexOperationsInner {
    store: DocumentStore,
    table: RwLock<IndexTable>,
}

impl IndexOperationsInner {
    /// Starts tracking the index on `collection.field`, returning the
    /// existing handle if it is already tracked.
    pub fn track(&self, collection: &str, field: &str) -> FieldIndex {
        if let Some(index) = self.get(collection, field) {
            return index;
        }

        let mut table = self.table.write();
        table
            .entry(collection.to_string())
            .or_default()
            .entry(field.to_string())
            .or_insert_with(|| {
                log::debug!("Tracking index {}.{}", collection, field);
                FieldIndex::new(self.store.clone(), collection, field)
            })
            .clone()
    }

    pub fn get(&self, collection: &str, field: &str) -> Option<FieldIndex> {
        self.table
            .read()
            .get(collection)
            .and_then(|fields| fields.get(field))
            .cloned()
    }

    pub fn has_index(&self, collection: &str, field: &str) -> bool {
        self.get(collection, field).is_some()
    }

    /// Indexed fields of `collection` in name order.
    pub fn indexed_fields(&self, collection: &str) -> Vec<String> {
        self.table
            .read()
            .get(collection)
            .map(|fields| fields.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn indices_of(&self, collection: &str) -> Vec<FieldIndex> {
        self.table
            .read()
            .get(collection)
            .map(|fields| fields.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Creates the index if needed and rebuilds it from every document of
    /// the collection.
    ///
    /// # Returns
    ///
    /// The number of documents scanned.
    pub fn rebuild_index(
        &self,
        collection: &str,
        field: &str,
        options: Option<Value>,
    ) -> DoruResult<usize> {
        validate_collection_name(collection)?;
        validate_field_name(field)?;

        let index = self.track(collection, field);
        let documents = read_collection(&self.store, collection)?;
        let scanned = index.rebuild(&documents, options)?;
        log::info!(
            "Rebuilt index {}.{} from {} documents",
            collection,
            field,
            scanned
        );
        Ok(scanned)
    }

    /// Adds `documents` to the index on `collection.field`. Does nothing when
    /// no such index is tracked.
    pub fn update_index(
        &self,
        collection: &str,
        field: &str,
        documents: &[Document],
    ) -> DoruResult<()> {
        match self.get(collection, field) {
            Some(index) => index.update(documents),
            None => {
                log::debug!("No index on {}.{}, update skipped", collection, field);
                Ok(())
            }
        }
    }

    pub fn update_index_value(&self, collection: &str, field: &str, input: &Value) -> DoruResult<()> {
        match self.get(collection, field) {
            Some(index) => index.update_value(input),
            None => {
                log::debug!("No index on {}.{}, update skipped", collection, field);
                Ok(())
            }
        }
    }

    /// Adds `documents` to every index of `collection`.
    pub fn update_all(&self, collection: &str, documents: &[Document]) -> DoruResult<()> {
        for index in self.indices_of(collection) {
            index.update(documents)?;
        }
        Ok(())
    }

    /// Deletes the index file, if any, and stops tracking it.
    pub fn remove_index(&self, collection: &str, field: &str) -> DoruResult<()> {
        validate_collection_name(collection)?;
        validate_field_name(field)?;

        let index = self.untrack(collection, field);
        let index = index.unwrap_or_else(|| FieldIndex::new(self.store.clone(), collection, field));
        index.drop_file()?;
        log::info!("Removed index {}.{}", collection, field);
        Ok(())
    }

    fn untrack(&self, collection: &str, field: &str) -> Option<FieldIndex> {
        let mut table = self.table.write();
        let fields = table.get_mut(collection)?;
        let removed = fields.remove(field);
        if fields.is_empty() {
            table.remove(collection);
        }
        removed
    }
}
