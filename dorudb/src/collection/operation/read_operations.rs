use super::find_optimizer::FindOptimizer;
use super::index_operations::IndexOperations;
use crate::collection::{Document, FindOptions, FindPlan};
use crate::common::validate_collection_name;
use crate::errors::{DoruError, DoruResult, ErrorKind};
use crate::store::DocumentStore;
use itertools::Itertools;
use std::ops::Deref;
use std::sync::Arc;

/// Reads every readable document of `collection` in ID order.
pub(crate) fn read_collection(store: &DocumentStore, collection: &str) -> DoruResult<Vec<Document>> {
    let dir = store.collection_path(collection);
    let mut documents = Vec::new();
    for key in store.list(collection, false)? {
        if let Some(document) = store.read(&dir.join(&key))? {
            documents.push(document);
        }
    }
    Ok(documents)
}

#[derive(Clone)]
pub(crate) struct ReadOperations {
    inner: Arc<ReadOperationsInner>,
}

impl ReadOperations {
    pub fn new(store: DocumentStore, index_operations: IndexOperations, count_scan_fallback: bool) -> Self {
        ReadOperations {
            inner: Arc::new(ReadOperationsInner {
                store,
                index_operations,
                find_optimizer: FindOptimizer::new(),
                count_scan_fallback,
            }),
        }
    }
}

impl Deref for ReadOperations {
    type Target = ReadOperationsInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub(crate) struct ReadOperationsInner {
    store: DocumentStore,
    index_operations: IndexOperations,
    find_optimizer: FindOptimizer,
    count_scan_fallback: bool,
}

impl ReadOperationsInner {
    pub fn find_by_id(&self, collection: &str, id: u64) -> DoruResult<Option<Document>> {
        validate_collection_name(collection)?;
        self.store.read(&self.store.document_path(collection, id))
    }

    pub fn create_find_plan(&self, collection: &str, options: &FindOptions) -> FindPlan {
        let indexed_fields = self.index_operations.indexed_fields(collection);
        self.find_optimizer.create_find_plan(options, &indexed_fields)
    }

    /// Plans and runs a read, returning the plan alongside the documents.
    pub fn find_all(&self, collection: &str, options: &FindOptions) -> DoruResult<(FindPlan, Vec<Document>)> {
        validate_collection_name(collection)?;
        let plan = self.create_find_plan(collection, options);

        let index = plan
            .index_field()
            .and_then(|field| self.index_operations.get(collection, field));

        let documents = match index {
            Some(index) => {
                let keys = index.lookup(options)?;
                self.collect_matches(collection, keys.into_iter().unique(), &plan)?
            }
            None => {
                let keys = self.store.list(collection, plan.invert())?;
                if plan.filter().is_empty() {
                    self.read_page(collection, keys, &plan)?
                } else {
                    self.collect_matches(collection, keys.into_iter(), &plan)?
                }
            }
        };

        log::debug!(
            "{} on {} returned {} documents",
            plan,
            collection,
            documents.len()
        );
        Ok((plan, documents))
    }

    /// Counts documents matching the filter of `options`, ignoring offset
    /// and limit.
    pub fn count(&self, collection: &str, options: &FindOptions) -> DoruResult<usize> {
        validate_collection_name(collection)?;
        let filter = options.get_filter();
        if filter.is_empty() {
            return Ok(self.store.list(collection, false)?.len());
        }

        let plan = self.create_find_plan(collection, options);
        if let Some(index) = plan
            .index_field()
            .and_then(|field| self.index_operations.get(collection, field))
        {
            return Ok(index.lookup(options)?.into_iter().unique().count());
        }

        if !self.count_scan_fallback {
            log::error!("Count on {} needs an index for filter {}", collection, filter);
            return Err(DoruError::new(
                &format!(
                    "Count on {} supports only a single indexed field or no filter",
                    collection
                ),
                ErrorKind::UnsupportedQuery,
            ));
        }

        let dir = self.store.collection_path(collection);
        let mut count = 0;
        for key in self.store.list(collection, false)? {
            if let Some(document) = self.store.read(&dir.join(&key))? {
                if filter.apply(&document) {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    fn read_page(&self, collection: &str, keys: Vec<String>, plan: &FindPlan) -> DoruResult<Vec<Document>> {
        let dir = self.store.collection_path(collection);
        let page = keys
            .into_iter()
            .skip(plan.offset())
            .take(plan.limit().unwrap_or(usize::MAX));

        let mut documents = Vec::new();
        for key in page {
            if let Some(document) = self.store.read(&dir.join(&key))? {
                documents.push(document);
            }
        }
        Ok(documents)
    }

    fn collect_matches<I>(&self, collection: &str, keys: I, plan: &FindPlan) -> DoruResult<Vec<Document>>
    where
        I: Iterator<Item = String>,
    {
        let dir = self.store.collection_path(collection);
        let mut documents = Vec::new();
        let mut skipped = 0;

        for key in keys {
            if plan.limit().is_some_and(|limit| documents.len() >= limit) {
                break;
            }

            let Some(document) = self.store.read(&dir.join(&key))? else {
                log::debug!("Candidate {}/{} is gone, skipping", collection, key);
                continue;
            };
            if !plan.filter().apply(&document) {
                continue;
            }
            if skipped < plan.offset() {
                skipped += 1;
                continue;
            }
            documents.push(document);
        }
        Ok(documents)
    }
}
