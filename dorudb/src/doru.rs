use crate::collection::operation::{IndexOperations, ReadOperations, WriteOperations};
use crate::collection::{Document, DocumentId, FindOptions};
use crate::common::{parse_index_file_name, validate_collection_name, INDEX_NAME_SEPARATOR};
use crate::doru_builder::DoruBuilder;
use crate::doru_config::DoruConfig;
use crate::errors::DoruResult;
use crate::store::DocumentStore;
use parking_lot::Mutex;
use serde_json::Value;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

/// An open DoruDB store.
///
/// `Doru` is the entry point for every operation: document CRUD, queries,
/// counting and index maintenance. The handle is cheap to clone and can be
/// shared between threads; all clones see the same counters and index table.
///
/// Coordination with other handles or processes working on the same root
/// happens only through advisory file locks. Writes and index updates are
/// separate steps: `create`, `update` and `delete` never touch indices, so
/// callers update them explicitly (or use [`create_and_index`] /
/// [`update_and_index`]).
///
/// [`create_and_index`]: DoruInner::create_and_index
/// [`update_and_index`]: DoruInner::update_and_index
///
/// # Examples
///
/// ```rust,no_run
/// use dorudb::{doc, Doru};
/// use dorudb::collection::FindOptions;
/// use dorudb::filter::field;
///
/// # fn main() -> dorudb::errors::DoruResult<()> {
/// let db = Doru::open("db")?;
///
/// db.create("tasks", doc! { "title": "a", "status": "open" })?;
/// db.create("tasks", doc! { "title": "b", "status": "closed" })?;
/// db.rebuild_index("tasks", "status", None)?;
///
/// let options = FindOptions::new().filter(field("status").eq("open")).explain();
/// let open = db.find_all("tasks", &options)?;
/// assert_eq!(open.len(), 1);
/// assert_eq!(db.explain().as_deref(), Some("Index used: status"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Doru {
    inner: Arc<DoruInner>,
}

impl Doru {
    /// Returns a builder for configuring the store before opening it.
    pub fn builder() -> DoruBuilder {
        DoruBuilder::new()
    }

    /// Opens the store rooted at `path` with default settings.
    pub fn open<P: AsRef<Path>>(path: P) -> DoruResult<Doru> {
        DoruBuilder::new().path(path).open()
    }

    pub(crate) fn initialize(config: DoruConfig) -> DoruResult<Doru> {
        let store = DocumentStore::new(config.path(), config.lock_policy());
        let index_operations = IndexOperations::new(store.clone());
        let read_operations = ReadOperations::new(
            store.clone(),
            index_operations.clone(),
            config.count_scan_fallback(),
        );
        let write_operations = WriteOperations::new(store.clone());

        let inner = DoruInner {
            config,
            store,
            index_operations,
            read_operations,
            write_operations,
            last_explain: Mutex::new(None),
        };
        inner.bootstrap()?;

        Ok(Doru {
            inner: Arc::new(inner),
        })
    }
}

impl Deref for Doru {
    type Target = DoruInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct DoruInner {
    config: DoruConfig,
    store: DocumentStore,
    index_operations: IndexOperations,
    read_operations: ReadOperations,
    write_operations: WriteOperations,
    last_explain: Mutex<Option<String>>,
}

impl DoruInner {
    /// Creates the root if needed, tracks the index files found there and
    /// seeds each collection's ID counter.
    fn bootstrap(&self) -> DoruResult<()> {
        self.store.ensure_root()?;
        #[cfg(not(unix))]
        log::warn!("File locking is not available on this platform, concurrent access is unprotected");

        let mut collections = 0;
        let mut indices = 0;
        for (name, is_dir) in self.store.root_entries()? {
            if name.contains(INDEX_NAME_SEPARATOR) {
                match parse_index_file_name(&name) {
                    Some((collection, field)) if validate_collection_name(collection).is_ok() => {
                        self.index_operations.track(collection, field);
                        indices += 1;
                    }
                    _ => log::warn!("Ignoring {} in store root: not an index file", name),
                }
            } else if is_dir {
                if validate_collection_name(&name).is_ok() {
                    self.write_operations.seed_counter(&name)?;
                    collections += 1;
                } else {
                    log::warn!("Ignoring directory {} in store root", name);
                }
            }
        }

        log::info!(
            "Opened store at {} with {} collections and {} indices",
            self.store.root().display(),
            collections,
            indices
        );
        Ok(())
    }

    pub fn config(&self) -> &DoruConfig {
        &self.config
    }

    /// Root directory of the store.
    pub fn path(&self) -> &Path {
        self.store.root()
    }

    /// Reserves the next auto-assigned ID of `collection`.
    ///
    /// The first ID of an empty collection is 1. Counters live in memory
    /// only; a reopened store continues after the highest stored ID.
    pub fn allocate_id(&self, collection: &str) -> DoruResult<u64> {
        self.write_operations.allocate_id(collection)
    }

    /// Stores a new document and returns it with its `id`.
    ///
    /// The collection is created if it does not exist. A document without
    /// `id` gets the next counter value.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - empty or malformed collection name
    /// * `TypeMismatch` - `id` is present but not a non-negative integer
    /// * `DuplicateId` - a document with this `id` already exists
    /// * `LockTimeout` - the document file stayed locked
    pub fn create(&self, collection: &str, document: Document) -> DoruResult<Document> {
        self.write_operations.create(collection, document)
    }

    /// Writes `document` under its `id`, replacing any stored version.
    ///
    /// # Errors
    ///
    /// * `MissingId` - the document has no `id`, or `id` is 0
    /// * `TypeMismatch` - `id` is not a non-negative integer
    pub fn update(&self, collection: &str, document: Document) -> DoruResult<Document> {
        self.write_operations.update(collection, document)
    }

    /// Deletes a document given by ID or by value. Returns `false` if there
    /// was nothing to delete.
    pub fn delete<T: DocumentId>(&self, collection: &str, target: T) -> DoruResult<bool> {
        self.write_operations.delete(collection, target)
    }

    /// Removes every document of `collection` and its directory. Returns
    /// `false` if the collection does not exist. Indices are left alone.
    pub fn truncate(&self, collection: &str) -> DoruResult<bool> {
        self.write_operations.truncate(collection)
    }

    pub fn find_by_id(&self, collection: &str, id: u64) -> DoruResult<Option<Document>> {
        self.read_operations.find_by_id(collection, id)
    }

    /// Returns the first document `find_all` would return.
    pub fn find(&self, collection: &str, options: &FindOptions) -> DoruResult<Option<Document>> {
        let options = options.clone().limit(1);
        Ok(self.find_all(collection, &options)?.into_iter().next())
    }

    /// Returns the documents selected by `options`.
    ///
    /// A filter with a single term on an indexed field is answered through the
    /// index; each candidate is still read and re-checked, so stale index
    /// entries never leak into results. Any other filter scans the collection
    /// in ID order.
    pub fn find_all(&self, collection: &str, options: &FindOptions) -> DoruResult<Vec<Document>> {
        let (plan, documents) = self.read_operations.find_all(collection, options)?;
        if options.is_explain() {
            *self.last_explain.lock() = Some(plan.description());
        }
        Ok(documents)
    }

    /// Counts documents matching the filter of `options`. Offset and limit
    /// are ignored.
    ///
    /// Through an index the result is the number of distinct index
    /// candidates; documents are not re-read. A stale index can therefore
    /// over-count, and so can mixed key types: `"42"` and `42` share one
    /// index key, so a filter on either counts both while `find_all`
    /// returns only the documents that compare equal.
    ///
    /// # Errors
    ///
    /// `UnsupportedQuery` for a non-indexed filter when scan counting is
    /// disabled in the configuration.
    pub fn count(&self, collection: &str, options: &FindOptions) -> DoruResult<usize> {
        if options.is_explain() {
            let plan = self.read_operations.create_find_plan(collection, options);
            *self.last_explain.lock() = Some(plan.description());
        }
        self.read_operations.count(collection, options)
    }

    /// The access path of the last `find_all`, `find` or `count` issued with
    /// `explain` set.
    pub fn explain(&self) -> Option<String> {
        self.last_explain.lock().clone()
    }

    /// Creates the index on `collection.field` if needed and fills it from
    /// every document in the collection.
    ///
    /// `options` is stored with the index as opaque metadata; `None` keeps
    /// options the index file already has.
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
        self.index_operations.rebuild_index(collection, field, options)
    }

    /// Adds `documents` to the index on `collection.field`. Does nothing if
    /// there is no such index.
    pub fn update_index(&self, collection: &str, field: &str, documents: &[Document]) -> DoruResult<()> {
        self.index_operations.update_index(collection, field, documents)
    }

    /// Like [`update_index`](Self::update_index) for raw JSON: an object or an
    /// array of objects.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for any other JSON value.
    pub fn update_index_value(&self, collection: &str, field: &str, input: &Value) -> DoruResult<()> {
        self.index_operations.update_index_value(collection, field, input)
    }

    /// Deletes the index file and stops using the index.
    pub fn remove_index(&self, collection: &str, field: &str) -> DoruResult<()> {
        self.index_operations.remove_index(collection, field)
    }

    /// Creates a document, then adds it to every index of the collection.
    ///
    /// The two steps are not atomic: if the index update fails, the document
    /// is stored but not indexed.
    pub fn create_and_index(&self, collection: &str, document: Document) -> DoruResult<Document> {
        let stored = self.create(collection, document)?;
        self.index_operations
            .update_all(collection, std::slice::from_ref(&stored))?;
        Ok(stored)
    }

    /// Updates a document, then adds it to every index of the collection.
    pub fn update_and_index(&self, collection: &str, document: Document) -> DoruResult<Document> {
        let stored = self.update(collection, document)?;
        self.index_operations
            .update_all(collection, std::slice::from_ref(&stored))?;
        Ok(stored)
    }

    pub fn has_index(&self, collection: &str, field: &str) -> bool {
        self.index_operations.has_index(collection, field)
    }

    /// Indexed fields of `collection` in name order.
    pub fn list_indices(&self, collection: &str) -> Vec<String> {
        self.index_operations.indexed_fields(collection)
    }

    /// Returns `true` if the collection directory exists.
    pub fn has_collection(&self, collection: &str) -> bool {
        validate_collection_name(collection).is_ok() && self.store.collection_exists(collection)
    }
}
