use crate::collection::Document;
use crate::common::{
    document_key, index_file_name, is_document_key, FileLock, LockMode, LockPolicy,
};
use crate::errors::{DoruError, DoruResult, ErrorKind};
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File-per-document storage rooted at one directory.
///
/// The store reads and writes single files under advisory locks and manages
/// collection directories. It knows nothing about indices or queries.
///
/// Layout:
///
/// ```text
/// <root>/<collection>/<10-digit id>    one document, compact JSON
/// <root>/<collection>.<field>          one index file
/// ```
///
/// Reads take a shared lock, writes an exclusive one, both acquired by
/// bounded polling with the store's [`LockPolicy`].
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<DocumentStoreInner>,
}

impl DocumentStore {
    /// Creates a store handle over `root`. Nothing is touched on disk.
    pub fn new<P: AsRef<Path>>(root: P, policy: LockPolicy) -> Self {
        DocumentStore {
            inner: Arc::new(DocumentStoreInner {
                root: root.as_ref().to_path_buf(),
                policy,
            }),
        }
    }
}

impl Deref for DocumentStore {
    type Target = DocumentStoreInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct DocumentStoreInner {
    root: PathBuf,
    policy: LockPolicy,
}

impl DocumentStoreInner {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn policy(&self) -> &LockPolicy {
        &self.policy
    }

    /// Creates the store root (and parents) if it does not exist.
    pub fn ensure_root(&self) -> DoruResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            log::error!("Failed to create store root {}: {}", self.root.display(), e);
            DoruError::new_with_cause(
                &format!("Failed to create store root {}", self.root.display()),
                ErrorKind::IOError,
                e.into(),
            )
        })
    }

    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    pub fn document_path(&self, collection: &str, id: u64) -> PathBuf {
        self.collection_path(collection).join(document_key(id))
    }

    pub fn index_path(&self, collection: &str, field: &str) -> PathBuf {
        self.root.join(index_file_name(collection, field))
    }

    /// Reads the document stored at `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist, is empty, or does not
    /// hold a JSON object.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::LockTimeout`] if the shared lock is not granted within the
    /// policy budget; [`ErrorKind::IOError`] for other I/O failures.
    pub fn read(&self, path: &Path) -> DoruResult<Option<Document>> {
        match self.read_json::<Value>(path)? {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(Document::from(map))),
            Some(_) => {
                log::warn!("{} does not hold a JSON object, ignoring", path.display());
                Ok(None)
            }
        }
    }

    /// Writes `document` to `path`, replacing prior content.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::LockTimeout`] if the exclusive lock is not granted within
    /// the policy budget.
    pub fn write(&self, path: &Path, document: &Document) -> DoruResult<()> {
        self.write_json(path, document)
    }

    /// Reads and decodes any JSON file under a shared lock.
    ///
    /// Missing, empty and undecodable files all read as `None`; the last two
    /// are logged.
    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> DoruResult<Option<T>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error("open", path, e)),
        };

        let bytes = {
            let _lock = FileLock::acquire(&file, LockMode::Shared, &self.policy, &display(path))?;
            let mut bytes = Vec::new();
            (&file)
                .read_to_end(&mut bytes)
                .map_err(|e| self.io_error("read", path, e))?;
            bytes
        };

        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            log::debug!("{} is empty", path.display());
            return Ok(None);
        }

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::warn!("Could not decode {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    /// Encodes `value` as compact JSON and writes it under an exclusive lock.
    ///
    /// The file is truncated only once the lock is held. Data is not synced
    /// to disk.
    pub fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> DoruResult<()> {
        let bytes = serde_json::to_vec(value)?;

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| self.io_error("open", path, e))?;

        let _lock = FileLock::acquire(&file, LockMode::Exclusive, &self.policy, &display(path))?;
        file.set_len(0)
            .map_err(|e| self.io_error("truncate", path, e))?;
        (&file)
            .write_all(&bytes)
            .map_err(|e| self.io_error("write", path, e))?;
        Ok(())
    }

    /// Returns `true` if a file exists at `path`.
    pub fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Deletes the file at `path`; `false` if there was nothing to delete.
    pub fn remove(&self, path: &Path) -> DoruResult<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.io_error("remove", path, e)),
        }
    }

    pub fn collection_exists(&self, collection: &str) -> bool {
        self.collection_path(collection).is_dir()
    }

    /// Creates the collection directory with owner-only permissions.
    /// Idempotent.
    pub fn ensure_collection(&self, collection: &str) -> DoruResult<()> {
        let path = self.collection_path(collection);
        if path.is_dir() {
            return Ok(());
        }

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(crate::common::COLLECTION_DIR_MODE);
        }

        builder.create(&path).map_err(|e| {
            log::error!("Failed to create collection {}: {}", collection, e);
            self.io_error("create", &path, e)
        })?;
        log::debug!("Created collection directory {}", path.display());
        Ok(())
    }

    /// Lists the document keys of `collection` in ascending order, or
    /// descending when `invert` is set.
    ///
    /// Hidden entries and names that are not document keys are skipped. A
    /// missing collection lists as empty.
    pub fn list(&self, collection: &str, invert: bool) -> DoruResult<Vec<String>> {
        let path = self.collection_path(collection);
        let entries = match fs::read_dir(&path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error("list", &path, e)),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.io_error("list", &path, e))?;
            if let Some(name) = entry.file_name().to_str() {
                if is_document_key(name) {
                    keys.push(name.to_string());
                }
            }
        }

        let keys = keys.into_iter().sorted();
        Ok(if invert {
            keys.rev().collect()
        } else {
            keys.collect()
        })
    }

    /// Removes every file of `collection` and then its directory.
    ///
    /// Returns `false` if the collection did not exist.
    pub fn remove_collection(&self, collection: &str) -> DoruResult<bool> {
        let path = self.collection_path(collection);
        let entries = match fs::read_dir(&path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(self.io_error("list", &path, e)),
        };

        for entry in entries {
            let entry = entry.map_err(|e| self.io_error("list", &path, e))?;
            let file = entry.path();
            if file.is_file() {
                self.remove(&file)?;
            }
        }

        fs::remove_dir(&path).map_err(|e| self.io_error("remove", &path, e))?;
        log::debug!("Removed collection directory {}", path.display());
        Ok(true)
    }

    /// Names of all non-hidden entries directly under the root, sorted.
    pub fn root_entries(&self) -> DoruResult<Vec<(String, bool)>> {
        let entries = fs::read_dir(&self.root).map_err(|e| self.io_error("list", &self.root, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.io_error("list", &self.root, e))?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                log::warn!("Skipping non UTF-8 entry {:?}", entry.file_name());
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let is_dir = entry.path().is_dir();
            names.push((name, is_dir));
        }
        names.sort();
        Ok(names)
    }

    fn io_error(&self, action: &str, path: &Path, err: std::io::Error) -> DoruError {
        log::error!("Failed to {} {}: {}", action, path.display(), err);
        DoruError::new_with_cause(
            &format!("Failed to {} {}", action, path.display()),
            ErrorKind::IOError,
            err.into(),
        )
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
