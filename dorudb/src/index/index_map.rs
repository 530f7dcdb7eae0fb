use super::IndexKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The IDs recorded under one index key.
///
/// A key held by a single document is stored as a bare integer; the second
/// distinct ID turns it into an array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexEntry {
    Single(u64),
    Multi(Vec<u64>),
}

impl IndexEntry {
    pub fn contains(&self, id: u64) -> bool {
        match self {
            IndexEntry::Single(existing) => *existing == id,
            IndexEntry::Multi(ids) => ids.contains(&id),
        }
    }

    /// Records `id`, returning `false` if it was already present.
    pub fn add(&mut self, id: u64) -> bool {
        match self {
            IndexEntry::Single(existing) if *existing == id => false,
            IndexEntry::Single(existing) => {
                *self = IndexEntry::Multi(vec![*existing, id]);
                true
            }
            IndexEntry::Multi(ids) if ids.contains(&id) => false,
            IndexEntry::Multi(ids) => {
                ids.push(id);
                true
            }
        }
    }

    pub fn ids(&self) -> &[u64] {
        match self {
            IndexEntry::Single(id) => std::slice::from_ref(id),
            IndexEntry::Multi(ids) => ids,
        }
    }

    pub fn len(&self) -> usize {
        self.ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids().is_empty()
    }
}

/// The persisted content of an index file.
///
/// `options` is opaque caller metadata and is omitted from the file when
/// unset. `kv` is always written in key order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    #[serde(default)]
    pub kv: BTreeMap<IndexKey, IndexEntry>,
}

impl IndexFile {
    pub fn new(options: Option<Value>) -> Self {
        IndexFile {
            options,
            kv: BTreeMap::new(),
        }
    }

    /// Records `id` under `key`. Returns `false` if nothing changed.
    pub fn insert(&mut self, key: IndexKey, id: u64) -> bool {
        match self.kv.get_mut(&key) {
            Some(entry) => entry.add(id),
            None => {
                self.kv.insert(key, IndexEntry::Single(id));
                true
            }
        }
    }

    /// Total number of recorded IDs across all keys.
    pub fn id_count(&self) -> usize {
        self.kv.values().map(IndexEntry::len).sum()
    }
}
