use crate::common::{DOC_ID, MAX_DOC_ID};
use crate::errors::{DoruError, DoruResult, ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Debug, Display, Formatter};

/// A schemaless JSON record stored as one file in a collection.
///
/// A document is an ordered map from field name to [`serde_json::Value`].
/// Field order is the insertion order and is kept when the document is
/// written. Once persisted a document always carries an integer `id` field;
/// every other field is free-form.
///
/// Documents are plain values: reading the same ID twice parses the file
/// twice and yields two independent documents.
///
/// # Examples
///
/// ```rust
/// use dorudb::doc;
///
/// let mut task = doc! { "title": "write docs", "status": "open" };
/// task.put("priority", 2).unwrap();
///
/// assert_eq!(task.get("status").and_then(|v| v.as_str()), Some("open"));
/// assert_eq!(task.id().unwrap(), None);
/// ```
#[derive(Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    data: Map<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document { data: Map::new() }
    }

    /// Builds a document from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidInput`] unless `value` is a JSON object.
    pub fn from_value(value: Value) -> DoruResult<Document> {
        match value {
            Value::Object(data) => Ok(Document { data }),
            other => Err(DoruError::new(
                &format!("Input must be a JSON object, found {}", type_name(&other)),
                ErrorKind::InvalidInput,
            )),
        }
    }

    /// Converts the document into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.data)
    }

    /// Associates `value` with `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`] for an empty key.
    pub fn put<T: Into<Value>>(&mut self, key: &str, value: T) -> DoruResult<()> {
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(DoruError::new(
                "Document does not support empty key",
                ErrorKind::InvalidArgument,
            ));
        }
        self.data.insert(key.to_string(), value.into());
        Ok(())
    }

    /// Returns the value of a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Removes a field and returns its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Field names in insertion order.
    pub fn fields(&self) -> Vec<&str> {
        self.data.keys().map(|k| k.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    /// Reads the document ID.
    ///
    /// Returns `Ok(None)` when the document has no `id` field (or it is
    /// `null`).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::TypeMismatch`] if `id` is present but is not an
    /// integer between 0 and [`MAX_DOC_ID`].
    pub fn id(&self) -> DoruResult<Option<u64>> {
        match self.data.get(DOC_ID) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) if n.as_u64().is_some_and(|id| id <= MAX_DOC_ID) => {
                Ok(n.as_u64())
            }
            Some(other) => {
                log::error!("Document ID must be an integer, found {}", other);
                Err(DoruError::new(
                    &format!("ID must be an integer. Provided: {}", other),
                    ErrorKind::TypeMismatch,
                ))
            }
        }
    }

    pub fn has_id(&self) -> bool {
        matches!(self.id(), Ok(Some(_)))
    }

    /// Sets the `id` field, keeping its position if it already exists.
    pub fn set_id(&mut self, id: u64) {
        self.data.insert(DOC_ID.to_string(), Value::from(id));
    }

    /// Serializes the document to compact JSON.
    ///
    /// Numbers stay numbers and neither non-ASCII characters nor slashes are
    /// escaped.
    pub fn to_json(&self) -> DoruResult<String> {
        Ok(serde_json::to_string(&self.data)?)
    }

    /// Parses a document from JSON text.
    pub fn from_json(text: &str) -> DoruResult<Document> {
        let value: Value = serde_json::from_str(text)?;
        Document::from_value(value)
    }
}

impl TryFrom<Value> for Document {
    type Error = DoruError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Document::from_value(value)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(data: Map<String, Value>) -> Self {
        Document { data }
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        document.into_value()
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(&self.data) {
            Ok(text) => write!(f, "{}", text),
            Err(_) => write!(f, "<unprintable document>"),
        }
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Document({})", self)
    }
}

/// Anything that identifies a stored document: a bare ID or the document
/// itself.
pub trait DocumentId {
    fn document_id(&self) -> DoruResult<u64>;
}

impl DocumentId for u64 {
    fn document_id(&self) -> DoruResult<u64> {
        Ok(*self)
    }
}

impl DocumentId for Document {
    fn document_id(&self) -> DoruResult<u64> {
        self.id()?.ok_or_else(|| {
            DoruError::new("Object does not have an ID", ErrorKind::MissingId)
        })
    }
}

impl<T: DocumentId + ?Sized> DocumentId for &T {
    fn document_id(&self) -> DoruResult<u64> {
        (**self).document_id()
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Creates a [`Document`] from JSON-like syntax.
///
/// Accepts exactly what [`serde_json::json!`] accepts inside an object
/// literal.
///
/// ```rust
/// use dorudb::doc;
///
/// let empty = doc! {};
/// assert!(empty.is_empty());
///
/// let task = doc! { "id": 3, "tags": ["a", "b"], "owner": { "name": "kim" } };
/// assert_eq!(task.id().unwrap(), Some(3));
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::collection::Document::new()
    };

    ($($json:tt)+) => {
        $crate::collection::Document::from(
            match $crate::serde_json::json!({ $($json)+ }) {
                $crate::serde_json::Value::Object(map) => map,
                _ => unreachable!("object literal always yields an object"),
            },
        )
    };
}
