use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// A field value that can be stored as an index key.
///
/// Booleans, numbers and strings are indexable. Keys order booleans first,
/// then numbers (by numeric value), then strings (lexicographically).
///
/// Index files are JSON objects, so a key is persisted as its text form. A
/// string that spells a canonical integer, a canonical float, `true` or
/// `false` is read back as that number or boolean. The same normalisation is
/// applied to values before they are indexed, so `"42"` and `42` share one
/// slot whether the index was just built or reloaded.
///
/// ```rust
/// use dorudb::index::IndexKey;
/// use serde_json::json;
///
/// let a = IndexKey::from_value(&json!("42")).unwrap();
/// let b = IndexKey::from_value(&json!(42)).unwrap();
/// assert_eq!(a, b);
/// assert!(IndexKey::from_value(&json!(null)).is_none());
/// ```
#[derive(Clone, Debug)]
pub enum IndexKey {
    Bool(bool),
    Number(Number),
    String(String),
}

impl IndexKey {
    /// Converts a field value to a key; `None` for values that are not
    /// indexed (`null`, arrays and objects).
    pub fn from_value(value: &Value) -> Option<IndexKey> {
        match value {
            Value::Bool(b) => Some(IndexKey::Bool(*b)),
            Value::Number(n) => Some(IndexKey::Number(n.clone())),
            Value::String(s) => Some(IndexKey::from_text(s)),
            _ => None,
        }
    }

    /// Parses the persisted text form of a key.
    pub fn from_text(text: &str) -> IndexKey {
        match text {
            "true" => return IndexKey::Bool(true),
            "false" => return IndexKey::Bool(false),
            _ => {}
        }

        if let Some(number) = canonical_number(text) {
            return IndexKey::Number(number);
        }
        IndexKey::String(text.to_string())
    }

    pub fn to_value(&self) -> Value {
        match self {
            IndexKey::Bool(b) => Value::Bool(*b),
            IndexKey::Number(n) => Value::Number(n.clone()),
            IndexKey::String(s) => Value::String(s.clone()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            IndexKey::Bool(_) => 0,
            IndexKey::Number(_) => 1,
            IndexKey::String(_) => 2,
        }
    }
}

/// Returns the number spelled by `text` if `text` is exactly how that
/// number prints.
fn canonical_number(text: &str) -> Option<Number> {
    let first = text.bytes().next()?;
    if !(first.is_ascii_digit() || first == b'-') {
        return None;
    }

    let number = if let Ok(i) = text.parse::<i64>() {
        Number::from(i)
    } else if let Ok(u) = text.parse::<u64>() {
        Number::from(u)
    } else {
        Number::from_f64(text.parse::<f64>().ok()?)?
    };

    (number.to_string() == text).then_some(number)
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x.cmp(&y);
    }
    // an i64 that does not fit u64 is negative, a u64 that does not fit i64
    // is above i64::MAX
    match (a.is_f64(), b.is_f64()) {
        (false, false) => {
            if a.as_i64().is_some() {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        _ => {
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
    }
}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (IndexKey::Bool(a), IndexKey::Bool(b)) => a.cmp(b),
            (IndexKey::Number(a), IndexKey::Number(b)) => compare_numbers(a, b),
            (IndexKey::String(a), IndexKey::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for IndexKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IndexKey {}

impl Display for IndexKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKey::Bool(b) => write!(f, "{}", b),
            IndexKey::Number(n) => write!(f, "{}", n),
            IndexKey::String(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for IndexKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for IndexKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = IndexKey;

            fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
                f.write_str("an index key string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<IndexKey, E> {
                Ok(IndexKey::from_text(v))
            }
        }

        deserializer.deserialize_str(KeyVisitor)
    }
}
