use crate::collection::Document;
use crate::common::loose_equals;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// A single-argument predicate over a field value.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// The condition applied to one field.
///
/// A term is either an exact value (compared with numeric looseness, so `1`
/// matches `1.0`) or a caller-supplied predicate. Both are evaluated through
/// [`FilterTerm::matches`], which is the only dispatch point used by scans and
/// index lookups.
#[derive(Clone)]
pub enum FilterTerm {
    Equals(Value),
    /// Called with the field value on a scan. Through an index it is called
    /// with the normalized key instead, so a numeric string such as `"42"`
    /// arrives as the number `42`.
    Predicate(Predicate),
}

impl FilterTerm {
    /// Evaluates the term against a field value.
    ///
    /// A missing field is evaluated as `null`.
    #[inline]
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FilterTerm::Equals(expected) => loose_equals(value, expected),
            FilterTerm::Predicate(predicate) => predicate(value),
        }
    }

    pub fn is_equals(&self) -> bool {
        matches!(self, FilterTerm::Equals(_))
    }
}

impl Debug for FilterTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterTerm::Equals(value) => write!(f, "== {}", value),
            FilterTerm::Predicate(_) => write!(f, "matches <predicate>"),
        }
    }
}

impl Display for FilterTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

/// A conjunction of per-field terms.
///
/// Each field appears at most once; adding a second term for the same field
/// replaces the first. Insertion order is kept and is the order in which
/// terms are evaluated during a scan.
///
/// # Examples
///
/// ```rust
/// use dorudb::doc;
/// use dorudb::filter::{field, Filter};
///
/// let filter = field("status").eq("open").and(field("priority").gt(1));
/// assert_eq!(filter.len(), 2);
///
/// assert!(filter.apply(&doc! { "status": "open", "priority": 3 }));
/// assert!(!filter.apply(&doc! { "status": "open", "priority": 1 }));
/// ```
#[derive(Clone, Default)]
pub struct Filter {
    terms: IndexMap<String, FilterTerm>,
}

impl Filter {
    /// Creates an empty filter that matches every document.
    pub fn new() -> Self {
        Filter {
            terms: IndexMap::new(),
        }
    }

    /// Adds an exact-match term.
    pub fn eq<T: Into<Value>>(mut self, field: &str, value: T) -> Self {
        self.terms
            .insert(field.to_string(), FilterTerm::Equals(value.into()));
        self
    }

    /// Adds a predicate term.
    pub fn matching<F>(mut self, field: &str, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.terms
            .insert(field.to_string(), FilterTerm::Predicate(Arc::new(predicate)));
        self
    }

    /// Adds an already built term.
    pub fn with_term(mut self, field: &str, term: FilterTerm) -> Self {
        self.terms.insert(field.to_string(), term);
        self
    }

    /// Merges the terms of `other` into this filter.
    pub fn and(mut self, other: Filter) -> Self {
        self.terms.extend(other.terms);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns the term set on `field`, if any.
    pub fn term(&self, field: &str) -> Option<&FilterTerm> {
        self.terms.get(field)
    }

    /// Returns the only field of a single-term filter.
    pub fn single_field(&self) -> Option<&str> {
        if self.terms.len() == 1 {
            self.terms.keys().next().map(|k| k.as_str())
        } else {
            None
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterTerm)> {
        self.terms.iter()
    }

    /// Returns `true` when the document satisfies every term.
    ///
    /// Evaluation stops at the first failing term.
    pub fn apply(&self, document: &Document) -> bool {
        for (field, term) in &self.terms {
            let value = document.get(field).unwrap_or(&Value::Null);
            if !term.matches(value) {
                return false;
            }
        }
        true
    }

}

impl Debug for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.terms.iter()).finish()
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .terms
            .iter()
            .map(|(field, term)| format!("{} {}", field, term))
            .collect();
        write!(f, "({})", parts.join(" && "))
    }
}
