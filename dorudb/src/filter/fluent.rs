use super::{Filter, FilterTerm};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

/// Starts a single-field filter.
///
/// Every method returns a one-term [`Filter`] that can be combined with
/// [`Filter::and`]. Comparison methods are predicates, so on the index path
/// they are evaluated once per stored key.
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    /// Matches documents whose field equals `value`.
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new().eq(&self.field_name, value)
    }

    /// Matches documents whose field differs from `value`.
    pub fn ne<T: Into<Value>>(self, value: T) -> Filter {
        let expected = value.into();
        self.predicate(move |v| !FilterTerm::Equals(expected.clone()).matches(v))
    }

    pub fn gt<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(value.into(), |o| o == Ordering::Greater)
    }

    pub fn gte<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(value.into(), |o| o != Ordering::Less)
    }

    pub fn lt<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(value.into(), |o| o == Ordering::Less)
    }

    pub fn lte<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(value.into(), |o| o != Ordering::Greater)
    }

    /// Matches documents whose field equals any of `values`.
    pub fn in_array<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        let terms: Vec<FilterTerm> = values
            .into_iter()
            .map(|v| FilterTerm::Equals(v.into()))
            .collect();
        self.predicate(move |v| terms.iter().any(|t| t.matches(v)))
    }

    /// Matches documents for which `predicate` returns `true`.
    pub fn matches<F>(self, predicate: F) -> Filter
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.predicate(predicate)
    }

    fn predicate<F>(self, predicate: F) -> Filter
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Filter::new().with_term(&self.field_name, FilterTerm::Predicate(Arc::new(predicate)))
    }

    fn compare<F>(self, bound: Value, accept: F) -> Filter
    where
        F: Fn(Ordering) -> bool + Send + Sync + 'static,
    {
        self.predicate(move |v| compare_values(v, &bound).is_some_and(&accept))
    }
}

/// Orders two scalars of the same family; numbers numerically, strings
/// lexicographically. Anything else is unordered.
fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
