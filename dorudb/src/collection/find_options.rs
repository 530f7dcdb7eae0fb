use crate::filter::Filter;

/// Options controlling a read.
///
/// `FindOptions` carries the filter together with pagination and ordering.
/// Results are always in ascending ID order (or key order on the index path)
/// unless `invert` is set, which reverses it. `offset` and `limit` count
/// matching documents from the start of that order.
///
/// # Examples
///
/// ```rust
/// use dorudb::collection::FindOptions;
/// use dorudb::filter::field;
///
/// let options = FindOptions::new()
///     .filter(field("status").eq("open"))
///     .offset(10)
///     .limit(20)
///     .invert();
///
/// assert_eq!(options.get_limit(), Some(20));
/// assert!(options.is_inverted());
/// ```
#[derive(Clone, Debug, Default)]
pub struct FindOptions {
    pub(crate) filter: Filter,
    pub(crate) limit: Option<usize>,
    pub(crate) offset: usize,
    pub(crate) invert: bool,
    pub(crate) explain: bool,
}

/// Creates `FindOptions` selecting documents that match `filter`.
pub fn where_filter(filter: Filter) -> FindOptions {
    FindOptions::new().filter(filter)
}

/// Creates `FindOptions` returning at most `limit` documents.
pub fn limit_to(limit: usize) -> FindOptions {
    FindOptions::new().limit(limit)
}

/// Creates `FindOptions` skipping the first `offset` matches.
pub fn offset_by(offset: usize) -> FindOptions {
    FindOptions::new().offset(offset)
}

impl FindOptions {
    pub fn new() -> FindOptions {
        FindOptions::default()
    }

    /// Sets the filter. Terms of a previously set filter are kept unless the
    /// new one names the same field.
    pub fn filter(mut self, filter: Filter) -> FindOptions {
        self.filter = std::mem::take(&mut self.filter).and(filter);
        self
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: usize) -> FindOptions {
        self.limit = Some(limit);
        self
    }

    /// Sets the number of matching documents to skip.
    pub fn offset(mut self, offset: usize) -> FindOptions {
        self.offset = offset;
        self
    }

    /// Returns results in descending order.
    pub fn invert(mut self) -> FindOptions {
        self.invert = true;
        self
    }

    /// Records which access path the query used; see
    /// [`Doru::explain`](crate::Doru::explain).
    pub fn explain(mut self) -> FindOptions {
        self.explain = true;
        self
    }

    pub fn get_filter(&self) -> &Filter {
        &self.filter
    }

    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn get_offset(&self) -> usize {
        self.offset
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    pub fn is_explain(&self) -> bool {
        self.explain
    }
}

impl From<Filter> for FindOptions {
    fn from(filter: Filter) -> Self {
        where_filter(filter)
    }
}
