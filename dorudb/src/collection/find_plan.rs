use crate::filter::Filter;
use std::fmt::{Display, Formatter};

/// How a read will reach its documents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessPath {
    /// Candidates come from the index on the named field.
    Index(String),
    /// Every document of the collection is a candidate.
    FullScan,
}

/// An execution plan for a read, produced by the query planner.
///
/// The plan fixes the access path and carries the filter and pagination to
/// apply to the candidates.
#[derive(Clone, Debug)]
pub struct FindPlan {
    access_path: AccessPath,
    filter: Filter,
    offset: usize,
    limit: Option<usize>,
    invert: bool,
}

impl FindPlan {
    pub(crate) fn new(
        access_path: AccessPath,
        filter: Filter,
        offset: usize,
        limit: Option<usize>,
        invert: bool,
    ) -> Self {
        FindPlan {
            access_path,
            filter,
            offset,
            limit,
            invert,
        }
    }

    pub fn access_path(&self) -> &AccessPath {
        &self.access_path
    }

    /// Returns the indexed field when the plan reads through an index.
    pub fn index_field(&self) -> Option<&str> {
        match &self.access_path {
            AccessPath::Index(field) => Some(field),
            AccessPath::FullScan => None,
        }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn invert(&self) -> bool {
        self.invert
    }

    /// One-line description of the access path.
    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl Display for FindPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.access_path {
            AccessPath::Index(field) => write!(f, "Index used: {}", field),
            AccessPath::FullScan => write!(f, "Full scan: no index used"),
        }
    }
}
