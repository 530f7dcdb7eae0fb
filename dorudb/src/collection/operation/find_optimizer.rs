use crate::collection::{AccessPath, FindOptions, FindPlan};

/// Chooses the access path for a read.
///
/// A filter with exactly one term on a field that has an index is answered
/// from that index. Anything else, including an empty filter or several
/// terms where one of them is indexed, is a full collection scan.
#[derive(Clone, Copy, Default)]
pub(crate) struct FindOptimizer;

impl FindOptimizer {
    pub fn new() -> Self {
        FindOptimizer
    }

    pub fn create_find_plan(&self, options: &FindOptions, indexed_fields: &[String]) -> FindPlan {
        let filter = options.get_filter();
        let access_path = match filter.single_field() {
            Some(field) if indexed_fields.iter().any(|f| f == field) => {
                AccessPath::Index(field.to_string())
            }
            _ => AccessPath::FullScan,
        };

        let plan = FindPlan::new(
            access_path,
            filter.clone(),
            options.get_offset(),
            options.get_limit(),
            options.is_inverted(),
        );
        log::debug!("Planned {} for filter {}", plan, filter);
        plan
    }
}
