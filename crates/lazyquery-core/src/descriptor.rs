use crate::{filter::FilterExpr, sort::SortSpec};
use serde::{Deserialize, Serialize};

///
/// FetchDescriptor
///
/// Immutable bundle describing a pending fetch: entity kind, filter, sort
/// spec, and limit. Mutable only through the consuming builder methods
/// below; every chaining operation on a query copies the descriptor before
/// touching it.
///
/// An unbound descriptor (no entity kind) is legal to construct and carry;
/// evaluating one is an error.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct FetchDescriptor {
    pub entity: Option<String>,
    pub filter: Option<FilterExpr>,
    pub sort: SortSpec,
    pub limit: Option<u32>,
}

impl FetchDescriptor {
    #[must_use]
    pub fn unbound() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_entity(entity: impl Into<String>) -> Self {
        Self {
            entity: Some(entity.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.entity.is_some()
    }

    /// AND-combine a filter into the descriptor. Filters accumulate,
    /// never replace; sort, limit, and entity are untouched.
    #[must_use]
    pub fn merge_filter(mut self, expr: FilterExpr) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(expr),
            None => expr,
        });
        self
    }

    /// Replace the sort spec wholesale. Sorting does not chain.
    #[must_use]
    pub fn replace_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    /// Replace the limit. `Some(0)` means "fetch nothing", which is
    /// distinct from `None` ("unbounded").
    #[must_use]
    pub const fn replace_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Bind the descriptor to an entity kind. Filter, sort, and limit
    /// carry over unchanged.
    #[must_use]
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortKey;

    #[test]
    fn filters_accumulate() {
        let descriptor = FetchDescriptor::for_entity("Article")
            .merge_filter(FilterExpr::eq("name", "Sara"))
            .merge_filter(FilterExpr::gt("age", 25));

        match descriptor.filter {
            Some(FilterExpr::And(children)) => assert_eq!(children.len(), 2),
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn sort_replaces() {
        let descriptor = FetchDescriptor::for_entity("Article")
            .replace_sort(SortSpec::new(vec![SortKey::asc("name")]))
            .replace_sort(SortSpec::new(vec![SortKey::desc("date")]));

        assert_eq!(*descriptor.sort, vec![SortKey::desc("date")]);
    }

    #[test]
    fn limit_zero_is_not_unset() {
        let unset = FetchDescriptor::for_entity("Article");
        let zero = FetchDescriptor::for_entity("Article").replace_limit(0);

        assert_eq!(unset.limit, None);
        assert_eq!(zero.limit, Some(0));
        assert_ne!(unset, zero);
    }

    #[test]
    fn survives_json_round_trip() {
        let descriptor = FetchDescriptor::for_entity("Article")
            .merge_filter(FilterExpr::gt("views", 20))
            .replace_sort(SortSpec::new(vec![SortKey::desc("views")]))
            .replace_limit(10);

        let json = serde_json::to_string(&descriptor).unwrap();
        let back: FetchDescriptor = serde_json::from_str(&json).unwrap();

        assert_eq!(back, descriptor);
    }

    #[test]
    fn binding_preserves_refinements() {
        let descriptor = FetchDescriptor::unbound()
            .merge_filter(FilterExpr::eq("name", "Sara"))
            .replace_limit(5)
            .with_entity("Article");

        assert!(descriptor.is_bound());
        assert!(descriptor.filter.is_some());
        assert_eq!(descriptor.limit, Some(5));
    }
}
