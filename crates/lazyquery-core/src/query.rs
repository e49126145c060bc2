use crate::{
    bind::{BindError, BindingRules},
    descriptor::FetchDescriptor,
    error::{Error, EvalError},
    filter::{self, FilterExpr, FilterMap},
    obs::{self, QueryEvent},
    sort::{self, Collation, SortDirection, SortKey, SortSpec},
    traits::DataContext,
};
use std::{cell::OnceCell, fmt};

///
/// FilterSource
///
/// The three accepted filter inputs: a prebuilt expression, a dictionary,
/// or a store-native text predicate.
///

#[derive(Clone, Debug)]
pub enum FilterSource {
    Expr(FilterExpr),
    Map(FilterMap),
    Text(String),
}

impl From<FilterExpr> for FilterSource {
    fn from(expr: FilterExpr) -> Self {
        Self::Expr(expr)
    }
}

impl From<FilterMap> for FilterSource {
    fn from(map: FilterMap) -> Self {
        Self::Map(map)
    }
}

impl From<&str> for FilterSource {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for FilterSource {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

///
/// QueryKey
///
/// Input to the unified keyed-access dispatch point, [`Query::key`].
///

#[derive(Clone, Debug)]
pub enum QueryKey {
    Expr(FilterExpr),
    Map(FilterMap),
    Str(String),
}

impl From<FilterExpr> for QueryKey {
    fn from(expr: FilterExpr) -> Self {
        Self::Expr(expr)
    }
}

impl From<FilterMap> for QueryKey {
    fn from(map: FilterMap) -> Self {
        Self::Map(map)
    }
}

impl From<&str> for QueryKey {
    fn from(key: &str) -> Self {
        Self::Str(key.to_string())
    }
}

impl From<String> for QueryKey {
    fn from(key: String) -> Self {
        Self::Str(key)
    }
}

///
/// Query
///
/// Immutable, lazily evaluated description of a fetch against a data
/// context. Every operation that alters the fetch rules returns a new,
/// unevaluated query; the receiver is never mutated.
///
/// A query also acts as a frozen collection: it stays unevaluated until
/// observed through the collection surface (`records`, `count`, `get`,
/// iteration, ...). The first observation executes the fetch synchronously
/// on the calling thread and freezes the outcome (success or failure)
/// permanently for this instance. To refetch with the same rules, derive a
/// fresh query with [`Self::unevaluated`].
///
/// The query holds a non-owning reference to its context and must only be
/// used on the thread that context operates on.
///

pub struct Query<'a, C: DataContext> {
    context: &'a C,
    descriptor: FetchDescriptor,
    rules: BindingRules,
    results: OnceCell<Result<Vec<C::Record>, EvalError>>,
}

impl<'a, C: DataContext> Query<'a, C> {
    /// Create an unbound query. Reached through `DataContextExt::query`.
    pub(crate) fn unbound(context: &'a C) -> Self {
        Self {
            context,
            descriptor: FetchDescriptor::unbound(),
            rules: BindingRules::new(),
            results: OnceCell::new(),
        }
    }

    /// New query over the same context with a different descriptor.
    /// Derived queries always start unevaluated.
    fn derive(&self, descriptor: FetchDescriptor) -> Self {
        Self {
            context: self.context,
            descriptor,
            rules: self.rules.clone(),
            results: OnceCell::new(),
        }
    }

    /// Replace the binding rules used by [`Self::bind`] and keyed access.
    #[must_use]
    pub fn with_binding_rules(mut self, rules: BindingRules) -> Self {
        self.rules = rules;
        self
    }

    // ------------------------------------------------------------------
    // Refinement
    // ------------------------------------------------------------------

    /// Narrow the query with another filter.
    ///
    /// Filters chain: the new filter is AND-combined with any existing one,
    /// so these two are equivalent:
    ///
    /// ```ignore
    /// query.filter("name = 'Sara'")?.filter("age > 25")?
    /// query.filter("name = 'Sara' and age > 25")?
    /// ```
    ///
    /// Accepts a `FilterExpr`, a `FilterMap` dictionary (parsed via the
    /// `field__op` grammar), or a text predicate passed to the store
    /// verbatim.
    pub fn filter(&self, source: impl Into<FilterSource>) -> Result<Self, Error> {
        let expr = match source.into() {
            FilterSource::Expr(expr) => expr,
            FilterSource::Map(map) => filter::parse(&map)?,
            FilterSource::Text(text) => FilterExpr::raw(text),
        };

        Ok(self.derive(self.descriptor.clone().merge_filter(expr)))
    }

    /// Replace the sort order. Sorting does not chain: the new spec
    /// replaces any previous one wholesale.
    #[must_use]
    pub fn sort_by(&self, spec: impl Into<SortSpec>) -> Self {
        self.derive(self.descriptor.clone().replace_sort(spec.into()))
    }

    /// Sort by a single key. Replaces any previous sort order.
    #[must_use]
    pub fn sort_by_key(&self, field: impl Into<String>, direction: SortDirection) -> Self {
        let key = SortKey {
            field: field.into(),
            direction,
            collation: None,
        };

        self.sort_by(vec![key])
    }

    /// Sort by a single key under a custom collation. Replaces any
    /// previous sort order.
    #[must_use]
    pub fn sort_by_key_collated(
        &self,
        field: impl Into<String>,
        direction: SortDirection,
        collation: Collation,
    ) -> Self {
        let key = SortKey {
            field: field.into(),
            direction,
            collation: Some(collation),
        };

        self.sort_by(vec![key])
    }

    /// Bound the number of fetched records. Replaces any previous limit.
    /// `limit(0)` legitimately fetches nothing, unlike an unset limit.
    #[must_use]
    pub fn limit(&self, limit: u32) -> Self {
        self.derive(self.descriptor.clone().replace_limit(limit))
    }

    /// A fresh unevaluated query with identical rules. Use this to
    /// re-fetch, since an evaluated query never re-queries the store.
    #[must_use]
    pub fn unevaluated(&self) -> Self {
        self.derive(self.descriptor.clone())
    }

    // ------------------------------------------------------------------
    // Binding
    // ------------------------------------------------------------------

    /// Bind this query to the entity kind named by `key`, consulting the
    /// context's entity catalog under the configured [`BindingRules`].
    ///
    /// A query may be bound exactly once, at the root of its chain;
    /// filter, sort, and limit refinements applied before binding carry
    /// over to the bound query.
    pub fn bind(&self, key: &str) -> Result<Self, BindError> {
        if let Some(entity) = self.descriptor.entity() {
            return Err(BindError::AlreadyBound {
                entity: entity.to_string(),
            });
        }

        let entity = self
            .rules
            .resolve(key, &self.context.entity_kinds())
            .ok_or_else(|| BindError::UnknownBinding {
                key: key.to_string(),
            })?;

        obs::sink::emit(&QueryEvent::Bound {
            key: key.to_string(),
            entity: entity.clone(),
        });

        Ok(self.derive(self.descriptor.clone().with_entity(entity)))
    }

    // ------------------------------------------------------------------
    // Keyed access
    // ------------------------------------------------------------------

    /// Unified keyed dispatch. Routing is determined solely by the shape
    /// of the key:
    ///
    /// - `FilterExpr` or `FilterMap` → [`Self::filter`]
    /// - string starting with `^` → sort-string parse, [`Self::sort_by`]
    /// - string that resolves as a binding key in the context's entity
    ///   catalog → [`Self::bind`] (fails with `AlreadyBound` on a bound
    ///   query)
    /// - any other string → text filter, passed to the store verbatim
    pub fn key(&self, key: impl Into<QueryKey>) -> Result<Self, Error> {
        match key.into() {
            QueryKey::Expr(expr) => self.filter(expr),
            QueryKey::Map(map) => self.filter(map),
            QueryKey::Str(s) => {
                if s.starts_with('^') {
                    Ok(self.sort_by(sort::parse_sort_str(&s)?))
                } else if self
                    .rules
                    .resolve(&s, &self.context.entity_kinds())
                    .is_some()
                {
                    self.bind(&s).map_err(Error::from)
                } else {
                    self.filter(s)
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Evaluation / observation
    // ------------------------------------------------------------------

    /// Whether this query has been evaluated yet. Never triggers
    /// evaluation.
    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        self.results.get().is_some()
    }

    /// Read-only view of the fetch descriptor. Never triggers evaluation;
    /// invalid for unbound queries.
    pub fn fetch_descriptor(&self) -> Result<&FetchDescriptor, EvalError> {
        if self.descriptor.is_bound() {
            Ok(&self.descriptor)
        } else {
            Err(EvalError::Unbound)
        }
    }

    /// The frozen record sequence, evaluating on first access.
    ///
    /// This is the single evaluation trigger: every other observation
    /// method delegates here. A frozen failure is returned again on each
    /// subsequent observation without touching the store.
    pub fn records(&self) -> Result<&[C::Record], EvalError> {
        match self.results.get_or_init(|| self.evaluate()) {
            Ok(rows) => Ok(rows.as_slice()),
            Err(err) => Err(err.clone()),
        }
    }

    /// Number of matched records.
    pub fn count(&self) -> Result<usize, EvalError> {
        Ok(self.records()?.len())
    }

    /// Whether no records matched.
    pub fn is_empty(&self) -> Result<bool, EvalError> {
        Ok(self.records()?.is_empty())
    }

    /// Record at `index`, if present.
    pub fn get(&self, index: usize) -> Result<Option<&C::Record>, EvalError> {
        Ok(self.records()?.get(index))
    }

    /// First matched record, if any.
    pub fn first(&self) -> Result<Option<&C::Record>, EvalError> {
        Ok(self.records()?.first())
    }

    /// Iterate the frozen records in fetch order.
    pub fn iter(&self) -> Result<std::slice::Iter<'_, C::Record>, EvalError> {
        Ok(self.records()?.iter())
    }

    /// Membership check over the frozen records.
    pub fn contains(&self, record: &C::Record) -> Result<bool, EvalError>
    where
        C::Record: PartialEq,
    {
        Ok(self.records()?.contains(record))
    }

    fn evaluate(&self) -> Result<Vec<C::Record>, EvalError> {
        let Some(entity) = self.descriptor.entity() else {
            return Err(EvalError::Unbound);
        };

        if !self.context.is_usable() {
            return Err(EvalError::ContextUnavailable);
        }

        let entity = entity.to_string();
        obs::sink::emit(&QueryEvent::EvalStart {
            entity: entity.clone(),
        });

        match self.context.execute_fetch(&self.descriptor) {
            Ok(rows) => {
                obs::sink::emit(&QueryEvent::EvalFinish {
                    entity,
                    rows: rows.len() as u64,
                });
                Ok(rows)
            }
            Err(err) => {
                obs::sink::emit(&QueryEvent::EvalFailed { entity });
                Err(EvalError::Store(err))
            }
        }
    }
}

/// Record types need not be `Debug`, so only the fetch rules and the
/// evaluation state are shown.
impl<C: DataContext> fmt::Debug for Query<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("descriptor", &self.descriptor)
            .field("evaluated", &self.results.get().is_some())
            .finish_non_exhaustive()
    }
}

/// Copies share the evaluation state: cloning an evaluated query clones
/// its frozen results, while derived (chained) queries always reset to
/// unevaluated.
impl<C: DataContext> Clone for Query<'_, C> {
    fn clone(&self) -> Self {
        Self {
            context: self.context,
            descriptor: self.descriptor.clone(),
            rules: self.rules.clone(),
            results: self.results.clone(),
        }
    }
}
