use crate::{
    descriptor::FetchDescriptor,
    error::StoreError,
    query::Query,
    value::{Float64, Value},
};
use std::collections::BTreeSet;

///
/// FieldValue
///
/// Conversion from plain Rust values into the query `Value` space.
/// Lets filter constructors and record builders accept natural literals.
///

pub trait FieldValue {
    fn to_value(&self) -> Value;
}

impl FieldValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FieldValue for &str {
    fn to_value(&self) -> Value {
        Value::Text((*self).to_string())
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FieldValue for i32 {
    fn to_value(&self) -> Value {
        Value::Int(i64::from(*self))
    }
}

impl FieldValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }
}

impl FieldValue for u32 {
    fn to_value(&self) -> Value {
        Value::Uint(u64::from(*self))
    }
}

impl FieldValue for u64 {
    fn to_value(&self) -> Value {
        Value::Uint(*self)
    }
}

impl FieldValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(Float64(*self))
    }
}

impl FieldValue for () {
    fn to_value(&self) -> Value {
        Value::Unit
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

///
/// FieldValues
///
/// Abstraction over a record-like value that can expose fields by name.
/// This decouples filter evaluation and sort application from concrete
/// record types.
///

pub trait FieldValues {
    /// `None` means the field is not present on the record, which is
    /// distinct from a present field holding `Value::Null`.
    fn get_value(&self, field: &str) -> Option<Value>;
}

///
/// DataContext
///
/// Boundary trait for the persistence layer a query evaluates against.
/// The query engine only describes fetches; the context executes them.
///
/// Usage contract: a context and every query derived from it must be
/// operated on by one logical thread at a time. Nothing in the engine
/// spawns concurrent work, and evaluation blocks the calling thread for
/// the duration of the fetch.
///

pub trait DataContext {
    type Record: FieldValues + Clone;

    /// Catalog of entity kinds known to the store. Consulted for binding
    /// resolution only.
    fn entity_kinds(&self) -> BTreeSet<String>;

    /// Execute a fully bound fetch descriptor, honoring its filter, sort
    /// spec, and limit. Failures are propagated verbatim and never retried
    /// by the query layer.
    fn execute_fetch(&self, descriptor: &FetchDescriptor) -> Result<Vec<Self::Record>, StoreError>;

    /// Liveness check consulted before every evaluation.
    fn is_usable(&self) -> bool;
}

///
/// DataContextExt
///
/// Unbound-query factory. After obtaining a query you must bind it to an
/// entity kind, either explicitly via `Query::bind` or through keyed access
/// with a binding key:
///
/// ```ignore
/// let articles = context.query().bind("articles")?;
/// let articles = context.query().key("articles")?;
/// ```
///

pub trait DataContextExt: DataContext + Sized {
    fn query(&self) -> Query<'_, Self> {
        Query::unbound(self)
    }
}

impl<C: DataContext + Sized> DataContextExt for C {}
