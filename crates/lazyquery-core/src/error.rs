use crate::{bind::BindError, filter::FilterError, sort::SortError};
use thiserror::Error as ThisError;

///
/// StoreError
///
/// Failure reported by the underlying data context during a fetch.
/// The message is supplied by the store and carried verbatim; this layer
/// never rewrites or retries it.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("store evaluation failed: {message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

///
/// EvalError
///
/// Failures raised when a query transitions from unevaluated to evaluated.
/// `Clone` because a frozen failed evaluation is re-surfaced on every
/// subsequent observation of the same instance.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum EvalError {
    #[error("query is unbound; bind it to an entity kind before use")]
    Unbound,

    #[error("data context is no longer usable")]
    ContextUnavailable,

    #[error(transparent)]
    Store(#[from] StoreError),
}

///
/// Error
///
/// Crate-level error aggregating the four failure families: DSL parsing
/// (filter and sort), binding-protocol violations, and evaluation.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum Error {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Sort(#[from] SortError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}
