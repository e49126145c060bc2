//! Core runtime for LazyQuery: values, the data-context traits, the filter
//! and sort DSLs, fetch descriptors, entity binding, and the lazily
//! evaluated `Query` type, plus the ergonomics exported via the `prelude`.
#![warn(unreachable_pub)]

pub mod bind;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod memory;
pub mod obs;
pub mod query;
pub mod sort;
pub mod traits;
pub mod value;

pub use error::Error;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No stores, sinks, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        bind::BindingRules,
        descriptor::FetchDescriptor,
        filter::{FilterExpr, FilterMap},
        query::Query,
        sort::{SortDirection, SortKey, SortSpec},
        traits::{DataContext, DataContextExt, FieldValue, FieldValues},
        value::{TextMode, Value},
    };
}
