//! LazyQuery user-facing crate.
//!
//! ## Crate layout
//! - `core`: values, DSLs, descriptors, binding, and the `Query` runtime.
//!
//! Most callers only need the `prelude` plus a `DataContext`
//! implementation; `lazyquery_core::memory` ships a reference store.

pub use lazyquery_core as core;

pub use lazyquery_core::{Error, error, memory};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use lazyquery_core::{
        bind::BindingRules,
        descriptor::FetchDescriptor,
        filter::{FilterExpr, FilterMap},
        query::Query,
        sort::{SortDirection, SortKey, SortSpec},
        traits::{DataContext as _, DataContextExt as _, FieldValue as _},
        value::{TextMode, Value},
    };
}

///
/// TESTS
///
