//! Observability: query lifecycle events and the sink boundary.
//!
//! Engine code never inspects sink state directly; all instrumentation
//! flows through [`QueryEvent`] and [`EventSink`].

pub(crate) mod sink;

pub use sink::{CountingSink, EventSink, QueryEvent, install_sink, remove_sink};
