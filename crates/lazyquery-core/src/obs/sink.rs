//! Event sink boundary.
//!
//! The sink is thread-local, matching the single-thread-per-context usage
//! contract of the engine. Installing a sink affects only the calling
//! thread.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

thread_local! {
    static SINK: RefCell<Option<Rc<dyn EventSink>>> = const { RefCell::new(None) };
}

///
/// QueryEvent
///

#[derive(Clone, Debug)]
pub enum QueryEvent {
    EvalStart { entity: String },
    EvalFinish { entity: String, rows: u64 },
    EvalFailed { entity: String },
    Bound { key: String, entity: String },
}

///
/// EventSink
///

pub trait EventSink {
    fn record(&self, event: &QueryEvent);
}

/// Install an event sink for the calling thread, replacing any previous one.
pub fn install_sink(sink: Rc<dyn EventSink>) {
    SINK.with(|cell| *cell.borrow_mut() = Some(sink));
}

/// Remove the calling thread's event sink.
pub fn remove_sink() {
    SINK.with(|cell| *cell.borrow_mut() = None);
}

pub(crate) fn emit(event: &QueryEvent) {
    // clone the handle out of the borrow so a sink may itself run queries
    let sink = SINK.with(|cell| cell.borrow().clone());
    if let Some(sink) = sink {
        sink.record(event);
    }
}

///
/// CountingSink
///
/// Tally of lifecycle events, mainly for tests and smoke checks.
///

#[derive(Debug, Default)]
pub struct CountingSink {
    pub eval_start: Cell<u64>,
    pub eval_finish: Cell<u64>,
    pub eval_failed: Cell<u64>,
    pub bound: Cell<u64>,
}

impl EventSink for CountingSink {
    fn record(&self, event: &QueryEvent) {
        let counter = match event {
            QueryEvent::EvalStart { .. } => &self.eval_start,
            QueryEvent::EvalFinish { .. } => &self.eval_finish,
            QueryEvent::EvalFailed { .. } => &self.eval_failed,
            QueryEvent::Bound { .. } => &self.bound,
        };
        counter.set(counter.get() + 1);
    }
}
