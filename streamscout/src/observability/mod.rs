//! Observability utilities.

mod observer;
mod spans;
mod subscriber;

pub use observer::{
    CollectingObserver, ExtractionObserver, LoggingObserver, NoOpObserver, ObservedEvent,
};
pub use spans::{ExtractionSpanAttributes, SpanTimer};
pub use subscriber::{env_filter, init_tracing, LogFormat, DEFAULT_FILTER};
