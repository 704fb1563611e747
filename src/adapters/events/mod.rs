//! Event publisher adapters.
//!
//! - `InMemoryEventBus` - Records envelopes; tests and in-memory runs
//! - `LogEventPublisher` - Emits envelopes as structured log records

mod in_memory;
mod log_publisher;

pub use in_memory::InMemoryEventBus;
pub use log_publisher::LogEventPublisher;
