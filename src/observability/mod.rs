//! Observability subsystem
//!
//! - Structured logging (JSON lines)
//! - Atomic metrics
//! - Typed vault events
//!
//! Observability is read-only: it never changes the outcome of an operation.
//!
//! ```ignore
//! use vaultdb::observability::{Event, Logger, MetricsRegistry};
//!
//! Logger::event(Event::Commit, &[("commit_id", "7")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_queries_executed();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
