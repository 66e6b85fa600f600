//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All stages produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout log stream
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! The durable audit trail (error records) lives in the ledger, not here.

pub mod logging;
pub mod metrics;
