//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Open ledger → Load wallet → Verify chain → Build sources → Pipeline
//!
//! Shutdown (shutdown.rs):
//!     Signal received → trigger → every stage returns at its next wait
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, nothing runs half-initialized
//! - Shutdown is level-triggered; no stage can miss it

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{build_pipeline, StartupError};
