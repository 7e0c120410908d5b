//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Resolve backends → Bind listeners → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast to every instance → drain → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - One coordinator for all instances in the process

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
