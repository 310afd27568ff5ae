//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Scan mock tree → Register projects → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Stop requested → Grace delay → Stop accepting → Drain in-flight requests
//!
//! Signals (signals.rs):
//!     Ctrl+C → Request shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener is bound last (traffic only once tables are built)
//! - Stopping waits a grace delay before closing the listener

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
