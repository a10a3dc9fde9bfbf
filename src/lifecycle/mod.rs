//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit 0
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!
//! Kill switch (kill_switch.rs):
//!     GET /kill → deferred task → Exit non-zero, no draining
//! ```
//!
//! # Design Decisions
//! - Graceful shutdown and the kill switch are deliberately different paths:
//!   supervisors must see the kill switch as a crash

pub mod kill_switch;
pub mod shutdown;
pub mod signals;

pub use kill_switch::{ProcessExit, Terminator};
pub use shutdown::Shutdown;
