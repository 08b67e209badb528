//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call:
//!     → timeouts.rs (race the call against an injected cancellation signal)
//!     → abort is reported exactly like a network failure
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No automatic retries; a failed call surfaces immediately and the caller
//!   decides whether to try again

pub mod timeouts;

pub use timeouts::{with_deadline, Aborted, CancellationSource, ManualCancellation, TimerCancellation};
