//! Global log stream instances.
//!
//! One stream per execution context so interrupt-time records never contend
//! with caller-time records for ring slots.

use crate::logging::LogStream;

/// Caller-context log stream.
///
/// Setup, failed starts, synchronous transport errors and socket teardown.
pub static TASK_LOG_STREAM: LogStream = LogStream::new();

/// Completion-context log stream.
///
/// Written from transport interrupt/event handlers: asynchronous transfer
/// errors, spurious completions and unexpected events.
pub static ISR_LOG_STREAM: LogStream = LogStream::new();
