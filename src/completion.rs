//! Completion dispatch.
//!
//! Shared by every backend: guard handling around the native start call, the
//! loan of the caller's [`StreamBuffer`], and the exactly-once delivery of
//! `(tag, result)` to the caller's callback.
//!
//! Callbacks only ever run after the guard went back to idle and the buffer
//! was handed back, so a callback may read the buffer and start the next
//! transfer on the same interface.

use core::cell::UnsafeCell;

use crate::buffer::StreamBuffer;
use crate::error::{StreamError, XferResult};
use crate::guard::{Finish, TransferGuard, TransferTag};
use crate::interface::BackendKind;
use crate::log_globals::{ISR_LOG_STREAM, TASK_LOG_STREAM};
use crate::stats::{StatsSnapshot, TransferStats};
use crate::{isr_debug, isr_warn};

/// Completion callback: receives the caller's tag and the transfer result.
///
/// Runs in whichever context the completion fires in: the caller's own
/// context for synchronous backends, the transport's event handler otherwise.
/// May borrow anything that outlives the interface.
pub type XferDone<'a> = dyn Fn(TransferTag, XferResult) + Sync + 'a;

/// Result of handing a request to a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Native transfer running; a transport event will finish it.
    Started,
    /// Native operation already done and successful.
    Finished,
    /// Nothing is running. Reported synchronously, no callback.
    Failed(StreamError),
}

/// Per-interface completion state.
pub(crate) struct Context<'d> {
    guard: TransferGuard,
    /// Buffer of the outstanding transfer. Only touched by the context that
    /// owns the guard.
    lent: UnsafeCell<Option<&'static StreamBuffer>>,
    callback: &'d XferDone<'d>,
    kind: BackendKind,
    stats: TransferStats,
}

impl<'d> Context<'d> {
    pub(crate) const fn new(kind: BackendKind, callback: &'d XferDone<'d>) -> Self {
        Self {
            guard: TransferGuard::new(),
            lent: UnsafeCell::new(None),
            callback,
            kind,
            stats: TransferStats::new(),
        }
    }

    /// Claim the interface and `buffer` for a request carrying `tag`.
    ///
    /// Returns the bytes the backend may use until the transfer is settled
    /// or completed.
    pub(crate) fn begin(
        &self,
        tag: TransferTag,
        buffer: &'static StreamBuffer,
    ) -> Result<&'static mut [u8], StreamError> {
        if !self.guard.try_acquire(tag) {
            self.stats.record_rejected();
            isr_debug!(
                TASK_LOG_STREAM,
                "{}: busy, rejected tag={}",
                self.kind.as_str(),
                tag.value()
            );
            return Err(StreamError::InProgress);
        }

        let Some(data) = buffer.lend() else {
            self.guard.release();
            self.stats.record_rejected();
            isr_debug!(
                TASK_LOG_STREAM,
                "{}: buffer in use, rejected tag={}",
                self.kind.as_str(),
                tag.value()
            );
            return Err(StreamError::InProgress);
        };

        // SAFETY: Guard held by this context.
        unsafe { *self.lent.get() = Some(buffer) };
        Ok(data)
    }

    /// Close the caller-side part of a request after the backend returned.
    ///
    /// Must only be called once the backend borrow has ended.
    pub(crate) fn settle(&self, outcome: Outcome) -> XferResult {
        match outcome {
            Outcome::Started => {
                self.stats.record_started();
                if let Some((_, result)) = self.guard.commit() {
                    self.deliver(result);
                }
                Ok(())
            }
            Outcome::Finished => {
                self.stats.record_started();
                self.deliver(Ok(()));
                Ok(())
            }
            Outcome::Failed(err) => {
                match err {
                    StreamError::Overflow | StreamError::Underflow => self.stats.record_rejected(),
                    _ => {
                        self.stats.record_started();
                        self.stats.record_failed();
                    }
                }
                self.release();
                Err(err)
            }
        }
    }

    /// Finish the outstanding transfer from the event path.
    pub(crate) fn complete(&self, result: XferResult) {
        match self.guard.finish(result) {
            Finish::Deliver(_) => self.deliver(result),
            Finish::Parked => {}
            Finish::Spurious => {
                self.stats.record_spurious();
                isr_warn!(
                    ISR_LOG_STREAM,
                    "{}: completion with nothing outstanding",
                    self.kind.as_str()
                );
            }
        }
    }

    /// Hand the buffer back, then free the guard.
    fn release(&self) -> TransferTag {
        // SAFETY: Only the context owning the finished transfer gets here,
        // and the guard is still held.
        if let Some(buffer) = unsafe { (*self.lent.get()).take() } {
            buffer.reclaim();
        }
        self.guard.release()
    }

    fn deliver(&self, result: XferResult) {
        let tag = self.release();
        match result {
            Ok(()) => self.stats.record_completed(),
            Err(err) => {
                self.stats.record_failed();
                isr_warn!(
                    ISR_LOG_STREAM,
                    "{}: tag={} {}",
                    self.kind.as_str(),
                    tag.value(),
                    err
                );
            }
        }
        (self.callback)(tag, result);
    }

    #[inline]
    pub(crate) fn kind(&self) -> BackendKind {
        self.kind
    }

    #[inline]
    pub(crate) fn is_idle(&self) -> bool {
        self.guard.is_idle()
    }

    #[inline]
    pub(crate) fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Calls(Mutex<Vec<(TransferTag, XferResult)>>);

    impl Calls {
        fn new() -> Self {
            Self(Mutex::new(Vec::new()))
        }

        fn take(&self) -> Vec<(TransferTag, XferResult)> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    fn buffer() -> &'static StreamBuffer {
        Box::leak(Box::new(StreamBuffer::<[u8; 4]>::zeroed()))
    }

    #[test]
    fn test_started_then_complete_delivers_once() {
        let calls = Calls::new();
        let cb = |tag: TransferTag, result: XferResult| calls.0.lock().unwrap().push((tag, result));
        let ctx = Context::new(BackendKind::Spi, &cb);
        let buf = buffer();

        ctx.begin(TransferTag(3), buf).unwrap();
        assert_eq!(ctx.settle(Outcome::Started), Ok(()));
        assert!(!ctx.is_idle());
        assert!(buf.is_lent());
        assert!(calls.take().is_empty());

        ctx.complete(Ok(()));
        assert!(ctx.is_idle());
        assert!(!buf.is_lent());
        assert_eq!(calls.take(), vec![(TransferTag(3), Ok(()))]);

        // Duplicate event is dropped
        ctx.complete(Ok(()));
        assert!(calls.take().is_empty());
        assert_eq!(ctx.stats().spurious, 1);
    }

    #[test]
    fn test_callback_borrows_local_state() {
        let mut seen = Vec::new();
        let log = Mutex::new(&mut seen);
        let cb = |tag: TransferTag, _: XferResult| log.lock().unwrap().push(tag.value());
        let ctx = Context::new(BackendKind::Uart, &cb);

        ctx.begin(TransferTag(21), buffer()).unwrap();
        ctx.settle(Outcome::Finished).unwrap();
        drop(ctx);
        drop(log);

        assert_eq!(seen, vec![21]);
    }

    #[test]
    fn test_finished_calls_back_inline() {
        let calls = Calls::new();
        let cb = |tag: TransferTag, result: XferResult| calls.0.lock().unwrap().push((tag, result));
        let ctx = Context::new(BackendKind::Tcp, &cb);
        let buf = buffer();

        ctx.begin(TransferTag(0), buf).unwrap();
        assert_eq!(ctx.settle(Outcome::Finished), Ok(()));
        assert!(ctx.is_idle());
        assert!(!buf.is_lent());
        assert_eq!(calls.take(), vec![(TransferTag(0), Ok(()))]);
    }

    #[test]
    fn test_failed_releases_without_callback() {
        let calls = Calls::new();
        let cb = |tag: TransferTag, result: XferResult| calls.0.lock().unwrap().push((tag, result));
        let ctx = Context::new(BackendKind::Ble, &cb);
        let buf = buffer();

        ctx.begin(TransferTag(1), buf).unwrap();
        assert_eq!(
            ctx.settle(Outcome::Failed(StreamError::Overflow)),
            Err(StreamError::Overflow)
        );
        assert!(ctx.is_idle());
        assert!(!buf.is_lent());
        assert!(calls.take().is_empty());

        let snap = ctx.stats();
        assert_eq!(snap.rejected, 1);
        assert_eq!(snap.started, 0);
    }

    #[test]
    fn test_begin_while_busy() {
        let cb = |_: TransferTag, _: XferResult| {};
        let ctx = Context::new(BackendKind::I2c, &cb);
        let other = buffer();

        ctx.begin(TransferTag(1), buffer()).unwrap();
        assert_eq!(ctx.begin(TransferTag(2), other), Err(StreamError::InProgress));
        assert!(!other.is_lent(), "Rejected request must not take the buffer");
        assert_eq!(ctx.stats().rejected, 1);
    }

    #[test]
    fn test_begin_with_lent_buffer() {
        let cb = |_: TransferTag, _: XferResult| {};
        let first = Context::new(BackendKind::Spi, &cb);
        let second = Context::new(BackendKind::Uart, &cb);
        let buf = buffer();

        first.begin(TransferTag(1), buf).unwrap();
        assert_eq!(second.begin(TransferTag(2), buf), Err(StreamError::InProgress));
        assert!(second.is_idle());
        assert_eq!(second.stats().rejected, 1);

        // Still owned by the first transfer
        assert!(buf.is_lent());
        first.settle(Outcome::Failed(StreamError::Transfer)).unwrap_err();
        assert!(!buf.is_lent());
    }

    #[test]
    fn test_completion_during_start_delivered_by_settle() {
        let calls = Calls::new();
        let cb = |tag: TransferTag, result: XferResult| calls.0.lock().unwrap().push((tag, result));
        let ctx = Context::new(BackendKind::Uart, &cb);
        let buf = buffer();

        ctx.begin(TransferTag(11), buf).unwrap();
        ctx.complete(Err(StreamError::Transfer));
        assert!(calls.take().is_empty());
        assert!(buf.is_lent());

        assert_eq!(ctx.settle(Outcome::Started), Ok(()));
        assert!(ctx.is_idle());
        assert!(!buf.is_lent());
        assert_eq!(calls.take(), vec![(TransferTag(11), Err(StreamError::Transfer))]);
        assert_eq!(ctx.stats().failed, 1);
    }
}
