//! Transfer guard: one outstanding transfer per interface.
//!
//! # Protocol
//!
//! ```text
//!           try_acquire()            commit()
//!   IDLE ───────────────▶ STARTING ───────────▶ BUSY
//!    ▲                       │  │                 │
//!    │                       │  │ finish()        │ finish()
//!    │                       │  ▼                 ▼
//!    │                       │ PARKED          CLOSING
//!    │      release()        │  │ commit()        │
//!    └───────────────────────┴──┴─────────────────┘
//! ```
//!
//! STARTING covers the native start call. A completion that lands while the
//! start call is still running is parked and handed back to the caller by
//! `commit()`, so the callback never overlaps the caller's use of the backend.
//!
//! A finished transfer (PARKED handed out by `commit()`, or CLOSING) keeps
//! the guard until `release()`, so the completing context can hand back
//! per-transfer state before a new request may start. From the outside every
//! state but IDLE reads as "busy".
//!
//! Only atomic operations are used. The guard is safe to touch from
//! interrupt context.

use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use crate::error::{StreamError, XferResult};

const IDLE: u8 = 0;
const STARTING: u8 = 1;
const BUSY: u8 = 2;
const PARKED: u8 = 3;
const CLOSING: u8 = 4;

/// Encoded `Ok(())` in the parked-result slot.
const RESULT_OK: u8 = 0xFF;

/// Opaque caller value returned verbatim with the completion.
///
/// Wide enough to carry a pointer. Never dereferenced by this crate, and zero
/// is as valid as any other value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TransferTag(pub usize);

impl TransferTag {
    /// Wrap a raw value.
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Raw value.
    pub const fn value(self) -> usize {
        self.0
    }
}

impl From<usize> for TransferTag {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

/// What the completion path should do after calling [`TransferGuard::finish`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finish {
    /// Transfer over; deliver with this tag, then `release()`.
    Deliver(TransferTag),
    /// Start call still running; the result was parked for `commit()`.
    Parked,
    /// No transfer outstanding. Nothing to deliver.
    Spurious,
}

/// Exclusive-access token for one interface instance.
pub struct TransferGuard {
    state: AtomicU8,
    tag: AtomicUsize,
    parked: AtomicU8,
}

impl TransferGuard {
    /// Create an idle guard.
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(IDLE),
            tag: AtomicUsize::new(0),
            parked: AtomicU8::new(RESULT_OK),
        }
    }

    /// Claim the guard for a new transfer.
    ///
    /// Returns `false` without side effects if a transfer is outstanding.
    #[inline]
    pub fn try_acquire(&self, tag: TransferTag) -> bool {
        if self
            .state
            .compare_exchange(IDLE, STARTING, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return false;
        }

        // Published to the completion path by the Release in commit()
        self.tag.store(tag.0, Ordering::Relaxed);
        true
    }

    /// Mark the native start as done.
    ///
    /// Returns the parked completion if the transfer already finished while
    /// the start call was running. The guard stays held until `release()`.
    #[inline]
    pub fn commit(&self) -> Option<(TransferTag, XferResult)> {
        match self
            .state
            .compare_exchange(STARTING, BUSY, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => None,
            Err(PARKED) => {
                let tag = TransferTag(self.tag.load(Ordering::Relaxed));
                let result = decode_result(self.parked.load(Ordering::Relaxed));
                Some((tag, result))
            }
            // Only the acquirer commits, so STARTING or PARKED are the only
            // states reachable here.
            Err(_) => None,
        }
    }

    /// Release from the context that owns the transfer: the acquirer on a
    /// synchronous completion, failed start or parked completion, the
    /// completion path after `Finish::Deliver`. Returns the tag that was held.
    #[inline]
    pub fn release(&self) -> TransferTag {
        let tag = TransferTag(self.tag.load(Ordering::Relaxed));
        self.state.store(IDLE, Ordering::Release);
        tag
    }

    /// Finish the outstanding transfer from the completion path.
    ///
    /// Only one caller gets `Deliver`; the guard stays held until it calls
    /// `release()`.
    #[inline]
    pub fn finish(&self, result: XferResult) -> Finish {
        loop {
            match self.state.load(Ordering::Acquire) {
                BUSY => {
                    let tag = TransferTag(self.tag.load(Ordering::Relaxed));
                    if self
                        .state
                        .compare_exchange(BUSY, CLOSING, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        return Finish::Deliver(tag);
                    }
                }
                STARTING => {
                    self.parked.store(encode_result(result), Ordering::Relaxed);
                    if self
                        .state
                        .compare_exchange(STARTING, PARKED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        return Finish::Parked;
                    }
                }
                _ => return Finish::Spurious,
            }
        }
    }

    /// True when no transfer is outstanding.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state.load(Ordering::Acquire) == IDLE
    }

    /// Tag of the outstanding transfer, if any.
    #[inline]
    pub fn tag(&self) -> Option<TransferTag> {
        if self.is_idle() {
            None
        } else {
            Some(TransferTag(self.tag.load(Ordering::Relaxed)))
        }
    }
}

impl Default for TransferGuard {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_result(result: XferResult) -> u8 {
    match result {
        Ok(()) => RESULT_OK,
        Err(e) => e.code(),
    }
}

fn decode_result(raw: u8) -> XferResult {
    if raw == RESULT_OK {
        return Ok(());
    }
    Err(StreamError::from_code(raw).unwrap_or(StreamError::Transfer))
}
