//! Transfer buffers shared between the caller and a running transfer.
//!
//! # Ownership
//!
//! ```text
//!            read()/write()                      send()/receive()
//!   HELD ◀──────────────────── FREE ──────────────────────────────▶ LENT
//!     │        closure ends     ▲    completion, before callback      │
//!     └─────────────────────────┴─────────────────────────────────────┘
//! ```
//!
//! A buffer lives in a `static` (or is leaked) so a transport may keep
//! writing into it after the start call returned. While LENT, only the
//! transport touches the bytes; `read`/`write` report
//! [`StreamError::InProgress`]. The buffer returns to FREE before the
//! completion callback runs, so the callback may already read it.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::error::StreamError;

const FREE: u8 = 0;
const HELD: u8 = 1;
const LENT: u8 = 2;

/// Byte buffer handed to [`StreamingInterface`](crate::StreamingInterface)
/// transfers, reusable once the transfer completed.
///
/// ```ignore
/// static FRAME: StreamBuffer<[u8; 12]> = StreamBuffer::zeroed();
///
/// FRAME.write(|buf| buf.copy_from_slice(&sample))?;
/// iface.send(&FRAME, TransferTag(n))?;
/// ```
pub struct StreamBuffer<T: ?Sized = [u8]> {
    state: AtomicU8,
    data: UnsafeCell<T>,
}

// SAFETY: The bytes are only accessed by whoever moved `state` away from
// FREE: a `read`/`write` closure (HELD) or one transfer (LENT).
unsafe impl<T: ?Sized + Send> Sync for StreamBuffer<T> {}

impl<const N: usize> StreamBuffer<[u8; N]> {
    /// Buffer with the given initial contents.
    pub const fn new(data: [u8; N]) -> Self {
        Self {
            state: AtomicU8::new(FREE),
            data: UnsafeCell::new(data),
        }
    }

    /// Zero-filled buffer.
    pub const fn zeroed() -> Self {
        Self::new([0; N])
    }
}

impl<T: ?Sized + AsRef<[u8]> + AsMut<[u8]>> StreamBuffer<T> {
    /// Run `f` on the contents.
    ///
    /// Fails with `InProgress` while the buffer is lent to a transfer or
    /// held by another context.
    pub fn read<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R, StreamError> {
        let _hold = Hold::take(&self.state)?;
        // SAFETY: HELD by this call.
        let data = unsafe { &*self.data.get() };
        Ok(f(data.as_ref()))
    }

    /// Run `f` on the contents, mutably. Same failure as [`read`](Self::read).
    pub fn write<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> Result<R, StreamError> {
        let _hold = Hold::take(&self.state)?;
        // SAFETY: HELD by this call.
        let data = unsafe { &mut *self.data.get() };
        Ok(f(data.as_mut()))
    }

    /// True while a transfer owns the buffer.
    pub fn is_lent(&self) -> bool {
        self.state.load(Ordering::Acquire) == LENT
    }
}

impl StreamBuffer {
    /// Lend the bytes to a transfer. `None` if not FREE.
    pub(crate) fn lend(&'static self) -> Option<&'static mut [u8]> {
        self.state
            .compare_exchange(FREE, LENT, Ordering::Acquire, Ordering::Relaxed)
            .ok()?;
        // SAFETY: LENT until `reclaim`; nobody else dereferences `data`.
        Some(unsafe { &mut *self.data.get() })
    }

    /// End the loan. The transport must be done with the bytes.
    pub(crate) fn reclaim(&self) {
        self.state.store(FREE, Ordering::Release);
    }
}

/// HELD for the duration of a `read`/`write` closure, FREE again on drop.
struct Hold<'a>(&'a AtomicU8);

impl<'a> Hold<'a> {
    fn take(state: &'a AtomicU8) -> Result<Self, StreamError> {
        state
            .compare_exchange(FREE, HELD, Ordering::Acquire, Ordering::Relaxed)
            .map(|_| Self(state))
            .map_err(|_| StreamError::InProgress)
    }
}

impl Drop for Hold<'_> {
    fn drop(&mut self) {
        self.0.store(FREE, Ordering::Release);
    }
}
