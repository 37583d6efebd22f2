//! Streaming interface: the uniform send/receive facade.
//!
//! # Architecture
//!
//! ```text
//! caller                 StreamingInterface                 transport
//! ──────                 ──────────────────                 ─────────
//!
//! send()/receive() ───▶ guard + buffer loan ─▶ Backend::{Ble,I2c,..} ───▶ native start
//!                                                                             │
//! callback(tag, res) ◀── buffer back, Context::complete ◀── on_event() ◀──────┘
//! ```
//!
//! A setup function in [`crate::backend`] installs exactly one backend. The
//! backend context is a closed enum whose size is bounded by
//! [`CONTEXT_WORDS`] regardless of the variant.

use core::cell::UnsafeCell;
use core::mem::size_of;

use crate::backend::{ble, i2c, spi, tcp, uart, usb, BleLink};
use crate::buffer::StreamBuffer;
use crate::completion::{Context, Outcome, XferDone};
use crate::config::CONTEXT_WORDS;
use crate::error::XferResult;
use crate::guard::TransferTag;
use crate::hal::{CdcDevice, I2cMaster, SerialPort, SpiMaster, TcpSocket, TransportEvent};
use crate::stats::StatsSnapshot;

/// Transport behind an interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Ble,
    I2c,
    Spi,
    Tcp,
    Uart,
    Usb,
}

impl BackendKind {
    /// Short lowercase name, used as log prefix.
    pub const fn as_str(self) -> &'static str {
        match self {
            BackendKind::Ble => "ble",
            BackendKind::I2c => "i2c",
            BackendKind::Spi => "spi",
            BackendKind::Tcp => "tcp",
            BackendKind::Uart => "uart",
            BackendKind::Usb => "usb",
        }
    }
}

/// Backend-private state. Transport handles are borrowed, never owned.
pub(crate) enum Backend<'d> {
    Ble(&'d mut BleLink<'d>),
    I2c {
        bus: &'d mut dyn I2cMaster,
        address: u16,
    },
    Spi(&'d mut dyn SpiMaster),
    Tcp {
        socket: &'d mut dyn TcpSocket,
        disconnect_timeout_ms: u32,
        /// Set once the socket was torn down; it must not be called again.
        closed: bool,
    },
    Uart(&'d mut dyn SerialPort),
    Usb {
        device: &'d mut dyn CdcDevice,
        timeout_ms: u32,
    },
}

const _: () = assert!(
    size_of::<Backend<'static>>() <= CONTEXT_WORDS * size_of::<usize>(),
    "backend context exceeds CONTEXT_WORDS"
);

impl<'d> Backend<'d> {
    fn kind(&self) -> BackendKind {
        match self {
            Backend::Ble(_) => BackendKind::Ble,
            Backend::I2c { .. } => BackendKind::I2c,
            Backend::Spi(_) => BackendKind::Spi,
            Backend::Tcp { .. } => BackendKind::Tcp,
            Backend::Uart(_) => BackendKind::Uart,
            Backend::Usb { .. } => BackendKind::Usb,
        }
    }

    fn send(&mut self, data: &'static [u8]) -> Outcome {
        match self {
            Backend::Ble(link) => ble::send(link, data),
            Backend::I2c { bus, address } => i2c::send(&mut **bus, *address, data),
            Backend::Spi(bus) => spi::send(&mut **bus, data),
            Backend::Tcp {
                socket,
                disconnect_timeout_ms,
                closed,
            } => tcp::send(&mut **socket, *disconnect_timeout_ms, closed, data),
            Backend::Uart(port) => uart::send(&mut **port, data),
            Backend::Usb { device, timeout_ms } => usb::send(&mut **device, *timeout_ms, data),
        }
    }

    fn receive(&mut self, data: &'static mut [u8]) -> Outcome {
        match self {
            Backend::Ble(link) => ble::receive(link, data),
            Backend::I2c { bus, address } => i2c::receive(&mut **bus, *address, data),
            Backend::Spi(bus) => spi::receive(&mut **bus, data),
            Backend::Tcp {
                socket,
                disconnect_timeout_ms,
                closed,
            } => tcp::receive(&mut **socket, *disconnect_timeout_ms, closed, data),
            Backend::Uart(port) => uart::receive(&mut **port, data),
            Backend::Usb { device, timeout_ms } => usb::receive(&mut **device, *timeout_ms, data),
        }
    }
}

/// Uniform non-blocking send/receive over one transport instance.
///
/// At most one transfer is outstanding at a time. Each accepted request
/// produces exactly one callback; a rejected request produces none.
///
/// Transfers move whole [`StreamBuffer`]s. The buffer is lent to the
/// transport for the duration of one transfer and is readable and writable
/// again when the callback runs, so one buffer serves any number of
/// transfers.
pub struct StreamingInterface<'d> {
    backend: UnsafeCell<Backend<'d>>,
    context: Context<'d>,
}

// SAFETY: The backend is only touched by the context holding the transfer
// guard, between acquiring it and settling the outcome. The event path never
// touches the backend; it touches the guard, counters and callback (atomics
// or shared `Sync` data) and the lent-buffer slot, which belongs to whoever
// owns the finished transfer. Transport traits require `Send`.
unsafe impl Sync for StreamingInterface<'_> {}

impl<'d> StreamingInterface<'d> {
    pub(crate) fn new(backend: Backend<'d>, callback: &'d XferDone<'d>) -> Self {
        let kind = backend.kind();
        Self {
            backend: UnsafeCell::new(backend),
            context: Context::new(kind, callback),
        }
    }

    /// Start sending the contents of `buffer`.
    ///
    /// `Ok(())` means accepted: the callback reports the outcome, possibly
    /// before this returns. `Err` means rejected: no callback will follow.
    /// A buffer still lent to another transfer is rejected with `InProgress`.
    pub fn send(&self, buffer: &'static StreamBuffer, tag: TransferTag) -> XferResult {
        let data = self.context.begin(tag, buffer)?;

        let outcome = {
            // SAFETY: Guard held; see the Sync impl.
            let backend = unsafe { &mut *self.backend.get() };
            backend.send(data)
        };

        self.context.settle(outcome)
    }

    /// Start filling `buffer` completely.
    ///
    /// Same contract as [`send`](Self::send).
    pub fn receive(&self, buffer: &'static StreamBuffer, tag: TransferTag) -> XferResult {
        let data = self.context.begin(tag, buffer)?;

        let outcome = {
            // SAFETY: Guard held; see the Sync impl.
            let backend = unsafe { &mut *self.backend.get() };
            backend.receive(data)
        };

        self.context.settle(outcome)
    }

    /// Deliver a transport event. Called by the platform interrupt glue.
    ///
    /// # Panics
    ///
    /// On an event this backend never enabled or an event of another
    /// transport kind. Both are wiring defects.
    pub fn on_event(&self, event: TransportEvent) {
        let kind = self.context.kind();
        let result = match (kind, event) {
            (BackendKind::I2c, TransportEvent::I2c(ev)) => i2c::classify(ev),
            (BackendKind::Spi, TransportEvent::Spi(ev)) => spi::classify(ev),
            (BackendKind::Uart, TransportEvent::Uart(ev)) => uart::classify(ev),
            (BackendKind::Usb, TransportEvent::Usb(status)) => usb::classify(status),
            (kind, event) => crate::backend::unexpected_event(kind, event),
        };

        self.context.complete(result);
    }

    /// True when no transfer is outstanding.
    pub fn is_idle(&self) -> bool {
        self.context.is_idle()
    }

    /// Installed backend.
    pub fn kind(&self) -> BackendKind {
        self.context.kind()
    }

    /// Transfer counters since setup.
    pub fn stats(&self) -> StatsSnapshot {
        self.context.stats()
    }
}

impl core::fmt::Debug for StreamingInterface<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StreamingInterface")
            .field("kind", &self.kind())
            .field("idle", &self.is_idle())
            .finish()
    }
}
