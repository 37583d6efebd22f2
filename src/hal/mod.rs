//! Transport boundary for the streaming backends.
//!
//! Thin traits over the native driver of each transport. Implementations are
//! provided by the platform (ESP-IDF drivers, a BLE stack, test doubles);
//! the streaming logic lives in [`crate::backend`], HAL is just I/O.
//!
//! Every event-driven transport offers the same two capabilities:
//! - a non-blocking start call that reports an immediate status
//! - event enabling, after which the platform interrupt glue forwards
//!   completion events to [`StreamingInterface::on_event`](crate::StreamingInterface::on_event)
//!
//! Transport handles are initialized and started by the application before a
//! backend is set up. The streaming layer never initializes hardware.

pub mod gatt;
pub mod i2c;
pub mod socket;
pub mod spi;
pub mod uart;
pub mod usb;

pub use gatt::{GattServer, GattStatus, GATT_CLIENT_CONFIG_INDICATION, GATT_CLIENT_CONFIG_NOTIFICATION};
pub use i2c::{I2cEvent, I2cMaster};
pub use socket::{SocketError, TcpSocket};
pub use spi::{SpiEvent, SpiMaster};
pub use uart::{SerialPort, UartEvent};
pub use usb::{AsyncIo, AsyncIoStatus, CdcDevice};

/// Raw status code returned by a driver start call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HalError(pub i32);

/// Set of transport events, one bit per event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventMask(u32);

impl EventMask {
    pub const EMPTY: Self = Self(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// True if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl core::ops::BitOr for EventMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl core::ops::BitOrAssign for EventMask {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// A completion event delivered by the platform interrupt glue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    I2c(I2cEvent),
    Spi(SpiEvent),
    Uart(UartEvent),
    Usb(AsyncIoStatus),
}

impl From<I2cEvent> for TransportEvent {
    fn from(event: I2cEvent) -> Self {
        TransportEvent::I2c(event)
    }
}

impl From<SpiEvent> for TransportEvent {
    fn from(event: SpiEvent) -> Self {
        TransportEvent::Spi(event)
    }
}

impl From<UartEvent> for TransportEvent {
    fn from(event: UartEvent) -> Self {
        TransportEvent::Uart(event)
    }
}

impl From<AsyncIoStatus> for TransportEvent {
    fn from(status: AsyncIoStatus) -> Self {
        TransportEvent::Usb(status)
    }
}
