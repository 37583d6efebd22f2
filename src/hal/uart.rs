//! UART transport.

use super::{EventMask, HalError};
use crate::config::IsrPriority;

/// Events raised by a UART.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum UartEvent {
    TxEmpty = 0,
    TxDone = 1,
    TxError = 2,
    RxNotEmpty = 3,
    RxDone = 4,
    RxError = 5,
    RxFull = 6,
}

impl UartEvent {
    pub const fn mask(self) -> EventMask {
        EventMask::from_bits(1 << self as u32)
    }
}

/// UART with asynchronous block reads and writes.
pub trait SerialPort: Send {
    /// Start writing `data`. `TxDone` fires when the last byte left the wire.
    fn write_async(&mut self, data: &'static [u8]) -> Result<(), HalError>;

    /// Start filling `buf`. `RxDone` fires when it is full.
    fn read_async(&mut self, buf: &'static mut [u8]) -> Result<(), HalError>;

    /// Enable delivery of `events` at `priority`.
    fn enable_events(&mut self, events: EventMask, priority: IsrPriority);
}
