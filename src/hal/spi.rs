//! SPI master transport.

use super::{EventMask, HalError};
use crate::config::IsrPriority;

/// Events raised by an SPI controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SpiEvent {
    /// Data landed in the RX FIFO (not used for streaming)
    DataInFifo = 0,
    /// Transfer finished
    Done = 1,
    /// Transfer aborted with an error
    Error = 2,
}

impl SpiEvent {
    pub const fn mask(self) -> EventMask {
        EventMask::from_bits(1 << self as u32)
    }
}

/// Non-blocking SPI master. Same buffer rules as [`I2cMaster`](super::I2cMaster).
pub trait SpiMaster: Send {
    /// Start a full-duplex transfer. Either side may be empty.
    fn transfer_async(&mut self, tx: &'static [u8], rx: &'static mut [u8])
        -> Result<(), HalError>;

    /// Enable delivery of `events` at `priority`.
    fn enable_events(&mut self, events: EventMask, priority: IsrPriority);
}
