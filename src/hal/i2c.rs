//! I2C master transport.

use super::{EventMask, HalError};
use crate::config::IsrPriority;

/// Events raised by an I2C controller.
///
/// Only the master completion events are enabled by the streaming backend;
/// the slave events exist so a misrouted interrupt can be recognised.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum I2cEvent {
    SlaveReadRequest = 0,
    SlaveWriteRequest = 1,
    SlaveReadComplete = 2,
    SlaveWriteComplete = 3,
    SlaveError = 4,
    MasterWriteInFifo = 5,
    MasterWriteComplete = 6,
    MasterReadComplete = 7,
    MasterError = 8,
}

impl I2cEvent {
    pub const fn mask(self) -> EventMask {
        EventMask::from_bits(1 << self as u32)
    }
}

/// Non-blocking I2C master.
///
/// Buffers are `'static` because the controller keeps using them after
/// `transfer_async` returns. The implementation must not touch them once
/// the completion event fired.
pub trait I2cMaster: Send {
    /// Start a master transfer to `address`. Either side may be empty.
    fn transfer_async(
        &mut self,
        address: u16,
        tx: &'static [u8],
        rx: &'static mut [u8],
    ) -> Result<(), HalError>;

    /// Enable delivery of `events` at `priority`.
    fn enable_events(&mut self, events: EventMask, priority: IsrPriority);
}
