//! I2C master backend.
//!
//! Send is a write-only master transfer, receive a read-only one, both to
//! the device address given at setup.

use crate::completion::{Outcome, XferDone};
use crate::config::I2cStreamConfig;
use crate::error::{StreamError, XferResult};
use crate::hal::{EventMask, I2cEvent, I2cMaster};
use crate::interface::{Backend, BackendKind, StreamingInterface};
use crate::log_globals::TASK_LOG_STREAM;
use crate::isr_info;

/// Events the classifier handles.
pub const I2C_EVENTS: EventMask = I2cEvent::MasterReadComplete
    .mask()
    .union(I2cEvent::MasterWriteComplete.mask())
    .union(I2cEvent::MasterError.mask());

/// Install the I2C backend on `bus`.
pub fn setup_i2c<'d>(
    bus: &'d mut dyn I2cMaster,
    config: &I2cStreamConfig,
    callback: &'d XferDone<'d>,
) -> StreamingInterface<'d> {
    bus.enable_events(I2C_EVENTS, config.isr_priority);
    isr_info!(
        TASK_LOG_STREAM,
        "i2c: setup addr=0x{:02x} prio={}",
        config.address,
        config.isr_priority.0
    );

    StreamingInterface::new(
        Backend::I2c {
            bus,
            address: config.address,
        },
        callback,
    )
}

pub(crate) fn send<B>(bus: &mut B, address: u16, data: &'static [u8]) -> Outcome
where
    B: I2cMaster + ?Sized,
{
    let status = bus.transfer_async(address, data, Default::default());
    super::start_outcome(BackendKind::I2c, "write", status)
}

pub(crate) fn receive<B>(bus: &mut B, address: u16, data: &'static mut [u8]) -> Outcome
where
    B: I2cMaster + ?Sized,
{
    let status = bus.transfer_async(address, &[], data);
    super::start_outcome(BackendKind::I2c, "read", status)
}

pub(crate) fn classify(event: I2cEvent) -> XferResult {
    match event {
        I2cEvent::MasterReadComplete | I2cEvent::MasterWriteComplete => Ok(()),
        I2cEvent::MasterError => Err(StreamError::Transfer),
        other => super::unexpected_event(BackendKind::I2c, other.into()),
    }
}
