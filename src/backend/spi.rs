//! SPI master backend.

use crate::completion::{Outcome, XferDone};
use crate::config::SpiStreamConfig;
use crate::error::{StreamError, XferResult};
use crate::hal::{EventMask, SpiEvent, SpiMaster};
use crate::interface::{Backend, BackendKind, StreamingInterface};
use crate::log_globals::TASK_LOG_STREAM;
use crate::isr_info;

/// Events the classifier handles.
pub const SPI_EVENTS: EventMask = SpiEvent::Done.mask().union(SpiEvent::Error.mask());

/// Install the SPI backend on `bus`.
pub fn setup_spi<'d>(
    bus: &'d mut dyn SpiMaster,
    config: &SpiStreamConfig,
    callback: &'d XferDone<'d>,
) -> StreamingInterface<'d> {
    bus.enable_events(SPI_EVENTS, config.isr_priority);
    isr_info!(TASK_LOG_STREAM, "spi: setup prio={}", config.isr_priority.0);

    StreamingInterface::new(Backend::Spi(bus), callback)
}

pub(crate) fn send<B>(bus: &mut B, data: &'static [u8]) -> Outcome
where
    B: SpiMaster + ?Sized,
{
    let status = bus.transfer_async(data, Default::default());
    super::start_outcome(BackendKind::Spi, "write", status)
}

pub(crate) fn receive<B>(bus: &mut B, data: &'static mut [u8]) -> Outcome
where
    B: SpiMaster + ?Sized,
{
    let status = bus.transfer_async(&[], data);
    super::start_outcome(BackendKind::Spi, "read", status)
}

pub(crate) fn classify(event: SpiEvent) -> XferResult {
    match event {
        SpiEvent::Done => Ok(()),
        SpiEvent::Error => Err(StreamError::Transfer),
        other => super::unexpected_event(BackendKind::Spi, other.into()),
    }
}
