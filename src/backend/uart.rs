//! UART backend.

use crate::completion::{Outcome, XferDone};
use crate::config::UartStreamConfig;
use crate::error::{StreamError, XferResult};
use crate::hal::{EventMask, SerialPort, UartEvent};
use crate::interface::{Backend, BackendKind, StreamingInterface};
use crate::log_globals::TASK_LOG_STREAM;
use crate::isr_info;

/// Events the classifier handles.
pub const UART_EVENTS: EventMask = UartEvent::TxDone
    .mask()
    .union(UartEvent::TxError.mask())
    .union(UartEvent::RxDone.mask())
    .union(UartEvent::RxError.mask());

/// Install the UART backend on `port`.
pub fn setup_uart<'d>(
    port: &'d mut dyn SerialPort,
    config: &UartStreamConfig,
    callback: &'d XferDone<'d>,
) -> StreamingInterface<'d> {
    port.enable_events(UART_EVENTS, config.isr_priority);
    isr_info!(TASK_LOG_STREAM, "uart: setup prio={}", config.isr_priority.0);

    StreamingInterface::new(Backend::Uart(port), callback)
}

pub(crate) fn send<P>(port: &mut P, data: &'static [u8]) -> Outcome
where
    P: SerialPort + ?Sized,
{
    let status = port.write_async(data);
    super::start_outcome(BackendKind::Uart, "write", status)
}

pub(crate) fn receive<P>(port: &mut P, data: &'static mut [u8]) -> Outcome
where
    P: SerialPort + ?Sized,
{
    let status = port.read_async(data);
    super::start_outcome(BackendKind::Uart, "read", status)
}

pub(crate) fn classify(event: UartEvent) -> XferResult {
    match event {
        UartEvent::TxDone | UartEvent::RxDone => Ok(()),
        UartEvent::TxError | UartEvent::RxError => Err(StreamError::Transfer),
        other => super::unexpected_event(BackendKind::Uart, other.into()),
    }
}
