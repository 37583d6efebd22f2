//! USB CDC backend.
//!
//! Requests are queued on the CDC function as async I/O descriptors; the
//! stack reports their completion status through [`TransportEvent::Usb`](crate::hal::TransportEvent::Usb).

use crate::completion::{Outcome, XferDone};
use crate::config::UsbStreamConfig;
use crate::error::{StreamError, XferResult};
use crate::hal::{AsyncIo, AsyncIoStatus, CdcDevice};
use crate::interface::{Backend, BackendKind, StreamingInterface};
use crate::log_globals::TASK_LOG_STREAM;
use crate::isr_info;

/// Install the USB CDC backend on a started `device`.
pub fn setup_usb<'d>(
    device: &'d mut dyn CdcDevice,
    config: &UsbStreamConfig,
    callback: &'d XferDone<'d>,
) -> StreamingInterface<'d> {
    isr_info!(TASK_LOG_STREAM, "usb: setup timeout={}ms", config.timeout_ms);

    StreamingInterface::new(
        Backend::Usb {
            device,
            timeout_ms: config.timeout_ms,
        },
        callback,
    )
}

pub(crate) fn send<D>(device: &mut D, timeout_ms: u32, data: &'static [u8]) -> Outcome
where
    D: CdcDevice + ?Sized,
{
    let status = device.write_async(AsyncIo::new(data), timeout_ms);
    super::start_outcome(BackendKind::Usb, "write", status)
}

pub(crate) fn receive<D>(device: &mut D, timeout_ms: u32, data: &'static mut [u8]) -> Outcome
where
    D: CdcDevice + ?Sized,
{
    let status = device.read_async(AsyncIo::new(data), timeout_ms);
    super::start_outcome(BackendKind::Usb, "read", status)
}

pub(crate) fn classify(status: AsyncIoStatus) -> XferResult {
    if status.is_ok() {
        Ok(())
    } else {
        Err(StreamError::Transfer)
    }
}
