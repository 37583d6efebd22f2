//! Backend adapters, one per transport.
//!
//! Each adapter provides:
//! - `setup_*`: borrow the transport handle, enable its completion events and
//!   return a ready [`StreamingInterface`](crate::StreamingInterface)
//! - `send` / `receive`: start the native operation, report an [`Outcome`]
//! - `classify` (event-driven transports): map a native event to a result
//!
//! Adapters never touch the transfer guard; that is done once for all of
//! them by the interface.

pub mod ble;
pub mod i2c;
pub mod spi;
pub mod tcp;
pub mod uart;
pub mod usb;

pub use ble::{setup_ble, BleLink};
pub use i2c::setup_i2c;
pub use spi::setup_spi;
pub use tcp::setup_tcp;
pub use uart::setup_uart;
pub use usb::setup_usb;

use crate::completion::Outcome;
use crate::error::StreamError;
use crate::hal::{HalError, TransportEvent};
use crate::interface::BackendKind;
use crate::isr_error;
use crate::log_globals::{ISR_LOG_STREAM, TASK_LOG_STREAM};

/// Map the status of a native start call.
pub(crate) fn start_outcome(kind: BackendKind, op: &str, status: Result<(), HalError>) -> Outcome {
    match status {
        Ok(()) => Outcome::Started,
        Err(HalError(code)) => {
            isr_error!(
                TASK_LOG_STREAM,
                "{}: {} start failed ({})",
                kind.as_str(),
                op,
                code
            );
            Outcome::Failed(StreamError::Transfer)
        }
    }
}

/// Abort on an event the backend cannot have asked for.
#[cold]
pub(crate) fn unexpected_event(kind: BackendKind, event: TransportEvent) -> ! {
    isr_error!(
        ISR_LOG_STREAM,
        "{}: unexpected event {:?}",
        kind.as_str(),
        event
    );
    panic!("{} backend: unexpected event {:?}", kind.as_str(), event);
}
