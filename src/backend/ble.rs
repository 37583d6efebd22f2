//! BLE GATT backend.
//!
//! Shared-buffer transport over one characteristic of an established
//! connection:
//! - send copies the payload into the characteristic's value buffer and
//!   pushes it to the host as a notification or indication, whichever the
//!   host subscribed to
//! - receive copies what the host last wrote to the characteristic
//!
//! Both complete synchronously, so the callback runs before the call returns.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::completion::{Outcome, XferDone};
use crate::error::StreamError;
use crate::hal::{GattServer, GATT_CLIENT_CONFIG_INDICATION, GATT_CLIENT_CONFIG_NOTIFICATION};
use crate::interface::{Backend, StreamingInterface};
use crate::log_globals::TASK_LOG_STREAM;
use crate::{isr_info, isr_warn};

/// One characteristic of a BLE connection.
pub struct BleLink<'d> {
    /// GATT server of the connection
    pub server: &'d mut dyn GattServer,
    /// Connection handle
    pub conn_id: u16,
    /// Characteristic value attribute handle
    pub attribute: u16,
    /// Client characteristic configuration, written by the BLE stack when
    /// the host (un)subscribes
    pub client_config: &'d AtomicU8,
    /// Value buffer for outgoing data
    pub send_buffer: &'d mut [u8],
}

impl<'d> BleLink<'d> {
    pub fn new(
        server: &'d mut dyn GattServer,
        conn_id: u16,
        attribute: u16,
        client_config: &'d AtomicU8,
        send_buffer: &'d mut [u8],
    ) -> Self {
        Self {
            server,
            conn_id,
            attribute,
            client_config,
            send_buffer,
        }
    }
}

/// Install the BLE backend on `link`.
pub fn setup_ble<'d>(
    link: &'d mut BleLink<'d>,
    callback: &'d XferDone<'d>,
) -> StreamingInterface<'d> {
    isr_info!(
        TASK_LOG_STREAM,
        "ble: setup conn={} attr=0x{:04x} buf={}",
        link.conn_id,
        link.attribute,
        link.send_buffer.len()
    );

    StreamingInterface::new(Backend::Ble(link), callback)
}

pub(crate) fn send(link: &mut BleLink<'_>, data: &[u8]) -> Outcome {
    let len = data.len();
    if len > link.send_buffer.len() {
        isr_warn!(
            TASK_LOG_STREAM,
            "ble: send {} bytes exceeds buffer of {}",
            len,
            link.send_buffer.len()
        );
        return Outcome::Failed(StreamError::Overflow);
    }

    link.send_buffer[..len].copy_from_slice(data);

    let value = &link.send_buffer[..len];
    let config = link.client_config.load(Ordering::Acquire);
    let status = if config & GATT_CLIENT_CONFIG_NOTIFICATION != 0 {
        link.server.send_notification(link.conn_id, link.attribute, value)
    } else if config & GATT_CLIENT_CONFIG_INDICATION != 0 {
        link.server.send_indication(link.conn_id, link.attribute, value)
    } else {
        isr_warn!(TASK_LOG_STREAM, "ble: host not subscribed");
        return Outcome::Failed(StreamError::Transfer);
    };

    if status.is_success() {
        Outcome::Finished
    } else {
        isr_warn!(TASK_LOG_STREAM, "ble: push failed: {:?}", status);
        Outcome::Failed(StreamError::Transfer)
    }
}

pub(crate) fn receive(link: &mut BleLink<'_>, data: &mut [u8]) -> Outcome {
    let value = link.server.attribute_value(link.attribute);
    if data.len() > value.len() {
        isr_warn!(
            TASK_LOG_STREAM,
            "ble: receive {} bytes exceeds value of {}",
            data.len(),
            value.len()
        );
        return Outcome::Failed(StreamError::Underflow);
    }

    data.copy_from_slice(&value[..data.len()]);
    Outcome::Finished
}
