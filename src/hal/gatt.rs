//! BLE GATT server transport.
//!
//! The BLE backend is a shared-buffer wrapper: sends update the attribute
//! value and push it to the host, receives copy what the host last wrote.

/// Client characteristic configuration: notifications enabled.
pub const GATT_CLIENT_CONFIG_NOTIFICATION: u8 = 0x01;

/// Client characteristic configuration: indications enabled.
pub const GATT_CLIENT_CONFIG_INDICATION: u8 = 0x02;

/// Result of a GATT server operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GattStatus {
    Success,
    /// The host has not subscribed to the attribute
    WriteRequestRejected,
    /// Congested link or stack error, with the native status code
    Error(u8),
}

impl GattStatus {
    pub fn is_success(self) -> bool {
        self == GattStatus::Success
    }
}

/// GATT server of an established BLE connection.
pub trait GattServer: Send {
    /// Push `value` to the host as a notification.
    fn send_notification(&mut self, conn_id: u16, attribute: u16, value: &[u8]) -> GattStatus;

    /// Push `value` to the host as an indication.
    fn send_indication(&mut self, conn_id: u16, attribute: u16, value: &[u8]) -> GattStatus;

    /// Value buffer the host writes into for `attribute`.
    fn attribute_value(&self, attribute: u16) -> &[u8];
}
