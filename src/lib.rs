//! # rust-data-streaming
//!
//! Transport-agnostic data streaming for embedded targets.
//!
//! ## Architecture
//!
//! One non-blocking request/completion contract over BLE GATT, I2C master,
//! SPI master, TCP, UART and USB CDC:
//! - `setup_*` borrows an initialized transport and returns a
//!   [`StreamingInterface`]
//! - [`StreamingInterface::send`] / [`StreamingInterface::receive`] lend a
//!   `'static` [`StreamBuffer`] to one transfer and return immediately
//! - the completion callback fires exactly once per accepted transfer with
//!   the caller's [`TransferTag`] and an [`XferResult`]
//!
//! At most one transfer is outstanding per interface; a second request gets
//! [`StreamError::InProgress`]. No heap, no locks, no blocking.

#![cfg_attr(not(test), no_std)]

pub mod logging;
pub mod log_globals;
pub mod log_drain;
pub mod error;
pub mod config;
pub mod guard;
pub mod buffer;
pub mod stats;
pub mod hal;
pub mod completion;
pub mod interface;
pub mod backend;

pub use backend::{setup_ble, setup_i2c, setup_spi, setup_tcp, setup_uart, setup_usb, BleLink};
pub use buffer::StreamBuffer;
pub use completion::XferDone;
pub use config::{
    I2cStreamConfig, IsrPriority, SpiStreamConfig, TcpStreamConfig, UartStreamConfig,
    UsbStreamConfig,
};
pub use error::{StreamError, XferResult};
pub use guard::TransferTag;
pub use hal::TransportEvent;
pub use interface::{BackendKind, StreamingInterface};
pub use log_globals::{ISR_LOG_STREAM, TASK_LOG_STREAM};
pub use stats::StatsSnapshot;

/// Firmware version string, including the git hash.
pub const VERSION: &str = env!("VERSION_STRING");
