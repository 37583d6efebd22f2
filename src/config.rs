//! Module: config
//!
//! Purpose: Setup parameters for each streaming backend.
//!
//! Every backend takes its own small config struct at setup. Values are fixed
//! for the lifetime of the interface; nothing here is changed at runtime.

/// Machine words reserved for a backend context inside
/// [`StreamingInterface`](crate::StreamingInterface).
///
/// Every backend variant must fit; checked at compile time.
pub const CONTEXT_WORDS: usize = 4;

/// Interrupt priority used when enabling transport completion events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct IsrPriority(pub u8);

impl IsrPriority {
    /// Highest level a C-registered ISR may use on ESP-IDF.
    pub const DEFAULT: Self = Self(3);
}

impl Default for IsrPriority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// I2C master backend configuration.
///
/// No `Default`: the target device address must always be given.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct I2cStreamConfig {
    /// 7-bit (or 10-bit) address of the peer device
    pub address: u16,
    /// Priority of the master-transfer completion interrupt
    pub isr_priority: IsrPriority,
}

impl I2cStreamConfig {
    pub const fn new(address: u16) -> Self {
        Self {
            address,
            isr_priority: IsrPriority::DEFAULT,
        }
    }
}

/// SPI master backend configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpiStreamConfig {
    pub isr_priority: IsrPriority,
}

/// UART backend configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UartStreamConfig {
    pub isr_priority: IsrPriority,
}

/// TCP backend configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TcpStreamConfig {
    /// Timeout handed to the socket disconnect after the peer closed (0 = immediate)
    pub disconnect_timeout_ms: u32,
}

/// USB CDC backend configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UsbStreamConfig {
    /// Async I/O timeout (0 = wait forever)
    pub timeout_ms: u32,
}
