//! USB CDC device transport.

use super::HalError;

/// Async I/O request handed to the USB stack.
#[derive(Debug)]
pub struct AsyncIo<B> {
    /// Bytes to move
    pub num_bytes: usize,
    /// Source (write) or destination (read) memory
    pub buffer: B,
}

impl<B: AsRef<[u8]>> AsyncIo<B> {
    /// Request covering the whole buffer.
    pub fn new(buffer: B) -> Self {
        Self {
            num_bytes: buffer.as_ref().len(),
            buffer,
        }
    }
}

/// Completion status of an async I/O request. Zero means success.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AsyncIoStatus(pub i32);

impl AsyncIoStatus {
    pub const OK: Self = Self(0);

    pub fn is_ok(self) -> bool {
        self.0 == 0
    }
}

/// USB CDC ACM function of a started USB device stack.
pub trait CdcDevice: Send {
    /// Queue a bulk IN transfer.
    fn write_async(&mut self, io: AsyncIo<&'static [u8]>, timeout_ms: u32)
        -> Result<(), HalError>;

    /// Queue a bulk OUT transfer.
    fn read_async(&mut self, io: AsyncIo<&'static mut [u8]>, timeout_ms: u32)
        -> Result<(), HalError>;
}
