//! Mock transports and a callback recorder shared by the integration tests.
//!
//! Mocks keep everything observable in a [`Trace`] borrowed by shared
//! reference, so tests can inspect it while the interface still holds the
//! mock itself. Transfer buffers are leaked to get the `'static` lifetime a
//! firmware gets from a `static`.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use rust_data_streaming::config::IsrPriority;
use rust_data_streaming::hal::{
    AsyncIo, CdcDevice, EventMask, GattServer, GattStatus, HalError, I2cMaster, SerialPort,
    SocketError, SpiMaster, TcpSocket,
};
use rust_data_streaming::{StreamBuffer, TransferTag, XferResult};

/// Leaked transfer buffer with the given contents.
pub fn buffer<const N: usize>(data: [u8; N]) -> &'static StreamBuffer<[u8; N]> {
    Box::leak(Box::new(StreamBuffer::new(data)))
}

/// Copy of a buffer's contents. Panics while it is lent.
pub fn contents<const N: usize>(buf: &StreamBuffer<[u8; N]>) -> Vec<u8> {
    buf.read(|data| data.to_vec()).expect("buffer still lent")
}

/// Records every callback invocation.
#[derive(Default)]
pub struct Recorder {
    calls: Mutex<Vec<(TransferTag, XferResult)>>,
}

impl Recorder {
    pub fn record(&self, tag: TransferTag, result: XferResult) {
        self.calls.lock().unwrap().push((tag, result));
    }

    pub fn calls(&self) -> Vec<(TransferTag, XferResult)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

/// What a mock transport saw and what it should do next.
#[derive(Default)]
pub struct Trace {
    /// Events enabled at setup
    pub enabled: Mutex<Option<(EventMask, IsrPriority)>>,
    /// Payloads handed over for writing
    pub written: Mutex<Vec<Vec<u8>>>,
    /// Lengths of read requests
    pub reads: Mutex<Vec<usize>>,
    /// Device addresses (I2C)
    pub addresses: Mutex<Vec<u16>>,
    /// Timeouts passed with each request (USB) or teardown (TCP)
    pub timeouts: Mutex<Vec<u32>>,
    /// Other calls in order, e.g. "disconnect", "delete", "notify"
    pub calls: Mutex<Vec<&'static str>>,
    /// Bytes copied into read buffers
    pub rx_data: Mutex<Vec<u8>>,
    /// Error code returned by the next start call
    pub fail_next: Mutex<Option<i32>>,
}

impl Trace {
    pub fn with_rx(data: &[u8]) -> Self {
        let trace = Self::default();
        trace.set_rx(data);
        trace
    }

    /// Bytes the next reads deliver.
    pub fn set_rx(&self, data: &[u8]) {
        *self.rx_data.lock().unwrap() = data.to_vec();
    }

    pub fn fail_next(&self, code: i32) {
        *self.fail_next.lock().unwrap() = Some(code);
    }

    pub fn enabled(&self) -> Option<(EventMask, IsrPriority)> {
        *self.enabled.lock().unwrap()
    }

    pub fn written(&self) -> Vec<Vec<u8>> {
        self.written.lock().unwrap().clone()
    }

    pub fn reads(&self) -> Vec<usize> {
        self.reads.lock().unwrap().clone()
    }

    pub fn addresses(&self) -> Vec<u16> {
        self.addresses.lock().unwrap().clone()
    }

    pub fn timeouts(&self) -> Vec<u32> {
        self.timeouts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn start(&self, tx: &[u8], rx: &mut [u8]) -> Result<(), HalError> {
        if let Some(code) = self.fail_next.lock().unwrap().take() {
            return Err(HalError(code));
        }
        if !tx.is_empty() {
            self.written.lock().unwrap().push(tx.to_vec());
        }
        if !rx.is_empty() {
            self.reads.lock().unwrap().push(rx.len());
            self.fill(rx);
        }
        Ok(())
    }

    fn fill(&self, rx: &mut [u8]) -> usize {
        let data = self.rx_data.lock().unwrap();
        let n = rx.len().min(data.len());
        rx[..n].copy_from_slice(&data[..n]);
        n
    }

    fn enable(&self, events: EventMask, priority: IsrPriority) {
        *self.enabled.lock().unwrap() = Some((events, priority));
    }
}

pub struct MockI2c<'a> {
    pub trace: &'a Trace,
}

impl I2cMaster for MockI2c<'_> {
    fn transfer_async(
        &mut self,
        address: u16,
        tx: &'static [u8],
        rx: &'static mut [u8],
    ) -> Result<(), HalError> {
        self.trace.addresses.lock().unwrap().push(address);
        self.trace.start(tx, rx)
    }

    fn enable_events(&mut self, events: EventMask, priority: IsrPriority) {
        self.trace.enable(events, priority);
    }
}

pub struct MockSpi<'a> {
    pub trace: &'a Trace,
}

impl SpiMaster for MockSpi<'_> {
    fn transfer_async(
        &mut self,
        tx: &'static [u8],
        rx: &'static mut [u8],
    ) -> Result<(), HalError> {
        self.trace.start(tx, rx)
    }

    fn enable_events(&mut self, events: EventMask, priority: IsrPriority) {
        self.trace.enable(events, priority);
    }
}

pub struct MockUart<'a> {
    pub trace: &'a Trace,
}

impl SerialPort for MockUart<'_> {
    fn write_async(&mut self, data: &'static [u8]) -> Result<(), HalError> {
        self.trace.start(data, &mut [])
    }

    fn read_async(&mut self, buf: &'static mut [u8]) -> Result<(), HalError> {
        self.trace.start(&[], buf)
    }

    fn enable_events(&mut self, events: EventMask, priority: IsrPriority) {
        self.trace.enable(events, priority);
    }
}

pub struct MockCdc<'a> {
    pub trace: &'a Trace,
}

impl CdcDevice for MockCdc<'_> {
    fn write_async(
        &mut self,
        io: AsyncIo<&'static [u8]>,
        timeout_ms: u32,
    ) -> Result<(), HalError> {
        self.trace.timeouts.lock().unwrap().push(timeout_ms);
        self.trace.start(&io.buffer[..io.num_bytes], &mut [])
    }

    fn read_async(
        &mut self,
        io: AsyncIo<&'static mut [u8]>,
        timeout_ms: u32,
    ) -> Result<(), HalError> {
        self.trace.timeouts.lock().unwrap().push(timeout_ms);
        let n = io.num_bytes;
        self.trace.start(&[], &mut io.buffer[..n])
    }
}

/// TCP socket replaying scripted results; unscripted calls move everything.
pub struct MockSocket<'a> {
    pub trace: &'a Trace,
    pub script: VecDeque<Result<usize, SocketError>>,
}

impl<'a> MockSocket<'a> {
    pub fn new(trace: &'a Trace) -> Self {
        Self {
            trace,
            script: VecDeque::new(),
        }
    }

    pub fn then(mut self, result: Result<usize, SocketError>) -> Self {
        self.script.push_back(result);
        self
    }
}

impl TcpSocket for MockSocket<'_> {
    fn send(&mut self, data: &[u8]) -> Result<usize, SocketError> {
        self.trace.written.lock().unwrap().push(data.to_vec());
        self.script.pop_front().unwrap_or(Ok(data.len()))
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, SocketError> {
        self.trace.reads.lock().unwrap().push(buf.len());
        match self.script.pop_front() {
            Some(result) => result,
            None => Ok(self.trace.fill(buf)),
        }
    }

    fn disconnect(&mut self, timeout_ms: u32) -> Result<(), SocketError> {
        self.trace.calls.lock().unwrap().push("disconnect");
        self.trace.timeouts.lock().unwrap().push(timeout_ms);
        Ok(())
    }

    fn delete(&mut self) -> Result<(), SocketError> {
        self.trace.calls.lock().unwrap().push("delete");
        Ok(())
    }
}

/// GATT server with one host-written value and a fixed push status.
pub struct MockGatt<'a> {
    pub trace: &'a Trace,
    pub value: Vec<u8>,
    pub status: GattStatus,
}

impl<'a> MockGatt<'a> {
    pub fn new(trace: &'a Trace, value: &[u8]) -> Self {
        Self {
            trace,
            value: value.to_vec(),
            status: GattStatus::Success,
        }
    }
}

impl GattServer for MockGatt<'_> {
    fn send_notification(&mut self, _conn_id: u16, _attribute: u16, value: &[u8]) -> GattStatus {
        self.trace.calls.lock().unwrap().push("notify");
        self.trace.written.lock().unwrap().push(value.to_vec());
        self.status
    }

    fn send_indication(&mut self, _conn_id: u16, _attribute: u16, value: &[u8]) -> GattStatus {
        self.trace.calls.lock().unwrap().push("indicate");
        self.trace.written.lock().unwrap().push(value.to_vec());
        self.status
    }

    fn attribute_value(&self, _attribute: u16) -> &[u8] {
        &self.value
    }
}
