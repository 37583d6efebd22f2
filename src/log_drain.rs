//! Log output: drains the log streams into a byte sink.
//!
//! The formatting and draining helpers are sink-agnostic. On ESP-IDF a
//! TX-only UART driver is the sink, fed by [`uart_logger_task`].
//!
//! # Hardware Setup
//!
//! ```text
//! ESP32 GPIOx (TX) ──────▶ USB-UART RX
//!                           └─▶ PC Serial Monitor
//! ```

use crate::log_globals::{ISR_LOG_STREAM, TASK_LOG_STREAM};
use crate::logging::{format_to_buffer, LogEntry, LogStream};

#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::gpio;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::peripheral::Peripheral;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::uart::{self, UartTxDriver};

/// Formatted line buffer size.
pub const LINE_BUF_SIZE: usize = 160;

/// UART configuration for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UartLoggerConfig {
    pub baud_rate: u32,
    pub tx_pin: u8,
}

impl Default for UartLoggerConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115200,
            tx_pin: 6,
        }
    }
}

/// Format a log entry.
///
/// Format: `[timestamp_us] LEVEL: message\n`
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    format_to_buffer(
        buf,
        format_args!(
            "[{:10}] {}: {}\n",
            entry.timestamp_us,
            entry.level.as_str(),
            entry.message()
        ),
    )
}

/// Drain every pending entry of `stream` into `sink`, one line per call.
///
/// Returns the number of entries written.
pub fn drain_stream<const N: usize>(stream: &LogStream<N>, mut sink: impl FnMut(&[u8])) -> usize {
    let mut line = [0u8; LINE_BUF_SIZE];
    let mut count = 0;

    while let Some(entry) = stream.drain() {
        let len = format_log_entry(&entry, &mut line);
        sink(&line[..len]);
        count += 1;
    }

    count
}

/// Write a warning line if either global stream dropped entries, then
/// reset both counters.
///
/// Returns `true` if a line was written.
pub fn report_dropped(mut sink: impl FnMut(&[u8])) -> bool {
    let isr_dropped = ISR_LOG_STREAM.dropped();
    let task_dropped = TASK_LOG_STREAM.dropped();

    if isr_dropped == 0 && task_dropped == 0 {
        return false;
    }

    let mut msg = [0u8; 64];
    let len = format_to_buffer(
        &mut msg,
        format_args!("[WARN] dropped: isr={}, task={}\n", isr_dropped, task_dropped),
    );
    sink(&msg[..len]);

    ISR_LOG_STREAM.reset_dropped();
    TASK_LOG_STREAM.reset_dropped();
    true
}

/// Initialize a TX-only UART for logging output.
#[cfg(target_os = "espidf")]
pub fn init_uart_logger<'d>(
    uart: impl Peripheral<P = impl uart::Uart> + 'd,
    tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
    config: &UartLoggerConfig,
) -> Result<UartTxDriver<'d>, esp_idf_svc::sys::EspError> {
    let uart_config = uart::config::Config::default()
        .baudrate(esp_idf_svc::hal::units::Hertz(config.baud_rate));

    UartTxDriver::new(
        uart,
        tx_pin,
        Option::<gpio::AnyIOPin>::None, // CTS
        Option::<gpio::AnyIOPin>::None, // RTS
        &uart_config,
    )
}

/// UART log consumer task.
///
/// Completion-path logs are drained first. Dropped counts are reported at
/// most every 10 seconds.
#[cfg(target_os = "espidf")]
pub fn uart_logger_task(uart: &mut UartTxDriver<'_>) -> ! {
    let mut last_dropped_report = 0i64;

    let _ = uart.write(crate::VERSION.as_bytes());
    let _ = uart.write(b"\n");

    loop {
        let mut written = drain_stream(&ISR_LOG_STREAM, |line| {
            let _ = uart.write(line);
        });
        written += drain_stream(&TASK_LOG_STREAM, |line| {
            let _ = uart.write(line);
        });

        let now = crate::logging::timestamp_us();
        if now - last_dropped_report > 10_000_000 {
            report_dropped(|line| {
                let _ = uart.write(line);
            });
            last_dropped_report = now;
        }

        if written == 0 {
            // SAFETY: Plain FreeRTOS delay from task context
            unsafe {
                esp_idf_svc::sys::vTaskDelay(10);
            }
        }
    }
}
