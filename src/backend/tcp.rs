//! TCP backend.
//!
//! Socket calls complete synchronously under the guard, so the callback
//! runs before `send`/`receive` returns. Partial transfers are failures.
//! A connection closed by the peer is torn down right away; every later
//! request fails with `Transfer` without touching the socket.

use crate::completion::{Outcome, XferDone};
use crate::config::TcpStreamConfig;
use crate::error::StreamError;
use crate::hal::{SocketError, TcpSocket};
use crate::interface::{Backend, StreamingInterface};
use crate::log_globals::TASK_LOG_STREAM;
use crate::{isr_error, isr_info, isr_warn};

/// Install the TCP backend on a connected `socket`.
pub fn setup_tcp<'d>(
    socket: &'d mut dyn TcpSocket,
    config: &TcpStreamConfig,
    callback: &'d XferDone<'d>,
) -> StreamingInterface<'d> {
    isr_info!(
        TASK_LOG_STREAM,
        "tcp: setup disconnect_timeout={}ms",
        config.disconnect_timeout_ms
    );

    StreamingInterface::new(
        Backend::Tcp {
            socket,
            disconnect_timeout_ms: config.disconnect_timeout_ms,
            closed: false,
        },
        callback,
    )
}

pub(crate) fn send<S>(
    socket: &mut S,
    disconnect_timeout_ms: u32,
    closed: &mut bool,
    data: &[u8],
) -> Outcome
where
    S: TcpSocket + ?Sized,
{
    if *closed {
        return deleted("send");
    }
    let moved = socket.send(data);
    check(socket, disconnect_timeout_ms, closed, "send", data.len(), moved)
}

pub(crate) fn receive<S>(
    socket: &mut S,
    disconnect_timeout_ms: u32,
    closed: &mut bool,
    data: &mut [u8],
) -> Outcome
where
    S: TcpSocket + ?Sized,
{
    if *closed {
        return deleted("recv");
    }
    let len = data.len();
    let moved = socket.recv(data);
    check(socket, disconnect_timeout_ms, closed, "recv", len, moved)
}

fn deleted(op: &str) -> Outcome {
    isr_warn!(TASK_LOG_STREAM, "tcp: {} on closed socket", op);
    Outcome::Failed(StreamError::Transfer)
}

fn check<S>(
    socket: &mut S,
    disconnect_timeout_ms: u32,
    closed: &mut bool,
    op: &str,
    expected: usize,
    moved: Result<usize, SocketError>,
) -> Outcome
where
    S: TcpSocket + ?Sized,
{
    match moved {
        Ok(n) if n == expected => Outcome::Finished,
        Ok(n) => {
            isr_warn!(TASK_LOG_STREAM, "tcp: short {} {}/{} bytes", op, n, expected);
            Outcome::Failed(StreamError::Transfer)
        }
        Err(SocketError::Closed) => {
            isr_warn!(TASK_LOG_STREAM, "tcp: peer closed during {}", op);
            close(socket, disconnect_timeout_ms);
            *closed = true;
            Outcome::Failed(StreamError::Transfer)
        }
        Err(SocketError::Failed(code)) => {
            isr_error!(TASK_LOG_STREAM, "tcp: {} failed ({})", op, code);
            Outcome::Failed(StreamError::Transfer)
        }
    }
}

/// Disconnect then delete. Errors are logged; the transfer already failed.
fn close<S>(socket: &mut S, timeout_ms: u32)
where
    S: TcpSocket + ?Sized,
{
    if let Err(e) = socket.disconnect(timeout_ms) {
        isr_warn!(TASK_LOG_STREAM, "tcp: disconnect failed: {:?}", e);
    }
    if let Err(e) = socket.delete() {
        isr_warn!(TASK_LOG_STREAM, "tcp: delete failed: {:?}", e);
    }
}
