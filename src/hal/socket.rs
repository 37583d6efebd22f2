//! TCP socket transport.
//!
//! Socket calls complete synchronously; there is no event path.

/// Socket failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SocketError {
    /// Peer closed the connection
    Closed,
    /// Any other stack error, with its native code
    Failed(i32),
}

/// Connected TCP socket.
pub trait TcpSocket: Send {
    /// Send `data`, returning the number of bytes accepted by the stack.
    fn send(&mut self, data: &[u8]) -> Result<usize, SocketError>;

    /// Receive into `buf`, returning the number of bytes read.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, SocketError>;

    /// Shut the connection down.
    fn disconnect(&mut self, timeout_ms: u32) -> Result<(), SocketError>;

    /// Release the socket. No call is valid afterwards except another `delete`.
    fn delete(&mut self) -> Result<(), SocketError>;
}
