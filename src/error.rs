//! Streaming error vocabulary.
//!
//! Every backend translates its native status codes into [`StreamError`]
//! before anything reaches the caller, so application code only ever sees
//! these four failures plus `Ok(())`.

/// Outcome of a send/receive, both when returned synchronously and when
/// delivered to the completion callback.
pub type XferResult = Result<(), StreamError>;

/// Streaming error with a stable numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StreamError {
    /// 0: An operation is already outstanding on this interface
    InProgress = 0,
    /// 1: The transport reported a failure
    Transfer = 1,
    /// 2: Payload does not fit the transport's send buffer
    Overflow = 2,
    /// 3: Request exceeds the data held in the transport's receive buffer
    Underflow = 3,
}

impl StreamError {
    /// Numeric error code
    pub const fn code(&self) -> u8 {
        *self as u8
    }

    /// Convert from raw code. Unknown codes map to `None`.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::InProgress),
            1 => Some(Self::Transfer),
            2 => Some(Self::Overflow),
            3 => Some(Self::Underflow),
            _ => None,
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::InProgress => "operation already in progress",
            Self::Transfer => "transfer failed",
            Self::Overflow => "send buffer overflow",
            Self::Underflow => "receive buffer underflow",
        }
    }
}

impl core::fmt::Display for StreamError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "E{:02}: {}", self.code(), self.message())
    }
}
