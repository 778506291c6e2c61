//! Serial output sink and line format.
//!
//! Each identifier goes out as its decimal ASCII digits followed by CR LF.
//! There is no other framing and no acknowledgment.

use core::fmt::{self, Write as FmtWrite};
use heapless::String as HString;

use crate::wiegand::CardId;

/// Longest line: "65535\r\n".
pub const MAX_LINE_LEN: usize = 7;

/// Error type for sink writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkError {
    /// UART or transport I/O error.
    Io,
    /// Sink cannot take more data right now.
    Busy,
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Io => write!(f, "I/O error"),
            SinkError::Busy => write!(f, "sink busy"),
        }
    }
}

/// Destination for formatted identifier lines (UART in firmware, a buffer in tests).
pub trait TagSink {
    /// Write one complete line. A failed line is not retried.
    fn write_line(&mut self, line: &[u8]) -> Result<(), SinkError>;
}

impl<T: TagSink + ?Sized> TagSink for &mut T {
    fn write_line(&mut self, line: &[u8]) -> Result<(), SinkError> {
        (**self).write_line(line)
    }
}

/// Format `id` as `"<decimal>\r\n"`.
pub fn format_line(id: CardId) -> HString<MAX_LINE_LEN> {
    let mut line: HString<MAX_LINE_LEN> = HString::new();
    // u16 plus CRLF always fits
    let _ = write!(line, "{}\r\n", id.value());
    line
}
