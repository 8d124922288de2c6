use std::io;

use snafu::{Backtrace, Snafu};

pub type Result<T, E = Error> = ::std::result::Result<T, E>;

/// Error types
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    /// Structural violation in the packet stream: bad control byte, short
    /// body, disallowed version, bad S2K mode.
    #[snafu(display("invalid packet: {message}"))]
    InvalidPacket {
        message: String,
        backtrace: Option<Backtrace>,
    },
    /// The byte source failed mid-body.
    #[snafu(display("read error: {source}"), context(false))]
    Read {
        source: io::Error,
        backtrace: Option<Backtrace>,
    },
    /// The copy sink failed.
    #[snafu(display("write error: {source}"))]
    Write {
        source: io::Error,
        backtrace: Option<Backtrace>,
    },
    /// A type code that is understood but has no decoder. Distinct from the
    /// dispatcher's skip of reserved types, so callers can tell malformed
    /// from merely unsupported.
    #[snafu(display("unknown packet type {typ}"))]
    UnknownPacket {
        typ: u8,
        backtrace: Option<Backtrace>,
    },
}

impl Error {
    /// Returns true for the structural-violation kind.
    pub fn is_invalid_packet(&self) -> bool {
        matches!(self, Self::InvalidPacket { .. })
    }

    /// Returns true when the underlying byte source failed.
    pub fn is_read_error(&self) -> bool {
        matches!(self, Self::Read { .. })
    }
}

#[macro_export]
macro_rules! format_err {
    ($($arg:tt)*) => {
        $crate::errors::Error::InvalidPacket {
            message: format!($($arg)*),
            backtrace: ::snafu::GenerateImplicitData::generate(),
        }
    };
}

#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::format_err!($($arg)*))
    };
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            return Err($crate::format_err!($($arg)*));
        }
    };
}
