use std::{borrow::Cow, fmt::Display};

/// The error type of the crate.
#[derive(Debug)]
pub enum Error {
    /// The byte source ended while the decoder needed another byte.
    StreamExhausted {
        /// Number of bytes consumed before the source ran dry.
        position: u64,
    },
    /// First byte of a range coder stream was not zero.
    BadInitByte(u8),
    /// Initial code value can't be produced by a compliant encoder.
    BadInitCode,
    /// IO error with optional context message.
    Io(std::io::Error, Cow<'static, str>),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::io(value)
    }
}

impl From<Error> for std::io::Error {
    fn from(value: Error) -> Self {
        match value {
            Error::Io(e, _) => e,
            Error::StreamExhausted { position } => std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("range coder stream exhausted after {position} bytes"),
            ),
            err => std::io::Error::new(std::io::ErrorKind::InvalidData, err),
        }
    }
}

impl Error {
    #[inline]
    pub(crate) fn io(e: std::io::Error) -> Self {
        Self::io_msg(e, "")
    }

    #[inline]
    pub(crate) fn io_msg(e: std::io::Error, msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Io(e, msg.into())
    }

    /// Maps a failed single byte read at `position` of the source.
    pub(crate) fn read(e: std::io::Error, position: u64) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => Self::StreamExhausted { position },
            _ => Self::io_msg(e, "reading range coder input"),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e, _) => Some(e),
            _ => None,
        }
    }
}
