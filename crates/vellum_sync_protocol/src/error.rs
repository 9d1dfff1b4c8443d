//! Error types for stream framing.

use std::io;
use thiserror::Error;
use vellum_core::StoreError;

/// Result type for framing operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors that can occur while encoding or decoding entry streams.
#[derive(Debug, Error)]
pub enum FrameError {
    /// I/O error on the underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(io::Error),

    /// The stream does not start with the expected magic bytes.
    #[error("bad stream magic: {found:02x?}")]
    BadMagic {
        /// The bytes found instead.
        found: [u8; 4],
    },

    /// The stream ended before its end marker.
    #[error("stream truncated before end marker")]
    Truncated,

    /// A key length exceeds the configured limit.
    #[error("key too large: {len} bytes (max {max})")]
    KeyTooLarge {
        /// Declared or actual length.
        len: u64,
        /// Configured limit.
        max: u64,
    },

    /// A value length exceeds the configured limit.
    #[error("value too large: {len} bytes (max {max})")]
    ValueTooLarge {
        /// Declared or actual length.
        len: u64,
        /// Configured limit.
        max: u64,
    },

    /// A key is not valid UTF-8.
    #[error("key is not valid UTF-8")]
    InvalidKey,

    /// The entry stream being written failed.
    #[error("upstream error: {0}")]
    Upstream(#[from] StoreError),
}

impl From<io::Error> for FrameError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            FrameError::Truncated
        } else {
            FrameError::Io(err)
        }
    }
}

impl From<FrameError> for StoreError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Upstream(inner) => inner,
            other => StoreError::transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_core::ErrorKind;

    #[test]
    fn eof_is_truncation() {
        let err: FrameError = io::Error::from(io::ErrorKind::UnexpectedEof).into();
        assert!(matches!(err, FrameError::Truncated));

        let err: FrameError = io::Error::from(io::ErrorKind::BrokenPipe).into();
        assert!(matches!(err, FrameError::Io(_)));
    }

    #[test]
    fn converts_into_store_errors() {
        let err: StoreError = FrameError::Truncated.into();
        assert_eq!(err.kind(), ErrorKind::Transport);

        let err: StoreError = FrameError::Upstream(StoreError::invalid_key("k")).into();
        assert_eq!(err.kind(), ErrorKind::InvalidKey);
    }

    #[test]
    fn error_display() {
        let err = FrameError::BadMagic {
            found: *b"HTTP",
        };
        assert_eq!(err.to_string(), "bad stream magic: [48, 54, 54, 50]");
    }
}
