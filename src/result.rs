//! Error types that can be emitted from this library

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Generic result type with ZipError as its error variant
pub type ZipResult<T> = Result<T, ZipError>;

/// Error type for Zip
///
/// Errors are sticky: the reader that produced one keeps reporting it on
/// every subsequent call, which is why the type is `Clone` (the `Io` variant
/// shares its source through an `Arc`).
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ZipError {
    /// An error caused by I/O on the underlying byte source or decoder
    #[error("io error while reading zip archive: {0}")]
    Io(#[source] Arc<io::Error>),

    /// This data is probably not a zip archive. The reason is enclosed.
    #[error("invalid zip archive: {0}")]
    InvalidArchive(&'static str),

    /// The archive uses a feature this reader does not support. The reason
    /// is enclosed.
    #[error("unsupported zip archive: {0}")]
    UnsupportedArchive(&'static str),

    /// The byte source ended before the structure being read was complete
    #[error("unexpected end of stream: {0}")]
    UnexpectedEof(&'static str),

    /// The decoded bytes do not match the declared CRC-32
    #[error("crc32 checksum mismatch (expected {expected:#010x}, computed {actual:#010x})")]
    Crc32Mismatch {
        /// CRC-32 declared by the local header or data descriptor
        expected: u32,
        /// CRC-32 computed over the decoded bytes
        actual: u32,
    },

    /// An observed byte count disagrees with a declared or
    /// descriptor-supplied value
    #[error("invalid entry {field} size (expected {declared} bytes, got {observed})")]
    SizeMismatch {
        /// Which count disagreed, `"compressed"` or `"uncompressed"`
        field: &'static str,
        /// The value from the header or data descriptor
        declared: u64,
        /// The value observed while reading
        observed: u64,
    },

    /// The reader was used in a way its state does not allow
    #[error("invalid reader state: {0}")]
    InvalidState(&'static str),
}

impl From<io::Error> for ZipError {
    fn from(err: io::Error) -> ZipError {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            ZipError::UnexpectedEof("byte source ended prematurely")
        } else {
            ZipError::Io(Arc::new(err))
        }
    }
}

impl From<ZipError> for io::Error {
    fn from(err: ZipError) -> io::Error {
        let kind = match &err {
            ZipError::Io(inner) => inner.kind(),
            ZipError::UnexpectedEof(_) => io::ErrorKind::UnexpectedEof,
            ZipError::InvalidArchive(_)
            | ZipError::Crc32Mismatch { .. }
            | ZipError::SizeMismatch { .. } => io::ErrorKind::InvalidData,
            ZipError::UnsupportedArchive(_) => io::ErrorKind::Unsupported,
            ZipError::InvalidState(_) => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}
