//! Error types for the CAF container codec.

use thiserror::Error;

/// Result type for container operations.
pub type CafResult<T> = Result<T, CafError>;

/// Broad classification of a [`CafError`].
///
/// Callers use this to tell "not this container format" apart from "this
/// container format, but an encoding we don't handle".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The byte stream does not have the layout of a CAF file.
    Structural,
    /// The file is a CAF file, but its sample encoding is not supported.
    UnsupportedFormat,
    /// The underlying byte store failed.
    Resource,
    /// A caller-supplied parameter was out of range.
    InvalidParameter,
    /// The stream was left unusable by an earlier failure.
    Broken,
}

/// Errors that can occur while opening, reading or writing a CAF stream.
#[derive(Debug, Error)]
pub enum CafError {
    /// The container layout is malformed.
    #[error("malformed CAF file: {message}")]
    Structural {
        /// What was wrong with the layout.
        message: String,
        /// Byte offset where the problem was detected, if known.
        offset: Option<u64>,
    },

    /// The descriptor fields match no supported encoding.
    #[error("unsupported encoding: {message}")]
    UnsupportedFormat {
        /// Error message.
        message: String,
    },

    /// I/O error from the byte store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// The writer failed to emit its header earlier and refuses further work.
    #[error("stream is broken after an earlier header write failure")]
    Broken,
}

impl CafError {
    /// Creates a structural error without offset information.
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural {
            message: message.into(),
            offset: None,
        }
    }

    /// Creates a structural error detected at a byte offset.
    pub fn structural_at(message: impl Into<String>, offset: u64) -> Self {
        Self::Structural {
            message: message.into(),
            offset: Some(offset),
        }
    }

    /// Creates an unsupported format error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            message: message.into(),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns the broad classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CafError::Structural { .. } => ErrorKind::Structural,
            CafError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            CafError::Io(_) => ErrorKind::Resource,
            CafError::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            CafError::Broken => ErrorKind::Broken,
        }
    }

    /// Returns a stable error code.
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Structural => "CAF_001",
            ErrorKind::UnsupportedFormat => "CAF_002",
            ErrorKind::Resource => "CAF_003",
            ErrorKind::InvalidParameter => "CAF_004",
            ErrorKind::Broken => "CAF_005",
        }
    }

    /// Returns the error category name.
    pub fn category(&self) -> &'static str {
        "caf"
    }

    /// Returns true if this error means the input is not a well-formed CAF file.
    pub fn is_structural(&self) -> bool {
        self.kind() == ErrorKind::Structural
    }

    /// Returns true if this error means the encoding is not supported.
    pub fn is_unsupported(&self) -> bool {
        self.kind() == ErrorKind::UnsupportedFormat
    }
}

/// Converts an I/O error hit while parsing a header into a structural error
/// when it is caused by the input ending early.
///
/// Any other I/O failure is passed through unchanged.
pub(crate) fn truncated(err: std::io::Error, what: &str, offset: u64) -> CafError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        CafError::structural_at(format!("file truncated while reading {}", what), offset)
    } else {
        CafError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_helper() {
        let err = CafError::structural_at("no 'data' chunk", 52);
        assert!(err.to_string().contains("no 'data' chunk"));
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(err.code(), "CAF_001");
    }

    #[test]
    fn test_io_error_is_resource() {
        let err: CafError = std::io::Error::new(std::io::ErrorKind::Other, "disk gone").into();
        assert_eq!(err.kind(), ErrorKind::Resource);
        assert!(err.to_string().contains("disk gone"));
    }

    #[test]
    fn test_truncated_maps_eof_to_structural() {
        let eof = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err = truncated(eof, "descriptor", 20);
        assert!(err.is_structural());
        assert!(err.to_string().contains("descriptor"));

        let other = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(truncated(other, "descriptor", 20).kind(), ErrorKind::Resource);
    }

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            CafError::structural("x"),
            CafError::unsupported("x"),
            CafError::Io(std::io::Error::new(std::io::ErrorKind::Other, "x")),
            CafError::invalid_param("channels", "x"),
            CafError::Broken,
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
