use core::fmt;

/// The error type returned by the conversion entry points.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
}

/// What went wrong. The core itself can only fail one way; input screening
/// (non-finite values, sign handling) is the caller's job.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The provided buffer cannot hold the rendered characters.
    BufferTooSmall,
}

impl Error {
    #[inline]
    pub(crate) fn buffer_too_small() -> Error {
        Error {
            kind: ErrorKind::BufferTooSmall,
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::BufferTooSmall => f.write_str("output buffer too small for the rendered value"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
