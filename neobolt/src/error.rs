// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! Types representing the errors that can be returned.

/// The underlying error enum. Stream failures are sticky: once a result
/// stream has failed, every subsequent operation on it reports the same
/// failure until the stream is closed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The server rejected or aborted the statement, with a machine-readable
    /// code and a human-readable message.
    #[error("Statement evaluation failed: [{code}] {message}")]
    Statement {
        /// The server-supplied short error code, eg
        /// `Neo.ClientError.Statement.SyntaxError`.
        code: String,
        /// The server-supplied human-readable message.
        message: String,
    },
    /// The server broke the wire protocol; the connection is poisoned.
    #[error("Protocol error: {0}")]
    Protocol(String),
    /// The connection went away mid-result.
    #[error("Connection closed")]
    ConnectionClosed,
    /// The server ran out of memory producing the result.
    #[error("Server out of memory")]
    OutOfMemory,
    /// Io error from the transport.
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    /// A field index beyond the header's field count was asked for.
    #[error("Field index {index} out of range; the result has {len} fields")]
    FieldOutOfRange {
        /// The index asked for.
        index: usize,
        /// The number of fields in the result.
        len: usize,
    },
    /// The stream was used after [`crate::ResultStream::close`].
    #[error("The result stream has been closed")]
    StreamClosed,
    /// Host verification error.
    #[error("Host verification error: {0}")]
    Tofu(#[from] neobolt_tofu::Error),
}

impl Error {
    /// The stable failure kind of this error, if it is one of the failures
    /// that poison a result stream. Local errors such as
    /// [`Error::FieldOutOfRange`] have no kind and leave the stream healthy.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Error::Statement { .. } => Some(FailureKind::Statement),
            Error::Protocol(_) => Some(FailureKind::Protocol),
            Error::ConnectionClosed => Some(FailureKind::ConnectionClosed),
            Error::OutOfMemory => Some(FailureKind::OutOfMemory),
            Error::Io(_) => Some(FailureKind::Io),
            _ => None,
        }
    }
}

/// The stable classification of result-stream failures.
///
/// The numeric identifiers returned by [`FailureKind::code`] are part of the
/// public contract and never change meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The server reported a statement evaluation failure; the stream's
    /// server code and message are available.
    Statement,
    /// The server broke the wire protocol.
    Protocol,
    /// The connection went away mid-result.
    ConnectionClosed,
    /// The server ran out of memory.
    OutOfMemory,
    /// A transport error was passed through.
    Io,
}

impl FailureKind {
    /// The stable numeric identifier of this kind.
    pub fn code(self) -> u32 {
        match self {
            FailureKind::Statement => 1,
            FailureKind::Protocol => 2,
            FailureKind::ConnectionClosed => 3,
            FailureKind::OutOfMemory => 4,
            FailureKind::Io => 5,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn local_errors_have_no_failure_kind() {
        assert_eq!(
            Error::FieldOutOfRange { index: 3, len: 2 }.failure_kind(),
            None
        );
        assert_eq!(Error::StreamClosed.failure_kind(), None);
    }

    #[test]
    fn kind_codes_are_stable() {
        assert_eq!(FailureKind::Statement.code(), 1);
        assert_eq!(FailureKind::Protocol.code(), 2);
        assert_eq!(FailureKind::ConnectionClosed.code(), 3);
        assert_eq!(FailureKind::OutOfMemory.code(), 4);
        assert_eq!(FailureKind::Io.code(), 5);
    }
}
