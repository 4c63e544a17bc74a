use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;
use tokio::sync::mpsc::error::SendError as MpscSendError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    // Message decoding.
    #[error("unexpected EOF: not enough bytes to read header")]
    ErrUnexpectedHeaderEof,
    #[error("magic cookie mismatch")]
    ErrBadMagicCookie,
    #[error("buffer is shorter than declared message length")]
    ErrBadMessageLength,
    #[error("unexpected EOF: not enough bytes to read attribute header")]
    ErrAttributeHeaderEof,
    #[error("unexpected EOF: not enough bytes to read attribute value")]
    ErrAttributeValueEof,
    #[error("unexpected EOF")]
    ErrUnexpectedEof,
    #[error("bad address family")]
    ErrBadFamily,
    #[error("attribute size is invalid")]
    ErrAttributeSizeInvalid,
    #[error("attribute size overflow")]
    ErrAttributeSizeOverflow,
    #[error("attribute not found")]
    ErrAttributeNotFound,

    // Credentials and integrity.
    #[error("integrity check failed")]
    ErrIntegrityMismatch,
    #[error("fingerprint check failed")]
    ErrFingerprintMismatch,
    #[error("FINGERPRINT before MESSAGE-INTEGRITY attribute")]
    ErrFingerprintBeforeIntegrity,

    // Attribute encoding.
    #[error("invalid length of IP value")]
    ErrBadIpLength,
    #[error("no default reason for ERROR-CODE")]
    ErrNoDefaultReason,
    #[error("bad UNKNOWN-ATTRIBUTES size")]
    ErrBadUnknownAttrsSize,

    // Transaction agent.
    #[error("agent is closed")]
    ErrAgentClosed,
    #[error("transaction exists with same id")]
    ErrTransactionExists,
    #[error("transaction not exists")]
    ErrTransactionNotExists,
    #[error("transaction is stopped")]
    ErrTransactionStopped,
    #[error("transaction is timed out")]
    ErrTransactionTimeOut,

    // Client.
    #[error("client is closed")]
    ErrClientClosed,
    #[error("no connection provided")]
    ErrNoConnection,
    #[error("collector is closed")]
    ErrCollectorClosed,
    #[error("failed to stop transaction after write error: {err} (write error: {cause})")]
    ErrStop { cause: Box<Error>, err: Box<Error> },
    #[error("failed to close (agent: {agent:?}, connection: {connection:?})")]
    ErrClose {
        agent: Option<Box<Error>>,
        connection: Option<Box<Error>>,
    },

    // URI parsing.
    #[error("unknown scheme type")]
    ErrSchemeType,
    #[error("invalid hostname")]
    ErrHost,
    #[error("invalid url")]
    ErrInvalidUrl,
    #[error("queries not supported in stun address")]
    ErrStunQuery,
    #[error("invalid query")]
    ErrInvalidQuery,
    #[error("invalid transport protocol type")]
    ErrProtoType,

    #[error("{0}")]
    Other(String),
    #[error("url parse: {0}")]
    Url(#[from] url::ParseError),
    #[error("utf8: {0}")]
    Utf8(#[from] FromUtf8Error),
    #[error("{0}")]
    Io(#[source] IoError),
    #[error("mpsc send: {0}")]
    MpscSend(String),
    #[error("{0}")]
    Util(#[from] util::Error),
}

#[derive(Debug, Error)]
#[error("io error: {0}")]
pub struct IoError(#[from] pub io::Error);

// Workaround for wanting PartialEq for io::Error.
impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind() == other.0.kind()
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(IoError(e))
    }
}

// Because Tokio SendError is parameterized, we sadly lose the backtrace.
impl<T> From<MpscSendError<T>> for Error {
    fn from(e: MpscSendError<T>) -> Self {
        Error::MpscSend(e.to_string())
    }
}
