//! Error types for gripper connection and control operations.
//!
//! Two taxonomies cover the crate:
//!
//! - [`ConnectError`]: everything that can go wrong while selecting a
//!   transport, opening the connection, or closing it.
//! - [`ControlError`]: failures of individual register operations once a
//!   connection is up.
//!
//! The crate never swallows a transport failure: every I/O error surfaces to
//! the immediate caller as a typed result, with no retries and no automatic
//! reconnection.

use thiserror::Error;

use crate::registers::ChannelId;

/// Result alias for connection lifecycle operations.
pub type ConnectResult<T> = Result<T, ConnectError>;

/// Result alias for register command/telemetry operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors raised while establishing or tearing down a gripper connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Neither a network address nor a serial device was supplied.
    #[error("no transport specified: provide a network address or a serial device")]
    NoTransportSpecified,

    /// The underlying Modbus master could not be constructed.
    #[error("transport initialisation failed: {message}")]
    TransportInitFailed { message: String },

    /// The connection open handshake failed.
    #[error("failed to open connection: {message}")]
    OpenFailed { message: String },

    /// `close()` was called on a connection that is already closed.
    #[error("connection already closed")]
    AlreadyClosed,

    /// The transport reported an error while disconnecting.
    #[error("failed to close connection: {message}")]
    CloseFailed { message: String },
}

impl ConnectError {
    /// Create a transport initialisation error.
    pub fn init(message: impl Into<String>) -> Self {
        Self::TransportInitFailed {
            message: message.into(),
        }
    }

    /// Create an open-handshake error.
    pub fn open(message: impl Into<String>) -> Self {
        Self::OpenFailed {
            message: message.into(),
        }
    }

    /// Create a close error.
    pub fn close(message: impl Into<String>) -> Self {
        Self::CloseFailed {
            message: message.into(),
        }
    }
}

/// Errors raised by register reads and writes after connection.
#[derive(Debug, Error)]
pub enum ControlError {
    /// A register read or write failed on the underlying transport.
    ///
    /// The cause preserves the transport's own description (connection
    /// reset, request timeout, device exception, ...). The facade performs
    /// no retries; the caller decides whether to retry or abort.
    #[error("register I/O failed: {cause}")]
    IoFailure { cause: String },

    /// The addressed channel does not exist on this gripper model.
    #[error("channel {0} is not present on this gripper model")]
    ChannelUnavailable(ChannelId),
}

impl ControlError {
    /// Create an I/O failure from any displayable transport error.
    pub fn io(cause: impl Into<String>) -> Self {
        Self::IoFailure {
            cause: cause.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_error_display() {
        let err = ConnectError::NoTransportSpecified;
        assert!(err.to_string().contains("no transport specified"));

        let err = ConnectError::init("bad port string");
        assert!(err.to_string().contains("bad port string"));

        let err = ConnectError::open("connection refused");
        assert!(err.to_string().contains("connection refused"));

        assert_eq!(
            ConnectError::AlreadyClosed.to_string(),
            "connection already closed"
        );
    }

    #[test]
    fn test_control_error_display() {
        let err = ControlError::io("broken pipe");
        assert_eq!(err.to_string(), "register I/O failed: broken pipe");

        let err = ControlError::ChannelUnavailable(ChannelId::B);
        assert!(err.to_string().contains("channel B"));
    }
}
