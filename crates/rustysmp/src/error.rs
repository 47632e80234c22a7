//! Error types for the rustysmp library
//!
//! Protocol failures (a bad confirm value, a peer abort) are not errors here:
//! they are state transitions reported through [`crate::smp::SmpEvent`].
//! `SmpError` covers malformed input, misuse of the API and failures reported
//! by the external collaborators.

use thiserror::Error;

/// Errors that can occur when working with the Security Manager
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmpError {
    #[error("Invalid SMP PDU: {0}")]
    InvalidPdu(String),

    #[error("Unsupported SMP opcode: 0x{0:02X}")]
    UnsupportedOpcode(u8),

    #[error("Invalid device address: {0}")]
    InvalidAddress(String),

    #[error("Configuration received after it can take effect")]
    ConfigurationTooLate,

    #[error("Link is closed")]
    LinkClosed,

    #[error("Link adapter error: {0}")]
    Link(String),

    #[error("Key registrar error: {0}")]
    KeyRegistrar(String),
}

/// Result type for SMP operations
pub type SmpResult<T> = Result<T, SmpError>;
