//! Type definitions for the Security Manager Protocol
use super::constants::*;
use crate::gap::DeviceAddress;
use bitflags::bitflags;
use std::fmt;

/// IO Capability types for pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoCapability {
    /// Display only
    DisplayOnly,
    /// Display with yes/no input
    DisplayYesNo,
    /// Keyboard only
    KeyboardOnly,
    /// No input, no output
    NoInputNoOutput,
    /// Both keyboard and display
    KeyboardDisplay,
    /// Reserved code, advertised as given
    Reserved(u8),
}

impl IoCapability {
    /// Convert to u8 value for protocol
    pub fn to_u8(&self) -> u8 {
        match self {
            IoCapability::Reserved(code) => *code,
            IoCapability::DisplayOnly => SMP_IO_CAPABILITY_DISPLAY_ONLY,
            IoCapability::DisplayYesNo => SMP_IO_CAPABILITY_DISPLAY_YES_NO,
            IoCapability::KeyboardOnly => SMP_IO_CAPABILITY_KEYBOARD_ONLY,
            IoCapability::NoInputNoOutput => SMP_IO_CAPABILITY_NO_INPUT_NO_OUTPUT,
            IoCapability::KeyboardDisplay => SMP_IO_CAPABILITY_KEYBOARD_DISPLAY,
        }
    }

    /// Convert from u8 value from protocol
    pub fn from_u8(value: u8) -> Self {
        match value {
            SMP_IO_CAPABILITY_DISPLAY_ONLY => IoCapability::DisplayOnly,
            SMP_IO_CAPABILITY_DISPLAY_YES_NO => IoCapability::DisplayYesNo,
            SMP_IO_CAPABILITY_KEYBOARD_ONLY => IoCapability::KeyboardOnly,
            SMP_IO_CAPABILITY_NO_INPUT_NO_OUTPUT => IoCapability::NoInputNoOutput,
            SMP_IO_CAPABILITY_KEYBOARD_DISPLAY => IoCapability::KeyboardDisplay,
            other => IoCapability::Reserved(other),
        }
    }
}

impl fmt::Display for IoCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoCapability::DisplayOnly => write!(f, "Display Only"),
            IoCapability::DisplayYesNo => write!(f, "Display Yes/No"),
            IoCapability::KeyboardOnly => write!(f, "Keyboard Only"),
            IoCapability::NoInputNoOutput => write!(f, "No Input No Output"),
            IoCapability::KeyboardDisplay => write!(f, "Keyboard Display"),
            IoCapability::Reserved(code) => write!(f, "Reserved 0x{:02X}", code),
        }
    }
}

bitflags! {
    /// Authentication requirements octet
    ///
    /// Unknown bits are retained so that a configured value is echoed
    /// back in the Pairing Response exactly as given.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AuthRequirements: u8 {
        const BONDING = SMP_AUTH_REQ_BONDING;
        const MITM = SMP_AUTH_REQ_MITM;
        const SECURE_CONNECTIONS = SMP_AUTH_REQ_SC;
        const KEYPRESS = SMP_AUTH_REQ_KEYPRESS;
        const CT2 = SMP_AUTH_REQ_CT2;
    }
}

impl Default for AuthRequirements {
    fn default() -> Self {
        AuthRequirements::BONDING
    }
}

bitflags! {
    /// Key distribution octet of a Pairing Request/Response
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeyDistribution: u8 {
        /// Encryption key (LTK, EDIV, RAND)
        const ENCRYPTION_KEY = SMP_KEY_DIST_ENC_KEY;
        /// Identity key (IRK, public address)
        const IDENTITY_KEY = SMP_KEY_DIST_ID_KEY;
        /// Signing key (CSRK)
        const SIGNING_KEY = SMP_KEY_DIST_SIGN_KEY;
        const LINK_KEY = SMP_KEY_DIST_LINK_KEY;
    }
}

/// Reason carried by a Pairing Failed PDU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    ConfirmValueFailed,
    UnspecifiedReason,
    /// Any other code, as sent by a peer
    Other(u8),
}

impl FailureReason {
    pub fn to_u8(&self) -> u8 {
        match self {
            FailureReason::ConfirmValueFailed => SMP_REASON_CONFIRM_VALUE_FAILED,
            FailureReason::UnspecifiedReason => SMP_REASON_UNSPECIFIED_REASON,
            FailureReason::Other(code) => *code,
        }
    }

    pub fn from_u8(value: u8) -> Self {
        match value {
            SMP_REASON_CONFIRM_VALUE_FAILED => FailureReason::ConfirmValueFailed,
            SMP_REASON_UNSPECIFIED_REASON => FailureReason::UnspecifiedReason,
            other => FailureReason::Other(other),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ConfirmValueFailed => write!(f, "Confirm value failed"),
            FailureReason::UnspecifiedReason => write!(f, "Unspecified reason"),
            FailureReason::Other(code) => write!(f, "Reason 0x{:02X}", code),
        }
    }
}

/// Local pairing features advertised in the Pairing Response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingFeatures {
    /// IO Capability
    pub io_capability: IoCapability,
    /// OOB data flag octet, any nonzero value means present
    pub oob_data_present: u8,
    /// Authentication requirements
    pub auth_req: AuthRequirements,
}

impl PairingFeatures {
    pub fn new(
        io_capability: IoCapability,
        oob_data_present: bool,
        auth_req: AuthRequirements,
    ) -> Self {
        Self {
            io_capability,
            oob_data_present: if oob_data_present {
                SMP_OOB_PRESENT
            } else {
                SMP_OOB_NOT_PRESENT
            },
            auth_req,
        }
    }

    /// Build from the raw octets a link adapter hands over
    ///
    /// Every octet is kept as given and echoed in the Pairing Response.
    pub fn from_raw(io_capability: u8, oob_data_present: u8, auth_req: u8) -> Self {
        Self {
            io_capability: IoCapability::from_u8(io_capability),
            oob_data_present,
            auth_req: AuthRequirements::from_bits_retain(auth_req),
        }
    }

    pub fn has_oob_data(&self) -> bool {
        self.oob_data_present != SMP_OOB_NOT_PRESENT
    }
}

impl Default for PairingFeatures {
    fn default() -> Self {
        Self {
            io_capability: IoCapability::DisplayOnly,
            oob_data_present: SMP_OOB_NOT_PRESENT,
            auth_req: AuthRequirements::default(),
        }
    }
}

/// Pairing state machine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingState {
    /// Waiting for a Pairing Request
    Idle,
    /// Pairing Response sent, waiting for the initiator's confirm value
    AwaitingConfirm,
    /// Local confirm sent, waiting for the initiator's random value
    AwaitingRandom,
    /// STK derived and key bundle registered
    Completed,
    /// Pairing failed
    Failed,
    /// Link closed; no further events are processed
    Closed,
}

impl fmt::Display for PairingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PairingState::Idle => "idle",
            PairingState::AwaitingConfirm => "awaiting-confirm",
            PairingState::AwaitingRandom => "awaiting-random",
            PairingState::Completed => "completed",
            PairingState::Failed => "failed",
            PairingState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Notifications delivered to the owner of a responder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmpEvent {
    /// Confirm values matched and the key bundle was registered
    PairingComplete {
        address: DeviceAddress,
        authenticated: bool,
    },
    /// The pairing attempt ended in failure
    PairingFailed {
        address: DeviceAddress,
        reason: FailureReason,
        /// `true` when the peer aborted with its own Pairing Failed
        remote: bool,
    },
    /// Encryption Information and Master Identification were sent
    KeysDistributed { address: DeviceAddress },
}
