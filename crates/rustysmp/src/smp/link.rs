//! Boundary to the link layer carrying the SMP fixed channel

use super::types::PairingFeatures;
use crate::error::SmpResult;

/// Outbound half of the link: writes SMP PDUs onto a channel
pub trait LinkAdapter: Send {
    fn send(&mut self, channel_id: u16, pdu: &[u8]) -> SmpResult<()>;
}

/// Everything the link layer can report to a responder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// An L2CAP frame arrived on `channel_id`
    Data { channel_id: u16, pdu: Vec<u8> },
    /// Link encryption was switched on or off
    EncryptionChanged(bool),
    /// The controller rejected the key request for this link
    NegotiationRejected,
    /// The link is gone
    Closed,
    /// Late temporary key override
    SetTemporaryKey([u8; 16]),
    /// Late IO capability / OOB / AuthReq override
    SetPairingFeatures(PairingFeatures),
}
