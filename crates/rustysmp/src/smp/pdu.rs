//! SMP PDU encoding and decoding
//!
//! Every PDU is a one-octet opcode followed by a fixed-size payload. Multi-octet
//! values are little-endian, exactly as they travel over the fixed channel.

use super::constants::*;
use super::types::*;
use crate::error::{SmpError, SmpResult};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

/// Pairing request/response packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingRequest {
    /// IO capability
    pub io_capability: u8,
    /// OOB data flag
    pub oob_data_present: u8,
    /// Authentication requirements
    pub auth_req: u8,
    /// Maximum encryption key size
    pub max_key_size: u8,
    /// Initiator key distribution
    pub initiator_key_dist: u8,
    /// Responder key distribution
    pub responder_key_dist: u8,
}

/// The response shares the request layout
pub type PairingResponse = PairingRequest;

impl PairingRequest {
    /// Create from local features and a key distribution policy
    pub fn from_features(
        features: &PairingFeatures,
        max_key_size: u8,
        initiator_key_dist: KeyDistribution,
        responder_key_dist: KeyDistribution,
    ) -> Self {
        Self {
            io_capability: features.io_capability.to_u8(),
            oob_data_present: features.oob_data_present,
            auth_req: features.auth_req.bits(),
            max_key_size,
            initiator_key_dist: initiator_key_dist.bits(),
            responder_key_dist: responder_key_dist.bits(),
        }
    }

    /// Parse from raw packet
    pub fn parse(data: &[u8]) -> SmpResult<Self> {
        if data.len() < SMP_PAIRING_FEATURES_LEN {
            return Err(SmpError::InvalidPdu("Pairing request too short".into()));
        }

        Ok(Self {
            io_capability: data[1],
            oob_data_present: data[2],
            auth_req: data[3],
            max_key_size: data[4],
            initiator_key_dist: data[5],
            responder_key_dist: data[6],
        })
    }

    /// Fixed-size wire form, as fed to the confirm function
    pub fn to_bytes(&self, is_request: bool) -> [u8; SMP_PAIRING_FEATURES_LEN] {
        [
            if is_request {
                SMP_PAIRING_REQUEST
            } else {
                SMP_PAIRING_RESPONSE
            },
            self.io_capability,
            self.oob_data_present,
            self.auth_req,
            self.max_key_size,
            self.initiator_key_dist,
            self.responder_key_dist,
        ]
    }

    /// Serialize to raw packet
    pub fn serialize(&self, is_request: bool) -> Vec<u8> {
        self.to_bytes(is_request).to_vec()
    }
}

fn parse_value_128(data: &[u8], what: &str) -> SmpResult<[u8; 16]> {
    if data.len() < SMP_VALUE_128_LEN {
        return Err(SmpError::InvalidPdu(format!("{} too short", what)));
    }

    let mut value = [0u8; 16];
    value.copy_from_slice(&data[1..SMP_VALUE_128_LEN]);
    Ok(value)
}

fn serialize_value_128(opcode: u8, value: &[u8; 16]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(SMP_VALUE_128_LEN);
    packet.push(opcode);
    packet.extend_from_slice(value);
    packet
}

/// Pairing confirm packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingConfirm {
    /// Confirm value
    pub confirm_value: [u8; 16],
}

impl PairingConfirm {
    pub fn new(confirm_value: [u8; 16]) -> Self {
        Self { confirm_value }
    }

    pub fn parse(data: &[u8]) -> SmpResult<Self> {
        parse_value_128(data, "Pairing confirm").map(Self::new)
    }

    pub fn serialize(&self) -> Vec<u8> {
        serialize_value_128(SMP_PAIRING_CONFIRM, &self.confirm_value)
    }
}

/// Pairing random packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingRandom {
    /// Random value
    pub random_value: [u8; 16],
}

impl PairingRandom {
    pub fn new(random_value: [u8; 16]) -> Self {
        Self { random_value }
    }

    pub fn parse(data: &[u8]) -> SmpResult<Self> {
        parse_value_128(data, "Pairing random").map(Self::new)
    }

    pub fn serialize(&self) -> Vec<u8> {
        serialize_value_128(SMP_PAIRING_RANDOM, &self.random_value)
    }
}

/// Pairing failed packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingFailed {
    /// Reason code
    pub reason: u8,
}

impl PairingFailed {
    pub fn new(reason: FailureReason) -> Self {
        Self {
            reason: reason.to_u8(),
        }
    }

    pub fn parse(data: &[u8]) -> SmpResult<Self> {
        if data.len() < SMP_PAIRING_FAILED_LEN {
            return Err(SmpError::InvalidPdu("Pairing failed too short".into()));
        }

        Ok(Self { reason: data[1] })
    }

    pub fn serialize(&self) -> Vec<u8> {
        vec![SMP_PAIRING_FAILED, self.reason]
    }

    pub fn reason(&self) -> FailureReason {
        FailureReason::from_u8(self.reason)
    }
}

/// Encryption information packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionInformation {
    /// Long Term Key
    pub ltk: [u8; 16],
}

impl EncryptionInformation {
    pub fn new(ltk: [u8; 16]) -> Self {
        Self { ltk }
    }

    pub fn parse(data: &[u8]) -> SmpResult<Self> {
        parse_value_128(data, "Encryption information").map(Self::new)
    }

    pub fn serialize(&self) -> Vec<u8> {
        serialize_value_128(SMP_ENCRYPTION_INFORMATION, &self.ltk)
    }
}

/// Master identification packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterIdentification {
    /// EDIV (Encrypted Diversifier)
    pub ediv: u16,
    /// RAND (Random number)
    pub rand: [u8; 8],
}

impl MasterIdentification {
    pub fn new(ediv: u16, rand: [u8; 8]) -> Self {
        Self { ediv, rand }
    }

    pub fn parse(data: &[u8]) -> SmpResult<Self> {
        if data.len() < SMP_MASTER_IDENTIFICATION_LEN {
            return Err(SmpError::InvalidPdu(
                "Master identification too short".into(),
            ));
        }

        let mut cursor = Cursor::new(&data[1..]);
        let ediv = cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| SmpError::InvalidPdu("Failed to read EDIV".into()))?;

        let mut rand = [0u8; 8];
        cursor
            .read_exact(&mut rand)
            .map_err(|_| SmpError::InvalidPdu("Failed to read RAND".into()))?;

        Ok(Self { ediv, rand })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(SMP_MASTER_IDENTIFICATION_LEN);

        packet.push(SMP_MASTER_IDENTIFICATION);
        packet.extend_from_slice(&self.ediv.to_le_bytes());
        packet.extend_from_slice(&self.rand);

        packet
    }
}

/// Any PDU this responder understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmpPdu {
    PairingRequest(PairingRequest),
    PairingResponse(PairingResponse),
    PairingConfirm(PairingConfirm),
    PairingRandom(PairingRandom),
    PairingFailed(PairingFailed),
    EncryptionInformation(EncryptionInformation),
    MasterIdentification(MasterIdentification),
}

impl SmpPdu {
    /// Decode a PDU; trailing octets past the fixed payload are ignored
    pub fn parse(data: &[u8]) -> SmpResult<Self> {
        let opcode = *data
            .first()
            .ok_or_else(|| SmpError::InvalidPdu("Empty SMP packet".into()))?;

        match opcode {
            SMP_PAIRING_REQUEST => PairingRequest::parse(data).map(SmpPdu::PairingRequest),
            SMP_PAIRING_RESPONSE => PairingRequest::parse(data).map(SmpPdu::PairingResponse),
            SMP_PAIRING_CONFIRM => PairingConfirm::parse(data).map(SmpPdu::PairingConfirm),
            SMP_PAIRING_RANDOM => PairingRandom::parse(data).map(SmpPdu::PairingRandom),
            SMP_PAIRING_FAILED => PairingFailed::parse(data).map(SmpPdu::PairingFailed),
            SMP_ENCRYPTION_INFORMATION => {
                EncryptionInformation::parse(data).map(SmpPdu::EncryptionInformation)
            }
            SMP_MASTER_IDENTIFICATION => {
                MasterIdentification::parse(data).map(SmpPdu::MasterIdentification)
            }
            other => Err(SmpError::UnsupportedOpcode(other)),
        }
    }

    pub fn opcode(&self) -> u8 {
        match self {
            SmpPdu::PairingRequest(_) => SMP_PAIRING_REQUEST,
            SmpPdu::PairingResponse(_) => SMP_PAIRING_RESPONSE,
            SmpPdu::PairingConfirm(_) => SMP_PAIRING_CONFIRM,
            SmpPdu::PairingRandom(_) => SMP_PAIRING_RANDOM,
            SmpPdu::PairingFailed(_) => SMP_PAIRING_FAILED,
            SmpPdu::EncryptionInformation(_) => SMP_ENCRYPTION_INFORMATION,
            SmpPdu::MasterIdentification(_) => SMP_MASTER_IDENTIFICATION,
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        match self {
            SmpPdu::PairingRequest(pdu) => pdu.serialize(true),
            SmpPdu::PairingResponse(pdu) => pdu.serialize(false),
            SmpPdu::PairingConfirm(pdu) => pdu.serialize(),
            SmpPdu::PairingRandom(pdu) => pdu.serialize(),
            SmpPdu::PairingFailed(pdu) => pdu.serialize(),
            SmpPdu::EncryptionInformation(pdu) => pdu.serialize(),
            SmpPdu::MasterIdentification(pdu) => pdu.serialize(),
        }
    }
}
