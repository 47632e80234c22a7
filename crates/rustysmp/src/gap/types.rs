use crate::error::{SmpError, SmpResult};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressType {
    Public,
    Random,
}

impl AddressType {
    /// One-bit form used as `iat`/`rat` input to the confirm function
    pub fn to_bit(self) -> u8 {
        match self {
            AddressType::Public => 0,
            AddressType::Random => 1,
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressType::Public => write!(f, "public"),
            AddressType::Random => write!(f, "random"),
        }
    }
}

/// Bluetooth device address, stored least significant octet first as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BdAddr {
    pub bytes: [u8; 6],
}

impl BdAddr {
    pub fn new(bytes: [u8; 6]) -> Self {
        Self { bytes }
    }
}

/// Parses the textual `AA:BB:CC:DD:EE:FF` form, most significant octet first.
impl FromStr for BdAddr {
    type Err = SmpError;

    fn from_str(s: &str) -> SmpResult<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 || parts.iter().any(|p| p.len() != 2) {
            return Err(SmpError::InvalidAddress(s.to_string()));
        }

        let mut bytes = [0u8; 6];
        hex::decode_to_slice(parts.concat(), &mut bytes)
            .map_err(|_| SmpError::InvalidAddress(s.to_string()))?;
        bytes.reverse();

        Ok(Self { bytes })
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.bytes[5],
            self.bytes[4],
            self.bytes[3],
            self.bytes[2],
            self.bytes[1],
            self.bytes[0]
        )
    }
}

/// An address together with its type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceAddress {
    pub address: BdAddr,
    pub address_type: AddressType,
}

impl DeviceAddress {
    pub fn new(address: BdAddr, address_type: AddressType) -> Self {
        Self {
            address,
            address_type,
        }
    }

    pub fn public(address: BdAddr) -> Self {
        Self::new(address, AddressType::Public)
    }

    pub fn random(address: BdAddr) -> Self {
        Self::new(address, AddressType::Random)
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address, self.address_type)
    }
}
