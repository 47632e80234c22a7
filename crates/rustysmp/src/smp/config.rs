//! Responder configuration

use super::types::PairingFeatures;
use zeroize::Zeroize;

/// How EDIV and Rand are chosen for the distributed key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyIdentityPolicy {
    /// Fresh values from the crypto provider for every pairing
    #[default]
    Random,
    /// EDIV 0x0000 and Rand of eight zero octets, for peers that expect them
    Fixed,
}

/// Settings applied to every pairing attempt on a link
#[derive(Clone)]
pub struct SmpConfig {
    /// Temporary key (all zero for Just Works)
    pub temporary_key: [u8; 16],
    /// Features advertised in the Pairing Response
    pub features: PairingFeatures,
    pub key_identity: KeyIdentityPolicy,
}

impl SmpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temporary_key(mut self, temporary_key: [u8; 16]) -> Self {
        self.temporary_key = temporary_key;
        self
    }

    /// Temporary key for a six digit passkey
    pub fn with_passkey(mut self, passkey: u32) -> Self {
        self.temporary_key = [0u8; 16];
        self.temporary_key[0..4].copy_from_slice(&passkey.to_le_bytes());
        self
    }

    pub fn with_features(mut self, features: PairingFeatures) -> Self {
        self.features = features;
        self
    }

    pub fn with_key_identity(mut self, key_identity: KeyIdentityPolicy) -> Self {
        self.key_identity = key_identity;
        self
    }
}

impl Default for SmpConfig {
    fn default() -> Self {
        Self {
            temporary_key: [0u8; 16],
            features: PairingFeatures::default(),
            key_identity: KeyIdentityPolicy::default(),
        }
    }
}

impl std::fmt::Debug for SmpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmpConfig")
            .field("temporary_key", &"<redacted>")
            .field("features", &self.features)
            .field("key_identity", &self.key_identity)
            .finish()
    }
}

impl Drop for SmpConfig {
    fn drop(&mut self) {
        self.temporary_key.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smp::{AuthRequirements, IoCapability};

    #[test]
    fn test_defaults() {
        let config = SmpConfig::default();
        assert_eq!(config.temporary_key, [0u8; 16]);
        assert_eq!(config.features.io_capability, IoCapability::DisplayOnly);
        assert_eq!(config.features.auth_req, AuthRequirements::BONDING);
        assert_eq!(config.key_identity, KeyIdentityPolicy::Random);
    }

    #[test]
    fn test_passkey_temporary_key() {
        let config = SmpConfig::new().with_passkey(123456);
        assert_eq!(&config.temporary_key[0..4], &123456u32.to_le_bytes());
        assert_eq!(&config.temporary_key[4..], &[0u8; 12]);
    }
}
