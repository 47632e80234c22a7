//! RustySMP - Bluetooth LE Security Manager, responder role
//!
//! This library implements the pairing phase of the Security Manager Protocol
//! for a peripheral: it negotiates a Short Term Key with the initiating peer
//! over the SMP fixed channel and, once the link is encrypted, distributes the
//! long term key material. The link layer, key storage and cryptographic
//! primitives are injected as collaborators.

pub mod error;
pub mod gap;
pub mod smp;

// Re-export common types for convenience
pub use error::{SmpError, SmpResult};
pub use gap::{AddressType, BdAddr, DeviceAddress};
pub use smp::{
    CryptoProvider, KeyRegistrar, LegacyCrypto, LinkAdapter, LinkEvent, MemoryKeyRegistrar,
    PairingFeatures, PairingState, SmpConfig, SmpEvent, SmpResponder,
};
