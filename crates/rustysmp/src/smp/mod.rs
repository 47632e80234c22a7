//! Security Manager Protocol (SMP) implementation
//!
//! This module implements the responder side of LE legacy pairing:
//! - Answering a Pairing Request with the local pairing features
//! - Exchanging and checking confirm and random values (c1)
//! - Deriving the Short Term Key (s1) and registering the key bundle
//! - Distributing the encryption key once the link is encrypted

mod config;
mod constants;
mod crypto;
mod keys;
mod link;
mod pdu;
mod responder;
mod types;


// Re-export public API
pub use self::config::{KeyIdentityPolicy, SmpConfig};
pub use self::constants::*;
pub use self::crypto::{CryptoProvider, LegacyCrypto};
pub use self::keys::{KeyRegistrar, LongTermKey, MemoryKeyRegistrar};
pub use self::link::{LinkAdapter, LinkEvent};
pub use self::pdu::*;
pub use self::responder::{SmpEventCallback, SmpResponder};
pub use self::types::*;
