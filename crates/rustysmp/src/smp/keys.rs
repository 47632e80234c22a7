//! Long Term Key registration
//!
//! A successful pairing produces one encryption key bundle which is handed to
//! a [`KeyRegistrar`] so the link can later be re-encrypted without pairing
//! again. Storage, durability and lookup belong to the registrar.

use crate::error::{SmpError, SmpResult};
use crate::gap::{AddressType, BdAddr};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use zeroize::Zeroize;

/// Long Term Key (LTK) information
#[derive(Clone, PartialEq, Eq)]
pub struct LongTermKey {
    /// Peer address the key belongs to
    pub address: BdAddr,
    /// Peer address type
    pub address_type: AddressType,
    /// Whether the pairing that produced the key was authenticated
    pub authenticated: bool,
    /// Whether the key is used when the local device is central
    pub central: bool,
    /// EDIV (Encrypted Diversifier)
    pub ediv: u16,
    /// RAND (Random number)
    pub rand: [u8; 8],
    /// Key value
    pub key: [u8; 16],
}

impl fmt::Debug for LongTermKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LongTermKey")
            .field("address", &self.address)
            .field("address_type", &self.address_type)
            .field("authenticated", &self.authenticated)
            .field("central", &self.central)
            .field("ediv", &self.ediv)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl Drop for LongTermKey {
    fn drop(&mut self) {
        self.key.zeroize();
        self.rand.zeroize();
    }
}

/// Persists key bundles produced by pairing
pub trait KeyRegistrar: Send {
    /// Register a key bundle for a peer, replacing any previous one
    fn register(&mut self, ltk: &LongTermKey) -> SmpResult<()>;
}

/// In-memory implementation of KeyRegistrar
///
/// Clones share the same storage, so one handle can be given to a responder
/// and another kept for lookups.
#[derive(Debug, Default, Clone)]
pub struct MemoryKeyRegistrar {
    keys: Arc<Mutex<HashMap<(BdAddr, AddressType), LongTermKey>>>,
}

impl MemoryKeyRegistrar {
    /// Create a new empty in-memory registrar
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, address: &BdAddr, address_type: AddressType) -> Option<LongTermKey> {
        self.lock()
            .ok()
            .and_then(|keys| keys.get(&(*address, address_type)).cloned())
    }

    pub fn remove(&self, address: &BdAddr, address_type: AddressType) -> Option<LongTermKey> {
        self.lock()
            .ok()
            .and_then(|mut keys| keys.remove(&(*address, address_type)))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|keys| keys.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
    ) -> SmpResult<std::sync::MutexGuard<'_, HashMap<(BdAddr, AddressType), LongTermKey>>> {
        self.keys
            .lock()
            .map_err(|_| SmpError::KeyRegistrar("key map poisoned".into()))
    }
}

impl KeyRegistrar for MemoryKeyRegistrar {
    fn register(&mut self, ltk: &LongTermKey) -> SmpResult<()> {
        let mut keys = self.lock()?;
        keys.insert((ltk.address, ltk.address_type), ltk.clone());
        Ok(())
    }
}
