//! Cryptographic functions for LE legacy pairing
//!
//! Implements the confirm value function c1 and the key generation function s1
//! (BT Core Spec Vol 3, Part H, 2.2.3 and 2.2.4) on top of the security
//! function e, which is AES-128.
//!
//! The Core specification writes every operand most significant octet first.
//! All arrays taken and returned here are least significant octet first, the
//! order they have inside SMP PDUs, so the same buffers can be passed straight
//! from and to the wire.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;
use rand::rngs::OsRng;
use rand::RngCore;

/// Source of the pairing primitives used by the responder
pub trait CryptoProvider: Send {
    /// Confirm value function c1
    #[allow(clippy::too_many_arguments)]
    fn c1(
        &self,
        k: &[u8; 16],
        r: &[u8; 16],
        pres: &[u8; 7],
        preq: &[u8; 7],
        iat: u8,
        ia: &[u8; 6],
        rat: u8,
        ra: &[u8; 6],
    ) -> [u8; 16];

    /// Key generation function s1
    fn s1(&self, k: &[u8; 16], r1: &[u8; 16], r2: &[u8; 16]) -> [u8; 16];

    /// Fill `out` with cryptographically secure random octets
    fn random_bytes(&mut self, out: &mut [u8]);

    /// Generate a 128-bit random number
    fn random_128(&mut self) -> [u8; 16] {
        let mut value = [0u8; 16];
        self.random_bytes(&mut value);
        value
    }
}

/// AES-128 backed provider using the operating system RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyCrypto;

impl LegacyCrypto {
    pub fn new() -> Self {
        Self
    }
}

impl CryptoProvider for LegacyCrypto {
    fn c1(
        &self,
        k: &[u8; 16],
        r: &[u8; 16],
        pres: &[u8; 7],
        preq: &[u8; 7],
        iat: u8,
        ia: &[u8; 6],
        rat: u8,
        ra: &[u8; 6],
    ) -> [u8; 16] {
        // p1 = pres || preq || rat' || iat'
        let mut p1 = [0u8; 16];
        p1[0] = iat & 0x01;
        p1[1] = rat & 0x01;
        p1[2..9].copy_from_slice(preq);
        p1[9..16].copy_from_slice(pres);

        // p2 = padding || ia || ra
        let mut p2 = [0u8; 16];
        p2[0..6].copy_from_slice(ra);
        p2[6..12].copy_from_slice(ia);

        let mut block = xor_128(r, &p1);
        block = e(k, &block);
        block = xor_128(&block, &p2);
        e(k, &block)
    }

    fn s1(&self, k: &[u8; 16], r1: &[u8; 16], r2: &[u8; 16]) -> [u8; 16] {
        // r' = r1' || r2', the least significant 64 bits of each
        let mut r_prime = [0u8; 16];
        r_prime[0..8].copy_from_slice(&r2[0..8]);
        r_prime[8..16].copy_from_slice(&r1[0..8]);

        e(k, &r_prime)
    }

    fn random_bytes(&mut self, out: &mut [u8]) {
        OsRng.fill_bytes(out);
    }
}

/// Security function e: AES-128 over little-endian operands
pub fn e(key: &[u8; 16], plaintext: &[u8; 16]) -> [u8; 16] {
    let mut key_be = *key;
    key_be.reverse();
    let mut block_be = *plaintext;
    block_be.reverse();

    let cipher = Aes128::new(GenericArray::from_slice(&key_be));
    let mut block = GenericArray::clone_from_slice(&block_be);
    cipher.encrypt_block(&mut block);

    let mut out = [0u8; 16];
    out.copy_from_slice(&block);
    out.reverse();
    out
}

fn xor_128(a: &[u8; 16], b: &[u8; 16]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for i in 0..16 {
        out[i] = a[i] ^ b[i];
    }
    out
}
