//! Key registry: a read-mostly map from key id to key material, with the
//! `"default"` id materialized lazily on first use (`spec.md` §5: "the
//! key registry of the Crypto component is read-mostly; rotation of
//! `default` is effectively a two-phase replacement of the id's keypair
//! atomic to readers").

use crate::{error::CryptoError, signer::KeyPair};
use sha2::Sha256;
use std::{collections::HashMap, sync::RwLock};
use vqp_types::{Proof, SignatureAlgorithm};

pub const DEFAULT_KEY_ID: &str = "default";

#[derive(Default)]
pub struct KeyRegistry {
    keys: RwLock<HashMap<String, KeyPair>>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Materialize the `"default"` key if it doesn't already exist.
    pub fn ensure_default(&self, algorithm: SignatureAlgorithm) -> Result<(), CryptoError> {
        if self
            .keys
            .read()
            .expect("key registry lock poisoned")
            .contains_key(DEFAULT_KEY_ID)
        {
            return Ok(());
        }
        let keypair = KeyPair::generate(algorithm)?;
        self.keys
            .write()
            .expect("key registry lock poisoned")
            .insert(DEFAULT_KEY_ID.to_string(), keypair);
        Ok(())
    }

    /// Insert (or atomically replace) a keypair under `key_id`. Used by
    /// `vqp keygen` and by key rotation.
    pub fn insert(&self, key_id: impl Into<String>, keypair: KeyPair) {
        self.keys
            .write()
            .expect("key registry lock poisoned")
            .insert(key_id.into(), keypair);
    }

    pub fn public_key_hex(&self, key_id: &str) -> Result<String, CryptoError> {
        self.keys
            .read()
            .expect("key registry lock poisoned")
            .get(key_id)
            .ok_or_else(|| CryptoError::KeyNotFound(key_id.to_string()))?
            .public_key_hex()
    }

    pub fn sign(&self, key_id: &str, message: &[u8]) -> Result<Proof, CryptoError> {
        self.keys
            .read()
            .expect("key registry lock poisoned")
            .get(key_id)
            .ok_or_else(|| CryptoError::KeyNotFound(key_id.to_string()))?
            .sign(message)
    }

    pub fn sign_default(
        &self,
        algorithm: SignatureAlgorithm,
        message: &[u8],
    ) -> Result<Proof, CryptoError> {
        self.ensure_default(algorithm)?;
        self.sign(DEFAULT_KEY_ID, message)
    }
}

/// PBKDF2-HMAC-SHA-256 key derivation, per `spec.md` §4.5: "`deriveKey`
/// uses PBKDF2-HMAC-SHA-256 with at least 100,000 iterations and a
/// 32-byte output." Shares its primitive (not its call site) with
/// `vqp_vault::crypto_at_rest::derive_key` — the Crypto component exposes
/// it as a first-class operation independent of the vault's on-disk
/// envelope.
pub fn derive_key(passphrase: &[u8], salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut out = [0u8; 32];
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase, salt, iterations, &mut out);
    out
}
