//! The on-disk encrypted vault record (`spec.md` §3 "Vault", §6 "Vault
//! file layout"), bit-exact: AES-256-GCM with a 16-byte IV, keyed by
//! PBKDF2-HMAC-SHA-256, all binary fields base64, checksum hex SHA-256
//! of the plaintext.
//!
//! Fields are named individually rather than packed into a single
//! delimited string, since the wire format fixes a specific field-level
//! shape that callers may need to inspect (`vqp vault inspect`) without
//! decrypting.

use crate::error::VaultError;
use aes_gcm::{
    aead::{consts::U16, Aead, KeyInit},
    aes::Aes256,
    AesGcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

type Aes256Gcm16 = AesGcm<Aes256, U16>;

pub const ALGORITHM: &str = "aes-256-gcm";
pub const RECORD_VERSION: &str = "1";
pub const IV_LEN: usize = 16;
pub const SALT_LEN: usize = 16;
pub const MIN_ITERATIONS: u32 = 100_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDerivationParams {
    pub iterations: u32,
    pub salt: String,
    pub key_length: u32,
}

/// The structured, on-disk vault record. Field order matches
/// `spec.md` §3 exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRecord {
    pub version: String,
    pub algorithm: String,
    pub key_derivation: KeyDerivationParams,
    pub encrypted_data: String,
    pub iv: String,
    pub auth_tag: String,
    pub timestamp: DateTime<Utc>,
    pub checksum: String,
}

/// Attempt to parse `contents` as a structured vault record. Returns
/// `None` (never an error) on anything that doesn't shape up, so the
/// caller can fall back to plaintext-migration handling.
pub fn try_parse_record(contents: &str) -> Option<VaultRecord> {
    serde_json::from_str(contents).ok()
}

pub fn derive_key(passphrase: &str, salt: &[u8], iterations: u32, key_length: usize) -> Vec<u8> {
    let mut out = vec![0u8; key_length];
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, iterations, &mut out);
    out
}

/// Encrypt `plaintext` under a freshly derived key, producing a complete
/// [`VaultRecord`] ready to serialize to disk.
pub fn encrypt_vault(
    plaintext: &Value,
    passphrase: &str,
    iterations: u32,
    key_length: usize,
) -> Result<VaultRecord, VaultError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let key = derive_key(passphrase, &salt, iterations, key_length);

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let pt_bytes =
        serde_json::to_vec(plaintext).map_err(|e| VaultError::Malformed(e.to_string()))?;

    let cipher = Aes256Gcm16::new_from_slice(&key)
        .map_err(|e| VaultError::KeyDerivation(e.to_string()))?;
    let ct_and_tag = cipher
        .encrypt(Nonce::from_slice(&iv), pt_bytes.as_slice())
        .map_err(|_| VaultError::TagMismatch)?;

    let tag_start = ct_and_tag
        .len()
        .checked_sub(16)
        .ok_or(VaultError::TagMismatch)?;
    let (ciphertext, tag) = ct_and_tag.split_at(tag_start);

    let checksum = hex::encode(Sha256::digest(&pt_bytes));

    Ok(VaultRecord {
        version: RECORD_VERSION.to_string(),
        algorithm: ALGORITHM.to_string(),
        key_derivation: KeyDerivationParams {
            iterations,
            salt: B64.encode(salt),
            key_length: key_length as u32,
        },
        encrypted_data: B64.encode(ciphertext),
        iv: B64.encode(iv),
        auth_tag: B64.encode(tag),
        timestamp: Utc::now(),
        checksum,
    })
}

/// Decrypt `record` under `passphrase`, verifying both the GCM
/// authentication tag and the recorded plaintext checksum.
pub fn decrypt_vault(record: &VaultRecord, passphrase: &str) -> Result<Value, VaultError> {
    let salt = B64
        .decode(&record.key_derivation.salt)
        .map_err(|e| VaultError::Malformed(e.to_string()))?;
    let key = derive_key(
        passphrase,
        &salt,
        record.key_derivation.iterations,
        record.key_derivation.key_length as usize,
    );

    let iv = B64
        .decode(&record.iv)
        .map_err(|e| VaultError::Malformed(e.to_string()))?;
    let ciphertext = B64
        .decode(&record.encrypted_data)
        .map_err(|e| VaultError::Malformed(e.to_string()))?;
    let tag = B64
        .decode(&record.auth_tag)
        .map_err(|e| VaultError::Malformed(e.to_string()))?;

    let mut ct_and_tag = ciphertext;
    ct_and_tag.extend_from_slice(&tag);

    let cipher = Aes256Gcm16::new_from_slice(&key)
        .map_err(|e| VaultError::KeyDerivation(e.to_string()))?;
    let pt_bytes = cipher
        .decrypt(Nonce::from_slice(&iv), ct_and_tag.as_slice())
        .map_err(|_| VaultError::TagMismatch)?;

    let checksum = hex::encode(Sha256::digest(&pt_bytes));
    if checksum != record.checksum {
        return Err(VaultError::ChecksumMismatch);
    }

    serde_json::from_slice(&pt_bytes).map_err(|e| VaultError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_arbitrary_vault_contents() {
        let plaintext = json!({"personal": {"age": 25}, "financial": {"annual_income": 60000}});
        let record = encrypt_vault(&plaintext, "correct horse battery staple", MIN_ITERATIONS, 32)
            .unwrap();
        let decrypted = decrypt_vault(&record, "correct horse battery staple").unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn wrong_passphrase_fails_tag_verification() {
        let plaintext = json!({"x": 1});
        let record = encrypt_vault(&plaintext, "right-pass", MIN_ITERATIONS, 32).unwrap();
        let err = decrypt_vault(&record, "wrong-pass").unwrap_err();
        assert!(matches!(err, VaultError::TagMismatch));
    }

    #[test]
    fn tampered_ciphertext_fails_tag_verification() {
        let plaintext = json!({"x": 1});
        let mut record = encrypt_vault(&plaintext, "pass", MIN_ITERATIONS, 32).unwrap();
        let mut raw = B64.decode(&record.encrypted_data).unwrap();
        raw[0] ^= 0xFF;
        record.encrypted_data = B64.encode(raw);
        assert!(matches!(
            decrypt_vault(&record, "pass").unwrap_err(),
            VaultError::TagMismatch
        ));
    }

    #[test]
    fn tampered_checksum_is_caught_even_if_tag_happened_to_verify() {
        let plaintext = json!({"x": 1});
        let mut record = encrypt_vault(&plaintext, "pass", MIN_ITERATIONS, 32).unwrap();
        record.checksum = "0".repeat(64);
        // Tag still verifies (ciphertext untouched); checksum mismatch must
        // still be caught.
        let err = decrypt_vault(&record, "pass").unwrap_err();
        assert!(matches!(err, VaultError::ChecksumMismatch));
    }

    #[test]
    fn each_save_uses_a_fresh_iv_and_salt() {
        let plaintext = json!({"x": 1});
        let a = encrypt_vault(&plaintext, "pass", MIN_ITERATIONS, 32).unwrap();
        let b = encrypt_vault(&plaintext, "pass", MIN_ITERATIONS, 32).unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.key_derivation.salt, b.key_derivation.salt);
    }
}
