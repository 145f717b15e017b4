use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("i/o error accessing vault file: {0}")]
    Io(#[from] std::io::Error),

    #[error("vault record is not well-formed JSON: {0}")]
    Malformed(String),

    #[error("authentication tag did not verify; ciphertext or key is wrong")]
    TagMismatch,

    #[error("plaintext checksum mismatch after decryption; vault record is corrupted")]
    ChecksumMismatch,

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("vault path '{0}' does not exist")]
    PathNotFound(String),
}
