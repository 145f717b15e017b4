//! The Data Access Layer (`spec.md` §4.4): an encrypted, access-policed
//! vault that is the sole holder of plaintext vault data.

pub mod crypto_at_rest;
pub mod error;
pub mod path;
pub mod policy;
pub mod vault;

pub use crypto_at_rest::{KeyDerivationParams, VaultRecord, ALGORITHM, MIN_ITERATIONS};
pub use error::VaultError;
pub use policy::{AccessPolicy, DefaultPolicy, RateLimitConfig, RateLimiter};
pub use vault::EncryptedVaultStore;
