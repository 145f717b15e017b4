use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("signature did not verify")]
    SignatureInvalid,

    #[error("no key registered under id '{0}'")]
    KeyNotFound(String),

    #[cfg(feature = "zk")]
    #[error("zero-knowledge proof error: {0}")]
    Zk(String),

    #[cfg(feature = "zk")]
    #[error("no circuit registered under id '{0}'")]
    CircuitNotFound(String),
}
