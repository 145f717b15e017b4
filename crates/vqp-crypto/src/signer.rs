//! Sign/verify over the canonical payload bytes for each supported
//! [`SignatureAlgorithm`] (`spec.md` §4.5). `ed25519` is the default and
//! simplest shape (raw key bytes, hex-encoded); `secp256k1` and
//! `rsa-pss` follow the same sign/verify/hex-encode shape using `k256`
//! and `rsa` respectively.

use crate::error::CryptoError;
use ed25519_dalek::Signer as _;
use rand::{rngs::OsRng, RngCore as _};
use rsa::{
    pss::{SigningKey as PssSigningKey, VerifyingKey as PssVerifyingKey},
    signature::{RandomizedSigner, Verifier as RsaVerifier},
    traits::PublicKeyParts,
    BigUint, RsaPrivateKey, RsaPublicKey,
};
use sha2::Sha256;
use vqp_types::{Proof, SignatureAlgorithm};
use zeroize::Zeroizing;

/// Private key material for one of the three supported algorithms. Each
/// variant's underlying type zeroizes its own secret bytes on drop
/// (`ed25519-dalek`, `k256`, and `rsa` all wipe their key storage
/// themselves); this crate additionally wipes the raw seed it generates
/// for `Ed25519` before handing it off, since that's a secret copy this
/// crate creates directly rather than one owned by a dependency.
pub enum KeyPair {
    Ed25519(ed25519_dalek::SigningKey),
    Secp256k1(k256::ecdsa::SigningKey),
    RsaPss(Box<RsaPrivateKey>),
}

impl KeyPair {
    pub fn generate(algorithm: SignatureAlgorithm) -> Result<Self, CryptoError> {
        match algorithm {
            SignatureAlgorithm::Ed25519 => {
                // `SigningKey::from_bytes` copies the seed into its own
                // storage; wipe this stack copy once that's done rather
                // than leaving it for the allocator to reuse verbatim.
                let mut seed = Zeroizing::new([0u8; 32]);
                OsRng.fill_bytes(seed.as_mut());
                Ok(KeyPair::Ed25519(ed25519_dalek::SigningKey::from_bytes(
                    &seed,
                )))
            }
            SignatureAlgorithm::Secp256k1 => Ok(KeyPair::Secp256k1(
                k256::ecdsa::SigningKey::random(&mut OsRng),
            )),
            SignatureAlgorithm::RsaPss => {
                let key = RsaPrivateKey::new(&mut OsRng, 2048)
                    .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
                Ok(KeyPair::RsaPss(Box::new(key)))
            }
        }
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            KeyPair::Ed25519(_) => SignatureAlgorithm::Ed25519,
            KeyPair::Secp256k1(_) => SignatureAlgorithm::Secp256k1,
            KeyPair::RsaPss(_) => SignatureAlgorithm::RsaPss,
        }
    }

    /// Lowercase hex public key, per `spec.md` §4.5.
    pub fn public_key_hex(&self) -> Result<String, CryptoError> {
        match self {
            KeyPair::Ed25519(sk) => Ok(hex::encode(sk.verifying_key().to_bytes())),
            KeyPair::Secp256k1(sk) => Ok(hex::encode(
                sk.verifying_key().to_encoded_point(true).as_bytes(),
            )),
            KeyPair::RsaPss(sk) => Ok(hex::encode(encode_rsa_public_key(&RsaPublicKey::from(
                sk.as_ref(),
            )))),
        }
    }

    /// Sign `message`, producing a [`Proof::Signature`] with lowercase
    /// hex public key and signature.
    pub fn sign(&self, message: &[u8]) -> Result<Proof, CryptoError> {
        let public_key = self.public_key_hex()?;
        let signature = match self {
            KeyPair::Ed25519(sk) => hex::encode(sk.sign(message).to_bytes()),
            KeyPair::Secp256k1(sk) => {
                let sig: k256::ecdsa::Signature =
                    k256::ecdsa::signature::Signer::sign(sk, message);
                hex::encode(sig.to_bytes())
            }
            KeyPair::RsaPss(sk) => {
                let signing_key = PssSigningKey::<Sha256>::new(sk.as_ref().clone());
                let sig = signing_key.sign_with_rng(&mut OsRng, message);
                hex::encode(sig.to_bytes())
            }
        };
        Ok(Proof::Signature {
            algorithm: self.algorithm(),
            public_key,
            signature,
        })
    }
}

/// Verify a [`Proof::Signature`] against `message`. Any other proof
/// variant is simply not a match (`false`), not an error.
pub fn verify(proof: &Proof, message: &[u8]) -> Result<bool, CryptoError> {
    let Proof::Signature {
        algorithm,
        public_key,
        signature,
    } = proof
    else {
        return Ok(false);
    };

    let pubkey_bytes =
        hex::decode(public_key).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    let sig_bytes =
        hex::decode(signature).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

    match algorithm {
        SignatureAlgorithm::Ed25519 => {
            let key_array: [u8; 32] = pubkey_bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKey("expected 32-byte ed25519 key".into()))?;
            let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(&key_array)
                .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
            let sig_array: [u8; 64] = sig_bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKey("expected 64-byte ed25519 signature".into()))?;
            let signature = ed25519_dalek::Signature::from_bytes(&sig_array);
            Ok(verifying_key.verify_strict(message, &signature).is_ok())
        }
        SignatureAlgorithm::Secp256k1 => {
            let verifying_key = k256::ecdsa::VerifyingKey::from_sec1_bytes(&pubkey_bytes)
                .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
            let signature = k256::ecdsa::Signature::from_slice(&sig_bytes)
                .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
            Ok(k256::ecdsa::signature::Verifier::verify(&verifying_key, message, &signature)
                .is_ok())
        }
        SignatureAlgorithm::RsaPss => {
            let public_key = decode_rsa_public_key(&pubkey_bytes)?;
            let verifying_key = PssVerifyingKey::<Sha256>::new(public_key);
            let signature = rsa::pss::Signature::try_from(sig_bytes.as_slice())
                .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
            Ok(verifying_key.verify(message, &signature).is_ok())
        }
    }
}

fn encode_rsa_public_key(key: &RsaPublicKey) -> Vec<u8> {
    let n = key.n().to_bytes_be();
    let e = key.e().to_bytes_be();
    let mut out = Vec::with_capacity(4 + n.len() + 4 + e.len());
    out.extend_from_slice(&(n.len() as u32).to_be_bytes());
    out.extend_from_slice(&n);
    out.extend_from_slice(&(e.len() as u32).to_be_bytes());
    out.extend_from_slice(&e);
    out
}

fn decode_rsa_public_key(bytes: &[u8]) -> Result<RsaPublicKey, CryptoError> {
    let err = || CryptoError::InvalidKey("malformed rsa-pss public key encoding".to_string());
    if bytes.len() < 4 {
        return Err(err());
    }
    let n_len = u32::from_be_bytes(bytes[0..4].try_into().map_err(|_| err())?) as usize;
    let n_start = 4;
    let n_end = n_start + n_len;
    if bytes.len() < n_end + 4 {
        return Err(err());
    }
    let n = BigUint::from_bytes_be(&bytes[n_start..n_end]);
    let e_len =
        u32::from_be_bytes(bytes[n_end..n_end + 4].try_into().map_err(|_| err())?) as usize;
    let e_start = n_end + 4;
    let e_end = e_start + e_len;
    if bytes.len() != e_end {
        return Err(err());
    }
    let e = BigUint::from_bytes_be(&bytes[e_start..e_end]);
    RsaPublicKey::new(n, e).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ed25519_sign_and_verify_round_trips() {
        let keypair = KeyPair::generate(SignatureAlgorithm::Ed25519).unwrap();
        let proof = keypair.sign(b"hello").unwrap();
        assert!(verify(&proof, b"hello").unwrap());
        assert!(!verify(&proof, b"tampered").unwrap());
    }

    #[test]
    fn secp256k1_sign_and_verify_round_trips() {
        let keypair = KeyPair::generate(SignatureAlgorithm::Secp256k1).unwrap();
        let proof = keypair.sign(b"hello").unwrap();
        assert!(verify(&proof, b"hello").unwrap());
        assert!(!verify(&proof, b"tampered").unwrap());
    }

    #[test]
    fn signature_from_one_key_does_not_verify_under_another() {
        let a = KeyPair::generate(SignatureAlgorithm::Ed25519).unwrap();
        let b = KeyPair::generate(SignatureAlgorithm::Ed25519).unwrap();
        let proof = a.sign(b"hello").unwrap();
        let Proof::Signature { signature, .. } = &proof else {
            unreachable!()
        };
        let forged = Proof::Signature {
            algorithm: SignatureAlgorithm::Ed25519,
            public_key: b.public_key_hex().unwrap(),
            signature: signature.clone(),
        };
        assert!(!verify(&forged, b"hello").unwrap());
    }
}
