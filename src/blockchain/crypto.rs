use p256::ecdsa::signature::hazmat::{PrehashVerifier, RandomizedPrehashSigner};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use thiserror::Error;

use std::fmt;

/// Width in bytes of one P-256 coordinate or signature scalar
pub const SCALAR_LEN: usize = 32;

/// Encoded public key length: X ‖ Y, each fixed-width big-endian
pub const PUBLIC_KEY_LEN: usize = 2 * SCALAR_LEN;

/// Encoded signature length: r ‖ s, each fixed-width big-endian
pub const SIGNATURE_LEN: usize = 2 * SCALAR_LEN;

/// SEC1 tag for an uncompressed point
const SEC1_UNCOMPRESSED: u8 = 0x04;

/// Errors that can occur during cryptographic operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Transaction carries no signature")]
    MissingSignature,

    #[error("Transaction carries no public key")]
    MissingPublicKey,

    #[error("Malformed public key: {0}")]
    MalformedPublicKey(String),

    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    #[error("Signature does not match the transaction digest")]
    VerificationFailed,

    #[error("Failed to sign digest: {0}")]
    SigningError(String),
}

impl CryptoError {
    /// True when the failure comes from undecodable bytes rather than a
    /// signature that decoded fine but did not verify.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            CryptoError::MalformedPublicKey(_) | CryptoError::MalformedSignature(_)
        )
    }
}

/// A P-256 signing key together with its encoded public key
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    public_key: Vec<u8>,
}

impl KeyPair {
    /// Generates a new random key pair from the operating system RNG
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        let public_key = encode_public_key(signing_key.verifying_key());

        KeyPair {
            signing_key,
            public_key,
        }
    }

    /// Gets the public key as X ‖ Y (64 bytes)
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Signs a precomputed SHA-256 digest with a fresh random nonce
    ///
    /// # Arguments
    ///
    /// * `digest` - The 32-byte digest to sign
    ///
    /// # Returns
    ///
    /// The signature encoded as r ‖ s (64 bytes)
    pub fn sign_digest(&self, digest: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let signature: Signature = self
            .signing_key
            .sign_prehash_with_rng(&mut OsRng, digest)
            .map_err(|e| CryptoError::SigningError(e.to_string()))?;

        Ok(signature.to_bytes().to_vec())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(&self.public_key))
            .finish_non_exhaustive()
    }
}

/// Encodes a verifying key as fixed-width X ‖ Y
fn encode_public_key(key: &VerifyingKey) -> Vec<u8> {
    let point = key.to_encoded_point(false);
    // Skip the SEC1 tag byte; the remainder is X ‖ Y at 32 bytes each.
    point.as_bytes()[1..].to_vec()
}

/// Reconstructs a verifying key from its X ‖ Y encoding
pub fn decode_public_key(bytes: &[u8]) -> Result<VerifyingKey, CryptoError> {
    if bytes.len() != PUBLIC_KEY_LEN {
        return Err(CryptoError::MalformedPublicKey(format!(
            "expected {} bytes, got {}",
            PUBLIC_KEY_LEN,
            bytes.len()
        )));
    }

    let mut sec1 = Vec::with_capacity(PUBLIC_KEY_LEN + 1);
    sec1.push(SEC1_UNCOMPRESSED);
    sec1.extend_from_slice(bytes);

    VerifyingKey::from_sec1_bytes(&sec1)
        .map_err(|_| CryptoError::MalformedPublicKey("point is not on the curve".to_string()))
}

/// Reconstructs a signature from its r ‖ s encoding
pub fn decode_signature(bytes: &[u8]) -> Result<Signature, CryptoError> {
    if bytes.len() != SIGNATURE_LEN {
        return Err(CryptoError::MalformedSignature(format!(
            "expected {} bytes, got {}",
            SIGNATURE_LEN,
            bytes.len()
        )));
    }

    Signature::from_slice(bytes)
        .map_err(|_| CryptoError::MalformedSignature("scalar out of range".to_string()))
}

/// Verifies an encoded signature against a digest and encoded public key
///
/// Decoding problems are reported as `Malformed*` errors and a well-formed
/// signature that does not match as `VerificationFailed`.
pub fn verify_digest(digest: &[u8], signature: &[u8], public_key: &[u8]) -> Result<(), CryptoError> {
    let key = decode_public_key(public_key)?;
    let signature = decode_signature(signature)?;

    key.verify_prehash(digest, &signature)
        .map_err(|_| CryptoError::VerificationFailed)
}

/// Computes the SHA-256 digest of the input
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Appends `field` to `buf` preceded by its length as a big-endian u64
pub fn put_length_prefixed(buf: &mut Vec<u8>, field: &[u8]) {
    buf.extend_from_slice(&(field.len() as u64).to_be_bytes());
    buf.extend_from_slice(field);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_pair_generation() {
        let keys = KeyPair::generate();
        assert_eq!(keys.public_key().len(), PUBLIC_KEY_LEN);

        // Two draws from the OS RNG never collide in practice
        let other = KeyPair::generate();
        assert_ne!(keys.public_key(), other.public_key());
    }

    #[test]
    fn test_signing_and_verification() {
        let keys = KeyPair::generate();
        let digest = sha256(b"Hello, world!");

        let signature = keys.sign_digest(&digest).unwrap();
        assert_eq!(signature.len(), SIGNATURE_LEN);
        assert_eq!(verify_digest(&digest, &signature, keys.public_key()), Ok(()));

        let wrong = sha256(b"Wrong message");
        assert_eq!(
            verify_digest(&wrong, &signature, keys.public_key()),
            Err(CryptoError::VerificationFailed)
        );
    }

    #[test]
    fn test_signing_is_randomized() {
        let keys = KeyPair::generate();
        let digest = sha256(b"same payload");

        let first = keys.sign_digest(&digest).unwrap();
        let second = keys.sign_digest(&digest).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_public_key_round_trip() {
        let keys = KeyPair::generate();
        let key = decode_public_key(keys.public_key()).unwrap();
        assert_eq!(encode_public_key(&key), keys.public_key());
    }

    #[test]
    fn test_odd_length_encodings_are_decode_errors() {
        let keys = KeyPair::generate();
        let digest = sha256(b"payload");
        let signature = keys.sign_digest(&digest).unwrap();

        let err = verify_digest(&digest, &signature, &keys.public_key()[..63]).unwrap_err();
        assert!(matches!(err, CryptoError::MalformedPublicKey(_)));
        assert!(err.is_malformed());

        let err = verify_digest(&digest, &signature[..63], keys.public_key()).unwrap_err();
        assert!(matches!(err, CryptoError::MalformedSignature(_)));
        assert!(err.is_malformed());
    }

    #[test]
    fn test_off_curve_point_is_rejected() {
        let err = decode_public_key(&[0x01; PUBLIC_KEY_LEN]).unwrap_err();
        assert!(matches!(err, CryptoError::MalformedPublicKey(_)));
    }

    #[test]
    fn test_zero_signature_is_rejected() {
        let err = decode_signature(&[0u8; SIGNATURE_LEN]).unwrap_err();
        assert!(matches!(err, CryptoError::MalformedSignature(_)));
    }

    #[test]
    fn test_length_prefix_separates_fields() {
        let mut left = Vec::new();
        put_length_prefixed(&mut left, b"ab");
        put_length_prefixed(&mut left, b"c");

        let mut right = Vec::new();
        put_length_prefixed(&mut right, b"a");
        put_length_prefixed(&mut right, b"bc");

        assert_ne!(left, right);
        assert_eq!(left.len(), 8 + 2 + 8 + 1);
    }
}
