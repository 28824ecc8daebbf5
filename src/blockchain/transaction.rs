use serde::{Deserialize, Serialize};

use super::crypto::{self, put_length_prefixed, CryptoError, KeyPair};

/// Represents a signed value transfer carried by a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Sender identifier
    pub from: String,

    /// Recipient identifier
    pub to: String,

    /// Amount being transferred (no currency semantics)
    pub amount: i64,

    /// ECDSA signature over the canonical digest, r ‖ s; empty when unsigned
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,

    /// Signer's public key, X ‖ Y; empty when absent
    #[serde(with = "hex::serde")]
    pub public_key: Vec<u8>,
}

impl Transaction {
    /// Creates a new unsigned transaction
    ///
    /// # Arguments
    ///
    /// * `from` - The sender identifier
    /// * `to` - The recipient identifier
    /// * `amount` - The amount to transfer
    /// * `public_key` - The encoded public key of the signer
    ///
    /// # Returns
    ///
    /// A new Transaction instance with an empty signature
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: i64, public_key: Vec<u8>) -> Self {
        Transaction {
            from: from.into(),
            to: to.into(),
            amount,
            signature: Vec::new(),
            public_key,
        }
    }

    /// Creates a transaction carrying `keys`' public key and signs it
    pub fn signed(
        from: impl Into<String>,
        to: impl Into<String>,
        amount: i64,
        keys: &KeyPair,
    ) -> Result<Self, CryptoError> {
        let mut transaction = Transaction::new(from, to, amount, keys.public_key().to_vec());
        transaction.sign(keys)?;
        Ok(transaction)
    }

    /// Computes the canonical digest of the authenticated fields
    ///
    /// The payload is `from`, `to` and the decimal text of `amount`, each
    /// preceded by its length, hashed with SHA-256.
    pub fn digest(&self) -> [u8; 32] {
        let amount = self.amount.to_string();

        let mut payload = Vec::with_capacity(24 + self.from.len() + self.to.len() + amount.len());
        put_length_prefixed(&mut payload, self.from.as_bytes());
        put_length_prefixed(&mut payload, self.to.as_bytes());
        put_length_prefixed(&mut payload, amount.as_bytes());

        crypto::sha256(&payload)
    }

    /// Signs the transaction, replacing any existing signature
    ///
    /// The public key field is left untouched; it is the caller's job to
    /// attach the matching key.
    pub fn sign(&mut self, keys: &KeyPair) -> Result<(), CryptoError> {
        let digest = self.digest();
        self.signature = keys.sign_digest(&digest)?;
        Ok(())
    }

    /// Checks the signature and reports why it failed
    ///
    /// # Returns
    ///
    /// `Ok(())` when the signature verifies against the attached public key,
    /// otherwise the specific failure: missing fields, undecodable bytes, or
    /// a cryptographic mismatch.
    pub fn authenticate(&self) -> Result<(), CryptoError> {
        if self.signature.is_empty() {
            return Err(CryptoError::MissingSignature);
        }
        if self.public_key.is_empty() {
            return Err(CryptoError::MissingPublicKey);
        }

        crypto::verify_digest(&self.digest(), &self.signature, &self.public_key)
    }

    /// Verifies the transaction's signature, never failing
    pub fn verify(&self) -> bool {
        self.authenticate().is_ok()
    }

    /// Serializes every field, length-prefixed, for inclusion in a block hash
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let amount = self.amount.to_string();

        let mut buf = Vec::new();
        put_length_prefixed(&mut buf, self.from.as_bytes());
        put_length_prefixed(&mut buf, self.to.as_bytes());
        put_length_prefixed(&mut buf, amount.as_bytes());
        put_length_prefixed(&mut buf, &self.signature);
        put_length_prefixed(&mut buf, &self.public_key);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transaction() {
        let keys = KeyPair::generate();
        let transaction = Transaction::new("alice", "bob", 100, keys.public_key().to_vec());

        assert_eq!(transaction.from, "alice");
        assert_eq!(transaction.to, "bob");
        assert_eq!(transaction.amount, 100);
        assert!(transaction.signature.is_empty());
        assert!(!transaction.verify());
        assert_eq!(transaction.authenticate(), Err(CryptoError::MissingSignature));
    }

    #[test]
    fn test_sign_and_verify() {
        let keys = KeyPair::generate();
        let mut transaction = Transaction::new("alice", "bob", 100, keys.public_key().to_vec());

        transaction.sign(&keys).unwrap();

        assert!(!transaction.signature.is_empty());
        assert!(transaction.verify());
    }

    #[test]
    fn test_amount_tampering_breaks_signature() {
        let keys = KeyPair::generate();
        let mut transaction = Transaction::signed("alice", "bob", 100, &keys).unwrap();

        transaction.amount = 101;

        assert!(!transaction.verify());
        assert_eq!(transaction.authenticate(), Err(CryptoError::VerificationFailed));
    }

    #[test]
    fn test_foreign_public_key_fails() {
        let signer = KeyPair::generate();
        let stranger = KeyPair::generate();

        let mut transaction = Transaction::signed("alice", "bob", 100, &signer).unwrap();
        transaction.public_key = stranger.public_key().to_vec();

        assert!(!transaction.verify());
        assert_eq!(transaction.authenticate(), Err(CryptoError::VerificationFailed));
    }

    #[test]
    fn test_missing_public_key() {
        let keys = KeyPair::generate();
        let mut transaction = Transaction::new("alice", "bob", 100, Vec::new());
        transaction.sign(&keys).unwrap();

        assert!(!transaction.verify());
        assert_eq!(transaction.authenticate(), Err(CryptoError::MissingPublicKey));
    }

    #[test]
    fn test_truncated_signature_is_malformed() {
        let keys = KeyPair::generate();
        let mut transaction = Transaction::signed("alice", "bob", 100, &keys).unwrap();
        transaction.signature.pop();

        let err = transaction.authenticate().unwrap_err();
        assert!(err.is_malformed());
        assert!(!transaction.verify());
    }

    #[test]
    fn test_digest_is_unambiguous() {
        let first = Transaction::new("ab", "c", 1, Vec::new());
        let second = Transaction::new("a", "bc", 1, Vec::new());
        assert_ne!(first.digest(), second.digest());

        let third = Transaction::new("a", "b1", 2, Vec::new());
        let fourth = Transaction::new("a", "b", 12, Vec::new());
        assert_ne!(third.digest(), fourth.digest());
    }

    #[test]
    fn test_digest_ignores_signature() {
        let keys = KeyPair::generate();
        let unsigned = Transaction::new("alice", "bob", -5, keys.public_key().to_vec());
        let signed = Transaction::signed("alice", "bob", -5, &keys).unwrap();

        assert_eq!(unsigned.digest(), signed.digest());
        assert_ne!(unsigned.canonical_bytes(), signed.canonical_bytes());
    }

    #[test]
    fn test_json_field_names() {
        let keys = KeyPair::generate();
        let transaction = Transaction::signed("alice", "bob", 100, &keys).unwrap();

        let json = serde_json::to_value(&transaction).unwrap();
        assert_eq!(json["from"], "alice");
        assert_eq!(json["to"], "bob");
        assert_eq!(json["amount"], 100);
        assert_eq!(json["signature"], hex::encode(&transaction.signature));
        assert_eq!(json["publicKey"], hex::encode(keys.public_key()));
    }
}
