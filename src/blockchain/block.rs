use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::transaction::Transaction;

/// Represents a block in the blockchain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Index of the block in the chain
    pub index: u64,

    /// Timestamp when the block was created
    pub timestamp: DateTime<Utc>,

    /// Hash of the current block (empty until mined)
    pub hash: String,

    /// Hash of the previous block
    pub previous_hash: String,

    /// Proof of work (nonce)
    pub nonce: u64,

    /// List of transactions included in this block
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Creates a new unmined block
    ///
    /// # Arguments
    ///
    /// * `index` - The index of the block in the chain
    /// * `transactions` - The list of transactions to include in the block
    /// * `previous_hash` - The hash of the previous block
    ///
    /// # Returns
    ///
    /// A new Block with `nonce = 0` and an empty hash
    pub fn new(index: u64, transactions: Vec<Transaction>, previous_hash: String) -> Self {
        Block {
            index,
            timestamp: Utc::now(),
            hash: String::new(),
            previous_hash,
            nonce: 0,
            transactions,
        }
    }

    /// Creates the unmined genesis block
    pub fn genesis() -> Self {
        Block::new(0, Vec::new(), String::new())
    }

    /// Encodes the transaction list: a count followed by each transaction
    pub fn canonical_transactions(&self) -> Vec<u8> {
        let mut buf = (self.transactions.len() as u64).to_be_bytes().to_vec();
        for transaction in &self.transactions {
            buf.extend(transaction.canonical_bytes());
        }
        buf
    }

    /// Calculates the hash of the block for its current nonce
    ///
    /// # Returns
    ///
    /// The SHA-256 of (transactions ‖ previous hash ‖ decimal nonce) as a
    /// lowercase hexadecimal string
    pub fn calculate_hash(&self) -> String {
        self.hash_with_nonce(&self.canonical_transactions(), self.nonce)
    }

    /// Hashes a pre-encoded transaction list with an explicit nonce
    pub(crate) fn hash_with_nonce(&self, transactions: &[u8], nonce: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(transactions);
        hasher.update(self.previous_hash.as_bytes());
        hasher.update(nonce.to_string().as_bytes());

        hex::encode(hasher.finalize())
    }

    /// Whether this is a genesis-shaped block
    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash.is_empty() && self.transactions.is_empty()
    }
}
