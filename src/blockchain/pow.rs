//! Proof-of-work mining engine
//!
//! Searches for a nonce whose block hash starts with the target prefix of
//! zero hex nibbles. The search never gives up.

use log::{debug, info};
use std::thread;
use std::time::{Duration, Instant};

use super::block::Block;

/// Leading zero nibbles required by default
pub const DEFAULT_DIFFICULTY: usize = 1;

/// Pause between attempts by default
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(1);

/// A SHA-256 hex digest has 64 nibbles
pub const MAX_DIFFICULTY: usize = 64;

const PROGRESS_INTERVAL: u64 = 1_000;

/// Mining statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningStats {
    /// Number of hash attempts, including the successful one
    pub attempts: u64,
    /// Wall-clock time spent searching
    pub elapsed: Duration,
}

/// Proof-of-work parameters: a fixed target and a per-attempt throttle
#[derive(Debug, Clone)]
pub struct ProofOfWork {
    target: String,
    throttle: Duration,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        ProofOfWork::new(DEFAULT_DIFFICULTY, DEFAULT_THROTTLE)
    }
}

impl ProofOfWork {
    /// Creates a mining engine
    ///
    /// # Arguments
    ///
    /// * `difficulty` - Number of leading zero hex nibbles, clamped to 1..=64
    /// * `throttle` - Sleep applied after each failed attempt
    pub fn new(difficulty: usize, throttle: Duration) -> Self {
        let difficulty = difficulty.clamp(1, MAX_DIFFICULTY);

        ProofOfWork {
            target: "0".repeat(difficulty),
            throttle,
        }
    }

    /// Gets the required hash prefix
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Gets the difficulty as a count of zero nibbles
    pub fn difficulty(&self) -> usize {
        self.target.len()
    }

    /// Gets the per-attempt throttle
    pub fn throttle(&self) -> Duration {
        self.throttle
    }

    /// The acceptance predicate
    pub fn meets_target(&self, hash: &str) -> bool {
        hash.starts_with(&self.target)
    }

    /// Whether a block carries a hash that matches its contents and the target
    pub fn is_mined(&self, block: &Block) -> bool {
        !block.hash.is_empty() && block.hash == block.calculate_hash() && self.meets_target(&block.hash)
    }

    /// Mines the block in place, filling in `hash` and `nonce`
    ///
    /// The search starts from the block's current nonce and returns only once
    /// the acceptance predicate holds.
    pub fn mine(&self, block: &mut Block) -> MiningStats {
        let start = Instant::now();
        let transactions = block.canonical_transactions();
        let mut attempts = 0u64;

        loop {
            attempts += 1;
            let hash = block.hash_with_nonce(&transactions, block.nonce);

            if self.meets_target(&hash) {
                block.hash = hash;
                break;
            }

            if attempts % PROGRESS_INTERVAL == 0 {
                debug!("Block {}: {} attempts, nonce {}", block.index, attempts, block.nonce);
            }

            block.nonce += 1;
            if !self.throttle.is_zero() {
                thread::sleep(self.throttle);
            }
        }

        let stats = MiningStats {
            attempts,
            elapsed: start.elapsed(),
        };

        info!(
            "A new block is mined! index {} hash {} ({} attempts, {}ms)",
            block.index,
            block.hash,
            stats.attempts,
            stats.elapsed.as_millis()
        );

        stats
    }
}
