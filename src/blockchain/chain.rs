use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use log::info;

use super::block::Block;
use super::pow::ProofOfWork;

/// Errors that can occur during chain operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("Block index {got} does not follow the tail (expected {expected})")]
    Discontinuous { expected: u64, got: u64 },

    #[error("Block {index} does not reference the tail hash")]
    BrokenLink { index: u64 },

    #[error("Invalid genesis block: {0}")]
    InvalidGenesis(String),
}

/// An ordered, append-only sequence of blocks starting at genesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// Creates a chain around an already mined genesis block
    pub fn new(genesis: Block) -> Result<Self, ChainError> {
        if !genesis.is_genesis() {
            return Err(ChainError::InvalidGenesis(format!(
                "index {}, previous hash {:?}, {} transactions",
                genesis.index,
                genesis.previous_hash,
                genesis.transactions.len()
            )));
        }

        Ok(Chain {
            blocks: vec![genesis],
        })
    }

    /// Mines a fresh genesis block and wraps it in a chain
    pub fn genesis(pow: &ProofOfWork) -> Self {
        info!("Mining genesis block...");
        let mut genesis = Block::genesis();
        pow.mine(&mut genesis);

        Chain {
            blocks: vec![genesis],
        }
    }

    /// Gets the last block in the chain
    pub fn tail(&self) -> &Block {
        // A chain is never constructed without its genesis block
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Validates the links between adjacent blocks
    ///
    /// This is a structural check only: it does not recompute hashes, re-run
    /// the proof-of-work predicate or verify signatures. A block whose
    /// contents and own hash are both rewritten while its link fields stay
    /// intact passes.
    ///
    /// # Returns
    ///
    /// true if every block references its predecessor's hash, false otherwise
    pub fn is_valid(&self) -> bool {
        self.blocks
            .windows(2)
            .all(|pair| pair[1].previous_hash == pair[0].hash)
    }

    /// Appends a block that continues the tail
    fn push(&mut self, block: Block) -> Result<(), ChainError> {
        let tail = self.tail();

        if block.index != tail.index + 1 {
            return Err(ChainError::Discontinuous {
                expected: tail.index + 1,
                got: block.index,
            });
        }
        if block.previous_hash != tail.hash {
            return Err(ChainError::BrokenLink { index: block.index });
        }

        self.blocks.push(block);
        Ok(())
    }
}

/// Shared, read-only handle to the current chain
///
/// Every append publishes a new immutable `Arc<Chain>`; readers clone the
/// `Arc` and never observe a half-written sequence.
#[derive(Debug, Clone)]
pub struct ChainStore {
    current: Arc<RwLock<Arc<Chain>>>,
}

/// The single handle allowed to append to a `ChainStore`
#[derive(Debug)]
pub struct ChainWriter {
    current: Arc<RwLock<Arc<Chain>>>,
}

impl ChainStore {
    /// Opens a store over `chain`, returning the reader handle and its only writer
    pub fn new(chain: Chain) -> (ChainStore, ChainWriter) {
        let current = Arc::new(RwLock::new(Arc::new(chain)));

        (
            ChainStore {
                current: current.clone(),
            },
            ChainWriter { current },
        )
    }

    /// Gets a point-in-time view of the whole chain
    pub fn snapshot(&self) -> Arc<Chain> {
        read_current(&self.current)
    }

    /// Validates the chain as of now
    pub fn is_valid(&self) -> bool {
        self.snapshot().is_valid()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }
}

impl ChainWriter {
    /// Gets the last block in the chain
    pub fn tail(&self) -> Block {
        read_current(&self.current).tail().clone()
    }

    /// Adds a block to the tail of the chain
    ///
    /// The new sequence is built outside the lock and published with a
    /// single pointer swap.
    pub fn append(&self, block: Block) -> Result<(), ChainError> {
        let mut next = read_current(&self.current).as_ref().clone();
        next.push(block)?;

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Arc::new(next);
        Ok(())
    }

    /// Gets a reader handle sharing this writer's chain
    pub fn store(&self) -> ChainStore {
        ChainStore {
            current: self.current.clone(),
        }
    }
}

fn read_current(current: &RwLock<Arc<Chain>>) -> Arc<Chain> {
    current.read().unwrap_or_else(PoisonError::into_inner).clone()
}
