use crate::block::{Block, BlockHash, GENESIS_PREV_HASH};
use crate::builder::{seal_now, BlockBuilder, NonceSource};
use crate::entropy::EntropySource;
use crate::error::{ChainError, IntegrityFault, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Check every block's hash, its position, and its link to the predecessor.
///
/// Stops at the first offending block. An empty slice is trivially valid.
pub fn validate_chain(blocks: &[Block]) -> Result<()> {
    let mut expected_prev: &str = GENESIS_PREV_HASH;
    for (i, block) in blocks.iter().enumerate() {
        let computed = block.compute_hash();
        if computed != block.hash {
            return Err(integrity(
                i,
                IntegrityFault::HashMismatch {
                    stored: block.hash.clone(),
                    computed,
                },
            ));
        }
        if block.index != i as u64 {
            return Err(integrity(
                i,
                IntegrityFault::IndexMismatch {
                    expected: i as u64,
                    found: block.index,
                },
            ));
        }
        if block.prev_hash != expected_prev {
            return Err(integrity(
                i,
                IntegrityFault::BrokenLink {
                    expected: expected_prev.to_string(),
                    found: block.prev_hash.clone(),
                },
            ));
        }
        expected_prev = &block.hash;
    }
    Ok(())
}

/// `(true, None)` for a sound chain, otherwise `(false, Some(i))` with the
/// first broken position.
pub fn is_chain_valid(blocks: &[Block]) -> (bool, Option<usize>) {
    match validate_chain(blocks) {
        Ok(()) => (true, None),
        Err(e) => (false, e.invalid_index()),
    }
}

fn integrity(index: usize, fault: IntegrityFault) -> ChainError {
    debug!(index, %fault, "chain integrity check failed");
    ChainError::Integrity { index, fault }
}

/// An owned, append-only sequence of blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Block>", into = "Vec<Block>")]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// Start a chain with a freshly built genesis block.
    pub fn new<S: EntropySource>(builder: &BlockBuilder<S>) -> Self {
        Self {
            blocks: vec![builder.create_genesis_block()],
        }
    }

    /// Adopt existing blocks, rejecting them unless they form a valid chain.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self> {
        validate_chain(&blocks)?;
        Ok(Self { blocks })
    }

    /// Append a block carrying `data`, linked to the current tip.
    pub fn append<S: EntropySource>(&mut self, builder: &BlockBuilder<S>, data: &str) -> (&Block, NonceSource) {
        let (nonce, source) = builder.draw_nonce();
        let block = self.seal_next(data, nonce);
        (block, source)
    }

    fn seal_next(&mut self, data: &str, nonce: String) -> &Block {
        let (index, prev_hash): (u64, BlockHash) = match self.blocks.last() {
            Some(tip) => (tip.index + 1, tip.hash.clone()),
            None => (0, GENESIS_PREV_HASH.to_string()),
        };
        let block = seal_now(index, data, prev_hash, nonce);
        info!(index, hash = %block.hash, "appended block");
        self.blocks.push(block);
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn last(&self) -> Option<&Block> {
        self.blocks.last()
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

    pub fn validate(&self) -> Result<()> {
        validate_chain(&self.blocks)
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }
}

impl TryFrom<Vec<Block>> for Chain {
    type Error = ChainError;

    fn try_from(blocks: Vec<Block>) -> Result<Self> {
        Self::from_blocks(blocks)
    }
}

impl From<Chain> for Vec<Block> {
    fn from(chain: Chain) -> Self {
        chain.blocks
    }
}

/// A chain appended to by several producers.
///
/// The nonce is drawn before the lock is taken; reading the tip, sealing,
/// and pushing happen under one lock so `prev_hash` always names the block
/// just before it.
pub struct SharedChain {
    inner: Mutex<Chain>,
}

impl SharedChain {
    pub fn new(chain: Chain) -> Self {
        Self {
            inner: Mutex::new(chain),
        }
    }

    pub fn append<S: EntropySource>(&self, builder: &BlockBuilder<S>, data: &str) -> (Block, NonceSource) {
        let (nonce, source) = builder.draw_nonce();
        let mut chain = self.inner.lock();
        let block = chain.seal_next(data, nonce).clone();
        (block, source)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Copy of the chain as it stands now.
    pub fn snapshot(&self) -> Chain {
        self.inner.lock().clone()
    }

    pub fn into_inner(self) -> Chain {
        self.inner.into_inner()
    }
}
