use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 hash as lowercase hex string, used as the block's identity.
pub type BlockHash = String;

/// `prev_hash` carried by the genesis block.
pub const GENESIS_PREV_HASH: &str = "0";

/// One link in the chain. The `hash` covers every other field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    pub index: u64,
    /// Unix seconds at construction.
    pub timestamp: i64,
    pub data: String,
    pub prev_hash: BlockHash,
    pub hash: BlockHash,
    /// Hex nonce from the entropy source, or the time-derived fallback.
    pub nonce: String,
}

impl Block {
    /// Assemble a block from its parts; the hash is computed here and
    /// nowhere else.
    pub fn seal(index: u64, timestamp: i64, data: String, prev_hash: BlockHash, nonce: String) -> Self {
        let hash = digest(index, timestamp, &data, &prev_hash, &nonce);
        Self {
            index,
            timestamp,
            data,
            prev_hash,
            hash,
            nonce,
        }
    }

    /// Recompute the digest from the stored fields.
    pub fn compute_hash(&self) -> BlockHash {
        digest(
            self.index,
            self.timestamp,
            &self.data,
            &self.prev_hash,
            &self.nonce,
        )
    }

    /// Verify the block's integrity.
    pub fn is_valid(&self) -> bool {
        self.compute_hash() == self.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}

/// Block digest: fields concatenated in fixed order with no separators.
pub fn digest(index: u64, timestamp: i64, data: &str, prev_hash: &str, nonce: &str) -> BlockHash {
    let record = format!("{}{}{}{}{}", index, timestamp, data, prev_hash, nonce);
    compute_hash(record.as_bytes())
}

/// Compute the SHA-256 hex digest of some data.
pub fn compute_hash(data: &[u8]) -> BlockHash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
