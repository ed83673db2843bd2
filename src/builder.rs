use crate::block::{Block, BlockHash, GENESIS_PREV_HASH};
use crate::entropy::EntropySource;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Payload of the first block in every chain.
pub const GENESIS_DATA: &str = "Genesis Block";

/// Where a block's nonce came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NonceSource {
    /// Drawn from the external entropy provider.
    Quantum,
    /// Derived from the wall clock because the provider could not be used.
    /// Guessable; the block is still valid.
    Fallback,
}

/// Builds blocks, drawing one nonce per block from an entropy source.
///
/// Construction never fails: entropy errors are logged and replaced with a
/// time-derived nonce.
pub struct BlockBuilder<S> {
    entropy: S,
}

impl<S: EntropySource> BlockBuilder<S> {
    pub fn new(entropy: S) -> Self {
        Self { entropy }
    }

    pub fn entropy(&self) -> &S {
        &self.entropy
    }

    /// `create_block(0, "Genesis Block", "0")`.
    pub fn create_genesis_block(&self) -> Block {
        self.create_block(0, GENESIS_DATA, GENESIS_PREV_HASH)
    }

    pub fn create_block(&self, index: u64, data: &str, prev_hash: &str) -> Block {
        self.mint(index, data, prev_hash).0
    }

    /// Like [`create_block`](Self::create_block), but also reports whether
    /// the nonce is quantum or fallback.
    pub fn mint(&self, index: u64, data: &str, prev_hash: &str) -> (Block, NonceSource) {
        let (nonce, source) = self.draw_nonce();
        (seal_now(index, data, prev_hash.to_string(), nonce), source)
    }

    /// Fetch exactly one hex value, degrading to [`fallback_nonce`] on any
    /// error.
    pub fn draw_nonce(&self) -> (String, NonceSource) {
        match self.entropy.fetch_hex_values(1) {
            Ok(mut values) if !values.is_empty() => (values.swap_remove(0), NonceSource::Quantum),
            Ok(_) => {
                warn!("entropy source returned no values; using fallback nonce");
                (fallback_nonce(), NonceSource::Fallback)
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch quantum nonce; using fallback");
                (fallback_nonce(), NonceSource::Fallback)
            }
        }
    }
}

/// Seal a block stamped with the current time.
pub(crate) fn seal_now(index: u64, data: &str, prev_hash: BlockHash, nonce: String) -> Block {
    Block::seal(index, Utc::now().timestamp(), data.to_string(), prev_hash, nonce)
}

/// Current Unix time in nanoseconds, rendered as lowercase hex.
pub fn fallback_nonce() -> String {
    let now = Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp().saturating_mul(1_000_000_000));
    format!("{:x}", nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::Unavailable;
    use crate::error::{ChainError, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Hands out a fixed value and counts requests.
    struct Fixed {
        value: &'static str,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(value: &'static str) -> Self {
            Self {
                value,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl EntropySource for Fixed {
        fn fetch_hex_values(&self, count: usize) -> Result<Vec<String>> {
            assert_eq!(count, 1);
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![self.value.to_string()])
        }

        fn fetch_byte_values(&self, _count: usize) -> Result<Vec<u8>> {
            Err(ChainError::Provider("unused".into()))
        }
    }

    #[test]
    fn genesis_block_shape() {
        let builder = BlockBuilder::new(Fixed::new("0badc0de"));
        let g = builder.create_genesis_block();
        assert_eq!(g.index, 0);
        assert_eq!(g.prev_hash, "0");
        assert_eq!(g.data, "Genesis Block");
        assert_eq!(g.nonce, "0badc0de");
        assert!(g.is_valid());
    }

    #[test]
    fn one_request_per_block() {
        let builder = BlockBuilder::new(Fixed::new("12345678"));
        builder.create_block(0, "a", "0");
        builder.create_block(1, "b", "x");
        assert_eq!(builder.entropy().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn quantum_nonce_is_tagged() {
        let builder = BlockBuilder::new(Fixed::new("cafebabe"));
        let (block, source) = builder.mint(7, "payload", "prev");
        assert_eq!(source, NonceSource::Quantum);
        assert_eq!(block.nonce, "cafebabe");
        assert_eq!(block.index, 7);
        assert_eq!(block.prev_hash, "prev");
        assert!(block.is_valid());
    }

    #[test]
    fn unreachable_source_falls_back() {
        let builder = BlockBuilder::new(Unavailable);
        let (block, source) = builder.mint(1, "tx:alice->bob:5", "0");
        assert_eq!(source, NonceSource::Fallback);
        assert!(block.is_valid());
        assert!(!block.nonce.is_empty());
        assert!(block.nonce.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fallback_nonce_tracks_wall_clock() {
        let before = Utc::now().timestamp_nanos_opt().unwrap();
        let nonce = fallback_nonce();
        let after = Utc::now().timestamp_nanos_opt().unwrap();
        let value = i64::from_str_radix(&nonce, 16).unwrap();
        assert!(before <= value && value <= after);
    }

    #[test]
    fn timestamp_is_current() {
        let builder = BlockBuilder::new(Fixed::new("01"));
        let before = Utc::now().timestamp();
        let b = builder.create_block(2, "d", "p");
        let after = Utc::now().timestamp();
        assert!(before <= b.timestamp && b.timestamp <= after);
    }
}
