//! Tamper-evident hash chain whose block nonces come from a remote quantum
//! random number generator, with a clock-derived fallback when the provider
//! cannot be reached.

pub mod block;
pub mod builder;
pub mod chain;
pub mod config;
pub mod entropy;
pub mod error;

pub use block::{digest, Block, BlockHash};
pub use builder::{BlockBuilder, NonceSource};
pub use chain::{is_chain_valid, validate_chain, Chain, SharedChain};
pub use config::EntropyConfig;
pub use entropy::{EntropySource, QrngClient, Unavailable};
pub use error::{ChainError, IntegrityFault, Result};
