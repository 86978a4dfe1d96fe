use crate::{
    error::ChainError,
    types::{BlockHash, BlockNumber, ConsumedWeight},
};
use async_trait::async_trait;
use std::{fmt, sync::Arc};
use url::Url;

/// Where a runtime publishes its per-block weight limit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WeightLimitSchema {
    /// `system.blockWeights.maxBlock`
    BlockWeights,
    /// `system.maximumBlockWeight`, older runtimes
    MaximumBlockWeight,
}

impl WeightLimitSchema {
    /// Checked in this order when a connection is established.
    pub const PREFERENCE: [WeightLimitSchema; 2] = [
        WeightLimitSchema::BlockWeights,
        WeightLimitSchema::MaximumBlockWeight,
    ];
}

impl fmt::Display for WeightLimitSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeightLimitSchema::BlockWeights => "system.blockWeights.maxBlock",
            WeightLimitSchema::MaximumBlockWeight => "system.maximumBlockWeight",
        };
        f.write_str(name)
    }
}

/// Point lookups against a chain node. Every call may fail independently.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn block_hash(&self, block: BlockNumber) -> Result<BlockHash, ChainError>;

    async fn block_weight_at(&self, hash: BlockHash) -> Result<ConsumedWeight, ChainError>;

    /// Milliseconds since epoch.
    async fn timestamp_at(&self, hash: BlockHash) -> Result<u64, ChainError>;

    async fn best_block_number(&self) -> Result<BlockNumber, ChainError>;

    /// `Ok(None)` when the runtime does not expose the constant under `schema`.
    async fn block_weight_limit(
        &self,
        schema: WeightLimitSchema,
    ) -> Result<Option<u64>, ChainError>;
}

/// Establishes chain client sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Url) -> Result<Arc<dyn ChainClient>, ChainError>;
}
