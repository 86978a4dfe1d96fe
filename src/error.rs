use crate::types::{BlockHash, BlockNumber};
use std::{fmt, time::Duration};
use thiserror::Error;
use url::Url;

/// Failure of a single chain client call.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("block {0} is unknown to the node")]
    UnknownBlock(BlockNumber),
    #[error("state at {0} has been pruned")]
    StatePruned(BlockHash),
    #[error("unexpected value: {0}")]
    Decode(String),
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LookupKind {
    Hash,
    Weight,
    Timestamp,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LookupKind::Hash => "hash",
            LookupKind::Weight => "weight",
            LookupKind::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("{kind} lookup for block {block} failed: {source}")]
pub struct LookupError {
    pub block: BlockNumber,
    pub kind: LookupKind,
    #[source]
    pub source: ChainError,
}

impl LookupError {
    pub fn new(block: BlockNumber, kind: LookupKind, source: ChainError) -> Self {
        Self {
            block,
            kind,
            source,
        }
    }
}

#[derive(Debug, Copy, Clone, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("start block {start} must be lower than end block {end}")]
    Empty { start: BlockNumber, end: BlockNumber },
    #[error("block bound {0} is negative")]
    Negative(i64),
    #[error("block bounds must be finite numbers")]
    NotFinite,
}

#[derive(Debug, Error)]
pub enum WeightGraphError {
    #[error("cannot connect to {endpoint}: {source}")]
    Connection {
        endpoint: Url,
        #[source]
        source: ChainError,
    },
    #[error("no endpoint connected")]
    NotConnected,
    #[error("runtime at {0} exposes no known block weight limit")]
    UnsupportedRuntime(Url),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("invalid block range: {0}")]
    Range(#[from] RangeError),
}
