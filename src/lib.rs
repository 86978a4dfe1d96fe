//! Incremental sampling of per-block weight over a block range.
//!
//! A [`Session`] plans which blocks to sample for a requested window,
//! skips blocks already known to its [`DedupCache`], resolves the rest in
//! two waves of concurrent lookups (hashes, then weight and timestamp at
//! those hashes) and publishes the merged, block ordered series to a
//! [`Renderer`].

pub mod cache;
pub mod client;
pub mod error;
pub mod fetcher;
pub mod merge;
pub mod planner;
pub mod render;
pub mod session;
pub mod settings;
pub mod share;
pub mod types;

#[cfg(any(feature = "test-utils", test))]
pub mod tests;

pub use cache::DedupCache;
pub use client::{ChainClient, Connector, WeightLimitSchema};
pub use error::{ChainError, LookupError, LookupKind, RangeError, WeightGraphError};
pub use fetcher::{BatchFetcher, RawSample};
pub use planner::{plan, SamplePlan};
pub use render::{NoopRenderer, Renderer, Trace, TraceKind, Traces};
pub use session::{CyclePhase, CycleReport, GraphRequest, Session, Status, WeightLimit};
pub use settings::Settings;
pub use share::{ShareableState, ShareableStateError};
pub use types::{BlockHash, BlockNumber, ConsumedWeight, Sample, ViewRange};
