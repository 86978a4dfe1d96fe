use crate::{
    client::ChainClient,
    error::{ChainError, LookupError, LookupKind},
    settings::FetcherSettings,
    types::{BlockHash, BlockNumber, ConsumedWeight, Sample},
};
use futures::{stream, Future, StreamExt, TryStreamExt};
use std::{num::NonZeroUsize, time::Duration};

/// Undecoded weight and timestamp of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub block: BlockNumber,
    pub weight: ConsumedWeight,
    pub timestamp_ms: u64,
}

impl RawSample {
    pub fn decode(self) -> Result<Sample, LookupError> {
        Sample::from_raw(self.block, self.weight, self.timestamp_ms).map_err(|source| {
            let kind = match self.weight.total() {
                None => LookupKind::Weight,
                Some(_) => LookupKind::Timestamp,
            };
            LookupError::new(self.block, kind, source)
        })
    }
}

/// Resolves hashes and raw samples as waves of concurrent point lookups.
/// Every result carries the block number it was issued for, so completion
/// order does not matter. Nothing is written to caches here.
pub struct BatchFetcher<'a> {
    client: &'a dyn ChainClient,
    concurrency: Option<NonZeroUsize>,
    lookup_timeout: Option<Duration>,
}

impl<'a> BatchFetcher<'a> {
    pub fn new(client: &'a dyn ChainClient, settings: &FetcherSettings) -> Self {
        Self {
            client,
            concurrency: settings.concurrency,
            lookup_timeout: settings.lookup_timeout,
        }
    }

    /// First wave. Fails as a whole if any single lookup fails.
    pub async fn fetch_hashes(
        &self,
        blocks: &[BlockNumber],
    ) -> Result<Vec<(BlockNumber, BlockHash)>, LookupError> {
        let lookups = blocks.iter().map(|&block| async move {
            let hash = self
                .lookup(block, LookupKind::Hash, self.client.block_hash(block))
                .await?;
            Ok::<_, LookupError>((block, hash))
        });
        self.run_wave(lookups, blocks.len()).await
    }

    /// Second wave: weight and timestamp lookups for each block, keyed by
    /// its already resolved hash. Both lookups of a block run concurrently.
    pub async fn fetch_samples(
        &self,
        targets: &[(BlockNumber, BlockHash)],
    ) -> Result<Vec<RawSample>, LookupError> {
        let lookups = targets.iter().map(|&(block, hash)| async move {
            let (weight, timestamp_ms) = futures::try_join!(
                self.lookup(block, LookupKind::Weight, self.client.block_weight_at(hash)),
                self.lookup(block, LookupKind::Timestamp, self.client.timestamp_at(hash)),
            )?;
            Ok::<_, LookupError>(RawSample {
                block,
                weight,
                timestamp_ms,
            })
        });
        self.run_wave(lookups, targets.len()).await
    }

    async fn run_wave<T, F>(
        &self,
        lookups: impl Iterator<Item = F>,
        size: usize,
    ) -> Result<Vec<T>, LookupError>
    where
        F: Future<Output = Result<T, LookupError>>,
    {
        let limit = self.concurrency.map_or(size, NonZeroUsize::get).max(1);
        stream::iter(lookups)
            .buffer_unordered(limit)
            .try_collect()
            .await
    }

    async fn lookup<T>(
        &self,
        block: BlockNumber,
        kind: LookupKind,
        call: impl Future<Output = Result<T, ChainError>>,
    ) -> Result<T, LookupError> {
        let result = match self.lookup_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(ChainError::Timeout(limit))),
            None => call.await,
        };
        result.map_err(|source| {
            tracing::debug!(block, %kind, err = %source, "lookup failed");
            LookupError::new(block, kind, source)
        })
    }
}
