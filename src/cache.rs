use crate::types::{BlockHash, BlockNumber, Sample, ViewRange};
use std::collections::BTreeMap;

/// Session-scoped stores of resolved block hashes and samples, keyed by
/// block number. Entries are never evicted; only [`DedupCache::clear`]
/// drops them.
#[derive(Debug, Default, Clone)]
pub struct DedupCache {
    hashes: BTreeMap<BlockNumber, BlockHash>,
    samples: BTreeMap<BlockNumber, Sample>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_hash(&self, block: BlockNumber) -> bool {
        self.hashes.contains_key(&block)
    }

    pub fn has_sample(&self, block: BlockNumber) -> bool {
        self.samples.contains_key(&block)
    }

    pub fn hash(&self, block: BlockNumber) -> Option<BlockHash> {
        self.hashes.get(&block).copied()
    }

    pub fn record_hash(&mut self, block: BlockNumber, hash: BlockHash) {
        if let Some(previous) = self.hashes.insert(block, hash) {
            if previous != hash {
                tracing::warn!(block, %previous, %hash, "block hash changed for a cached block");
            }
        }
    }

    pub fn record_sample(&mut self, sample: Sample) {
        let block = sample.block;
        if let Some(previous) = self.samples.insert(block, sample) {
            if self.samples.get(&block) != Some(&previous) {
                tracing::warn!(block, "sample changed for a cached block");
            }
        }
    }

    /// Candidates that still need a hash lookup, in candidate order.
    pub fn missing_hashes(&self, candidates: &[BlockNumber]) -> Vec<BlockNumber> {
        candidates
            .iter()
            .copied()
            .filter(|block| !self.has_hash(*block))
            .collect()
    }

    /// Candidates that still need weight and timestamp lookups, in candidate order.
    pub fn missing_samples(&self, candidates: &[BlockNumber]) -> Vec<BlockNumber> {
        candidates
            .iter()
            .copied()
            .filter(|block| !self.has_sample(*block))
            .collect()
    }

    pub fn hash_count(&self) -> usize {
        self.hashes.len()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Cached samples in ascending block order.
    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.samples.values()
    }

    /// Cached samples inside `range`, in ascending block order.
    pub fn samples_in(&self, range: ViewRange) -> impl Iterator<Item = &Sample> {
        self.samples.range(range.start()..range.end()).map(|(_, s)| s)
    }

    pub fn clear(&mut self) {
        self.hashes.clear();
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConsumedWeight;
    use pretty_assertions::assert_eq;

    fn hash(byte: u8) -> BlockHash {
        BlockHash::new([byte; 32])
    }

    fn sample(block: BlockNumber) -> Sample {
        let weight = ConsumedWeight {
            normal: block,
            operational: 1,
            mandatory: 2,
        };
        Sample::from_raw(block, weight, 1_000 * block).unwrap()
    }

    #[test]
    fn missing_sets_skip_known_blocks() {
        let mut cache = DedupCache::new();
        cache.record_hash(5, hash(5));
        cache.record_hash(10, hash(10));
        cache.record_sample(sample(10));

        let candidates = [0, 5, 10, 15];
        assert_eq!(cache.missing_hashes(&candidates), vec![0, 15]);
        assert_eq!(cache.missing_samples(&candidates), vec![0, 5, 15]);
        assert!(cache.has_hash(5));
        assert!(!cache.has_sample(5));
        assert_eq!(cache.hash(10), Some(hash(10)));
    }

    #[test]
    fn recording_is_idempotent() {
        let mut cache = DedupCache::new();
        for _ in 0..3 {
            cache.record_hash(1, hash(1));
            cache.record_sample(sample(1));
        }
        assert_eq!(cache.hash_count(), 1);
        assert_eq!(cache.sample_count(), 1);
    }

    #[test]
    fn samples_are_ordered_and_range_filtered() {
        let mut cache = DedupCache::new();
        for block in [30, 10, 20, 40] {
            cache.record_sample(sample(block));
        }
        let all: Vec<_> = cache.samples().map(|s| s.block).collect();
        assert_eq!(all, vec![10, 20, 30, 40]);

        let range = ViewRange::new(15, 40).unwrap();
        let visible: Vec<_> = cache.samples_in(range).map(|s| s.block).collect();
        assert_eq!(visible, vec![20, 30]);

        cache.clear();
        assert_eq!(cache.sample_count(), 0);
        assert_eq!(cache.hash_count(), 0);
    }
}
