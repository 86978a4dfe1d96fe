use crate::types::Sample;

/// Appends `new_samples` to `existing` and sorts the result by block.
///
/// Assumes the inputs share no block number; the dedup cache filters
/// already known blocks before anything is fetched.
pub fn merge(mut existing: Vec<Sample>, new_samples: Vec<Sample>) -> Vec<Sample> {
    existing.extend(new_samples);
    existing.sort_by_key(|sample| sample.block);
    existing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BlockNumber, ConsumedWeight};
    use pretty_assertions::assert_eq;

    fn sample(block: BlockNumber) -> Sample {
        Sample::from_raw(block, ConsumedWeight::default(), block * 6_000).unwrap()
    }

    fn blocks(samples: &[Sample]) -> Vec<BlockNumber> {
        samples.iter().map(|s| s.block).collect()
    }

    #[test]
    fn merge_into_empty_sorts() {
        let merged = merge(vec![], vec![sample(5), sample(1), sample(3)]);
        assert_eq!(blocks(&merged), vec![1, 3, 5]);
    }

    #[test]
    fn merge_interleaves_with_existing() {
        let existing = vec![sample(0), sample(5), sample(10)];
        let merged = merge(existing, vec![sample(8), sample(2), sample(4), sample(6)]);
        assert_eq!(blocks(&merged), vec![0, 2, 4, 5, 6, 8, 10]);
    }

    #[test]
    fn merge_with_nothing_new_keeps_dataset() {
        let existing = vec![sample(1), sample(2)];
        assert_eq!(merge(existing.clone(), vec![]), existing);
    }
}
