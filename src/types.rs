use crate::error::{ChainError, RangeError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub type BlockNumber = u64;

/// Opaque 32-byte block identifier. Within a session a resolved
/// number/hash pair is never re-resolved.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BlockHash([u8; 32]);

impl BlockHash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for BlockHash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.strip_prefix("0x").unwrap_or(s), &mut bytes)?;
        Ok(Self(bytes))
    }
}

/// Weight consumed by a block, split by dispatch class.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConsumedWeight {
    pub normal: u64,
    pub operational: u64,
    pub mandatory: u64,
}

impl ConsumedWeight {
    pub fn total(&self) -> Option<u64> {
        self.normal
            .checked_add(self.operational)?
            .checked_add(self.mandatory)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub block: BlockNumber,
    pub weight_normal: u64,
    pub weight_operational: u64,
    pub weight_mandatory: u64,
    /// Always `normal + operational + mandatory`.
    pub weight_total: u64,
    pub time: DateTime<Utc>,
}

impl Sample {
    /// Decodes raw lookup results. `timestamp_ms` is milliseconds since epoch.
    pub fn from_raw(
        block: BlockNumber,
        weight: ConsumedWeight,
        timestamp_ms: u64,
    ) -> Result<Self, ChainError> {
        let weight_total = weight.total().ok_or_else(|| {
            ChainError::Decode(format!("weight total of {weight:?} overflows u64"))
        })?;
        let time = i64::try_from(timestamp_ms)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or_else(|| {
                ChainError::Decode(format!("timestamp {timestamp_ms} is out of range"))
            })?;
        Ok(Self {
            block,
            weight_normal: weight.normal,
            weight_operational: weight.operational,
            weight_mandatory: weight.mandatory,
            weight_total,
            time,
        })
    }
}

/// Requested block window, `start` inclusive and `end` exclusive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ViewRange {
    start: BlockNumber,
    end: BlockNumber,
}

impl ViewRange {
    pub fn new(start: BlockNumber, end: BlockNumber) -> Result<Self, RangeError> {
        if start >= end {
            return Err(RangeError::Empty { start, end });
        }
        Ok(Self { start, end })
    }

    /// Bounds coming from user input, which may be negative.
    pub fn from_signed(start: i64, end: i64) -> Result<Self, RangeError> {
        let start = BlockNumber::try_from(start).map_err(|_| RangeError::Negative(start))?;
        let end = BlockNumber::try_from(end).map_err(|_| RangeError::Negative(end))?;
        Self::new(start, end)
    }

    /// Bounds of a zoomed chart axis: the start is floored and the end ceiled
    /// so that the visible area is always covered.
    pub fn from_axis(start: f64, end: f64) -> Result<Self, RangeError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(RangeError::NotFinite);
        }
        Self::from_signed(start.floor() as i64, end.ceil() as i64)
    }

    pub fn start(&self) -> BlockNumber {
        self.start
    }

    pub fn end(&self) -> BlockNumber {
        self.end
    }

    /// Number of blocks in the window, never zero.
    pub fn span(&self) -> u64 {
        self.end - self.start
    }

    pub fn contains(&self, block: BlockNumber) -> bool {
        self.start <= block && block < self.end
    }
}

impl fmt::Display for ViewRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sample_total_is_sum_of_classes() {
        let weight = ConsumedWeight {
            normal: 10,
            operational: 20,
            mandatory: 5,
        };
        let sample = Sample::from_raw(7, weight, 1_600_000_000_000).unwrap();
        assert_eq!(sample.weight_total, 35);
        assert_eq!(sample.time.timestamp_millis(), 1_600_000_000_000);
    }

    #[test]
    fn overflowing_total_is_a_decode_error() {
        let weight = ConsumedWeight {
            normal: u64::MAX,
            operational: 1,
            mandatory: 0,
        };
        assert!(matches!(
            Sample::from_raw(1, weight, 0),
            Err(ChainError::Decode(_))
        ));
        assert!(matches!(
            Sample::from_raw(1, ConsumedWeight::default(), u64::MAX),
            Err(ChainError::Decode(_))
        ));
    }

    #[test]
    fn view_range_validation() {
        assert_eq!(
            ViewRange::new(10, 10),
            Err(RangeError::Empty { start: 10, end: 10 })
        );
        assert_eq!(
            ViewRange::new(11, 10),
            Err(RangeError::Empty { start: 11, end: 10 })
        );
        assert_eq!(ViewRange::from_signed(-5, 10), Err(RangeError::Negative(-5)));
        assert_eq!(ViewRange::from_axis(f64::NAN, 10.0), Err(RangeError::NotFinite));

        let range = ViewRange::from_axis(10.7, 99.2).unwrap();
        assert_eq!((range.start(), range.end()), (10, 100));
        assert_eq!(range.span(), 90);
        assert!(range.contains(10));
        assert!(!range.contains(100));
    }

    #[test]
    fn block_hash_hex_round_trip() {
        let hash: BlockHash = "0x0102030405060708091011121314151617181920212223242526272829303132"
            .parse()
            .unwrap();
        assert_eq!(hash.as_bytes()[0], 1);
        assert_eq!(
            hash.to_string(),
            "0x0102030405060708091011121314151617181920212223242526272829303132"
        );
        assert!("0x1234".parse::<BlockHash>().is_err());
    }
}
