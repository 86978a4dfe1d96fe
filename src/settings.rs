use config::{Config, File};
use serde::{de, Deserialize, Serialize};
use serde_with::serde_as;
use std::{
    num::{NonZeroU32, NonZeroUsize},
    time::Duration,
};
use url::Url;

/// Blocks per day for chains with 6 second blocks.
pub const BLOCKS_PER_DAY: u64 = 10 * 60 * 24;
pub const BLOCKS_PER_WEEK: u64 = 7 * BLOCKS_PER_DAY;

const DEFAULT_POINT_COUNT: NonZeroU32 = match NonZeroU32::new(200) {
    Some(count) => count,
    None => unreachable!(),
};

/// Wrapper under [`serde::de::IgnoredAny`] which implements
/// [`PartialEq`] and [`Eq`] for fields to be ignored.
#[derive(Copy, Clone, Debug, Default, Deserialize)]
struct IgnoredAny(de::IgnoredAny);

impl PartialEq for IgnoredAny {
    fn eq(&self, _other: &Self) -> bool {
        // We ignore that values, so they should not impact the equality
        true
    }
}

impl Eq for IgnoredAny {}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub endpoint: Option<Url>,
    pub sampler: SamplerSettings,
    pub fetcher: FetcherSettings,

    // Is required as we deny unknown fields, but allow users provide
    // path to config through PREFIX__CONFIG env variable. If removed,
    // the setup would fail with `unknown field `config`, expected one of...`
    #[serde(skip_serializing, rename = "config")]
    config_path: IgnoredAny,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SamplerSettings {
    /// Number of points requested per cycle.
    pub point_count: NonZeroU32,
    /// Size of the initial window, ending at the best block.
    pub default_window_blocks: u64,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            point_count: DEFAULT_POINT_COUNT,
            default_window_blocks: BLOCKS_PER_WEEK,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FetcherSettings {
    /// Upper bound on in-flight lookups per wave. Unbounded if not set.
    pub concurrency: Option<NonZeroUsize>,
    #[serde_as(as = "Option<serde_with::DurationSeconds<u64>>")]
    pub lookup_timeout: Option<Duration>,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            concurrency: None,
            lookup_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl Settings {
    pub fn new() -> anyhow::Result<Self> {
        let config_path = std::env::var("WEIGHT_GRAPH__CONFIG");

        let mut builder = Config::builder();
        if let Ok(config_path) = config_path {
            builder = builder.add_source(File::with_name(&config_path));
        };
        // Use `__` so that it would be possible to address keys with underscores in names (e.g. `point_count`)
        builder =
            builder.add_source(config::Environment::with_prefix("WEIGHT_GRAPH").separator("__"));

        let settings: Settings = builder.build()?.try_deserialize()?;

        Ok(settings)
    }
}
