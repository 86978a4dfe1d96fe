use crate::{
    cache::DedupCache,
    client::{ChainClient, Connector, WeightLimitSchema},
    error::{ChainError, WeightGraphError},
    fetcher::BatchFetcher,
    merge::merge,
    planner,
    render::{Renderer, Traces},
    settings::Settings,
    share::ShareableState,
    types::{BlockNumber, Sample, ViewRange},
};
use std::{collections::HashMap, fmt, mem, sync::Arc};
use tokio::sync::watch;
use tracing::instrument;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Planning,
    Filtering,
    FetchingHashes { lookups: usize },
    FetchingMetrics { lookups: usize },
    Merging,
}

/// What the status area of the chart shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Connecting { endpoint: Url },
    Connected { endpoint: Url },
    Cycle(CyclePhase),
    Published { points: usize },
    Failed { reason: String },
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle | Status::Published { .. } => Ok(()),
            Status::Connecting { endpoint } => write!(f, "Connecting to {endpoint}..."),
            Status::Connected { .. } => f.write_str("Connected"),
            Status::Cycle(_) => f.write_str("Loading"),
            Status::Failed { reason } => f.write_str(reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightLimit {
    pub schema: WeightLimitSchema,
    pub max_block_weight: u64,
}

/// Initial graph request. Missing values fall back to the settings and to
/// the chain head.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphRequest {
    pub endpoint: Option<Url>,
    pub start: Option<BlockNumber>,
    pub end: Option<BlockNumber>,
}

impl From<ShareableState> for GraphRequest {
    fn from(state: ShareableState) -> Self {
        Self {
            endpoint: Some(state.endpoint),
            start: state.start,
            end: state.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub range: ViewRange,
    pub step: u64,
    pub candidates: usize,
    pub hash_lookups: usize,
    pub sample_lookups: usize,
    pub points: usize,
}

struct Connection {
    endpoint: Url,
    client: Arc<dyn ChainClient>,
    weight_limit: WeightLimit,
}

/// Caches, published series and chain connection of one chart.
///
/// Every cycle takes `&mut self`, so cycles on one session never overlap.
/// Share a session between tasks through a `tokio::sync::Mutex` to queue
/// them.
pub struct Session {
    connector: Arc<dyn Connector>,
    renderer: Box<dyn Renderer>,
    settings: Settings,
    connection: Option<Connection>,
    cache: DedupCache,
    dataset: Vec<Sample>,
    view: Option<ViewRange>,
    status: watch::Sender<Status>,
}

impl Session {
    pub fn new(
        connector: Arc<dyn Connector>,
        renderer: Box<dyn Renderer>,
        settings: Settings,
    ) -> Self {
        let (status, _) = watch::channel(Status::Idle);
        Self {
            connector,
            renderer,
            settings,
            connection: None,
            cache: DedupCache::new(),
            dataset: Vec::new(),
            view: None,
            status,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.status.subscribe()
    }

    pub fn status(&self) -> Status {
        self.status.borrow().clone()
    }

    pub fn cache(&self) -> &DedupCache {
        &self.cache
    }

    /// Published series, ascending by block.
    pub fn dataset(&self) -> &[Sample] {
        &self.dataset
    }

    pub fn view(&self) -> Option<ViewRange> {
        self.view
    }

    /// Samples inside the current view, ascending by block.
    pub fn visible(&self) -> Vec<&Sample> {
        match self.view {
            Some(view) => self.cache.samples_in(view).collect(),
            None => Vec::new(),
        }
    }

    pub fn endpoint(&self) -> Option<&Url> {
        self.connection.as_ref().map(|c| &c.endpoint)
    }

    pub fn weight_limit(&self) -> Option<WeightLimit> {
        self.connection.as_ref().map(|c| c.weight_limit)
    }

    pub fn shareable_state(&self) -> Option<ShareableState> {
        let endpoint = self.endpoint()?.clone();
        Some(ShareableState {
            endpoint,
            start: self.view.map(|v| v.start()),
            end: self.view.map(|v| v.end()),
        })
    }

    /// Drops cached data and the chart. The connection is kept.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.dataset.clear();
        self.view = None;
        self.renderer.clear();
        self.set_status(Status::Idle);
    }

    /// Reuses the current client if `endpoint` is unchanged. A new endpoint
    /// starts from empty caches.
    #[instrument(skip_all, fields(endpoint = %endpoint), level = "info")]
    pub async fn connect(&mut self, endpoint: &Url) -> Result<WeightLimit, WeightGraphError> {
        let result = self.connect_inner(endpoint).await;
        self.report(result)
    }

    /// Resets the session, connects, and graphs the requested window.
    #[instrument(skip_all, level = "info")]
    pub async fn graph_weight(
        &mut self,
        request: GraphRequest,
    ) -> Result<CycleReport, WeightGraphError> {
        let result = self.graph_weight_inner(request).await;
        self.report(result)
    }

    /// Handles a zoom of the chart's block axis.
    #[instrument(skip_all, fields(start = start, end = end), level = "info")]
    pub async fn on_view_range_changed(
        &mut self,
        start: f64,
        end: f64,
    ) -> Result<CycleReport, WeightGraphError> {
        let result = match ViewRange::from_axis(start, end) {
            Ok(range) => self.run_cycle(range).await,
            Err(err) => Err(err.into()),
        };
        self.report(result)
    }

    /// Runs one plan, fetch, merge and publish cycle for `range`.
    #[instrument(skip_all, fields(range = %range), level = "info")]
    pub async fn load_range(&mut self, range: ViewRange) -> Result<CycleReport, WeightGraphError> {
        let result = self.run_cycle(range).await;
        self.report(result)
    }

    async fn connect_inner(&mut self, endpoint: &Url) -> Result<WeightLimit, WeightGraphError> {
        if let Some(connection) = &self.connection {
            if &connection.endpoint == endpoint {
                return Ok(connection.weight_limit);
            }
            tracing::info!(previous = %connection.endpoint, "endpoint changed, dropping session data");
            self.connection = None;
            self.reset();
        }

        self.set_status(Status::Connecting {
            endpoint: endpoint.clone(),
        });
        let connection = self.establish(endpoint).await?;
        let weight_limit = connection.weight_limit;
        self.connection = Some(connection);
        self.set_status(Status::Connected {
            endpoint: endpoint.clone(),
        });
        Ok(weight_limit)
    }

    async fn establish(&self, endpoint: &Url) -> Result<Connection, WeightGraphError> {
        let connection_error = |source: ChainError| WeightGraphError::Connection {
            endpoint: endpoint.clone(),
            source,
        };
        let client = self
            .connector
            .connect(endpoint)
            .await
            .map_err(connection_error)?;

        for schema in WeightLimitSchema::PREFERENCE {
            let limit = client
                .block_weight_limit(schema)
                .await
                .map_err(connection_error)?;
            if let Some(max_block_weight) = limit {
                tracing::info!(%schema, max_block_weight, "resolved block weight limit");
                return Ok(Connection {
                    endpoint: endpoint.clone(),
                    client,
                    weight_limit: WeightLimit {
                        schema,
                        max_block_weight,
                    },
                });
            }
        }
        Err(WeightGraphError::UnsupportedRuntime(endpoint.clone()))
    }

    async fn graph_weight_inner(
        &mut self,
        request: GraphRequest,
    ) -> Result<CycleReport, WeightGraphError> {
        let endpoint = request
            .endpoint
            .or_else(|| self.settings.endpoint.clone())
            .ok_or(WeightGraphError::NotConnected)?;
        if let (Some(start), Some(end)) = (request.start, request.end) {
            ViewRange::new(start, end)?;
        }

        // Session data is only dropped once the new window is known to be valid.
        let fresh = match &self.connection {
            Some(connection) if connection.endpoint == endpoint => None,
            _ => {
                self.set_status(Status::Connecting {
                    endpoint: endpoint.clone(),
                });
                Some(self.establish(&endpoint).await?)
            }
        };
        let connection = match (&fresh, &self.connection) {
            (Some(connection), _) | (None, Some(connection)) => connection,
            (None, None) => return Err(WeightGraphError::NotConnected),
        };
        let range = self
            .initial_range(connection, request.start, request.end)
            .await?;

        self.reset();
        if let Some(connection) = fresh {
            if let Some(previous) = &self.connection {
                tracing::info!(previous = %previous.endpoint, "endpoint changed, dropping session data");
            }
            self.connection = Some(connection);
            self.set_status(Status::Connected { endpoint });
        }
        self.run_cycle(range).await
    }

    async fn initial_range(
        &self,
        connection: &Connection,
        start: Option<BlockNumber>,
        end: Option<BlockNumber>,
    ) -> Result<ViewRange, WeightGraphError> {
        let end = match end {
            Some(end) => end,
            None => connection.client.best_block_number().await.map_err(|source| {
                WeightGraphError::Connection {
                    endpoint: connection.endpoint.clone(),
                    source,
                }
            })?,
        };
        let start = start
            .unwrap_or_else(|| end.saturating_sub(self.settings.sampler.default_window_blocks));
        Ok(ViewRange::new(start, end)?)
    }

    async fn run_cycle(&mut self, range: ViewRange) -> Result<CycleReport, WeightGraphError> {
        let (client, max_weight) = match &self.connection {
            Some(connection) => (
                connection.client.clone(),
                connection.weight_limit.max_block_weight,
            ),
            None => return Err(WeightGraphError::NotConnected),
        };

        self.enter(CyclePhase::Planning);
        let plan = planner::plan(range, self.settings.sampler.point_count);

        self.enter(CyclePhase::Filtering);
        let missing_hashes = self.cache.missing_hashes(&plan.blocks);

        let fetcher = BatchFetcher::new(client.as_ref(), &self.settings.fetcher);
        self.enter(CyclePhase::FetchingHashes {
            lookups: missing_hashes.len(),
        });
        let new_hashes = fetcher.fetch_hashes(&missing_hashes).await?;

        // Hashes of this cycle are only committed together with its samples.
        let staged: HashMap<_, _> = new_hashes.iter().copied().collect();
        let targets: Vec<_> = self
            .cache
            .missing_samples(&plan.blocks)
            .into_iter()
            .filter_map(|block| {
                let hash = staged
                    .get(&block)
                    .copied()
                    .or_else(|| self.cache.hash(block))?;
                Some((block, hash))
            })
            .collect();
        self.enter(CyclePhase::FetchingMetrics {
            lookups: targets.len(),
        });
        let new_samples = fetcher
            .fetch_samples(&targets)
            .await?
            .into_iter()
            .map(|raw| raw.decode())
            .collect::<Result<Vec<_>, _>>()?;

        self.enter(CyclePhase::Merging);
        let hash_lookups = new_hashes.len();
        let sample_lookups = new_samples.len();
        for (block, hash) in new_hashes {
            self.cache.record_hash(block, hash);
        }
        for sample in &new_samples {
            self.cache.record_sample(sample.clone());
        }
        self.dataset = merge(mem::take(&mut self.dataset), new_samples);
        self.view = Some(range);

        let traces = Traces::build(&self.dataset, max_weight);
        self.renderer.replace_all(&traces);
        let points = self.dataset.len();
        self.set_status(Status::Published { points });

        tracing::info!(
            step = plan.step,
            candidates = plan.blocks.len(),
            hash_lookups,
            sample_lookups,
            points,
            "weight cycle published"
        );
        Ok(CycleReport {
            range,
            step: plan.step,
            candidates: plan.blocks.len(),
            hash_lookups,
            sample_lookups,
            points,
        })
    }

    fn enter(&self, phase: CyclePhase) {
        tracing::debug!(phase =? phase, "weight cycle phase");
        self.set_status(Status::Cycle(phase));
    }

    fn set_status(&self, status: Status) {
        self.status.send_replace(status);
    }

    fn report<T>(&self, result: Result<T, WeightGraphError>) -> Result<T, WeightGraphError> {
        if let Err(err) = &result {
            tracing::error!(err = %err, "weight graph update failed");
            self.set_status(Status::Failed {
                reason: err.to_string(),
            });
        }
        result
    }
}
