//! Cache-first synchronization of a link collection with its remote source.
//!
//! A sync run has at most two stages. The cached stage is read synchronously
//! from the [`RecordStore`] and is available before any network work starts.
//! The live stage resolves after the fetch completes, and only when the
//! fetched collection differs from what was cached.
//!
//! No failure escapes a run: malformed cache blobs count as a miss, fetch
//! errors are logged and published on the diagnostic [`EventBus`].

use std::sync::Arc;
use std::time::Duration;

use catalog::RecordStore;
use formats::{CategoryDatum, GeoLinkCollection};
use futures_util::stream::{self, Stream, StreamExt};
use runtime::EventBus;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::source::{BoxFuture, CategorySource, DataSourceError, LinkSource};

pub const EVENT_CACHE_HIT: &str = "cache_hit";
pub const EVENT_CACHE_MISS: &str = "cache_miss";
pub const EVENT_CACHE_READ_FAILURE: &str = "cache_read_failure";
pub const EVENT_FETCH_FAILURE: &str = "fetch_failure";
pub const EVENT_EMPTY_RESULT: &str = "empty_result";
pub const EVENT_UNCHANGED: &str = "unchanged";
pub const EVENT_LIVE_UPDATE: &str = "live_update";
pub const EVENT_STORE_WRITE_FAILURE: &str = "store_write_failure";

/// What to do when a fetch succeeds with zero records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyResultPolicy {
    /// An empty result is a valid collection and replaces the cache.
    #[default]
    Accept,
    /// Ignore empty results; the cache and current stage stay as they are.
    KeepCache,
}

/// One emission of a sync run.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStage {
    Cached(GeoLinkCollection),
    Live(GeoLinkCollection),
}

impl SyncStage {
    pub fn links(&self) -> &GeoLinkCollection {
        match self {
            SyncStage::Cached(links) | SyncStage::Live(links) => links,
        }
    }

    pub fn into_links(self) -> GeoLinkCollection {
        match self {
            SyncStage::Cached(links) | SyncStage::Live(links) => links,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, SyncStage::Live(_))
    }
}

/// How the fetch half of a run ended.
#[derive(Debug)]
pub enum SyncOutcome {
    /// The fetched collection differed from the cache and was persisted.
    Updated(GeoLinkCollection),
    /// The fetched collection serialized identically to the cached blob.
    Unchanged,
    /// The fetch returned no records and [`EmptyResultPolicy::KeepCache`] applied.
    EmptyIgnored,
    Failed(DataSourceError),
}

impl SyncOutcome {
    pub fn into_stage(self) -> Option<SyncStage> {
        match self {
            SyncOutcome::Updated(links) => Some(SyncStage::Live(links)),
            _ => None,
        }
    }
}

/// Pending fetch half of a run.
pub type LiveStage = BoxFuture<'static, SyncOutcome>;

/// A single synchronization run, split into its cached and live halves.
///
/// The cached stage must be taken (via [`SyncRun::split`] or
/// [`SyncRun::into_stream`]) before the live half becomes reachable, so a
/// consumer can never observe the live stage first. The live half owns
/// everything it needs and may be spawned onto the executor before the cached
/// stage is applied, overlapping the fetch with the first paint.
pub struct SyncRun {
    cached: Option<GeoLinkCollection>,
    live: LiveStage,
}

impl SyncRun {
    pub fn cached(&self) -> Option<&GeoLinkCollection> {
        self.cached.as_ref()
    }

    pub fn split(self) -> (Option<SyncStage>, LiveStage) {
        (self.cached.map(SyncStage::Cached), self.live)
    }

    /// Finite stream of 0, 1 or 2 stages, cached strictly before live.
    pub fn into_stream(self) -> impl Stream<Item = SyncStage> + Send + 'static {
        let (cached, live) = self.split();
        stream::iter(cached).chain(
            stream::once(live)
                .filter_map(|outcome| futures_util::future::ready(outcome.into_stage())),
        )
    }
}

/// Reconciles one cached dataset with its remote source.
///
/// Cheap to clone; clones share the source, store and diagnostic channel.
/// Concurrent runs against the same key are not deduplicated.
#[derive(Clone)]
pub struct Synchronizer {
    source: Arc<dyn LinkSource>,
    store: Arc<dyn RecordStore>,
    cache_key: String,
    empty_result: EmptyResultPolicy,
    fetch_timeout: Option<Duration>,
    diagnostics: EventBus,
}

impl Synchronizer {
    pub fn new(
        source: Arc<dyn LinkSource>,
        store: Arc<dyn RecordStore>,
        cache_key: impl Into<String>,
    ) -> Self {
        Self {
            source,
            store,
            cache_key: cache_key.into(),
            empty_result: EmptyResultPolicy::default(),
            fetch_timeout: None,
            diagnostics: EventBus::new(),
        }
    }

    pub fn with_empty_result_policy(mut self, policy: EmptyResultPolicy) -> Self {
        self.empty_result = policy;
        self
    }

    /// Bound on how long a fetch may take; `None` waits indefinitely.
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_diagnostics(mut self, bus: EventBus) -> Self {
        self.diagnostics = bus;
        self
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn diagnostics(&self) -> &EventBus {
        &self.diagnostics
    }

    /// Start a run: read the cache now, prepare the fetch.
    pub fn sync(&self) -> SyncRun {
        let (cached, cached_blob) = self.read_cache();
        let this = self.clone();
        let live: LiveStage = Box::pin(async move { this.fetch_and_reconcile(cached_blob).await });
        SyncRun { cached, live }
    }

    fn read_cache(&self) -> (Option<GeoLinkCollection>, Option<String>) {
        let blob = match self.store.read(&self.cache_key) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!(key = %self.cache_key, "no cached links");
                self.diagnostics.emit(EVENT_CACHE_MISS, self.cache_key.clone());
                return (None, None);
            }
            Err(e) => {
                warn!(key = %self.cache_key, error = %e, "cache read failed; treating as miss");
                self.diagnostics
                    .emit(EVENT_CACHE_READ_FAILURE, format!("{}: {e}", self.cache_key));
                return (None, None);
            }
        };

        match formats::decode_links(&blob) {
            Ok(links) => {
                info!(
                    key = %self.cache_key,
                    links = links.len(),
                    fingerprint = %formats::blob_fingerprint(&blob),
                    "loaded links from cache"
                );
                self.diagnostics
                    .emit(EVENT_CACHE_HIT, format!("{} links", links.len()));
                (Some(links), Some(blob))
            }
            Err(e) => {
                warn!(key = %self.cache_key, error = %e, "cached blob is malformed; treating as miss");
                self.diagnostics
                    .emit(EVENT_CACHE_READ_FAILURE, format!("{}: {e}", self.cache_key));
                (None, None)
            }
        }
    }

    async fn fetch(&self) -> Result<GeoLinkCollection, DataSourceError> {
        let fetch = self.source.fetch_links();
        match self.fetch_timeout {
            None => fetch.await,
            Some(limit) => match tokio::time::timeout(limit, fetch).await {
                Ok(result) => result,
                Err(_) => Err(DataSourceError::new(format!(
                    "fetch timed out after {} ms",
                    limit.as_millis()
                ))),
            },
        }
    }

    async fn fetch_and_reconcile(self, cached_blob: Option<String>) -> SyncOutcome {
        let origin = self.source.describe();
        debug!(%origin, "fetching links");

        let links = match self.fetch().await {
            Ok(links) => links,
            Err(e) => {
                warn!(%origin, error = %e, "link fetch failed; keeping current stage");
                self.diagnostics
                    .emit(EVENT_FETCH_FAILURE, format!("{origin}: {e}"));
                return SyncOutcome::Failed(e);
            }
        };

        let invalid = links.invalid_links().count();
        if invalid > 0 {
            warn!(%origin, invalid, "fetched links with out-of-range coordinates");
        }

        if links.is_empty() {
            self.diagnostics.emit(EVENT_EMPTY_RESULT, origin.clone());
            if self.empty_result == EmptyResultPolicy::KeepCache {
                info!(%origin, "source returned no links; keeping cache");
                return SyncOutcome::EmptyIgnored;
            }
        }

        let blob = match formats::encode_links(&links) {
            Ok(blob) => blob,
            Err(e) => {
                let err = DataSourceError::with_source("fetched links could not be encoded", e);
                warn!(%origin, error = %err, "link fetch unusable");
                self.diagnostics
                    .emit(EVENT_FETCH_FAILURE, format!("{origin}: {err}"));
                return SyncOutcome::Failed(err);
            }
        };

        if cached_blob.as_deref() == Some(blob.as_str()) {
            debug!(%origin, "fetched links match cache");
            self.diagnostics.emit(EVENT_UNCHANGED, origin);
            return SyncOutcome::Unchanged;
        }

        if let Err(e) = self.store.write(&self.cache_key, &blob) {
            warn!(key = %self.cache_key, error = %e, "failed to persist fetched links");
            self.diagnostics
                .emit(EVENT_STORE_WRITE_FAILURE, format!("{}: {e}", self.cache_key));
        }

        info!(
            %origin,
            links = links.len(),
            fingerprint = %formats::blob_fingerprint(&blob),
            "links updated from source"
        );
        self.diagnostics
            .emit(EVENT_LIVE_UPDATE, format!("{} links", links.len()));
        SyncOutcome::Updated(links)
    }
}

/// Fetch the category dataset, degrading to an empty collection on failure.
pub async fn load_categories(source: &dyn CategorySource, bus: &EventBus) -> Vec<CategoryDatum> {
    match source.fetch_categories().await {
        Ok(categories) => {
            if categories.is_empty() {
                bus.emit(EVENT_EMPTY_RESULT, source.describe());
            }
            categories
        }
        Err(e) => {
            warn!(origin = %source.describe(), error = %e, "category fetch failed");
            bus.emit(EVENT_FETCH_FAILURE, format!("{}: {e}", source.describe()));
            Vec::new()
        }
    }
}
