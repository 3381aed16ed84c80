//! Wires sources, cache, transforms and the scene into one single-threaded
//! viewer.
//!
//! Three local tasks share the scene controller: the frame driver, the link
//! sync and the category load. Each task borrows the controller only between
//! awaits, so every scene mutation finishes within one turn.

use std::cell::RefCell;
use std::path::Path;
use std::pin::pin;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use catalog::{FileRecordStore, InMemoryRecordStore, RecordStore};
use compute::to_chart_model;
use formats::default_categories;
use futures_util::StreamExt;
use gpu::{ChartRenderer, Renderer};
use layers::{TransformConfig, to_layers};
use runtime::{
    BOUND_LINKS, CHART_DRAWS, DRAW_CALLS, Event, EventBus, FRAMES, FrameClock, LAYER_APPLIES,
    MetricsSnapshot,
};
use scene::{RenderLoop, SceneController};
use streaming::{
    CategorySource, DocumentStoreSource, HttpCategorySource, HttpLinkSource, LinkSource,
    StaticCategorySource, Synchronizer, load_categories,
};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::config::{ConfigError, PipelineConfig, SourceConfig};

pub type SharedController<R, C> = Rc<RefCell<SceneController<R, C>>>;

pub fn link_source(source: &SourceConfig, client: reqwest::Client) -> Arc<dyn LinkSource> {
    match source {
        SourceConfig::Http { url } => Arc::new(HttpLinkSource::new(client, url.clone())),
        SourceConfig::Document {
            base_url,
            project_id,
            collection,
        } => Arc::new(DocumentStoreSource::new(
            client,
            base_url.clone(),
            project_id.clone(),
            collection.clone(),
        )),
    }
}

pub fn category_source(
    categories_url: Option<&str>,
    client: reqwest::Client,
) -> Arc<dyn CategorySource> {
    match categories_url {
        Some(url) => Arc::new(HttpCategorySource::new(client, url)),
        None => Arc::new(StaticCategorySource::new(default_categories())),
    }
}

/// File-backed cache under `cache_dir`, or a process-local one when unset.
pub fn record_store(cache_dir: Option<&Path>) -> Arc<dyn RecordStore> {
    match cache_dir {
        Some(dir) => Arc::new(FileRecordStore::new(dir)),
        None => Arc::new(InMemoryRecordStore::new()),
    }
}

pub fn synchronizer(
    config: &PipelineConfig,
    source: Arc<dyn LinkSource>,
    store: Arc<dyn RecordStore>,
    diagnostics: EventBus,
) -> Synchronizer {
    Synchronizer::new(source, store, config.cache_key())
        .with_empty_result_policy(config.empty_result_policy())
        .with_fetch_timeout(config.fetch_timeout())
        .with_diagnostics(diagnostics)
}

/// How often and how long the frame driver ticks.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FramePacing {
    interval: Duration,
    /// `None` runs until the process is stopped.
    limit: Option<u64>,
}

impl FramePacing {
    pub fn new(fps: f64, limit: Option<u64>) -> Result<Self, ConfigError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(ConfigError::Invalid(format!("fps must be positive, got {fps}")));
        }
        Ok(Self {
            interval: Duration::from_secs_f64(1.0 / fps),
            limit,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerReport {
    pub frames: u64,
    pub draw_calls: u64,
    pub layer_applies: u64,
    pub chart_draws: u64,
    /// Links in the last applied stage; `None` when nothing was ever bound.
    pub bound_links: Option<i64>,
    pub metrics: MetricsSnapshot,
    pub diagnostics: Vec<Event>,
}

pub struct Viewer<R, C> {
    controller: SharedController<R, C>,
    sync: Synchronizer,
    categories: Arc<dyn CategorySource>,
    transform: TransformConfig,
}

impl<R, C> Viewer<R, C>
where
    R: Renderer + 'static,
    C: ChartRenderer + 'static,
{
    pub fn new(
        controller: SceneController<R, C>,
        sync: Synchronizer,
        categories: Arc<dyn CategorySource>,
        transform: TransformConfig,
    ) -> Self {
        Self {
            controller: Rc::new(RefCell::new(controller)),
            sync,
            categories,
            transform,
        }
    }

    pub fn controller(&self) -> SharedController<R, C> {
        Rc::clone(&self.controller)
    }

    pub fn diagnostics(&self) -> &EventBus {
        self.sync.diagnostics()
    }

    /// Run the viewer on the current `LocalSet`.
    ///
    /// The frame driver starts immediately; the data tasks only ever replace
    /// bindings. When the frame budget is spent, unfinished data tasks are
    /// abandoned.
    pub async fn run(&self, pacing: FramePacing) -> ViewerReport {
        let links = tokio::task::spawn_local(sync_links(
            self.sync.clone(),
            self.transform.clone(),
            Rc::clone(&self.controller),
        ));
        let categories = tokio::task::spawn_local(load_chart(
            Arc::clone(&self.categories),
            self.diagnostics().clone(),
            Rc::clone(&self.controller),
        ));

        drive_frames(&self.controller, pacing).await;

        links.abort();
        categories.abort();
        self.report()
    }

    pub fn report(&self) -> ViewerReport {
        let controller = self.controller.borrow();
        let metrics = controller.metrics();
        ViewerReport {
            frames: metrics.counter(FRAMES),
            draw_calls: metrics.counter(DRAW_CALLS),
            layer_applies: metrics.counter(LAYER_APPLIES),
            chart_draws: metrics.counter(CHART_DRAWS),
            bound_links: metrics.gauge(BOUND_LINKS),
            metrics: metrics.snapshot(),
            diagnostics: self.diagnostics().events(),
        }
    }
}

async fn drive_frames<R: Renderer, C: ChartRenderer>(
    controller: &RefCell<SceneController<R, C>>,
    pacing: FramePacing,
) {
    let mut interval = tokio::time::interval(pacing.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut clock = FrameClock::new();
    let mut render_loop = RenderLoop::new();
    let mut last = tokio::time::Instant::now();

    while !pacing.limit.is_some_and(|limit| clock.frames_elapsed() >= limit) {
        let now = interval.tick().await;
        let frame = clock.advance((now - last).as_secs_f64());
        last = now;
        render_loop.tick(frame, &mut controller.borrow_mut());
    }
    debug!(frames = clock.frames_elapsed(), "frame budget spent");
}

async fn sync_links<R: Renderer, C: ChartRenderer>(
    sync: Synchronizer,
    transform: TransformConfig,
    controller: SharedController<R, C>,
) {
    let mut stages = pin!(sync.sync().into_stream());
    while let Some(stage) = stages.next().await {
        let layers = to_layers(stage.links(), &transform);
        info!(
            live = stage.is_live(),
            links = stage.links().len(),
            "applying link stage"
        );
        controller.borrow_mut().apply_layers(&layers);
    }
}

async fn load_chart<R: Renderer, C: ChartRenderer>(
    source: Arc<dyn CategorySource>,
    diagnostics: EventBus,
    controller: SharedController<R, C>,
) {
    let categories = load_categories(source.as_ref(), &diagnostics).await;
    let model = to_chart_model(&categories);
    controller.borrow_mut().apply_chart(&model);
}

#[cfg(test)]
mod tests {
    use super::*;
    use formats::{GeoLink, GeoLinkCollection, encode_links};
    use foundation::math::GeoPoint;
    use gpu::{RecordingChartRenderer, RecordingRenderer};
    use pretty_assertions::assert_eq;
    use scene::{SceneConfig, Viewport};
    use streaming::{EVENT_FETCH_FAILURE, StaticLinkSource};
    use tokio::task::LocalSet;

    use crate::config::SourceVariant;

    fn link(name: &str) -> GeoLink {
        GeoLink::new(
            name,
            GeoPoint::new(38.72, -9.14),
            GeoPoint::new(25.2, 55.27),
            "#ffffff",
        )
    }

    fn viewer(
        source: StaticLinkSource,
        categories: StaticCategorySource,
        store: Arc<dyn RecordStore>,
    ) -> Viewer<RecordingRenderer, RecordingChartRenderer> {
        let config = PipelineConfig::preset(SourceVariant::Http);
        let controller = SceneController::new(
            SceneConfig::default(),
            Viewport::new(1280, 720),
            RecordingRenderer::new(),
            RecordingChartRenderer::new(),
        );
        let sync = synchronizer(&config, Arc::new(source), store, EventBus::new());
        Viewer::new(
            controller,
            sync,
            Arc::new(categories),
            config.transform_config(),
        )
    }

    #[test]
    fn pacing_rejects_non_positive_fps() {
        assert!(FramePacing::new(0.0, None).is_err());
        assert!(FramePacing::new(f64::NAN, Some(1)).is_err());
        assert!(FramePacing::new(60.0, Some(1)).is_ok());
    }

    #[test]
    fn unset_categories_url_uses_builtin_regions() {
        let source = category_source(None, reqwest::Client::new());
        assert_eq!(source.describe(), "static categories");
    }

    #[tokio::test(start_paused = true)]
    async fn cached_then_live_bindings_and_chart() {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::with_blob(
            catalog::HTTP_LINKS_KEY,
            encode_links(&GeoLinkCollection::new(vec![link("OPO")])).unwrap(),
        ));
        let fresh = GeoLinkCollection::new(vec![link("LIS"), link("DUBAI")]);
        let viewer = viewer(
            StaticLinkSource::new(fresh.clone()),
            StaticCategorySource::new(default_categories()),
            Arc::clone(&store),
        );

        let report = LocalSet::new()
            .run_until(viewer.run(FramePacing::new(60.0, Some(20)).unwrap()))
            .await;

        assert_eq!(report.frames, 20);
        assert_eq!(report.draw_calls, 20);
        assert_eq!(report.layer_applies, 2);
        assert_eq!(report.chart_draws, 1);
        assert_eq!(report.bound_links, Some(2));

        let controller = viewer.controller();
        let controller = controller.borrow();
        let names: Vec<&str> = controller
            .renderer()
            .arcs
            .data
            .iter()
            .map(|a| a.link.name.as_str())
            .collect();
        assert_eq!(names, vec!["LIS", "DUBAI"]);
        assert_eq!(
            store.read(catalog::HTTP_LINKS_KEY).unwrap(),
            Some(encode_links(&fresh).unwrap())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn outage_without_cache_keeps_rendering() {
        let viewer = viewer(
            StaticLinkSource::failing("connection refused"),
            StaticCategorySource::failing("connection refused"),
            Arc::new(InMemoryRecordStore::new()),
        );

        let report = LocalSet::new()
            .run_until(viewer.run(FramePacing::new(60.0, Some(15)).unwrap()))
            .await;

        assert_eq!(report.draw_calls, 15);
        assert_eq!(report.layer_applies, 0);
        assert_eq!(report.chart_draws, 0);
        assert_eq!(report.bound_links, None);
        assert!(report.metrics.gauges.is_empty());
        assert_eq!(
            report
                .diagnostics
                .iter()
                .filter(|e| e.kind == EVENT_FETCH_FAILURE)
                .count(),
            2
        );
        assert!(viewer.controller().borrow().is_rotating());
    }
}
