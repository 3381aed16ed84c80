use std::path::PathBuf;

use clap::Parser;
use gpu::{RecordingChartRenderer, RecordingRenderer};
use runtime::EventBus;
use scene::SceneController;
use tokio::task::LocalSet;
use tracing::info;

mod app;
mod config;
mod logging;

use app::{FramePacing, Viewer};
use config::{SourceVariant, ViewerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless geo-link globe viewer")]
struct Args {
    /// JSON config file (pipeline, scene, viewport)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for cached link collections; omit to cache in memory only
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Stop after this many frames; runs until killed when omitted
    #[arg(long)]
    frames: Option<u64>,

    /// Target frame rate
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Pipeline preset used when the config has no `pipeline` section
    #[arg(long, value_enum, default_value_t = SourceVariant::Http)]
    variant: SourceVariant,

    /// Start with rotation paused
    #[arg(long)]
    paused: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    let pipeline = config.pipeline_or_preset(args.variant);
    let pacing = FramePacing::new(args.fps, args.frames)?;
    let profile = config.render_profile();
    info!(
        variant = ?pipeline.variant(),
        cache_key = pipeline.cache_key(),
        mobile = profile.mobile,
        antialias = profile.antialias,
        "starting viewer"
    );

    let client = reqwest::Client::new();
    let source = app::link_source(&pipeline.source, client.clone());
    let categories = app::category_source(pipeline.categories_url.as_deref(), client);
    let store = app::record_store(args.cache_dir.as_deref());
    let sync = app::synchronizer(&pipeline, source, store, EventBus::new());

    let mut controller = SceneController::new(
        config.scene,
        config.viewport,
        RecordingRenderer::new(),
        RecordingChartRenderer::new(),
    );
    if args.paused {
        controller.toggle();
    }
    info!(button = controller.toggle_label(), "scene ready");

    let viewer = Viewer::new(controller, sync, categories, pipeline.transform_config());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = LocalSet::new().block_on(&runtime, viewer.run(pacing));

    info!(
        frames = report.frames,
        draw_calls = report.draw_calls,
        layer_applies = report.layer_applies,
        chart_draws = report.chart_draws,
        bound_links = report.bound_links,
        diagnostics = report.diagnostics.len(),
        "viewer stopped"
    );
    info!(button = viewer.controller().borrow().toggle_label(), "final scene state");
    for (name, value) in report.metrics.counters.iter() {
        tracing::debug!(metric = %name, value, "counter");
    }
    for (name, value) in report.metrics.gauges.iter() {
        tracing::debug!(metric = %name, value, "gauge");
    }
    for event in &report.diagnostics {
        info!(seq = event.seq, kind = event.kind, "{}", event.message);
    }
    Ok(())
}
