use compute::ChartModel;
use gpu::{Camera3D, ChartRenderer, Renderer, SceneView};
use layers::{Layer, LayerSet};
use runtime::{BOUND_LINKS, CHART_DRAWS, LAYER_APPLIES, Metrics};

use crate::controls::{InteractiveControl, TrackballControl};
use crate::state::{RenderProfile, SceneConfig, SceneState, Viewport};

/// Button caption while the globe is spinning.
pub const PAUSE_CAPTION: &str = "Pause rotation";
/// Button caption while the globe is paused.
pub const START_CAPTION: &str = "Start rotation";

/// Sole owner of [`SceneState`] and the two rendering capabilities.
///
/// Rotation is a two-state machine (Rotating, the initial state, and Paused)
/// with no terminal state. Resuming restores the configured camera, globe and
/// control state; pausing touches no pose.
pub struct SceneController<R, C> {
    config: SceneConfig,
    state: SceneState,
    renderer: R,
    chart: C,
    control: Box<dyn InteractiveControl>,
    metrics: Metrics,
}

impl<R: Renderer, C: ChartRenderer> SceneController<R, C> {
    pub fn new(config: SceneConfig, viewport: Viewport, renderer: R, chart: C) -> Self {
        let mut control = TrackballControl::new(config.controls);
        control.set_canvas_size(viewport.width as f64, viewport.height as f64);
        Self::with_control(config, viewport, renderer, chart, Box::new(control))
    }

    pub fn with_control(
        config: SceneConfig,
        viewport: Viewport,
        renderer: R,
        chart: C,
        control: Box<dyn InteractiveControl>,
    ) -> Self {
        Self {
            state: SceneState::initial(&config, viewport),
            config,
            renderer,
            chart,
            control,
            metrics: Metrics::new(),
        }
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn chart_renderer(&self) -> &C {
        &self.chart
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub(crate) fn metrics_mut(&mut self) -> &mut Metrics {
        &mut self.metrics
    }

    pub fn is_rotating(&self) -> bool {
        self.state.rotating
    }

    pub fn toggle(&mut self) {
        if self.state.rotating {
            self.state.rotating = false;
            tracing::debug!("rotation paused");
            return;
        }
        self.state.rotating = true;
        self.state.camera = self.config.initial_camera();
        self.state.globe = self.config.initial_globe();
        self.state.view_offset = Default::default();
        self.control.reset();
        tracing::debug!("rotation resumed, view reset");
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.state.rotating {
            PAUSE_CAPTION
        } else {
            START_CAPTION
        }
    }

    /// Replace all three layer bindings. Rotation state is untouched.
    pub fn apply_layers(&mut self, layers: &LayerSet) {
        self.renderer.bind_arcs(&layers.arcs);
        self.renderer.bind_points(&layers.points);
        self.renderer.bind_labels(&layers.labels);
        self.metrics.inc_counter(LAYER_APPLIES, 1);
        self.metrics.set_gauge(BOUND_LINKS, layers.arcs.len() as i64);
        tracing::debug!(
            arcs = layers.arcs.len(),
            points = layers.points.len(),
            labels = layers.labels.len(),
            "layers applied"
        );
    }

    /// Draw the chart and its legend; an empty model draws nothing.
    pub fn apply_chart(&mut self, model: &ChartModel) {
        if model.is_empty() {
            tracing::debug!("empty category set, chart skipped");
            return;
        }
        self.chart.draw_chart(&model.series);
        self.chart.render_legend(&model.legend);
        self.metrics.inc_counter(CHART_DRAWS, 1);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.state.viewport = Viewport::new(width, height);
        self.control
            .set_canvas_size(self.state.viewport.width as f64, self.state.viewport.height as f64);
        tracing::debug!(width, height, "viewport resized");
    }

    pub fn render_profile(&self) -> RenderProfile {
        self.state.viewport.profile()
    }

    /// Mutable access to the control for forwarding pointer input.
    pub fn control_mut(&mut self) -> &mut dyn InteractiveControl {
        self.control.as_mut()
    }

    /// Advance the globe spin by one tick, if rotating.
    pub(crate) fn advance_rotation(&mut self) {
        if self.state.rotating {
            self.state.globe.yaw_by(self.config.rotate_speed);
        }
    }

    pub(crate) fn update_control(&mut self, dt_s: f64) {
        self.control.update(dt_s, &mut self.state.view_offset);
        self.state.camera = self
            .state
            .view_offset
            .apply(&self.config.initial_camera(), &self.config.controls);
    }

    pub fn camera(&self) -> Camera3D {
        Camera3D::perspective(
            self.state.camera,
            self.config.fov_y_deg.to_radians(),
            self.state.viewport.aspect(),
            self.config.near,
            self.config.far,
        )
    }

    pub(crate) fn draw(&mut self) {
        let view = SceneView {
            globe: self.state.globe,
        };
        let camera = self.camera();
        self.renderer.draw(&view, &camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formats::{GeoLink, GeoLinkCollection, default_categories};
    use foundation::math::GeoPoint;
    use gpu::{RecordingChartRenderer, RecordingRenderer};
    use layers::{LayerKind, TransformConfig, to_layers};
    use pretty_assertions::assert_eq;

    type TestController = SceneController<RecordingRenderer, RecordingChartRenderer>;

    fn controller() -> TestController {
        SceneController::new(
            SceneConfig::default(),
            Viewport::new(1280, 720),
            RecordingRenderer::new(),
            RecordingChartRenderer::new(),
        )
    }

    fn links() -> GeoLinkCollection {
        GeoLinkCollection::new(vec![GeoLink::new(
            "DUBAI",
            GeoPoint::new(38.72, -9.14),
            GeoPoint::new(25.2, 55.27),
            "#ffffff",
        )])
    }

    #[test]
    fn starts_rotating_with_pause_caption() {
        let c = controller();
        assert!(c.is_rotating());
        assert_eq!(c.toggle_label(), PAUSE_CAPTION);
    }

    #[test]
    fn double_toggle_restores_rotation_and_initial_poses() {
        let mut c = controller();
        for _ in 0..30 {
            c.advance_rotation();
        }
        assert_ne!(c.state().globe, c.config().initial_globe());

        c.toggle();
        c.toggle();
        assert!(c.is_rotating());
        assert_eq!(c.state().camera, c.config().initial_camera());
        assert_eq!(c.state().globe, c.config().initial_globe());
        assert!(c.state().view_offset.is_identity());
    }

    #[test]
    fn resuming_discards_user_drag_and_zoom() {
        let mut c = controller();
        c.toggle();
        c.control_mut().on_pointer_down([640.0, 360.0]);
        c.control_mut().on_pointer_move([760.0, 300.0]);
        c.update_control(1.0 / 60.0);
        c.control_mut().on_pointer_up();
        c.control_mut().on_wheel(-400.0);
        for _ in 0..10 {
            c.update_control(1.0 / 60.0);
        }
        assert_ne!(c.state().camera, c.config().initial_camera());
        assert!(!c.state().view_offset.is_identity());

        c.toggle();
        assert!(c.is_rotating());
        assert_eq!(c.state().camera, c.config().initial_camera());
        assert_eq!(c.state().globe, c.config().initial_globe());
        assert!(c.state().view_offset.is_identity());

        // No inertia or pending zoom survives the reset.
        c.update_control(1.0 / 60.0);
        assert_eq!(c.state().camera, c.config().initial_camera());
        assert!(c.state().view_offset.is_identity());
    }

    #[test]
    fn pausing_changes_no_pose() {
        let mut c = controller();
        c.advance_rotation();
        let before = *c.state();
        c.toggle();
        assert!(!c.is_rotating());
        assert_eq!(c.toggle_label(), START_CAPTION);
        assert_eq!(c.state().globe, before.globe);
        assert_eq!(c.state().camera, before.camera);

        c.advance_rotation();
        assert_eq!(c.state().globe, before.globe);
    }

    #[test]
    fn applying_layers_twice_is_idempotent_and_keeps_rotation() {
        let mut c = controller();
        c.toggle();
        let layers = to_layers(&links(), &TransformConfig::default());
        c.apply_layers(&layers);
        c.apply_layers(&layers);

        assert!(!c.is_rotating());
        assert_eq!(c.metrics().counter(LAYER_APPLIES), 2);
        assert_eq!(c.metrics().gauge(BOUND_LINKS), Some(1));
        assert_eq!(c.renderer().arcs, layers.arcs);
        assert_eq!(c.renderer().points, layers.points);
        assert_eq!(
            c.renderer().bind_calls,
            vec![
                LayerKind::Arcs,
                LayerKind::Points,
                LayerKind::Labels,
                LayerKind::Arcs,
                LayerKind::Points,
                LayerKind::Labels,
            ]
        );
    }

    #[test]
    fn empty_chart_is_not_drawn() {
        let mut c = controller();
        c.apply_chart(&ChartModel::default());
        assert_eq!(c.chart_renderer().chart_draws, 0);

        c.apply_chart(&compute::to_chart_model(&default_categories()));
        assert_eq!(c.chart_renderer().chart_draws, 1);
        assert_eq!(c.metrics().counter(CHART_DRAWS), 1);
        assert_eq!(c.chart_renderer().legend.len(), 5);
    }

    #[test]
    fn resize_updates_aspect_and_profile() {
        let mut c = controller();
        c.resize(600, 300);
        assert_eq!(c.camera().aspect, 2.0);
        assert!(c.render_profile().mobile);
    }
}
