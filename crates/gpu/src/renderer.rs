use foundation::math::{Euler, Pose, Vec3};
use layers::{ArcLayerConfig, LabelLayerConfig, Layer, LayerKind, PointLayerConfig};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera3D {
    pub pose: Pose,
    pub fov_y_rad: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Camera3D {
    pub fn perspective(pose: Pose, fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> Self {
        Self {
            pose,
            fov_y_rad,
            aspect,
            near,
            far,
        }
    }
}

impl Default for Camera3D {
    fn default() -> Self {
        Self::perspective(
            Pose::new(Vec3::new(0.0, 0.0, 300.0), Euler::default()),
            45f64.to_radians(),
            1.0,
            0.1,
            1000.0,
        )
    }
}

/// What the renderer needs from the scene for one draw.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneView {
    pub globe: Pose,
}

/// The 3D rendering capability.
///
/// Layer bindings are declarative and replace whatever was bound before for
/// that layer kind; `draw` presents one frame with the current bindings.
pub trait Renderer {
    fn bind_arcs(&mut self, layer: &ArcLayerConfig);
    fn bind_points(&mut self, layer: &PointLayerConfig);
    fn bind_labels(&mut self, layer: &LabelLayerConfig);
    fn draw(&mut self, scene: &SceneView, camera: &Camera3D);
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawRecord {
    pub scene: SceneView,
    pub camera: Camera3D,
    pub arcs: usize,
    pub points: usize,
    pub labels: usize,
}

/// Headless renderer that keeps the current bindings and counts frames.
///
/// Used by the native viewer (which has no GPU surface) and by tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub arcs: ArcLayerConfig,
    pub points: PointLayerConfig,
    pub labels: LabelLayerConfig,
    pub bind_calls: Vec<LayerKind>,
    pub draw_calls: u64,
    pub last_draw: Option<DrawRecord>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for RecordingRenderer {
    fn bind_arcs(&mut self, layer: &ArcLayerConfig) {
        self.arcs = layer.clone();
        self.bind_calls.push(layer.kind());
    }

    fn bind_points(&mut self, layer: &PointLayerConfig) {
        self.points = layer.clone();
        self.bind_calls.push(layer.kind());
    }

    fn bind_labels(&mut self, layer: &LabelLayerConfig) {
        self.labels = layer.clone();
        self.bind_calls.push(layer.kind());
    }

    fn draw(&mut self, scene: &SceneView, camera: &Camera3D) {
        self.draw_calls += 1;
        self.last_draw = Some(DrawRecord {
            scene: *scene,
            camera: *camera,
            arcs: self.arcs.data.len(),
            points: self.points.data.len(),
            labels: self.labels.data.len(),
        });
    }
}
