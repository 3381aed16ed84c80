use foundation::math::{Euler, Pose, Vec3};
use serde::{Deserialize, Serialize};

/// Viewport width below which the scene renders with the mobile profile.
pub const MOBILE_BREAKPOINT_PX: u32 = 768;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Closest the camera may get to the globe center (globe radius is 100).
    pub min_distance: f64,
    pub max_distance: f64,
    pub rotate_speed: f64,
    pub zoom_speed: f64,
    /// Exponential decay rate of drag inertia, per second.
    pub damping: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            min_distance: 101.0,
            max_distance: 1000.0,
            rotate_speed: 5.0,
            zoom_speed: 0.8,
            damping: 4.0,
        }
    }
}

/// Fixed startup values for the scene. Reset-on-resume restores these.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera_position: [f64; 3],
    /// Camera rotation in degrees (XYZ).
    pub camera_rotation_deg: [f64; 3],
    /// Globe rotation in degrees (XYZ).
    pub globe_rotation_deg: [f64; 3],
    /// Yaw added to the globe each frame while rotating (radians, signed).
    pub rotate_speed: f64,
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
    pub controls: ControlConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera_position: [-50.0, 200.0, 350.0],
            camera_rotation_deg: [20.0, 0.0, 0.0],
            globe_rotation_deg: [-5.667, -20.0, 0.0],
            rotate_speed: -0.005,
            fov_y_deg: 45.0,
            near: 0.1,
            far: 1000.0,
            controls: ControlConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn initial_camera(&self) -> Pose {
        let [x, y, z] = self.camera_position;
        let [rx, ry, rz] = self.camera_rotation_deg;
        Pose::new(Vec3::new(x, y, z), Euler::from_degrees(rx, ry, rz))
    }

    pub fn initial_globe(&self) -> Pose {
        let [rx, ry, rz] = self.globe_rotation_deg;
        Pose::new(Vec3::ZERO, Euler::from_degrees(rx, ry, rz))
    }
}

/// Orbit accumulated by the interactive control, relative to the initial camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewOffset {
    /// Radians around the vertical axis.
    pub azimuth: f64,
    /// Radians towards the poles; positive lifts the camera.
    pub elevation: f64,
    /// Multiplier on the initial camera distance.
    pub zoom: f64,
}

impl Default for ViewOffset {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewOffset {
    pub const IDENTITY: Self = Self {
        azimuth: 0.0,
        elevation: 0.0,
        zoom: 1.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Camera pose after orbiting `base` around the globe center.
    pub fn apply(&self, base: &Pose, controls: &ControlConfig) -> Pose {
        if self.is_identity() {
            return *base;
        }
        let p = base.position;
        let radius = p.length();
        if radius == 0.0 {
            return *base;
        }
        let azimuth = p.x.atan2(p.z) + self.azimuth;
        let polar = ((p.y / radius).clamp(-1.0, 1.0).acos() - self.elevation)
            .clamp(POLAR_EPSILON, std::f64::consts::PI - POLAR_EPSILON);
        let distance = (radius * self.zoom).clamp(controls.min_distance, controls.max_distance);

        let position = Vec3::new(
            distance * polar.sin() * azimuth.sin(),
            distance * polar.cos(),
            distance * polar.sin() * azimuth.cos(),
        );
        let rotation = Euler::new(
            base.rotation.x + self.elevation,
            base.rotation.y + self.azimuth,
            base.rotation.z,
        );
        Pose::new(position, rotation)
    }
}

const POLAR_EPSILON: f64 = 1e-3;

/// Everything the render loop reads each frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneState {
    pub rotating: bool,
    pub camera: Pose,
    pub globe: Pose,
    pub view_offset: ViewOffset,
    pub viewport: Viewport,
}

impl SceneState {
    pub fn initial(config: &SceneConfig, viewport: Viewport) -> Self {
        Self {
            rotating: true,
            camera: config.initial_camera(),
            globe: config.initial_globe(),
            view_offset: ViewOffset::IDENTITY,
            viewport,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ViewportSize")]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Unchecked wire form; converted through [`Viewport::new`].
#[derive(Deserialize)]
struct ViewportSize {
    width: u32,
    height: u32,
}

impl From<ViewportSize> for Viewport {
    fn from(size: ViewportSize) -> Self {
        Viewport::new(size.width, size.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn profile(&self) -> RenderProfile {
        RenderProfile::for_width(self.width)
    }
}

/// Quality settings chosen from the viewport size.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderProfile {
    pub mobile: bool,
    pub antialias: bool,
    pub max_pixel_ratio: u32,
}

impl RenderProfile {
    pub fn for_width(width: u32) -> Self {
        let mobile = width < MOBILE_BREAKPOINT_PX;
        Self {
            mobile,
            antialias: !mobile,
            max_pixel_ratio: if mobile { 1 } else { 2 },
        }
    }

    pub fn pixel_ratio(&self, device_pixel_ratio: f64) -> f64 {
        device_pixel_ratio.min(self.max_pixel_ratio as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_poses_come_from_degrees() {
        let config = SceneConfig::default();
        let camera = config.initial_camera();
        assert_eq!(camera.position, Vec3::new(-50.0, 200.0, 350.0));
        assert!((camera.rotation.x - 20f64.to_radians()).abs() < 1e-12);

        let globe = config.initial_globe();
        assert!((globe.rotation.y - (-20f64).to_radians()).abs() < 1e-12);
    }

    #[test]
    fn scene_starts_rotating() {
        let state = SceneState::initial(&SceneConfig::default(), Viewport::new(1280, 720));
        assert!(state.rotating);
    }

    #[test]
    fn profile_switches_at_breakpoint() {
        let phone = RenderProfile::for_width(767);
        assert!(phone.mobile && !phone.antialias);
        assert_eq!(phone.pixel_ratio(3.0), 1.0);

        let desktop = RenderProfile::for_width(768);
        assert!(!desktop.mobile && desktop.antialias);
        assert_eq!(desktop.pixel_ratio(3.0), 2.0);
        assert_eq!(desktop.pixel_ratio(1.5), 1.5);
    }

    #[test]
    fn identity_offset_keeps_the_base_pose() {
        let config = SceneConfig::default();
        let base = config.initial_camera();
        assert_eq!(ViewOffset::IDENTITY.apply(&base, &config.controls), base);
    }

    #[test]
    fn orbit_preserves_distance_and_zoom_respects_min_distance() {
        let config = SceneConfig::default();
        let base = config.initial_camera();
        let radius = base.position.length();

        let orbit = ViewOffset {
            azimuth: 0.3,
            ..ViewOffset::IDENTITY
        };
        let moved = orbit.apply(&base, &config.controls);
        assert!((moved.position.length() - radius).abs() < 1e-9);
        assert!((moved.position.y - base.position.y).abs() < 1e-9);
        assert_ne!(moved.position, base.position);

        let zoomed_in = ViewOffset {
            zoom: 0.01,
            ..ViewOffset::IDENTITY
        };
        let close = zoomed_in.apply(&base, &config.controls);
        assert!((close.position.length() - config.controls.min_distance).abs() < 1e-9);
    }

    #[test]
    fn viewport_never_divides_by_zero() {
        assert_eq!(Viewport::new(0, 0).aspect(), 1.0);
    }

    #[test]
    fn deserialized_viewport_is_clamped() {
        let viewport: Viewport = serde_json::from_str(r#"{"width": 0, "height": 0}"#).unwrap();
        assert_eq!(viewport, Viewport::new(1, 1));
        assert_eq!(viewport.aspect(), 1.0);
    }
}
