//! Trackball-style camera control with drag inertia and smoothed zoom.
//!
//! The control never touches the camera directly: it accumulates a
//! [`ViewOffset`] which the scene applies to the configured initial camera.
//! Resetting the control therefore means zeroing that offset and any motion
//! still in flight.

use crate::state::{ControlConfig, ViewOffset};

/// Angular speed (rad/s) below which inertia stops.
const ANGULAR_VELOCITY_THRESHOLD: f64 = 0.001;

/// Zoom smoothing rate (higher = faster response).
const ZOOM_SMOOTHING: f64 = 8.0;

/// Largest frame delta the control integrates in one step.
const MAX_STEP_S: f64 = 0.1;

/// Pointer/wheel driven view control, stepped once per frame.
///
/// Input handlers only record intent; nothing moves until `update`.
pub trait InteractiveControl {
    fn set_canvas_size(&mut self, width: f64, height: f64);
    fn on_pointer_down(&mut self, pos_px: [f64; 2]);
    fn on_pointer_move(&mut self, pos_px: [f64; 2]);
    fn on_pointer_up(&mut self);
    /// Positive `delta` zooms out, negative zooms in.
    fn on_wheel(&mut self, delta: f64);

    /// Integrate pending input and inertia into `offset`.
    fn update(&mut self, dt_s: f64, offset: &mut ViewOffset);

    /// Drop any motion in flight and return to the identity view.
    fn reset(&mut self);
}

#[derive(Debug, Clone)]
pub struct TrackballControl {
    config: ControlConfig,
    canvas: [f64; 2],
    dragging: bool,
    last_pos_px: [f64; 2],
    /// Drag delta not yet applied, `[azimuth, elevation]` in radians.
    pending: [f64; 2],
    /// `[azimuth, elevation]` in rad/s.
    velocity: [f64; 2],
    inertia_active: bool,
    zoom: f64,
    target_zoom: f64,
}

impl TrackballControl {
    pub fn new(config: ControlConfig) -> Self {
        Self {
            config,
            canvas: [1280.0, 720.0],
            dragging: false,
            last_pos_px: [0.0, 0.0],
            pending: [0.0, 0.0],
            velocity: [0.0, 0.0],
            inertia_active: false,
            zoom: 1.0,
            target_zoom: 1.0,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_inertia_active(&self) -> bool {
        self.inertia_active
    }
}

impl InteractiveControl for TrackballControl {
    fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas = [width.max(1.0), height.max(1.0)];
    }

    fn on_pointer_down(&mut self, pos_px: [f64; 2]) {
        self.inertia_active = false;
        self.velocity = [0.0, 0.0];
        self.dragging = true;
        self.last_pos_px = pos_px;
    }

    fn on_pointer_move(&mut self, pos_px: [f64; 2]) {
        if !self.dragging {
            return;
        }
        let min_dim = self.canvas[0].min(self.canvas[1]);
        let scale = self.config.rotate_speed / min_dim;
        // Dragging right spins the view left around the globe.
        self.pending[0] -= (pos_px[0] - self.last_pos_px[0]) * scale;
        self.pending[1] += (pos_px[1] - self.last_pos_px[1]) * scale;
        self.last_pos_px = pos_px;
    }

    fn on_pointer_up(&mut self) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        self.inertia_active = speed(self.velocity) > ANGULAR_VELOCITY_THRESHOLD;
    }

    fn on_wheel(&mut self, delta: f64) {
        self.inertia_active = false;
        let factor = (delta * 0.002 * self.config.zoom_speed).exp();
        self.target_zoom = (self.target_zoom * factor).clamp(f64::MIN_POSITIVE, f64::MAX);
    }

    fn update(&mut self, dt_s: f64, offset: &mut ViewOffset) {
        let dt = dt_s.clamp(0.0, MAX_STEP_S);

        offset.azimuth += self.pending[0];
        offset.elevation += self.pending[1];
        if self.dragging && dt > 0.0 {
            self.velocity = [self.pending[0] / dt, self.pending[1] / dt];
        }
        self.pending = [0.0, 0.0];

        if !self.dragging && self.inertia_active {
            offset.azimuth += self.velocity[0] * dt;
            offset.elevation += self.velocity[1] * dt;

            let decay = (-self.config.damping * dt).exp();
            self.velocity = [self.velocity[0] * decay, self.velocity[1] * decay];
            if speed(self.velocity) < ANGULAR_VELOCITY_THRESHOLD {
                self.inertia_active = false;
                self.velocity = [0.0, 0.0];
            }
        }

        let half_pi = std::f64::consts::FRAC_PI_2;
        offset.elevation = offset.elevation.clamp(-half_pi, half_pi);

        let alpha = 1.0 - (-ZOOM_SMOOTHING * dt).exp();
        self.zoom += (self.target_zoom - self.zoom) * alpha;
        offset.zoom = self.zoom;
    }

    fn reset(&mut self) {
        *self = Self::new(self.config).with_canvas(self.canvas);
    }
}

impl TrackballControl {
    fn with_canvas(mut self, canvas: [f64; 2]) -> Self {
        self.canvas = canvas;
        self
    }
}

fn speed(v: [f64; 2]) -> f64 {
    (v[0] * v[0] + v[1] * v[1]).sqrt()
}
