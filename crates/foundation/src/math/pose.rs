use super::Vec3;

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}

/// Euler rotation in radians, applied in XYZ order.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Euler {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Euler {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_degrees(x: f64, y: f64, z: f64) -> Self {
        Self::new(deg_to_rad(x), deg_to_rad(y), deg_to_rad(z))
    }
}

/// Position + rotation of a scene object (camera or globe).
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Euler,
}

impl Pose {
    pub const fn new(position: Vec3, rotation: Euler) -> Self {
        Self { position, rotation }
    }

    pub fn identity() -> Self {
        Self::default()
    }

    /// Rotate around the vertical axis by `delta_rad`.
    pub fn yaw_by(&mut self, delta_rad: f64) {
        self.rotation.y += delta_rad;
    }
}
