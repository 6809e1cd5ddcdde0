use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{MorphError, Result};

/// Orbit constants. The defaults give a gentle parallax around a cloud
/// centered on the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Yaw at full horizontal pointer deflection, radians.
    pub max_yaw: f32,
    /// Pitch at full vertical pointer deflection, radians.
    pub max_pitch: f32,
    /// Per-tick approach factor toward the target angles.
    pub smoothing: f32,
    /// Orbit radius.
    pub radius: f32,
    /// Vertical amplitude relative to the radius.
    pub vertical_scale: f32,
    /// Perspective parameters forwarded to the host.
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            max_yaw: 0.25,
            max_pitch: 0.15,
            smoothing: 0.08,
            radius: 3.0,
            vertical_scale: 0.2,
            fov_deg: 70.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

impl OrbitConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(MorphError::InvalidConfig(format!(
                "camera smoothing must be in (0, 1], got {}",
                self.smoothing
            )));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(MorphError::InvalidConfig(format!(
                "camera radius must be > 0, got {}",
                self.radius
            )));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(MorphError::InvalidConfig(format!(
                "camera clip range [{}, {}] is invalid",
                self.near, self.far
            )));
        }
        Ok(())
    }
}

/// GPU-side uniform data for the camera.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_projection: [[f32; 4]; 4],
}

/// Pointer-driven orbit around the origin. Independent of particle state.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    config: OrbitConfig,
    target: Vec2,
    /// Current (yaw, pitch).
    current: Vec2,
}

impl OrbitCamera {
    pub fn new(config: OrbitConfig) -> Self {
        Self {
            config,
            target: Vec2::ZERO,
            current: Vec2::ZERO,
        }
    }

    /// Pointer position in normalized device coordinates, each axis in [-1, 1].
    pub fn set_pointer(&mut self, ndc: Vec2) {
        let ndc = ndc.clamp(Vec2::NEG_ONE, Vec2::ONE);
        self.target = Vec2::new(ndc.x * self.config.max_yaw, ndc.y * self.config.max_pitch);
    }

    /// Advance one frame toward the target angles.
    pub fn tick(&mut self) {
        self.current += (self.target - self.current) * self.config.smoothing;
    }

    pub fn yaw(&self) -> f32 {
        self.current.x
    }

    pub fn pitch(&self) -> f32 {
        self.current.y
    }

    pub fn target_angles(&self) -> Vec2 {
        self.target
    }

    /// Eye position on the orbit sphere.
    pub fn eye(&self) -> Vec3 {
        let r = self.config.radius;
        Vec3::new(
            self.current.x.sin() * r,
            self.current.y.sin() * r * self.config.vertical_scale,
            self.current.x.cos() * r,
        )
    }

    /// Right-handed view matrix looking at the origin.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.config.fov_deg.to_radians(),
            aspect,
            self.config.near,
            self.config.far,
        )
    }

    pub fn uniform(&self, aspect: f32) -> CameraUniform {
        CameraUniform {
            view_projection: (self.projection_matrix(aspect) * self.view_matrix()).to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rests_on_the_z_axis() {
        let cam = OrbitCamera::new(OrbitConfig::default());
        assert!((cam.eye() - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn converges_toward_pointer_target() {
        let mut cam = OrbitCamera::new(OrbitConfig::default());
        cam.set_pointer(Vec2::new(1.0, -1.0));
        cam.tick();
        assert!(cam.yaw() > 0.0 && cam.yaw() < 0.25);
        let mut prev = (cam.target_angles() - Vec2::new(cam.yaw(), cam.pitch())).length();
        for _ in 0..200 {
            cam.tick();
            let err = (cam.target_angles() - Vec2::new(cam.yaw(), cam.pitch())).length();
            assert!(err <= prev);
            prev = err;
        }
        assert!((cam.yaw() - 0.25).abs() < 1e-4);
        assert!((cam.pitch() + 0.15).abs() < 1e-4);
    }

    #[test]
    fn pointer_is_clamped_to_ndc() {
        let mut cam = OrbitCamera::new(OrbitConfig::default());
        cam.set_pointer(Vec2::new(5.0, 0.0));
        assert_eq!(cam.target_angles().x, 0.25);
    }

    #[test]
    fn eye_uses_radius_and_vertical_scale() {
        let mut cam = OrbitCamera::new(OrbitConfig { smoothing: 1.0, ..Default::default() });
        cam.set_pointer(Vec2::new(0.0, 1.0));
        cam.tick();
        let eye = cam.eye();
        assert!((eye.y - 0.15f32.sin() * 3.0 * 0.2).abs() < 1e-6);
        assert!((eye.z - 3.0).abs() < 1e-6);
    }

    #[test]
    fn view_looks_at_origin() {
        let mut cam = OrbitCamera::new(OrbitConfig { smoothing: 1.0, ..Default::default() });
        cam.set_pointer(Vec2::new(0.7, 0.3));
        cam.tick();
        let origin_in_view = cam.view_matrix().transform_point3(Vec3::ZERO);
        // Origin sits straight ahead on the -Z view axis.
        assert!(origin_in_view.x.abs() < 1e-5 && origin_in_view.y.abs() < 1e-5);
        assert!(origin_in_view.z < 0.0);
    }

    #[test]
    fn validate_rejects_bad_constants() {
        assert!(OrbitConfig { smoothing: 0.0, ..Default::default() }.validate().is_err());
        assert!(OrbitConfig { radius: -1.0, ..Default::default() }.validate().is_err());
        assert!(OrbitConfig::default().validate().is_ok());
    }
}
