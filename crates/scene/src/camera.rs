use crate::config::CameraConfig;
use glam::{Mat4, Vec3};
use std::f32::consts::FRAC_PI_2;

/// Camera orbiting the origin on a sphere of fixed radius.
///
/// Yaw turns around +Y, pitch tilts toward the poles. Pitch is kept
/// `pitch_margin` away from ±π/2 so the look-at up vector never degenerates.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub pitch_margin: f32,
    view: Mat4,
    projection: Mat4,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl OrbitCamera {
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut cam = Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: config.distance,
            fov_y: config.fov_y_degrees.to_radians(),
            aspect: 4.0 / 3.0,
            near: config.near,
            far: config.far,
            pitch_margin: config.pitch_margin,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        cam.projection = cam.projection_matrix();
        cam.update_view();
        cam
    }

    /// Largest pitch magnitude the camera may reach.
    pub fn pitch_limit(&self) -> f32 {
        FRAC_PI_2 - self.pitch_margin
    }

    /// Add angle deltas, then clamp pitch away from the poles.
    pub fn orbit(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw += d_yaw;
        self.pitch += d_pitch;
        self.clamp_pitch();
    }

    pub fn clamp_pitch(&mut self) {
        let limit = self.pitch_limit();
        self.pitch = self.pitch.clamp(-limit, limit);
    }

    /// Camera position from spherical coordinates around the origin.
    pub fn position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(
            self.distance * sin_yaw * cos_pitch,
            self.distance * sin_pitch,
            self.distance * cos_yaw * cos_pitch,
        )
    }

    /// Rebuild the view matrix from the current angles, looking at the origin.
    pub fn update_view(&mut self) -> Mat4 {
        self.view = Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y);
        self.view
    }

    /// Recompute the projection for a new framebuffer size. A zero height is
    /// treated as one pixel.
    pub fn resize(&mut self, width: u32, height: u32) -> Mat4 {
        self.aspect = width as f32 / height.max(1) as f32;
        self.projection = self.projection_matrix();
        self.projection
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}
