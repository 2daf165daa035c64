// kinemorph_core/src/geometry/camera.rs

use crate::geometry::apply_matrix;
use crate::types::{Mat4, Vec3};

/// The fixed viewing setup that landmark positions are re-projected through.
///
/// Landmarks arrive in normalized image coordinates; placing them in the
/// avatar's world needs the inverse projection and world matrix of the
/// camera that renders the avatar, plus where the subject stands.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    /// Inverse of the perspective projection matrix.
    pub projection_inverse: Mat4,
    /// Camera-to-world transform.
    pub camera_world: Mat4,
    /// Distance of the near clip plane.
    pub near: f64,
    /// Camera position in world space.
    pub position: Vec3,
    /// Distance from the camera the subject is pushed out to.
    pub subject_distance: f64,
    /// Constant world offset added after the push.
    pub subject_offset: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        #[rustfmt::skip]
        let projection_inverse = Mat4::new(
            0.5522847498307933, 0.0,                 0.0,                  0.0,
            0.0,                0.41421356237309503, 0.0,                  0.0,
            0.0,                0.0,                 0.0,                 -1.0,
            0.0,                0.0,                -0.49949999999999994,  0.5005,
        );
        #[rustfmt::skip]
        let camera_world = Mat4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 1.0,
            0.0, 0.0, 1.0, 1.75,
            0.0, 0.0, 0.0, 1.0,
        );
        Self {
            projection_inverse,
            camera_world,
            near: 1.0,
            position: Vec3::new(0.0, 1.0, 1.75),
            subject_distance: 1.5,
            subject_offset: Vec3::new(1.0, 0.0, -1.5),
        }
    }
}

impl CameraConfig {
    /// Maps a clip-space point into world space.
    pub fn unproject(&self, ndc: &Vec3) -> Vec3 {
        let view = apply_matrix(&self.projection_inverse, ndc);
        apply_matrix(&self.camera_world, &view)
    }

    /// Width of the near plane in world units.
    pub fn screen_width(&self) -> f64 {
        let right = self.unproject(&Vec3::new(1.0, -1.0, -1.0));
        let left = self.unproject(&Vec3::new(-1.0, 1.0, -1.0));
        (right.x - left.x).abs()
    }

    /// Places one landmark in world space.
    ///
    /// `x`/`y` are image coordinates in `[0, 1]` with `y` pointing down; `z`
    /// is the estimator's relative depth, scaled to world units by the screen
    /// width. A zero (missing) landmark stays zero.
    pub fn reproject_landmark(&self, landmark: &Vec3) -> Vec3 {
        self.reproject_with_width(landmark, self.screen_width())
    }

    /// [`reproject_landmark`](Self::reproject_landmark) over a whole frame.
    pub fn reproject_frame(&self, points: &[Vec3]) -> Vec<Vec3> {
        let width = self.screen_width();
        points
            .iter()
            .map(|landmark| self.reproject_with_width(landmark, width))
            .collect()
    }

    fn reproject_with_width(&self, landmark: &Vec3, width: f64) -> Vec3 {
        if *landmark == Vec3::zeros() {
            return Vec3::zeros();
        }
        let ndc = Vec3::new((landmark.x - 0.5) * 2.0, -(landmark.y - 0.5) * 2.0, 0.0);
        let mut p = self.unproject(&ndc);
        p.z = -landmark.z * width - self.near + self.position.z;

        let scale = self.subject_distance / self.near;
        self.position + (p - self.position) * scale + self.subject_offset
    }
}
