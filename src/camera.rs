//! Camera and projection math.

use glam::{Mat3, Mat4, Vec3};

/// A look-at camera for 3D scenes.
///
/// Holds only the geometric state; the orbit controller decides where the
/// eye goes.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// Eye position in world space.
    pub eye: Vec3,
    /// The point the camera looks toward.
    pub target: Vec3,
    /// World up vector.
    pub up: Vec3,
}

impl Camera {
    /// Standard right-handed look-at view matrix from eye toward target.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
}

/// Perspective projection tied to the window size.
///
/// Field of view and clip planes are fixed for the session; the aspect ratio
/// and matrix are recomputed on every resize event.
#[derive(Clone, Copy, Debug)]
pub struct Projection {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
    aspect: f32,
    matrix: Mat4,
}

impl Projection {
    /// Creates a projection for the given window size.
    pub fn new(fov_y: f32, near: f32, far: f32, width: u32, height: u32) -> Self {
        let mut projection = Self {
            fov_y,
            near,
            far,
            aspect: 1.0,
            matrix: Mat4::IDENTITY,
        };
        projection.resize(width, height);
        projection
    }

    /// Recomputes the aspect ratio and projection matrix for a new size.
    ///
    /// A zero height is treated as 1 so the aspect ratio never divides by
    /// zero (a window can be squashed to zero height but not zero width).
    pub fn resize(&mut self, width: u32, height: u32) {
        let height = height.max(1);
        self.aspect = width as f32 / height as f32;
        self.matrix = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
    }

    /// Current aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Current projection matrix.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }
}

/// Normal matrix for the given view matrix.
///
/// The inverse transpose of the view's upper 3x3 block, padded back to a
/// 4x4 for uniform upload.
pub fn normal_matrix(view: Mat4) -> Mat4 {
    Mat4::from_mat3(Mat3::from_mat4(view).inverse().transpose())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_matrix_moves_eye_to_origin() {
        let camera = Camera {
            eye: Vec3::new(3.0, -4.0, 12.0),
            target: Vec3::ZERO,
            up: Vec3::Z,
        };
        let view = camera.view_matrix();

        let eye_in_view = view.transform_point3(camera.eye);
        assert!(eye_in_view.length() < 1e-4);
    }

    #[test]
    fn zero_height_resize_uses_height_one() {
        let mut projection = Projection::new(0.7, 1.0, 800.0, 512, 512);
        projection.resize(512, 0);

        assert_eq!(projection.aspect(), 512.0);
        assert!(!projection.matrix().is_nan());
    }

    #[test]
    fn resize_recomputes_aspect() {
        let mut projection = Projection::new(0.7, 1.0, 800.0, 512, 512);
        assert_eq!(projection.aspect(), 1.0);

        projection.resize(1024, 512);
        assert_eq!(projection.aspect(), 2.0);
    }

    #[test]
    fn normal_matrix_of_rotation_is_the_rotation() {
        // For a pure rotation the inverse transpose is the matrix itself.
        let rotation = Mat4::from_rotation_y(0.7);
        let normal = normal_matrix(rotation);

        let expected = Mat4::from_mat3(Mat3::from_mat4(rotation));
        assert!(normal.abs_diff_eq(expected, 1e-5));
    }
}
