use glam::Vec3;
use winit::keyboard::KeyCode;

use crate::camera::Camera;

/// A discrete orbit adjustment: how much one key press moves each angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitDelta {
    /// Change to the polar angle in radians.
    pub d_theta: f32,
    /// Change to the azimuthal angle in radians.
    pub d_phi: f32,
}

/// Angle step applied per key press, in radians.
pub const ORBIT_STEP: f32 = 0.1;

/// The directional key bindings.
///
/// Each entry adjusts exactly one angle by a fixed step. The table is data,
/// so rebinding or extending the controls is an edit here, not new code in
/// the event handler.
pub const KEY_BINDINGS: &[(KeyCode, OrbitDelta)] = &[
    (
        KeyCode::KeyW,
        OrbitDelta {
            d_theta: ORBIT_STEP,
            d_phi: 0.0,
        },
    ),
    (
        KeyCode::KeyS,
        OrbitDelta {
            d_theta: -ORBIT_STEP,
            d_phi: 0.0,
        },
    ),
    (
        KeyCode::KeyD,
        OrbitDelta {
            d_theta: 0.0,
            d_phi: ORBIT_STEP,
        },
    ),
    (
        KeyCode::KeyA,
        OrbitDelta {
            d_theta: 0.0,
            d_phi: -ORBIT_STEP,
        },
    ),
];

/// A camera controller that orbits a fixed target point.
///
/// The eye position is parameterized by two angles and a fixed radius about
/// the world origin; it is always recomputed from the angles, never stored.
/// Angles are unbounded: there is no wraparound and no clamping, so theta
/// may pass through the poles. At a pole the view direction and up vector
/// become momentarily collinear, which is accepted behavior.
#[derive(Clone, Copy, Debug)]
pub struct OrbitCamera {
    /// Point the camera looks toward.
    pub target: Vec3,
    /// Distance of the eye from the world origin.
    pub radius: f32,
    /// Polar angle in radians, measured from the +Z axis.
    pub theta: f32,
    /// Azimuthal angle in radians, measured in the XY plane.
    pub phi: f32,
}

impl OrbitCamera {
    /// Creates an orbit camera looking at `target` from the given radius and
    /// starting angles.
    pub fn new(target: Vec3, radius: f32, theta: f32, phi: f32) -> Self {
        Self {
            target,
            radius,
            theta,
            phi,
        }
    }

    /// Applies one discrete orbit adjustment.
    pub fn apply(&mut self, delta: OrbitDelta) {
        self.theta += delta.d_theta;
        self.phi += delta.d_phi;
    }

    /// Eye position from the spherical-to-Cartesian closed form.
    ///
    /// The polar axis is +Z, matching the view matrix's world up.
    pub fn eye(&self) -> Vec3 {
        Vec3::new(
            self.radius * self.theta.sin() * self.phi.cos(),
            self.radius * self.theta.sin() * self.phi.sin(),
            self.radius * self.theta.cos(),
        )
    }

    /// The current camera state.
    pub fn camera(&self) -> Camera {
        Camera {
            eye: self.eye(),
            target: self.target,
            up: Vec3::Z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_distance_equals_radius() {
        for &(theta, phi, radius) in &[
            (1.5f32, 1.5f32, 500.0f32),
            (0.0, 0.0, 1.0),
            (3.2, -7.9, 42.0),
            (-0.4, 12.0, 0.5),
        ] {
            let orbit = OrbitCamera::new(Vec3::ZERO, radius, theta, phi);
            assert!(
                (orbit.eye().length() - radius).abs() < radius * 1e-5,
                "theta={theta} phi={phi} radius={radius}"
            );
        }
    }

    #[test]
    fn initial_eye_matches_closed_form() {
        let orbit = OrbitCamera::new(Vec3::ZERO, 500.0, 1.5, 1.5);
        let eye = orbit.eye();

        assert!((eye.x - 500.0 * 1.5f32.sin() * 1.5f32.cos()).abs() < 1e-3);
        assert!((eye.y - 500.0 * 1.5f32.sin() * 1.5f32.sin()).abs() < 1e-3);
        assert!((eye.z - 500.0 * 1.5f32.cos()).abs() < 1e-3);
    }

    #[test]
    fn each_binding_changes_exactly_one_angle() {
        for &(key, delta) in KEY_BINDINGS {
            let mut orbit = OrbitCamera::new(Vec3::ZERO, 500.0, 1.5, 1.5);
            orbit.apply(delta);

            let moved_theta = orbit.theta != 1.5;
            let moved_phi = orbit.phi != 1.5;
            assert!(
                moved_theta != moved_phi,
                "binding for {key:?} must move exactly one angle"
            );

            let step = delta.d_theta + delta.d_phi;
            assert!((step.abs() - ORBIT_STEP).abs() < 1e-6);
        }
    }

    #[test]
    fn w_press_advances_theta_and_recomputes_eye() {
        let mut orbit = OrbitCamera::new(Vec3::ZERO, 500.0, 1.5, 1.5);
        orbit.apply(OrbitDelta {
            d_theta: ORBIT_STEP,
            d_phi: 0.0,
        });

        assert!((orbit.theta - 1.6).abs() < 1e-6);
        assert_eq!(orbit.phi, 1.5);

        let eye = orbit.eye();
        assert!((eye.x - 500.0 * 1.6f32.sin() * 1.5f32.cos()).abs() < 1e-3);
        assert!((eye.y - 500.0 * 1.6f32.sin() * 1.5f32.sin()).abs() < 1e-3);
        assert!((eye.z - 500.0 * 1.6f32.cos()).abs() < 1e-3);
    }

    #[test]
    fn angles_are_not_clamped_at_the_poles() {
        let mut orbit = OrbitCamera::new(Vec3::ZERO, 10.0, 0.05, 0.0);
        orbit.apply(OrbitDelta {
            d_theta: -ORBIT_STEP,
            d_phi: 0.0,
        });

        assert!(orbit.theta < 0.0);
        assert!(!orbit.eye().is_nan());
    }
}
