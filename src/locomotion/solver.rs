//! Body command to per-leg stride mapping.
use glam::Vec3;
#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::{LegGeometry, MotionConfig, F_TOLERANCE, NUM_LEGS};
use crate::robot::leg::LegIndex;

/// Body-level command, every axis in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlInput {
    pub elevation: f32,
    pub torque: f32,
    pub forward: f32,
    pub right: f32,
}

impl ControlInput {
    pub const fn new(elevation: f32, torque: f32, forward: f32, right: f32) -> Self {
        Self {
            elevation,
            torque,
            forward,
            right,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocomotionSolver {
    offsets: [Vec3; NUM_LEGS],
    max_stride: f32,
    max_elevation: f32,
    torque_deadband: f32,
    control: ControlInput,
    body_normal: Vec3,
}

impl LocomotionSolver {
    pub fn new(legs: &[LegGeometry; NUM_LEGS], motion: &MotionConfig) -> Self {
        Self {
            offsets: legs.map(|leg| leg.offset),
            max_stride: motion.max_stride,
            max_elevation: motion.max_elevation,
            torque_deadband: motion.torque_deadband,
            control: ControlInput::default(),
            body_normal: Vec3::Z,
        }
    }

    /// Store the command. Torque inside the deadband becomes exactly zero.
    pub fn set_control(&mut self, control: &ControlInput) {
        let mut control = *control;
        if control.torque.abs() < self.torque_deadband {
            control.torque = 0.0;
        }
        self.control = control;
    }

    pub fn control(&self) -> ControlInput {
        self.control
    }

    /// Normal of the plane the feet should level the body against, `(0, 0, 1)` when flat.
    pub fn set_body_normal(&mut self, normal: Vec3) {
        self.body_normal = normal;
    }

    /// Stride vector (body frame) and body elevation for `leg`.
    pub fn evaluate(&self, leg: LegIndex) -> (Vec3, f32) {
        let c = &self.control;
        let offset = self.offsets[leg];

        let direction = Vec3::new(c.right, c.forward, 0.0) * self.max_stride;
        let tangential =
            offset.normalize_or_zero().cross(Vec3::Z) * 2.0 * c.torque * self.max_stride;
        let stride = (direction + tangential).clamp_length_max(self.max_stride);

        let base = c.elevation * self.max_elevation;
        let n = self.body_normal;
        let elevation = if n.z.abs() > F_TOLERANCE {
            base - (n.x * offset.x + n.y * offset.y) / n.z
        } else {
            base
        };

        (stride, elevation)
    }

    /// Speed demand fed to the gait scheduler.
    pub fn velocity(&self) -> f32 {
        let c = &self.control;
        c.forward.abs().max(c.right.abs()).max(c.torque.abs())
    }
}
