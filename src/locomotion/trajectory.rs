//! Foot trajectory of one leg.
//!
//! The stride endpoints are low-pass filtered every tick, so the foot never jumps when the
//! command changes. The gait phase then places the foot: stance slides it from `P0` to `P1`
//! on the ground, swing arcs it from wherever it left the ground back to `P0`.
use glam::{Quat, Vec3};

use crate::config::{LegGeometry, MotionConfig, F_TOLERANCE, LEG_CENTER};

#[derive(Debug, Clone)]
pub struct LegTrajectory {
    // body frame -> leg-local frame
    to_local: Quat,
    smooth_factor: f32,
    swing_lift: f32,
    targets: [Vec3; 2],
    p0: Vec3,
    p1: Vec3,
    position: Vec3,
    anchor: Vec3,
    stance: bool,
}

fn lerp(a: f32, b: f32, s: f32) -> f32 {
    a + (b - a) * s
}

impl LegTrajectory {
    pub fn new(geometry: &LegGeometry, motion: &MotionConfig) -> Self {
        Self {
            to_local: geometry.rotation.inverse(),
            smooth_factor: motion.smooth_factor.max(1.0),
            swing_lift: motion.swing_lift,
            targets: [LEG_CENTER; 2],
            p0: LEG_CENTER,
            p1: LEG_CENTER,
            position: LEG_CENTER,
            anchor: LEG_CENTER,
            stance: true,
        }
    }

    /// Raw endpoints for a body-frame `stride` around the centre lowered by `elevation`.
    pub fn set_targets(&mut self, stride: Vec3, elevation: f32) {
        let center = LEG_CENTER - Vec3::Z * elevation;

        if stride.length() < F_TOLERANCE {
            self.targets = [center; 2];
            return;
        }

        let half = self.to_local * stride / 2.0;
        // the foot pushes backwards: touch down ahead, lift off behind
        self.targets = [center + half, center - half];
    }

    /// Relax the smoothed endpoints one step towards the raw ones.
    pub fn step(&mut self) {
        self.p0 += (self.targets[0] - self.p0) / self.smooth_factor;
        self.p1 += (self.targets[1] - self.p1) / self.smooth_factor;
    }

    /// Foot position for `phase`, in the leg-local frame.
    pub fn evaluate(&mut self, phase: f32) -> Vec3 {
        // -0.0 is the lift-off instant: still on p1, about to swing
        let stance = phase.is_sign_positive();
        if stance != self.stance {
            self.anchor = if stance { self.p1 } else { self.position };
            self.stance = stance;
        }

        self.position = if stance {
            self.p0.lerp(self.p1, phase.min(1.0))
        } else {
            self.swing(-phase)
        };
        self.position
    }

    fn swing(&self, progress: f32) -> Vec3 {
        let s = progress.clamp(0.0, 1.0);
        let (from, to) = (self.anchor, self.p0);
        let top = from.z.max(to.z) + self.swing_lift;

        let z = if s < 0.5 {
            lerp(from.z, top, 2.0 * s)
        } else {
            lerp(top, to.z, 2.0 * (s - 0.5))
        };

        Vec3::new(lerp(from.x, to.x, s), lerp(from.y, to.y, s), z)
    }

    /// Put the foot straight at `position`, bypassing the gait.
    pub fn move_to(&mut self, position: Vec3) -> Vec3 {
        self.position = position;
        self.anchor = position;
        self.position
    }

    /// Park the foot and both endpoints on the neutral centre.
    pub fn center(&mut self) -> Vec3 {
        self.targets = [LEG_CENTER; 2];
        self.p0 = LEG_CENTER;
        self.p1 = LEG_CENTER;
        self.stance = true;
        self.move_to(LEG_CENTER)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn p0(&self) -> Vec3 {
        self.p0
    }

    pub fn p1(&self) -> Vec3 {
        self.p1
    }

    pub fn targets(&self) -> [Vec3; 2] {
        self.targets
    }

    pub fn in_stance(&self) -> bool {
        self.stance
    }
}
