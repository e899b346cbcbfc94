//! Closed-form inverse and forward kinematics for one 3-DOF leg.
//!
//! Positions are in the leg-local frame: origin on the coxa axis, x pointing out of the body,
//! z up. The femur angle is measured from the horizontal, the tibia angle is the knee
//! deflection from the femur direction (0 = straight leg).
//!
//! Trigonometry goes through `libm` so host builds and the firmware solve identically.
use glam::Vec3;
use libm::{acosf, atan2f, cosf, fabsf, roundf, sinf, sqrtf};

use crate::config::{F_TOLERANCE, LENGTH_COXA, LENGTH_FEMUR, LENGTH_TIBIA};
use crate::error::KinematicsError;
use crate::robot::joint::{JointAngles, JointTrims};

const L2_SQ: f32 = LENGTH_FEMUR * LENGTH_FEMUR;
const L3_SQ: f32 = LENGTH_TIBIA * LENGTH_TIBIA;
// float noise below this (in degrees) never pushes a whole-degree value down a step
const DEGREE_SNAP: f32 = 1e-3;

/// Raw joint angles in radians, before inversion and trims.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointRadians {
    pub coxa: f32,
    pub femur: f32,
    pub tibia: f32,
}

/// Clamp a law-of-cosines term into the `acos` domain, reporting whether it had to.
fn unit_clamp(value: f32) -> (f32, bool) {
    let in_range = value.is_finite() && fabsf(value) <= 1.0 + F_TOLERANCE;
    let clamped = if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        1.0
    };
    (clamped, in_range)
}

/// Solve `target`. `Err` carries the clamped pose when the target is out of reach.
pub fn inverse(target: Vec3) -> Result<JointRadians, JointRadians> {
    let (x, y, z) = (target.x, target.y, target.z);

    let coxa = atan2f(y, x);
    let reach = sqrtf(x * x + y * y) - LENGTH_COXA;
    let l4_sq = reach * reach + z * z;
    let l4 = sqrtf(l4_sq);

    // foot on the femur pivot: no triangle to solve
    let femur_cos = if l4 > F_TOLERANCE {
        (L2_SQ + l4_sq - L3_SQ) / (2.0 * LENGTH_FEMUR * l4)
    } else {
        f32::NAN
    };
    let tibia_cos = (l4_sq - L2_SQ - L3_SQ) / (2.0 * LENGTH_FEMUR * LENGTH_TIBIA);

    let (femur_cos, femur_ok) = unit_clamp(femur_cos);
    let (tibia_cos, tibia_ok) = unit_clamp(tibia_cos);

    let angles = JointRadians {
        coxa,
        femur: acosf(femur_cos) + atan2f(z, reach),
        tibia: acosf(tibia_cos),
    };

    if femur_ok && tibia_ok {
        Ok(angles)
    } else {
        Err(angles)
    }
}

/// Foot position reached by `angles` (radians, not inverted, no trims).
pub fn forward(angles: JointRadians) -> Vec3 {
    let knee = angles.femur - angles.tibia;
    let r = LENGTH_COXA + LENGTH_FEMUR * cosf(angles.femur) + LENGTH_TIBIA * cosf(knee);
    let z = LENGTH_FEMUR * sinf(angles.femur) + LENGTH_TIBIA * sinf(knee);

    Vec3::new(r * cosf(angles.coxa), r * sinf(angles.coxa), z)
}

/// Radians to whole degrees, truncating toward zero.
fn to_whole_degrees(radians: f32) -> i16 {
    let degrees = radians.to_degrees();
    let nearest = roundf(degrees);
    if fabsf(degrees - nearest) < DEGREE_SNAP {
        nearest as i16
    } else {
        degrees as i16
    }
}

/// Per-leg solver: mount inversion and servo trims on top of [`inverse`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegKinematics {
    inverted: bool,
    trims: JointTrims,
}

impl LegKinematics {
    pub fn new(inverted: bool, trims: JointTrims) -> Self {
        Self { inverted, trims }
    }

    pub fn solve(&self, target: Vec3) -> Result<JointAngles, KinematicsError> {
        match inverse(target) {
            Ok(raw) => Ok(self.to_servo(raw)),
            Err(raw) => Err(KinematicsError::Unreachable {
                target,
                clamped: self.to_servo(raw),
            }),
        }
    }

    fn to_servo(&self, raw: JointRadians) -> JointAngles {
        let (femur, tibia) = if self.inverted {
            (-raw.femur, core::f32::consts::PI - raw.tibia)
        } else {
            (raw.femur, raw.tibia)
        };

        JointAngles {
            coxa: to_whole_degrees(raw.coxa) + self.trims.coxa,
            femur: to_whole_degrees(femur) + self.trims.femur,
            tibia: to_whole_degrees(tibia) + self.trims.tibia,
        }
    }
}
