use glam::Vec3;
use thiserror::Error;

use crate::robot::joint::JointAngles;

/// Inverse kinematics failures.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum KinematicsError {
    /// The target is farther (or closer) than the leg links can reach. `clamped` is the pose
    /// obtained with the law-of-cosines terms clamped to `[-1, 1]`, pointing the leg at the target.
    #[error("target {target} is outside the leg workspace")]
    Unreachable { target: Vec3, clamped: JointAngles },
}

impl KinematicsError {
    /// Best-effort angles to drive when the exact solution does not exist.
    pub fn clamped(&self) -> JointAngles {
        match self {
            KinematicsError::Unreachable { clamped, .. } => *clamped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LegIndexError {
    #[error("leg index {0} out of range (robot has 6 legs)")]
    OutOfRange(usize),
}
