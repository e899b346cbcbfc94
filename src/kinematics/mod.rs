//! Kinematics for the hexapod legs.
//!
//! - [`solver`] handles the closed-form inverse kinematics of a single leg (plus forward
//!   kinematics for checks) and applies mount inversion and servo trims.
//!
//! Used by [`crate::robot::leg::Leg`] every time a foot position changes.
pub mod solver;

pub use solver::{forward, inverse, JointRadians, LegKinematics};
