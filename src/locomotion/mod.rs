//! From body command to foot positions.
//!
//! - [`solver`]: control input to per-leg stride vector and body elevation.
//! - [`trajectory`]: smoothed stride endpoints and the stance/swing foot path of one leg.
pub mod solver;
pub mod trajectory;

pub use solver::{ControlInput, LocomotionSolver};
pub use trajectory::LegTrajectory;
