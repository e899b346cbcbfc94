//! Core robot types shared by the locomotion code and the firmware tasks.
//!
//! - [`joint`]: joint enumeration, integer joint angles and trims.
//! - [`leg`]: leg indexing and the per-leg kinematic driver.
//! - [`servo`]: servo frames, interpolation and PCA9685 tick conversion.
pub mod joint;
pub mod leg;
pub mod servo;
