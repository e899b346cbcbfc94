//! Library root for the hexapod firmware.
//!
//! The locomotion core ([`gait`], [`kinematics`], [`locomotion`], [`mover`]) is plain `no_std`
//! code driven through the [`mover::LegActuator`] trait. The ESP32 tasks in `tasks` are only
//! built with the `firmware` feature.
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod gait;
pub mod kinematics;
pub mod locomotion;
pub mod mover;
pub mod robot;
#[cfg(feature = "firmware")]
pub mod tasks;

pub use config::RobotConfig;
pub use error::{KinematicsError, LegIndexError};
pub use locomotion::ControlInput;
pub use mover::{LegActuator, Mover, TickReport};
pub use robot::leg::LegIndex;

pub const SERVO_FRAME_CHANNEL_SIZE: usize = 4;
