//! Asynchronous tasks for the hexapod firmware.
//!
//! - [`motion_task`]: runs the [`Mover`](crate::mover::Mover) on a fixed tick and publishes
//!   servo frames.
//! - [`servo_task`]: drives the two PCA9685 boards towards the latest frame.
//!
//! Tasks are spawned from `main.rs`. The input side (RC receiver, service menu) talks to the
//! motion task through [`CONTROL`] and [`MOVER_COMMANDS`].
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel, signal::Signal};
use glam::Vec2;

use crate::locomotion::ControlInput;
use crate::robot::leg::LegIndex;

pub mod motion_task;
pub mod servo_task;

pub const MOVER_COMMAND_CHANNEL_SIZE: usize = 4;

/// Non-walking requests for the motion task, handled between two ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoverCommand {
    EnableLocomotion(bool),
    MoveLeg(LegIndex, Vec2),
    CenterLeg(LegIndex),
}

/// Latest body command; older values are overwritten.
pub static CONTROL: Signal<CriticalSectionRawMutex, ControlInput> = Signal::new();

pub static MOVER_COMMANDS: Channel<CriticalSectionRawMutex, MoverCommand, MOVER_COMMAND_CHANNEL_SIZE> =
    Channel::new();
