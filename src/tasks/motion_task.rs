//! Locomotion tick loop.
//!
//! Every `MOTION_PERIOD_MS` the task picks up the newest [`CONTROL`] value, applies pending
//! [`MoverCommand`]s, runs one [`Mover::update`] and forwards the committed frame to the servo
//! task.
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Sender};
use embassy_time::{Duration, Ticker};
use log::{debug, info, warn};

use crate::config::{RobotConfig, NUM_LEGS};
use crate::mover::Mover;
use crate::robot::joint::JointAngles;
use crate::robot::servo::{ServoBatch, ServoFrame};
use crate::tasks::{MoverCommand, CONTROL, MOVER_COMMANDS};
use crate::SERVO_FRAME_CHANNEL_SIZE;

pub const MOTION_PERIOD_MS: u64 = 20;

#[embassy_executor::task]
pub async fn motion_task(
    config: RobotConfig,
    frame_sender: Sender<'static, CriticalSectionRawMutex, ServoFrame, SERVO_FRAME_CHANNEL_SIZE>,
) {
    let mut mover = Mover::new(&config);
    let mut batch = ServoBatch::new([JointAngles::default(); NUM_LEGS]);
    debug!("{config:?}");

    mover.enable_locomotion(true, &mut batch);
    if let Some(frame) = batch.take_frame() {
        frame_sender.send(frame).await;
    }
    info!("[MOTION_TASK] legs centred, walking");

    let dt = MOTION_PERIOD_MS as f32 / 1000.0;
    let mut ticker = Ticker::every(Duration::from_millis(MOTION_PERIOD_MS));

    loop {
        if let Some(control) = CONTROL.try_take() {
            mover.set_control(&control);
        }

        while let Ok(cmd) = MOVER_COMMANDS.try_receive() {
            handle_command(&mut mover, &mut batch, cmd, &frame_sender).await;
        }

        let report = mover.update(dt, &mut batch);
        if report.unreachable.iter().any(|&flag| flag) {
            debug!("[MOTION_TASK] unreachable legs {:?}", report.unreachable);
        }

        if let Some(frame) = batch.take_frame() {
            frame_sender.send(frame).await;
        }
        ticker.next().await;
    }
}

async fn handle_command(
    mover: &mut Mover,
    batch: &mut ServoBatch,
    cmd: MoverCommand,
    frame_sender: &Sender<'static, CriticalSectionRawMutex, ServoFrame, SERVO_FRAME_CHANNEL_SIZE>,
) {
    let stamp = "[MOTION_TASK] received";
    match cmd {
        MoverCommand::EnableLocomotion(enabled) => {
            info!("{stamp} enable locomotion {enabled}");
            mover.enable_locomotion(enabled, batch);
        }
        MoverCommand::MoveLeg(leg, offset) => {
            info!("{stamp} move {leg} by {offset}");
            if !mover.move_leg(leg, offset, batch) {
                warn!("{stamp} move ignored, locomotion is enabled");
            }
        }
        MoverCommand::CenterLeg(leg) => {
            info!("{stamp} centre {leg}");
            mover.center_leg(leg, batch);
        }
    }

    if let Some(frame) = batch.take_frame() {
        frame_sender.send(frame).await;
    }
}
