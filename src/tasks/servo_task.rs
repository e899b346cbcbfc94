//! PCA9685 output stage.
//!
//! Legs 0 to 2 hang off the board on I2C0, legs 3 to 5 off the board on I2C1. Each received
//! [`ServoFrame`] becomes the new interpolation target; the boards are refreshed once per PWM
//! period until the joints reach it.
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Receiver};
use embassy_time::{Duration, Ticker};
use esp_hal::{i2c::master::I2c, Async};
use log::{debug, error, info};
use pwm_pca9685::{Channel, Pca9685};

use crate::robot::joint::Joint;
use crate::robot::leg::LegIndex;
use crate::robot::servo::{servo_channel, ServoChannel, ServoFrame, ServoInterpolator, SERVO_PERIOD_MS};
use crate::SERVO_FRAME_CHANNEL_SIZE;

pub type ServoBoard = Pca9685<I2c<'static, Async>>;

/// 25 MHz / (4096 * 50 Hz) - 1
const PCA_PRESCALE_50HZ: u8 = 121;

// [coxa, femur, tibia] for the three legs of one board
static SERVO_CHANNELS: [Channel; 9] = [
    Channel::C0,
    Channel::C1,
    Channel::C2,
    Channel::C3,
    Channel::C4,
    Channel::C5,
    Channel::C6,
    Channel::C7,
    Channel::C8,
];

#[embassy_executor::task]
pub async fn servo_task(
    mut boards: [ServoBoard; 2],
    frame_receiver: Receiver<'static, CriticalSectionRawMutex, ServoFrame, SERVO_FRAME_CHANNEL_SIZE>,
) {
    for (i, pwm) in boards.iter_mut().enumerate() {
        if let Err(e) = pwm.set_prescale(PCA_PRESCALE_50HZ).await {
            error!("[SERVO_TASK] board {i}: failed to set prescale: {e:?}");
        }
        if let Err(e) = pwm.enable().await {
            error!("[SERVO_TASK] board {i}: failed to enable: {e:?}");
        }
    }

    let first = frame_receiver.receive().await;
    let mut interpolator = ServoInterpolator::new(&first.angles);
    write_legs(&mut boards, &interpolator).await;
    info!("[SERVO_TASK] initial pose written");

    let mut ticker = Ticker::every(Duration::from_millis(SERVO_PERIOD_MS as u64));
    loop {
        if interpolator.is_done() {
            let frame = frame_receiver.receive().await;
            interpolator.set_frame(&frame);
            ticker.reset();
        } else if let Ok(frame) = frame_receiver.try_receive() {
            debug!("[SERVO_TASK] retargeting mid-move");
            interpolator.set_frame(&frame);
        }

        if interpolator.step() {
            write_legs(&mut boards, &interpolator).await;
        }
        ticker.next().await;
    }
}

async fn write_legs(boards: &mut [ServoBoard; 2], interpolator: &ServoInterpolator) {
    for leg in LegIndex::all() {
        let ticks = interpolator.leg_ticks(leg);
        for joint in Joint::ALL {
            let ServoChannel { board, channel } = servo_channel(leg, joint);
            let pwm = &mut boards[board as usize];
            if let Err(e) = pwm
                .set_channel_on_off(SERVO_CHANNELS[channel as usize], 0, ticks[joint as usize])
                .await
            {
                error!("[SERVO_TASK] {leg} {joint}: {e:?}");
            }
        }
    }
}
