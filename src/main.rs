#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use core::future::pending;
use embassy_executor::Spawner;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use hexapod_robot::robot::servo::ServoFrame;
use hexapod_robot::tasks::motion_task::motion_task;
use hexapod_robot::tasks::servo_task::servo_task;
use hexapod_robot::{RobotConfig, SERVO_FRAME_CHANNEL_SIZE};
use log::info;
use pwm_pca9685::{Address, Pca9685};

esp_bootloader_esp_idf::esp_app_desc!();

//BOARDS: [sda, scl]
//I2C0 (legs 0-2): [21, 22]
//I2C1 (legs 3-5): [25, 26]

static SERVO_FRAMES: Channel<CriticalSectionRawMutex, ServoFrame, SERVO_FRAME_CHANNEL_SIZE> =
    Channel::new();

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger_from_env();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let p = esp_hal::init(config);

    let timer0 = TimerGroup::new(p.TIMG1);
    esp_hal_embassy::init(timer0.timer0);
    info!("Embassy initialized");

    let i2c0 = I2c::new(
        p.I2C0,
        I2cConfig::default().with_frequency(Rate::from_khz(400)),
    )
    .expect("Failed to initialize I2C0")
    .with_sda(p.GPIO21)
    .with_scl(p.GPIO22)
    .into_async();
    let i2c1 = I2c::new(
        p.I2C1,
        I2cConfig::default().with_frequency(Rate::from_khz(400)),
    )
    .expect("Failed to initialize I2C1")
    .with_sda(p.GPIO25)
    .with_scl(p.GPIO26)
    .into_async();

    let front = Pca9685::new(i2c0, Address::default()).expect("Failed to create PCA9685 on I2C0");
    let rear = Pca9685::new(i2c1, Address::default()).expect("Failed to create PCA9685 on I2C1");

    info!("Starting hexapod robot...");
    spawner
        .spawn(servo_task([front, rear], SERVO_FRAMES.receiver()))
        .expect("Fail spawning servo task");
    spawner
        .spawn(motion_task(RobotConfig::new(), SERVO_FRAMES.sender()))
        .expect("Fail spawning motion task");

    loop {
        pending::<()>().await;
    }
}
