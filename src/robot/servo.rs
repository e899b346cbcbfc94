//! Servo side of the actuator: PCA9685 tick conversion, channel map and frame interpolation.
//!
//! The locomotion core hands angles to a [`ServoBatch`], which turns every committed batch into
//! a [`ServoFrame`]. The servo task feeds frames to a [`ServoInterpolator`] and writes the
//! intermediate angles to the PWM boards every servo period.
use libm::roundf;
#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::NUM_LEGS;
use crate::mover::LegActuator;
use crate::robot::joint::{Joint, JointAngles};
use crate::robot::leg::LegIndex;

// --- Servo Configuration ---
const SERVO_MIN_PULSE_US: f32 = 544.0;
const SERVO_MAX_PULSE_US: f32 = 2400.0;
const SERVO_ANGLE_RANGE: f32 = 180.0;
pub const PCA_FREQUENCY_HZ: u32 = 50;
const PCA_PERIOD_US: f32 = 1_000_000.0 / PCA_FREQUENCY_HZ as f32; // 20000 µs
const PRESCALE_REG_SIZE: f32 = 4096.0;
/// Interval between two interpolation steps, one PWM period.
pub const SERVO_PERIOD_MS: u32 = 1000 / PCA_FREQUENCY_HZ;
/// Legs wired to each PCA9685 board.
pub const LEGS_PER_BOARD: usize = 3;

/// Angle in degrees (clamped to the servo range) to PCA9685 off-tick count.
pub fn angle_to_ticks(angle: f32) -> u16 {
    let angle = angle.clamp(0.0, SERVO_ANGLE_RANGE);
    let pulse_width_range = SERVO_MAX_PULSE_US - SERVO_MIN_PULSE_US;
    let pulse_us = SERVO_MIN_PULSE_US + (angle / SERVO_ANGLE_RANGE) * pulse_width_range;
    let tick = (pulse_us / PCA_PERIOD_US) * PRESCALE_REG_SIZE;
    roundf(tick).clamp(0.0, PRESCALE_REG_SIZE - 1.0) as u16
}

/// Where a joint servo is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoChannel {
    /// 0: legs 0 to 2 (first I2C bus), 1: legs 3 to 5 (second I2C bus).
    pub board: u8,
    /// PCA9685 output, 0..=8.
    pub channel: u8,
}

pub fn servo_channel(leg: LegIndex, joint: Joint) -> ServoChannel {
    let leg = leg.get();
    ServoChannel {
        board: (leg / LEGS_PER_BOARD) as u8,
        channel: ((leg % LEGS_PER_BOARD) * Joint::ALL.len() + joint as usize) as u8,
    }
}

/// Joint angles of all legs, to be reached over `duration_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoFrame {
    pub angles: [JointAngles; NUM_LEGS],
    pub duration_ms: u32,
}

/// [`LegActuator`] that collects one tick of writes into a [`ServoFrame`].
///
/// Legs not written during a batch keep their previous angles.
#[derive(Debug, Clone)]
pub struct ServoBatch {
    committed: [JointAngles; NUM_LEGS],
    working: [JointAngles; NUM_LEGS],
    ready: Option<ServoFrame>,
}

impl ServoBatch {
    pub fn new(initial: [JointAngles; NUM_LEGS]) -> Self {
        Self {
            committed: initial,
            working: initial,
            ready: None,
        }
    }

    /// The last committed frame, if it was not taken yet.
    pub fn take_frame(&mut self) -> Option<ServoFrame> {
        self.ready.take()
    }

    pub fn angles(&self) -> &[JointAngles; NUM_LEGS] {
        &self.committed
    }
}

impl LegActuator for ServoBatch {
    fn begin_batch(&mut self) {
        self.working = self.committed;
    }

    fn write_leg(&mut self, leg: LegIndex, angles: JointAngles) {
        self.working[leg] = angles;
    }

    fn commit_batch(&mut self, duration_ms: u32) {
        self.committed = self.working;
        self.ready = Some(ServoFrame {
            angles: self.committed,
            duration_ms,
        });
    }
}

/// Moves every joint linearly from where it is to the latest frame, one step per servo period.
#[derive(Debug, Clone)]
pub struct ServoInterpolator {
    current: [[f32; 3]; NUM_LEGS],
    expected: [[f32; 3]; NUM_LEGS],
    speed: [[f32; 3]; NUM_LEGS],
}

fn to_degrees(angles: &JointAngles) -> [f32; 3] {
    Joint::ALL.map(|joint| angles[joint] as f32)
}

impl ServoInterpolator {
    pub fn new(initial: &[JointAngles; NUM_LEGS]) -> Self {
        let current = initial.map(|angles| to_degrees(&angles));
        Self {
            current,
            expected: current,
            speed: [[0.0; 3]; NUM_LEGS],
        }
    }

    /// Retarget to `frame`, spreading the motion over its duration.
    pub fn set_frame(&mut self, frame: &ServoFrame) {
        let steps = frame.duration_ms.div_ceil(SERVO_PERIOD_MS).max(1) as f32;
        self.expected = frame.angles.map(|angles| to_degrees(&angles));

        for leg in 0..NUM_LEGS {
            for joint in 0..3 {
                self.speed[leg][joint] =
                    (self.expected[leg][joint] - self.current[leg][joint]) / steps;
            }
        }
    }

    /// Advance one servo period. Returns `false` once every joint sits on its target.
    pub fn step(&mut self) -> bool {
        if self.is_done() {
            return false;
        }

        for leg in 0..NUM_LEGS {
            for joint in 0..3 {
                let diff = (self.current[leg][joint] - self.expected[leg][joint]).abs();
                let speed = self.speed[leg][joint];

                if diff > speed.abs() {
                    self.current[leg][joint] += speed;
                } else {
                    self.current[leg][joint] = self.expected[leg][joint];
                }
            }
        }
        true
    }

    pub fn is_done(&self) -> bool {
        self.current == self.expected
    }

    /// Current angles of `leg` in degrees, `[coxa, femur, tibia]`.
    pub fn leg(&self, leg: LegIndex) -> [f32; 3] {
        self.current[leg]
    }

    /// Current PCA9685 ticks of `leg`, `[coxa, femur, tibia]`.
    pub fn leg_ticks(&self, leg: LegIndex) -> [u16; 3] {
        self.current[leg].map(angle_to_ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTERED: JointAngles = JointAngles::new(90, 90, 90);

    fn leg(i: usize) -> LegIndex {
        LegIndex::new(i).unwrap()
    }

    #[test]
    fn angle_to_ticks_spans_servo_range() {
        assert_eq!(angle_to_ticks(0.0), 111);
        assert_eq!(angle_to_ticks(90.0), 301);
        assert_eq!(angle_to_ticks(180.0), 492);
        assert_eq!(angle_to_ticks(-20.0), 111);
        assert_eq!(angle_to_ticks(250.0), 492);
    }

    #[test]
    fn channels_split_over_two_boards() {
        assert_eq!(
            servo_channel(leg(0), Joint::Coxa),
            ServoChannel { board: 0, channel: 0 }
        );
        assert_eq!(
            servo_channel(leg(2), Joint::Tibia),
            ServoChannel { board: 0, channel: 8 }
        );
        assert_eq!(
            servo_channel(leg(3), Joint::Coxa),
            ServoChannel { board: 1, channel: 0 }
        );
        assert_eq!(
            servo_channel(leg(5), Joint::Femur),
            ServoChannel { board: 1, channel: 7 }
        );
    }

    #[test]
    fn batch_produces_frame_on_commit_only() {
        let mut batch = ServoBatch::new([CENTERED; NUM_LEGS]);
        batch.begin_batch();
        batch.write_leg(leg(4), JointAngles::new(80, 100, 70));
        assert_eq!(batch.take_frame(), None);

        batch.commit_batch(20);
        let frame = batch.take_frame().unwrap();
        assert_eq!(frame.duration_ms, 20);
        assert_eq!(frame.angles[4], JointAngles::new(80, 100, 70));
        assert_eq!(frame.angles[0], CENTERED);
        assert_eq!(batch.take_frame(), None);

        // unwritten legs carry over into the next batch
        batch.begin_batch();
        batch.write_leg(leg(0), JointAngles::new(0, 0, 0));
        batch.commit_batch(20);
        let frame = batch.take_frame().unwrap();
        assert_eq!(frame.angles[4], JointAngles::new(80, 100, 70));
        assert_eq!(frame.angles[0], JointAngles::new(0, 0, 0));
    }

    #[test]
    fn interpolator_reaches_frame_in_expected_steps() {
        let mut interp = ServoInterpolator::new(&[CENTERED; NUM_LEGS]);
        let mut angles = [CENTERED; NUM_LEGS];
        angles[1] = JointAngles::new(100, 80, 90);
        interp.set_frame(&ServoFrame {
            angles,
            duration_ms: 200,
        });

        let mut steps = 0;
        while interp.step() {
            steps += 1;
            assert!(steps <= 10, "did not converge");
        }
        assert_eq!(steps, 10);
        assert_eq!(interp.leg(leg(1)), [100.0, 80.0, 90.0]);
        assert_eq!(interp.leg(leg(0)), [90.0, 90.0, 90.0]);
        assert_eq!(interp.leg_ticks(leg(0)), [301; 3]);
    }

    #[test]
    fn short_frame_is_a_single_step() {
        let mut interp = ServoInterpolator::new(&[CENTERED; NUM_LEGS]);
        interp.set_frame(&ServoFrame {
            angles: [JointAngles::new(95, 90, 90); NUM_LEGS],
            duration_ms: 0,
        });
        assert!(interp.step());
        assert!(interp.is_done());
        assert!(!interp.step());
    }
}
