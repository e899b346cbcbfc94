//! Physical dimensions, behaviour constants and the runtime robot configuration.
//!
//! The constants describe the reference hexapod. [`RobotConfig`] bundles them into values the
//! [`Mover`](crate::mover::Mover) is built from, so a host can swap geometry or tuning without
//! touching the locomotion code.
use glam::{Quat, Vec3};

use crate::robot::joint::JointTrims;

pub const NUM_LEGS: usize = 6;

/// Shared tolerance for float comparisons, deadbands and divide-by-zero guards.
pub const F_TOLERANCE: f32 = 1e-3;

// LEG SIZE (mm)
pub const LENGTH_COXA: f32 = 28.0;
pub const LENGTH_FEMUR: f32 = 55.0;
pub const LENGTH_TIBIA: f32 = 80.0;

/// CONST FOR MOVEMENT
pub const MAX_STRIDE: f32 = 60.0;
pub const MAX_ELEVATION: f32 = 65.0;
pub const SWING_LIFT: f32 = 40.0;
pub const SMOOTH_FACTOR: f32 = 4.0;
pub const SPEED_MULTIPLIER: f32 = 5.0;
pub const MIN_TIMESHIFT: f32 = 0.5;
pub const TORQUE_DEADBAND: f32 = 0.05;
pub const MANUAL_MOVE_MS: u32 = 200;

/// GAIT SWITCHING (velocity thresholds, ascending / descending)
pub const WAVE_GAIT_ON_ASC: f32 = F_TOLERANCE;
pub const WAVE_GAIT_ON_DESC: f32 = 0.2;
pub const RIPPLE_GAIT_ON_ASC: f32 = 0.4;
pub const RIPPLE_GAIT_ON_DESC: f32 = 0.8;
pub const TRIPOD_GAIT_ON_ASC: f32 = 0.95;
/// Do not allow switching gait frequently
pub const MIN_GAIT_UPTIME: f32 = 2.0;
pub const BLEND_DURATION: f32 = 2.0;

/// Neutral foot position in the leg-local frame: femur level, tibia vertical.
pub const LEG_CENTER: Vec3 = Vec3::new(LENGTH_COXA + LENGTH_FEMUR, 0.0, -LENGTH_TIBIA);

// [offset x, offset y, mount yaw (deg)], inverted flag
const LEG_LAYOUT: [([f32; 3], bool); NUM_LEGS] = [
    ([38.0, 67.0, 60.0], false),    // front right
    ([-38.0, 67.0, 120.0], true),   // front left
    ([-60.0, 0.0, 180.0], false),   // middle left
    ([60.0, 0.0, 0.0], true),       // middle right
    ([38.0, -67.0, -60.0], false),  // rear right
    ([-38.0, -67.0, -120.0], true), // rear left
];

const DEFAULT_TRIMS: JointTrims = JointTrims {
    coxa: 90,
    femur: 90,
    tibia: 0,
};

/// Mounting of one leg on the body. Read-only to the locomotion core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegGeometry {
    /// Coxa axis position in the body frame (x right, y forward, z up).
    pub offset: Vec3,
    /// Rotation from the leg-local frame into the body frame.
    pub rotation: Quat,
    /// Servos mounted mirrored: femur and tibia angles are reflected.
    pub inverted: bool,
    pub trims: JointTrims,
}

impl LegGeometry {
    pub fn new(offset: Vec3, yaw_deg: f32, inverted: bool, trims: JointTrims) -> Self {
        Self {
            offset,
            rotation: Quat::from_rotation_z(yaw_deg.to_radians()),
            inverted,
            trims,
        }
    }
}

/// Gait scheduler tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaitConfig {
    pub wave_on_asc: f32,
    pub wave_on_desc: f32,
    pub ripple_on_asc: f32,
    pub ripple_on_desc: f32,
    pub tripod_on_asc: f32,
    pub min_uptime: f32,
    pub blend_duration: f32,
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            wave_on_asc: WAVE_GAIT_ON_ASC,
            wave_on_desc: WAVE_GAIT_ON_DESC,
            ripple_on_asc: RIPPLE_GAIT_ON_ASC,
            ripple_on_desc: RIPPLE_GAIT_ON_DESC,
            tripod_on_asc: TRIPOD_GAIT_ON_ASC,
            min_uptime: MIN_GAIT_UPTIME,
            blend_duration: BLEND_DURATION,
        }
    }
}

/// Stride, body height and foot trajectory tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    pub max_stride: f32,
    pub max_elevation: f32,
    pub swing_lift: f32,
    pub smooth_factor: f32,
    pub speed_multiplier: f32,
    pub min_timeshift: f32,
    pub torque_deadband: f32,
    pub manual_move_ms: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_stride: MAX_STRIDE,
            max_elevation: MAX_ELEVATION,
            swing_lift: SWING_LIFT,
            smooth_factor: SMOOTH_FACTOR,
            speed_multiplier: SPEED_MULTIPLIER,
            min_timeshift: MIN_TIMESHIFT,
            torque_deadband: TORQUE_DEADBAND,
            manual_move_ms: MANUAL_MOVE_MS,
        }
    }
}

/// Everything the locomotion core needs to know about the robot.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotConfig {
    pub legs: [LegGeometry; NUM_LEGS],
    pub gait: GaitConfig,
    pub motion: MotionConfig,
}

impl RobotConfig {
    pub fn new() -> Self {
        let legs = LEG_LAYOUT.map(|([x, y, yaw], inverted)| {
            LegGeometry::new(Vec3::new(x, y, 0.0), yaw, inverted, DEFAULT_TRIMS)
        });

        Self {
            legs,
            gait: GaitConfig::default(),
            motion: MotionConfig::default(),
        }
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self::new()
    }
}
