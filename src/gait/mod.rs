//! Gait phase sources and the scheduler that switches between them.
//!
//! A gait maps `(leg, t)` to a phase in `[-1, 1]`: negative while the foot swings through the
//! air, non-negative while it pushes on the ground, the magnitude being the progress through
//! that half-cycle.
//!
//! - [`segment`]: line segments and blend curves.
//! - [`mixer`]: the transient gait bridging two others with continuous curves.
//! - [`scheduler`]: velocity-driven selection with hysteresis and dwell time.
pub mod mixer;
pub mod scheduler;
pub mod segment;

use core::fmt::Display;

use crate::config::NUM_LEGS;
use crate::robot::leg::LegIndex;

use self::mixer::GaitMixer;

/// Phase of every leg while the robot stands still: mid-stance.
pub const IDLE_PHASE: f32 = 0.5;

const WAVE_OFFSETS: [f32; NUM_LEGS] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
const RIPPLE_OFFSETS: [f32; NUM_LEGS] = [0.0, 2.0, 4.0, 1.0, 3.0, 5.0];
const TRIPOD_OFFSETS: [f32; NUM_LEGS] = [0.0, 1.0, 0.0, 1.0, 0.0, 1.0];

/// The periodic (or constant) phase patterns the scheduler can settle on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gait {
    Idle,
    /// One leg in the air at a time.
    Wave,
    /// Two legs in the air, staggered.
    Ripple,
    /// Alternating groups of three legs.
    Tripod,
}

impl Gait {
    /// Cycle length in gait time units; `None` for the constant idle phase.
    pub fn period(self) -> Option<f32> {
        match self {
            Gait::Idle => None,
            Gait::Wave | Gait::Ripple => Some(6.0),
            Gait::Tripod => Some(2.0),
        }
    }

    /// Rate of phase change during stance, used to extend the stance ramp when blending.
    pub fn stance_slope(self) -> f32 {
        match self {
            Gait::Idle => 0.0,
            Gait::Wave => 0.2,
            Gait::Ripple => 0.25,
            Gait::Tripod => 1.0,
        }
    }

    fn offsets(self) -> &'static [f32; NUM_LEGS] {
        match self {
            Gait::Idle | Gait::Wave => &WAVE_OFFSETS,
            Gait::Ripple => &RIPPLE_OFFSETS,
            Gait::Tripod => &TRIPOD_OFFSETS,
        }
    }

    /// Time within the leg's own cycle, in `[0, period)`.
    fn cycle_time(self, leg: LegIndex, t: f32, period: f32) -> f32 {
        let local = (t + self.offsets()[leg]) % period;
        if local < 0.0 {
            local + period
        } else {
            local
        }
    }

    pub fn evaluate(self, leg: LegIndex, t: f32) -> f32 {
        let Some(period) = self.period() else {
            return IDLE_PHASE;
        };
        let t = self.cycle_time(leg, t, period);

        match self {
            Gait::Idle => IDLE_PHASE,
            Gait::Wave => {
                if t < 1.0 {
                    -t
                } else {
                    (t - 1.0) / 5.0
                }
            }
            Gait::Ripple => {
                if t < 2.0 {
                    -t / 2.0
                } else {
                    (t - 2.0) / 4.0
                }
            }
            Gait::Tripod => {
                if t < 1.0 {
                    -t
                } else {
                    t - 1.0
                }
            }
        }
    }

    pub fn kind(self) -> GaitKind {
        match self {
            Gait::Idle => GaitKind::Idle,
            Gait::Wave => GaitKind::Wave,
            Gait::Ripple => GaitKind::Ripple,
            Gait::Tripod => GaitKind::Tripod,
        }
    }
}

impl Display for Gait {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Display::fmt(&self.kind(), f)
    }
}

/// Identity of whatever drives the legs, the mixer included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaitKind {
    Idle,
    Wave,
    Ripple,
    Tripod,
    Mixer,
}

impl Display for GaitKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GaitKind::Idle => f.write_str("Idle"),
            GaitKind::Wave => f.write_str("Wave"),
            GaitKind::Ripple => f.write_str("Ripple"),
            GaitKind::Tripod => f.write_str("Tripod"),
            GaitKind::Mixer => f.write_str("Mixer"),
        }
    }
}

/// The gait variant in charge at one instant, as handed out by the scheduler.
#[derive(Debug, Clone, Copy)]
pub enum ActiveGait<'a> {
    Steady(Gait),
    Mixer(&'a GaitMixer),
}

impl ActiveGait<'_> {
    pub fn evaluate(&self, leg: LegIndex, t: f32) -> f32 {
        match self {
            ActiveGait::Steady(gait) => gait.evaluate(leg, t),
            ActiveGait::Mixer(mixer) => mixer.evaluate(leg, t),
        }
    }

    pub fn kind(&self) -> GaitKind {
        match self {
            ActiveGait::Steady(gait) => gait.kind(),
            ActiveGait::Mixer(_) => GaitKind::Mixer,
        }
    }
}
