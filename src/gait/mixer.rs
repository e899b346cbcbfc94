//! Transient gait that blends one phase pattern into another.
//!
//! When the scheduler switches gaits it samples the outgoing gait at the start of the blend
//! window and the incoming gait at its end, then builds one [`BlendCurve`] per leg joining the
//! two. Every curve starts on the outgoing phase and lands on the incoming one, so the legs
//! never see a phase jump at either end of the window.
use log::{debug, info};
#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::{F_TOLERANCE, NUM_LEGS};
use crate::gait::segment::{BlendCurve, Segment};
use crate::gait::Gait;
use crate::robot::leg::LegIndex;

/// Stance and swing limits of the phase signal.
const STANCE_CEILING: f32 = 1.0;
const SWING_FLOOR: f32 = -1.0;

/// Build the curve taking a leg from `ph0` at `t0` to `ph1` at `t1`. `slope` is the stance
/// slope of the incoming gait.
///
/// Covers every sign combination of the two boundary phases, so it always yields a curve. A
/// negative zero is the first instant of a swing, with the foot still at lift-off. No segment
/// moves the phase faster than one full half-cycle per third of the window.
pub fn blend_curve(ph0: f32, ph1: f32, slope: f32, t0: f32, t1: f32) -> BlendCurve {
    let ph0 = ph0.clamp(SWING_FLOOR, STANCE_CEILING);
    let pushing = ph0.is_sign_positive();
    let third = (t1 - t0) / 3.0;

    if ph1.is_sign_positive() {
        // incoming gait is pushing at t1: extend its stance ramp backwards
        let stance = Segment::through(slope, ph1, t1);

        if pushing && (ph0 - stance.evaluate(t0)).abs() < F_TOLERANCE {
            return BlendCurve::single(stance.trimmed(t0, t1));
        }

        let touchdown = stance.find_t(0.0);

        if pushing && touchdown.is_none_or(|tm| tm <= t0) {
            // the ramp touched down before t0: slide along the ground onto it
            let tm = t0 + third;
            return BlendCurve::pair(
                Segment::between(ph0, stance.evaluate(tm), t0, tm),
                stance.trimmed(tm, t1),
            );
        }

        // swing down to the floor, then push from the ground up to ph1
        let earliest = t0 + third * (1.0 + if pushing { ph0 } else { 0.0 });
        let tm = touchdown
            .filter(|&tm| tm >= earliest - F_TOLERANCE && tm <= t1 + F_TOLERANCE)
            .map_or(earliest, |tm| tm.max(earliest).min(t1));

        BlendCurve::pair(
            Segment::between(ph0, SWING_FLOOR, t0, tm),
            Segment::between(0.0, ph1, tm, t1),
        )
    } else if ph0 > 0.0 {
        // pushing now, swinging at t1: ride the ramp up to lift-off
        let stance = Segment::through(slope, ph0, t0);
        let latest = t0 + 2.0 * third;

        let liftoff = stance
            .find_t(STANCE_CEILING)
            .filter(|&tm| tm >= t0 && tm <= latest);

        let (tm, lead) = match liftoff {
            Some(tm) => (tm, Segment::between(ph0, STANCE_CEILING, t0, tm)),
            None => (latest, Segment::between(ph0, stance.evaluate(latest), t0, latest)),
        };

        BlendCurve::pair(lead, Segment::between(-F_TOLERANCE, ph1, tm, t1))
    } else {
        BlendCurve::single(Segment::between(ph0, ph1, t0, t1))
    }
}

/// The mixer slot owned by the scheduler, rebuilt in place on every transition.
#[derive(Debug, Clone)]
pub struct GaitMixer {
    from: Gait,
    to: Gait,
    start: f32,
    duration: f32,
    curves: [BlendCurve; NUM_LEGS],
}

impl Default for GaitMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl GaitMixer {
    pub fn new() -> Self {
        Self {
            from: Gait::Idle,
            to: Gait::Idle,
            start: 0.0,
            duration: 0.0,
            curves: Default::default(),
        }
    }

    /// Set up the blend from `from` (sampled at `t`) to `to` (sampled at `t + duration`).
    pub fn begin_transition(&mut self, from: Gait, to: Gait, t: f32, duration: f32) {
        info!("[GAIT] mixing {from} into {to} at t={t}");

        self.from = from;
        self.to = to;
        self.start = t;
        self.duration = duration;

        let (t0, t1) = (t, t + duration);
        let slope = to.stance_slope();

        for leg in LegIndex::all() {
            let ph0 = from.evaluate(leg, t0);
            let ph1 = to.evaluate(leg, t1);
            self.curves[leg] = blend_curve(ph0, ph1, slope, t0, t1);
            debug!(
                "[GAIT] {leg}: ph0={ph0} ph1={ph1} segments={}",
                self.curves[leg].len()
            );
        }
    }

    pub fn evaluate(&self, leg: LegIndex, t: f32) -> f32 {
        self.curves[leg].evaluate(t)
    }

    pub fn from(&self) -> Gait {
        self.from
    }

    pub fn to(&self) -> Gait {
        self.to
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// The incoming gait once the blend window has been left behind.
    pub fn next(&self, t: f32) -> Option<Gait> {
        (t - self.start > self.duration).then_some(self.to)
    }
}
