//! Per-tick orchestration of the locomotion core.
//!
//! Each [`Mover::update`] reads the stored command, advances the speed-scaled gait clock,
//! asks the scheduler for the active gait and walks every leg through trajectory and
//! kinematics. The resulting joint angles reach the hardware through a [`LegActuator`], one
//! batch per tick.
use glam::{Vec2, Vec3};
use log::{debug, info, warn};

use crate::config::{MotionConfig, RobotConfig, NUM_LEGS};
use crate::gait::scheduler::GaitScheduler;
use crate::gait::GaitKind;
use crate::locomotion::{ControlInput, LegTrajectory, LocomotionSolver};
use crate::robot::joint::JointAngles;
use crate::robot::leg::{Leg, LegIndex};

/// Sink for joint angles. Writes between `begin_batch` and `commit_batch` belong together and
/// are applied as one group, interpolated over `duration_ms`.
pub trait LegActuator {
    fn begin_batch(&mut self);
    fn write_leg(&mut self, leg: LegIndex, angles: JointAngles);
    fn commit_batch(&mut self, duration_ms: u32);
}

/// Outcome of one [`Mover::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub gait: GaitKind,
    pub time: f32,
    pub velocity: f32,
    /// Legs whose target was out of reach this tick and got the clamped pose instead.
    pub unreachable: [bool; NUM_LEGS],
}

#[derive(Debug, Clone)]
pub struct Mover {
    legs: [Leg; NUM_LEGS],
    trajectories: [LegTrajectory; NUM_LEGS],
    locomotion: LocomotionSolver,
    scheduler: GaitScheduler,
    motion: MotionConfig,
    time: f32,
    enabled: bool,
}

/// Solve and write one leg. Returns whether the target is out of reach, including a held one.
fn drive<A: LegActuator + ?Sized>(
    leg: &mut Leg,
    index: LegIndex,
    foot: Vec3,
    force: bool,
    actuator: &mut A,
) -> bool {
    match leg.set_position(foot, force) {
        Ok(Some(angles)) => {
            actuator.write_leg(index, angles);
            false
        }
        Ok(None) => leg.is_unreachable(),
        Err(e) => {
            let clamped = e.clamped();
            warn!("[MOVER] {index}: {e}, driving {clamped}");
            actuator.write_leg(index, clamped);
            true
        }
    }
}

impl Mover {
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            legs: config.legs.map(|geometry| Leg::new(&geometry)),
            trajectories: config
                .legs
                .map(|geometry| LegTrajectory::new(&geometry, &config.motion)),
            locomotion: LocomotionSolver::new(&config.legs, &config.motion),
            scheduler: GaitScheduler::new(config.gait),
            motion: config.motion,
            time: 0.0,
            enabled: true,
        }
    }

    /// Store the command for the next ticks. Ignored while locomotion is disabled.
    pub fn set_control(&mut self, control: &ControlInput) {
        if self.enabled {
            self.locomotion.set_control(control);
        }
    }

    pub fn control(&self) -> ControlInput {
        self.locomotion.control()
    }

    pub fn set_body_normal(&mut self, normal: Vec3) {
        self.locomotion.set_body_normal(normal);
    }

    /// Gait clock, in gait time units.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn gait(&self) -> GaitKind {
        self.scheduler.kind()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Last commanded foot position of `leg`, leg-local frame.
    pub fn leg_position(&self, leg: LegIndex) -> Vec3 {
        self.legs[leg].position()
    }

    pub fn leg_angles(&self, leg: LegIndex) -> Option<JointAngles> {
        self.legs[leg].angles()
    }

    /// Run one control tick of `dt` seconds.
    pub fn update<A: LegActuator + ?Sized>(&mut self, dt: f32, actuator: &mut A) -> TickReport {
        let velocity = self.locomotion.velocity();
        let mut unreachable = [false; NUM_LEGS];

        if !self.enabled {
            return TickReport {
                gait: self.scheduler.kind(),
                time: self.time,
                velocity,
                unreachable,
            };
        }

        let dt = dt.max(0.0);
        let speed = (self.motion.speed_multiplier * velocity).max(self.motion.min_timeshift);
        self.time += speed * dt;
        let t = self.time;

        let gait = self.scheduler.query(velocity, t);

        actuator.begin_batch();
        for leg in LegIndex::all() {
            let (stride, elevation) = self.locomotion.evaluate(leg);
            let trajectory = &mut self.trajectories[leg];
            trajectory.set_targets(stride, elevation);
            trajectory.step();
            let foot = trajectory.evaluate(gait.evaluate(leg, t));
            unreachable[leg] = drive(&mut self.legs[leg], leg, foot, false, actuator);
        }
        actuator.commit_batch((dt * 1000.0 + 0.5) as u32);

        let gait = gait.kind();
        debug!("[MOVER] t={t} v={velocity} gait={gait}");

        TickReport {
            gait,
            time: t,
            velocity,
            unreachable,
        }
    }

    /// Switch between gait-driven walking and manual leg placement. Either way every leg is
    /// re-centred with a forced write.
    pub fn enable_locomotion<A: LegActuator + ?Sized>(&mut self, enabled: bool, actuator: &mut A) {
        if enabled != self.enabled {
            info!(
                "[MOVER] locomotion {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        self.enabled = enabled;
        if !enabled {
            self.locomotion.set_control(&ControlInput::default());
        }

        actuator.begin_batch();
        for leg in LegIndex::all() {
            let foot = self.trajectories[leg].center();
            drive(&mut self.legs[leg], leg, foot, true, actuator);
        }
        actuator.commit_batch(self.motion.manual_move_ms);
    }

    /// Place `leg` at its centre shifted by `offset` (leg-local x/y, centre height). Only
    /// while locomotion is disabled; returns whether the move was made.
    pub fn move_leg<A: LegActuator + ?Sized>(
        &mut self,
        leg: LegIndex,
        offset: Vec2,
        actuator: &mut A,
    ) -> bool {
        if self.enabled {
            warn!("[MOVER] {leg}: manual move refused while walking");
            return false;
        }

        let target = self.legs[leg].center() + offset.extend(0.0);
        let foot = self.trajectories[leg].move_to(target);
        self.drive_single(leg, foot, actuator);
        true
    }

    pub fn center_leg<A: LegActuator + ?Sized>(&mut self, leg: LegIndex, actuator: &mut A) {
        let foot = self.trajectories[leg].center();
        self.drive_single(leg, foot, actuator);
    }

    fn drive_single<A: LegActuator + ?Sized>(&mut self, leg: LegIndex, foot: Vec3, actuator: &mut A) {
        actuator.begin_batch();
        drive(&mut self.legs[leg], leg, foot, true, actuator);
        actuator.commit_batch(self.motion.manual_move_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MANUAL_MOVE_MS;

    const DT: f32 = 0.02;
    const CENTERED: JointAngles = JointAngles::new(90, 90, 90);

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Event {
        Begin,
        Write(LegIndex, JointAngles),
        Commit(u32),
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
    }

    impl Recorder {
        fn writes(&self) -> usize {
            self.events
                .iter()
                .filter(|e| matches!(e, Event::Write(..)))
                .count()
        }
    }

    impl LegActuator for Recorder {
        fn begin_batch(&mut self) {
            self.events.push(Event::Begin);
        }

        fn write_leg(&mut self, leg: LegIndex, angles: JointAngles) {
            self.events.push(Event::Write(leg, angles));
        }

        fn commit_batch(&mut self, duration_ms: u32) {
            self.events.push(Event::Commit(duration_ms));
        }
    }

    fn mover() -> Mover {
        Mover::new(&RobotConfig::new())
    }

    #[test]
    fn first_tick_writes_every_leg_in_one_batch() {
        let mut m = mover();
        let mut rec = Recorder::default();
        let report = m.update(DT, &mut rec);

        assert_eq!(report.gait, GaitKind::Idle);
        assert_eq!(rec.events.len(), NUM_LEGS + 2);
        assert_eq!(rec.events[0], Event::Begin);
        for (i, leg) in LegIndex::all().enumerate() {
            assert_eq!(rec.events[i + 1], Event::Write(leg, CENTERED));
        }
        assert_eq!(rec.events[NUM_LEGS + 1], Event::Commit(20));
    }

    #[test]
    fn standing_still_skips_unchanged_legs() {
        let mut m = mover();
        let mut rec = Recorder::default();
        m.update(DT, &mut rec);
        rec.events.clear();

        m.update(DT, &mut rec);
        assert_eq!(rec.events, vec![Event::Begin, Event::Commit(20)]);
    }

    #[test]
    fn clock_scales_with_speed_and_never_regresses() {
        let mut m = mover();
        let mut rec = Recorder::default();

        m.update(DT, &mut rec);
        assert!((m.time() - 0.5 * DT).abs() < 1e-6);

        m.set_control(&ControlInput::new(0.0, 0.0, 1.0, 0.0));
        let before = m.time();
        m.update(DT, &mut rec);
        assert!((m.time() - before - 5.0 * DT).abs() < 1e-6);

        let before = m.time();
        let report = m.update(-1.0, &mut rec);
        assert_eq!(report.time, before);
        assert_eq!(rec.events.last(), Some(&Event::Commit(0)));
    }

    #[test]
    fn full_speed_blends_into_tripod() {
        let mut m = mover();
        let mut rec = Recorder::default();
        m.set_control(&ControlInput::new(0.0, 0.0, 1.0, 0.0));

        let mut gaits = Vec::new();
        for _ in 0..40 {
            let report = m.update(DT, &mut rec);
            assert_eq!(report.velocity, 1.0);
            if gaits.last() != Some(&report.gait) {
                gaits.push(report.gait);
            }
        }
        assert_eq!(gaits, vec![GaitKind::Mixer, GaitKind::Tripod]);
    }

    #[test]
    fn slowing_down_blends_without_foot_jumps() {
        let mut m = mover();
        let mut rec = Recorder::default();
        let feet = |m: &Mover| LegIndex::all().map(|leg| m.leg_position(leg)).collect::<Vec<_>>();

        m.set_control(&ControlInput::new(0.0, 0.0, 1.0, 0.0));
        for _ in 0..300 {
            m.update(DT, &mut rec);
        }
        assert_eq!(m.gait(), GaitKind::Tripod);

        m.set_control(&ControlInput::new(0.0, 0.0, 0.7, 0.0));
        let mut gaits = Vec::new();
        let mut last = feet(&m);
        for _ in 0..300 {
            let report = m.update(DT, &mut rec);
            if gaits.last() != Some(&report.gait) {
                gaits.push(report.gait);
            }
            let now = feet(&m);
            for (leg, (a, b)) in LegIndex::all().zip(last.iter().zip(&now)) {
                let moved = (*b - *a).length();
                assert!(moved < 16.0, "{leg} t={}: moved {moved}", report.time);
            }
            last = now;
        }
        assert_eq!(gaits, vec![GaitKind::Mixer, GaitKind::Ripple]);
    }

    #[test]
    fn unreachable_height_is_flagged_and_clamped() {
        let mut m = mover();
        let mut rec = Recorder::default();
        m.set_control(&ControlInput::new(1.0, 0.0, 0.0, 0.0));

        let mut report = m.update(DT, &mut rec);
        for _ in 0..9 {
            report = m.update(DT, &mut rec);
        }
        assert_eq!(report.unreachable, [true; NUM_LEGS]);
        for leg in LegIndex::all() {
            assert!(m.leg_angles(leg).is_some());
        }
    }

    #[test]
    fn held_unreachable_height_stays_flagged() {
        let mut m = mover();
        let mut rec = Recorder::default();
        m.set_control(&ControlInput::new(1.0, 0.0, 0.0, 0.0));

        for _ in 0..200 {
            m.update(DT, &mut rec);
        }
        // the foot has long settled, so nothing is solved or written any more
        rec.events.clear();
        let report = m.update(DT, &mut rec);
        assert_eq!(rec.writes(), 0);
        assert_eq!(report.unreachable, [true; NUM_LEGS]);
    }

    #[test]
    fn disabled_locomotion_ignores_commands() {
        let mut m = mover();
        let mut rec = Recorder::default();
        m.enable_locomotion(false, &mut rec);

        assert_eq!(rec.events.first(), Some(&Event::Begin));
        assert_eq!(rec.events.last(), Some(&Event::Commit(MANUAL_MOVE_MS)));
        assert_eq!(rec.writes(), NUM_LEGS);
        rec.events.clear();

        m.set_control(&ControlInput::new(0.0, 0.0, 1.0, 0.0));
        assert_eq!(m.control(), ControlInput::default());
        let report = m.update(DT, &mut rec);
        assert!(rec.events.is_empty());
        assert_eq!(report.time, 0.0);
    }

    #[test]
    fn manual_moves_only_while_disabled() {
        let mut m = mover();
        let mut rec = Recorder::default();
        let leg = LegIndex::new(0).unwrap();

        assert!(!m.move_leg(leg, Vec2::new(10.0, 0.0), &mut rec));
        assert!(rec.events.is_empty());

        m.enable_locomotion(false, &mut rec);
        rec.events.clear();

        assert!(m.move_leg(leg, Vec2::new(10.0, 5.0), &mut rec));
        assert_eq!(m.leg_position(leg), Vec3::new(93.0, 5.0, -80.0));
        assert_eq!(rec.events.len(), 3);
        assert!(matches!(rec.events[1], Event::Write(l, a) if l == leg && a != CENTERED));
        rec.events.clear();

        // forced: the same spot is written again
        m.center_leg(leg, &mut rec);
        m.center_leg(leg, &mut rec);
        assert_eq!(
            rec.events,
            vec![
                Event::Begin,
                Event::Write(leg, CENTERED),
                Event::Commit(MANUAL_MOVE_MS),
                Event::Begin,
                Event::Write(leg, CENTERED),
                Event::Commit(MANUAL_MOVE_MS),
            ]
        );
    }

    #[test]
    fn re_enabling_resumes_from_idle() {
        let mut m = mover();
        let mut rec = Recorder::default();
        m.enable_locomotion(false, &mut rec);
        m.enable_locomotion(true, &mut rec);
        assert!(m.is_enabled());

        m.set_control(&ControlInput::new(0.0, 0.0, 0.3, 0.0));
        let report = m.update(DT, &mut rec);
        assert_eq!(report.gait, GaitKind::Mixer);
        assert!(report.time > 0.0);
    }
}
