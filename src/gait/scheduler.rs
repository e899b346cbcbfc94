//! Velocity-driven gait selection.
//!
//! The scheduler settles on one of the steady gaits and, whenever the commanded velocity calls
//! for another one, hands control to its [`GaitMixer`] for a fixed blend window. Switching up
//! and down uses different thresholds, and a gait has to run for a minimum time before it can
//! be left for another walking gait. Stopping (and starting from rest) is never delayed.
use log::info;

use crate::config::GaitConfig;
use crate::gait::mixer::GaitMixer;
use crate::gait::{ActiveGait, Gait, GaitKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Steady(Gait),
    Blending,
}

#[derive(Debug, Clone)]
pub struct GaitScheduler {
    config: GaitConfig,
    mode: Mode,
    mixer: GaitMixer,
    switched_at: f32,
}

impl GaitScheduler {
    /// Start at rest, at `t = 0`.
    pub fn new(config: GaitConfig) -> Self {
        Self {
            config,
            mode: Mode::Steady(Gait::Idle),
            mixer: GaitMixer::new(),
            switched_at: 0.0,
        }
    }

    pub fn kind(&self) -> GaitKind {
        self.active().kind()
    }

    /// Time spent in the current gait (or blend) as of `t`.
    pub fn uptime(&self, t: f32) -> f32 {
        t - self.switched_at
    }

    pub fn mixer(&self) -> &GaitMixer {
        &self.mixer
    }

    pub fn active(&self) -> ActiveGait<'_> {
        match self.mode {
            Mode::Steady(gait) => ActiveGait::Steady(gait),
            Mode::Blending => ActiveGait::Mixer(&self.mixer),
        }
    }

    /// Advance the state machine with the commanded `velocity` at time `t` and return the gait
    /// that drives the legs for this tick.
    pub fn query(&mut self, velocity: f32, t: f32) -> ActiveGait<'_> {
        match self.mode {
            Mode::Steady(gait) => {
                if let Some(next) = self.next_gait(gait, velocity, self.uptime(t)) {
                    self.begin_transition(gait, next, t);
                }
            }
            Mode::Blending => {
                if let Some(next) = self.mixer.next(t) {
                    info!("[GAIT] {next} gait started");
                    self.mode = Mode::Steady(next);
                    self.switched_at = t;
                }
            }
        }
        self.active()
    }

    /// Hand the legs to the mixer, blending `from` into `to` starting at `t`.
    pub fn begin_transition(&mut self, from: Gait, to: Gait, t: f32) {
        self.mixer
            .begin_transition(from, to, t, self.config.blend_duration);
        self.mode = Mode::Blending;
        self.switched_at = t;
    }

    fn next_gait(&self, current: Gait, velocity: f32, uptime: f32) -> Option<Gait> {
        let c = &self.config;
        let stopped = velocity <= c.wave_on_asc;
        let settled = uptime > c.min_uptime;

        match current {
            Gait::Idle if velocity > c.tripod_on_asc => Some(Gait::Tripod),
            Gait::Idle if velocity > c.ripple_on_asc => Some(Gait::Ripple),
            Gait::Idle if !stopped => Some(Gait::Wave),
            Gait::Idle => None,
            _ if stopped => Some(Gait::Idle),
            Gait::Wave if settled && velocity > c.tripod_on_asc => Some(Gait::Tripod),
            Gait::Wave if settled && velocity > c.ripple_on_asc => Some(Gait::Ripple),
            Gait::Ripple if settled && velocity > c.tripod_on_asc => Some(Gait::Tripod),
            Gait::Ripple if settled && velocity < c.wave_on_desc => Some(Gait::Wave),
            Gait::Tripod if settled && velocity < c.ripple_on_desc => Some(Gait::Ripple),
            _ => None,
        }
    }
}
