//! Leg identifiers and the per-leg kinematic driver.
//!
//! [`LegIndex`] names one of the six legs and indexes every per-leg array in the crate.
//! [`Leg`] owns the inverse kinematics of a single leg and remembers the last position it was
//! sent to, so unchanged targets cost neither a solve nor a servo write.
use core::fmt::Display;
use core::ops::{Index, IndexMut};

use glam::Vec3;

use crate::config::{LegGeometry, F_TOLERANCE, LEG_CENTER, NUM_LEGS};
use crate::error::{KinematicsError, LegIndexError};
use crate::kinematics::solver::LegKinematics;
use crate::robot::joint::JointAngles;

const LEG_NAMES: [&str; NUM_LEGS] = [
    "Front right",
    "Front left",
    "Middle left",
    "Middle right",
    "Rear right",
    "Rear left",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LegIndex(u8);

impl LegIndex {
    pub const fn new(index: usize) -> Option<Self> {
        if index < NUM_LEGS {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    pub const fn get(self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = LegIndex> {
        (0..NUM_LEGS as u8).map(LegIndex)
    }

    pub fn name(self) -> &'static str {
        LEG_NAMES[self.get()]
    }
}

impl Display for LegIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<usize> for LegIndex {
    type Error = LegIndexError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        LegIndex::new(value).ok_or(LegIndexError::OutOfRange(value))
    }
}

impl<T> Index<LegIndex> for [T; NUM_LEGS] {
    type Output = T;

    fn index(&self, leg: LegIndex) -> &Self::Output {
        &self[leg.get()]
    }
}

impl<T> IndexMut<LegIndex> for [T; NUM_LEGS] {
    fn index_mut(&mut self, leg: LegIndex) -> &mut Self::Output {
        &mut self[leg.get()]
    }
}

/// Kinematic driver of one leg.
#[derive(Debug, Clone)]
pub struct Leg {
    kinematics: LegKinematics,
    position: Vec3,
    angles: Option<JointAngles>,
    unreachable: bool,
}

impl Leg {
    pub fn new(geometry: &LegGeometry) -> Self {
        Self {
            kinematics: LegKinematics::new(geometry.inverted, geometry.trims),
            position: LEG_CENTER,
            angles: None,
            unreachable: false,
        }
    }

    /// Last commanded foot position in the leg-local frame.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Angles of the last successful or clamped solve, if the leg was ever driven.
    pub fn angles(&self) -> Option<JointAngles> {
        self.angles
    }

    /// Whether the current position is out of reach and held at the clamped pose.
    pub fn is_unreachable(&self) -> bool {
        self.unreachable
    }

    pub fn center(&self) -> Vec3 {
        LEG_CENTER
    }

    /// Solve for `value`. Returns `Ok(None)` when the leg is already there and `force` is off.
    ///
    /// An unreachable target still becomes the leg position; the clamped angles are remembered
    /// and returned inside the error so the caller can decide whether to drive them.
    pub fn set_position(
        &mut self,
        value: Vec3,
        force: bool,
    ) -> Result<Option<JointAngles>, KinematicsError> {
        if !force && self.angles.is_some() && self.position.abs_diff_eq(value, F_TOLERANCE) {
            return Ok(None);
        }
        self.position = value;

        let solved = self.kinematics.solve(value);
        self.unreachable = solved.is_err();
        match solved {
            Ok(angles) => {
                self.angles = Some(angles);
                Ok(Some(angles))
            }
            Err(e) => {
                self.angles = Some(e.clamped());
                Err(e)
            }
        }
    }
}
