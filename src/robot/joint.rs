//! Joint enumeration, joint angle triples and trims.
//!
//! Defines the [`Joint`] enum for identifying each joint (coxa, femur, tibia), the
//! integer-degree [`JointAngles`] handed to the actuator, and the per-leg [`JointTrims`].
use core::fmt::Display;
use core::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joint {
    Coxa = 0,
    Femur = 1,
    Tibia = 2,
}

impl Joint {
    pub const ALL: [Joint; 3] = [Joint::Coxa, Joint::Femur, Joint::Tibia];
}

impl Display for Joint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Joint::Coxa => f.write_str("coxa"),
            Joint::Femur => f.write_str("femur"),
            Joint::Tibia => f.write_str("tibia"),
        }
    }
}

/// Servo angles of one leg in whole degrees, trims included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JointAngles {
    pub coxa: i16,
    pub femur: i16,
    pub tibia: i16,
}

impl JointAngles {
    pub const fn new(coxa: i16, femur: i16, tibia: i16) -> Self {
        Self { coxa, femur, tibia }
    }
}

impl Display for JointAngles {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.coxa, self.femur, self.tibia)
    }
}

impl Index<Joint> for JointAngles {
    type Output = i16;

    fn index(&self, joint: Joint) -> &Self::Output {
        match joint {
            Joint::Coxa => &self.coxa,
            Joint::Femur => &self.femur,
            Joint::Tibia => &self.tibia,
        }
    }
}

impl IndexMut<Joint> for JointAngles {
    fn index_mut(&mut self, joint: Joint) -> &mut Self::Output {
        match joint {
            Joint::Coxa => &mut self.coxa,
            Joint::Femur => &mut self.femur,
            Joint::Tibia => &mut self.tibia,
        }
    }
}

/// Per-joint calibration offsets in degrees, added after the kinematic solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JointTrims {
    pub coxa: i16,
    pub femur: i16,
    pub tibia: i16,
}
