//! Linear segments and the short polylines the gait mixer is built from.
//!
//! A [`Segment`] is a line over time, defined either by two points or by a slope through one
//! point, optionally trimmed to a time domain. [`BlendCurve`] chains up to three trimmed
//! segments and evaluates whichever one covers the requested time.
use heapless::Vec;
#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::F_TOLERANCE;

pub const MAX_SEGMENTS: usize = 3;
const _: () = assert!(MAX_SEGMENTS >= 2);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Line {
    TwoPoints { v0: f32, v1: f32, t0: f32, t1: f32 },
    Slope { slope: f32, v0: f32, t0: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    line: Line,
    domain: Option<(f32, f32)>,
}

fn lerp(v0: f32, v1: f32, t0: f32, t1: f32, t: f32) -> f32 {
    (v0 * (t1 - t) + v1 * (t - t0)) / (t1 - t0)
}

impl Segment {
    /// Line from `(t0, v0)` to `(t1, v1)`, trimmed to `[t0, t1]`.
    pub fn between(v0: f32, v1: f32, t0: f32, t1: f32) -> Self {
        let mut segment = Self {
            line: Line::TwoPoints { v0, v1, t0, t1 },
            domain: None,
        };
        segment.trim(t0, t1);
        segment
    }

    /// Untrimmed line of `slope` passing through `(t0, v0)`.
    pub fn through(slope: f32, v0: f32, t0: f32) -> Self {
        Self {
            line: Line::Slope { slope, v0, t0 },
            domain: None,
        }
    }

    pub fn trim(&mut self, t0: f32, t1: f32) {
        self.domain = Some((t0.min(t1), t0.max(t1)));
    }

    pub fn trimmed(mut self, t0: f32, t1: f32) -> Self {
        self.trim(t0, t1);
        self
    }

    pub fn domain_min(&self) -> f32 {
        self.domain.map_or(f32::NEG_INFINITY, |(min, _)| min)
    }

    pub fn domain_max(&self) -> f32 {
        self.domain.map_or(f32::INFINITY, |(_, max)| max)
    }

    /// Value at `t`, with `t` clamped into the domain of a trimmed segment.
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = match self.domain {
            Some((min, max)) => t.clamp(min, max),
            None => t,
        };

        match self.line {
            Line::TwoPoints { v0, v1, t0, t1 } => {
                if (t0 - t1).abs() > F_TOLERANCE {
                    lerp(v0, v1, t0, t1, t)
                } else {
                    v0
                }
            }
            Line::Slope { slope, v0, t0 } => slope * (t - t0) + v0,
        }
    }

    /// Time at which the line reaches `value`; `None` for a flat line.
    pub fn find_t(&self, value: f32) -> Option<f32> {
        match self.line {
            Line::TwoPoints { v0, v1, t0, t1 } => {
                ((v0 - v1).abs() > F_TOLERANCE).then(|| lerp(t0, t1, v0, v1, value))
            }
            Line::Slope { slope, v0, t0 } => {
                (slope.abs() > F_TOLERANCE).then(|| (value - v0) / slope + t0)
            }
        }
    }
}

/// Piecewise-linear curve of at most [`MAX_SEGMENTS`] trimmed segments, in time order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlendCurve {
    segments: Vec<Segment, MAX_SEGMENTS>,
}

impl BlendCurve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(segment: Segment) -> Self {
        Self::from_segments(&[segment])
    }

    /// A lead-in segment followed by the segment that lands on the target.
    pub fn pair(lead: Segment, tail: Segment) -> Self {
        Self::from_segments(&[lead, tail])
    }

    // at most two segments, see the capacity assertion next to MAX_SEGMENTS
    fn from_segments(segments: &[Segment]) -> Self {
        Self {
            segments: Vec::from_slice(segments).unwrap_or_default(),
        }
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Append a segment. A full curve keeps its segments and hands the new one back.
    pub fn push(&mut self, segment: Segment) -> Result<(), Segment> {
        self.segments.push(segment)
    }

    /// Value of the segment whose `[min, max)` domain contains `t`. Times outside every
    /// domain clamp to the nearest end of the curve.
    pub fn evaluate(&self, t: f32) -> f32 {
        let (Some(first), Some(last)) = (self.segments.first(), self.segments.last()) else {
            return 0.0;
        };

        if let Some(segment) = self
            .segments
            .iter()
            .find(|s| t >= s.domain_min() && t < s.domain_max())
        {
            return segment.evaluate(t);
        }

        if t < first.domain_min() {
            first.evaluate(first.domain_min())
        } else {
            last.evaluate(last.domain_max())
        }
    }
}
