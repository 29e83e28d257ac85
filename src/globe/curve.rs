//! Bulging quadratic connectors between two points on the globe

use super::data::MapPoint;
use super::math::Vec3;
use super::projection::Projector;
use crate::error::GlobeError;

/// How far the control point is pushed out, relative to chord²/|mid|²
const BULGE: f64 = 0.7;

/// Below this fraction of radius² the bulge direction is undefined
const MIN_MID_FRACTION: f64 = 1e-6;

/// Control point never lies farther than this many radii from the centre
const MAX_LIFT: f64 = 3.0;

/// Control points of a quadratic Bézier over the sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveControls {
    pub start: Vec3,
    pub mid: Vec3,
    pub end: Vec3,
}

impl CurveControls {
    pub fn point_at(&self, t: f64) -> Vec3 {
        let u = 1.0 - t;
        self.start * (u * u) + self.mid * (2.0 * u * t) + self.end * (t * t)
    }

    /// `segments + 1` evenly spaced points in t, endpoints included exactly
    pub fn sample(&self, segments: usize) -> Vec<Vec3> {
        if segments == 0 {
            return vec![self.start];
        }
        let mut points = Vec::with_capacity(segments + 1);
        points.push(self.start);
        for i in 1..segments {
            points.push(self.point_at(i as f64 / segments as f64));
        }
        points.push(self.end);
        points
    }
}

/// Builds connector curves for one globe
#[derive(Debug, Clone, Copy)]
pub struct CurveBuilder {
    projector: Projector,
}

impl CurveBuilder {
    pub fn new(projector: Projector) -> Self {
        Self { projector }
    }

    /// Control points for the connector from `a` to `b`. The midpoint of the
    /// chord is pushed outwards by `1 + 0.7·d²/|m|²`, so distant pairs arc
    /// higher than close ones. Near-antipodal pairs are capped at
    /// `MAX_LIFT` radii.
    pub fn build(&self, a: MapPoint, b: MapPoint) -> Result<CurveControls, GlobeError> {
        let start = self.projector.project(a);
        let end = self.projector.project(b);
        let chord_mid = (start + end) * 0.5;

        let distance_sq = start.distance(end).powi(2);
        let mid_sq = chord_mid.length_squared();
        if mid_sq < self.projector.radius.powi(2) * MIN_MID_FRACTION {
            return Err(GlobeError::DegenerateCurve {
                from: format!("({}, {})", a.x, a.y),
                to: format!("({}, {})", b.x, b.y),
            });
        }

        let k = BULGE * distance_sq / mid_sq;
        let max_len = self.projector.radius * MAX_LIFT;
        let mid = if mid_sq * (1.0 + k).powi(2) > max_len * max_len {
            chord_mid.normalized() * max_len
        } else {
            chord_mid * (1.0 + k)
        };
        Ok(CurveControls { start, mid, end })
    }
}

/// A directed connector with its sampled path
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorCurve {
    pub origin: usize,
    pub destination: usize,
    pub controls: CurveControls,
    pub points: Vec<Vec3>,
}

impl ConnectorCurve {
    pub fn new(origin: usize, destination: usize, controls: CurveControls, segments: usize) -> Self {
        Self { origin, destination, controls, points: controls.sample(segments) }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
