//! Polyline geometry primitives used by the world builder and graph builder.
//!
//! All distances are planar: the `y` component is elevation kept for display
//! purposes only and never contributes to a distance or a mileage. Non-finite
//! inputs are treated as absent (zero-length) rather than propagated as NaN.

use serde::Serialize;

/// World coordinate. `y` is elevation and is display-only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Whether all three components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Distance in the ground plane, ignoring elevation.
    pub fn planar_distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Result of projecting a point onto a polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Along-polyline distance of the foot point.
    pub mileage: f64,
    /// Planar distance from the query point to the foot point.
    pub distance: f64,
}

/// Cumulative along-polyline distances, one per vertex.
///
/// `cum[0] == 0` and the sequence is monotonically non-decreasing. A segment
/// with a non-finite length contributes zero instead of poisoning the rest of
/// the array.
pub fn cumulative_distances(points: &[Point3]) -> Vec<f64> {
    let mut cum = Vec::with_capacity(points.len());
    let mut total = 0.0;
    for (index, point) in points.iter().enumerate() {
        if index > 0 {
            let step = points[index - 1].planar_distance(point);
            if step.is_finite() {
                total += step;
            }
        }
        cum.push(total);
    }
    cum
}

/// Project a point onto the closest segment of a polyline.
///
/// Returns `None` when the polyline has fewer than two vertices. Zero-length
/// segments are treated as their single vertex, never as a NaN fraction.
pub fn project_onto_polyline(point: &Point3, points: &[Point3], cum: &[f64]) -> Option<Projection> {
    if points.len() < 2 || cum.len() != points.len() {
        return None;
    }

    let mut best: Option<Projection> = None;
    for index in 0..points.len() - 1 {
        let a = points[index];
        let b = points[index + 1];
        let dx = b.x - a.x;
        let dz = b.z - a.z;
        let length_sq = dx * dx + dz * dz;

        let fraction = if length_sq > 0.0 {
            (((point.x - a.x) * dx + (point.z - a.z) * dz) / length_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let foot = Point3::new(a.x + dx * fraction, 0.0, a.z + dz * fraction);
        let distance = point.planar_distance(&foot);
        let mileage = cum[index] + (cum[index + 1] - cum[index]) * fraction;

        let better = match best {
            Some(current) => distance < current.distance,
            None => true,
        };
        if better {
            best = Some(Projection { mileage, distance });
        }
    }
    best
}

/// Interpolate the point at a given mileage along a polyline.
///
/// The mileage is clamped to `[0, total length]`. Returns `None` for
/// degenerate polylines with fewer than two vertices.
pub fn point_at_mileage(points: &[Point3], cum: &[f64], mileage: f64) -> Option<Point3> {
    if points.len() < 2 || cum.len() != points.len() {
        return None;
    }

    let total = *cum.last().unwrap_or(&0.0);
    let target = mileage.clamp(0.0, total);

    for index in 0..points.len() - 1 {
        if target <= cum[index + 1] || index == points.len() - 2 {
            let span = cum[index + 1] - cum[index];
            let fraction = if span > 0.0 {
                ((target - cum[index]) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let a = points[index];
            let b = points[index + 1];
            return Some(Point3::new(
                a.x + (b.x - a.x) * fraction,
                a.y + (b.y - a.y) * fraction,
                a.z + (b.z - a.z) * fraction,
            ));
        }
    }
    None
}

/// Slice a polyline between two mileages.
///
/// Both cut points are linearly interpolated; interior vertices strictly
/// between the cuts are included verbatim. The order of `a` and `b` does not
/// matter. A zero-length slice collapses to a single point.
pub fn slice_polyline(points: &[Point3], cum: &[f64], a: f64, b: f64) -> Vec<Point3> {
    let Some(start) = point_at_mileage(points, cum, a.min(b)) else {
        return Vec::new();
    };
    let Some(end) = point_at_mileage(points, cum, a.max(b)) else {
        return Vec::new();
    };
    let lo = a.min(b);
    let hi = a.max(b);

    let mut slice = vec![start];
    for (index, point) in points.iter().enumerate() {
        if cum[index] > lo && cum[index] < hi {
            push_unless_duplicate(&mut slice, *point);
        }
    }
    push_unless_duplicate(&mut slice, end);
    slice
}

/// Planar centroid of a vertex set; used for polygon building footprints.
pub fn centroid(points: &[Point3]) -> Option<Point3> {
    let finite: Vec<&Point3> = points.iter().filter(|p| p.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    let count = finite.len() as f64;
    let (x, y, z) = finite.iter().fold((0.0, 0.0, 0.0), |(x, y, z), p| {
        (x + p.x, y + p.y, z + p.z)
    });
    Some(Point3::new(x / count, y / count, z / count))
}

fn push_unless_duplicate(slice: &mut Vec<Point3>, point: Point3) {
    if slice.last() != Some(&point) {
        slice.push(point);
    }
}
