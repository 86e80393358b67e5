//! Edge curve geometry.

use crate::graph::Direction;

/// Cubic bezier curve used for every rendered edge
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub p0: (f32, f32), // Start point
    pub p1: (f32, f32), // Control point 1
    pub p2: (f32, f32), // Control point 2
    pub p3: (f32, f32), // End point
}

impl CubicBezier {
    /// Route a horizontal curve between two connector centers.
    ///
    /// `start_direction` is the direction of the connector at `start`. Control
    /// points sit `rigidity` units to the right of an output and to the left
    /// of an input, so the curve always leaves each connector outward:
    ///
    /// * origin is an output: `p1 = start + (H, 0)`, `p2 = end - (H, 0)`
    /// * origin is an input: `p1 = start - (H, 0)`, `p2 = end + (H, 0)`
    ///
    /// # Arguments
    /// * `start` - Center of the origin connector
    /// * `end` - Center of the other connector, or the pointer while drawing
    /// * `start_direction` - Direction of the origin connector
    /// * `rigidity` - Horizontal control point offset (H)
    pub fn route(
        start: (f32, f32),
        end: (f32, f32),
        start_direction: Direction,
        rigidity: f32,
    ) -> Self {
        let h = match start_direction {
            Direction::Output => rigidity,
            Direction::Input => -rigidity,
        };
        CubicBezier {
            p0: start,
            p1: (start.0 + h, start.1),
            p2: (end.0 - h, end.1),
            p3: end,
        }
    }

    /// Evaluate the bezier curve at parameter t (0.0 to 1.0)
    pub fn eval(&self, t: f32) -> (f32, f32) {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = mt3 * self.p0.0
            + 3.0 * mt2 * t * self.p1.0
            + 3.0 * mt * t2 * self.p2.0
            + t3 * self.p3.0;
        let y = mt3 * self.p0.1
            + 3.0 * mt2 * t * self.p1.1
            + 3.0 * mt * t2 * self.p2.1
            + t3 * self.p3.1;

        (x, y)
    }

    /// SVG path command for this curve (e.g., "M 10 20 C 70 20 40 80 100 80")
    pub fn to_svg_path(&self) -> String {
        format!(
            "M {} {} C {} {} {} {} {} {}",
            self.p0.0, self.p0.1, self.p1.0, self.p1.1, self.p2.0, self.p2.1, self.p3.0, self.p3.1
        )
    }
}

/// Calculate squared distance from a point to a line segment
fn distance_to_line_segment_sq(point: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let ab = (b.0 - a.0, b.1 - a.1);
    let ap = (point.0 - a.0, point.1 - a.1);

    let ab_len_sq = ab.0 * ab.0 + ab.1 * ab.1;

    if ab_len_sq < f32::EPSILON {
        return ap.0 * ap.0 + ap.1 * ap.1;
    }

    // Project onto the segment, clamped to its ends
    let t = ((ap.0 * ab.0 + ap.1 * ab.1) / ab_len_sq).clamp(0.0, 1.0);
    let closest = (a.0 + t * ab.0, a.1 + t * ab.1);

    let dx = point.0 - closest.0;
    let dy = point.1 - closest.1;
    dx * dx + dy * dy
}

/// Calculate the minimum distance from a point to a cubic bezier curve
///
/// The curve is flattened into `num_samples` line segments (20 if zero).
pub fn distance_to_bezier(point: (f32, f32), bezier: &CubicBezier, num_samples: usize) -> f32 {
    let num_samples = if num_samples == 0 { 20 } else { num_samples };

    let mut min_dist_sq = f32::MAX;
    let mut prev_point = bezier.eval(0.0);

    for i in 1..=num_samples {
        let t = i as f32 / num_samples as f32;
        let curr_point = bezier.eval(t);
        min_dist_sq = min_dist_sq.min(distance_to_line_segment_sq(point, prev_point, curr_point));
        prev_point = curr_point;
    }

    min_dist_sq.sqrt()
}
