//! Tolerance square centered on a rounding-grid point.
//!
//! A segment that intersects a hot pixel's tolerance square is snapped to
//! pass exactly through the pixel's grid point. Pixels are transient: one
//! per candidate rounding point, used within a single pass, then discarded.

use crate::error::{GeometryError, Result};
use crate::noding::NodedSegmentString;
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::Line;
use geo_types::{Coord, Rect};

/// Expansion applied to the tolerance square (in scaled units, divided by
/// the scale factor) to form the envelope used for broad-phase rejection.
const SAFE_ENVELOPE_EXPANSION: f64 = 0.75;

pub struct HotPixel {
    /// The grid point in original (unscaled) coordinates; this is what gets
    /// inserted as a node.
    original: Coord<f64>,
    /// Working center: the original pre-scaled by rounding when the scale
    /// factor is not 1.
    center: Coord<f64>,
    scale_factor: f64,
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    /// Tolerance square corners: [top-right, top-left, bottom-left,
    /// bottom-right].
    corners: [Coord<f64>; 4],
}

impl HotPixel {
    pub fn new(center: Coord<f64>, scale_factor: f64) -> Result<Self> {
        if !(scale_factor > 0.0) {
            return Err(GeometryError::Configuration(format!(
                "scale factor must be positive, got {}",
                scale_factor
            )));
        }
        let scaled = if scale_factor == 1.0 {
            center
        } else {
            scale_round(center, scale_factor)
        };
        let min_x = scaled.x - 0.5;
        let max_x = scaled.x + 0.5;
        let min_y = scaled.y - 0.5;
        let max_y = scaled.y + 0.5;
        Ok(Self {
            original: center,
            center: scaled,
            scale_factor,
            min_x,
            min_y,
            max_x,
            max_y,
            corners: [
                Coord { x: max_x, y: max_y },
                Coord { x: min_x, y: max_y },
                Coord { x: min_x, y: min_y },
                Coord { x: max_x, y: min_y },
            ],
        })
    }

    /// The coordinate a snapped segment is noded at.
    pub fn coordinate(&self) -> Coord<f64> {
        self.original
    }

    /// Envelope guaranteed to contain everything the pixel can snap, in
    /// original coordinates. Cheap broad-phase rejection only; the answer
    /// is conservative.
    pub fn safe_envelope(&self) -> Rect<f64> {
        let safe = SAFE_ENVELOPE_EXPANSION / self.scale_factor;
        Rect::new(
            Coord {
                x: self.original.x - safe,
                y: self.original.y - safe,
            },
            Coord {
                x: self.original.x + safe,
                y: self.original.y + safe,
            },
        )
    }

    /// Whether the segment `p0 -> p1` (in original coordinates) intersects
    /// this pixel's tolerance square.
    pub fn intersects(&self, p0: Coord<f64>, p1: Coord<f64>) -> bool {
        if self.scale_factor == 1.0 {
            self.intersects_scaled(p0, p1)
        } else {
            self.intersects_scaled(
                scale_round(p0, self.scale_factor),
                scale_round(p1, self.scale_factor),
            )
        }
    }

    fn intersects_scaled(&self, p0: Coord<f64>, p1: Coord<f64>) -> bool {
        let seg_min_x = p0.x.min(p1.x);
        let seg_max_x = p0.x.max(p1.x);
        let seg_min_y = p0.y.min(p1.y);
        let seg_max_y = p0.y.max(p1.y);

        let outside = self.max_x < seg_min_x
            || self.min_x > seg_max_x
            || self.max_y < seg_min_y
            || self.min_y > seg_max_y;
        if outside {
            return false;
        }
        self.intersects_tolerance_square(p0, p1)
    }

    /// Tests the segment against the tolerance square with the asymmetric
    /// edge treatment required for pixels to partition the plane: a proper
    /// intersection with any side counts, touching both the left and the
    /// bottom side counts (the bottom-left corner case), the top and right
    /// sides are otherwise excluded.
    fn intersects_tolerance_square(&self, p0: Coord<f64>, p1: Coord<f64>) -> bool {
        let seg = Line::new(p0, p1);
        let mut intersects_left = false;
        let mut intersects_bottom = false;

        // Top side.
        if is_proper(line_intersection(seg, Line::new(self.corners[0], self.corners[1]))) {
            return true;
        }
        // Left side.
        match line_intersection(seg, Line::new(self.corners[1], self.corners[2])) {
            Some(LineIntersection::SinglePoint { is_proper: true, .. }) => return true,
            Some(_) => intersects_left = true,
            None => {}
        }
        // Bottom side.
        match line_intersection(seg, Line::new(self.corners[2], self.corners[3])) {
            Some(LineIntersection::SinglePoint { is_proper: true, .. }) => return true,
            Some(_) => intersects_bottom = true,
            None => {}
        }
        // Right side.
        if is_proper(line_intersection(seg, Line::new(self.corners[3], self.corners[0]))) {
            return true;
        }

        if intersects_left && intersects_bottom {
            return true;
        }
        if p0 == self.center || p1 == self.center {
            return true;
        }
        false
    }

    /// Inserts this pixel's grid point as a node on the segment at
    /// `seg_index` if the segment intersects the pixel. Returns whether a
    /// node was added.
    pub fn add_snapped_node(&self, ss: &mut NodedSegmentString, seg_index: usize) -> bool {
        let coords = ss.coordinates();
        let p0 = coords[seg_index];
        let p1 = coords[seg_index + 1];
        if self.intersects(p0, p1) {
            ss.add_intersection(self.original, seg_index);
            return true;
        }
        false
    }
}

fn scale_round(p: Coord<f64>, scale_factor: f64) -> Coord<f64> {
    Coord {
        x: (p.x * scale_factor).round(),
        y: (p.y * scale_factor).round(),
    }
}

fn is_proper(intersection: Option<LineIntersection<f64>>) -> bool {
    matches!(
        intersection,
        Some(LineIntersection::SinglePoint { is_proper: true, .. })
    )
}
