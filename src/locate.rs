//! Point-in-area location.
//!
//! Two interchangeable strategies classify a point as `Interior` or
//! `Exterior` to a polygonal area. Neither reports a boundary location:
//! results are only guaranteed correct for points not exactly on a ring
//! boundary. This is the inherited contract, not a defect.

use crate::index::IntervalIndex;
use geo::bounding_rect::BoundingRect;
use geo::Line;
use geo_types::{Coord, LineString, MultiPolygon, Polygon};

/// Topological position of a point relative to an area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    Interior,
    Exterior,
}

/// Exact-sign orientation of `c` relative to the directed line `a -> b`.
/// Positive means counterclockwise (c lies to the left).
pub(crate) fn orient2d(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> f64 {
    robust::orient2d(
        robust::Coord { x: a.x, y: a.y },
        robust::Coord { x: b.x, y: b.y },
        robust::Coord { x: c.x, y: c.y },
    )
}

/// Counts crossings of a rightward horizontal ray from a query point with a
/// stream of segments. Odd parity means the point is inside the area whose
/// boundary the segments form.
pub struct RayCrossingCounter {
    point: Coord<f64>,
    crossing_count: usize,
}

impl RayCrossingCounter {
    pub fn new(point: Coord<f64>) -> Self {
        Self {
            point,
            crossing_count: 0,
        }
    }

    /// Counts the segment `p1 -> p2` if the ray properly crosses it.
    ///
    /// An endpoint lying exactly on the ray is counted only when the other
    /// endpoint lies strictly above it, so shared vertices between adjacent
    /// edges are never double-counted.
    pub fn count_segment(&mut self, p1: Coord<f64>, p2: Coord<f64>) {
        let p = self.point;

        // Entirely left of the point: the rightward ray cannot reach it.
        if p1.x < p.x && p2.x < p.x {
            return;
        }

        if (p1.y > p.y && p2.y <= p.y) || (p2.y > p.y && p1.y <= p.y) {
            let mut sign = orient2d(p1, p2, p);
            if sign == 0.0 {
                // Point on the segment's line: off-boundary contract, skip.
                return;
            }
            if p2.y < p1.y {
                sign = -sign;
            }
            if sign > 0.0 {
                self.crossing_count += 1;
            }
        }
    }

    pub fn is_inside(&self) -> bool {
        self.crossing_count % 2 == 1
    }

    pub fn location(&self) -> Location {
        if self.is_inside() {
            Location::Interior
        } else {
            Location::Exterior
        }
    }
}

/// Direct O(n)-per-query strategy. Suitable for one-off queries; for
/// repeated queries against the same area use [`IndexedPointInAreaLocator`].
pub struct SimplePointInAreaLocator;

impl SimplePointInAreaLocator {
    pub fn locate(point: Coord<f64>, area: &MultiPolygon<f64>) -> Location {
        for polygon in &area.0 {
            if Self::locate_in_polygon(point, polygon) == Location::Interior {
                return Location::Interior;
            }
        }
        Location::Exterior
    }

    /// A point inside the shell and inside zero holes is Interior; inside
    /// the shell and inside one or more holes is Exterior. An empty area is
    /// always Exterior.
    pub fn locate_in_polygon(point: Coord<f64>, polygon: &Polygon<f64>) -> Location {
        if polygon.exterior().0.is_empty() {
            return Location::Exterior;
        }
        if !Self::is_in_ring(point, polygon.exterior()) {
            return Location::Exterior;
        }
        for hole in polygon.interiors() {
            if Self::is_in_ring(point, hole) {
                return Location::Exterior;
            }
        }
        Location::Interior
    }

    pub(crate) fn is_in_ring(point: Coord<f64>, ring: &LineString<f64>) -> bool {
        match ring.bounding_rect() {
            Some(bbox) => {
                if point.x < bbox.min().x
                    || point.x > bbox.max().x
                    || point.y < bbox.min().y
                    || point.y > bbox.max().y
                {
                    return false;
                }
            }
            None => return false,
        }

        let mut counter = RayCrossingCounter::new(point);
        for line in ring.lines() {
            counter.count_segment(line.start, line.end);
        }
        counter.is_inside()
    }
}

/// Indexed strategy: precomputes an [`IntervalIndex`] over every boundary
/// edge keyed by its Y-extent, turning repeated location against the same
/// area into O(log n + k) per query.
///
/// The locator is a caller-owned value. Build it once and pass it alongside
/// the geometry to every call site; there is no hidden per-geometry cache.
/// Once built it is immutable and may be queried concurrently.
pub struct IndexedPointInAreaLocator {
    index: IntervalIndex<Line<f64>>,
}

impl IndexedPointInAreaLocator {
    pub fn new(area: &MultiPolygon<f64>) -> Self {
        let mut edges = Vec::new();
        for polygon in &area.0 {
            Self::collect_edges(polygon, &mut edges);
        }
        Self {
            index: IntervalIndex::build(edges),
        }
    }

    pub fn from_polygon(polygon: &Polygon<f64>) -> Self {
        let mut edges = Vec::new();
        Self::collect_edges(polygon, &mut edges);
        Self {
            index: IntervalIndex::build(edges),
        }
    }

    fn collect_edges(polygon: &Polygon<f64>, edges: &mut Vec<(f64, f64, Line<f64>)>) {
        let mut add_ring = |ring: &LineString<f64>| {
            for line in ring.lines() {
                let (ymin, ymax) = if line.start.y <= line.end.y {
                    (line.start.y, line.end.y)
                } else {
                    (line.end.y, line.start.y)
                };
                edges.push((ymin, ymax, line));
            }
        };
        add_ring(polygon.exterior());
        for hole in polygon.interiors() {
            add_ring(hole);
        }
    }

    /// Ray-crossing parity over the candidate edges spanning the query Y.
    /// Parity over all rings (shells and holes alike) yields the same
    /// result as the simple strategy for any valid area.
    pub fn locate(&self, point: Coord<f64>) -> Location {
        let mut counter = RayCrossingCounter::new(point);
        self.index.query(point.y, point.y, |line| {
            counter.count_segment(line.start, line.end);
        });
        counter.location()
    }
}

#[cfg(test)]
#[path = "locate_tests.rs"]
mod tests;
