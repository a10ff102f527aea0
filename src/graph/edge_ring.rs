//! A closed walk of directed edges, materialized as a vertex ring.

use crate::error::{GeometryError, Result};
use crate::locate::RayCrossingCounter;
use geo::bounding_rect::BoundingRect;
use geo::Area;
use geo_types::{Coord, LineString, Polygon, Rect};
use std::collections::HashSet;

/// One polygon boundary ring produced by ring extraction. Immutable once
/// built.
#[derive(Clone, Debug)]
pub struct EdgeRing {
    ring: LineString<f64>,
    bbox: Rect<f64>,
    signed_area: f64,
    is_hole: bool,
}

impl EdgeRing {
    /// Validates and builds a ring from a closed vertex walk: first point
    /// equal to last, at least 4 points, at least 3 distinct vertices.
    pub fn try_new(coords: Vec<Coord<f64>>) -> Result<Self> {
        if coords.len() < 4 {
            return Err(GeometryError::InvalidGeometry(format!(
                "ring has {} points, a closed ring needs at least 4",
                coords.len()
            )));
        }
        if coords.first() != coords.last() {
            return Err(GeometryError::InvalidGeometry(
                "ring is not closed (first point != last point)".to_string(),
            ));
        }

        let mut distinct: Vec<(u64, u64)> = coords[..coords.len() - 1]
            .iter()
            .map(|c| (c.x.to_bits(), c.y.to_bits()))
            .collect();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() < 3 {
            return Err(GeometryError::InvalidGeometry(format!(
                "ring has only {} distinct vertices, needs at least 3",
                distinct.len()
            )));
        }

        let ring = LineString::new(coords);
        let bbox = ring
            .bounding_rect()
            .ok_or_else(|| GeometryError::InvalidGeometry("ring has no extent".to_string()))?;
        let signed_area = Polygon::new(ring.clone(), vec![]).signed_area();

        Ok(Self {
            ring,
            bbox,
            signed_area,
            // Counterclockwise rings bound a face from the inside.
            is_hole: signed_area > 0.0,
        })
    }

    pub fn ring(&self) -> &LineString<f64> {
        &self.ring
    }

    pub fn into_ring(self) -> LineString<f64> {
        self.ring
    }

    pub fn is_hole(&self) -> bool {
        self.is_hole
    }

    pub fn signed_area(&self) -> f64 {
        self.signed_area
    }

    pub fn bounding_box(&self) -> Rect<f64> {
        self.bbox
    }

    pub fn bbox_equals(&self, other: &EdgeRing) -> bool {
        self.bbox == other.bbox
    }

    pub fn bbox_covers(&self, other: &EdgeRing) -> bool {
        self.bbox.min().x <= other.bbox.min().x
            && self.bbox.max().x >= other.bbox.max().x
            && self.bbox.min().y <= other.bbox.min().y
            && self.bbox.max().y >= other.bbox.max().y
    }

    /// Point-in-ring by ray crossing, with a bounding-box short-circuit.
    /// Only reliable for points not exactly on the ring boundary.
    pub fn contains_point(&self, p: Coord<f64>) -> bool {
        if p.x < self.bbox.min().x
            || p.x > self.bbox.max().x
            || p.y < self.bbox.min().y
            || p.y > self.bbox.max().y
        {
            return false;
        }
        let mut counter = RayCrossingCounter::new(p);
        for line in self.ring.lines() {
            counter.count_segment(line.start, line.end);
        }
        counter.is_inside()
    }

    /// First vertex of this ring that is not a vertex of `other`, used to
    /// pick a containment test point that cannot lie on a shared boundary
    /// vertex.
    pub fn point_not_shared_with(&self, other: &EdgeRing) -> Option<Coord<f64>> {
        let other_vertices: HashSet<(u64, u64)> = other
            .ring
            .0
            .iter()
            .map(|c| (c.x.to_bits(), c.y.to_bits()))
            .collect();
        self.ring
            .0
            .iter()
            .find(|c| !other_vertices.contains(&(c.x.to_bits(), c.y.to_bits())))
            .copied()
    }
}
