//! Snap-rounding driver: combines the 1-D interval index (broad phase) with
//! hot pixels (narrow phase) to inject intersection nodes into segment
//! strings.
//!
//! The pass mutates shared segment-string state, so it runs single-threaded
//! over the whole input. Pixels and candidate segments are processed in a
//! stable sorted order so that identical inputs always produce identical
//! node insertion order.

use crate::error::{GeometryError, Result};
use crate::index::IntervalIndex;
use crate::noding::{HotPixel, NodedSegmentString};
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::Line;
use geo_types::Coord;
use log::debug;
use rstar::{RTree, RTreeObject, AABB};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

#[derive(Clone, Copy)]
struct IndexedSegment {
    line: Line<f64>,
    string_idx: usize,
    seg_idx: usize,
}

impl RTreeObject for IndexedSegment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let p0 = self.line.start;
        let p1 = self.line.end;
        AABB::from_corners(
            [p0.x.min(p1.x), p0.y.min(p1.y)],
            [p0.x.max(p1.x), p0.y.max(p1.y)],
        )
    }
}

pub struct SnapRoundingNoder {
    scale_factor: f64,
    cancel: Option<Arc<AtomicBool>>,
}

impl SnapRoundingNoder {
    /// `scale_factor` maps real coordinates to the integer rounding grid;
    /// it is validated when [`node`](Self::node) runs.
    pub fn new(scale_factor: f64) -> Self {
        Self {
            scale_factor,
            cancel: None,
        }
    }

    /// Installs a flag checked between coarse-grained phases; setting it
    /// aborts the run with [`GeometryError::Cancelled`] and no partial
    /// output.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn check_cancel(&self) -> Result<()> {
        if let Some(flag) = &self.cancel {
            if flag.load(AtomicOrdering::Relaxed) {
                return Err(GeometryError::Cancelled);
            }
        }
        Ok(())
    }

    /// Nodes the input segment strings: every segment passing through a hot
    /// pixel (derived from a rounded interior intersection or a rounded
    /// original vertex) gains a node at that pixel's grid point. Input
    /// vertices pass through unchanged; only inserted nodes lie on the grid.
    pub fn node(&self, inputs: Vec<Vec<Coord<f64>>>) -> Result<Vec<Vec<Coord<f64>>>> {
        if !(self.scale_factor > 0.0) {
            return Err(GeometryError::Configuration(format!(
                "snap-rounding scale factor must be positive, got {}",
                self.scale_factor
            )));
        }

        let mut strings: Vec<NodedSegmentString> =
            inputs.into_iter().map(NodedSegmentString::new).collect();

        let intersections = self.find_interior_intersections(&strings);
        self.check_cancel()?;

        let index = build_segment_index(&strings);
        self.check_cancel()?;

        let mut snapped = 0;
        for &pt in &intersections {
            let pixel = HotPixel::new(pt, self.scale_factor)?;
            snapped += self.add_pixel_snaps(&pixel, None, &index, &mut strings)?;
        }
        self.check_cancel()?;

        // Hot pixels from original vertices, rounded to the grid, in input
        // order. A vertex never re-nodes the two segments incident to it in
        // its own string.
        let vertices: Vec<Vec<Coord<f64>>> = strings
            .iter()
            .map(|ss| ss.coordinates().to_vec())
            .collect();
        for (string_idx, verts) in vertices.iter().enumerate() {
            for (vertex_idx, &v) in verts.iter().enumerate() {
                let pixel = HotPixel::new(self.round(v), self.scale_factor)?;
                snapped +=
                    self.add_pixel_snaps(&pixel, Some((string_idx, vertex_idx)), &index, &mut strings)?;
            }
        }
        self.check_cancel()?;

        debug!(
            "snap rounding: {} interior intersections, {} nodes inserted across {} strings",
            intersections.len(),
            snapped,
            strings.len()
        );

        Ok(strings.iter().map(|ss| ss.noded_coordinates()).collect())
    }

    /// Proper intersections between all segment pairs, rounded to the grid,
    /// sorted and deduplicated for a stable pixel order.
    fn find_interior_intersections(&self, strings: &[NodedSegmentString]) -> Vec<Coord<f64>> {
        let mut segments = Vec::new();
        for (string_idx, ss) in strings.iter().enumerate() {
            let coords = ss.coordinates();
            for seg_idx in 0..ss.segment_count() {
                segments.push(IndexedSegment {
                    line: Line::new(coords[seg_idx], coords[seg_idx + 1]),
                    string_idx,
                    seg_idx,
                });
            }
        }
        if segments.is_empty() {
            return Vec::new();
        }

        let tree = RTree::bulk_load(segments);
        let mut points = Vec::new();
        for (a, b) in tree.intersection_candidates_with_other_tree(&tree) {
            // Only process unique pairs.
            if (a.string_idx, a.seg_idx) >= (b.string_idx, b.seg_idx) {
                continue;
            }
            if let Some(LineIntersection::SinglePoint {
                intersection,
                is_proper: true,
            }) = line_intersection(a.line, b.line)
            {
                points.push(self.round(intersection));
            }
        }

        points.sort_by(|a, b| {
            a.x.partial_cmp(&b.x)
                .unwrap_or(Ordering::Equal)
                .then(a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
        });
        points.dedup();
        points
    }

    fn round(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (c.x * self.scale_factor).round() / self.scale_factor,
            y: (c.y * self.scale_factor).round() / self.scale_factor,
        }
    }

    /// Narrow phase for one pixel: broad-phase query the interval index
    /// with the safe envelope's Y-range, then test each candidate segment.
    /// `skip` names the vertex (string, vertex index) the pixel was derived
    /// from, if any.
    fn add_pixel_snaps(
        &self,
        pixel: &HotPixel,
        skip: Option<(usize, usize)>,
        index: &IntervalIndex<(usize, usize)>,
        strings: &mut [NodedSegmentString],
    ) -> Result<usize> {
        let env = pixel.safe_envelope();
        let mut candidates: Vec<(usize, usize)> = Vec::new();
        index.query(env.min().y, env.max().y, |&key| candidates.push(key));
        candidates.sort_unstable();

        let mut added = 0;
        for (string_idx, seg_idx) in candidates {
            if let Some((vertex_string, vertex_idx)) = skip {
                if vertex_string == string_idx && (seg_idx == vertex_idx || seg_idx + 1 == vertex_idx)
                {
                    continue;
                }
            }
            if pixel.add_snapped_node(&mut strings[string_idx], seg_idx) {
                added += 1;
            }
        }
        Ok(added)
    }
}

/// Interval index over every segment, keyed by Y-extent.
fn build_segment_index(strings: &[NodedSegmentString]) -> IntervalIndex<(usize, usize)> {
    let mut intervals = Vec::new();
    for (string_idx, ss) in strings.iter().enumerate() {
        let coords = ss.coordinates();
        for seg_idx in 0..ss.segment_count() {
            let y0 = coords[seg_idx].y;
            let y1 = coords[seg_idx + 1].y;
            intervals.push((y0.min(y1), y0.max(y1), (string_idx, seg_idx)));
        }
    }
    IntervalIndex::build(intervals)
}
