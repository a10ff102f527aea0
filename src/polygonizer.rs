//! Assembles noded linework into polygons with correct shell/hole nesting.

use crate::error::{GeometryError, Result};
use crate::graph::{EdgeRing, PlanarGraph};
use crate::noding::SnapRoundingNoder;
use geo::algorithm::winding_order::Winding;
use geo_types::{Coord, Geometry, Line, LineString, Polygon};
use log::{debug, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use rstar::{RTree, RTreeObject, AABB};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

/// Shell ring wrapped for rstar bounding-box queries.
struct IndexedShell {
    envelope: AABB<[f64; 2]>,
    idx: usize,
}

impl RTreeObject for IndexedShell {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

enum HoleAssignment {
    Shell(usize),
    /// No shell's bounding box covers the hole's: this is the ring of the
    /// unbounded face of its component, not a polygon hole.
    OuterFace,
    /// Candidate shells existed but none contains the hole.
    Unmatched(Coord<f64>),
}

pub struct Polygonizer {
    graph: PlanarGraph,
    /// Fail on the first invalid ring or unassignable hole instead of
    /// skipping it with a warning.
    pub check_valid_rings: bool,
    /// Run the snap-rounding noder over the input before building the
    /// graph. Required when input linework intersects away from shared
    /// endpoints.
    pub node_input: bool,
    /// Rounding-grid scale factor used when `node_input` is set.
    pub snap_scale: f64,

    inputs: Vec<Geometry<f64>>,
    dirty: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl Default for Polygonizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Polygonizer {
    pub fn new() -> Self {
        Self {
            graph: PlanarGraph::new(),
            check_valid_rings: true,
            node_input: false,
            snap_scale: 1.0,
            inputs: Vec::new(),
            dirty: false,
            cancel: None,
        }
    }

    /// Installs a flag checked between coarse-grained phases (noding, graph
    /// build, ring extraction, hole assignment).
    pub fn set_cancel_flag(&mut self, flag: Arc<AtomicBool>) {
        self.cancel = Some(flag);
    }

    fn check_cancel(&self) -> Result<()> {
        if let Some(flag) = &self.cancel {
            if flag.load(AtomicOrdering::Relaxed) {
                return Err(GeometryError::Cancelled);
            }
        }
        Ok(())
    }

    /// Adds the lineal components of a geometry to the arrangement.
    pub fn add_geometry(&mut self, geom: Geometry<f64>) {
        self.inputs.push(geom);
        self.dirty = true;
    }

    fn build_graph(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        // Inputs accumulated since the last build re-extract from scratch;
        // appending to the populated graph would duplicate every edge.
        self.graph = PlanarGraph::new();

        let mut lines = Vec::new();
        for geom in &self.inputs {
            extract_lines(geom, &mut lines);
        }

        let mut segments: Vec<Line<f64>> = Vec::new();
        if self.node_input {
            let mut noder = SnapRoundingNoder::new(self.snap_scale);
            if let Some(flag) = &self.cancel {
                noder = noder.with_cancel_flag(flag.clone());
            }
            let strings: Vec<Vec<Coord<f64>>> = lines.iter().map(|ls| ls.0.clone()).collect();
            for coords in noder.node(strings)? {
                for pair in coords.windows(2) {
                    segments.push(Line::new(pair[0], pair[1]));
                }
            }
        } else {
            for ls in &lines {
                segments.extend(ls.lines());
            }
        }

        // Normalize direction and drop exact duplicates: re-supplied
        // collinear edges would otherwise form degenerate 2-edge rings.
        for seg in &mut segments {
            let flip = match seg.start.x.partial_cmp(&seg.end.x) {
                Some(Ordering::Greater) => true,
                Some(Ordering::Equal) => seg.start.y > seg.end.y,
                _ => false,
            };
            if flip {
                std::mem::swap(&mut seg.start, &mut seg.end);
            }
        }
        segments.sort_by(|a, b| {
            let ka = (a.start.x, a.start.y, a.end.x, a.end.y);
            let kb = (b.start.x, b.start.y, b.end.x, b.end.y);
            ka.partial_cmp(&kb).unwrap_or(Ordering::Equal)
        });
        segments.dedup();

        for segment in segments {
            self.graph.add_line(segment);
        }

        self.dirty = false;
        Ok(())
    }

    /// Computes the polygons of the arrangement: one per bounded face, each
    /// with its nested hole rings attached to the smallest containing
    /// shell.
    pub fn polygonize(&mut self) -> Result<Vec<Polygon<f64>>> {
        self.build_graph()?;
        self.check_cancel()?;

        self.graph.sort_edges();
        let pruned = self.graph.prune_dangles();
        if pruned > 0 {
            debug!("pruned {} dangling nodes", pruned);
        }
        self.check_cancel()?;

        let mut shells: Vec<EdgeRing> = Vec::new();
        let mut holes: Vec<EdgeRing> = Vec::new();
        for ring in self.graph.extract_rings() {
            match ring {
                Ok(ring) => {
                    if ring.signed_area().abs() < 1e-9 {
                        debug!("skipping degenerate zero-area ring");
                        continue;
                    }
                    if ring.is_hole() {
                        holes.push(ring);
                    } else {
                        shells.push(ring);
                    }
                }
                Err(err) => {
                    if self.check_valid_rings {
                        return Err(err);
                    }
                    warn!("skipping invalid ring: {}", err);
                }
            }
        }
        debug!("extracted {} shells and {} hole-oriented rings", shells.len(), holes.len());
        self.check_cancel()?;

        let tree = RTree::bulk_load(
            shells
                .iter()
                .enumerate()
                .map(|(idx, shell)| {
                    let bbox = shell.bounding_box();
                    IndexedShell {
                        envelope: AABB::from_corners(
                            [bbox.min().x, bbox.min().y],
                            [bbox.max().x, bbox.max().y],
                        ),
                        idx,
                    }
                })
                .collect(),
        );

        let assign_one = |hole: &EdgeRing| -> HoleAssignment {
            let bbox = hole.bounding_box();
            let aabb =
                AABB::from_corners([bbox.min().x, bbox.min().y], [bbox.max().x, bbox.max().y]);
            let candidates = tree
                .locate_in_envelope_intersecting(&aabb)
                .map(|indexed| (indexed.idx, &shells[indexed.idx]));
            match find_containing_shell(hole, candidates) {
                (_, Some(idx)) => HoleAssignment::Shell(idx),
                (false, None) => HoleAssignment::OuterFace,
                (true, None) => HoleAssignment::Unmatched(hole.ring().0[0]),
            }
        };

        #[cfg(feature = "parallel")]
        let assignments: Vec<HoleAssignment> = holes.par_iter().map(assign_one).collect();
        #[cfg(not(feature = "parallel"))]
        let assignments: Vec<HoleAssignment> = holes.iter().map(assign_one).collect();

        let mut shell_holes: Vec<Vec<LineString<f64>>> = vec![Vec::new(); shells.len()];
        let mut outer_faces = 0;
        for (hole, assignment) in holes.iter().zip(assignments) {
            match assignment {
                HoleAssignment::Shell(idx) => shell_holes[idx].push(hole.ring().clone()),
                HoleAssignment::OuterFace => outer_faces += 1,
                HoleAssignment::Unmatched(at) => {
                    let err = GeometryError::Topology(format!(
                        "no enclosing shell contains the hole ring at ({}, {})",
                        at.x, at.y
                    ));
                    if self.check_valid_rings {
                        return Err(err);
                    }
                    warn!("skipping hole: {}", err);
                }
            }
        }
        if outer_faces > 0 {
            debug!("dropped {} unbounded-face rings", outer_faces);
        }

        let mut result = Vec::with_capacity(shells.len());
        for (shell, hole_rings) in shells.into_iter().zip(shell_holes) {
            let mut exterior = shell.into_ring();
            exterior.make_ccw_winding();
            let interiors = hole_rings
                .into_iter()
                .map(|mut ring| {
                    ring.make_cw_winding();
                    ring
                })
                .collect();
            result.push(Polygon::new(exterior, interiors));
        }
        Ok(result)
    }
}

/// Assigns each hole-oriented ring to its minimal enclosing shell.
///
/// Per-hole results let the caller skip or fail as policy dictates: a hole
/// contained by no candidate shell is a topology error, never a guess.
pub fn assign_holes_to_shells(shells: &[EdgeRing], holes: &[EdgeRing]) -> Vec<Result<usize>> {
    holes
        .iter()
        .map(|hole| {
            let (_, found) = find_containing_shell(hole, shells.iter().enumerate());
            found.ok_or_else(|| {
                let at = hole.ring().0[0];
                GeometryError::Topology(format!(
                    "no enclosing shell contains the hole ring at ({}, {})",
                    at.x, at.y
                ))
            })
        })
        .collect()
}

/// The minimal enclosing shell for a hole: among shells whose bounding box
/// covers (and is not identical to) the hole's, the smallest-box shell that
/// contains a hole vertex absent from the shell's own vertex set. Returns
/// whether any bbox candidate existed, and the winner if one contains the
/// hole.
fn find_containing_shell<'a, I>(hole: &EdgeRing, candidates: I) -> (bool, Option<usize>)
where
    I: Iterator<Item = (usize, &'a EdgeRing)>,
{
    let mut had_candidates = false;
    let mut best: Option<(usize, f64)> = None;

    for (idx, shell) in candidates {
        if shell.bbox_equals(hole) || !shell.bbox_covers(hole) {
            continue;
        }
        had_candidates = true;

        let Some(test_point) = hole.point_not_shared_with(shell) else {
            continue;
        };
        if !shell.contains_point(test_point) {
            continue;
        }

        let bbox = shell.bounding_box();
        let bbox_area = (bbox.max().x - bbox.min().x) * (bbox.max().y - bbox.min().y);
        if best.map_or(true, |(_, smallest)| bbox_area < smallest) {
            best = Some((idx, bbox_area));
        }
    }

    (had_candidates, best.map(|(idx, _)| idx))
}

fn extract_lines(geom: &Geometry<f64>, out: &mut Vec<LineString<f64>>) {
    match geom {
        Geometry::Line(line) => out.push(LineString::new(vec![line.start, line.end])),
        Geometry::LineString(ls) => out.push(ls.clone()),
        Geometry::MultiLineString(mls) => out.extend(mls.0.clone()),
        Geometry::Polygon(poly) => {
            out.push(poly.exterior().clone());
            out.extend(poly.interiors().iter().cloned());
        }
        Geometry::MultiPolygon(mpoly) => {
            for poly in mpoly {
                out.push(poly.exterior().clone());
                out.extend(poly.interiors().iter().cloned());
            }
        }
        Geometry::Rect(rect) => out.push(rect.to_polygon().exterior().clone()),
        Geometry::Triangle(tri) => out.push(tri.to_polygon().exterior().clone()),
        Geometry::GeometryCollection(gc) => {
            for g in gc {
                extract_lines(g, out);
            }
        }
        _ => {}
    }
}
