//! Snap-rounding noding: perturbs segment intersections onto a fixed
//! precision grid so that downstream graph construction sees a numerically
//! consistent planar arrangement.

pub mod hot_pixel;
pub mod snap_round;

pub use hot_pixel::HotPixel;
pub use snap_round::SnapRoundingNoder;

use geo_types::Coord;
use std::cmp::Ordering;

/// A run of segments with intersection nodes accumulated against it.
///
/// The vertex list is never mutated while nodes are collected; the noded
/// vertex sequence is materialized once at the end of a rounding pass.
pub struct NodedSegmentString {
    coords: Vec<Coord<f64>>,
    nodes: Vec<SegmentNode>,
}

#[derive(Clone, Copy)]
struct SegmentNode {
    /// Index of the segment the node lies on (between vertex `seg_index`
    /// and vertex `seg_index + 1`).
    seg_index: usize,
    coord: Coord<f64>,
}

impl NodedSegmentString {
    pub fn new(coords: Vec<Coord<f64>>) -> Self {
        Self {
            coords,
            nodes: Vec::new(),
        }
    }

    pub fn coordinates(&self) -> &[Coord<f64>] {
        &self.coords
    }

    /// Number of segments (one less than the vertex count).
    pub fn segment_count(&self) -> usize {
        self.coords.len().saturating_sub(1)
    }

    /// Records an intersection node on the segment at `seg_index`.
    pub fn add_intersection(&mut self, coord: Coord<f64>, seg_index: usize) {
        debug_assert!(seg_index < self.segment_count());
        self.nodes.push(SegmentNode { seg_index, coord });
    }

    /// Materializes the final vertex sequence with every accumulated node
    /// inserted at its position in traversal order. Nodes on a segment are
    /// ordered by distance from the segment start; consecutive duplicates
    /// collapse.
    pub fn noded_coordinates(&self) -> Vec<Coord<f64>> {
        if self.nodes.is_empty() {
            return self.coords.clone();
        }

        let mut nodes = self.nodes.clone();
        nodes.sort_by(|a, b| {
            a.seg_index.cmp(&b.seg_index).then_with(|| {
                let start = self.coords[a.seg_index];
                let da = dist2(a.coord, start);
                let db = dist2(b.coord, start);
                da.partial_cmp(&db).unwrap_or(Ordering::Equal)
            })
        });

        let mut out: Vec<Coord<f64>> = Vec::with_capacity(self.coords.len() + nodes.len());
        let mut next_node = 0;
        for (i, &coord) in self.coords.iter().enumerate() {
            push_unique(&mut out, coord);
            while next_node < nodes.len() && nodes[next_node].seg_index == i {
                push_unique(&mut out, nodes[next_node].coord);
                next_node += 1;
            }
        }
        out
    }
}

fn dist2(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

fn push_unique(out: &mut Vec<Coord<f64>>, coord: Coord<f64>) {
    if out.last() != Some(&coord) {
        out.push(coord);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noded_coordinates_ordering() {
        let mut ss = NodedSegmentString::new(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 10.0, y: 0.0 },
        ]);
        // Inserted out of order along the segment.
        ss.add_intersection(Coord { x: 7.0, y: 0.0 }, 0);
        ss.add_intersection(Coord { x: 3.0, y: 0.0 }, 0);

        let coords = ss.noded_coordinates();
        assert_eq!(
            coords,
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 3.0, y: 0.0 },
                Coord { x: 7.0, y: 0.0 },
                Coord { x: 10.0, y: 0.0 },
            ]
        );
    }

    #[test]
    fn test_duplicate_nodes_collapse() {
        let mut ss = NodedSegmentString::new(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 4.0, y: 4.0 },
            Coord { x: 8.0, y: 0.0 },
        ]);
        ss.add_intersection(Coord { x: 2.0, y: 2.0 }, 0);
        ss.add_intersection(Coord { x: 2.0, y: 2.0 }, 0);
        // Node equal to an existing vertex collapses too.
        ss.add_intersection(Coord { x: 4.0, y: 4.0 }, 0);

        let coords = ss.noded_coordinates();
        assert_eq!(
            coords,
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 2.0, y: 2.0 },
                Coord { x: 4.0, y: 4.0 },
                Coord { x: 8.0, y: 0.0 },
            ]
        );
    }
}
