//! Arena-based planar graph.
//!
//! Nodes, undirected edges and directed half-edges live in flat vectors
//! addressed by integer ids; a node stores the ids of its outgoing directed
//! edges, never references, so there are no ownership cycles and "mark
//! used" is a flag on the arena entry.

use crate::error::{GeometryError, Result};
use crate::graph::edge_ring::EdgeRing;
use crate::locate::orient2d;
use geo::Line;
use geo_types::{Coord, LineString};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::HashMap;

pub type NodeId = usize;
pub type EdgeId = usize;
pub type DirEdgeId = usize;

/// Quadrant of a direction vector, counterclockwise from the positive X
/// axis: NE = 0, NW = 1, SW = 2, SE = 3.
pub fn quadrant(dx: f64, dy: f64) -> u8 {
    if dx >= 0.0 {
        if dy >= 0.0 {
            0
        } else {
            3
        }
    } else if dy >= 0.0 {
        1
    } else {
        2
    }
}

/// Strict total order on direction vectors out of a shared origin;
/// ascending order is counterclockwise from the positive X axis.
///
/// Quadrants decide outright when they differ; within a quadrant the
/// exact-sign orientation of `a`'s direction point against `origin -> b`
/// decides, so near-collinear vectors never misorder from roundoff.
pub fn compare_direction(
    origin: Coord<f64>,
    a_dir: Coord<f64>,
    a_quadrant: u8,
    b_dir: Coord<f64>,
    b_quadrant: u8,
) -> Ordering {
    if a_quadrant != b_quadrant {
        return a_quadrant.cmp(&b_quadrant);
    }
    let sign = orient2d(origin, b_dir, a_dir);
    if sign > 0.0 {
        Ordering::Greater
    } else if sign < 0.0 {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub coordinate: Coord<f64>,
    /// Outgoing directed edge ids. INVARIANT after `sort_edges`: sorted in
    /// ascending counterclockwise order.
    pub outgoing_edges: SmallVec<[DirEdgeId; 4]>,
    pub degree: usize,
    /// Set when the node has been removed by dangle pruning.
    pub is_marked: bool,
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub line: Line<f64>,
    /// The two directed half-edges of this undirected edge.
    pub dir_edges: [DirEdgeId; 2],
    pub is_marked: bool,
}

#[derive(Clone, Debug)]
pub struct DirectedEdge {
    pub src: NodeId,
    pub dst: NodeId,
    /// Second vertex of the edge walked in this direction; defines the
    /// initial direction vector.
    pub direction_pt: Coord<f64>,
    pub quadrant: u8,
    /// Parent undirected edge.
    pub edge_idx: EdgeId,
    /// The oppositely-directed half-edge of the same parent edge. Every
    /// directed edge has exactly one.
    pub sym_idx: DirEdgeId,
    /// Traversal state: consumed into a ring.
    pub is_visited: bool,
    /// Removed from the graph (dangle pruning).
    pub is_marked: bool,
    /// Whether walking this directed edge agrees with the parent edge's
    /// canonical orientation.
    pub edge_direction: bool,
}

/// Coordinate key with exact bit-pattern equality, for node deduplication.
#[derive(PartialEq, Eq, Hash, Clone, Copy)]
pub struct NodeKey(u64, u64);

impl From<Coord<f64>> for NodeKey {
    fn from(c: Coord<f64>) -> Self {
        NodeKey(c.x.to_bits(), c.y.to_bits())
    }
}

pub struct PlanarGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub directed_edges: Vec<DirectedEdge>,
    pub node_map: HashMap<NodeKey, NodeId>,
}

impl Default for PlanarGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanarGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            directed_edges: Vec::new(),
            node_map: HashMap::new(),
        }
    }

    pub fn add_node(&mut self, coord: Coord<f64>) -> NodeId {
        let key = NodeKey::from(coord);
        if let Some(&id) = self.node_map.get(&key) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            coordinate: coord,
            outgoing_edges: SmallVec::new(),
            degree: 0,
            is_marked: false,
        });
        self.node_map.insert(key, id);
        id
    }

    /// Adds one noded segment as an undirected edge with its two
    /// half-edges. Degenerate (zero-length) segments are skipped.
    pub fn add_line(&mut self, line: Line<f64>) {
        let p0 = line.start;
        let p1 = line.end;
        if p0 == p1 {
            return;
        }

        let u = self.add_node(p0);
        let v = self.add_node(p1);

        let edge_idx = self.edges.len();
        let de_u_v = self.directed_edges.len();
        let de_v_u = de_u_v + 1;

        self.directed_edges.push(DirectedEdge {
            src: u,
            dst: v,
            direction_pt: p1,
            quadrant: quadrant(p1.x - p0.x, p1.y - p0.y),
            edge_idx,
            sym_idx: de_v_u,
            is_visited: false,
            is_marked: false,
            edge_direction: true,
        });
        self.directed_edges.push(DirectedEdge {
            src: v,
            dst: u,
            direction_pt: p0,
            quadrant: quadrant(p0.x - p1.x, p0.y - p1.y),
            edge_idx,
            sym_idx: de_u_v,
            is_visited: false,
            is_marked: false,
            edge_direction: false,
        });

        self.edges.push(Edge {
            line,
            dir_edges: [de_u_v, de_v_u],
            is_marked: false,
        });

        self.nodes[u].outgoing_edges.push(de_u_v);
        self.nodes[u].degree += 1;
        self.nodes[v].outgoing_edges.push(de_v_u);
        self.nodes[v].degree += 1;
    }

    /// Adds every segment of a properly noded line string.
    pub fn add_line_string(&mut self, line: &LineString<f64>) {
        for segment in line.lines() {
            self.add_line(segment);
        }
    }

    /// Sorts every node's outgoing edges into ascending counterclockwise
    /// order. Must run before ring extraction.
    pub fn sort_edges(&mut self) {
        let directed_edges = &self.directed_edges;
        let sort_node = |node: &mut Node| {
            let origin = node.coordinate;
            node.outgoing_edges.sort_by(|&a_idx, &b_idx| {
                let a = &directed_edges[a_idx];
                let b = &directed_edges[b_idx];
                compare_direction(origin, a.direction_pt, a.quadrant, b.direction_pt, b.quadrant)
            });
        };

        #[cfg(feature = "parallel")]
        self.nodes.par_iter_mut().for_each(sort_node);
        #[cfg(not(feature = "parallel"))]
        self.nodes.iter_mut().for_each(sort_node);
    }

    /// Iteratively removes degree-1 chains. Dangling edges can never close
    /// a ring and would otherwise make every walk through them fail.
    pub fn prune_dangles(&mut self) -> usize {
        let mut dangles_removed = 0;
        let mut to_process: Vec<NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.degree == 1 && !n.is_marked)
            .map(|(i, _)| i)
            .collect();

        while let Some(node_idx) = to_process.pop() {
            if self.nodes[node_idx].degree != 1 {
                continue;
            }
            self.nodes[node_idx].is_marked = true;
            self.nodes[node_idx].degree = 0;
            dangles_removed += 1;

            let live_edge = self.nodes[node_idx]
                .outgoing_edges
                .iter()
                .copied()
                .find(|&de| !self.directed_edges[de].is_marked);

            if let Some(de_idx) = live_edge {
                self.directed_edges[de_idx].is_marked = true;
                let sym_idx = self.directed_edges[de_idx].sym_idx;
                self.directed_edges[sym_idx].is_marked = true;
                self.edges[self.directed_edges[de_idx].edge_idx].is_marked = true;

                let neighbor_idx = self.directed_edges[de_idx].dst;
                let neighbor = &mut self.nodes[neighbor_idx];
                if neighbor.degree > 0 {
                    neighbor.degree -= 1;
                    if neighbor.degree == 1 && !neighbor.is_marked {
                        to_process.push(neighbor_idx);
                    }
                }
            }
        }
        dangles_removed
    }

    /// Traces every unused directed edge into a closed walk and builds one
    /// [`EdgeRing`] per walk. Each directed edge is consumed exactly once.
    ///
    /// Walks that cannot close, or that close with too few distinct
    /// vertices, are reported as per-ring errors; they are never silently
    /// accepted as half-formed rings. The caller chooses whether to skip or
    /// fail the operation.
    pub fn extract_rings(&mut self) -> Vec<Result<EdgeRing>> {
        for de in &mut self.directed_edges {
            de.is_visited = false;
        }

        let mut rings = Vec::new();
        for start in 0..self.directed_edges.len() {
            if self.directed_edges[start].is_visited || self.directed_edges[start].is_marked {
                continue;
            }
            rings.push(self.trace_ring(start));
        }
        rings
    }

    /// Follows the face-tracing rule: at the head node, continue with the
    /// outgoing edge next counterclockwise after the sym of the arriving
    /// edge.
    fn trace_ring(&mut self, start: DirEdgeId) -> Result<EdgeRing> {
        let mut walk = Vec::new();
        let mut curr = start;

        loop {
            self.directed_edges[curr].is_visited = true;
            walk.push(curr);

            let dst = self.directed_edges[curr].dst;
            let sym = self.directed_edges[curr].sym_idx;
            let node = &self.nodes[dst];

            let sym_pos = node
                .outgoing_edges
                .iter()
                .position(|&idx| idx == sym)
                .ok_or_else(|| {
                    GeometryError::Topology(format!(
                        "symmetric edge missing from node at ({}, {})",
                        node.coordinate.x, node.coordinate.y
                    ))
                })?;

            let len = node.outgoing_edges.len();
            let mut next = None;
            for offset in 1..=len {
                let candidate = node.outgoing_edges[(sym_pos + offset) % len];
                if !self.directed_edges[candidate].is_marked {
                    next = Some(candidate);
                    break;
                }
            }
            let Some(next) = next else {
                return Err(GeometryError::Topology(format!(
                    "ring walk dead-ends at node ({}, {})",
                    self.nodes[dst].coordinate.x, self.nodes[dst].coordinate.y
                )));
            };

            curr = next;
            if curr == start {
                break;
            }
            if self.directed_edges[curr].is_visited {
                let c = self.nodes[self.directed_edges[curr].src].coordinate;
                return Err(GeometryError::Topology(format!(
                    "ring walk re-enters a consumed edge at ({}, {}) before closing",
                    c.x, c.y
                )));
            }
        }

        let mut coords = Vec::with_capacity(walk.len() + 1);
        coords.push(self.nodes[self.directed_edges[walk[0]].src].coordinate);
        for &de_idx in &walk {
            coords.push(self.nodes[self.directed_edges[de_idx].dst].coordinate);
        }
        EdgeRing::try_new(coords)
    }
}
