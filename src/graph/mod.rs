//! Planar graph of noded segments and the edge rings traced from it.

pub mod edge_ring;
pub mod planar_graph;

pub use edge_ring::EdgeRing;
pub use planar_graph::PlanarGraph;

#[cfg(test)]
mod tests;
