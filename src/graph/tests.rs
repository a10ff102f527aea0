use crate::graph::planar_graph::{compare_direction, quadrant, NodeKey, PlanarGraph};
use geo_types::{Coord, LineString};
use std::cmp::Ordering;

#[test]
fn test_graph_construction() {
    let mut graph = PlanarGraph::new();
    graph.add_line_string(&LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]));
    graph.add_line_string(&LineString::from(vec![(0.0, 0.0), (0.0, 10.0)]));

    assert_eq!(graph.nodes.len(), 3); // (0,0), (10,0), (0,10)
    assert_eq!(graph.edges.len(), 2);
    assert_eq!(graph.directed_edges.len(), 4);

    let center = graph.node_map[&NodeKey::from(Coord { x: 0.0, y: 0.0 })];
    assert_eq!(graph.nodes[center].outgoing_edges.len(), 2);
    assert_eq!(graph.nodes[center].degree, 2);
}

#[test]
fn test_sym_pairing() {
    let mut graph = PlanarGraph::new();
    graph.add_line_string(&LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]));

    for (idx, de) in graph.directed_edges.iter().enumerate() {
        let sym = &graph.directed_edges[de.sym_idx];
        assert_eq!(sym.sym_idx, idx);
        assert_eq!(sym.src, de.dst);
        assert_eq!(sym.dst, de.src);
        assert_eq!(sym.edge_idx, de.edge_idx);
        assert_ne!(sym.edge_direction, de.edge_direction);
    }
}

#[test]
fn test_quadrants() {
    assert_eq!(quadrant(1.0, 0.0), 0);
    assert_eq!(quadrant(1.0, 1.0), 0);
    assert_eq!(quadrant(0.0, 1.0), 0);
    assert_eq!(quadrant(-1.0, 1.0), 1);
    assert_eq!(quadrant(-1.0, 0.0), 1);
    assert_eq!(quadrant(-1.0, -1.0), 2);
    assert_eq!(quadrant(0.0, -1.0), 3);
    assert_eq!(quadrant(1.0, -1.0), 3);
}

#[test]
fn test_edge_sorting_is_ccw() {
    let mut graph = PlanarGraph::new();
    // Four edges radiating from the origin, added out of angular order.
    graph.add_line_string(&LineString::from(vec![(0.0, 0.0), (-10.0, 0.0)]));
    graph.add_line_string(&LineString::from(vec![(0.0, 0.0), (0.0, -10.0)]));
    graph.add_line_string(&LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]));
    graph.add_line_string(&LineString::from(vec![(0.0, 0.0), (0.0, 10.0)]));

    graph.sort_edges();

    let center = graph.node_map[&NodeKey::from(Coord { x: 0.0, y: 0.0 })];
    let destinations: Vec<Coord<f64>> = graph.nodes[center]
        .outgoing_edges
        .iter()
        .map(|&de| graph.nodes[graph.directed_edges[de].dst].coordinate)
        .collect();

    // Ascending counterclockwise from +X: right, up, left, down.
    assert_eq!(destinations[0], Coord { x: 10.0, y: 0.0 });
    assert_eq!(destinations[1], Coord { x: 0.0, y: 10.0 });
    assert_eq!(destinations[2], Coord { x: -10.0, y: 0.0 });
    assert_eq!(destinations[3], Coord { x: 0.0, y: -10.0 });
}

#[test]
fn test_compare_direction_antisymmetric_and_transitive() {
    let origin = Coord { x: 0.0, y: 0.0 };
    // A fan of direction points across all quadrants, including a
    // near-collinear pair that naive float angle math misorders.
    let dirs = [
        Coord { x: 10.0, y: 0.0 },
        Coord { x: 10.0, y: 1.0 },
        Coord { x: 10.0, y: 1.0 + 1e-13 },
        Coord { x: 1.0, y: 10.0 },
        Coord { x: -4.0, y: 9.0 },
        Coord { x: -10.0, y: -1.0 },
        Coord { x: -1.0, y: -10.0 },
        Coord { x: 8.0, y: -3.0 },
    ];
    let quadrants: Vec<u8> = dirs
        .iter()
        .map(|d| quadrant(d.x - origin.x, d.y - origin.y))
        .collect();

    let cmp = |i: usize, j: usize| -> Ordering {
        compare_direction(origin, dirs[i], quadrants[i], dirs[j], quadrants[j])
    };

    for i in 0..dirs.len() {
        assert_eq!(cmp(i, i), Ordering::Equal);
        for j in 0..dirs.len() {
            assert_eq!(cmp(i, j), cmp(j, i).reverse(), "antisymmetry {} {}", i, j);
            for k in 0..dirs.len() {
                if cmp(i, j) == Ordering::Less && cmp(j, k) == Ordering::Less {
                    assert_eq!(cmp(i, k), Ordering::Less, "transitivity {} {} {}", i, j, k);
                }
            }
        }
    }
}

#[test]
fn test_dangle_pruning() {
    let mut graph = PlanarGraph::new();
    // Triangle with a two-segment dangle hanging off one corner.
    graph.add_line_string(&LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]));
    graph.add_line_string(&LineString::from(vec![(10.0, 0.0), (0.0, 10.0)]));
    graph.add_line_string(&LineString::from(vec![(0.0, 10.0), (0.0, 0.0)]));
    graph.add_line_string(&LineString::from(vec![(10.0, 0.0), (20.0, 0.0), (30.0, 0.0)]));

    graph.sort_edges();
    let pruned = graph.prune_dangles();
    assert_eq!(pruned, 2);

    let corner = graph.node_map[&NodeKey::from(Coord { x: 10.0, y: 0.0 })];
    assert_eq!(graph.nodes[corner].degree, 2);

    // The remaining triangle still extracts cleanly.
    let rings = graph.extract_rings();
    assert_eq!(rings.len(), 2);
    assert!(rings.iter().all(|r| r.is_ok()));
}

#[test]
fn test_triangle_extracts_shell_and_outer_face() {
    let mut graph = PlanarGraph::new();
    graph.add_line_string(&LineString::from(vec![
        (0.0, 0.0),
        (10.0, 0.0),
        (0.0, 10.0),
        (0.0, 0.0),
    ]));

    graph.sort_edges();
    let rings: Vec<_> = graph.extract_rings().into_iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(rings.len(), 2);

    // One clockwise shell bounding the face, one counterclockwise walk of
    // the unbounded face.
    let holes = rings.iter().filter(|r| r.is_hole()).count();
    assert_eq!(holes, 1);
    let shell = rings.iter().find(|r| !r.is_hole()).unwrap();
    assert!((shell.signed_area().abs() - 50.0).abs() < 1e-9);
}

#[test]
fn test_unclosed_walk_is_reported() {
    let mut graph = PlanarGraph::new();
    // A bare segment: without pruning, the walk bounces between the two
    // endpoints and closes as a degenerate 2-vertex ring.
    graph.add_line_string(&LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]));
    graph.sort_edges();

    let rings = graph.extract_rings();
    assert!(!rings.is_empty());
    assert!(rings.iter().all(|r| r.is_err()));
}
