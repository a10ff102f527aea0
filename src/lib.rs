pub mod error;
pub mod graph;
pub mod index;
pub mod locate;
pub mod noding;
pub mod polygonizer;


pub use error::{GeometryError, Result};
pub use graph::{EdgeRing, PlanarGraph};
pub use index::IntervalIndex;
pub use locate::{IndexedPointInAreaLocator, Location, SimplePointInAreaLocator};
pub use noding::{HotPixel, NodedSegmentString, SnapRoundingNoder};
pub use polygonizer::{assign_holes_to_shells, Polygonizer};
