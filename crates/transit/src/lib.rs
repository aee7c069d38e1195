//! # transport-catalogue
//!
//! Bus network catalogue with transfer-aware routing and binary snapshots.
//!
//! ## Features
//!
//! - **Catalogue**: stops, bus routes and road distances, with route statistics
//! - **Routing graph**: wait and ride edges built once from the catalogue
//! - **Shortest paths**: deterministic fastest-route queries, safe to share across threads
//! - **Snapshots**: checksummed binary images that restore without rebuilding the graph
//!
//! ## Example
//!
//! ```
//! use transport_catalogue::prelude::*;
//!
//! let mut catalogue = TransitCatalogue::new();
//! catalogue.add_stop(Stop::new("A", 55.611087, 37.20829))?;
//! catalogue.add_stop(Stop::new("B", 55.595884, 37.209755))?;
//! catalogue.add_stop(Stop::new("C", 55.632761, 37.333324))?;
//! catalogue.set_distance(&"A".into(), &"B".into(), 1000)?;
//! catalogue.set_distance(&"B".into(), &"C".into(), 1000)?;
//! catalogue.add_route(BusRoute::new("R1", vec!["A".into(), "B".into(), "C".into()], false))?;
//!
//! let engine = RoutingEngine::build(&catalogue, RoutingSettings::new(6, 60.0))?;
//! let route = engine.find_route("A", "C")?.expect("A and C are connected");
//! assert!((route.weight - 8.0).abs() < 1e-9);
//!
//! // Persist and restore without rebuilding
//! let bytes = snapshot::serialize(&catalogue, None, &engine);
//! let restored = snapshot::deserialize(&bytes)?;
//! assert_eq!(restored.engine.find_route("A", "C")?, Some(route));
//! # Ok::<(), TransitError>(())
//! ```

pub mod graph;
pub mod identifiers;
pub mod models;
pub mod provider;
pub mod router;
pub mod snapshot;
pub mod spatial;

// Re-exports for convenience
pub mod prelude {
    pub use crate::graph::{DirectedWeightedGraph, Edge, EdgeId, EdgeLabel, GraphBuilder, VertexId};
    pub use crate::identifiers::*;
    pub use crate::models::{render::*, traits::*, types::*};
    pub use crate::provider::TransitCatalogue;
    pub use crate::router::{RouteInfo, RoutingEngine};
    pub use crate::snapshot::{self, Snapshot, SnapshotError};
}

pub use prelude::*;
