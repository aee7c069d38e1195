//! Shortest-path queries over the routing graph.

pub mod engine;
pub mod index;

pub use engine::RoutingEngine;
pub use index::{RouteInfo, ShortestPathIndex};
