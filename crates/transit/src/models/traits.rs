//! Read interface the router needs from a transit network.
//!
//! The graph builder only ever sees a network through this trait, so any
//! store (in-memory, restored from a snapshot, test fixture) can feed it.

use crate::identifiers::StopName;
use crate::models::types::{BusRoute, Stop};

/// Provider of stops, routes and stop-to-stop distances
pub trait NetworkModel {
    /// All stops, ordered by name.
    fn stops_sorted_by_name(&self) -> Vec<&Stop>;

    /// All routes, ordered by name.
    fn routes_sorted_by_name(&self) -> Vec<&BusRoute>;

    /// Road distance in meters when driving from `from` to `to`.
    fn distance(&self, from: &StopName, to: &StopName) -> Option<u32>;
}
