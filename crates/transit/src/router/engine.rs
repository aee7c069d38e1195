//! The queryable routing engine: graph, stop mapping, settings and index.

use std::sync::Arc;

use tracing::debug;

use crate::graph::{builder::StopVertices, DirectedWeightedGraph, Edge, GraphBuilder, VertexId};
use crate::identifiers::StopName;
use crate::models::{NetworkModel, Result, RoutingSettings, TransitError};
use crate::router::index::{RouteInfo, ShortestPathIndex};

/// Immutable after construction; cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct RoutingEngine {
    settings: RoutingSettings,
    graph: Arc<DirectedWeightedGraph>,
    stop_vertices: StopVertices,
    index: ShortestPathIndex,
}

impl RoutingEngine {
    /// Build the routing graph from `model`.
    pub fn build(model: &impl NetworkModel, settings: RoutingSettings) -> Result<Self> {
        let (graph, stop_vertices) = GraphBuilder::new(settings).build(model)?;
        Ok(Self::from_parts(settings, graph, stop_vertices))
    }

    /// Assemble an engine from an already built graph (used by the snapshot
    /// decoder). The caller is responsible for the parts being consistent.
    pub fn from_parts(
        settings: RoutingSettings,
        graph: DirectedWeightedGraph,
        stop_vertices: StopVertices,
    ) -> Self {
        let graph = Arc::new(graph);
        let index = ShortestPathIndex::new(Arc::clone(&graph));
        Self {
            settings,
            graph,
            stop_vertices,
            index,
        }
    }

    /// Fastest way from one stop to another.
    ///
    /// `Ok(None)` means both stops exist but are not connected.
    pub fn find_route(&self, from: &str, to: &str) -> Result<Option<RouteInfo>> {
        let from_vertex = self.waiting_vertex(from)?;
        let to_vertex = self.waiting_vertex(to)?;
        let route = self.index.build_route(from_vertex, to_vertex);
        debug!(from, to, found = route.is_some(), "route query");
        Ok(route)
    }

    fn waiting_vertex(&self, stop: &str) -> Result<VertexId> {
        self.stop_vertices
            .get(stop)
            .copied()
            .ok_or_else(|| TransitError::StopNotFound(StopName::new(stop)))
    }

    pub fn settings(&self) -> RoutingSettings {
        self.settings
    }

    pub fn graph(&self) -> &DirectedWeightedGraph {
        &self.graph
    }

    /// Shared handle to the graph for consumers that outlive a borrow.
    pub fn shared_graph(&self) -> Arc<DirectedWeightedGraph> {
        Arc::clone(&self.graph)
    }

    pub fn stop_vertices(&self) -> &StopVertices {
        &self.stop_vertices
    }

    pub fn edge(&self, id: usize) -> Option<&Edge> {
        self.graph.edge(id)
    }
}
