//! Directed weighted graph of waiting and riding.
//!
//! Every stop owns two vertices: the *waiting* vertex (even id) where a
//! passenger stands before boarding, and the *arrived* vertex (waiting + 1)
//! where a bus drops them off. Wait edges lead from arrived to waiting, ride
//! edges from the waiting vertex of one stop to the arrived vertex of another.

pub mod builder;

pub use builder::GraphBuilder;

use crate::identifiers::{RouteName, StopName};

pub type VertexId = usize;
pub type EdgeId = usize;

/// What an edge means to a passenger. Never used for path cost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeLabel {
    /// Waiting at a stop for the next bus.
    Wait { stop: StopName },
    /// Riding one bus through `span_count` consecutive stops.
    Ride { route: RouteName, span_count: u32 },
}

impl EdgeLabel {
    /// Number of stops travelled through; zero for waiting.
    pub fn span_count(&self) -> u32 {
        match self {
            EdgeLabel::Wait { .. } => 0,
            EdgeLabel::Ride { span_count, .. } => *span_count,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub from: VertexId,
    pub to: VertexId,
    /// Minutes.
    pub weight: f64,
    pub label: EdgeLabel,
}

/// Append-only adjacency-list graph.
///
/// Edge ids are insertion indices and outgoing edges are kept in insertion
/// order, which is what makes shortest-path tie-breaking reproducible.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DirectedWeightedGraph {
    edges: Vec<Edge>,
    incidence_lists: Vec<Vec<EdgeId>>,
}

impl DirectedWeightedGraph {
    pub fn with_vertex_count(vertex_count: usize) -> Self {
        Self {
            edges: Vec::new(),
            incidence_lists: vec![Vec::new(); vertex_count],
        }
    }

    /// Panics if either endpoint is not a vertex of this graph.
    pub fn add_edge(&mut self, edge: Edge) -> EdgeId {
        assert!(
            edge.from < self.vertex_count() && edge.to < self.vertex_count(),
            "edge {} -> {} out of range for {} vertices",
            edge.from,
            edge.to,
            self.vertex_count()
        );
        let id = self.edges.len();
        self.incidence_lists[edge.from].push(id);
        self.edges.push(edge);
        id
    }

    pub fn vertex_count(&self) -> usize {
        self.incidence_lists.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Outgoing edge ids of `vertex`, in insertion order.
    pub fn incident_edges(&self, vertex: VertexId) -> &[EdgeId] {
        self.incidence_lists
            .get(vertex)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
