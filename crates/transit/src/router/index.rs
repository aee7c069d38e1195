//! Shortest paths over a [`DirectedWeightedGraph`].
//!
//! Dijkstra is run once per source vertex, the first time that vertex is
//! queried, and the resulting tree is kept for later queries. Trees are
//! stored in `OnceLock`s so the index can be shared between threads.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{Arc, OnceLock};

use tracing::trace;

use crate::graph::{DirectedWeightedGraph, EdgeId, VertexId};

/// A path through the graph: its edges in travel order and their total weight.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteInfo {
    pub weight: f64,
    pub edges: Vec<EdgeId>,
}

#[derive(Debug)]
struct ShortestPathTree {
    distances: Vec<Option<f64>>,
    prev_edges: Vec<Option<EdgeId>>,
}

/// Heap entry; ordered so `BinaryHeap` pops the smallest distance first and
/// the smallest vertex id among equal distances.
#[derive(Clone, Copy, Debug)]
struct QueueItem {
    distance: f64,
    vertex: VertexId,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueItem {}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

#[derive(Debug)]
pub struct ShortestPathIndex {
    graph: Arc<DirectedWeightedGraph>,
    trees: Vec<OnceLock<ShortestPathTree>>,
}

impl ShortestPathIndex {
    pub fn new(graph: Arc<DirectedWeightedGraph>) -> Self {
        let trees = (0..graph.vertex_count()).map(|_| OnceLock::new()).collect();
        Self { graph, trees }
    }

    pub fn graph(&self) -> &DirectedWeightedGraph {
        &self.graph
    }

    /// Cheapest path from `from` to `to`, or `None` if `to` is unreachable
    /// or either vertex is out of range.
    ///
    /// A vertex reaches itself with an empty, zero-weight path.
    pub fn build_route(&self, from: VertexId, to: VertexId) -> Option<RouteInfo> {
        let tree = self.tree(from)?;
        let weight = (*tree.distances.get(to)?)?;

        let mut edges = Vec::new();
        let mut vertex = to;
        while let Some(edge_id) = tree.prev_edges[vertex] {
            edges.push(edge_id);
            vertex = self.graph.edges()[edge_id].from;
        }
        edges.reverse();

        Some(RouteInfo { weight, edges })
    }

    fn tree(&self, source: VertexId) -> Option<&ShortestPathTree> {
        let cell = self.trees.get(source)?;
        Some(cell.get_or_init(|| self.dijkstra(source)))
    }

    fn dijkstra(&self, source: VertexId) -> ShortestPathTree {
        let vertex_count = self.graph.vertex_count();
        let mut distances = vec![None; vertex_count];
        let mut prev_edges = vec![None; vertex_count];
        let mut settled = vec![false; vertex_count];
        let mut queue = BinaryHeap::new();

        distances[source] = Some(0.0);
        queue.push(QueueItem {
            distance: 0.0,
            vertex: source,
        });

        while let Some(QueueItem { distance, vertex }) = queue.pop() {
            if settled[vertex] {
                continue;
            }
            settled[vertex] = true;

            for &edge_id in self.graph.incident_edges(vertex) {
                let edge = &self.graph.edges()[edge_id];
                let candidate = distance + edge.weight;
                // Only a strict improvement replaces a known path
                let improves = match distances[edge.to] {
                    None => true,
                    Some(known) => candidate < known,
                };
                if improves {
                    distances[edge.to] = Some(candidate);
                    prev_edges[edge.to] = Some(edge_id);
                    queue.push(QueueItem {
                        distance: candidate,
                        vertex: edge.to,
                    });
                }
            }
        }

        trace!(source, reached = settled.iter().filter(|s| **s).count(), "computed shortest path tree");
        ShortestPathTree {
            distances,
            prev_edges,
        }
    }
}
