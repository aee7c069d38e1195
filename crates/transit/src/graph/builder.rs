//! Builds the routing graph from a network model.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::graph::{DirectedWeightedGraph, Edge, EdgeLabel, VertexId};
use crate::identifiers::StopName;
use crate::models::{BusRoute, NetworkModel, Result, RoutingSettings, TransitError};

/// Stop name to the id of its waiting vertex. The arrived vertex is `id + 1`.
pub type StopVertices = BTreeMap<StopName, VertexId>;

pub struct GraphBuilder {
    settings: RoutingSettings,
}

impl GraphBuilder {
    pub fn new(settings: RoutingSettings) -> Self {
        Self { settings }
    }

    /// Build the graph and the stop-to-vertex mapping.
    ///
    /// Fails without producing anything if a route names an unknown stop, has
    /// no stops, or lacks a distance between two consecutive stops.
    pub fn build(&self, model: &impl NetworkModel) -> Result<(DirectedWeightedGraph, StopVertices)> {
        self.settings.validate()?;

        let stops = model.stops_sorted_by_name();
        let mut stop_vertices = StopVertices::new();
        for (index, stop) in stops.iter().enumerate() {
            if stop_vertices.insert(stop.name.clone(), index * 2).is_some() {
                return Err(TransitError::BadNetwork(format!(
                    "stop {} is listed twice",
                    stop.name
                )));
            }
        }

        let mut graph = DirectedWeightedGraph::with_vertex_count(stops.len() * 2);
        let wait_time = f64::from(self.settings.bus_wait_time);
        for stop in &stops {
            let waiting = stop_vertices[&stop.name];
            graph.add_edge(Edge {
                from: waiting + 1,
                to: waiting,
                weight: wait_time,
                label: EdgeLabel::Wait {
                    stop: stop.name.clone(),
                },
            });
        }

        for route in model.routes_sorted_by_name() {
            self.add_route(model, route, &stop_vertices, &mut graph)?;
        }

        info!(
            stops = stops.len(),
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "built routing graph"
        );
        Ok((graph, stop_vertices))
    }

    fn add_route(
        &self,
        model: &impl NetworkModel,
        route: &BusRoute,
        stop_vertices: &StopVertices,
        graph: &mut DirectedWeightedGraph,
    ) -> Result<()> {
        if route.stops.is_empty() {
            return Err(TransitError::BadNetwork(format!(
                "route {} has no stops",
                route.name
            )));
        }

        let vertices = route
            .stops
            .iter()
            .map(|stop| {
                stop_vertices.get(stop).copied().ok_or_else(|| {
                    TransitError::BadNetwork(format!(
                        "route {} references unknown stop {}",
                        route.name, stop
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let forward = prefix_distances(model, route, false)?;
        let backward = if route.is_circular {
            None
        } else {
            Some(prefix_distances(model, route, true)?)
        };

        let meters_per_minute = self.settings.meters_per_minute();
        let before = graph.edge_count();
        for i in 0..vertices.len() {
            for j in i + 1..vertices.len() {
                let label = EdgeLabel::Ride {
                    route: route.name.clone(),
                    span_count: (j - i) as u32,
                };

                graph.add_edge(Edge {
                    from: vertices[i],
                    to: vertices[j] + 1,
                    weight: (forward[j] - forward[i]) as f64 / meters_per_minute,
                    label: label.clone(),
                });

                if let Some(backward) = &backward {
                    graph.add_edge(Edge {
                        from: vertices[j],
                        to: vertices[i] + 1,
                        weight: (backward[j] - backward[i]) as f64 / meters_per_minute,
                        label,
                    });
                }
            }
        }

        debug!(
            route = %route.name,
            circular = route.is_circular,
            edges = graph.edge_count() - before,
            "added ride edges"
        );
        Ok(())
    }
}

/// Cumulative road distance from the first stop to each stop of the route.
///
/// With `against_direction` each leg is measured from the later stop back to
/// the earlier one, so `result[j] - result[i]` is the distance driven from
/// stop `j` to stop `i`.
fn prefix_distances(
    model: &impl NetworkModel,
    route: &BusRoute,
    against_direction: bool,
) -> Result<Vec<u64>> {
    let mut prefix = Vec::with_capacity(route.stops.len());
    prefix.push(0u64);
    for pair in route.stops.windows(2) {
        let (from, to) = if against_direction {
            (&pair[1], &pair[0])
        } else {
            (&pair[0], &pair[1])
        };
        let meters = model.distance(from, to).ok_or_else(|| {
            TransitError::BadNetwork(format!(
                "route {} has no distance from {} to {}",
                route.name, from, to
            ))
        })?;
        let last = prefix[prefix.len() - 1];
        prefix.push(last + u64::from(meters));
    }
    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::RouteName;
    use crate::models::Stop;
    use crate::provider::TransitCatalogue;
    use approx::assert_relative_eq;

    fn names(stops: &[&str]) -> Vec<StopName> {
        stops.iter().copied().map(StopName::from).collect()
    }

    fn catalogue(circular: bool) -> TransitCatalogue {
        let mut catalogue = TransitCatalogue::new();
        for name in ["C", "A", "B"] {
            catalogue.add_stop(Stop::new(name, 55.0, 37.0)).unwrap();
        }
        let (a, b, c) = (StopName::new("A"), StopName::new("B"), StopName::new("C"));
        catalogue.set_distance(&a, &b, 1000).unwrap();
        catalogue.set_distance(&b, &c, 1000).unwrap();
        catalogue.set_distance(&c, &b, 2000).unwrap();
        catalogue.set_distance(&b, &a, 3000).unwrap();
        catalogue.set_distance(&c, &a, 500).unwrap();

        let stops = if circular {
            names(&["A", "B", "C", "A"])
        } else {
            names(&["A", "B", "C"])
        };
        catalogue
            .add_route(BusRoute::new("R1", stops, circular))
            .unwrap();
        catalogue
    }

    fn ride_edges<'a>(graph: &'a DirectedWeightedGraph) -> Vec<&'a Edge> {
        graph
            .edges()
            .iter()
            .filter(|edge| matches!(edge.label, EdgeLabel::Ride { .. }))
            .collect()
    }

    fn find_ride(graph: &DirectedWeightedGraph, from: VertexId, to: VertexId) -> Option<&Edge> {
        ride_edges(graph)
            .into_iter()
            .find(|edge| edge.from == from && edge.to == to)
    }

    #[test]
    fn test_vertex_ids_follow_name_order() {
        let (graph, stop_vertices) = GraphBuilder::new(RoutingSettings::new(6, 60.0))
            .build(&catalogue(false))
            .unwrap();

        assert_eq!(graph.vertex_count(), 6);
        assert_eq!(stop_vertices["A"], 0);
        assert_eq!(stop_vertices["B"], 2);
        assert_eq!(stop_vertices["C"], 4);
    }

    #[test]
    fn test_one_wait_edge_per_stop() {
        let (graph, stop_vertices) = GraphBuilder::new(RoutingSettings::new(6, 60.0))
            .build(&catalogue(false))
            .unwrap();

        for (stop, &waiting) in &stop_vertices {
            let waits: Vec<&Edge> = graph
                .edges()
                .iter()
                .filter(|edge| edge.label == EdgeLabel::Wait { stop: stop.clone() })
                .collect();
            assert_eq!(waits.len(), 1);
            assert_eq!(waits[0].from, waiting + 1);
            assert_eq!(waits[0].to, waiting);
            assert_eq!(waits[0].weight, 6.0);
        }
    }

    #[test]
    fn test_linear_route_edges() {
        let (graph, v) = GraphBuilder::new(RoutingSettings::new(6, 60.0))
            .build(&catalogue(false))
            .unwrap();
        let (a, b, c) = (v["A"], v["B"], v["C"]);

        // 3 pairs, both directions
        assert_eq!(ride_edges(&graph).len(), 6);

        assert_relative_eq!(find_ride(&graph, a, b + 1).unwrap().weight, 1.0);
        assert_relative_eq!(find_ride(&graph, b, c + 1).unwrap().weight, 1.0);
        assert_relative_eq!(find_ride(&graph, a, c + 1).unwrap().weight, 2.0);
        assert_relative_eq!(find_ride(&graph, c, b + 1).unwrap().weight, 2.0);
        assert_relative_eq!(find_ride(&graph, b, a + 1).unwrap().weight, 3.0);
        // Reverse ride follows the route back through B, not the direct C->A distance
        assert_relative_eq!(find_ride(&graph, c, a + 1).unwrap().weight, 5.0);

        let label = &find_ride(&graph, c, a + 1).unwrap().label;
        assert_eq!(
            label,
            &EdgeLabel::Ride {
                route: RouteName::new("R1"),
                span_count: 2
            }
        );
    }

    #[test]
    fn test_circular_route_edges() {
        let (graph, v) = GraphBuilder::new(RoutingSettings::new(6, 60.0))
            .build(&catalogue(true))
            .unwrap();
        let (a, b, c) = (v["A"], v["B"], v["C"]);

        // 4 positions, forward pairs only
        assert_eq!(ride_edges(&graph).len(), 6);
        assert!(find_ride(&graph, b, a + 1).is_some());
        assert!(find_ride(&graph, c, b + 1).is_none());

        assert_relative_eq!(find_ride(&graph, a, c + 1).unwrap().weight, 2.0);
        assert_relative_eq!(find_ride(&graph, c, a + 1).unwrap().weight, 0.5);
        // A back to A around the loop
        let around = find_ride(&graph, a, a + 1).unwrap();
        assert_relative_eq!(around.weight, 2.5);
        assert_eq!(around.label.span_count(), 3);
    }

    #[test]
    fn test_weight_uses_velocity() {
        let (graph, v) = GraphBuilder::new(RoutingSettings::new(6, 40.0))
            .build(&catalogue(false))
            .unwrap();
        assert_relative_eq!(
            find_ride(&graph, v["A"], v["B"] + 1).unwrap().weight,
            1000.0 / (40.0 * 1000.0 / 60.0)
        );
    }

    #[test]
    fn test_missing_distance_is_bad_network() {
        let mut catalogue = catalogue(false);
        catalogue.add_stop(Stop::new("D", 55.0, 37.0)).unwrap();
        catalogue
            .add_route(BusRoute::new("R2", names(&["C", "D"]), false))
            .unwrap();

        let result = GraphBuilder::new(RoutingSettings::new(6, 60.0)).build(&catalogue);
        assert!(matches!(result, Err(TransitError::BadNetwork(_))));
    }

    #[test]
    fn test_invalid_velocity_is_bad_network() {
        let result = GraphBuilder::new(RoutingSettings::new(6, 0.0)).build(&catalogue(false));
        assert!(matches!(result, Err(TransitError::BadNetwork(_))));
    }

    struct DanglingNetwork {
        stops: Vec<Stop>,
        routes: Vec<BusRoute>,
    }

    impl NetworkModel for DanglingNetwork {
        fn stops_sorted_by_name(&self) -> Vec<&Stop> {
            self.stops.iter().collect()
        }

        fn routes_sorted_by_name(&self) -> Vec<&BusRoute> {
            self.routes.iter().collect()
        }

        fn distance(&self, _from: &StopName, _to: &StopName) -> Option<u32> {
            Some(100)
        }
    }

    #[test]
    fn test_unknown_stop_is_bad_network() {
        let network = DanglingNetwork {
            stops: vec![Stop::new("A", 0.0, 0.0)],
            routes: vec![BusRoute::new("R", names(&["A", "Z"]), true)],
        };
        let result = GraphBuilder::new(RoutingSettings::new(6, 60.0)).build(&network);
        assert!(matches!(result, Err(TransitError::BadNetwork(msg)) if msg.contains('Z')));
    }

    #[test]
    fn test_empty_route_is_bad_network() {
        let network = DanglingNetwork {
            stops: vec![Stop::new("A", 0.0, 0.0)],
            routes: vec![BusRoute::new("R", vec![], true)],
        };
        let result = GraphBuilder::new(RoutingSettings::new(6, 60.0)).build(&network);
        assert!(matches!(result, Err(TransitError::BadNetwork(_))));
    }

    #[test]
    fn test_builds_are_deterministic() {
        let builder = GraphBuilder::new(RoutingSettings::new(6, 60.0));
        let first = builder.build(&catalogue(false)).unwrap();
        let second = builder.build(&catalogue(false)).unwrap();
        assert_eq!(first, second);
    }
}
