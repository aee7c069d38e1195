//! Answers stat requests against a catalogue and its routing engine.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;
use transport_catalogue::{
    EdgeLabel, RouteInfo, RoutingEngine, StopName, TransitCatalogue, TransitError, VertexId,
};

use crate::requests::{StatKind, StatRequest};

const NOT_FOUND: &str = "not found";
const MAP_UNSUPPORTED: &str = "map rendering is not supported";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Stop {
        request_id: i64,
        buses: Vec<String>,
    },
    Bus {
        request_id: i64,
        curvature: f64,
        route_length: u64,
        stop_count: usize,
        unique_stop_count: usize,
    },
    Route {
        request_id: i64,
        total_time: f64,
        items: Vec<RouteItem>,
    },
    Error {
        request_id: i64,
        error_message: String,
    },
}

/// One step of a journey, in the order a passenger experiences it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum RouteItem {
    Wait { stop_name: String, time: f64 },
    Bus { bus: String, span_count: u32, time: f64 },
}

pub struct RequestHandler<'a> {
    catalogue: &'a TransitCatalogue,
    engine: &'a RoutingEngine,
    boarding_stops: HashMap<VertexId, &'a StopName>,
}

impl<'a> RequestHandler<'a> {
    pub fn new(catalogue: &'a TransitCatalogue, engine: &'a RoutingEngine) -> Self {
        let boarding_stops = engine
            .stop_vertices()
            .iter()
            .map(|(name, &vertex)| (vertex, name))
            .collect();
        Self {
            catalogue,
            engine,
            boarding_stops,
        }
    }

    pub fn handle(&self, request: &StatRequest) -> Response {
        let request_id = request.id;
        let answer = match &request.kind {
            StatKind::Stop { name } => self.stop(request_id, name),
            StatKind::Bus { name } => self.bus(request_id, name),
            StatKind::Route { from, to } => self.route(request_id, from, to),
            StatKind::Map => Err(MAP_UNSUPPORTED.to_owned()),
        };
        answer.unwrap_or_else(|error_message| Response::Error {
            request_id,
            error_message,
        })
    }

    pub fn handle_all(&self, requests: &[StatRequest]) -> Vec<Response> {
        requests.iter().map(|request| self.handle(request)).collect()
    }

    fn stop(&self, request_id: i64, name: &str) -> Result<Response, String> {
        let buses = self
            .catalogue
            .buses_by_stop(name)
            .ok_or_else(|| NOT_FOUND.to_owned())?;
        Ok(Response::Stop {
            request_id,
            buses: buses.iter().map(|bus| bus.to_string()).collect(),
        })
    }

    fn bus(&self, request_id: i64, name: &str) -> Result<Response, String> {
        let stat = self.catalogue.bus_stat(name).map_err(describe)?;
        Ok(Response::Bus {
            request_id,
            curvature: stat.curvature,
            route_length: stat.route_length,
            stop_count: stat.stop_count,
            unique_stop_count: stat.unique_stop_count,
        })
    }

    fn route(&self, request_id: i64, from: &str, to: &str) -> Result<Response, String> {
        let route = self
            .engine
            .find_route(from, to)
            .map_err(describe)?
            .ok_or_else(|| NOT_FOUND.to_owned())?;
        Ok(Response::Route {
            request_id,
            total_time: route.weight,
            items: self.journey(&route)?,
        })
    }

    /// Every ride is presented as a wait at its boarding stop followed by the
    /// ride itself. The graph charges that wait on the wait edge after the
    /// ride, so the wait time shown is that edge's weight and the items add up
    /// to the route weight.
    fn journey(&self, route: &RouteInfo) -> Result<Vec<RouteItem>, String> {
        let mut items = Vec::with_capacity(route.edges.len());
        let mut pending_ride = None;

        for &id in &route.edges {
            let edge = self
                .engine
                .edge(id)
                .ok_or_else(|| format!("route references missing edge {id}"))?;
            match &edge.label {
                EdgeLabel::Ride { route: bus, span_count } => {
                    let stop = self
                        .boarding_stops
                        .get(&edge.from)
                        .ok_or_else(|| format!("edge {id} does not start at a stop"))?;
                    if pending_ride.replace((*stop, bus, *span_count, edge.weight)).is_some() {
                        return Err(format!("edge {id} boards without waiting"));
                    }
                }
                EdgeLabel::Wait { .. } => {
                    let (stop, bus, span_count, ride_time) = pending_ride
                        .take()
                        .ok_or_else(|| format!("edge {id} waits without a ride"))?;
                    items.push(RouteItem::Wait {
                        stop_name: stop.to_string(),
                        time: edge.weight,
                    });
                    items.push(RouteItem::Bus {
                        bus: bus.to_string(),
                        span_count,
                        time: ride_time,
                    });
                }
            }
        }

        if pending_ride.is_some() {
            return Err("route ends on a bus".to_owned());
        }
        Ok(items)
    }
}

fn describe(error: TransitError) -> String {
    match error {
        TransitError::StopNotFound(_) | TransitError::RouteNotFound(_) => NOT_FOUND.to_owned(),
        other => {
            warn!(error = %other, "request failed");
            other.to_string()
        }
    }
}
