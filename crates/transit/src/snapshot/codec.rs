//! Binary snapshot encoding.
//!
//! Layout, all integers little-endian:
//!
//! | bytes  | content                               |
//! |--------|---------------------------------------|
//! | 0..4   | magic `TCSN`                          |
//! | 4..8   | format version (`u32`)                |
//! | 8..16  | payload length (`u64`)                |
//! | 16..24 | XxHash64 of the payload (`u64`)       |
//! | 24..   | protobuf payload ([`proto::TransportSnapshot`]) |
//!
//! The graph is stored edge by edge and restored as is; decoding never runs
//! the graph builder.

use std::collections::HashMap;

use prost::Message;
use tracing::{debug, info};
use twox_hash::XxHash64;

use crate::graph::{builder::StopVertices, DirectedWeightedGraph, Edge, EdgeLabel};
use crate::identifiers::{RouteName, StopName};
use crate::models::{
    BusRoute, Color, NetworkModel, RenderSettings, Result, RoutingSettings, Stop,
};
use crate::provider::TransitCatalogue;
use crate::router::RoutingEngine;
use crate::snapshot::proto;

pub const MAGIC: [u8; 4] = *b"TCSN";
pub const FORMAT_VERSION: u32 = 1;
pub const HEADER_LEN: usize = 24;
const CHECKSUM_SEED: u64 = 0x5443_534e;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("not a transport catalogue snapshot")]
    BadMagic,

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("snapshot is truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: u64, found: u64 },

    #[error("snapshot has {0} unexpected trailing bytes")]
    TrailingBytes(u64),

    #[error("payload checksum mismatch")]
    ChecksumMismatch,

    #[error("failed to decode payload: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("invalid contents: {0}")]
    Invalid(String),
}

/// Everything restored from a snapshot.
#[derive(Debug)]
pub struct Snapshot {
    pub catalogue: TransitCatalogue,
    pub render_settings: Option<RenderSettings>,
    pub engine: RoutingEngine,
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode the catalogue, render settings and a built engine into one blob.
///
/// Identical inputs always produce identical bytes.
pub fn serialize(
    catalogue: &TransitCatalogue,
    render_settings: Option<&RenderSettings>,
    engine: &RoutingEngine,
) -> Vec<u8> {
    let stops = catalogue.stops_sorted_by_name();
    let stop_indices: HashMap<&StopName, u32> = stops
        .iter()
        .enumerate()
        .map(|(index, stop)| (&stop.name, index as u32))
        .collect();

    let message = proto::TransportSnapshot {
        stops: stops
            .iter()
            .map(|stop| proto::Stop {
                name: stop.name.to_string(),
                latitude: stop.latitude(),
                longitude: stop.longitude(),
            })
            .collect(),
        distances: catalogue
            .distances()
            .map(|(from, to, meters)| proto::Distance {
                from: stop_indices[from],
                to: stop_indices[to],
                meters,
            })
            .collect(),
        buses: catalogue
            .routes_sorted_by_name()
            .into_iter()
            .map(|route| proto::Bus {
                name: route.name.to_string(),
                stops: route.stops.iter().map(|stop| stop_indices[stop]).collect(),
                is_circular: route.is_circular,
            })
            .collect(),
        render_settings: render_settings.map(encode_render_settings),
        router: Some(encode_router(engine)),
    };

    let payload = message.encode_to_vec();
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    bytes.extend_from_slice(&XxHash64::oneshot(CHECKSUM_SEED, &payload).to_le_bytes());
    bytes.extend_from_slice(&payload);

    info!(
        bytes = bytes.len(),
        stops = message.stops.len(),
        buses = message.buses.len(),
        "serialized snapshot"
    );
    bytes
}

fn encode_router(engine: &RoutingEngine) -> proto::Router {
    let settings = engine.settings();
    let graph = engine.graph();
    proto::Router {
        settings: Some(proto::RoutingSettings {
            bus_wait_time: settings.bus_wait_time,
            bus_velocity: settings.bus_velocity,
        }),
        graph: Some(proto::Graph {
            vertex_count: graph.vertex_count() as u64,
            edges: graph.edges().iter().map(encode_edge).collect(),
        }),
        stop_vertices: engine
            .stop_vertices()
            .iter()
            .map(|(stop, &vertex)| proto::StopVertex {
                stop: stop.to_string(),
                vertex: vertex as u64,
            })
            .collect(),
    }
}

fn encode_edge(edge: &Edge) -> proto::Edge {
    let (kind, name, span_count) = match &edge.label {
        EdgeLabel::Wait { stop } => (proto::EdgeKind::Wait, stop.to_string(), 0),
        EdgeLabel::Ride { route, span_count } => {
            (proto::EdgeKind::Ride, route.to_string(), *span_count)
        }
    };
    proto::Edge {
        from: edge.from as u64,
        to: edge.to as u64,
        weight: edge.weight,
        kind: kind as i32,
        name,
        span_count,
    }
}

fn encode_render_settings(settings: &RenderSettings) -> proto::RenderSettings {
    let offset = |[dx, dy]: [f64; 2]| Some(proto::Offset { dx, dy });
    proto::RenderSettings {
        width: settings.width,
        height: settings.height,
        padding: settings.padding,
        line_width: settings.line_width,
        stop_radius: settings.stop_radius,
        bus_label_font_size: settings.bus_label_font_size,
        bus_label_offset: offset(settings.bus_label_offset),
        stop_label_font_size: settings.stop_label_font_size,
        stop_label_offset: offset(settings.stop_label_offset),
        underlayer_color: Some(encode_color(&settings.underlayer_color)),
        underlayer_width: settings.underlayer_width,
        color_palette: settings.color_palette.iter().map(encode_color).collect(),
    }
}

fn encode_color(color: &Color) -> proto::Color {
    let kind = match color {
        Color::Named(name) => proto::color::Kind::Named(name.clone()),
        Color::Rgb(red, green, blue) => proto::color::Kind::Rgb(proto::Rgb {
            red: (*red).into(),
            green: (*green).into(),
            blue: (*blue).into(),
        }),
        Color::Rgba(red, green, blue, opacity) => proto::color::Kind::Rgba(proto::Rgba {
            red: (*red).into(),
            green: (*green).into(),
            blue: (*blue).into(),
            opacity: *opacity,
        }),
    };
    proto::Color { kind: Some(kind) }
}

// ============================================================================
// Decoding
// ============================================================================

/// Restore a snapshot produced by [`serialize`].
///
/// Any framing, checksum, decoding or consistency problem fails the whole
/// call with [`crate::models::TransitError::CorruptSnapshot`].
pub fn deserialize(bytes: &[u8]) -> Result<Snapshot> {
    let payload = unframe(bytes)?;
    let message = proto::TransportSnapshot::decode(payload).map_err(SnapshotError::from)?;
    let snapshot = decode_snapshot(message)?;
    info!(
        stops = snapshot.catalogue.stop_count(),
        buses = snapshot.catalogue.route_count(),
        edges = snapshot.engine.graph().edge_count(),
        "restored snapshot"
    );
    Ok(snapshot)
}

fn unframe(bytes: &[u8]) -> std::result::Result<&[u8], SnapshotError> {
    if bytes.len() < HEADER_LEN {
        return Err(SnapshotError::Truncated {
            expected: HEADER_LEN as u64,
            found: bytes.len() as u64,
        });
    }
    let (header, payload) = bytes.split_at(HEADER_LEN);

    if header[0..4] != MAGIC {
        return Err(SnapshotError::BadMagic);
    }

    let version = u32::from_le_bytes(read_array(&header[4..8]));
    if version != FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: version,
            expected: FORMAT_VERSION,
        });
    }

    let expected_len = u64::from_le_bytes(read_array(&header[8..16]));
    let actual_len = payload.len() as u64;
    if actual_len < expected_len {
        return Err(SnapshotError::Truncated {
            expected: expected_len,
            found: actual_len,
        });
    }
    if actual_len > expected_len {
        return Err(SnapshotError::TrailingBytes(actual_len - expected_len));
    }

    let checksum = u64::from_le_bytes(read_array(&header[16..24]));
    if XxHash64::oneshot(CHECKSUM_SEED, payload) != checksum {
        return Err(SnapshotError::ChecksumMismatch);
    }

    debug!(version, payload = actual_len, "snapshot header ok");
    Ok(payload)
}

fn read_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut array = [0; N];
    array.copy_from_slice(bytes);
    array
}

fn invalid(message: impl Into<String>) -> SnapshotError {
    SnapshotError::Invalid(message.into())
}

fn decode_snapshot(message: proto::TransportSnapshot) -> std::result::Result<Snapshot, SnapshotError> {
    let stops: Vec<Stop> = message
        .stops
        .into_iter()
        .map(|stop| Stop::new(stop.name, stop.latitude, stop.longitude))
        .collect();
    let stop_name = |index: u32| {
        stops
            .get(index as usize)
            .map(|stop| stop.name.clone())
            .ok_or_else(|| invalid(format!("stop index {index} out of range")))
    };

    let distances = message
        .distances
        .iter()
        .map(|distance| Ok((stop_name(distance.from)?, stop_name(distance.to)?, distance.meters)))
        .collect::<std::result::Result<Vec<_>, SnapshotError>>()?;

    let routes = message
        .buses
        .into_iter()
        .map(|bus| {
            let route_stops = bus
                .stops
                .iter()
                .map(|&index| stop_name(index))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(BusRoute::new(bus.name, route_stops, bus.is_circular))
        })
        .collect::<std::result::Result<Vec<_>, SnapshotError>>()?;

    let catalogue = TransitCatalogue::from_data(stops, distances, routes)
        .map_err(|err| invalid(err.to_string()))?;

    let render_settings = message
        .render_settings
        .map(decode_render_settings)
        .transpose()?;

    let router = message
        .router
        .ok_or_else(|| invalid("router section is missing"))?;
    let engine = decode_router(router, &catalogue)?;

    Ok(Snapshot {
        catalogue,
        render_settings,
        engine,
    })
}

fn decode_router(
    router: proto::Router,
    catalogue: &TransitCatalogue,
) -> std::result::Result<RoutingEngine, SnapshotError> {
    let settings = router
        .settings
        .ok_or_else(|| invalid("routing settings are missing"))?;
    let settings = RoutingSettings::new(settings.bus_wait_time, settings.bus_velocity);
    settings
        .validate()
        .map_err(|err| invalid(err.to_string()))?;

    let names = CatalogueNames(catalogue);

    // Waiting vertices are 0, 2, 4, ... in stop name order; arrived = waiting + 1
    let mut stop_vertices = StopVertices::new();
    for (index, entry) in router.stop_vertices.iter().enumerate() {
        if entry.vertex != index as u64 * 2 {
            return Err(invalid(format!(
                "stop {} mapped to vertex {}, expected {}",
                entry.stop,
                entry.vertex,
                index * 2
            )));
        }
        let stop = names.stop(&entry.stop)?;
        if let Some((last, _)) = stop_vertices.last_key_value() {
            if *last >= stop {
                return Err(invalid(format!("stop {} is out of order or mapped twice", stop)));
            }
        }
        stop_vertices.insert(stop, index * 2);
    }
    if stop_vertices.len() != catalogue.stop_count() {
        return Err(invalid(format!(
            "router maps {} stops, catalogue has {}",
            stop_vertices.len(),
            catalogue.stop_count()
        )));
    }

    let graph_message = router.graph.ok_or_else(|| invalid("graph is missing"))?;
    let vertex_count = stop_vertices.len() * 2;
    if graph_message.vertex_count != vertex_count as u64 {
        return Err(invalid(format!(
            "graph has {} vertices for {} stops",
            graph_message.vertex_count,
            stop_vertices.len()
        )));
    }
    let to_vertex = |vertex: u64| {
        usize::try_from(vertex)
            .ok()
            .filter(|&vertex| vertex < vertex_count)
            .ok_or_else(|| invalid(format!("vertex {vertex} out of range for {vertex_count} vertices")))
    };

    let mut graph = DirectedWeightedGraph::with_vertex_count(vertex_count);
    for edge in graph_message.edges {
        if !edge.weight.is_finite() || edge.weight < 0.0 {
            return Err(invalid(format!("edge weight {} is not a travel time", edge.weight)));
        }
        let label = match proto::EdgeKind::try_from(edge.kind) {
            Ok(proto::EdgeKind::Wait) => EdgeLabel::Wait {
                stop: names.stop(&edge.name)?,
            },
            Ok(proto::EdgeKind::Ride) => EdgeLabel::Ride {
                route: names.route(&edge.name)?,
                span_count: edge.span_count,
            },
            Err(_) => return Err(invalid(format!("unknown edge kind {}", edge.kind))),
        };
        graph.add_edge(Edge {
            from: to_vertex(edge.from)?,
            to: to_vertex(edge.to)?,
            weight: edge.weight,
            label,
        });
    }

    Ok(RoutingEngine::from_parts(settings, graph, stop_vertices))
}

/// Resolves router names against the decoded catalogue, reusing its
/// allocations. A name the catalogue does not know is a corrupt snapshot.
struct CatalogueNames<'a>(&'a TransitCatalogue);

impl CatalogueNames<'_> {
    fn stop(&self, name: &str) -> std::result::Result<StopName, SnapshotError> {
        self.0
            .stop(name)
            .map(|stop| stop.name.clone())
            .ok_or_else(|| invalid(format!("router refers to unknown stop {name}")))
    }

    fn route(&self, name: &str) -> std::result::Result<RouteName, SnapshotError> {
        self.0
            .route(name)
            .map(|route| route.name.clone())
            .ok_or_else(|| invalid(format!("router refers to unknown route {name}")))
    }
}

fn decode_render_settings(
    settings: proto::RenderSettings,
) -> std::result::Result<RenderSettings, SnapshotError> {
    let offset = |offset: Option<proto::Offset>| {
        offset
            .map(|offset| [offset.dx, offset.dy])
            .ok_or_else(|| invalid("label offset is missing"))
    };
    Ok(RenderSettings {
        width: settings.width,
        height: settings.height,
        padding: settings.padding,
        line_width: settings.line_width,
        stop_radius: settings.stop_radius,
        bus_label_font_size: settings.bus_label_font_size,
        bus_label_offset: offset(settings.bus_label_offset)?,
        stop_label_font_size: settings.stop_label_font_size,
        stop_label_offset: offset(settings.stop_label_offset)?,
        underlayer_color: decode_color(
            settings
                .underlayer_color
                .ok_or_else(|| invalid("underlayer color is missing"))?,
        )?,
        underlayer_width: settings.underlayer_width,
        color_palette: settings
            .color_palette
            .into_iter()
            .map(decode_color)
            .collect::<std::result::Result<_, _>>()?,
    })
}

fn decode_color(color: proto::Color) -> std::result::Result<Color, SnapshotError> {
    let channel = |value: u32| {
        u8::try_from(value).map_err(|_| invalid(format!("color channel {value} exceeds 255")))
    };
    match color.kind {
        Some(proto::color::Kind::Named(name)) => Ok(Color::Named(name)),
        Some(proto::color::Kind::Rgb(rgb)) => Ok(Color::Rgb(
            channel(rgb.red)?,
            channel(rgb.green)?,
            channel(rgb.blue)?,
        )),
        Some(proto::color::Kind::Rgba(rgba)) => Ok(Color::Rgba(
            channel(rgba.red)?,
            channel(rgba.green)?,
            channel(rgba.blue)?,
            rgba.opacity,
        )),
        None => Err(invalid("color without a value")),
    }
}
