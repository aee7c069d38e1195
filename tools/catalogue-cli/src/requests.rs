//! JSON input documents and loading base requests into a catalogue.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;
use transport_catalogue::{
    BusRoute, RenderSettings, RoutingSettings, Stop, StopName, TransitCatalogue,
};

/// Where the snapshot lives on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct SerializationSettings {
    pub file: PathBuf,
}

/// Input of `make-base`.
#[derive(Debug, Clone, Deserialize)]
pub struct BaseDocument {
    #[serde(default)]
    pub base_requests: Vec<BaseRequest>,
    #[serde(default)]
    pub render_settings: Option<RenderSettings>,
    pub routing_settings: RoutingSettings,
    pub serialization_settings: SerializationSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum BaseRequest {
    Stop {
        name: String,
        latitude: f64,
        longitude: f64,
        /// Road distance in meters from this stop to each neighbour.
        #[serde(default)]
        road_distances: BTreeMap<String, u32>,
    },
    Bus {
        name: String,
        stops: Vec<String>,
        is_roundtrip: bool,
    },
}

/// Input of `process-requests`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatDocument {
    pub serialization_settings: SerializationSettings,
    #[serde(default)]
    pub stat_requests: Vec<StatRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatRequest {
    pub id: i64,
    #[serde(flatten)]
    pub kind: StatKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum StatKind {
    Stop { name: String },
    Bus { name: String },
    Route { from: String, to: String },
    Map,
}

/// Build a catalogue from base requests.
///
/// Requests may appear in any order: stops are added first, then road
/// distances, then buses.
pub fn load_catalogue(requests: &[BaseRequest]) -> transport_catalogue::Result<TransitCatalogue> {
    let mut catalogue = TransitCatalogue::new();

    for request in requests {
        if let BaseRequest::Stop {
            name,
            latitude,
            longitude,
            ..
        } = request
        {
            catalogue.add_stop(Stop::new(name.as_str(), *latitude, *longitude))?;
        }
    }

    for request in requests {
        if let BaseRequest::Stop {
            name,
            road_distances,
            ..
        } = request
        {
            let from = StopName::new(name);
            for (to, meters) in road_distances {
                catalogue.set_distance(&from, &StopName::new(to), *meters)?;
            }
        }
    }

    for request in requests {
        if let BaseRequest::Bus {
            name,
            stops,
            is_roundtrip,
        } = request
        {
            let stops = stops.iter().map(StopName::new).collect();
            catalogue.add_route(BusRoute::new(name.as_str(), stops, *is_roundtrip))?;
        }
    }

    debug!(
        stops = catalogue.stop_count(),
        routes = catalogue.route_count(),
        "loaded base requests"
    );
    Ok(catalogue)
}
