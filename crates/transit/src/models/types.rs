//! Core data types for the transport catalogue.

use geo::Point;

use crate::identifiers::*;
use crate::snapshot::SnapshotError;

// ============================================================================
// Data Structures
// ============================================================================

/// A named stop.
///
/// `location` stores longitude as `x` and latitude as `y`, following the
/// `geo` convention.
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub name: StopName,
    pub location: Point,
}

impl Stop {
    pub fn new(name: impl Into<StopName>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            location: Point::new(longitude, latitude),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.location.y()
    }

    pub fn longitude(&self) -> f64 {
        self.location.x()
    }
}

/// A bus route: an ordered list of stops served by one bus.
///
/// A circular route already lists its way back to the first stop and is only
/// driven forward. Any other route is driven to its last stop and back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BusRoute {
    pub name: RouteName,
    pub stops: Vec<StopName>,
    pub is_circular: bool,
}

impl BusRoute {
    pub fn new(name: impl Into<RouteName>, stops: Vec<StopName>, is_circular: bool) -> Self {
        Self {
            name: name.into(),
            stops,
            is_circular,
        }
    }

    /// Number of stops a bus visits on one full trip.
    pub fn stop_count(&self) -> usize {
        match (self.is_circular, self.stops.len()) {
            (_, 0) => 0,
            (true, n) => n,
            (false, n) => n * 2 - 1,
        }
    }
}

/// Routing parameters fixed when the graph is built.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutingSettings {
    /// Minutes spent waiting at a stop before each boarding.
    pub bus_wait_time: u32,
    /// Bus speed in km/h.
    pub bus_velocity: f64,
}

impl RoutingSettings {
    pub fn new(bus_wait_time: u32, bus_velocity: f64) -> Self {
        Self {
            bus_wait_time,
            bus_velocity,
        }
    }

    /// Bus speed converted to meters per minute.
    pub fn meters_per_minute(&self) -> f64 {
        self.bus_velocity * 1000.0 / 60.0
    }

    pub fn validate(&self) -> Result<()> {
        if !self.bus_velocity.is_finite() || self.bus_velocity <= 0.0 {
            return Err(TransitError::BadNetwork(format!(
                "bus velocity must be a positive number, got {}",
                self.bus_velocity
            )));
        }
        Ok(())
    }
}

/// Summary of a single bus route.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BusStat {
    pub stop_count: usize,
    pub unique_stop_count: usize,
    /// Road length in meters, summed from the catalogue's stop distances.
    pub route_length: u64,
    /// Road length divided by the great-circle length of the same trip.
    pub curvature: f64,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("Stop not found: {0}")]
    StopNotFound(StopName),

    #[error("Route not found: {0}")]
    RouteNotFound(RouteName),

    #[error("Bad network: {0}")]
    BadNetwork(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(#[from] SnapshotError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransitError>;
