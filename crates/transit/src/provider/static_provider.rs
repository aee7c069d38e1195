//! In-memory transport catalogue.
//!
//! Stops and routes live in owned tables and refer to each other by interned
//! name only. Sorted views are precomputed so graph building and snapshotting
//! always see the same order.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::identifiers::*;
use crate::models::{traits::*, types::*};
use crate::spatial::queries::haversine_distance;

/// In-memory store of stops, routes and road distances
#[derive(Clone, Debug, Default)]
pub struct TransitCatalogue {
    // Core data, ordered by name
    stops: BTreeMap<StopName, Stop>,
    routes: BTreeMap<RouteName, BusRoute>,
    distances: BTreeMap<(StopName, StopName), u32>,

    // Reverse lookup
    buses_by_stop: HashMap<StopName, BTreeSet<RouteName>>,
}

impl TransitCatalogue {
    /// Create a new empty catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalogue from raw data (used by the snapshot decoder)
    pub fn from_data(
        stops: Vec<Stop>,
        distances: Vec<(StopName, StopName, u32)>,
        routes: Vec<BusRoute>,
    ) -> Result<Self> {
        let mut catalogue = Self::new();
        for stop in stops {
            catalogue.add_stop(stop)?;
        }
        for (from, to, meters) in distances {
            catalogue.set_distance(&from, &to, meters)?;
        }
        for route in routes {
            catalogue.add_route(route)?;
        }
        Ok(catalogue)
    }

    pub fn add_stop(&mut self, stop: Stop) -> Result<()> {
        if self.stops.contains_key(&stop.name) {
            return Err(TransitError::InvalidData(format!(
                "duplicate stop: {}",
                stop.name
            )));
        }
        self.buses_by_stop.insert(stop.name.clone(), BTreeSet::new());
        self.stops.insert(stop.name.clone(), stop);
        Ok(())
    }

    /// Record the road distance driven from `from` to `to`.
    ///
    /// Setting the same pair twice keeps the latest value.
    pub fn set_distance(&mut self, from: &StopName, to: &StopName, meters: u32) -> Result<()> {
        let from = self.interned_stop(from)?;
        let to = self.interned_stop(to)?;
        self.distances.insert((from, to), meters);
        Ok(())
    }

    pub fn add_route(&mut self, route: BusRoute) -> Result<()> {
        if self.routes.contains_key(&route.name) {
            return Err(TransitError::InvalidData(format!(
                "duplicate route: {}",
                route.name
            )));
        }
        if route.stops.is_empty() {
            return Err(TransitError::BadNetwork(format!(
                "route {} has no stops",
                route.name
            )));
        }

        // Re-intern stop names so every route shares the catalogue's Arcs
        let stops = route
            .stops
            .iter()
            .map(|name| self.interned_stop(name))
            .collect::<Result<Vec<_>>>()?;

        for stop in &stops {
            if let Some(buses) = self.buses_by_stop.get_mut(stop) {
                buses.insert(route.name.clone());
            }
        }

        debug!(route = %route.name, stops = stops.len(), "added route");
        self.routes.insert(
            route.name.clone(),
            BusRoute {
                stops,
                ..route
            },
        );
        Ok(())
    }

    fn interned_stop(&self, name: &StopName) -> Result<StopName> {
        self.stops
            .get_key_value(name.as_str())
            .map(|(key, _)| key.clone())
            .ok_or_else(|| TransitError::StopNotFound(name.clone()))
    }

    // ---- Lookups ----

    pub fn stop(&self, name: &str) -> Option<&Stop> {
        self.stops.get(name)
    }

    pub fn route(&self, name: &str) -> Option<&BusRoute> {
        self.routes.get(name)
    }

    /// Names of the routes that serve a stop, or `None` for an unknown stop.
    pub fn buses_by_stop(&self, name: &str) -> Option<&BTreeSet<RouteName>> {
        self.buses_by_stop.get(name)
    }

    /// Distance as it was recorded, without the reverse-direction fallback.
    pub fn explicit_distance(&self, from: &StopName, to: &StopName) -> Option<u32> {
        self.distances.get(&(from.clone(), to.clone())).copied()
    }

    /// Every recorded distance, ordered by (from, to).
    pub fn distances(&self) -> impl Iterator<Item = (&StopName, &StopName, u32)> + '_ {
        self.distances
            .iter()
            .map(|((from, to), meters)| (from, to, *meters))
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    // ---- Statistics ----

    pub fn bus_stat(&self, name: &str) -> Result<BusStat> {
        let route = self
            .routes
            .get(name)
            .ok_or_else(|| TransitError::RouteNotFound(RouteName::new(name)))?;

        let unique_stop_count = route.stops.iter().collect::<BTreeSet<_>>().len();

        let mut route_length = 0u64;
        let mut geographic_length = 0.0;
        for pair in route.stops.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            route_length += u64::from(self.required_distance(route, from, to)?);
            if !route.is_circular {
                route_length += u64::from(self.required_distance(route, to, from)?);
            }
            geographic_length += haversine_distance(self.stops[from].location, self.stops[to].location);
        }
        if !route.is_circular {
            geographic_length *= 2.0;
        }

        let curvature = if geographic_length > 0.0 {
            route_length as f64 / geographic_length
        } else {
            0.0
        };

        Ok(BusStat {
            stop_count: route.stop_count(),
            unique_stop_count,
            route_length,
            curvature,
        })
    }

    fn required_distance(&self, route: &BusRoute, from: &StopName, to: &StopName) -> Result<u32> {
        self.distance(from, to).ok_or_else(|| {
            TransitError::BadNetwork(format!(
                "route {} has no distance from {} to {}",
                route.name, from, to
            ))
        })
    }
}

impl NetworkModel for TransitCatalogue {
    fn stops_sorted_by_name(&self) -> Vec<&Stop> {
        self.stops.values().collect()
    }

    fn routes_sorted_by_name(&self) -> Vec<&BusRoute> {
        self.routes.values().collect()
    }

    /// Falls back to the opposite direction when only that one was recorded.
    fn distance(&self, from: &StopName, to: &StopName) -> Option<u32> {
        self.explicit_distance(from, to)
            .or_else(|| self.explicit_distance(to, from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn names(stops: &[&str]) -> Vec<StopName> {
        stops.iter().copied().map(StopName::from).collect()
    }

    fn sample_catalogue() -> TransitCatalogue {
        let mut catalogue = TransitCatalogue::new();
        catalogue.add_stop(Stop::new("Tolstopaltsevo", 55.611087, 37.20829)).unwrap();
        catalogue.add_stop(Stop::new("Marushkino", 55.595884, 37.209755)).unwrap();
        catalogue.add_stop(Stop::new("Rasskazovka", 55.632761, 37.333324)).unwrap();
        catalogue.add_stop(Stop::new("Biryusinka", 55.581065, 37.64839)).unwrap();

        let tolstopaltsevo = StopName::new("Tolstopaltsevo");
        let marushkino = StopName::new("Marushkino");
        let rasskazovka = StopName::new("Rasskazovka");
        catalogue.set_distance(&tolstopaltsevo, &marushkino, 3900).unwrap();
        catalogue.set_distance(&marushkino, &rasskazovka, 9900).unwrap();
        catalogue.set_distance(&marushkino, &marushkino, 100).unwrap();
        catalogue.set_distance(&rasskazovka, &marushkino, 9500).unwrap();

        catalogue
            .add_route(BusRoute::new(
                "750",
                names(&["Tolstopaltsevo", "Marushkino", "Marushkino", "Rasskazovka"]),
                false,
            ))
            .unwrap();
        catalogue
    }

    #[test]
    fn test_empty_catalogue() {
        let catalogue = TransitCatalogue::new();
        assert_eq!(catalogue.stops_sorted_by_name().len(), 0);
        assert_eq!(catalogue.routes_sorted_by_name().len(), 0);
    }

    #[test]
    fn test_sorted_views() {
        let catalogue = sample_catalogue();
        let stops: Vec<&str> = catalogue
            .stops_sorted_by_name()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(stops, vec!["Biryusinka", "Marushkino", "Rasskazovka", "Tolstopaltsevo"]);
    }

    #[test]
    fn test_distance_fallback() {
        let catalogue = sample_catalogue();
        let tolstopaltsevo = StopName::new("Tolstopaltsevo");
        let marushkino = StopName::new("Marushkino");
        let rasskazovka = StopName::new("Rasskazovka");

        assert_eq!(catalogue.distance(&marushkino, &rasskazovka), Some(9900));
        assert_eq!(catalogue.distance(&rasskazovka, &marushkino), Some(9500));
        // Only the forward direction was recorded
        assert_eq!(catalogue.explicit_distance(&marushkino, &tolstopaltsevo), None);
        assert_eq!(catalogue.distance(&marushkino, &tolstopaltsevo), Some(3900));
        assert_eq!(catalogue.distance(&tolstopaltsevo, &rasskazovka), None);
    }

    #[test]
    fn test_bus_stat() {
        let catalogue = sample_catalogue();
        let stat = catalogue.bus_stat("750").unwrap();

        assert_eq!(stat.stop_count, 7);
        assert_eq!(stat.unique_stop_count, 3);
        assert_eq!(stat.route_length, 3900 + 3900 + 100 + 100 + 9900 + 9500);
        assert_relative_eq!(stat.curvature, 1.30853, epsilon = 1e-4);
    }

    #[test]
    fn test_bus_stat_unknown_route() {
        let catalogue = sample_catalogue();
        assert!(matches!(
            catalogue.bus_stat("751"),
            Err(TransitError::RouteNotFound(_))
        ));
    }

    #[test]
    fn test_buses_by_stop() {
        let catalogue = sample_catalogue();
        let buses = catalogue.buses_by_stop("Marushkino").unwrap();
        assert_eq!(buses.iter().map(RouteName::as_str).collect::<Vec<_>>(), vec!["750"]);
        assert!(catalogue.buses_by_stop("Biryusinka").unwrap().is_empty());
        assert!(catalogue.buses_by_stop("Prazhskaya").is_none());
    }

    #[test]
    fn test_rejects_unknown_stop_in_route() {
        let mut catalogue = sample_catalogue();
        let err = catalogue
            .add_route(BusRoute::new("256", names(&["Biryusinka", "Prazhskaya"]), true))
            .unwrap_err();
        assert!(matches!(err, TransitError::StopNotFound(name) if name.as_str() == "Prazhskaya"));
        assert!(catalogue.route("256").is_none());
    }

    #[test]
    fn test_rejects_duplicates_and_empty_routes() {
        let mut catalogue = sample_catalogue();
        assert!(matches!(
            catalogue.add_stop(Stop::new("Marushkino", 0.0, 0.0)),
            Err(TransitError::InvalidData(_))
        ));
        assert!(matches!(
            catalogue.add_route(BusRoute::new("750", names(&["Marushkino"]), true)),
            Err(TransitError::InvalidData(_))
        ));
        assert!(matches!(
            catalogue.add_route(BusRoute::new("0", vec![], true)),
            Err(TransitError::BadNetwork(_))
        ));
    }
}
