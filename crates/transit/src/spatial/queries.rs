//! Great-circle distances between stops.
//!
//! Only used for route statistics; routing itself works on road distances.

use geo::{HaversineDistance, Point};

/// Calculate Haversine distance between two points in meters
pub fn haversine_distance(p1: Point, p2: Point) -> f64 {
    p1.haversine_distance(&p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Tolstopaltsevo to Marushkino is a little under 1.7 km
        let tolstopaltsevo = Point::new(37.20829, 55.611087);
        let marushkino = Point::new(37.209755, 55.595884);

        let dist = haversine_distance(tolstopaltsevo, marushkino);
        assert!((dist - 1_693.0).abs() < 10.0);
    }

    #[test]
    fn test_same_point() {
        let p = Point::new(37.64839, 55.581065);
        assert_eq!(haversine_distance(p, p), 0.0);
    }
}
