//! Geographic distance helpers.

pub mod queries;

pub use queries::haversine_distance;
