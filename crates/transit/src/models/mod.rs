//! Transit data models, types, and traits.

pub mod render;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use render::{Color, RenderSettings};
pub use traits::NetworkModel;
pub use types::{BusRoute, BusStat, Result, RoutingSettings, Stop, TransitError};
