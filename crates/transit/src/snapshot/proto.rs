//! Protobuf messages of the snapshot payload.
//!
//! Stops, routes and distances refer to stops by their index in
//! `TransportSnapshot::stops`. Graph labels carry names so a router section
//! stays readable on its own.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransportSnapshot {
    #[prost(message, repeated, tag = "1")]
    pub stops: ::prost::alloc::vec::Vec<Stop>,
    #[prost(message, repeated, tag = "2")]
    pub distances: ::prost::alloc::vec::Vec<Distance>,
    #[prost(message, repeated, tag = "3")]
    pub buses: ::prost::alloc::vec::Vec<Bus>,
    #[prost(message, optional, tag = "4")]
    pub render_settings: ::core::option::Option<RenderSettings>,
    #[prost(message, optional, tag = "5")]
    pub router: ::core::option::Option<Router>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Stop {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(double, tag = "2")]
    pub latitude: f64,
    #[prost(double, tag = "3")]
    pub longitude: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Distance {
    #[prost(uint32, tag = "1")]
    pub from: u32,
    #[prost(uint32, tag = "2")]
    pub to: u32,
    #[prost(uint32, tag = "3")]
    pub meters: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Bus {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(uint32, repeated, tag = "2")]
    pub stops: ::prost::alloc::vec::Vec<u32>,
    #[prost(bool, tag = "3")]
    pub is_circular: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RenderSettings {
    #[prost(double, tag = "1")]
    pub width: f64,
    #[prost(double, tag = "2")]
    pub height: f64,
    #[prost(double, tag = "3")]
    pub padding: f64,
    #[prost(double, tag = "4")]
    pub line_width: f64,
    #[prost(double, tag = "5")]
    pub stop_radius: f64,
    #[prost(uint32, tag = "6")]
    pub bus_label_font_size: u32,
    #[prost(message, optional, tag = "7")]
    pub bus_label_offset: ::core::option::Option<Offset>,
    #[prost(uint32, tag = "8")]
    pub stop_label_font_size: u32,
    #[prost(message, optional, tag = "9")]
    pub stop_label_offset: ::core::option::Option<Offset>,
    #[prost(message, optional, tag = "10")]
    pub underlayer_color: ::core::option::Option<Color>,
    #[prost(double, tag = "11")]
    pub underlayer_width: f64,
    #[prost(message, repeated, tag = "12")]
    pub color_palette: ::prost::alloc::vec::Vec<Color>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Offset {
    #[prost(double, tag = "1")]
    pub dx: f64,
    #[prost(double, tag = "2")]
    pub dy: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Color {
    #[prost(oneof = "color::Kind", tags = "1, 2, 3")]
    pub kind: ::core::option::Option<color::Kind>,
}

pub mod color {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        #[prost(string, tag = "1")]
        Named(::prost::alloc::string::String),
        #[prost(message, tag = "2")]
        Rgb(super::Rgb),
        #[prost(message, tag = "3")]
        Rgba(super::Rgba),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Rgb {
    #[prost(uint32, tag = "1")]
    pub red: u32,
    #[prost(uint32, tag = "2")]
    pub green: u32,
    #[prost(uint32, tag = "3")]
    pub blue: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Rgba {
    #[prost(uint32, tag = "1")]
    pub red: u32,
    #[prost(uint32, tag = "2")]
    pub green: u32,
    #[prost(uint32, tag = "3")]
    pub blue: u32,
    #[prost(double, tag = "4")]
    pub opacity: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Router {
    #[prost(message, optional, tag = "1")]
    pub settings: ::core::option::Option<RoutingSettings>,
    #[prost(message, optional, tag = "2")]
    pub graph: ::core::option::Option<Graph>,
    #[prost(message, repeated, tag = "3")]
    pub stop_vertices: ::prost::alloc::vec::Vec<StopVertex>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RoutingSettings {
    #[prost(uint32, tag = "1")]
    pub bus_wait_time: u32,
    #[prost(double, tag = "2")]
    pub bus_velocity: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Graph {
    #[prost(uint64, tag = "1")]
    pub vertex_count: u64,
    #[prost(message, repeated, tag = "2")]
    pub edges: ::prost::alloc::vec::Vec<Edge>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum EdgeKind {
    Wait = 0,
    Ride = 1,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Edge {
    #[prost(uint64, tag = "1")]
    pub from: u64,
    #[prost(uint64, tag = "2")]
    pub to: u64,
    #[prost(double, tag = "3")]
    pub weight: f64,
    #[prost(enumeration = "EdgeKind", tag = "4")]
    pub kind: i32,
    /// Stop name for a wait edge, route name for a ride edge.
    #[prost(string, tag = "5")]
    pub name: ::prost::alloc::string::String,
    #[prost(uint32, tag = "6")]
    pub span_count: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StopVertex {
    #[prost(string, tag = "1")]
    pub stop: ::prost::alloc::string::String,
    #[prost(uint64, tag = "2")]
    pub vertex: u64,
}
