//! Vertex data for the demos
//!
//! Polygon rings, the sphere point cloud and textured quads.

pub mod geometry;

pub use geometry::{next_vertex_count, polygon_ring, sphere_points, textured_quad};
