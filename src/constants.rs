//! Global constants for gles-demos
//!
//! Consolidates projection, geometry and filter constants
//! to eliminate magic numbers throughout the codebase.

// ============================================================================
// Buffer Layout
// ============================================================================

/// Size of one vertex component in bytes
pub const BYTES_PER_FLOAT: i32 = 4;

// ============================================================================
// Projection Constants
// ============================================================================

/// Orthographic near plane
pub const PROJECTION_NEAR: f32 = 2.9;

/// Orthographic far plane
pub const PROJECTION_FAR: f32 = 10.0;

/// Camera position (looking at the origin)
pub const CAMERA_EYE: [f32; 3] = [0.0, 0.0, 3.0];

/// Camera up vector
pub const CAMERA_UP: [f32; 3] = [0.0, 1.0, 0.0];

// ============================================================================
// Geometry Constants
// ============================================================================

/// Minimum polygon vertex count
pub const POLYGON_MIN_VERTICES: usize = 3;

/// Maximum polygon vertex count (wraps back to the minimum after this)
pub const POLYGON_MAX_VERTICES: usize = 30;

/// Polygon circumradius in clip space
pub const POLYGON_RADIUS: f32 = 0.5;

/// Sphere grid resolution per axis
pub const SPHERE_GRID: usize = 180;

/// Sphere radius
pub const SPHERE_RADIUS: f32 = 0.5;

// ============================================================================
// Filter Constants
// ============================================================================

/// Luminance weights for the grayscale filter (Rec. 601)
pub const LUMINANCE_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Tint intensity used when a tint filter is picked from the menu
pub const DEFAULT_TINT_INTENSITY: f32 = 0.1;

/// Reference texel space the mosaic grid is expressed in
pub const MOSAIC_REFERENCE_SIZE: f32 = 400.0;

/// Default mosaic cell size in reference texels
pub const DEFAULT_MOSAIC_CELL: f32 = 10.0;

/// Slider range upper bound (slider values map to 0.0-1.0)
pub const SLIDER_MAX: u32 = 100;
