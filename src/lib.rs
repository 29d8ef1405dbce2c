//! gles-demos - OpenGL ES 2.0 tutorial renderers
//!
//! Each demo compiles a small shader pair, uploads a vertex stream and
//! issues a few draw calls per frame on a headless EGL surface.

pub mod config;
pub mod constants;
pub mod demo;
pub mod drawing;
pub mod filter;
pub mod gpu;
pub mod host;
