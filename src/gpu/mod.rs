//! GPU rendering with OpenGL ES
//!
//! Handles:
//! - EGL context creation (headless pbuffer)
//! - Shader program build and uniform/attribute resolution
//! - Vertex streams, projection, textures

pub mod context;
pub mod error;
pub mod projection;
pub mod shader;
pub mod texture;
pub mod vertex;

pub use context::{EglContext, GlRenderer};
pub use error::GlError;
pub use projection::{ProjectionHelper, ProjectionState};
pub use shader::{ShaderProgram, ShaderSource, ShaderStage};
pub use texture::{DecodedImage, FileImageSource, ImageSource, Texture};
pub use vertex::{VertexAttribute, VertexLayout, VertexStream};
