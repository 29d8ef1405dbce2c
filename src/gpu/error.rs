//! GPU error taxonomy
//!
//! Every failure the render pipeline can report. Callers log these at the
//! point of origin; the affected build or draw step then does nothing.

use thiserror::Error;

use super::shader::ShaderStage;

#[derive(Debug, Error)]
pub enum GlError {
    #[error("could not create {0} shader object: {1}")]
    ShaderCreate(ShaderStage, String),
    #[error("{stage} shader compile failed:\n{diagnostic}")]
    ShaderCompile {
        stage: ShaderStage,
        diagnostic: String,
    },
    #[error("could not create program object: {0}")]
    ProgramCreate(String),
    #[error("shader link failed:\n{diagnostic}")]
    ProgramLink { diagnostic: String },
    #[error("program has not been built yet")]
    ProgramNotBuilt,
    #[error("attribute `{name}` not found in program")]
    AttributeNotFound { name: String },
    #[error("uniform `{name}` not found in program")]
    UniformNotFound { name: String },
    #[error("could not create vertex buffer: {0}")]
    BufferCreate(String),
    #[error("vertex data has {len} floats, not a multiple of {per_vertex} floats per vertex")]
    VertexData { len: usize, per_vertex: usize },
    #[error("could not create texture: {0}")]
    TextureCreate(String),
    #[error("could not decode image `{resource}`: {reason}")]
    ImageDecode { resource: String, reason: String },
}
