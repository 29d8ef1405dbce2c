//! Shader management
//!
//! GLSL ES 1.00 shader compilation and linking

use std::fmt;

use glow::HasContext;
use log::{debug, info};

use super::error::GlError;

/// Pipeline stage a shader source belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_type(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Vertex + fragment source pair
///
/// Authored once as constants and never mutated.
#[derive(Clone, Copy, Debug)]
pub struct ShaderSource {
    pub vertex: &'static str,
    pub fragment: &'static str,
}

impl ShaderSource {
    pub const fn new(vertex: &'static str, fragment: &'static str) -> Self {
        Self { vertex, fragment }
    }
}

/// Compiled and linked shader program
///
/// Only ever constructed from a successful link, so a value of this type is
/// always drawable. Owned by the renderer that built it.
#[derive(Debug)]
pub struct ShaderProgram {
    program: glow::Program,
}

impl ShaderProgram {
    /// Compile both stages, link them, and leave the result bound
    ///
    /// Attribute and uniform lookups are expected right after this call.
    pub fn build(gl: &glow::Context, source: &ShaderSource) -> Result<Self, GlError> {
        let program = compile_program(gl, source.vertex, source.fragment)?;
        unsafe {
            gl.use_program(Some(program));
        }
        info!("Shader program linked");
        Ok(Self { program })
    }

    /// Activate the program
    pub fn bind(&self, gl: &glow::Context) {
        unsafe {
            gl.use_program(Some(self.program));
        }
    }

    /// Resolve a vertex attribute location
    ///
    /// glow maps GL's -1 to `None`, which is reported as an error so a
    /// missing attribute never silently draws nothing.
    pub fn attrib_location(&self, gl: &glow::Context, name: &str) -> Result<u32, GlError> {
        let location = unsafe { gl.get_attrib_location(self.program, name) };
        match location {
            Some(location) => {
                debug!("attribute {} -> {}", name, location);
                Ok(location)
            }
            None => Err(GlError::AttributeNotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Resolve a uniform location
    pub fn uniform_location(
        &self,
        gl: &glow::Context,
        name: &str,
    ) -> Result<glow::UniformLocation, GlError> {
        unsafe { gl.get_uniform_location(self.program, name) }.ok_or_else(|| {
            GlError::UniformNotFound {
                name: name.to_string(),
            }
        })
    }

    /// Release resources
    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_program(self.program);
        }
    }
}

/// Compile shader and link program
fn compile_program(
    gl: &glow::Context,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<glow::Program, GlError> {
    unsafe {
        let vs = compile_shader(gl, ShaderStage::Vertex, vertex_src)?;
        let fs = match compile_shader(gl, ShaderStage::Fragment, fragment_src) {
            Ok(fs) => fs,
            Err(e) => {
                gl.delete_shader(vs);
                return Err(e);
            }
        };

        let program = match gl.create_program() {
            Ok(program) => program,
            Err(e) => {
                gl.delete_shader(vs);
                gl.delete_shader(fs);
                return Err(GlError::ProgramCreate(e));
            }
        };

        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);

        if !gl.get_program_link_status(program) {
            let diagnostic = gl.get_program_info_log(program);
            gl.delete_program(program);
            gl.delete_shader(vs);
            gl.delete_shader(fs);
            return Err(GlError::ProgramLink { diagnostic });
        }

        // Shader objects no longer needed after linking
        gl.detach_shader(program, vs);
        gl.detach_shader(program, fs);
        gl.delete_shader(vs);
        gl.delete_shader(fs);

        Ok(program)
    }
}

/// Compile individual shader
fn compile_shader(
    gl: &glow::Context,
    stage: ShaderStage,
    source: &str,
) -> Result<glow::Shader, GlError> {
    unsafe {
        let shader = gl
            .create_shader(stage.gl_type())
            .map_err(|e| GlError::ShaderCreate(stage, e))?;

        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let mut diagnostic = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            // Some drivers report failure with an empty log
            if diagnostic.trim().is_empty() {
                diagnostic = format!("{} stage rejected by the driver", stage);
            }
            return Err(GlError::ShaderCompile { stage, diagnostic });
        }

        Ok(shader)
    }
}
