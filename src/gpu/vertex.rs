//! Vertex streams
//!
//! A stream is one GPU buffer of interleaved floats plus the attribute
//! layout that splits each vertex into named shader inputs.

use glow::HasContext;
use log::debug;

use crate::constants::BYTES_PER_FLOAT;

use super::error::GlError;
use super::shader::ShaderProgram;

/// One named attribute inside an interleaved vertex
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    /// Float components (1-4)
    pub components: i32,
}

impl VertexAttribute {
    pub const fn new(name: &'static str, components: i32) -> Self {
        Self { name, components }
    }
}

/// Attribute with its byte offset inside the vertex
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeSlot {
    pub attribute: VertexAttribute,
    pub offset: i32,
}

/// Interleaved vertex layout
///
/// stride = sum(components) * sizeof(f32); offsets follow declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexLayout {
    slots: Vec<AttributeSlot>,
    stride: i32,
}

impl VertexLayout {
    pub fn interleaved(attributes: &[VertexAttribute]) -> Self {
        let mut slots = Vec::with_capacity(attributes.len());
        let mut offset = 0;
        for attribute in attributes {
            slots.push(AttributeSlot {
                attribute: *attribute,
                offset,
            });
            offset += attribute.components * BYTES_PER_FLOAT;
        }
        Self {
            slots,
            stride: offset,
        }
    }

    pub fn slots(&self) -> &[AttributeSlot] {
        &self.slots
    }

    /// Byte distance between consecutive vertices
    pub fn stride(&self) -> i32 {
        self.stride
    }

    pub fn floats_per_vertex(&self) -> usize {
        (self.stride / BYTES_PER_FLOAT) as usize
    }

    /// Number of whole vertices in `data`
    pub fn vertex_count(&self, data: &[f32]) -> Result<usize, GlError> {
        let per_vertex = self.floats_per_vertex();
        if per_vertex == 0 || data.len() % per_vertex != 0 {
            return Err(GlError::VertexData {
                len: data.len(),
                per_vertex,
            });
        }
        Ok(data.len() / per_vertex)
    }

    /// Look up every attribute location once for `program`
    pub fn resolve(
        &self,
        gl: &glow::Context,
        program: &ShaderProgram,
    ) -> Result<Vec<u32>, GlError> {
        self.slots
            .iter()
            .map(|slot| program.attrib_location(gl, slot.attribute.name))
            .collect()
    }
}

/// GPU vertex buffer bound to resolved attribute locations
pub struct VertexStream {
    buffer: glow::Buffer,
    layout: VertexLayout,
    locations: Vec<u32>,
    vertex_count: usize,
    usage: u32,
}

impl VertexStream {
    /// Resolve the layout against `program` and upload `data`
    ///
    /// `usage` is `glow::STATIC_DRAW` for fixed geometry and
    /// `glow::DYNAMIC_DRAW` when the data is regenerated per frame.
    pub fn new(
        gl: &glow::Context,
        program: &ShaderProgram,
        layout: VertexLayout,
        data: &[f32],
        usage: u32,
    ) -> Result<Self, GlError> {
        let vertex_count = layout.vertex_count(data)?;
        let locations = layout.resolve(gl, program)?;

        let buffer = unsafe { gl.create_buffer() }.map_err(GlError::BufferCreate)?;

        let stream = Self {
            buffer,
            layout,
            locations,
            vertex_count,
            usage,
        };
        stream.upload(gl, data);
        debug!(
            "Vertex stream created: {} vertices, stride {}",
            vertex_count,
            stream.layout.stride()
        );
        Ok(stream)
    }

    /// Replace the buffer contents (vertex count may change)
    pub fn update(&mut self, gl: &glow::Context, data: &[f32]) -> Result<(), GlError> {
        self.vertex_count = self.layout.vertex_count(data)?;
        self.upload(gl, data);
        Ok(())
    }

    fn upload(&self, gl: &glow::Context, data: &[f32]) {
        unsafe {
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.buffer));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(data),
                self.usage,
            );
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Enable the attribute arrays, run `draw`, then disable them again
    ///
    /// Enable and disable are always paired so no attribute state leaks
    /// into the next draw on the same context.
    pub fn with_bound<R>(&self, gl: &glow::Context, draw: impl FnOnce(&glow::Context) -> R) -> R {
        let stride = self.layout.stride();
        unsafe {
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.buffer));
            for (slot, &location) in self.layout.slots().iter().zip(&self.locations) {
                gl.enable_vertex_attrib_array(location);
                gl.vertex_attrib_pointer_f32(
                    location,
                    slot.attribute.components,
                    glow::FLOAT,
                    false,
                    stride,
                    slot.offset,
                );
            }
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }

        let result = draw(gl);

        unsafe {
            for &location in &self.locations {
                gl.disable_vertex_attrib_array(location);
            }
        }
        result
    }

    /// Release resources
    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_buffer(self.buffer);
        }
    }
}
