//! Per-vertex colour through a varying
//!
//! Two data layouts for the same triangle: positions and colours in two
//! separate buffers, or interleaved in one strided buffer.

use glow::HasContext;

use crate::gpu::{GlError, ShaderProgram, ShaderSource, VertexAttribute, VertexLayout, VertexStream};

use super::{built, with_program, FrameRenderer};

const VARYING_SHADER: ShaderSource = ShaderSource::new(
    r#"
attribute vec4 a_Position;
attribute vec4 a_Color;
varying vec4 v_Color;

void main() {
    v_Color = a_Color;
    gl_Position = a_Position;
}
"#,
    r#"
precision mediump float;
varying vec4 v_Color;

void main() {
    gl_FragColor = v_Color;
}
"#,
);

const POSITION: VertexAttribute = VertexAttribute::new("a_Position", 2);
const COLOR: VertexAttribute = VertexAttribute::new("a_Color", 3);

#[rustfmt::skip]
const POSITIONS: [f32; 6] = [
    0.0,  0.5,
    -0.5, -0.5,
    0.5,  -0.5,
];

#[rustfmt::skip]
const COLORS: [f32; 9] = [
    1.0, 0.0, 0.0,
    0.0, 1.0, 0.0,
    0.0, 0.0, 1.0,
];

/// (x, y, r, g, b) per vertex
#[rustfmt::skip]
const INTERLEAVED: [f32; 15] = [
    0.0,  0.5,  1.0, 0.0, 0.0,
    -0.5, -0.5, 0.0, 1.0, 0.0,
    0.5,  -0.5, 0.0, 0.0, 1.0,
];

enum Streams {
    Separate {
        positions: VertexStream,
        colors: VertexStream,
    },
    Interleaved(VertexStream),
}

struct Resources {
    program: ShaderProgram,
    streams: Streams,
}

pub struct VaryingRenderer {
    interleaved: bool,
    resources: Option<Resources>,
}

impl VaryingRenderer {
    /// Positions and colours in two buffers
    pub fn separate() -> Self {
        Self {
            interleaved: false,
            resources: None,
        }
    }

    /// Positions and colours in one strided buffer
    pub fn interleaved() -> Self {
        Self {
            interleaved: true,
            resources: None,
        }
    }
}

impl FrameRenderer for VaryingRenderer {
    fn name(&self) -> &'static str {
        if self.interleaved {
            "interleaved"
        } else {
            "varying"
        }
    }

    fn on_surface_created(&mut self, gl: &glow::Context) -> Result<(), GlError> {
        let interleaved = self.interleaved;
        let (program, streams) = with_program(gl, &VARYING_SHADER, |program| {
            if interleaved {
                let layout = VertexLayout::interleaved(&[POSITION, COLOR]);
                let stream =
                    VertexStream::new(gl, program, layout, &INTERLEAVED, glow::STATIC_DRAW)?;
                return Ok(Streams::Interleaved(stream));
            }

            let positions = VertexStream::new(
                gl,
                program,
                VertexLayout::interleaved(&[POSITION]),
                &POSITIONS,
                glow::STATIC_DRAW,
            )?;
            let colors = match VertexStream::new(
                gl,
                program,
                VertexLayout::interleaved(&[COLOR]),
                &COLORS,
                glow::STATIC_DRAW,
            ) {
                Ok(colors) => colors,
                Err(e) => {
                    positions.destroy(gl);
                    return Err(e);
                }
            };
            Ok(Streams::Separate { positions, colors })
        })?;

        self.resources = Some(Resources { program, streams });
        Ok(())
    }

    fn on_draw_frame(&mut self, gl: &glow::Context) -> Result<(), GlError> {
        let res = built(&self.resources)?;
        res.program.bind(gl);
        match &res.streams {
            Streams::Separate { positions, colors } => {
                let count = positions.vertex_count().min(colors.vertex_count()) as i32;
                positions.with_bound(gl, |gl| {
                    colors.with_bound(gl, |gl| unsafe {
                        gl.draw_arrays(glow::TRIANGLES, 0, count);
                    })
                });
            }
            Streams::Interleaved(stream) => {
                stream.with_bound(gl, |gl| unsafe {
                    gl.draw_arrays(glow::TRIANGLES, 0, stream.vertex_count() as i32);
                });
            }
        }
        Ok(())
    }

    fn destroy(&mut self, gl: &glow::Context) {
        if let Some(res) = self.resources.take() {
            match res.streams {
                Streams::Separate { positions, colors } => {
                    positions.destroy(gl);
                    colors.destroy(gl);
                }
                Streams::Interleaved(stream) => stream.destroy(gl),
            }
            res.program.destroy(gl);
        }
    }
}
