//! Single point demo

use glow::HasContext;

use crate::gpu::{GlError, ShaderProgram, ShaderSource, VertexAttribute, VertexLayout, VertexStream};

use super::{built, with_program, FrameRenderer};

const POINT_SHADER: ShaderSource = ShaderSource::new(
    r#"
attribute vec4 v_Position;

void main() {
    gl_Position = v_Position;
    gl_PointSize = 40.0;
}
"#,
    r#"
precision mediump float;
uniform vec4 u_Color;

void main() {
    gl_FragColor = u_Color;
}
"#,
);

const POINT_VERTICES: [f32; 2] = [0.0, 0.0];
const POINT_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

struct Resources {
    program: ShaderProgram,
    stream: VertexStream,
    u_color: glow::UniformLocation,
}

/// One red 40px point at the origin
pub struct PointRenderer {
    resources: Option<Resources>,
}

impl PointRenderer {
    pub fn new() -> Self {
        Self { resources: None }
    }
}

impl Default for PointRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRenderer for PointRenderer {
    fn name(&self) -> &'static str {
        "point"
    }

    fn on_surface_created(&mut self, gl: &glow::Context) -> Result<(), GlError> {
        let (program, (u_color, stream)) = with_program(gl, &POINT_SHADER, |program| {
            let u_color = program.uniform_location(gl, "u_Color")?;
            let layout = VertexLayout::interleaved(&[VertexAttribute::new("v_Position", 2)]);
            let stream =
                VertexStream::new(gl, program, layout, &POINT_VERTICES, glow::STATIC_DRAW)?;
            Ok((u_color, stream))
        })?;
        self.resources = Some(Resources {
            program,
            stream,
            u_color,
        });
        Ok(())
    }

    fn on_draw_frame(&mut self, gl: &glow::Context) -> Result<(), GlError> {
        let res = built(&self.resources)?;
        res.program.bind(gl);
        unsafe {
            gl.uniform_4_f32_slice(Some(&res.u_color), &POINT_COLOR);
        }
        res.stream.with_bound(gl, |gl| unsafe {
            gl.draw_arrays(glow::POINTS, 0, res.stream.vertex_count() as i32);
        });
        Ok(())
    }

    fn destroy(&mut self, gl: &glow::Context) {
        if let Some(res) = self.resources.take() {
            res.stream.destroy(gl);
            res.program.destroy(gl);
        }
    }
}
