//! Points, lines and triangles over a fixed vertex set
//!
//! Each frame draws one more of the five vertices, wrapping back to one.

use glow::HasContext;

use crate::gpu::{GlError, ShaderProgram, ShaderSource, VertexAttribute, VertexLayout, VertexStream};

use super::{built, with_program, FrameRenderer};

const SHAPE_SHADER: ShaderSource = ShaderSource::new(
    r#"
attribute vec4 v_Position;

void main() {
    gl_Position = v_Position;
    gl_PointSize = 30.0;
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

#[rustfmt::skip]
const SHAPE_VERTICES: [f32; 10] = [
    0.0,  0.0,
    0.0,  0.5,
    -0.5, -0.5,
    0.5,  -0.5,
    0.5,  0.5,
];

const SOLID_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const LINE_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const POINT_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const LINE_WIDTH: f32 = 20.0;

/// Visible vertex count for the frame after one showing `current` of `total`
pub fn next_point_count(current: usize, total: usize) -> usize {
    if current >= total {
        1
    } else {
        current + 1
    }
}

struct Resources {
    program: ShaderProgram,
    stream: VertexStream,
    u_color: glow::UniformLocation,
}

pub struct ShapeRenderer {
    resources: Option<Resources>,
    point_count: usize,
}

impl ShapeRenderer {
    pub fn new() -> Self {
        Self {
            resources: None,
            point_count: 0,
        }
    }
}

impl Default for ShapeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRenderer for ShapeRenderer {
    fn name(&self) -> &'static str {
        "shape"
    }

    fn on_surface_created(&mut self, gl: &glow::Context) -> Result<(), GlError> {
        let (program, (u_color, stream)) = with_program(gl, &SHAPE_SHADER, |program| {
            let u_color = program.uniform_location(gl, "u_Color")?;
            let layout = VertexLayout::interleaved(&[VertexAttribute::new("v_Position", 2)]);
            let stream =
                VertexStream::new(gl, program, layout, &SHAPE_VERTICES, glow::STATIC_DRAW)?;
            Ok((u_color, stream))
        })?;
        self.resources = Some(Resources {
            program,
            stream,
            u_color,
        });
        self.point_count = 0;
        Ok(())
    }

    fn on_draw_frame(&mut self, gl: &glow::Context) -> Result<(), GlError> {
        let res = built(&self.resources)?;
        self.point_count = next_point_count(self.point_count, res.stream.vertex_count());
        let count = self.point_count as i32;

        res.program.bind(gl);
        res.stream.with_bound(gl, |gl| unsafe {
            gl.uniform_4_f32_slice(Some(&res.u_color), &LINE_COLOR);
            gl.line_width(LINE_WIDTH);
            gl.draw_arrays(glow::LINE_LOOP, 0, count);

            gl.uniform_4_f32_slice(Some(&res.u_color), &SOLID_COLOR);
            gl.draw_arrays(glow::TRIANGLE_FAN, 0, count);

            gl.uniform_4_f32_slice(Some(&res.u_color), &POINT_COLOR);
            gl.draw_arrays(glow::POINTS, 0, count);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_count_cycles() {
        let mut count = 0;
        let seen: Vec<usize> = (0..7)
            .map(|_| {
                count = next_point_count(count, 5);
                count
            })
            .collect();
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 1, 2]);
    }
}
