//! Growing regular polygon
//!
//! The ring is regenerated every frame with one more vertex, from 3 up to
//! 30 and back. The projected variant runs the same geometry through the
//! aspect-correct view-projection so the polygon stays round.

use glow::HasContext;

use crate::constants::{POLYGON_MAX_VERTICES, POLYGON_MIN_VERTICES, POLYGON_RADIUS};
use crate::drawing::{next_vertex_count, polygon_ring};
use crate::gpu::{
    GlError, ProjectionHelper, ShaderProgram, ShaderSource, VertexAttribute, VertexLayout,
    VertexStream,
};

use super::{built, built_mut, with_program, FrameRenderer};

const POLYGON_VERTEX: &str = r#"
attribute vec4 v_Position;

void main() {
    gl_Position = v_Position;
}
"#;

const PROJECTED_VERTEX: &str = r#"
uniform mat4 u_Matrix;
attribute vec4 v_Position;

void main() {
    gl_Position = u_Matrix * v_Position;
}
"#;

const SOLID_FRAGMENT: &str = r#"
precision mediump float;
uniform vec4 u_Color;

void main() {
    gl_FragColor = u_Color;
}
"#;

const POLYGON_SHADER: ShaderSource = ShaderSource::new(POLYGON_VERTEX, SOLID_FRAGMENT);
const PROJECTED_SHADER: ShaderSource = ShaderSource::new(PROJECTED_VERTEX, SOLID_FRAGMENT);

const LINE_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const SOLID_COLOR: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const LINE_WIDTH: f32 = 2.0;

struct Resources {
    program: ShaderProgram,
    stream: VertexStream,
    u_color: glow::UniformLocation,
    projection: Option<ProjectionHelper>,
}

pub struct PolygonRenderer {
    projected: bool,
    vertex_count: usize,
    resources: Option<Resources>,
}

impl PolygonRenderer {
    /// `projected` selects the aspect-correct variant
    pub fn new(projected: bool) -> Self {
        Self {
            projected,
            vertex_count: POLYGON_MIN_VERTICES,
            resources: None,
        }
    }

    /// Vertex count of the next frame
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}

impl FrameRenderer for PolygonRenderer {
    fn name(&self) -> &'static str {
        if self.projected {
            "projection"
        } else {
            "polygon"
        }
    }

    fn on_surface_created(&mut self, gl: &glow::Context) -> Result<(), GlError> {
        let source = if self.projected {
            &PROJECTED_SHADER
        } else {
            &POLYGON_SHADER
        };
        let projected = self.projected;
        self.vertex_count = POLYGON_MIN_VERTICES;
        let ring = polygon_ring(self.vertex_count, POLYGON_RADIUS);

        let (program, (u_color, projection, stream)) = with_program(gl, source, |program| {
            let u_color = program.uniform_location(gl, "u_Color")?;
            let projection = if projected {
                Some(ProjectionHelper::new(gl, program, "u_Matrix")?)
            } else {
                None
            };
            let layout = VertexLayout::interleaved(&[VertexAttribute::new("v_Position", 2)]);
            let stream = VertexStream::new(gl, program, layout, &ring, glow::DYNAMIC_DRAW)?;
            Ok((u_color, projection, stream))
        })?;

        self.resources = Some(Resources {
            program,
            stream,
            u_color,
            projection,
        });
        Ok(())
    }

    fn on_surface_changed(
        &mut self,
        gl: &glow::Context,
        width: u32,
        height: u32,
    ) -> Result<(), GlError> {
        let res = built_mut(&mut self.resources)?;
        if let Some(projection) = res.projection.as_mut() {
            projection.enable(gl, &res.program, width, height);
        }
        Ok(())
    }

    fn on_draw_frame(&mut self, gl: &glow::Context) -> Result<(), GlError> {
        let ring = polygon_ring(self.vertex_count, POLYGON_RADIUS);
        let res = built_mut(&mut self.resources)?;
        res.stream.update(gl, &ring)?;

        let res = built(&self.resources)?;
        let count = res.stream.vertex_count() as i32;
        res.program.bind(gl);
        res.stream.with_bound(gl, |gl| unsafe {
            gl.uniform_4_f32_slice(Some(&res.u_color), &LINE_COLOR);
            gl.line_width(LINE_WIDTH);
            gl.draw_arrays(glow::LINE_LOOP, 0, count);

            gl.uniform_4_f32_slice(Some(&res.u_color), &SOLID_COLOR);
            gl.draw_arrays(glow::TRIANGLE_FAN, 0, count);
        });

        self.vertex_count =
            next_vertex_count(self.vertex_count, POLYGON_MIN_VERTICES, POLYGON_MAX_VERTICES);
        Ok(())
    }

    fn destroy(&mut self, gl: &glow::Context) {
        if let Some(res) = self.resources.take() {
            res.stream.destroy(gl);
            res.program.destroy(gl);
        }
    }
}
