//! Sphere point cloud

use glow::HasContext;

use crate::constants::SPHERE_GRID;
use crate::drawing::sphere_points;
use crate::gpu::{
    GlError, ProjectionHelper, ShaderProgram, ShaderSource, VertexAttribute, VertexLayout,
    VertexStream,
};

use super::{built, built_mut, with_program, FrameRenderer};

const SPHERE_SHADER: ShaderSource = ShaderSource::new(
    r#"
uniform mat4 u_Matrix;
attribute vec4 a_Position;

void main() {
    gl_Position = u_Matrix * a_Position;
    gl_PointSize = 10.0;
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

const POINT_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

struct Resources {
    program: ShaderProgram,
    stream: VertexStream,
    u_color: glow::UniformLocation,
    projection: ProjectionHelper,
}

/// 180x180 points uploaded once, drawn through the view-projection
pub struct SphereRenderer {
    resources: Option<Resources>,
}

impl SphereRenderer {
    pub fn new() -> Self {
        Self { resources: None }
    }
}

impl Default for SphereRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRenderer for SphereRenderer {
    fn name(&self) -> &'static str {
        "sphere"
    }

    fn on_surface_created(&mut self, gl: &glow::Context) -> Result<(), GlError> {
        let points = sphere_points();
        let (program, (u_color, projection, stream)) =
            with_program(gl, &SPHERE_SHADER, |program| {
                let u_color = program.uniform_location(gl, "u_Color")?;
                let projection = ProjectionHelper::new(gl, program, "u_Matrix")?;
                let layout = VertexLayout::interleaved(&[VertexAttribute::new("a_Position", 3)]);
                let stream = VertexStream::new(gl, program, layout, &points, glow::STATIC_DRAW)?;
                Ok((u_color, projection, stream))
            })?;
        debug_assert_eq!(stream.vertex_count(), SPHERE_GRID * SPHERE_GRID);

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
        res.projection.enable(gl, &res.program, width, height);
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
