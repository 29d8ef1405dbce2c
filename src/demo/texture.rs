//! Textured quads
//!
//! Textures are decoded and uploaded once per surface and deleted with
//! the renderer's other GPU objects.

use std::sync::Arc;

use glow::HasContext;

use crate::drawing::textured_quad;
use crate::gpu::{
    GlError, ImageSource, ProjectionHelper, ShaderProgram, ShaderSource, Texture,
    VertexAttribute, VertexLayout, VertexStream,
};

use super::{built, built_mut, load_texture_or_log, with_program, FrameRenderer};

pub(crate) const POSITION: VertexAttribute = VertexAttribute::new("a_Position", 3);
pub(crate) const TEX_COORD: VertexAttribute = VertexAttribute::new("a_TexCoord", 2);

const TEXTURE_SHADER: ShaderSource = ShaderSource::new(
    r#"
attribute vec4 a_Position;
attribute vec2 a_TexCoord;
uniform mat4 u_Matrix;
varying vec2 v_TexCoord;

void main() {
    // Image rows run top-down, texture v runs bottom-up
    v_TexCoord = vec2(a_TexCoord.x, 1.0 - a_TexCoord.y);
    gl_Position = u_Matrix * a_Position;
}
"#,
    r#"
precision mediump float;
uniform sampler2D u_Texture;
varying vec2 v_TexCoord;

void main() {
    gl_FragColor = texture2D(u_Texture, v_TexCoord);
}
"#,
);

/// Quad geometry plus the texture it samples
struct TexturedQuad {
    stream: VertexStream,
    texture: Option<Texture>,
    unit: u32,
}

impl TexturedQuad {
    fn new(
        gl: &glow::Context,
        program: &ShaderProgram,
        corners: [f32; 4],
        unit: u32,
    ) -> Result<Self, GlError> {
        let [left, top, right, bottom] = corners;
        let data = textured_quad(left, top, right, bottom);
        let layout = VertexLayout::interleaved(&[POSITION, TEX_COORD]);
        let stream = VertexStream::new(gl, program, layout, &data, glow::STATIC_DRAW)?;
        Ok(Self {
            stream,
            texture: None,
            unit,
        })
    }

    /// Draw as a triangle fan; skipped when the texture failed to load
    fn draw(&self, gl: &glow::Context, u_texture: &glow::UniformLocation) {
        let Some(texture) = &self.texture else {
            return;
        };
        texture.bind(gl, self.unit);
        self.stream.with_bound(gl, |gl| unsafe {
            gl.uniform_1_i32(Some(u_texture), self.unit as i32);
            gl.draw_arrays(glow::TRIANGLE_FAN, 0, self.stream.vertex_count() as i32);
        });
    }

    fn destroy(&self, gl: &glow::Context) {
        if let Some(texture) = &self.texture {
            texture.destroy(gl);
        }
        self.stream.destroy(gl);
    }
}

struct Resources {
    program: ShaderProgram,
    u_texture: glow::UniformLocation,
    projection: ProjectionHelper,
    quads: Vec<TexturedQuad>,
}

impl Resources {
    fn build(
        gl: &glow::Context,
        source: &dyn ImageSource,
        quads: &[([f32; 4], u32, &str)],
    ) -> Result<Self, GlError> {
        let (program, (u_texture, projection, built_quads)) =
            with_program(gl, &TEXTURE_SHADER, |program| {
                let u_texture = program.uniform_location(gl, "u_Texture")?;
                let projection = ProjectionHelper::new(gl, program, "u_Matrix")?;
                let mut built_quads: Vec<TexturedQuad> = Vec::with_capacity(quads.len());
                for &(corners, unit, _) in quads {
                    match TexturedQuad::new(gl, program, corners, unit) {
                        Ok(quad) => built_quads.push(quad),
                        Err(e) => {
                            for quad in &built_quads {
                                quad.destroy(gl);
                            }
                            return Err(e);
                        }
                    }
                }
                Ok((u_texture, projection, built_quads))
            })?;

        let mut resources = Self {
            program,
            u_texture,
            projection,
            quads: built_quads,
        };
        for (quad, &(_, _, resource)) in resources.quads.iter_mut().zip(quads) {
            quad.texture = load_texture_or_log(gl, source, resource);
        }
        Ok(resources)
    }

    fn draw(&self, gl: &glow::Context) {
        self.program.bind(gl);
        for quad in &self.quads {
            quad.draw(gl, &self.u_texture);
        }
    }

    fn destroy(self, gl: &glow::Context) {
        for quad in &self.quads {
            quad.destroy(gl);
        }
        self.program.destroy(gl);
    }
}

/// One image on a centred quad
pub struct TextureRenderer {
    source: Arc<dyn ImageSource + Send + Sync>,
    resource: String,
    resources: Option<Resources>,
}

impl TextureRenderer {
    pub fn new(source: Arc<dyn ImageSource + Send + Sync>, resource: String) -> Self {
        Self {
            source,
            resource,
            resources: None,
        }
    }
}

impl FrameRenderer for TextureRenderer {
    fn name(&self) -> &'static str {
        "texture"
    }

    fn on_surface_created(&mut self, gl: &glow::Context) -> Result<(), GlError> {
        let quads = [([-0.5, 0.5, 0.5, -0.5], 0, self.resource.as_str())];
        self.resources = Some(Resources::build(gl, self.source.as_ref(), &quads)?);
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
        built(&self.resources)?.draw(gl);
        Ok(())
    }

    fn destroy(&mut self, gl: &glow::Context) {
        if let Some(res) = self.resources.take() {
            res.destroy(gl);
        }
    }
}

/// Full-surface image on unit 0 with a small overlay on unit 1
pub struct MultiTextureRenderer {
    source: Arc<dyn ImageSource + Send + Sync>,
    background: String,
    overlay: String,
    resources: Option<Resources>,
}

impl MultiTextureRenderer {
    pub fn new(
        source: Arc<dyn ImageSource + Send + Sync>,
        background: String,
        overlay: String,
    ) -> Self {
        Self {
            source,
            background,
            overlay,
            resources: None,
        }
    }
}

impl FrameRenderer for MultiTextureRenderer {
    fn name(&self) -> &'static str {
        "multi_texture"
    }

    fn on_surface_created(&mut self, gl: &glow::Context) -> Result<(), GlError> {
        // Overlay drawn second so it lands on top
        let quads = [
            ([-1.0, 1.0, 1.0, -1.0], 0, self.background.as_str()),
            ([0.6, 0.95, 0.95, 0.8], 1, self.overlay.as_str()),
        ];
        self.resources = Some(Resources::build(gl, self.source.as_ref(), &quads)?);
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
        built(&self.resources)?.draw(gl);
        Ok(())
    }

    fn destroy(&mut self, gl: &glow::Context) {
        if let Some(res) = self.resources.take() {
            res.destroy(gl);
        }
    }
}
