//! Image filter demo
//!
//! One full-surface textured quad; the fragment stage branches on the
//! active [`FilterKind`] selector.

use std::sync::Arc;

use glow::HasContext;
use log::info;

use crate::drawing::textured_quad;
use crate::filter::FilterKind;
use crate::gpu::{
    GlError, ImageSource, ProjectionHelper, ShaderProgram, ShaderSource, Texture, VertexLayout,
    VertexStream,
};

use super::texture::{POSITION, TEX_COORD};
use super::{built, built_mut, load_texture_or_log, with_program, FrameRenderer};

const IMAGE_SHADER: ShaderSource = ShaderSource::new(
    r#"
attribute vec4 a_Position;
attribute vec2 a_TexCoord;
uniform mat4 u_Matrix;
varying vec2 v_TexCoord;

void main() {
    gl_Position = u_Matrix * a_Position;
    v_TexCoord = vec2(a_TexCoord.x, 1.0 - a_TexCoord.y);
}
"#,
    r#"
precision mediump float;
uniform vec3 u_ChangeColor;
uniform int u_Type;
uniform float u_MosaicSize;
uniform sampler2D u_Texture;
varying vec2 v_TexCoord;

const vec2 TexSize = vec2(400.0, 400.0);

void main() {
    vec4 texel = texture2D(u_Texture, v_TexCoord);
    if (u_Type == 1) {
        float l = dot(texel.rgb, u_ChangeColor);
        gl_FragColor = vec4(l, l, l, texel.a);
    } else if (u_Type == 2) {
        gl_FragColor = clamp(texel + vec4(u_ChangeColor, 0.0), 0.0, 1.0);
    } else if (u_Type == 3) {
        // Snap to the block's corner and sample the centre of that texel
        vec2 xy = v_TexCoord * TexSize;
        vec2 corner = floor(xy / u_MosaicSize) * u_MosaicSize;
        gl_FragColor = texture2D(u_Texture, (corner + 0.5) / TexSize);
    } else {
        gl_FragColor = texel;
    }
}
"#,
);

struct Uniforms {
    change_color: glow::UniformLocation,
    filter_type: glow::UniformLocation,
    mosaic_size: glow::UniformLocation,
    texture: glow::UniformLocation,
}

impl Uniforms {
    fn resolve(gl: &glow::Context, program: &ShaderProgram) -> Result<Self, GlError> {
        Ok(Self {
            change_color: program.uniform_location(gl, "u_ChangeColor")?,
            filter_type: program.uniform_location(gl, "u_Type")?,
            mosaic_size: program.uniform_location(gl, "u_MosaicSize")?,
            texture: program.uniform_location(gl, "u_Texture")?,
        })
    }
}

struct Resources {
    program: ShaderProgram,
    stream: VertexStream,
    texture: Option<Texture>,
    projection: ProjectionHelper,
    uniforms: Uniforms,
}

pub struct ImageRenderer {
    source: Arc<dyn ImageSource + Send + Sync>,
    resource: String,
    filter: FilterKind,
    mosaic_cell: f32,
    resources: Option<Resources>,
}

impl ImageRenderer {
    pub fn new(
        source: Arc<dyn ImageSource + Send + Sync>,
        resource: String,
        filter: FilterKind,
        mosaic_cell: f32,
    ) -> Self {
        Self {
            source,
            resource,
            filter,
            mosaic_cell,
            resources: None,
        }
    }

    pub fn filter(&self) -> FilterKind {
        self.filter
    }
}

impl FrameRenderer for ImageRenderer {
    fn name(&self) -> &'static str {
        "image"
    }

    fn on_surface_created(&mut self, gl: &glow::Context) -> Result<(), GlError> {
        let (program, (uniforms, projection, stream)) =
            with_program(gl, &IMAGE_SHADER, |program| {
                let uniforms = Uniforms::resolve(gl, program)?;
                let projection = ProjectionHelper::new(gl, program, "u_Matrix")?;
                let layout = VertexLayout::interleaved(&[POSITION, TEX_COORD]);
                let quad = textured_quad(-1.0, 1.0, 1.0, -1.0);
                let stream = VertexStream::new(gl, program, layout, &quad, glow::STATIC_DRAW)?;
                Ok((uniforms, projection, stream))
            })?;
        let texture = load_texture_or_log(gl, self.source.as_ref(), &self.resource);

        self.resources = Some(Resources {
            program,
            stream,
            texture,
            projection,
            uniforms,
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
        let Some(texture) = &res.texture else {
            return Ok(());
        };

        res.program.bind(gl);
        unsafe {
            gl.uniform_3_f32_slice(Some(&res.uniforms.change_color), &self.filter.weights());
            gl.uniform_1_i32(Some(&res.uniforms.filter_type), self.filter.selector());
            gl.uniform_1_f32(Some(&res.uniforms.mosaic_size), self.mosaic_cell);
        }
        texture.bind(gl, 0);
        res.stream.with_bound(gl, |gl| unsafe {
            gl.uniform_1_i32(Some(&res.uniforms.texture), 0);
            gl.draw_arrays(glow::TRIANGLE_FAN, 0, res.stream.vertex_count() as i32);
        });
        Ok(())
    }

    fn set_filter(&mut self, filter: FilterKind) -> bool {
        info!("Filter: {} (selector {})", filter.name(), filter.selector());
        self.filter = filter;
        true
    }

    fn destroy(&mut self, gl: &glow::Context) {
        if let Some(res) = self.resources.take() {
            if let Some(texture) = &res.texture {
                texture.destroy(gl);
            }
            res.stream.destroy(gl);
            res.program.destroy(gl);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::FileImageSource;

    fn renderer() -> ImageRenderer {
        ImageRenderer::new(
            Arc::new(FileImageSource::new(".")),
            "builtin:checker".to_string(),
            FilterKind::None,
            10.0,
        )
    }

    #[test]
    fn test_set_filter_before_surface() {
        let mut image = renderer();
        assert!(image.set_filter(FilterKind::Mosaic));
        assert_eq!(image.filter(), FilterKind::Mosaic);
    }

    #[test]
    fn test_shader_selectors_match_filter_kinds() {
        let fragment = IMAGE_SHADER.fragment;
        for kind in [FilterKind::Grayscale, FilterKind::warm(0.1), FilterKind::Mosaic] {
            assert!(fragment.contains(&format!("u_Type == {}", kind.selector())));
        }
    }
}
