//! Demo renderers
//!
//! Every demo implements [`FrameRenderer`]: build GPU resources when the
//! surface is created, react to size changes, draw on request. The
//! [`RenderDriver`] owns one renderer and enforces the lifecycle order
//! `Uninitialized -> ProgramReady -> Configured -> Drawable`.

use std::sync::Arc;

use glow::HasContext;
use log::{debug, error, info, warn};

use crate::filter::FilterKind;
use crate::gpu::{GlError, ImageSource, ShaderProgram, ShaderSource, Texture};

pub mod image;
pub mod point;
pub mod polygon;
pub mod shape;
pub mod sphere;
pub mod texture;
pub mod varying;

pub use image::ImageRenderer;
pub use point::PointRenderer;
pub use polygon::PolygonRenderer;
pub use shape::ShapeRenderer;
pub use sphere::SphereRenderer;
pub use texture::{MultiTextureRenderer, TextureRenderer};
pub use varying::VaryingRenderer;

/// Three-callback render contract
///
/// Callbacks are invoked serially on the rendering thread.
pub trait FrameRenderer {
    fn name(&self) -> &'static str;

    /// Build the program and upload static data (once per surface)
    fn on_surface_created(&mut self, gl: &glow::Context) -> Result<(), GlError>;

    /// Surface size (re)established
    fn on_surface_changed(
        &mut self,
        _gl: &glow::Context,
        _width: u32,
        _height: u32,
    ) -> Result<(), GlError> {
        Ok(())
    }

    /// Issue this frame's draw calls (color buffer already cleared)
    fn on_draw_frame(&mut self, gl: &glow::Context) -> Result<(), GlError>;

    /// Switch the active image filter; false if the demo has none
    fn set_filter(&mut self, _filter: FilterKind) -> bool {
        false
    }

    /// Release every GPU object the renderer owns
    fn destroy(&mut self, gl: &glow::Context);
}

/// Lifecycle state of a renderer
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RenderState {
    Uninitialized,
    ProgramReady,
    Configured,
    Drawable,
}

/// Drives one renderer through its lifecycle
///
/// Errors are logged here and the failing step does nothing; a renderer
/// whose program failed to build only ever clears the screen.
pub struct RenderDriver {
    renderer: Box<dyn FrameRenderer>,
    state: RenderState,
    clear_color: [f32; 4],
}

impl RenderDriver {
    pub fn new(renderer: Box<dyn FrameRenderer>, clear_color: [f32; 4]) -> Self {
        Self {
            renderer,
            state: RenderState::Uninitialized,
            clear_color,
        }
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn name(&self) -> &'static str {
        self.renderer.name()
    }

    pub fn surface_created(&mut self, gl: &glow::Context) {
        if self.state != RenderState::Uninitialized {
            // New surface: nothing is carried over from the previous one
            self.renderer.destroy(gl);
            self.state = RenderState::Uninitialized;
        }

        let [r, g, b, a] = self.clear_color;
        unsafe {
            gl.clear_color(r, g, b, a);
        }

        match self.renderer.on_surface_created(gl) {
            Ok(()) => {
                self.state = RenderState::ProgramReady;
                info!("{}: program ready", self.renderer.name());
            }
            Err(e) => {
                error!("{}: surface setup failed: {}", self.renderer.name(), e);
                self.renderer.destroy(gl);
            }
        }
    }

    pub fn surface_changed(&mut self, gl: &glow::Context, width: u32, height: u32) {
        unsafe {
            gl.viewport(0, 0, width as i32, height as i32);
        }
        if self.state == RenderState::Uninitialized {
            warn!("{}: resize before program was built", self.renderer.name());
            return;
        }
        match self.renderer.on_surface_changed(gl, width, height) {
            Ok(()) => {
                if self.state < RenderState::Configured {
                    self.state = RenderState::Configured;
                }
            }
            Err(e) => error!("{}: resize failed: {}", self.renderer.name(), e),
        }
    }

    pub fn draw_frame(&mut self, gl: &glow::Context) {
        unsafe {
            gl.clear(glow::COLOR_BUFFER_BIT);
        }
        if self.state < RenderState::Configured {
            debug!("{}: not configured, frame skipped", self.renderer.name());
            return;
        }
        match self.renderer.on_draw_frame(gl) {
            Ok(()) => self.state = RenderState::Drawable,
            Err(e) => error!("{}: draw failed: {}", self.renderer.name(), e),
        }
    }

    pub fn set_filter(&mut self, filter: FilterKind) -> bool {
        let applied = self.renderer.set_filter(filter);
        if !applied {
            warn!("{}: no filter support", self.renderer.name());
        }
        applied
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        if self.state != RenderState::Uninitialized {
            self.renderer.destroy(gl);
            self.state = RenderState::Uninitialized;
        }
    }
}

/// Resources only exist once the program was built
pub(crate) fn built<T>(resources: &Option<T>) -> Result<&T, GlError> {
    resources.as_ref().ok_or(GlError::ProgramNotBuilt)
}

pub(crate) fn built_mut<T>(resources: &mut Option<T>) -> Result<&mut T, GlError> {
    resources.as_mut().ok_or(GlError::ProgramNotBuilt)
}

/// Build a program and run `setup` against it
///
/// The program is deleted again when `setup` fails.
pub(crate) fn with_program<T>(
    gl: &glow::Context,
    source: &ShaderSource,
    setup: impl FnOnce(&ShaderProgram) -> Result<T, GlError>,
) -> Result<(ShaderProgram, T), GlError> {
    let program = ShaderProgram::build(gl, source)?;
    match setup(&program) {
        Ok(value) => Ok((program, value)),
        Err(e) => {
            program.destroy(gl);
            Err(e)
        }
    }
}

/// Load a texture, logging and returning `None` on failure
///
/// Quads whose texture failed to load are skipped at draw time.
pub(crate) fn load_texture_or_log(
    gl: &glow::Context,
    source: &dyn ImageSource,
    resource: &str,
) -> Option<Texture> {
    match Texture::load(gl, source, resource) {
        Ok(texture) => Some(texture),
        Err(e) => {
            error!("{}", e);
            None
        }
    }
}

/// Shared image inputs for the texture demos
#[derive(Clone)]
pub struct DemoAssets {
    pub source: Arc<dyn ImageSource + Send + Sync>,
    /// Main image (full quad / filter input)
    pub primary: String,
    /// Small overlay image for the multi-texture demo
    pub overlay: String,
    pub filter: FilterKind,
    pub mosaic_cell: f32,
}

/// Available demos
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DemoKind {
    Point,
    Shape,
    Polygon,
    Projection,
    Sphere,
    Varying,
    Interleaved,
    Texture,
    MultiTexture,
    Image,
}

impl DemoKind {
    pub const ALL: [DemoKind; 10] = [
        Self::Point,
        Self::Shape,
        Self::Polygon,
        Self::Projection,
        Self::Sphere,
        Self::Varying,
        Self::Interleaved,
        Self::Texture,
        Self::MultiTexture,
        Self::Image,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Shape => "shape",
            Self::Polygon => "polygon",
            Self::Projection => "projection",
            Self::Sphere => "sphere",
            Self::Varying => "varying",
            Self::Interleaved => "interleaved",
            Self::Texture => "texture",
            Self::MultiTexture => "multi_texture",
            Self::Image => "image",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Point => "a single 40px point",
            Self::Shape => "points, a line loop and a triangle fan over 5 vertices",
            Self::Polygon => "regular polygon growing from 3 to 30 vertices",
            Self::Projection => "the polygon through an aspect-correct projection",
            Self::Sphere => "180x180 point cloud on a sphere",
            Self::Varying => "per-vertex colour from two separate buffers",
            Self::Interleaved => "per-vertex colour from one strided buffer",
            Self::Texture => "a textured quad",
            Self::MultiTexture => "two textures on two texture units",
            Self::Image => "image filters: gray, warm, cool, mosaic",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Unknown names fall back to the point demo
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            warn!("Unknown demo '{}', using '{}'", name, Self::default().name());
            Self::default()
        })
    }
}

impl Default for DemoKind {
    fn default() -> Self {
        Self::Point
    }
}

/// Construct the renderer for `kind`
pub fn create_renderer(kind: DemoKind, assets: &DemoAssets) -> Box<dyn FrameRenderer> {
    match kind {
        DemoKind::Point => Box::new(PointRenderer::new()),
        DemoKind::Shape => Box::new(ShapeRenderer::new()),
        DemoKind::Polygon => Box::new(PolygonRenderer::new(false)),
        DemoKind::Projection => Box::new(PolygonRenderer::new(true)),
        DemoKind::Sphere => Box::new(SphereRenderer::new()),
        DemoKind::Varying => Box::new(VaryingRenderer::separate()),
        DemoKind::Interleaved => Box::new(VaryingRenderer::interleaved()),
        DemoKind::Texture => Box::new(TextureRenderer::new(
            assets.source.clone(),
            assets.primary.clone(),
        )),
        DemoKind::MultiTexture => Box::new(MultiTextureRenderer::new(
            assets.source.clone(),
            assets.primary.clone(),
            assets.overlay.clone(),
        )),
        DemoKind::Image => Box::new(ImageRenderer::new(
            assets.source.clone(),
            assets.primary.clone(),
            assets.filter,
            assets.mosaic_cell,
        )),
    }
}
