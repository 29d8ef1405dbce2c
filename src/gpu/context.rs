//! GPU context management
//!
//! Headless EGL + OpenGL ES setup on a pbuffer surface

use anyhow::{anyhow, Context, Result};
use glow::HasContext;
use khronos_egl as egl;
use log::{info, warn};
use std::ffi::c_void;

// EGL_PLATFORM_SURFACELESS_MESA (EGL extension)
const EGL_PLATFORM_SURFACELESS_MESA: egl::Enum = 0x31DD;

/// EGL instance type (dynamic loading)
type EglInstance = egl::Instance<egl::Dynamic<libloading::Library, egl::EGL1_5>>;

/// EGL context rendering into an off-screen pbuffer
///
/// Pbuffers have a fixed size, so a resize replaces the surface while the
/// context (and every program, buffer and texture in it) is kept.
pub struct EglContext {
    instance: EglInstance,
    display: egl::Display,
    context: egl::Context,
    surface: egl::Surface,
    config: egl::Config,
    width: u32,
    height: u32,
}

impl EglContext {
    /// Initialize EGL and create a pbuffer surface of the given size
    pub fn new_headless(width: u32, height: u32) -> Result<Self> {
        // Load EGL library
        let lib = unsafe {
            libloading::Library::new("libEGL.so.1")
                .or_else(|_| libloading::Library::new("libEGL.so"))
                .context("Failed to load EGL library")?
        };

        let instance: EglInstance = unsafe {
            egl::DynamicInstance::<egl::EGL1_5>::load_required_from(lib)
                .context("Failed to create EGL instance")?
        };

        // Surfaceless platform first, default display as fallback
        let display = unsafe {
            instance
                .get_platform_display(
                    EGL_PLATFORM_SURFACELESS_MESA,
                    std::ptr::null_mut::<c_void>(),
                    &[egl::ATTRIB_NONE],
                )
                .ok()
                .or_else(|| instance.get_display(egl::DEFAULT_DISPLAY))
                .ok_or_else(|| anyhow!("Failed to get EGL display"))?
        };

        // Initialize EGL
        instance
            .initialize(display)
            .context("Failed to initialize EGL")?;

        if let Ok(version_str) = instance.query_string(Some(display), egl::VERSION) {
            info!("EGL version: {}", version_str.to_string_lossy());
        }

        // Bind OpenGL ES API
        instance
            .bind_api(egl::OPENGL_ES_API)
            .context("Failed to bind OpenGL ES API")?;

        // Choose config (try ES3, fallback to ES2)
        let config = Self::choose_config(&instance, display, egl::OPENGL_ES3_BIT)
            .or_else(|_| Self::choose_config(&instance, display, egl::OPENGL_ES2_BIT))
            .context("Failed to choose EGL config")?;

        // Create context (try ES3, fallback to ES2)
        let context_attribs_es3 = [egl::CONTEXT_CLIENT_VERSION, 3, egl::NONE];
        let context_attribs_es2 = [egl::CONTEXT_CLIENT_VERSION, 2, egl::NONE];
        let context = instance
            .create_context(display, config, None, &context_attribs_es3)
            .or_else(|_| instance.create_context(display, config, None, &context_attribs_es2))
            .context("Failed to create EGL context")?;

        let surface = Self::create_surface(&instance, display, config, width, height)?;

        // Make context current
        instance
            .make_current(display, Some(surface), Some(surface), Some(context))
            .context("Failed to make EGL context current")?;

        info!("EGL headless context created: {}x{}", width, height);

        Ok(Self {
            instance,
            display,
            context,
            surface,
            config,
            width,
            height,
        })
    }

    fn create_surface(
        instance: &EglInstance,
        display: egl::Display,
        config: egl::Config,
        width: u32,
        height: u32,
    ) -> Result<egl::Surface> {
        let attribs = [
            egl::WIDTH,
            width.max(1) as egl::Int,
            egl::HEIGHT,
            height.max(1) as egl::Int,
            egl::NONE,
        ];
        instance
            .create_pbuffer_surface(display, config, &attribs)
            .context("Failed to create EGL pbuffer surface")
    }

    /// Replace the pbuffer with one of a new size
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == self.width && height == self.height {
            return Ok(());
        }
        let surface = Self::create_surface(&self.instance, self.display, self.config, width, height)?;
        self.instance
            .make_current(self.display, Some(surface), Some(surface), Some(self.context))
            .context("Failed to make resized surface current")?;
        if let Err(e) = self.instance.destroy_surface(self.display, self.surface) {
            warn!("Failed to destroy old surface: {}", e);
        }
        self.surface = surface;
        self.width = width;
        self.height = height;
        info!("Surface resized: {}x{}", width, height);
        Ok(())
    }

    /// Swap buffers
    pub fn swap_buffers(&self) -> Result<()> {
        self.instance
            .swap_buffers(self.display, self.surface)
            .context("Failed to swap buffers")?;
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Choose EGL config
    fn choose_config(
        instance: &EglInstance,
        display: egl::Display,
        renderable_type: egl::Int,
    ) -> Result<egl::Config> {
        let config_attribs = [
            egl::SURFACE_TYPE,
            egl::PBUFFER_BIT,
            egl::RED_SIZE,
            8,
            egl::GREEN_SIZE,
            8,
            egl::BLUE_SIZE,
            8,
            egl::ALPHA_SIZE,
            8,
            egl::DEPTH_SIZE,
            0,
            egl::RENDERABLE_TYPE,
            renderable_type,
            egl::NONE,
        ];

        instance
            .choose_first_config(display, &config_attribs)
            .context("choose_first_config failed")?
            .ok_or_else(|| anyhow!("No suitable EGL config found"))
    }

    /// Load GL function pointers
    pub fn get_proc_address(&self, name: &str) -> *const c_void {
        self.instance
            .get_proc_address(name)
            .map(|f| f as *const c_void)
            .unwrap_or(std::ptr::null())
    }
}

impl Drop for EglContext {
    fn drop(&mut self) {
        let _ = self.instance.make_current(self.display, None, None, None);
        let _ = self.instance.destroy_surface(self.display, self.surface);
        let _ = self.instance.destroy_context(self.display, self.context);
        let _ = self.instance.terminate(self.display);
    }
}

/// OpenGL ES renderer
pub struct GlRenderer {
    gl: glow::Context,
}

impl GlRenderer {
    /// Initialize OpenGL ES from EGL context
    pub fn new(egl: &EglContext) -> Result<Self> {
        let gl = unsafe { glow::Context::from_loader_function(|name| egl.get_proc_address(name)) };

        unsafe {
            info!("OpenGL ES: {}", gl.get_parameter_string(glow::VERSION));
            info!("Renderer: {}", gl.get_parameter_string(glow::RENDERER));
            info!("Vendor: {}", gl.get_parameter_string(glow::VENDOR));
        }

        Ok(Self { gl })
    }

    /// Read the framebuffer as top-down RGBA rows
    pub fn read_rgba(&self, width: u32, height: u32) -> Vec<u8> {
        let mut pixels = vec![0u8; (width * height * 4) as usize];
        unsafe {
            self.gl.read_pixels(
                0,
                0,
                width as i32,
                height as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelPackData::Slice(&mut pixels),
            );
        }
        flip_rows(&pixels, width, height)
    }

    /// Reference to glow context
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }
}

/// Flip vertically since OpenGL origin is bottom-left
pub fn flip_rows(pixels: &[u8], width: u32, height: u32) -> Vec<u8> {
    let row_size = (width * 4) as usize;
    let mut flipped = vec![0u8; pixels.len()];
    for y in 0..height as usize {
        let src_row = (height as usize - 1 - y) * row_size;
        let dst_row = y * row_size;
        flipped[dst_row..dst_row + row_size].copy_from_slice(&pixels[src_row..src_row + row_size]);
    }
    flipped
}
