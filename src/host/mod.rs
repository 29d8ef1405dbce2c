//! Drawing-surface host
//!
//! Owns the headless EGL surface and drives a [`RenderDriver`] through the
//! surface-created / surface-changed / draw-frame callbacks. User controls
//! reach the render thread over an mpsc channel; frames are only drawn
//! when a control marks the surface dirty.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};
use std::thread::JoinHandle;

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info, warn};

use crate::demo::{RenderDriver, RenderState};
use crate::filter::{slider_progress, FilterKind};
use crate::gpu::{EglContext, GlRenderer};

/// Message from the input thread to the render thread
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Control {
    SetFilter(FilterKind),
    Redraw,
    Resize(u32, u32),
    Save,
    Quit,
}

impl Control {
    /// Parse one input line
    ///
    /// `filter NAME`, `warm N` / `cool N` (slider 0-100), `redraw`,
    /// `resize WxH`, `save`, `quit`. Blank lines give `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();

        let control = match command.to_ascii_lowercase().as_str() {
            "filter" | "f" => {
                let name = arg.ok_or_else(|| anyhow!("filter needs a name"))?;
                let filter = FilterKind::parse(name, None)
                    .ok_or_else(|| anyhow!("unknown filter: {}", name))?;
                Self::SetFilter(filter)
            }
            "warm" | "cool" => {
                let value: u32 = arg
                    .ok_or_else(|| anyhow!("{} needs a slider value", command))?
                    .parse()
                    .with_context(|| format!("invalid slider value for {}", command))?;
                let progress = slider_progress(value);
                if command.eq_ignore_ascii_case("warm") {
                    Self::SetFilter(FilterKind::warm(progress))
                } else {
                    Self::SetFilter(FilterKind::cool(progress))
                }
            }
            "redraw" | "r" => Self::Redraw,
            "resize" => {
                let size = arg.ok_or_else(|| anyhow!("resize needs WxH"))?;
                let (width, height) = parse_size(size)?;
                Self::Resize(width, height)
            }
            "save" | "s" => Self::Save,
            "quit" | "q" | "exit" => Self::Quit,
            other => bail!("unknown command: {}", other),
        };
        Ok(Some(control))
    }
}

/// Parse `WIDTHxHEIGHT`
pub fn parse_size(text: &str) -> Result<(u32, u32)> {
    let (w, h) = text
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow!("expected WIDTHxHEIGHT, got '{}'", text))?;
    let width: u32 = w.parse().with_context(|| format!("invalid width in '{}'", text))?;
    let height: u32 = h.parse().with_context(|| format!("invalid height in '{}'", text))?;
    if width == 0 || height == 0 {
        bail!("surface size must be non-zero: '{}'", text);
    }
    Ok((width, height))
}

/// What the render loops need from a surface
pub trait DrawSurface {
    fn demo_name(&self) -> &'static str;
    fn size(&self) -> (u32, u32);
    fn draw(&mut self);
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;
    fn set_filter(&mut self, filter: FilterKind) -> bool;
    /// Write the current frame as PNG
    fn save_png(&self, path: &Path) -> Result<()>;
}

/// Headless EGL surface driving one renderer
pub struct SurfaceHost {
    egl: EglContext,
    renderer: GlRenderer,
    driver: RenderDriver,
    frames: u64,
}

impl SurfaceHost {
    /// Create the context, then run surface-created and surface-changed
    pub fn new(mut driver: RenderDriver, width: u32, height: u32) -> Result<Self> {
        let egl = EglContext::new_headless(width, height)?;
        let renderer = GlRenderer::new(&egl)?;

        driver.surface_created(renderer.gl());
        driver.surface_changed(renderer.gl(), width, height);
        info!(
            "Surface ready: {} at {}x{} ({:?})",
            driver.name(),
            width,
            height,
            driver.state()
        );

        Ok(Self {
            egl,
            renderer,
            driver,
            frames: 0,
        })
    }

    pub fn state(&self) -> RenderState {
        self.driver.state()
    }

    /// Frames drawn so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Current frame as top-down RGBA
    pub fn read_rgba(&self) -> Vec<u8> {
        let (width, height) = self.egl.size();
        self.renderer.read_rgba(width, height)
    }
}

impl DrawSurface for SurfaceHost {
    fn demo_name(&self) -> &'static str {
        self.driver.name()
    }

    fn size(&self) -> (u32, u32) {
        self.egl.size()
    }

    fn draw(&mut self) {
        self.driver.draw_frame(self.renderer.gl());
        if let Err(e) = self.egl.swap_buffers() {
            debug!("swap_buffers: {}", e);
        }
        self.frames += 1;
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.egl.resize(width, height)?;
        self.driver.surface_changed(self.renderer.gl(), width, height);
        Ok(())
    }

    fn set_filter(&mut self, filter: FilterKind) -> bool {
        self.driver.set_filter(filter)
    }

    fn save_png(&self, path: &Path) -> Result<()> {
        let (width, height) = self.egl.size();
        write_png(path, width, height, &self.read_rgba())
    }
}

impl Drop for SurfaceHost {
    fn drop(&mut self) {
        self.driver.destroy(self.renderer.gl());
    }
}

/// Encode top-down RGBA rows as an 8-bit PNG
pub fn write_png(path: &Path, width: u32, height: u32, rgba: &[u8]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgba)?;

    info!("Frame saved: {}", path.display());
    Ok(())
}

/// Timestamped capture path for interactive saves
pub fn capture_path(dir: &Path, demo: &str) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("gles-demos_{}_{}.png", demo, timestamp))
}

/// Headless render plan
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderPlan {
    /// Frames drawn at each surface size
    pub frames: u32,
    /// Sizes applied one after another after the initial surface
    pub resizes: Vec<(u32, u32)>,
}

/// Draw `plan` and save every frame as `{demo}_{index:04}.png` in `out_dir`
pub fn run_render(
    surface: &mut impl DrawSurface,
    plan: &RenderPlan,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let frames = plan.frames.max(1);
    let mut saved = Vec::new();
    let sizes = std::iter::once(None).chain(plan.resizes.iter().copied().map(Some));

    for size in sizes {
        if let Some((width, height)) = size {
            surface.resize(width, height)?;
        }
        for _ in 0..frames {
            surface.draw();
            let path = out_dir.join(format!("{}_{:04}.png", surface.demo_name(), saved.len()));
            surface.save_png(&path)?;
            saved.push(path);
        }
    }
    Ok(saved)
}

/// Read controls from stdin until EOF, then send `Quit`
pub fn spawn_stdin_reader(tx: Sender<Control>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("stdin: {}", e);
                    break;
                }
            };
            match Control::parse(&line) {
                Ok(Some(control)) => {
                    let quit = control == Control::Quit;
                    if tx.send(control).is_err() || quit {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => eprintln!("{:#}", e),
            }
        }
        let _ = tx.send(Control::Quit);
    })
}

/// Render-when-dirty loop
///
/// Draws once up front, then once after every control that changes what
/// is on screen. Returns when `Quit` arrives or every sender is gone.
pub fn run_interactive(
    surface: &mut impl DrawSurface,
    controls: Receiver<Control>,
    capture_dir: &Path,
) -> Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            surface.draw();
            dirty = false;
        }

        let Ok(control) = controls.recv() else {
            debug!("Control channel closed");
            break;
        };
        debug!("Control: {:?}", control);

        match control {
            Control::SetFilter(filter) => dirty = surface.set_filter(filter),
            Control::Redraw => dirty = true,
            Control::Resize(width, height) => {
                if surface.size() != (width, height) {
                    surface.resize(width, height)?;
                    dirty = true;
                }
            }
            Control::Save => {
                std::fs::create_dir_all(capture_dir)
                    .with_context(|| format!("Failed to create {}", capture_dir.display()))?;
                let path = capture_path(capture_dir, surface.demo_name());
                if let Err(e) = surface.save_png(&path) {
                    warn!("Save failed: {:#}", e);
                }
            }
            Control::Quit => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    /// Records calls instead of touching a GPU
    struct FakeSurface {
        size: (u32, u32),
        draws: u32,
        filter: Option<FilterKind>,
        accepts_filter: bool,
        saved: Vec<PathBuf>,
    }

    impl FakeSurface {
        fn new(accepts_filter: bool) -> Self {
            Self {
                size: (64, 32),
                draws: 0,
                filter: None,
                accepts_filter,
                saved: Vec::new(),
            }
        }
    }

    impl DrawSurface for FakeSurface {
        fn demo_name(&self) -> &'static str {
            "fake"
        }

        fn size(&self) -> (u32, u32) {
            self.size
        }

        fn draw(&mut self) {
            self.draws += 1;
        }

        fn resize(&mut self, width: u32, height: u32) -> Result<()> {
            self.size = (width, height);
            Ok(())
        }

        fn set_filter(&mut self, filter: FilterKind) -> bool {
            self.filter = Some(filter);
            self.accepts_filter
        }

        fn save_png(&self, path: &Path) -> Result<()> {
            let (w, h) = self.size;
            write_png(path, w, h, &vec![255u8; (w * h * 4) as usize])
        }
    }

    fn run(surface: &mut FakeSurface, controls: &[Control]) {
        let (tx, rx) = mpsc::channel();
        for control in controls {
            tx.send(*control).unwrap();
        }
        drop(tx);
        let dir = tempfile::tempdir().unwrap();
        run_interactive(surface, rx, dir.path()).unwrap();
    }

    #[test]
    fn test_parse_controls() {
        assert_eq!(
            Control::parse("filter gray").unwrap(),
            Some(Control::SetFilter(FilterKind::Grayscale))
        );
        assert_eq!(
            Control::parse("warm 50").unwrap(),
            Some(Control::SetFilter(FilterKind::warm(0.5)))
        );
        assert_eq!(
            Control::parse("COOL 100").unwrap(),
            Some(Control::SetFilter(FilterKind::cool(1.0)))
        );
        assert_eq!(Control::parse("resize 320x240").unwrap(), Some(Control::Resize(320, 240)));
        assert_eq!(Control::parse("  redraw ").unwrap(), Some(Control::Redraw));
        assert_eq!(Control::parse("save").unwrap(), Some(Control::Save));
        assert_eq!(Control::parse("q").unwrap(), Some(Control::Quit));
        assert_eq!(Control::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_control_errors() {
        assert!(Control::parse("filter").is_err());
        assert!(Control::parse("filter sepia").is_err());
        assert!(Control::parse("warm lots").is_err());
        assert!(Control::parse("resize 320").is_err());
        assert!(Control::parse("dance").is_err());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1920x1080").unwrap(), (1920, 1080));
        assert_eq!(parse_size("1080X1920").unwrap(), (1080, 1920));
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("wide").is_err());
    }

    #[test]
    fn test_interactive_draws_only_when_dirty() {
        let mut surface = FakeSurface::new(true);
        run(
            &mut surface,
            &[
                Control::SetFilter(FilterKind::Mosaic),
                Control::Resize(64, 32),
                Control::Redraw,
                Control::Quit,
                Control::Redraw,
            ],
        );
        // initial + filter + redraw; same-size resize and post-quit are ignored
        assert_eq!(surface.draws, 3);
        assert_eq!(surface.filter, Some(FilterKind::Mosaic));
    }

    #[test]
    fn test_filter_without_support_does_not_redraw() {
        let mut surface = FakeSurface::new(false);
        run(&mut surface, &[Control::SetFilter(FilterKind::Grayscale)]);
        assert_eq!(surface.draws, 1);
    }

    #[test]
    fn test_resize_marks_dirty() {
        let mut surface = FakeSurface::new(false);
        run(&mut surface, &[Control::Resize(100, 200)]);
        assert_eq!(surface.size, (100, 200));
        assert_eq!(surface.draws, 2);
    }

    #[test]
    fn test_run_render_saves_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = FakeSurface::new(false);
        let plan = RenderPlan {
            frames: 2,
            resizes: vec![(16, 8)],
        };
        let saved = run_render(&mut surface, &plan, dir.path()).unwrap();

        assert_eq!(saved.len(), 4);
        assert_eq!(surface.draws, 4);
        assert_eq!(saved[0].file_name().unwrap(), "fake_0000.png");
        assert_eq!(saved[3].file_name().unwrap(), "fake_0003.png");

        let decoded = image::open(&saved[3]).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn test_capture_path_is_timestamped() {
        let path = capture_path(Path::new("/tmp"), "image");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("gles-demos_image_"));
        assert!(name.ends_with(".png"));
    }
}
