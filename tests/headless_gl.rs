//! Tests against a real OpenGL ES context on an EGL pbuffer
//!
//! Need a working EGL driver (Mesa surfaceless is enough):
//! cargo test --test headless_gl -- --ignored

use std::sync::{Arc, Mutex};

use glow::HasContext;

use gles_demos::demo::{
    create_renderer, DemoAssets, DemoKind, FrameRenderer, RenderDriver, RenderState,
};
use gles_demos::filter::FilterKind;
use gles_demos::gpu::{
    EglContext, FileImageSource, GlError, GlRenderer, ShaderProgram, ShaderSource, ShaderStage,
    VertexAttribute, VertexLayout, VertexStream,
};
use gles_demos::host::{DrawSurface, SurfaceHost};

/// One context at a time per process
static GPU: Mutex<()> = Mutex::new(());

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

const VALID: ShaderSource = ShaderSource::new(
    "attribute vec4 a_Position;\nuniform mat4 u_Matrix;\nvoid main() { gl_Position = u_Matrix * a_Position; }\n",
    "precision mediump float;\nuniform vec4 u_Color;\nvoid main() { gl_FragColor = u_Color; }\n",
);

fn context() -> (EglContext, GlRenderer) {
    let egl = EglContext::new_headless(64, 64).expect("EGL context");
    let renderer = GlRenderer::new(&egl).expect("GL loader");
    (egl, renderer)
}

fn assets() -> DemoAssets {
    DemoAssets {
        source: Arc::new(FileImageSource::new(".")),
        primary: "builtin:checker".to_string(),
        overlay: "builtin:badge".to_string(),
        filter: FilterKind::None,
        mosaic_cell: 10.0,
    }
}

fn host(kind: DemoKind, assets: &DemoAssets) -> SurfaceHost {
    let driver = RenderDriver::new(create_renderer(kind, assets), WHITE);
    SurfaceHost::new(driver, 64, 64).expect("surface host")
}

fn pixel(rgba: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [rgba[i], rgba[i + 1], rgba[i + 2], rgba[i + 3]]
}

#[test]
#[ignore]
fn valid_program_resolves_locations() {
    let _gpu = GPU.lock().unwrap_or_else(|e| e.into_inner());
    let (_egl, renderer) = context();
    let gl = renderer.gl();

    let program = ShaderProgram::build(gl, &VALID).unwrap();
    assert!(program.attrib_location(gl, "a_Position").is_ok());
    assert!(program.uniform_location(gl, "u_Matrix").is_ok());
    assert!(program.uniform_location(gl, "u_Color").is_ok());
    program.destroy(gl);
}

#[test]
#[ignore]
fn fragment_syntax_error_names_stage() {
    let _gpu = GPU.lock().unwrap_or_else(|e| e.into_inner());
    let (_egl, renderer) = context();

    let broken = ShaderSource::new(VALID.vertex, "void main() { gl_FragColor = vec4(1.0) }");
    match ShaderProgram::build(renderer.gl(), &broken) {
        Err(GlError::ShaderCompile { stage, diagnostic }) => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert!(!diagnostic.trim().is_empty());
        }
        other => panic!("expected compile error, got {:?}", other.map(|_| ())),
    }
}

#[test]
#[ignore]
fn mismatched_varying_fails_link() {
    let _gpu = GPU.lock().unwrap_or_else(|e| e.into_inner());
    let (_egl, renderer) = context();

    let mismatched = ShaderSource::new(
        "attribute vec4 a_Position;\nvarying vec4 v_Color;\nvoid main() { v_Color = a_Position; gl_Position = a_Position; }\n",
        "precision mediump float;\nvarying vec3 v_Color;\nvoid main() { gl_FragColor = vec4(v_Color, 1.0); }\n",
    );
    assert!(matches!(
        ShaderProgram::build(renderer.gl(), &mismatched),
        Err(GlError::ProgramLink { .. })
    ));
}

#[test]
#[ignore]
fn missing_attribute_is_reported() {
    let _gpu = GPU.lock().unwrap_or_else(|e| e.into_inner());
    let (_egl, renderer) = context();
    let gl = renderer.gl();

    let program = ShaderProgram::build(gl, &VALID).unwrap();
    match program.attrib_location(gl, "a_Missing") {
        Err(GlError::AttributeNotFound { name }) => assert_eq!(name, "a_Missing"),
        other => panic!("unexpected: {:?}", other),
    }
    program.destroy(gl);
}

#[test]
#[ignore]
fn point_demo_draws_red_centre() {
    let _gpu = GPU.lock().unwrap_or_else(|e| e.into_inner());
    let mut host = host(DemoKind::Point, &assets());
    host.draw();
    assert_eq!(host.state(), RenderState::Drawable);

    let rgba = host.read_rgba();
    assert_eq!(pixel(&rgba, 64, 32, 32), [255, 0, 0, 255]);
    assert_eq!(pixel(&rgba, 64, 1, 1), [255, 255, 255, 255]);
}

#[test]
#[ignore]
fn projected_polygon_fills_centre_across_resize() {
    let _gpu = GPU.lock().unwrap_or_else(|e| e.into_inner());
    let mut host = host(DemoKind::Projection, &assets());
    host.draw();
    assert_eq!(pixel(&host.read_rgba(), 64, 32, 32), [0, 0, 255, 255]);

    host.resize(128, 64).unwrap();
    host.draw();
    assert_eq!(host.size(), (128, 64));
    assert_eq!(pixel(&host.read_rgba(), 128, 64, 32), [0, 0, 255, 255]);
}

#[test]
#[ignore]
fn image_demo_grayscale_is_neutral() {
    let _gpu = GPU.lock().unwrap_or_else(|e| e.into_inner());
    let mut host = host(DemoKind::Image, &assets());
    assert!(host.set_filter(FilterKind::Grayscale));
    host.draw();

    let rgba = host.read_rgba();
    for &(x, y) in &[(5, 5), (32, 32), (60, 20)] {
        let [r, g, b, _] = pixel(&rgba, 64, x, y);
        assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1, "({}, {})", x, y);
    }
}

#[test]
#[ignore]
fn every_demo_reaches_drawable() {
    let _gpu = GPU.lock().unwrap_or_else(|e| e.into_inner());
    let assets = assets();
    for kind in DemoKind::ALL {
        let mut host = host(kind, &assets);
        host.draw();
        assert_eq!(host.state(), RenderState::Drawable, "{}", kind.name());
    }
}

#[test]
#[ignore]
fn attribute_arrays_are_disabled_after_draw() {
    let _gpu = GPU.lock().unwrap_or_else(|e| e.into_inner());
    let (_egl, renderer) = context();
    let gl = renderer.gl();

    let source = ShaderSource::new(
        "attribute vec4 a_Position;\nvoid main() { gl_Position = a_Position; gl_PointSize = 8.0; }\n",
        "precision mediump float;\nvoid main() { gl_FragColor = vec4(1.0, 0.0, 0.0, 1.0); }\n",
    );
    let program = ShaderProgram::build(gl, &source).unwrap();
    let layout = VertexLayout::interleaved(&[VertexAttribute::new("a_Position", 2)]);
    let stream =
        VertexStream::new(gl, &program, layout, &[0.0, 0.0], glow::STATIC_DRAW).unwrap();
    let location = program.attrib_location(gl, "a_Position").unwrap();

    unsafe {
        gl.clear_color(1.0, 1.0, 1.0, 1.0);
        gl.clear(glow::COLOR_BUFFER_BIT);
    }
    stream.with_bound(gl, |gl| unsafe { gl.draw_arrays(glow::POINTS, 0, 1) });
    assert_eq!(pixel(&renderer.read_rgba(64, 64), 64, 32, 32), [255, 0, 0, 255]);

    // With the array disabled the constant value applies and puts the
    // point off screen; a leaked array would draw it at the centre again.
    unsafe {
        gl.clear(glow::COLOR_BUFFER_BIT);
        gl.vertex_attrib_4_f32(location, 5.0, 5.0, 0.0, 1.0);
        gl.draw_arrays(glow::POINTS, 0, 1);
    }
    assert_eq!(pixel(&renderer.read_rgba(64, 64), 64, 32, 32), [255, 255, 255, 255]);

    stream.destroy(gl);
    program.destroy(gl);
}

/// Renderer whose shader never compiles
struct Broken;

impl FrameRenderer for Broken {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn on_surface_created(&mut self, gl: &glow::Context) -> Result<(), GlError> {
        let source = ShaderSource::new("void main() {", "void main() {}");
        ShaderProgram::build(gl, &source).map(|_| ())
    }

    fn on_draw_frame(&mut self, _gl: &glow::Context) -> Result<(), GlError> {
        panic!("draw must not run without a program");
    }

    fn destroy(&mut self, _gl: &glow::Context) {}
}

#[test]
#[ignore]
fn failed_build_only_clears() {
    let _gpu = GPU.lock().unwrap_or_else(|e| e.into_inner());
    let driver = RenderDriver::new(Box::new(Broken), [0.0, 1.0, 0.0, 1.0]);
    let mut host = SurfaceHost::new(driver, 64, 64).unwrap();
    host.draw();

    assert_eq!(host.state(), RenderState::Uninitialized);
    assert_eq!(pixel(&host.read_rgba(), 64, 10, 10), [0, 255, 0, 255]);
}
