//! gles-demos - OpenGL ES 2.0 tutorial renderers on a headless surface
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │   stdin thread  ──Control──▶  host loop   │
//! │                                  ↓        │
//! │        RenderDriver (lifecycle states)    │
//! │                                  ↓        │
//! │        demo renderer (shader + streams)   │
//! │                                  ↓        │
//! │        EGL pbuffer  ──▶  PNG capture      │
//! └──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use gles_demos::config::{self, Config};
use gles_demos::demo::{create_renderer, DemoAssets, DemoKind, RenderDriver};
use gles_demos::filter::{self, FilterKind};
use gles_demos::gpu::FileImageSource;
use gles_demos::host::{self, RenderPlan, SurfaceHost};

#[derive(Parser)]
#[command(name = "gles-demos", version, about = "OpenGL ES 2.0 tutorial renderers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render frames headlessly and save them as PNG
    Render(RenderArgs),
    /// Render when dirty, driven by commands on stdin
    Interactive(SurfaceArgs),
    /// Apply an image filter on the CPU (no GPU needed)
    Filter(FilterArgs),
    /// List available demos
    List,
    /// Write the default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
        /// Target path (default: ~/.config/gles-demos/config.toml)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SurfaceArgs {
    /// Demo name (see `list`)
    #[arg(short, long)]
    demo: Option<String>,
    /// Initial surface size, WIDTHxHEIGHT
    #[arg(short, long, value_parser = parse_size_arg)]
    size: Option<(u32, u32)>,
    /// Initial filter for the image demo
    #[arg(long)]
    filter: Option<String>,
    /// Directory for saved frames
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    surface: SurfaceArgs,
    /// Frames drawn at each surface size
    #[arg(short, long)]
    frames: Option<u32>,
    /// Further sizes to resize to, in order
    #[arg(long, value_parser = parse_size_arg, num_args = 1..)]
    resize: Vec<(u32, u32)>,
}

#[derive(Args)]
struct FilterArgs {
    /// Input image
    #[arg(short, long)]
    input: PathBuf,
    /// none, gray, warm, cool or mosaic
    #[arg(short, long)]
    filter: String,
    /// Tint slider position 0-100 (warm and cool)
    #[arg(short, long)]
    progress: Option<u32>,
    /// Mosaic block size in 400x400 reference texels
    #[arg(long, value_parser = parse_cell_arg)]
    cell: Option<f32>,
    /// Output image
    #[arg(short, long)]
    out: PathBuf,
}

fn parse_size_arg(text: &str) -> Result<(u32, u32), String> {
    host::parse_size(text).map_err(|e| e.to_string())
}

fn parse_cell_arg(text: &str) -> Result<f32, String> {
    let cell: f32 = text.trim().parse().map_err(|e| format!("{}", e))?;
    filter::checked_mosaic_cell(cell)
        .ok_or_else(|| format!("mosaic cell must be a positive number, got '{}'", text))
}

/// Build the renderer driver for the selected demo
fn build_driver(cfg: &Config, args: &SurfaceArgs) -> Result<(RenderDriver, DemoKind)> {
    let name = args.demo.as_deref().unwrap_or(&cfg.demo.default);
    let kind = DemoKind::from_name_or_default(name);

    let initial_filter = match &args.filter {
        Some(name) => FilterKind::parse(name, None)
            .with_context(|| format!("Unknown filter: {}", name))?,
        None => cfg.filter.initial_filter(),
    };

    let assets = DemoAssets {
        source: Arc::new(FileImageSource::new(cfg.images.asset_path())),
        primary: cfg.images.primary.clone(),
        overlay: cfg.images.overlay.clone(),
        filter: initial_filter,
        mosaic_cell: cfg.filter.mosaic_cell(),
    };
    let renderer = create_renderer(kind, &assets);
    Ok((RenderDriver::new(renderer, cfg.surface.clear_rgba()), kind))
}

fn surface_size(cfg: &Config, args: &SurfaceArgs) -> (u32, u32) {
    args.size
        .unwrap_or((cfg.surface.width.max(1), cfg.surface.height.max(1)))
}

fn out_dir(cfg: &Config, args: &SurfaceArgs) -> PathBuf {
    args.out.clone().unwrap_or_else(|| cfg.output.capture_path())
}

fn run_render(cfg: &Config, args: RenderArgs) -> Result<()> {
    let (driver, kind) = build_driver(cfg, &args.surface)?;
    let (width, height) = surface_size(cfg, &args.surface);
    let mut surface = SurfaceHost::new(driver, width, height)?;

    let plan = RenderPlan {
        frames: args.frames.unwrap_or(cfg.demo.frames),
        resizes: args.resize,
    };
    let saved = host::run_render(&mut surface, &plan, &out_dir(cfg, &args.surface))?;
    println!("{}: {} frame(s) saved", kind.name(), saved.len());
    for path in saved {
        println!("  {}", path.display());
    }
    Ok(())
}

fn run_interactive(cfg: &Config, args: SurfaceArgs) -> Result<()> {
    let (driver, kind) = build_driver(cfg, &args)?;
    let (width, height) = surface_size(cfg, &args);
    let mut surface = SurfaceHost::new(driver, width, height)?;

    println!("{} running at {}x{}", kind.name(), width, height);
    println!("Commands: filter NAME | warm N | cool N | resize WxH | redraw | save | quit");

    let (tx, rx) = mpsc::channel();
    // Detached: blocked on stdin until EOF or quit
    let _reader = host::spawn_stdin_reader(tx);
    host::run_interactive(&mut surface, rx, &out_dir(cfg, &args))?;
    info!("{} frame(s) drawn", surface.frames());
    Ok(())
}

fn run_filter(cfg: &Config, args: FilterArgs) -> Result<()> {
    let progress = args.progress.map(filter::slider_progress);
    let kind = FilterKind::parse(&args.filter, progress)
        .with_context(|| format!("Unknown filter: {}", args.filter))?;
    let cell = args.cell.unwrap_or_else(|| cfg.filter.mosaic_cell());

    let input = image::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?
        .to_rgba8();
    let output = filter::apply(&kind, &input, cell);
    output
        .save(&args.out)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;

    println!(
        "{} -> {} ({})",
        args.input.display(),
        args.out.display(),
        kind.name()
    );
    Ok(())
}

fn run_list() {
    for kind in DemoKind::ALL {
        println!("{:<14} {}", kind.name(), kind.description());
    }
}

fn run_init_config(force: bool, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => config::default_config_path().context("Config directory not found")?,
    };

    if path.exists() && !force {
        println!("Config file already exists: {}", path.display());
        println!("Use --force to overwrite.");
        return Ok(());
    }

    Config::write_default(&path)?;
    println!("Config file generated:");
    println!("  Path: {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    info!("gles-demos starting...");

    match cli.command {
        Command::Render(args) => run_render(&Config::load(), args),
        Command::Interactive(args) => run_interactive(&Config::load(), args),
        Command::Filter(args) => run_filter(&Config::load(), args),
        Command::List => {
            run_list();
            Ok(())
        }
        Command::InitConfig { force, path } => run_init_config(force, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter_cli(cell: &str) -> Result<Cli, clap::Error> {
        let cell = format!("--cell={}", cell);
        Cli::try_parse_from([
            "gles-demos",
            "filter",
            "-i",
            "in.png",
            "-f",
            "mosaic",
            cell.as_str(),
            "-o",
            "out.png",
        ])
    }

    #[test]
    fn test_filter_cell_accepts_positive() {
        match filter_cli("12.5").unwrap().command {
            Command::Filter(args) => assert_eq!(args.cell, Some(12.5)),
            _ => panic!("expected filter command"),
        }
    }

    #[test]
    fn test_filter_cell_rejects_unusable_sizes() {
        for cell in ["0", "-10", "NaN", "inf", "abc"] {
            assert!(filter_cli(cell).is_err(), "--cell={}", cell);
        }
    }
}
