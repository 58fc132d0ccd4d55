use std::convert::TryFrom;
use std::error::Error;
use std::io::{ self, BufReader };
use std::path::PathBuf;
use std::sync::mpsc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ascii_donut::render_loop::{ run, spawn_input, FrameLoop };
use ascii_donut::scene::{ load_scene, Scene, SceneJson };
use ascii_donut::screen::{ BackFaces, Screen, VerticalScale };
use ascii_donut::terminal::TerminalSink;

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Renders a spinning, shaded torus as ASCII art.
///
/// While running, commands are read from standard input one per line:
/// `s1 <speed>`, `s2 <speed>`, a bare `<speed>` for both, `k1 <scale>`,
/// `k2 <distance>`, `l <x> <y> <z>`, `stop`, `start` and `quit`.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Cli {
    /// JSON scene file; missing fields take the built-in defaults
    #[clap(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Screen width in characters
    #[clap(long)]
    width: Option<usize>,

    /// Screen height in characters
    #[clap(long)]
    height: Option<usize>,

    /// Milliseconds between frames
    #[clap(long, value_name = "MS")]
    interval: Option<u64>,

    /// Let unlit samples take part in the depth test
    #[clap(long)]
    retain_back_faces: bool,

    /// Scale rows by the perspective factor as well as columns
    #[clap(long)]
    scale_rows: bool,

    /// Stop after this many frame ticks
    #[clap(long, value_name = "N")]
    frames: Option<u64>,

    /// Write frames one after another without terminal control codes
    #[clap(long)]
    plain: bool,

    /// Logging level (trace, debug, info, warn, error); overrides RUST_LOG
    #[clap(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Print the effective configuration as JSON and exit
    #[clap(long)]
    dump_config: bool,
}

impl Cli {
    /// Layers command line overrides on top of a scene description.
    fn overlay(&self, json: &mut SceneJson) {
        if let Some(width) = self.width {
            json.width = width;
        }

        if let Some(height) = self.height {
            json.height = height;
        }

        if let Some(interval) = self.interval {
            json.frame_interval_ms = interval;
        }

        if self.retain_back_faces {
            json.back_faces = BackFaces::Retain;
        }

        if self.scale_rows {
            json.vertical_scale = VerticalScale::Perspective;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let filter = match &cli.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
    };

    // Frames own stdout.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut json = match &cli.config {
        Some(path) => load_scene(path)?,
        None => SceneJson::default(),
    };
    cli.overlay(&mut json);

    if cli.dump_config {
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    let scene = Scene::try_from(json)?;
    info!(
        samples = scene.torus.sample_count(),
        width = scene.screen.width,
        height = scene.screen.height,
        back_faces = ?scene.screen.back_faces,
        "scene loaded"
    );

    let (sender, receiver) = mpsc::channel();

    // Not joined: a read from stdin can block for as long as it likes.
    spawn_input(BufReader::new(io::stdin()), scene.parameters, sender);

    let mut frames = FrameLoop::new(scene.torus, scene.parameters,
        Screen::new(scene.screen), receiver);
    let mut sink = TerminalSink::stdout(cli.plain);

    run(&mut frames, &mut sink, scene.frame_interval, cli.frames)?;

    Ok(())
}

#[test]
fn overlay_overrides_only_given_flags() {
    let cli = Cli::parse_from(&["ascii-donut", "--width", "40",
        "--retain-back-faces"]);
    let mut json = SceneJson::default();
    cli.overlay(&mut json);

    assert_eq!(json.width, 40);
    assert_eq!(json.height, SceneJson::default().height);
    assert_eq!(json.back_faces, BackFaces::Retain);
    assert_eq!(json.vertical_scale, VerticalScale::Aspect);
    assert_eq!(json.frame_interval_ms, SceneJson::default().frame_interval_ms);
}

#[test]
fn cli_defaults() {
    let cli = Cli::parse_from(&["ascii-donut"]);

    assert!(cli.config.is_none());
    assert!(!cli.plain);
    assert!(!cli.dump_config);
    assert_eq!(cli.frames, None);
}

#[test]
fn scale_rows_flag() {
    let cli = Cli::parse_from(&["ascii-donut", "--scale-rows"]);
    let mut json = SceneJson::default();
    cli.overlay(&mut json);

    assert_eq!(json.vertical_scale, VerticalScale::Perspective);
}
