use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wireorbit_input::{HeldKeys, Key};
use wireorbit_render::{DrawCall, RecordingBackend};
use wireorbit_scene::{SceneConfig, SceneController, StepMode, UpdateOutcome, fixtures};

#[derive(Parser)]
#[command(name = "wireorbit-cli", about = "Headless tools for the wireorbit scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML scene configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Hold keys for a number of frames and report the camera
    Orbit {
        /// Number of update calls to simulate
        #[arg(short, long, default_value = "100")]
        frames: u32,
        /// Held keys, comma separated (left,right,up,down,escape)
        #[arg(short, long, value_delimiter = ',')]
        keys: Vec<Key>,
        /// Seconds per frame
        #[arg(long, default_value = "0.016")]
        dt: f32,
        /// Scale rotation by frame time
        #[arg(long)]
        time_scaled: bool,
    },
    /// Render one frame of the default scene into a recording backend
    Frame {
        /// Print the frame as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct DrawReport {
    label: String,
    #[serde(flatten)]
    call: DrawCall,
}

#[derive(Serialize)]
struct FrameReport {
    yaw: f32,
    pitch: f32,
    camera_position: [f32; 3],
    view: [f32; 16],
    projection: [f32; 16],
    draws: Vec<DrawReport>,
}

fn load_scene(config: SceneConfig) -> anyhow::Result<SceneController> {
    let mut scene = SceneController::new(config);
    for fixture in fixtures::default_scene() {
        scene
            .spawn(fixture.label, fixture.vertices, fixture.center)
            .with_context(|| format!("fixture '{}'", fixture.label))?;
    }
    tracing::debug!(objects = scene.objects().len(), "fixture scene built");
    Ok(scene)
}

fn record_frame(scene: &mut SceneController) -> anyhow::Result<FrameReport> {
    let mut backend = RecordingBackend::new();
    scene.on_load(&mut backend, "recorded vertex stage", "recorded fragment stage")?;
    scene.on_render(&mut backend)?;

    let draws = backend
        .draws()
        .into_iter()
        .map(|call| DrawReport {
            label: backend
                .mesh_label(call.mesh)
                .unwrap_or("<released>")
                .to_owned(),
            call: call.clone(),
        })
        .collect();

    let camera = scene.camera();
    let report = FrameReport {
        yaw: camera.yaw,
        pitch: camera.pitch,
        camera_position: camera.position().to_array(),
        view: camera.view().to_cols_array(),
        projection: camera.projection().to_cols_array(),
        draws,
    };
    scene.on_unload(&mut backend);
    Ok(report)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SceneConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("wireorbit-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("input: {}", wireorbit_input::crate_info());
            println!("render: {}", wireorbit_render::crate_info());
            println!("scene: {}", wireorbit_scene::crate_info());
        }
        Commands::Orbit {
            frames,
            keys,
            dt,
            time_scaled,
        } => {
            let mut config = config;
            if time_scaled {
                config.camera.step_mode = StepMode::TimeScaled;
            }
            let mut scene = SceneController::new(config);
            let held: HeldKeys = keys.into_iter().collect();

            let mut ran = 0;
            for _ in 0..frames {
                ran += 1;
                if scene.on_update(&held, dt) == UpdateOutcome::Close {
                    println!("Close requested after {ran} frame(s)");
                    break;
                }
            }

            let camera = scene.camera();
            let pos = camera.position();
            println!("Frames: {ran}");
            println!("Yaw: {:.4}  Pitch: {:.4}", camera.yaw, camera.pitch);
            println!("Camera: ({:.3}, {:.3}, {:.3})", pos.x, pos.y, pos.z);
            println!(
                "Radius: {:.4} (distance {:.1})",
                pos.length(),
                camera.distance
            );
        }
        Commands::Frame { json } => {
            let mut scene = load_scene(config)?;
            let report = record_frame(&mut scene)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let p = report.camera_position;
                println!("Camera: ({:.2}, {:.2}, {:.2})", p[0], p[1], p[2]);
                println!("Draws: {}", report.draws.len());
                for draw in &report.draws {
                    let vertices = &draw.call.vertices;
                    println!(
                        "  {:<10} lines {:>3} vertices {}..{}",
                        draw.label,
                        vertices.len() / 2,
                        vertices.start,
                        vertices.end
                    );
                }
            }
        }
    }

    Ok(())
}
