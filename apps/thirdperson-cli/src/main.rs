mod scenario;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use thirdperson_input::{FrameInput, InputReader};
use thirdperson_kernel::{Scene, TransformAccess};
use thirdperson_locomotion::jump_velocity;
use thirdperson_persist::{ControllerState, Snapshot};
use thirdperson_rig::{Rig, RigConfig};
use thirdperson_tools::{GizmoRecorder, RigInspector};
use tracing_subscriber::EnvFilter;

use crate::scenario::{Script, demo_scene, demo_scene_with_id};

#[derive(Parser)]
#[command(name = "thirdperson-cli", about = "Drive the third-person rig headless")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default tunables
    Info,
    /// Run a scripted input sequence against the demo scene
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "120")]
        ticks: u64,
        /// Frame delta in seconds
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,
        #[arg(short, long, value_enum, default_value = "walk")]
        script: Script,
        /// Rig config file (.yaml, .yml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print state every N frames
        #[arg(long, default_value = "30")]
        every: u64,
        /// Print the last frame's debug gizmos
        #[arg(long)]
        gizmos: bool,
    },
    /// Initial upward speed for a jump apex height
    JumpVelocity {
        #[arg(long, default_value = "1.5")]
        height: f32,
        #[arg(long, default_value = "-9.81", allow_hyphen_values = true)]
        gravity: f32,
    },
    /// Snapshot mid-run, restore into a fresh scene, and compare trajectories
    Snapshot {
        #[arg(short, long, default_value = "180")]
        ticks: u64,
        /// Frame at which to snapshot
        #[arg(long, default_value = "60")]
        split: u64,
        #[arg(short, long, value_enum, default_value = "wall")]
        script: Script,
        /// Round-trip the snapshot through this file (.cbor or .json)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Dump the default rig config
    Config {
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: ConfigFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ConfigFormat {
    Yaml,
    Json,
}

const DT: f32 = 1.0 / 60.0;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let config = RigConfig::default();
            println!("thirdperson-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "locomotion: walk={} run={} gravity={} jump_height={} -> v0={:.3}",
                config.locomotion.walk_speed,
                config.locomotion.run_speed,
                config.locomotion.gravity,
                config.locomotion.jump_height,
                jump_velocity(config.locomotion.jump_height, config.locomotion.gravity)
            );
            println!(
                "camera: distance={} height={} pitch=[{}, {}] sensitivity={}",
                config.camera.distance,
                config.camera.height,
                config.camera.min_pitch,
                config.camera.max_pitch,
                config.camera.sensitivity
            );
            println!(
                "input: map `{}` with {} bound actions",
                config.input.name,
                config.input.actions.len()
            );
        }
        Commands::Simulate {
            ticks,
            dt,
            script,
            config,
            every,
            gizmos,
        } => {
            let config = load_config(config.as_deref())?;
            let (mut scene, id) = demo_scene(config.body);
            let mut rig = Rig::single(&config, id);
            let mut reader = InputReader::new(config.input.clone());
            let mut recorder = GizmoRecorder::new();
            let every = every.max(1);

            println!("Simulate: script={script:?} ticks={ticks} dt={dt:.4}");
            for tick in 0..ticks {
                recorder.begin_frame();
                let input = reader.read(&script.device_frame(tick));
                let report = rig.frame_observed(&mut scene, &input, dt, &mut recorder);
                if let Some(reason) = report.skipped {
                    bail!("frame {tick} skipped: {reason}");
                }
                if (tick + 1) % every == 0
                    && let Some(info) = RigInspector::inspect_player(&rig, &scene, id)
                {
                    println!("[{:>4}] {info}", tick + 1);
                }
            }
            tracing::debug!(frames = rig.frame_count(), "simulation finished");
            for camera in RigInspector::inspect_cameras(&rig) {
                println!("{camera}");
            }
            println!("{}", RigInspector::summary(&rig, &scene));
            if gizmos {
                print!("{}", recorder.render_text());
            }
        }
        Commands::JumpVelocity { height, gravity } => {
            if gravity.is_nan() || gravity >= 0.0 {
                bail!("gravity must be negative, got {gravity}");
            }
            if height.is_nan() || height < 0.0 {
                bail!("height must not be negative, got {height}");
            }
            println!("{:.4}", jump_velocity(height, gravity));
        }
        Commands::Snapshot {
            ticks,
            split,
            script,
            out,
        } => {
            if split > ticks {
                bail!("split {split} is past the last frame {ticks}");
            }
            let config = RigConfig::default();

            // Record inputs once so both runs see identical edges.
            let mut reader = InputReader::new(config.input.clone());
            let inputs: Vec<FrameInput> = (0..ticks)
                .map(|t| reader.read(&script.device_frame(t)))
                .collect();

            let (mut scene, id) = demo_scene(config.body);
            let mut rig = Rig::single(&config, id);
            run_frames(&mut rig, &mut scene, &inputs);
            let expected = scene.transform(id).context("player body vanished")?;

            let (mut scene, id) = demo_scene(config.body);
            let mut rig = Rig::single(&config, id);
            run_frames(&mut rig, &mut scene, &inputs[..split as usize]);
            let snapshot = Snapshot::capture(ControllerState::capture(&rig, &scene, id)?)?;
            println!(
                "Snapshot: tick={} sha256={}",
                snapshot.state.tick,
                &snapshot.sha256[..16]
            );

            let snapshot = match out {
                Some(path) => {
                    snapshot.save(&path)?;
                    Snapshot::load(&path)
                        .with_context(|| format!("reloading {}", path.display()))?
                }
                None => Snapshot::from_cbor(&snapshot.to_cbor()?)?,
            };

            let mut fresh = demo_scene_with_id(config.body, id, snapshot.state.body);
            let mut resumed = Rig::single(&config, id);
            snapshot.state.restore(&mut resumed, &mut fresh)?;
            run_frames(&mut resumed, &mut fresh, &inputs[split as usize..]);
            let actual = fresh.transform(id).context("restored body vanished")?;

            println!(
                "Uninterrupted: pos=({:.4}, {:.4}, {:.4})",
                expected.position.x, expected.position.y, expected.position.z
            );
            println!(
                "Restored:      pos=({:.4}, {:.4}, {:.4})",
                actual.position.x, actual.position.y, actual.position.z
            );
            println!(
                "Match: {}",
                if expected == actual { "OK" } else { "MISMATCH" }
            );
        }
        Commands::Config { format } => {
            let config = RigConfig::default();
            match format {
                ConfigFormat::Yaml => print!("{}", config.to_yaml_string()?),
                ConfigFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RigConfig> {
    match path {
        Some(path) => RigConfig::load(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(RigConfig::default()),
    }
}

fn run_frames(rig: &mut Rig, scene: &mut Scene, inputs: &[FrameInput]) {
    for input in inputs {
        rig.frame(scene, input, DT);
    }
}
