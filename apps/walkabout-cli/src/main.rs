use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use glam::{Quat, Vec3};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use walkabout_input::{EmulatedXr, InputState, PRIMARY_CONTROLLER, XrEvent};
use walkabout_locomotion::{Locomotion, LocomotionConfig, Mode, RigPose};
use walkabout_render::{DebugTextRenderer, RenderView, Renderer};
use walkabout_scene::Scene;

#[derive(Parser)]
#[command(name = "walkabout-cli", about = "Headless walkabout tools")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the demo scene
    Scene {
        /// Seed for tree placement
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
    /// Run the locomotion integrator over scripted frames
    Simulate(SimulateArgs),
}

#[derive(clap::Args, Debug, Clone)]
struct SimulateArgs {
    /// Number of frames to run
    #[arg(short, long, default_value = "60")]
    frames: u32,
    /// Seconds per frame
    #[arg(short, long, default_value = "0.016666668")]
    delta: f32,
    /// Key held from the first frame, e.g. KeyW or ShiftLeft (repeatable)
    #[arg(long = "hold", value_name = "KEY")]
    hold: Vec<String>,
    /// Release every held key after this many frames
    #[arg(long, value_name = "N")]
    release_after: Option<u32>,
    /// Run with a presenting XR session
    #[arg(long)]
    xr: bool,
    /// Hold the XR trigger for the whole run
    #[arg(long, requires = "xr")]
    trigger: bool,
    /// Controller yaw in degrees, counter-clockwise seen from above
    #[arg(long, default_value = "0", value_name = "DEG", allow_negative_numbers = true)]
    controller_yaw: f32,
    /// Locomotion config file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print one JSON record per frame
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct FrameRecord {
    frame: u32,
    mode: &'static str,
    velocity: [f32; 2],
    position: Vec3,
}

#[derive(Debug)]
struct Simulation {
    pose: RigPose,
    locomotion: Locomotion,
    records: Vec<FrameRecord>,
}

fn simulate(args: &SimulateArgs, config: LocomotionConfig) -> anyhow::Result<Simulation> {
    if !args.delta.is_finite() || args.delta < 0.0 {
        bail!("invalid frame delta {}", args.delta);
    }
    if !args.controller_yaw.is_finite() {
        bail!("invalid controller yaw {}", args.controller_yaw);
    }

    let mut input = InputState::new();
    for key in &args.hold {
        if !input.handle_key(key, true) {
            bail!("unknown key `{key}`");
        }
    }

    let mut xr = EmulatedXr::new();
    let mut locomotion = Locomotion::new(config);
    if args.xr {
        xr.set_presenting(true);
        xr.set_controller_orientation(
            PRIMARY_CONTROLLER,
            Quat::from_rotation_y(args.controller_yaw.to_radians()),
        );
        if args.trigger {
            locomotion.handle_xr_event(XrEvent::SelectStart {
                controller: PRIMARY_CONTROLLER,
            });
        }
    }

    let mut pose = RigPose::default();
    let mut records = Vec::with_capacity(args.frames as usize);
    for frame in 0..args.frames {
        if args.release_after == Some(frame) {
            tracing::debug!(frame, "releasing held keys");
            input = InputState::new();
        }

        let motion = locomotion.update_with_session(args.delta, &input, &xr);
        motion.apply(&mut pose);

        let v = locomotion.desktop().velocity();
        records.push(FrameRecord {
            frame,
            mode: match locomotion.mode() {
                Some(Mode::Vr) => "vr",
                _ => "desktop",
            },
            velocity: [v.x, v.y],
            position: pose.position,
        });
    }

    Ok(Simulation {
        pose,
        locomotion,
        records,
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("walkabout-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("input: {}", walkabout_input::crate_info());
            println!("locomotion: {}", walkabout_locomotion::crate_info());
            println!("scene: {}", walkabout_scene::crate_info());
            println!("render: {}", walkabout_render::crate_info());
        }
        Commands::Scene { seed } => {
            let scene = Scene::demo(seed);
            let out = DebugTextRenderer::new().render(&scene, &RenderView::default());
            print!("{out}");
        }
        Commands::Simulate(args) => {
            let config = match &args.config {
                Some(path) => LocomotionConfig::load(path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => LocomotionConfig::default(),
            };
            let sim = simulate(&args, config)?;

            if args.json {
                for record in &sim.records {
                    println!("{}", serde_json::to_string(record)?);
                }
            } else {
                let p = sim.pose.position;
                let v = sim.locomotion.desktop().velocity();
                println!(
                    "Frames: {}, delta: {}s, mode: {}",
                    args.frames,
                    args.delta,
                    if args.xr { "vr" } else { "desktop" }
                );
                println!("Position: ({:.4}, {:.4}, {:.4})", p.x, p.y, p.z);
                println!("Velocity: ({:.4}, {:.4})", v.x, v.y);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> SimulateArgs {
        let mut argv = vec!["walkabout-cli", "simulate"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Simulate(args) => args,
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn held_forward_walks_down_negative_z() {
        let sim = simulate(
            &args(&["--frames", "30", "--hold", "KeyW"]),
            LocomotionConfig::default(),
        )
        .unwrap();
        assert!(sim.pose.position.z < 0.0);
        assert!(sim.pose.position.x.abs() < 1e-5);
        assert_eq!(sim.pose.position.y, 1.6);
        assert_eq!(sim.records.len(), 30);
    }

    #[test]
    fn release_lets_velocity_decay() {
        let sim = simulate(
            &args(&[
                "--frames",
                "200",
                "--hold",
                "KeyD",
                "--release-after",
                "20",
            ]),
            LocomotionConfig::default(),
        )
        .unwrap();
        let at_release = sim.records[20].velocity[0].abs();
        let last = sim.records[199].velocity[0].abs();
        assert!(last < at_release);
        assert!(last < 1e-3);
    }

    #[test]
    fn non_finite_delta_is_rejected() {
        for delta in ["inf", "NaN"] {
            let run = simulate(
                &args(&["--hold", "KeyW", "--delta", delta]),
                LocomotionConfig::default(),
            );
            assert!(run.is_err(), "{delta}");
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = simulate(&args(&["--hold", "KeyQ"]), LocomotionConfig::default());
        assert!(err.is_err());
    }

    #[test]
    fn xr_trigger_glides_at_vr_speed() {
        let sim = simulate(
            &args(&[
                "--frames",
                "10",
                "--delta",
                "0.1",
                "--xr",
                "--trigger",
                "--controller-yaw",
                "90",
            ]),
            LocomotionConfig::default(),
        )
        .unwrap();
        // Yaw 90 degrees turns -Z towards -X; one second at 3 u/s.
        let p = sim.pose.position;
        assert!((p.x + 3.0).abs() < 1e-3);
        assert!(p.z.abs() < 1e-3);
        assert!(sim.records.iter().all(|r| r.mode == "vr"));
    }

    #[test]
    fn xr_without_trigger_stays_put() {
        let sim = simulate(
            &args(&["--frames", "10", "--xr", "--hold", "KeyW"]),
            LocomotionConfig::default(),
        )
        .unwrap();
        assert_eq!(sim.pose.position, RigPose::default().position);
        assert_eq!(sim.locomotion.desktop().velocity(), glam::Vec2::ZERO);
    }

    #[test]
    fn frame_record_serializes() {
        let record = FrameRecord {
            frame: 3,
            mode: "desktop",
            velocity: [0.0, -1.5],
            position: Vec3::new(0.0, 1.6, -2.0),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"frame\":3"));
        assert!(json.contains("\"mode\":\"desktop\""));
    }
}
