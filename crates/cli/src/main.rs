#![deny(unsafe_code)]
//! CLI binary for the chromafield frame generator.
//!
//! Subcommands:
//! - `render [engine]`: run an engine for N frames, write MP4 or a PNG sequence
//! - `snapshot [engine]`: run an engine N steps, write one PNG
//! - `list`: print available engines
//! - `schema [engine]`: print an engine's parameter schema

mod error;

use chromafield_core::seed::{duration_frames, DEFAULT_FPS};
use chromafield_core::{Engine, Seed};
use chromafield_engines::ffmpeg::{FfmpegSink, VideoConfig};
use chromafield_engines::sink::{FrameSink, PngSequenceSink};
use chromafield_engines::EngineKind;
use clap::{Args, Parser, Subcommand};
use error::CliError;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chromafield", about = "Animated color-field video generator")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by every command that builds an engine.
#[derive(Args, Clone)]
struct EngineArgs {
    /// Engine name.
    #[arg(default_value = "blend")]
    engine: String,

    /// Frame width in pixels.
    #[arg(short = 'W', long, default_value_t = 1280)]
    width: usize,

    /// Frame height in pixels.
    #[arg(short = 'H', long, default_value_t = 720)]
    height: usize,

    /// PRNG seed for deterministic output.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Engine parameters as a JSON string, e.g. '{"num_points": 6}'.
    #[arg(long, default_value = "{}")]
    params: String,
}

#[derive(Subcommand)]
enum Command {
    /// Render a frame sequence to MP4 (via ffmpeg) or a directory of PNGs.
    Render {
        #[command(flatten)]
        engine: EngineArgs,

        /// Clip length in seconds.
        #[arg(long, default_value_t = 60)]
        seconds: u64,

        /// Frames per second.
        #[arg(long, default_value_t = DEFAULT_FPS)]
        fps: u32,

        /// Exact frame count; overrides --seconds.
        #[arg(long)]
        frames: Option<u64>,

        /// Replay a saved run record; engine flags are ignored.
        #[arg(long)]
        from: Option<PathBuf>,

        /// MP4 output path.
        #[arg(short, long, default_value = "output.mp4")]
        output: PathBuf,

        /// Write numbered PNG frames into this directory instead of an MP4.
        #[arg(long)]
        png_dir: Option<PathBuf>,

        /// Write the run record as JSON to this path.
        #[arg(long)]
        save_seed: Option<PathBuf>,

        /// Log progress every N frames (0 disables).
        #[arg(long, default_value_t = 30)]
        progress_every: u64,
    },
    /// Run an engine for N steps and write a single PNG.
    Snapshot {
        #[command(flatten)]
        engine: EngineArgs,

        /// Number of simulation steps before the snapshot.
        #[arg(short, long, default_value_t = 1)]
        steps: u64,

        /// Output file path.
        #[arg(short, long, default_value = "frame.png")]
        output: PathBuf,
    },
    /// List available engines.
    List,
    /// Print the parameter schema of an engine.
    Schema {
        /// Engine name.
        #[arg(default_value = "blend")]
        engine: String,
    },
}

fn init_tracing(verbose: u8, json: bool) {
    let default = match (verbose, json) {
        (0, true) => "warn",
        (0, false) => "info",
        (1, _) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_params(raw: &str) -> Result<serde_json::Value, CliError> {
    let params: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    if !params.is_object() {
        return Err(CliError::Input("--params must be a JSON object".into()));
    }
    Ok(params)
}

fn load_seed(path: &Path) -> Result<Seed, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("failed to read '{}': {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid run record '{}': {e}", path.display())))
}

fn save_seed(run: &Seed, path: &Path) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(run)?;
    std::fs::write(path, text)
        .map_err(|e| CliError::Io(format!("failed to write '{}': {e}", path.display())))
}

/// Builds the run record from flags, or loads it from `from`.
fn resolve_run(
    args: &EngineArgs,
    seconds: u64,
    fps: u32,
    frames: Option<u64>,
    from: Option<&Path>,
) -> Result<Seed, CliError> {
    let run = match from {
        Some(path) => load_seed(path)?,
        None => {
            let mut run = Seed::new(&args.engine, args.width, args.height, args.seed);
            run.params = parse_params(&args.params)?;
            run.fps = fps;
            run.frames = frames.unwrap_or_else(|| duration_frames(seconds, fps));
            run
        }
    };
    run.validate()?;
    Ok(run)
}

fn build_engine(run: &Seed) -> Result<EngineKind, CliError> {
    Ok(EngineKind::from_name(
        &run.engine,
        run.width,
        run.height,
        run.seed,
        &run.params,
    )?)
}

/// Steps `engine` `run.frames` times, handing every frame to `sink`.
fn drive(
    engine: &mut dyn Engine,
    sink: &mut dyn FrameSink,
    frames: u64,
    progress_every: u64,
) -> Result<(), CliError> {
    info!("generating {frames} frames");
    for index in 0..frames {
        engine.step()?;
        sink.write_frame(engine.frame())?;
        let done = index + 1;
        if progress_every > 0 && (done % progress_every == 0 || done == frames) {
            info!(frame = done, total = frames, "progress");
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let engines = EngineKind::list_engines();
            if cli.json {
                let info = serde_json::json!({ "engines": engines });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Engines:");
                for name in engines {
                    println!("  {name}");
                }
            }
        }
        Command::Schema { engine } => {
            let eng = EngineKind::from_name(&engine, 2, 2, 1, &serde_json::json!({}))?;
            println!("{}", serde_json::to_string_pretty(&eng.param_schema())?);
        }
        Command::Snapshot {
            engine,
            steps,
            output,
        } => {
            if steps == 0 {
                return Err(CliError::Input(
                    "--steps must be at least 1; the frame is blank before the first step".into(),
                ));
            }
            let run = resolve_run(&engine, 0, DEFAULT_FPS, Some(steps), None)?;
            let mut eng = build_engine(&run)?;
            (0..steps).try_for_each(|_| eng.step())?;
            chromafield_engines::snapshot::write_png(eng.frame(), &output)?;

            if cli.json {
                let info = serde_json::json!({
                    "engine": run.engine,
                    "width": run.width,
                    "height": run.height,
                    "steps": steps,
                    "seed": run.seed,
                    "params": eng.params(),
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} ({}x{}, {steps} steps, seed {}) -> {}",
                    run.engine,
                    run.width,
                    run.height,
                    run.seed,
                    output.display()
                );
            }
        }
        Command::Render {
            engine,
            seconds,
            fps,
            frames,
            from,
            output,
            png_dir,
            save_seed: seed_path,
            progress_every,
        } => {
            let run = resolve_run(&engine, seconds, fps, frames, from.as_deref())?;
            let mut eng = build_engine(&run)?;
            debug!(params = %eng.params(), "engine ready");

            let (mut sink, destination): (Box<dyn FrameSink>, PathBuf) = match png_dir {
                Some(dir) => (
                    Box::new(PngSequenceSink::create(&dir, run.width, run.height)?),
                    dir,
                ),
                None => (
                    Box::new(FfmpegSink::spawn(VideoConfig::mp4(
                        &output, run.width, run.height, run.fps,
                    ))?),
                    output,
                ),
            };

            drive(&mut eng, sink.as_mut(), run.frames, progress_every)?;
            sink.finish()?;

            if let Some(path) = &seed_path {
                save_seed(&run, path)?;
            }

            if cli.json {
                let info = serde_json::json!({
                    "engine": run.engine,
                    "width": run.width,
                    "height": run.height,
                    "frames": run.frames,
                    "fps": run.fps,
                    "duration_secs": run.duration_secs(),
                    "seed": run.seed,
                    "params": eng.params(),
                    "output": destination.display().to_string(),
                    "run_record": seed_path.map(|p| p.display().to_string()),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} ({}x{}, {} frames at {} fps = {:.2}s, seed {}) -> {}",
                    run.engine,
                    run.width,
                    run.height,
                    run.frames,
                    run.fps,
                    run.duration_secs(),
                    run.seed,
                    destination.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;
    init_tracing(cli.verbose, json_mode);
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
