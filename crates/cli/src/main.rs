#![deny(unsafe_code)]
//! CLI binary for the noise-flow particle simulator.
//!
//! Subcommands:
//! - `run <engine>`: tick an engine N times, optionally feeding audio frames, write a PNG
//! - `list`: print available engines
//! - `schema <engine>`: print an engine's parameter schema

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use noise_flow_audio::AudioFrame;
use noise_flow_core::seed::DEFAULT_DT;
use noise_flow_core::{Engine, Seed};
use noise_flow_engines::EngineKind;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "noise-flow", about = "3D noise flow-field particle simulator")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an engine for N ticks and write a PNG snapshot.
    Run {
        /// Engine name (e.g. "noise-flow"). Optional with --seed-file.
        #[arg(required_unless_present = "seed_file")]
        engine: Option<String>,

        /// Number of simulation ticks.
        #[arg(short, long, default_value_t = 600)]
        ticks: usize,

        /// Fixed time step in seconds.
        #[arg(long, default_value_t = DEFAULT_DT)]
        dt: f32,

        /// PRNG seed for deterministic spawning.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Engine parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Output image path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        /// Image width in pixels.
        #[arg(short = 'W', long, default_value_t = 512)]
        width: usize,

        /// Image height in pixels.
        #[arg(short = 'H', long, default_value_t = 512)]
        height: usize,

        /// JSON array of audio frames, cycled one per tick.
        #[arg(long)]
        audio: Option<PathBuf>,

        /// Replay a run description; overrides engine, params, seed, ticks and dt.
        #[arg(long)]
        seed_file: Option<PathBuf>,

        /// Write the effective run description to this path.
        #[arg(long)]
        save_seed: Option<PathBuf>,
    },
    /// List available engines.
    List,
    /// Print the parameter schema of an engine.
    Schema {
        /// Engine name.
        engine: String,
    },
}

/// Where audio frames come from during a run.
enum AudioSource {
    Frames(Vec<AudioFrame>),
    Synthetic { dt: f32 },
}

impl AudioSource {
    fn frame(&self, tick: usize) -> AudioFrame {
        match self {
            AudioSource::Frames(frames) => frames[tick % frames.len()],
            AudioSource::Synthetic { dt } => AudioFrame::synthetic(tick as f32 * dt),
        }
    }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))
}

fn load_audio(path: Option<&Path>, dt: f32) -> Result<AudioSource, CliError> {
    let Some(path) = path else {
        return Ok(AudioSource::Synthetic { dt });
    };
    let frames = AudioFrame::sequence_from_json(&read_file(path)?)
        .map_err(|e| CliError::Input(format!("invalid audio frames in {}: {e}", path.display())))?;
    if frames.is_empty() {
        return Err(CliError::Input(format!(
            "{} holds no audio frames",
            path.display()
        )));
    }
    log::info!("loaded {} audio frames from {}", frames.len(), path.display());
    Ok(AudioSource::Frames(frames))
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let engines = EngineKind::list_engines();
            if cli.json {
                print_json(&serde_json::json!({ "engines": engines }))?;
            } else {
                println!("Engines:");
                for name in engines {
                    println!("  {name}");
                }
            }
        }
        Command::Schema { engine } => {
            let eng = EngineKind::from_name(&engine, 0, &serde_json::json!({"particle_count": 0}))?;
            print_json(&eng.param_schema())?;
        }
        Command::Run {
            engine,
            ticks,
            dt,
            seed,
            params,
            output,
            width,
            height,
            audio,
            seed_file,
            save_seed,
        } => {
            let run_seed = match seed_file {
                Some(path) => serde_json::from_str::<Seed>(&read_file(&path)?).map_err(|e| {
                    CliError::Input(format!("invalid seed file {}: {e}", path.display()))
                })?,
                None => {
                    let params: serde_json::Value = serde_json::from_str(&params)
                        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
                    Seed {
                        engine: engine.unwrap_or_default(),
                        params,
                        seed,
                        ticks,
                        dt,
                    }
                }
            };

            let mut eng = EngineKind::from_seed(&run_seed)?;
            let source = load_audio(audio.as_deref(), run_seed.dt)?;

            for tick in 0..run_seed.ticks {
                eng.set_audio_frame(source.frame(tick));
                eng.tick(run_seed.dt)?;
            }

            noise_flow_engines::snapshot::write_png(&eng, width, height, &output)?;

            if let Some(path) = &save_seed {
                let text = serde_json::to_string_pretty(&run_seed)?;
                std::fs::write(path, text)
                    .map_err(|e| CliError::Io(format!("cannot write {}: {e}", path.display())))?;
            }

            let field = eng.flow_field();
            if cli.json {
                let info = serde_json::json!({
                    "engine": run_seed.engine,
                    "seed": run_seed.seed,
                    "ticks": run_seed.ticks,
                    "dt": run_seed.dt,
                    "particles": eng.particles().len(),
                    "spawn": serde_json::to_value(field.spawn_report())?,
                    "diagnostics": serde_json::to_value(field.diagnostics())?,
                    "output": output.display().to_string(),
                });
                print_json(&info)?;
            } else {
                eprintln!(
                    "ran {} ({} particles, {} ticks, seed {}) -> {}",
                    run_seed.engine,
                    eng.particles().len(),
                    run_seed.ticks,
                    run_seed.seed,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let json_mode = cli.json;
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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_requires_engine_or_seed_file() {
        assert!(Cli::try_parse_from(["noise-flow", "run"]).is_err());
        assert!(Cli::try_parse_from(["noise-flow", "run", "--seed-file", "s.json"]).is_ok());
        assert!(Cli::try_parse_from(["noise-flow", "run", "audio-flow", "--ticks", "5"]).is_ok());
    }

    #[test]
    fn audio_frames_cycle() {
        let a = AudioFrame {
            amplitude: 0.1,
            ..Default::default()
        };
        let b = AudioFrame {
            amplitude: 0.9,
            ..Default::default()
        };
        let source = AudioSource::Frames(vec![a, b]);
        assert_eq!(source.frame(0), a);
        assert_eq!(source.frame(3), b);
        assert_eq!(source.frame(4), a);
    }

    #[test]
    fn synthetic_source_follows_time() {
        let source = AudioSource::Synthetic { dt: 0.5 };
        assert_eq!(source.frame(4), AudioFrame::synthetic(2.0));
    }

    fn exit_code_of(args: &[&str]) -> i32 {
        let cli = Cli::try_parse_from(args).unwrap();
        run(cli).err().map_or(0, |e| e.exit_code())
    }

    #[test]
    fn rejected_params_exit_with_input_code() {
        let out = std::env::temp_dir().join("noise-flow-rejected.png");
        let out = out.to_str().unwrap();
        let args = ["noise-flow", "run", "noise-flow", "--params", r#"{"cell_size": 0}"#, "-o", out];
        assert_eq!(exit_code_of(&args), 12);
        let args = ["noise-flow", "run", "noise-flow", "--ticks", "1", "--dt=-1", "-o", out];
        assert_eq!(exit_code_of(&args), 12);
    }

    #[test]
    fn unknown_engine_exits_with_engine_code() {
        let out = std::env::temp_dir().join("noise-flow-unknown.png");
        let args = ["noise-flow", "run", "vortex", "-o", out.to_str().unwrap()];
        assert_eq!(exit_code_of(&args), 10);
    }

    #[test]
    fn missing_audio_file_is_io_error() {
        let result = load_audio(Some(Path::new("/nonexistent/frames.json")), 0.1);
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
