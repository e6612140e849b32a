#![deny(unsafe_code)]
//! CLI binary for the procgen toolkit.
//!
//! Subcommands:
//! - `generate <generator>`: run one generator, print or write a JSON record
//! - `replay <seed.json>`: regenerate an artifact from a saved seed
//! - `list`: print available generators
//! - `entropy <text>` / `hash <text>`: text utilities

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use procgen_core::{hash_str, text_entropy, Generator, RandomStream, Seed};
use procgen_engines::{write_json, GeneratorKind, Record};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "procgen", about = "Deterministic procedural generation toolkit")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log generator activity to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a generator and emit a JSON record of its seed and artifact.
    Generate {
        /// Generator name (see `procgen list`).
        generator: String,

        /// Grid width in cells.
        #[arg(short = 'W', long, default_value_t = 64)]
        width: usize,

        /// Grid height in cells.
        #[arg(short = 'H', long, default_value_t = 64)]
        height: usize,

        /// Frames, generations, or rewrite iterations; 0 keeps the generator default.
        #[arg(short, long, default_value_t = 0)]
        steps: usize,

        /// Stream seed. Omit to seed from the clock; the chosen seed is logged.
        #[arg(long)]
        seed: Option<u32>,

        /// Generator parameters as a JSON object.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Write the record here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Regenerate the artifact described by a seed file.
    Replay {
        /// Path to a JSON seed (or a full record with a "seed" field).
        path: PathBuf,

        /// Write the record here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List available generators.
    List,
    /// Shannon entropy of a string, in bits per character.
    Entropy { text: String },
    /// FNV-1a hash of a string as hex.
    Hash { text: String },
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads a seed from `path`, accepting either a bare seed or an exported
/// record containing one.
fn read_seed(path: &Path) -> Result<Seed, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::SeedRead {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_error = |source: serde_json::Error| CliError::SeedParse {
        path: path.to_path_buf(),
        source,
    };
    let value: Value = serde_json::from_str(&text).map_err(parse_error)?;
    let seed_value = match value.get("seed") {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => value,
    };
    serde_json::from_value(seed_value).map_err(parse_error)
}

/// Generates `seed` and either prints the record or writes it to `output`.
fn emit(seed: Seed, output: Option<PathBuf>, json_mode: bool) -> Result<(), CliError> {
    let record = Record::generate(seed)?;
    match output {
        None => println!("{}", serde_json::to_string_pretty(&record)?),
        Some(path) => {
            write_json(&record, &path)?;
            let seed = &record.seed;
            if json_mode {
                let info = json!({
                    "generator": seed.generator,
                    "width": seed.width,
                    "height": seed.height,
                    "steps": seed.steps,
                    "seed": seed.seed,
                    "output": path.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "generated {} ({}x{}, seed {}) -> {}",
                    seed.generator,
                    seed.width,
                    seed.height,
                    seed.seed,
                    path.display()
                );
            }
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Generate {
            generator,
            width,
            height,
            steps,
            seed,
            params,
            output,
        } => {
            let params: Value = serde_json::from_str(&params).map_err(CliError::Params)?;
            let seed = match seed {
                Some(seed) => seed,
                None => {
                    let seed = RandomStream::from_clock().state();
                    tracing::info!(seed, "no --seed given, seeded from clock");
                    seed
                }
            };
            let seed = Seed::new(&generator, width, height, seed)
                .with_params(params)
                .with_steps(steps);
            emit(seed, output, cli.json)?;
        }
        Command::Replay { path, output } => {
            let seed = read_seed(&path)?;
            tracing::info!(generator = %seed.generator, seed = seed.seed, "replaying");
            emit(seed, output, cli.json)?;
        }
        Command::List => {
            let names = GeneratorKind::list_generators();
            if cli.json {
                let generators = names
                    .iter()
                    .map(|name| -> Result<Value, CliError> {
                        let generator = GeneratorKind::from_name(name, 1, 1, 0, &json!({}))?;
                        Ok(json!({"name": name, "params": generator.param_schema()}))
                    })
                    .collect::<Result<Vec<Value>, CliError>>()?;
                println!("{}", serde_json::to_string_pretty(&json!({ "generators": generators }))?);
            } else {
                println!("Generators:");
                for name in names {
                    println!("  {name}");
                }
            }
        }
        Command::Entropy { text } => {
            let entropy = text_entropy(&text);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&json!({ "entropy": entropy }))?);
            } else {
                println!("{entropy}");
            }
        }
        Command::Hash { text } => {
            let hash = hash_str(&text);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&json!({ "hash": hash }))?);
            } else {
                println!("{hash}");
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
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

    // -- Argument parsing --

    #[test]
    fn generate_parses_dimensions_and_seed() {
        let cli = Cli::try_parse_from([
            "procgen", "generate", "noise", "-W", "32", "-H", "16", "--seed", "7",
        ])
        .unwrap();
        match cli.command {
            Command::Generate {
                generator,
                width,
                height,
                seed,
                steps,
                ..
            } => {
                assert_eq!(generator, "noise");
                assert_eq!((width, height), (32, 16));
                assert_eq!(seed, Some(7));
                assert_eq!(steps, 0);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["procgen", "list", "--json", "-v"]).unwrap();
        assert!(cli.json);
        assert!(cli.verbose);
    }

    // -- Seed files --

    #[test]
    fn read_seed_accepts_bare_seed_and_record() {
        let dir = tempfile::tempdir().unwrap();
        let seed = Seed::new("palette", 1, 1, 99).with_steps(2);

        let bare = dir.path().join("seed.json");
        std::fs::write(&bare, serde_json::to_string(&seed).unwrap()).unwrap();
        assert_eq!(read_seed(&bare).unwrap(), seed);

        let record = Record::generate(seed.clone()).unwrap();
        let full = dir.path().join("record.json");
        write_json(&record, &full).unwrap();
        assert_eq!(read_seed(&full).unwrap(), seed);
    }

    #[test]
    fn read_seed_errors_map_to_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = read_seed(&missing).unwrap_err();
        assert!(matches!(err, CliError::SeedRead { ref path, .. } if path == &missing));
        assert_eq!(err.exit_code(), 11);

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "{not json").unwrap();
        let err = read_seed(&garbage).unwrap_err();
        assert!(matches!(err, CliError::SeedParse { .. }));
        assert_eq!(err.exit_code(), 12);

        let wrong_shape = dir.path().join("wrong.json");
        std::fs::write(&wrong_shape, r#"{"generator": 3}"#).unwrap();
        assert!(matches!(
            read_seed(&wrong_shape).unwrap_err(),
            CliError::SeedParse { .. }
        ));
    }

    #[test]
    fn emit_writes_record_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        emit(Seed::new("noise", 4, 4, 1), Some(path.clone()), true).unwrap();
        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["artifact"]["kind"], "scalar");
    }

    #[test]
    fn export_into_missing_directory_is_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.json");
        let err = emit(Seed::new("palette", 1, 1, 1), Some(path), false).unwrap_err();
        assert!(matches!(err, CliError::Export(_)));
        assert_eq!(err.exit_code(), 11);
    }

    #[test]
    fn unknown_generator_is_generator_error() {
        let err = emit(Seed::new("mandelbrot", 4, 4, 1), None, false).unwrap_err();
        assert_eq!(err.exit_code(), 10);
    }
}
