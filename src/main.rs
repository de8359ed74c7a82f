//! tree-shift CLI
//!
//! Entry point for the `tree-shift` command-line tool.

use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;
use tree_shift::{EffectiveConfig, PatchRequest};

#[derive(Parser)]
#[command(name = "tree-shift")]
#[command(about = "Shift every placement of one template across a load order", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Settings that can be given on the command line; each overrides the
/// settings file.
#[derive(clap::Args, Debug, Default)]
struct SettingsArgs {
    /// Settings file (TOML, or JSON when the name ends in .json)
    #[arg(long, short = 's')]
    settings: Option<PathBuf>,

    /// Target template form key, e.g. 0A1B2C:Skyrim.esm
    #[arg(long, short = 't')]
    target: Option<String>,

    /// Plugin name for the patch layer
    #[arg(long)]
    patch_name: Option<String>,

    /// Enable the X edit with this delta
    #[arg(long, allow_negative_numbers = true)]
    x: Option<f64>,

    /// Enable the Y edit with this delta
    #[arg(long, allow_negative_numbers = true)]
    y: Option<f64>,

    /// Enable the Z edit with this delta
    #[arg(long, allow_negative_numbers = true)]
    z: Option<f64>,
}

impl SettingsArgs {
    /// CLI layer for the settings merge, or None if no flag was given.
    fn overrides(&self) -> Option<Value> {
        let mut map = Map::new();
        if let Some(target) = &self.target {
            map.insert("target".to_string(), json!(target));
        }
        if let Some(name) = &self.patch_name {
            map.insert("patch_name".to_string(), json!(name));
        }
        for (axis, delta) in [("x", self.x), ("y", self.y), ("z", self.z)] {
            if let Some(delta) = delta {
                map.insert(axis.to_string(), json!({"enabled": true, "delta": delta}));
            }
        }
        if map.is_empty() {
            None
        } else {
            Some(Value::Object(map))
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the patch over a load order
    Patch {
        /// Layer files in load order, lowest priority first
        #[arg(long = "layer", short = 'l', required = true)]
        layers: Vec<PathBuf>,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Where to write the patch layer
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Where to write run_summary.json
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Where to write effective_config.json
        #[arg(long)]
        effective_config: Option<PathBuf>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective settings with provenance
    Config {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Patch {
            layers,
            settings,
            output,
            summary,
            effective_config,
            json,
        } => {
            let request = PatchRequest {
                layers,
                overrides: settings.overrides(),
                settings: settings.settings,
                output,
                summary,
                effective_config,
            };
            run_patch(&request, json);
        }
        Commands::Config { settings } => {
            run_config(&settings);
        }
    }
}

fn run_patch(request: &PatchRequest, json_output: bool) {
    let run = match tree_shift::run(request) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    };

    if json_output {
        match run.summary.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", run.summary.human_summary);
        println!("  Patch: {} ({} overrides)", run.summary.patch_name, run.summary.override_count);
        println!("  Run: {}", run.summary.run_id);
    }
}

fn run_config(args: &SettingsArgs) {
    let config = match EffectiveConfig::build(args.settings.as_deref(), args.overrides()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    match config.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_from_flags() {
        let cli = Cli::parse_from([
            "tree-shift",
            "patch",
            "-l",
            "Skyrim.json",
            "--target",
            "0A1B2C:Skyrim.esm",
            "--x",
            "-3.5",
            "--z",
            "10",
        ]);
        let Commands::Patch { layers, settings, .. } = cli.command else {
            panic!("expected patch command");
        };

        assert_eq!(layers, vec![PathBuf::from("Skyrim.json")]);
        let overrides = settings.overrides().unwrap();
        assert_eq!(overrides["target"], "0A1B2C:Skyrim.esm");
        assert_eq!(overrides["x"]["enabled"], true);
        assert_eq!(overrides["x"]["delta"], -3.5);
        assert_eq!(overrides["z"]["delta"], 10.0);
        assert!(overrides.get("y").is_none());
    }

    #[test]
    fn test_tiny_flag_delta_kept_for_validation() {
        let cli = Cli::parse_from(["tree-shift", "config", "-t", "0A1B2C:Skyrim.esm", "--y", "1e-50"]);
        let Commands::Config { settings } = cli.command else {
            panic!("expected config command");
        };

        let overrides = settings.overrides().unwrap();
        assert_eq!(overrides["y"]["delta"], 1e-50);
        assert!(EffectiveConfig::build(None, Some(overrides)).is_err());
    }

    #[test]
    fn test_no_flags_no_overrides() {
        assert!(SettingsArgs::default().overrides().is_none());
    }
}
