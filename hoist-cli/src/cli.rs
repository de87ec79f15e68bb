//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// hoist -- convenience commands for a Docker engine.
///
/// Use `hoist <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "hoist", version, about, long_about = None)]
pub struct Cli {
    /// Path to the hoist.toml configuration file.
    #[arg(short, long, default_value = "hoist.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pull an image and show what was pulled.
    Pull(PullArgs),

    /// Inspect a local image.
    Image(ImageArgs),

    /// List containers, optionally filtered by label, image or network.
    Ps(PsArgs),

    /// Find one container by ID or name.
    Find(FindArgs),

    /// Create and start a container, printing its ID.
    Run(RunArgs),

    /// Run a disposable container to completion and print its output.
    RunTemp(RunArgs),

    /// Run a command inside a running container.
    Exec(ExecArgs),

    /// Manage networks.
    Network(NetworkArgs),

    /// Manage volumes.
    Volume(VolumeArgs),

    /// Decode a captured multiplexed output stream from a file.
    Decode(DecodeArgs),

    /// Show the container this process runs in, if any.
    Whoami,

    /// Manage configuration.
    Config(ConfigArgs),
}

/// Parses a `key=value` label argument.
pub fn parse_label(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(format!("expected key=value, got '{s}'")),
    }
}

// ---- pull / image ----

#[derive(Args, Debug)]
pub struct PullArgs {
    /// Image name, optionally with a tag (e.g. `alpine:3.20`).
    pub name: String,

    /// Tag to pull when the name carries none (default: latest).
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Registry username.
    #[arg(long)]
    pub username: Option<String>,

    /// Registry password.
    #[arg(long)]
    pub password: Option<String>,

    /// Registry server address.
    #[arg(long)]
    pub server: Option<String>,
}

#[derive(Args, Debug)]
pub struct ImageArgs {
    pub name: String,

    #[arg(short, long)]
    pub tag: Option<String>,
}

// ---- ps / find ----

#[derive(Args, Debug)]
pub struct PsArgs {
    /// Only containers carrying this label (`key=value`).
    #[arg(long, value_parser = parse_label, conflicts_with_all = ["image", "network"])]
    pub label: Option<(String, String)>,

    /// Only containers created from exactly this image.
    #[arg(long, conflicts_with = "network")]
    pub image: Option<String>,

    /// Only containers attached to one of these networks (repeatable).
    #[arg(long)]
    pub network: Vec<String>,
}

#[derive(Args, Debug)]
pub struct FindArgs {
    /// Container ID or name (with or without the leading `/`).
    pub key: String,
}

// ---- run / run-temp / exec ----

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Image to run.
    pub image: String,

    /// Container name.
    #[arg(long)]
    pub name: Option<String>,

    /// JSON file with engine-shaped creation parameters.
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Label to set on the container (`key=value`, repeatable).
    #[arg(long = "label", value_parser = parse_label)]
    pub labels: Vec<(String, String)>,

    /// Command and arguments.
    #[arg(last = true)]
    pub cmd: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Container ID or name.
    pub container: String,

    /// Run as this user.
    #[arg(short, long)]
    pub user: Option<String>,

    /// Working directory inside the container.
    #[arg(short, long)]
    pub workdir: Option<String>,

    /// Command and arguments.
    #[arg(last = true, required = true)]
    pub cmd: Vec<String>,
}

// ---- network ----

#[derive(Args, Debug)]
pub struct NetworkArgs {
    #[command(subcommand)]
    pub action: NetworkAction,
}

#[derive(Subcommand, Debug)]
pub enum NetworkAction {
    /// List networks.
    Ls {
        #[arg(long, value_parser = parse_label)]
        label: Option<(String, String)>,
    },
    /// Find a network by ID or name.
    Find { key: String },
    /// Create a network.
    Create {
        name: String,
        #[arg(long)]
        driver: Option<String>,
        #[arg(long = "label", value_parser = parse_label)]
        labels: Vec<(String, String)>,
        /// JSON file with engine-shaped creation parameters.
        #[arg(long)]
        params: Option<PathBuf>,
    },
}

// ---- volume ----

#[derive(Args, Debug)]
pub struct VolumeArgs {
    #[command(subcommand)]
    pub action: VolumeAction,
}

#[derive(Subcommand, Debug)]
pub enum VolumeAction {
    /// List volumes.
    Ls {
        #[arg(long, value_parser = parse_label)]
        label: Option<(String, String)>,
    },
    /// Find a volume by name.
    Find { name: String },
    /// Create a volume. Without a name the engine generates one.
    Create {
        name: Option<String>,
        #[arg(long)]
        driver: Option<String>,
        #[arg(long = "label", value_parser = parse_label)]
        labels: Vec<(String, String)>,
    },
}

// ---- decode ----

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File holding raw multiplexed stream bytes.
    pub file: PathBuf,

    /// Only print this stream (stdout, stderr).
    #[arg(long)]
    pub stream: Option<StreamFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StreamFilter {
    Stdout,
    Stderr,
}

// ---- config ----

/// Manage hoist configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, docker).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["hoist", "whoami"]).expect("parse succeeded");
        assert_eq!(cli.config, PathBuf::from("hoist.toml"));
        assert_eq!(cli.output, OutputFormat::Text);
        assert!(cli.log_level.is_none());
        assert!(matches!(cli.command, Commands::Whoami));
    }

    #[test]
    fn test_cli_parse_pull_with_tag() {
        let cli = Cli::try_parse_from(["hoist", "pull", "alpine", "--tag", "3.20"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Pull(args) => {
                assert_eq!(args.name, "alpine");
                assert_eq!(args.tag.as_deref(), Some("3.20"));
            }
            _ => panic!("expected Pull command"),
        }
    }

    #[test]
    fn test_cli_parse_ps_label() {
        let cli = Cli::try_parse_from(["hoist", "ps", "--label", "tier=front"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Ps(args) => {
                assert_eq!(args.label, Some(("tier".to_owned(), "front".to_owned())));
                assert!(args.network.is_empty());
            }
            _ => panic!("expected Ps command"),
        }
    }

    #[test]
    fn test_cli_parse_ps_multiple_networks() {
        let cli = Cli::try_parse_from(["hoist", "ps", "--network", "a", "--network", "b"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Ps(args) => assert_eq!(args.network, vec!["a", "b"]),
            _ => panic!("expected Ps command"),
        }
    }

    #[test]
    fn test_cli_ps_label_conflicts_with_image() {
        let result = Cli::try_parse_from(["hoist", "ps", "--label", "a=b", "--image", "x"]);
        assert!(result.is_err(), "label and image filters are exclusive");
    }

    #[test]
    fn test_cli_parse_run_temp_with_command() {
        let cli = Cli::try_parse_from([
            "hoist", "run-temp", "busybox", "--name", "probe", "--", "echo", "hi",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::RunTemp(args) => {
                assert_eq!(args.image, "busybox");
                assert_eq!(args.name.as_deref(), Some("probe"));
                assert_eq!(args.cmd, vec!["echo", "hi"]);
            }
            _ => panic!("expected RunTemp command"),
        }
    }

    #[test]
    fn test_cli_exec_requires_command() {
        assert!(Cli::try_parse_from(["hoist", "exec", "web"]).is_err());
        let cli = Cli::try_parse_from(["hoist", "exec", "web", "--", "ls", "-la"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Exec(args) => assert_eq!(args.cmd, vec!["ls", "-la"]),
            _ => panic!("expected Exec command"),
        }
    }

    #[test]
    fn test_cli_parse_network_create() {
        let cli = Cli::try_parse_from([
            "hoist", "network", "create", "backend", "--driver", "overlay", "--label", "env=prod",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::Network(NetworkArgs {
                action:
                    NetworkAction::Create {
                        name,
                        driver,
                        labels,
                        params,
                    },
            }) => {
                assert_eq!(name, "backend");
                assert_eq!(driver.as_deref(), Some("overlay"));
                assert_eq!(labels.len(), 1);
                assert!(params.is_none());
            }
            _ => panic!("expected network create"),
        }
    }

    #[test]
    fn test_cli_parse_volume_create_without_name() {
        let cli = Cli::try_parse_from(["hoist", "volume", "create"]).expect("parse succeeded");
        match cli.command {
            Commands::Volume(VolumeArgs {
                action: VolumeAction::Create { name, .. },
            }) => assert!(name.is_none()),
            _ => panic!("expected volume create"),
        }
    }

    #[test]
    fn test_cli_parse_decode_stream_filter() {
        let cli = Cli::try_parse_from(["hoist", "decode", "out.bin", "--stream", "stderr"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Decode(args) => {
                assert_eq!(args.file, PathBuf::from("out.bin"));
                assert_eq!(args.stream, Some(StreamFilter::Stderr));
            }
            _ => panic!("expected Decode command"),
        }
    }

    #[test]
    fn test_cli_global_output_json() {
        let cli = Cli::try_parse_from(["hoist", "config", "show", "--output", "json"])
            .expect("parse succeeded");
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(
            parse_label("a=b=c"),
            Ok(("a".to_owned(), "b=c".to_owned()))
        );
        assert_eq!(parse_label("empty="), Ok(("empty".to_owned(), String::new())));
        assert!(parse_label("novalue").is_err());
        assert!(parse_label("=x").is_err());
    }
}
