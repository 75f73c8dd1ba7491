// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Binary entry point for the recast CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Preview a manifest's rewrites (JSON report on stdout)
//! recast apply --config migrate.json src/Foo.java src/Bar.java
//!
//! # Apply them in place, with extra known types
//! recast apply --config migrate.json --types types.json --write src/*.java
//!
//! # Show the configured units
//! recast list --config migrate.json
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use recast::cli::{run_apply, run_list, ApplyOptions};
use recast::error::{OutputErrorCode, RecastError};
use recast::output::{emit_response, ErrorResponse};

/// Structural source rewrites driven by a JSON manifest.
///
/// All output is JSON on stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "recast", version, about = "Structural source rewrites")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output (`RUST_LOG` overrides).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Log line format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the manifest's units over source files.
    Apply {
        /// JSON manifest listing the units to run, in order.
        #[arg(long)]
        config: PathBuf,
        /// JSON list of known fully-qualified type names.
        #[arg(long)]
        types: Option<PathBuf>,
        /// Write changed files in place.
        #[arg(long)]
        write: bool,
        /// Source files to rewrite.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show the units a manifest builds.
    List {
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_format);

    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init(),
    }
}

fn execute(cli: Cli) -> Result<ExitCode, RecastError> {
    match cli.command {
        Command::Apply {
            config,
            types,
            write,
            files,
        } => {
            let response = run_apply(&ApplyOptions {
                config,
                types,
                write,
                files,
            })?;
            emit(&response)?;
            Ok(match response.error_code() {
                Some(code) => ExitCode::from(code),
                None => ExitCode::SUCCESS,
            })
        }
        Command::List { config } => {
            emit(&run_list(&config)?)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn emit<T: Serialize>(response: &T) -> Result<(), RecastError> {
    let mut stdout = io::stdout();
    emit_response(response, &mut stdout)
        .and_then(|()| stdout.flush())
        .map_err(|e| RecastError::internal(format!("failed to write output: {}", e)))
}
