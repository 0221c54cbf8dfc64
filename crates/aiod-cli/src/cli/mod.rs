//! CLI for the AIOD episode downloader.

mod commands;
mod progress;
mod prompt;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::Term;
use aiod_core::agent::check_prerequisites;
use aiod_core::config::{self, AiodConfig};
use std::path::PathBuf;
use std::process::ExitCode;

use commands::{run_check, run_config, run_fetch, run_interactive, FetchArgs};
use prompt::{colour_for, Status};

/// Exit status when a required external agent is missing.
const EXIT_MISSING_AGENT: u8 = 2;

/// Top-level CLI. Without a subcommand, starts the interactive loop.
#[derive(Debug, Parser)]
#[command(name = "aiod")]
#[command(about = "AIOD: paste a cURL, get an MP3 (with cover art)", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download one episode without prompts.
    Fetch {
        /// File holding the pasted cURL command (default: read stdin).
        #[arg(long, value_name = "FILE", conflicts_with = "har")]
        request: Option<PathBuf>,

        /// HAR export to take the request from instead of a cURL paste.
        #[arg(long, value_name = "FILE")]
        har: Option<PathBuf>,

        /// Download directory (default: config `download_dir`, else the current directory).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Image to embed as front cover.
        #[arg(long, value_name = "URL")]
        cover_url: Option<String>,

        /// Keep the MP3 without cover art next to the `_cover.mp3`.
        #[arg(long)]
        keep_original: bool,

        /// Carry the HAR's Cookie header into the download.
        #[arg(long, requires = "har")]
        allow_cookies: bool,
    },

    /// Report whether curl, ffmpeg and ffprobe can be found.
    Check,

    /// Show the config file path and effective settings.
    Config,
}

/// Prints every missing agent; false if any is missing.
fn prerequisites_ok(cfg: &AiodConfig) -> bool {
    let missing = check_prerequisites(&cfg.tools);
    let tag = Status::Error.tag(colour_for(&Term::stderr()));
    for tool in &missing {
        tracing::error!(program = %tool.program.display(), kind = %tool.kind, "agent missing");
        eprintln!("{tag} {tool}");
    }
    missing.is_empty()
}

impl CliCommand {
    pub fn run_from_args() -> Result<ExitCode> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            None => {
                if !prerequisites_ok(&cfg) {
                    return Ok(ExitCode::from(EXIT_MISSING_AGENT));
                }
                run_interactive(&cfg)?;
            }
            Some(CliCommand::Fetch {
                request,
                har,
                dir,
                cover_url,
                keep_original,
                allow_cookies,
            }) => {
                if !prerequisites_ok(&cfg) {
                    return Ok(ExitCode::from(EXIT_MISSING_AGENT));
                }
                let args = FetchArgs {
                    request,
                    har,
                    dir,
                    cover_url,
                    keep_original,
                    allow_cookies,
                };
                run_fetch(&cfg, &args)?;
            }
            Some(CliCommand::Check) => {
                if !run_check(&cfg) {
                    return Ok(ExitCode::from(EXIT_MISSING_AGENT));
                }
            }
            Some(CliCommand::Config) => run_config(&cfg)?,
        }

        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(test)]
mod tests;
