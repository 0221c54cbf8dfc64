//! `aiod fetch` – one download without prompts.

use anyhow::{anyhow, bail, Context, Result};
use aiod_core::config::AiodConfig;
use aiod_core::har;
use aiod_core::request::{self, RequestDescriptor};
use aiod_core::{CoverRequest, Pipeline};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::cli::progress::BarSink;
use crate::cli::prompt::{colour_for, Status};
use console::Term;

#[derive(Debug, Clone, Default)]
pub struct FetchArgs {
    pub request: Option<PathBuf>,
    pub har: Option<PathBuf>,
    pub dir: Option<PathBuf>,
    pub cover_url: Option<String>,
    pub keep_original: bool,
    pub allow_cookies: bool,
}

/// The request to run: HAR export, request file, or stdin.
fn load_request(args: &FetchArgs) -> Result<RequestDescriptor> {
    if let Some(path) = &args.har {
        return har::resolve_har(path, args.allow_cookies);
    }
    let raw = match &args.request {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("read request file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read request from stdin")?;
            buf
        }
    };
    parse_request(&raw)
}

fn parse_request(raw: &str) -> Result<RequestDescriptor> {
    request::parse(raw).map_err(|e| anyhow!("{e}. {}", e.hint()))
}

/// Directory precedence: `--dir`, config `download_dir`, current directory.
fn download_dir(args: &FetchArgs, cfg: &AiodConfig, cwd: &Path) -> PathBuf {
    args.dir
        .clone()
        .or_else(|| cfg.download_dir.clone())
        .unwrap_or_else(|| cwd.to_path_buf())
}

fn cover_request(args: &FetchArgs, cfg: &AiodConfig) -> Option<CoverRequest> {
    args.cover_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(|url| CoverRequest {
            image_url: url.to_string(),
            keep_original: args.keep_original || cfg.keep_original,
        })
}

pub fn run_fetch(cfg: &AiodConfig, args: &FetchArgs) -> Result<()> {
    let request = load_request(args)?;
    let cwd = std::env::current_dir()?;
    let dir = download_dir(args, cfg, &cwd);
    let cover = cover_request(args, cfg);

    let pipeline = Pipeline::from_config(cfg);
    let mut sink = BarSink::new();
    let report = match pipeline.run(&request, &dir, cover.as_ref(), &mut sink) {
        Ok(report) => report,
        Err(e) => bail!("{e}. {}", e.hint()),
    };

    let ok = Status::Success.tag(colour_for(&Term::stdout()));
    println!("{ok} MP3 ready: {}", report.audio_path.display());
    if let Some(path) = &report.cover_path {
        println!("{ok} Cover embedded: {}", path.display());
    }
    if let Some(err) = &report.cover_error {
        let tag = Status::Error.tag(colour_for(&Term::stderr()));
        eprintln!("{tag} Embedding cover failed: {err}");
    }
    Ok(())
}
