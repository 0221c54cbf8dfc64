//! `aiod` with no subcommand – the paste/download loop.

use anyhow::{Context, Result};
use aiod_core::config::AiodConfig;
use aiod_core::request::{self, Paste};
use aiod_core::{CoverRequest, Pipeline};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::cli::progress::BarSink;
use crate::cli::prompt::{colour_for, expand_path, Prompter, Reply};
use console::Term;

/// Answers collected once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Session {
    dir: PathBuf,
    embed_cover: bool,
    keep_original: bool,
}

pub fn run_interactive(cfg: &AiodConfig) -> Result<()> {
    let stdin = io::stdin();
    let colour = colour_for(&Term::stdout());
    let mut prompter = Prompter::new(stdin.lock(), io::stdout()).with_colour(colour);
    let pipeline = Pipeline::from_config(cfg);
    run_session(&mut prompter, cfg, &pipeline)
}

fn run_session<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    cfg: &AiodConfig,
    pipeline: &Pipeline,
) -> Result<()> {
    p.banner()?;
    let session = match setup(p, cfg)? {
        Reply::Value(session) => session,
        Reply::Quit => {
            p.info("Exiting.")?;
            return Ok(());
        }
    };
    tracing::info!(?session, "interactive session started");
    p.info("You can hit 'q' at any prompt to quit.")?;

    loop {
        if run_once(p, &session, pipeline)? == Reply::Quit {
            p.info("Exiting.")?;
            return Ok(());
        }
        match p.line("Press Enter to download another episode or 'q'+Enter to quit: ")? {
            Reply::Value(_) => continue,
            Reply::Quit => {
                p.success("All done! Thanks for using AIOD.")?;
                return Ok(());
            }
        }
    }
}

/// Download dir, embed and keep-original answers; config values pre-answer
/// the matching prompts.
fn setup<R: BufRead, W: Write>(p: &mut Prompter<R, W>, cfg: &AiodConfig) -> Result<Reply<Session>> {
    let dir = match &cfg.download_dir {
        Some(dir) => dir.clone(),
        None => match p.line("Download dir (e.g. ~/Downloads): ")? {
            Reply::Value(raw) => expand_path(&raw),
            Reply::Quit => return Ok(Reply::Quit),
        },
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("create download directory {}", dir.display()))?;

    let (embed_cover, keep_original) = match cfg.embed_cover {
        Some(embed) => (embed, cfg.keep_original),
        None => {
            let embed = match p.yes_no("Embed cover art? (y/n): ")? {
                Reply::Value(v) => v,
                Reply::Quit => return Ok(Reply::Quit),
            };
            let keep = if embed {
                match p.yes_no("Keep original MP3 after embedding cover? (y/n): ")? {
                    Reply::Value(v) => v,
                    Reply::Quit => return Ok(Reply::Quit),
                }
            } else {
                false
            };
            (embed, keep)
        }
    };

    Ok(Reply::Value(Session {
        dir,
        embed_cover,
        keep_original,
    }))
}

/// One paste → MP3 (→ cover) round. Pipeline failures are reported and the
/// loop continues; only I/O on the terminal is an error here.
fn run_once<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    session: &Session,
    pipeline: &Pipeline,
) -> Result<Reply<()>> {
    p.info("Paste your cURL and press Enter twice. 'q' to quit.")?;
    let lines = match p.paste()? {
        Paste::Lines(lines) => lines,
        Paste::Quit => return Ok(Reply::Quit),
    };

    let request = match request::parse_lines(&lines) {
        Ok(request) => request,
        Err(e) => {
            p.error(&e.to_string())?;
            p.info(e.hint())?;
            return Ok(Reply::Value(()));
        }
    };

    p.info("Downloading episode...")?;
    let mut sink = BarSink::new();
    let mp3 = match pipeline.fetch_audio(&request, &session.dir, &mut sink) {
        Ok(path) => path,
        Err(e) => {
            p.error(&e.to_string())?;
            p.info(e.hint())?;
            return Ok(Reply::Value(()));
        }
    };
    p.success(&format!("MP3 ready: {}", mp3.display()))?;

    if !session.embed_cover {
        return Ok(Reply::Value(()));
    }
    let image_url = match p.line("Cover URL (blank to skip): ")? {
        Reply::Value(url) => url,
        Reply::Quit => return Ok(Reply::Quit),
    };
    if image_url.is_empty() {
        p.info("Skipping cover embedding.")?;
        return Ok(Reply::Value(()));
    }

    let cover = CoverRequest {
        image_url,
        keep_original: session.keep_original,
    };
    match pipeline.attach_cover(&request, &mp3, &cover) {
        Ok(path) => p.success(&format!("Cover embedded: {}", path.display()))?,
        Err(e) => {
            p.error(&format!("Embedding cover failed: {e}"))?;
            p.info("The MP3 without cover art was kept.")?;
        }
    }
    Ok(Reply::Value(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn offline_config() -> AiodConfig {
        let mut cfg = AiodConfig::default();
        cfg.tools.curl = PathBuf::from("aiod-test-no-such-curl");
        cfg.tools.ffmpeg = PathBuf::from("aiod-test-no-such-ffmpeg");
        cfg.tools.ffprobe = PathBuf::from("aiod-test-no-such-ffprobe");
        cfg.retry.backoff_base = 0.0;
        cfg
    }

    fn session(input: &str, cfg: &AiodConfig) -> String {
        let mut p = Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        run_session(&mut p, cfg, &Pipeline::from_config(cfg)).unwrap();
        String::from_utf8_lossy(p.output()).into_owned()
    }

    #[test]
    fn quit_at_first_prompt_creates_nothing() {
        let cfg = offline_config();
        let out = session("q\n", &cfg);
        assert!(out.contains("Download dir"));
        assert!(out.contains("[INFO] Exiting."));
        assert!(!out.contains("Embed cover art?"));
    }

    #[test]
    fn download_dir_is_created() {
        let root = tempdir().unwrap();
        let target = root.path().join("pods").join("new");
        let cfg = offline_config();
        let out = session(&format!("{}\nQ\n", target.display()), &cfg);
        assert!(target.is_dir());
        assert!(out.contains("Embed cover art?"));
    }

    #[test]
    fn paste_without_url_reports_and_loops() {
        let root = tempdir().unwrap();
        let mut cfg = offline_config();
        cfg.download_dir = Some(root.path().to_path_buf());
        let out = session("n\ncurl -H 'Accept: */*'\n\n\nq\n", &cfg);
        assert!(out.contains("[ERROR] no URL found in the pasted request"));
        assert!(out.contains("[INFO] Paste the full cURL command"));
        assert_eq!(out.matches("Paste your cURL").count(), 2);
        assert!(!out.contains("Keep original MP3"));
    }

    #[test]
    fn failed_download_hints_at_expired_token() {
        let root = tempdir().unwrap();
        let mut cfg = offline_config();
        cfg.download_dir = Some(root.path().to_path_buf());
        cfg.embed_cover = Some(true);
        let out = session("curl 'https://cdn.example.com/ep.mp4'\n\nq\n", &cfg);
        assert!(out.contains("[INFO] Downloading episode..."));
        assert!(out.contains("download failed after 3 attempt(s)"));
        assert!(out.contains("Token may be expired"));
        assert!(out.contains("[SUCCESS] All done!"));
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn keep_original_is_asked_only_when_embedding() {
        let root = tempdir().unwrap();
        let mut cfg = offline_config();
        cfg.download_dir = Some(root.path().to_path_buf());
        let mut p = Prompter::new(Cursor::new(b"y\nn\n".to_vec()), Vec::new());
        let reply = setup(&mut p, &cfg).unwrap();
        assert_eq!(
            reply,
            Reply::Value(Session {
                dir: root.path().to_path_buf(),
                embed_cover: true,
                keep_original: false,
            })
        );
    }
}
