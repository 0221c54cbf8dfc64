//! `aiod check` – report where each external agent resolves.

use aiod_core::agent::locate;
use aiod_core::config::AiodConfig;

/// Prints one line per agent. Returns false if any is missing.
pub fn run_check(cfg: &AiodConfig) -> bool {
    let mut ok = true;
    for (name, program) in [
        ("curl", &cfg.tools.curl),
        ("ffmpeg", &cfg.tools.ffmpeg),
        ("ffprobe", &cfg.tools.ffprobe),
    ] {
        match locate(program) {
            Some(path) => println!("{:<8} {}", name, path.display()),
            None => {
                ok = false;
                println!("{:<8} MISSING ({})", name, program.display());
            }
        }
    }
    ok
}
