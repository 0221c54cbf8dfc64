//! External agents: the download agent (`curl`), the transcoding agent
//! (`ffmpeg`) and the probe agent (`ffprobe`).
//!
//! Argument vectors are built by pure functions in [`args`] so each
//! invocation shape can be tested without running anything.

pub mod args;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::ToolsConfig;

/// Which external agent a [`MissingTool`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Download,
    Transcode,
    Probe,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Download => write!(f, "download agent"),
            AgentKind::Transcode => write!(f, "transcoding agent"),
            AgentKind::Probe => write!(f, "probe agent"),
        }
    }
}

/// A configured agent that could not be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTool {
    pub kind: AgentKind,
    pub program: PathBuf,
}

impl fmt::Display for MissingTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' ({}) not found on PATH. Please install it first.",
            self.program.display(),
            self.kind
        )
    }
}

/// Resolves an agent to the executable that would run.
pub fn locate(program: &Path) -> Option<PathBuf> {
    which::which(program).ok()
}

/// Startup check: every configured agent must resolve on PATH (or be an
/// existing executable path). Returns the ones that don't, in
/// download/transcode/probe order; empty means ready.
pub fn check_prerequisites(tools: &ToolsConfig) -> Vec<MissingTool> {
    [
        (AgentKind::Download, &tools.curl),
        (AgentKind::Transcode, &tools.ffmpeg),
        (AgentKind::Probe, &tools.ffprobe),
    ]
    .into_iter()
    .filter(|(_, program)| locate(program).is_none())
    .map(|(kind, program)| MissingTool {
        kind,
        program: program.clone(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tools_are_reported_in_order() {
        let tools = ToolsConfig {
            curl: PathBuf::from("aiod-test-no-such-curl"),
            ffmpeg: PathBuf::from("aiod-test-no-such-ffmpeg"),
            ffprobe: PathBuf::from("aiod-test-no-such-ffprobe"),
        };
        let missing = check_prerequisites(&tools);
        let kinds: Vec<_> = missing.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![AgentKind::Download, AgentKind::Transcode, AgentKind::Probe]
        );
        assert!(missing[0].to_string().contains("aiod-test-no-such-curl"));
    }

    #[cfg(unix)]
    #[test]
    fn absolute_path_to_executable_is_available() {
        let tools = ToolsConfig {
            curl: PathBuf::from("/bin/sh"),
            ffmpeg: PathBuf::from("/bin/sh"),
            ffprobe: PathBuf::from("aiod-test-no-such-ffprobe"),
        };
        let missing = check_prerequisites(&tools);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].kind, AgentKind::Probe);
    }
}
