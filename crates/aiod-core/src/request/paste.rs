//! Collecting a multi-line paste from a line reader.

use std::io::{self, BufRead};

/// Sentinel accepted in place of a paste (and at every prompt) to quit.
pub const QUIT_SENTINEL: &str = "q";

/// Result of reading one paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paste {
    /// Lines read up to (not including) the terminating blank line.
    Lines(Vec<String>),
    /// The user typed the quit sentinel, or input ended before any line.
    Quit,
}

/// True if `line` is the quit sentinel (case-insensitive, surrounding blanks ignored).
pub fn is_quit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(QUIT_SENTINEL)
}

/// Reads lines until a blank line, the quit sentinel, or EOF.
///
/// Leading blank lines are skipped so a stray Enter before the paste does not
/// submit an empty request.
pub fn collect_paste<R: BufRead>(reader: &mut R) -> io::Result<Paste> {
    let mut lines = Vec::new();
    let mut buf = String::new();
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        let line = buf.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            if lines.is_empty() {
                continue;
            }
            break;
        }
        if is_quit(line) {
            return Ok(Paste::Quit);
        }
        lines.push(line.to_string());
    }
    if lines.is_empty() {
        Ok(Paste::Quit)
    } else {
        Ok(Paste::Lines(lines))
    }
}
