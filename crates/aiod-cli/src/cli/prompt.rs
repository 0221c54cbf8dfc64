//! Line prompts and status messages for the interactive loop.
//!
//! Every prompt accepts the quit sentinel; end of input counts as quitting.

use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use aiod_core::request::{collect_paste, is_quit, Paste};
use console::{style, Color, Term};

/// Answer to a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    Value(T),
    Quit,
}

/// Prefix of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Info,
    Error,
    Success,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Status::Info => "[INFO]",
            Status::Error => "[ERROR]",
            Status::Success => "[SUCCESS]",
        }
    }

    fn color(self) -> Color {
        match self {
            Status::Info => Color::Cyan,
            Status::Error => Color::Red,
            Status::Success => Color::Green,
        }
    }

    /// The bracketed tag, in colour when `colour` is set.
    pub fn tag(self, colour: bool) -> String {
        if colour {
            style(self.label())
                .fg(self.color())
                .bold()
                .force_styling(true)
                .to_string()
        } else {
            self.label().to_string()
        }
    }
}

/// Whether status lines written to `term` should be coloured.
pub fn colour_for(term: &Term) -> bool {
    term.features().colors_supported()
}

/// Prompt/message channel over any line reader and writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
    colour: bool,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Plain-text prompter; see [`Prompter::with_colour`].
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            colour: false,
        }
    }

    pub fn with_colour(mut self, colour: bool) -> Self {
        self.colour = colour;
        self
    }

    fn status(&mut self, status: Status, msg: &str) -> io::Result<()> {
        writeln!(self.output, "{} {msg}", status.tag(self.colour))
    }

    pub fn info(&mut self, msg: &str) -> io::Result<()> {
        self.status(Status::Info, msg)
    }

    pub fn error(&mut self, msg: &str) -> io::Result<()> {
        self.status(Status::Error, msg)
    }

    pub fn success(&mut self, msg: &str) -> io::Result<()> {
        self.status(Status::Success, msg)
    }

    pub fn banner(&mut self) -> io::Result<()> {
        writeln!(
            self.output,
            r"
           _____ ____    _____
     /\   |_   _/ __ \  |  __ \
    /  \    | || |  | | | |  | |
   / /\ \   | || |  | | | |  | |
  / ____ \ _| || |__| | | |__| |
 /_/    \_\_____\____/  |_____/
"
        )
    }

    /// One trimmed line of input.
    pub fn line(&mut self, prompt: &str) -> io::Result<Reply<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 || is_quit(&buf) {
            return Ok(Reply::Quit);
        }
        Ok(Reply::Value(buf.trim().to_string()))
    }

    /// Asks until the answer is `y` or `n` (any case).
    pub fn yes_no(&mut self, prompt: &str) -> io::Result<Reply<bool>> {
        loop {
            match self.line(prompt)? {
                Reply::Quit => return Ok(Reply::Quit),
                Reply::Value(answer) => match answer.to_ascii_lowercase().as_str() {
                    "y" => return Ok(Reply::Value(true)),
                    "n" => return Ok(Reply::Value(false)),
                    _ => self.error("Please enter one of y/n or Q to quit.")?,
                },
            }
        }
    }

    /// A multi-line paste, terminated by a blank line.
    pub fn paste(&mut self) -> io::Result<Paste> {
        collect_paste(&mut self.input)
    }

    /// Access to the writer (tests inspect it).
    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.output
    }
}

/// Expands `~`, `$VAR` and `${VAR}` and makes the result absolute.
///
/// Unset variables are left as written.
pub fn expand_path(raw: &str) -> PathBuf {
    let expanded = expand_vars(raw.trim());
    let path = match expanded.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest.trim_start_matches('/')),
            None => PathBuf::from(&expanded),
        },
        _ => PathBuf::from(&expanded),
    };
    absolutize(&path)
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

fn expand_vars(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };
        match (!name.is_empty()).then(|| env::var(name).ok()).flatten() {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[pos..pos + 1 + consumed]),
        }
        rest = &rest[pos + 1 + consumed..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn written(p: &Prompter<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8_lossy(p.output()).into_owned()
    }

    #[test]
    fn yes_no_reprompts_on_garbage() {
        let mut p = prompter("maybe\nY\n");
        assert_eq!(p.yes_no("Embed cover art? (y/n): ").unwrap(), Reply::Value(true));
        let out = written(&p);
        assert_eq!(out.matches("Embed cover art?").count(), 2);
        assert!(out.contains("[ERROR] Please enter one of y/n"));
    }

    #[test]
    fn coloured_tags_wrap_only_the_prefix() {
        let mut p = prompter("").with_colour(true);
        p.success("MP3 ready").unwrap();
        let out = written(&p);
        assert!(out.starts_with("\u{1b}["));
        assert!(out.contains("[SUCCESS]"));
        assert!(out.ends_with(" MP3 ready\n"));
        assert_eq!(Status::Error.tag(false), "[ERROR]");
        assert_ne!(Status::Info.tag(true), "[INFO]");
    }

    #[test]
    fn quit_and_eof_are_quit() {
        assert_eq!(prompter("Q\n").line("dir: ").unwrap(), Reply::Quit);
        assert_eq!(prompter("").yes_no("ok? ").unwrap(), Reply::Quit);
    }

    #[test]
    fn line_is_trimmed() {
        assert_eq!(
            prompter("  ~/Podcasts  \n").line("dir: ").unwrap(),
            Reply::Value("~/Podcasts".to_string())
        );
    }

    #[test]
    fn expands_home_and_vars() {
        env::set_var("AIOD_TEST_SHOW", "club");
        let home = PathBuf::from(env::var_os("HOME").unwrap_or_default());
        if home.is_absolute() {
            assert_eq!(expand_path("~/pods/$AIOD_TEST_SHOW"), home.join("pods/club"));
            assert_eq!(expand_path("~"), home);
        }
        assert_eq!(expand_path("/srv/${AIOD_TEST_SHOW}/x"), PathBuf::from("/srv/club/x"));
    }

    #[test]
    fn unset_vars_stay_literal() {
        assert_eq!(
            expand_path("/srv/$AIOD_TEST_UNSET_VAR/${AIOD_TEST_UNSET_VAR}/$"),
            PathBuf::from("/srv/$AIOD_TEST_UNSET_VAR/${AIOD_TEST_UNSET_VAR}/$")
        );
    }

    #[test]
    fn relative_paths_become_absolute() {
        assert!(expand_path("downloads").is_absolute());
    }
}
