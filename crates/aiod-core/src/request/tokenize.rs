//! Shell-ish tokenizer for pasted `curl` commands.
//!
//! Understands the two formats browsers export: POSIX (`'...'`, `$'...'`,
//! trailing `\` continuations) and Windows cmd (`^` escapes and `^`
//! continuations). It is deliberately forgiving: unterminated quotes run to
//! the end of input instead of failing.

/// Joins pasted lines into one buffer, dropping continuation markers.
pub fn join_lines<'a, I>(lines: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let lines: Vec<&str> = lines.into_iter().collect();
    let cmd_format = lines
        .iter()
        .any(|l| l.trim_end().ends_with('^') || has_bare_caret_quote(l));

    let mut parts = Vec::with_capacity(lines.len());
    for line in lines {
        let line = if cmd_format {
            line.replace('^', "")
        } else {
            line.to_string()
        };
        let t = line.trim();
        let t = t.strip_suffix('\\').map_or(t, str::trim_end);
        parts.push(t.to_string());
    }
    parts.join(" ")
}

/// True when `^"` appears outside a single-quoted POSIX value.
fn has_bare_caret_quote(line: &str) -> bool {
    let mut in_single = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' => in_single = !in_single,
            '^' if !in_single && chars.peek() == Some(&'"') => return true,
            _ => {}
        }
    }
    false
}

/// Splits a joined buffer into arguments, resolving quotes and escapes.
pub fn tokenize(buffer: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = buffer.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '"' => {
                in_token = true;
                while let Some(q) = chars.next() {
                    match q {
                        '"' => break,
                        '\\' => match chars.peek() {
                            Some(&next @ ('"' | '\\' | '$' | '`')) => {
                                current.push(next);
                                chars.next();
                            }
                            _ => current.push('\\'),
                        },
                        other => current.push(other),
                    }
                }
            }
            '\'' => {
                in_token = true;
                for q in chars.by_ref() {
                    if q == '\'' {
                        break;
                    }
                    current.push(q);
                }
            }
            '$' if chars.peek() == Some(&'\'') => {
                chars.next();
                in_token = true;
                while let Some(q) = chars.next() {
                    match q {
                        '\'' => break,
                        '\\' => match chars.next() {
                            Some('n') => current.push('\n'),
                            Some('t') => current.push('\t'),
                            Some(other) => current.push(other),
                            None => current.push('\\'),
                        },
                        other => current.push(other),
                    }
                }
            }
            '\\' => {
                in_token = true;
                match chars.next() {
                    Some(next) => current.push(next),
                    None => current.push('\\'),
                }
            }
            other => {
                in_token = true;
                current.push(other);
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Values following a flag: `-H value`, `-Hvalue` and `--header value`.
pub fn flag_values<'a>(tokens: &'a [String], short: &str, long: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut iter = tokens.iter();
    while let Some(tok) = iter.next() {
        if tok == short || tok == long {
            if let Some(value) = iter.next() {
                out.push(value.as_str());
            }
        } else if let Some(attached) = tok.strip_prefix(short) {
            if !attached.is_empty() && !tok.starts_with("--") {
                out.push(attached);
            }
        } else if let Some(attached) = tok.strip_prefix(long).and_then(|r| r.strip_prefix('=')) {
            out.push(attached);
        }
    }
    out
}
