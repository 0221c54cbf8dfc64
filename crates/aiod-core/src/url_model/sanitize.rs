//! Filename sanitization for media written into the download directory.

/// Characters that are unsafe in a filename on at least one common filesystem.
const UNSAFE: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Sanitizes a candidate filename.
///
/// - Maps `-` to `_`
/// - Replaces each run of `<>:"/\|?*` with a single `_`
/// - Replaces control characters with `_`
/// - Limits length to 255 bytes (Linux NAME_MAX)
pub fn sanitize_filename(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    let mut in_unsafe_run = false;

    for c in name.chars() {
        if UNSAFE.contains(&c) || c.is_control() {
            if !in_unsafe_run {
                out.push('_');
            }
            in_unsafe_run = true;
            continue;
        }
        in_unsafe_run = false;
        out.push(if c == '-' { '_' } else { c });
    }

    if out.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !out.is_char_boundary(take) {
            take -= 1;
        }
        out.truncate(take);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hyphens_become_underscores() {
        assert_eq!(sanitize_filename("my-show--ep-1.mp4"), "my_show__ep_1.mp4");
    }

    #[test]
    fn unsafe_runs_collapse() {
        assert_eq!(sanitize_filename("a<>b:c\"d.mp3"), "a_b_c_d.mp3");
        assert_eq!(sanitize_filename("what?*|now.m4a"), "what_now.m4a");
    }

    #[test]
    fn control_chars() {
        assert_eq!(sanitize_filename("file\x00name.mp3"), "file_name.mp3");
    }

    #[test]
    fn already_clean_name_unchanged() {
        assert_eq!(sanitize_filename("show_club.mp4"), "show_club.mp4");
    }

    #[test]
    fn long_names_are_truncated_on_char_boundary() {
        let long = "é".repeat(200);
        let out = sanitize_filename(&long);
        assert!(out.len() <= 255);
        assert!(out.chars().all(|c| c == 'é'));
    }
}
