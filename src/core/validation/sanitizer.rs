//! Markup stripping for free-text fields
//!
//! Output is plain text: no tags, comments, script/style bodies, angle
//! brackets or scriptable URL schemes survive. The passes are repeated
//! until nothing changes, so `sanitize(sanitize(x)) == sanitize(x)`.

use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*(?:script|style)\b[^>]*>.*?<\s*/\s*(?:script|style)\s*>")
        .expect("script block pattern")
});

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("tag pattern"));

static DELIMITER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[<>]").expect("delimiter pattern"));

const SCHEMES: [&str; 3] = ["javascript", "vbscript", "data"];

/// Remove `scheme:` prefixes (whitespace allowed before the colon) in one
/// pass. Removing one can join its neighbours into another, so every colon
/// re-checks the output built so far.
fn strip_protocols(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == ':' {
            if let Some(start) = scheme_start(&out) {
                out.truncate(start);
                continue;
            }
        }
        out.push(ch);
    }
    out
}

/// Byte offset of a scheme name ending `text`, ignoring trailing whitespace
fn scheme_start(text: &str) -> Option<usize> {
    let head = text.trim_end();
    SCHEMES.iter().find_map(|scheme| {
        let start = head.len().checked_sub(scheme.len())?;
        let name = head.get(start..)?;
        let at_boundary = head[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
        (name.eq_ignore_ascii_case(scheme) && at_boundary).then_some(start)
    })
}

fn strip_once(text: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(text, "");
    let text = COMMENT.replace_all(&text, "");
    let text = TAG.replace_all(&text, "");
    let text = DELIMITER.replace_all(&text, "");
    strip_protocols(&text).trim().to_string()
}

/// Strip all markup from `text`
pub fn sanitize(text: &str) -> String {
    let mut current = strip_once(text);
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Element-wise [`sanitize`]; absent or empty lists come back unchanged
pub fn sanitize_all(values: Option<Vec<String>>) -> Option<Vec<String>> {
    values.map(|items| items.iter().map(|item| sanitize(item)).collect())
}
