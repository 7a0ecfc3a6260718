//! Capture-group scanning and path normalization for regex route patterns.

use std::ops::Range;

/// Name used for a path parameter that could not be recovered
pub const FALLBACK_NAME: &str = "?";

/// A capturing group found in a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureGroup {
    /// Byte range of the group, parentheses included
    pub span: Range<usize>,
    /// Name of a `(?P<name>...)` or `(?<name>...)` group
    pub name: Option<String>,
    /// Position among all capturing groups of the pattern, nested ones
    /// included, counted by opening parenthesis
    pub ordinal: usize,
}

/// Capturing groups of `pattern` that are not nested inside another
/// capturing group, left to right.
///
/// Escaped parentheses and parentheses inside character classes are ignored.
/// Non-capturing groups such as `(?:...)` are transparent: capturing groups
/// inside them are still reported.
pub fn capture_groups(pattern: &str) -> Vec<CaptureGroup> {
    let bytes = pattern.as_bytes();
    let mut groups = Vec::new();
    // (start, name, ordinal if capturing) of every open group
    let mut open: Vec<(usize, Option<String>, Option<usize>)> = Vec::new();
    let mut next_ordinal = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'[' => i = class_end(bytes, i),
            b'(' => {
                let (capturing, name) = group_kind(&pattern[i + 1..]);
                let ordinal = capturing.then(|| {
                    next_ordinal += 1;
                    next_ordinal - 1
                });
                open.push((i, name, ordinal));
            }
            b')' => {
                if let Some((start, name, ordinal)) = open.pop() {
                    let nested = open.iter().any(|(_, _, o)| o.is_some());
                    if let (Some(ordinal), false) = (ordinal, nested) {
                        groups.push(CaptureGroup {
                            span: start..i + 1,
                            name,
                            ordinal,
                        });
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }

    groups.sort_by_key(|g| g.span.start);
    groups
}

/// Index of the `]` closing the class opened at `start`.
fn class_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    if bytes.get(i) == Some(&b'^') {
        i += 1;
    }
    // a leading `]` is literal
    if bytes.get(i) == Some(&b']') {
        i += 1;
    }
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'[' if bytes.get(i + 1) == Some(&b':') => {
                // POSIX class such as [:alpha:]
                if let Some(end) = find_from(bytes, i + 2, b":]") {
                    i = end + 1;
                }
            }
            b']' => return i,
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

fn find_from(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Classify the group whose body starts with `rest`.
fn group_kind(rest: &str) -> (bool, Option<String>) {
    let Some(after) = rest.strip_prefix('?') else {
        return (true, None);
    };
    let named = after
        .strip_prefix("P<")
        .or_else(|| after.strip_prefix('<').filter(|s| !s.starts_with(['=', '!'])));
    match named.and_then(|s| s.split_once('>')) {
        Some((name, _)) => (true, Some(name.to_string())),
        None => (false, None),
    }
}

/// Whether `name` carries no meaning (empty or only underscores).
pub fn is_placeholder(name: &str) -> bool {
    name.chars().all(|c| c == '_')
}

/// Replace each top-level capturing group with `{name}` and drop the final
/// `$` anchor.
///
/// `names` is indexed by capture ordinal, so inner groups of a nested group
/// still take their slots. A missing or fallback name falls back to the
/// group's own regex name, then to [`FALLBACK_NAME`].
pub fn normalize_path(pattern: &str, names: &[String]) -> String {
    let mut path = String::with_capacity(pattern.len());
    let mut last = 0;

    for group in capture_groups(pattern) {
        let name = names
            .get(group.ordinal)
            .map(String::as_str)
            .filter(|n| *n != FALLBACK_NAME)
            .or(group.name.as_deref())
            .unwrap_or(FALLBACK_NAME);
        path.push_str(&pattern[last..group.span.start]);
        path.push('{');
        path.push_str(name);
        path.push('}');
        last = group.span.end;
    }
    path.push_str(&pattern[last..]);

    if path.ends_with('$') {
        path.pop();
    }
    path
}
