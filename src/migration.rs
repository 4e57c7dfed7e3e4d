//! String-level rewriting of legacy reserved identifiers.
//!
//! Works on the raw spec text rather than a parsed tree so references
//! embedded inside expression strings are caught too. Whole-word
//! matching is an explicit boundary scan (identifier characters are
//! ASCII alphanumerics and `_`), not a regex.

/// Name of the injected container signal/parameter.
pub const CONTAINER_SIGNAL_NAME: &str = "vizbedContainer";

/// Reserved names from earlier host integrations, superseded by
/// [`CONTAINER_SIGNAL_NAME`].
pub const LEGACY_CONTAINER_WIDTH: &str = "pbiContainerWidth";
pub const LEGACY_CONTAINER_HEIGHT: &str = "pbiContainerHeight";
pub const LEGACY_CONTAINER: &str = "pbiContainer";

/// Applied in order: the suffixed width/height names first, the bare
/// container name last.
const REPLACEMENTS: [(&str, &str); 3] = [
    (LEGACY_CONTAINER_WIDTH, "vizbedContainer.width"),
    (LEGACY_CONTAINER_HEIGHT, "vizbedContainer.height"),
    (LEGACY_CONTAINER, CONTAINER_SIGNAL_NAME),
];

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationOutcome {
    pub spec: String,
    pub had_legacy_references: bool,
    pub replacement_count: usize,
}

/// Rewrite legacy container references to the current signal name,
/// counting replacements across all patterns. Idempotent: a second pass
/// over the output performs zero replacements.
pub fn migrate_legacy_references(spec: &str) -> MigrationOutcome {
    let mut text = spec.to_string();
    let mut total = 0;
    for (needle, replacement) in REPLACEMENTS {
        let (next, count) = replace_word(&text, needle, replacement);
        text = next;
        total += count;
    }
    MigrationOutcome {
        spec: text,
        had_legacy_references: total > 0,
        replacement_count: total,
    }
}

/// Read-only companion check, used to surface a deprecation warning
/// without forcing a rewrite.
pub fn has_legacy_references(spec: &str) -> bool {
    REPLACEMENTS
        .iter()
        .any(|(needle, _)| !word_occurrences(spec, needle).is_empty())
}

/// Whether `word` occurs in `text` delimited by non-identifier
/// characters on both sides.
pub(crate) fn contains_word(text: &str, word: &str) -> bool {
    !word_occurrences(text, word).is_empty()
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Byte offsets of whole-word occurrences of `needle` in `text`.
fn word_occurrences(text: &str, needle: &str) -> Vec<usize> {
    if needle.is_empty() {
        return Vec::new();
    }
    let bytes = text.as_bytes();
    let mut hits = Vec::new();
    let mut from = 0;
    while let Some(rel) = text[from..].find(needle) {
        let at = from + rel;
        let end = at + needle.len();
        let bounded_left = at == 0 || !is_ident_byte(bytes[at - 1]);
        let bounded_right = end == bytes.len() || !is_ident_byte(bytes[end]);
        if bounded_left && bounded_right {
            hits.push(at);
            from = end;
        } else {
            from = at + 1;
        }
    }
    hits
}

fn replace_word(text: &str, needle: &str, replacement: &str) -> (String, usize) {
    let hits = word_occurrences(text, needle);
    if hits.is_empty() {
        return (text.to_string(), 0);
    }
    let mut out = String::with_capacity(text.len() + hits.len() * replacement.len());
    let mut last = 0;
    for &at in &hits {
        out.push_str(&text[last..at]);
        out.push_str(replacement);
        last = at + needle.len();
    }
    out.push_str(&text[last..]);
    (out, hits.len())
}
