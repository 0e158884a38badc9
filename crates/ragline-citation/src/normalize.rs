// SPDX-FileCopyrightText: 2026 Ragline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text normalization applied to assistant answers before rendering.
//!
//! Three rewrites, in fixed order: legacy citation-token migration,
//! reasoning-section stripping, and math-delimiter conversion. All of them
//! are pure string functions operating on raw text rather than a parsed
//! document tree; the function boundary here is what a future tree-aware
//! rewriter would replace.

use std::sync::LazyLock;

use regex::Regex;

/// Legacy citation token: `##3$$`.
static LEGACY_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"##(\d+)\$\$").unwrap());

/// A paired reasoning section, non-greedy, spanning newlines.
static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").unwrap());

/// A closing marker left dangling after nested sections are removed.
static THINK_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</think>").unwrap());

/// Display math delimited as `\[ ... \]`.
static DISPLAY_MATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\\\[(.*?)\\\]").unwrap());

/// Inline math delimited as `\( ... \)`.
static INLINE_MATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\\\((.*?)\\\)").unwrap());

/// Regions the math rewrite must not touch: fenced code blocks, inline
/// code spans, and already-dollar-delimited math.
static PROTECTED_REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```.*?```|`[^`\n]*`|\$\$.*?\$\$|\$[^$\n]+\$").unwrap()
});

/// Applies the full normalization pipeline to a raw assistant answer.
///
/// Order matters: legacy tokens are migrated first so both syntaxes resolve
/// identically downstream, reasoning sections are stripped next, and the
/// math rewrite runs last so it sees the text the renderer will see.
pub fn normalize_answer(text: &str) -> String {
    let migrated = migrate_legacy_citations(text);
    let stripped = strip_reasoning(&migrated);
    rewrite_math_delimiters(&stripped)
}

/// Rewrites legacy `##<digits>$$` citation tokens to canonical `[ID:<digits>]`.
///
/// Backward compatibility only; both shapes resolve to the same chunk after
/// migration.
pub fn migrate_legacy_citations(text: &str) -> String {
    LEGACY_CITATION.replace_all(text, "[ID:$1]").into_owned()
}

/// Removes `<think>...</think>` reasoning sections from an answer.
///
/// Removal repeats until a fixed point so nested or repeated sections are
/// fully eliminated; a single non-recursive pass leaves fragments behind
/// when markers nest. Closing markers left dangling by nesting are dropped
/// at the end. Idempotent: applying it twice yields the same result as once.
pub fn strip_reasoning(text: &str) -> String {
    let mut result = text.to_string();
    loop {
        let next = THINK_BLOCK.replace_all(&result, "").into_owned();
        if next == result {
            break;
        }
        result = next;
    }
    THINK_CLOSE.replace_all(&result, "").trim().to_string()
}

/// Converts `\[...\]` to `$$...$$` and `\(...\)` to `$...$` for the math
/// rendering backend.
///
/// Fenced code, inline code spans, and already-delimited math are masked
/// out before the rewrite and restored afterwards, so delimiters inside
/// those regions survive untouched.
pub fn rewrite_math_delimiters(text: &str) -> String {
    let (masked, regions) = mask_protected_regions(text);

    // `$$` is an escaped literal dollar in the replacement syntax.
    let display = DISPLAY_MATH.replace_all(&masked, "$$$$${1}$$$$");
    let inline = INLINE_MATH.replace_all(&display, "$$${1}$$");

    restore_protected_regions(&inline, &regions)
}

// Placeholders use private-use codepoints that cannot occur in the
// protected regions' surrounding rewrites.
const MASK_OPEN: char = '\u{E000}';
const MASK_CLOSE: char = '\u{E001}';

fn mask_protected_regions(text: &str) -> (String, Vec<String>) {
    let mut regions = Vec::new();
    let masked = PROTECTED_REGION
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let placeholder = format!("{MASK_OPEN}{}{MASK_CLOSE}", regions.len());
            regions.push(caps[0].to_string());
            placeholder
        })
        .into_owned();
    (masked, regions)
}

fn restore_protected_regions(text: &str, regions: &[String]) -> String {
    let mut result = text.to_string();
    for (idx, region) in regions.iter().enumerate() {
        let placeholder = format!("{MASK_OPEN}{idx}{MASK_CLOSE}");
        result = result.replace(&placeholder, region);
    }
    result
}
