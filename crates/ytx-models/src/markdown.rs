//! Markdown cleanup for generated explanations.
//!
//! Purely syntactic. The rewrite is idempotent: normalizing already
//! normalized text returns it unchanged.

use std::sync::LazyLock;

use regex::Regex;

static STRONG_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<strong>(.*?)<strong>").unwrap());

static TRIPLE_CODE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<code><code><code>(.*?)<code><code><code>").unwrap());

static CODE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<code>(.*?)<code>").unwrap());

static HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]*([^#\s].*)$").unwrap());

static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\*[ \t]*([^*\s].*)$").unwrap());

static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.[ \t]*([^\d\s].*)$").unwrap());

static FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[ \t]*```[\w+#-]*\s*$").unwrap());

/// Normalize generated markdown.
///
/// Rules, in order:
/// 1. `<strong>x<strong>` becomes `**x**`
/// 2. `<code><code><code>x<code><code><code>` becomes a triple-backtick span,
///    `<code>x<code>` becomes an inline code span
/// 3. header markers are followed by exactly one space
/// 4. `*` bullets are followed by exactly one space
/// 5. `N.` list markers are followed by exactly one space
/// 6. fenced code blocks get a blank line before the opening fence and
///    after the closing fence
///
/// Rules 3 to 5 are not applied inside fenced code blocks.
pub fn normalize_markdown(text: &str) -> String {
    let text = STRONG_TAG.replace_all(text, "**${1}**");
    let text = TRIPLE_CODE_TAG.replace_all(&text, "```${1}```");
    let text = CODE_TAG.replace_all(&text, "`${1}`");

    let mut out: Vec<String> = Vec::new();
    let mut in_fence = false;
    let mut pending_blank = false;

    for line in text.split('\n') {
        if FENCE.is_match(line) {
            if in_fence {
                pending_blank = true;
            } else if out.last().is_some_and(|prev| !prev.trim().is_empty()) {
                out.push(String::new());
            }
            in_fence = !in_fence;
            out.push(line.to_string());
            continue;
        }

        if in_fence {
            out.push(line.to_string());
            continue;
        }

        if pending_blank {
            pending_blank = false;
            if !line.trim().is_empty() {
                out.push(String::new());
            }
        }

        out.push(normalize_line(line));
    }

    out.join("\n")
}

fn normalize_line(line: &str) -> String {
    if HEADER.is_match(line) {
        return HEADER.replace(line, "${1} ${2}").into_owned();
    }
    if BULLET.is_match(line) {
        return BULLET.replace(line, "* ${1}").into_owned();
    }
    if NUMBERED.is_match(line) {
        return NUMBERED.replace(line, "${1}. ${2}").into_owned();
    }
    line.to_string()
}
