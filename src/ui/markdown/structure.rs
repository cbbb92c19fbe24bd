use std::sync::LazyLock;

use regex::Regex;

use super::placeholder::{CodeBlock, PlaceholderSet, TokenKind};
use super::{Segment, SegmentKind};

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```([\w+#.-]*)[ \t]*\r?\n(.*?)```").expect("valid fence pattern")
});

static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("valid inline code pattern"));

/// Structure one non-math run. `at_line_start` is false when the run
/// continues a line that began before a math run.
pub(super) fn structure_run(run: &str, at_line_start: bool, out: &mut Vec<Segment>) {
    let mut placeholders = PlaceholderSet::for_source(run);
    let protected = protect_code(run, &mut placeholders);

    let mut first = true;
    for piece in protected.split_inclusive('\n') {
        let ends_line = piece.ends_with('\n');
        let line = piece.strip_suffix('\n').unwrap_or(piece);
        let line_start = at_line_start || !first;
        first = false;
        emit_line(line, ends_line, line_start, &placeholders, out);
    }
}

fn protect_code(run: &str, placeholders: &mut PlaceholderSet) -> String {
    let fenced = FENCE.replace_all(run, |caps: &regex::Captures<'_>| {
        let language = caps
            .get(1)
            .map(|m| m.as_str())
            .filter(|tag| !tag.is_empty())
            .map(str::to_string);
        placeholders.protect_block(CodeBlock {
            language,
            body: caps[2].to_string(),
            original: caps[0].to_string(),
        })
    });
    INLINE_CODE
        .replace_all(&fenced, |caps: &regex::Captures<'_>| {
            placeholders.protect_inline(&caps[0])
        })
        .into_owned()
}

fn emit_line(
    line: &str,
    ends_line: bool,
    line_start: bool,
    placeholders: &PlaceholderSet,
    out: &mut Vec<Segment>,
) {
    let blocks = placeholders.find(line, TokenKind::Block);
    if !blocks.is_empty() {
        let last = blocks.len() - 1;
        for (i, (range, index)) in blocks.into_iter().enumerate() {
            let segment = match placeholders.block(index) {
                Some(block) => Segment::new(SegmentKind::Code, block.body.clone())
                    .with_language(block.language.clone()),
                None => Segment::new(SegmentKind::Prose, &line[range]),
            };
            out.push(segment.ending_line(ends_line && i == last));
        }
        return;
    }

    let (kind, content) = if line_start {
        classify(line)
    } else {
        (SegmentKind::Prose, line.to_string())
    };
    let content = placeholders.restore_inline(&content);
    debug_assert!(
        placeholders.find(&content, TokenKind::Inline).is_empty(),
        "unresolved inline code token"
    );
    out.push(Segment::new(kind, content).ending_line(ends_line));
}

fn classify(line: &str) -> (SegmentKind, String) {
    if let Some(rest) = line.strip_prefix("### ") {
        return (SegmentKind::Heading3, rest.to_string());
    }
    if let Some(rest) = line.strip_prefix("## ") {
        return (SegmentKind::Heading2, rest.to_string());
    }
    if let Some(rest) = line.strip_prefix("# ") {
        return (SegmentKind::Heading1, rest.to_string());
    }
    if let Some(rest) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
    {
        return (SegmentKind::ListItem, format!("• {rest}"));
    }
    if numbered_marker_len(line).is_some() {
        return (SegmentKind::ListItem, line.to_string());
    }
    (SegmentKind::Prose, line.to_string())
}

/// Length of a leading `<digits>. ` marker.
pub(super) fn numbered_marker_len(line: &str) -> Option<usize> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    line[digits..].starts_with(". ").then_some(digits + 2)
}
