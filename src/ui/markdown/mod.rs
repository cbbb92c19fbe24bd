//! Splits one response string into ordered, classified segments.
//!
//! Math is cut out first so its delimiters and bodies are never touched by
//! markdown handling. The remaining text runs are structured line by line with
//! code spans protected behind placeholder tokens while lines are classified.

mod inline;
mod math_split;
mod placeholder;
mod structure;

#[cfg(test)]
mod tests;

pub use inline::{inline_spans, InlineStyle};
pub use placeholder::contains_placeholder;

use math_split::{split_math, Run};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Prose,
    Heading1,
    Heading2,
    Heading3,
    ListItem,
    Code,
    Math,
}

impl SegmentKind {
    pub fn is_heading(self) -> bool {
        matches!(
            self,
            SegmentKind::Heading1 | SegmentKind::Heading2 | SegmentKind::Heading3
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub content: String,
    /// Fence tag of a code block, when one was given.
    pub language: Option<String>,
    /// A newline followed this segment in the source.
    pub ends_line: bool,
}

impl Segment {
    pub fn new(kind: SegmentKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            language: None,
            ends_line: false,
        }
    }

    pub fn ending_line(mut self, ends_line: bool) -> Self {
        self.ends_line = ends_line;
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }
}

/// Segment one message. Empty input yields no segments.
pub fn segment_message(text: &str) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut at_line_start = true;
    for run in split_math(text) {
        match run {
            Run::Math(body) => {
                segments.push(Segment::new(SegmentKind::Math, body));
                at_line_start = false;
            }
            Run::Text(body) => {
                structure::structure_run(body, at_line_start, &mut segments);
                at_line_start = body.ends_with('\n');
            }
        }
    }
    segments
}

/// Joins segment contents back into text, one newline per `ends_line`.
pub fn reassemble(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push_str(&segment.content);
        if segment.ends_line {
            out.push('\n');
        }
    }
    out
}

/// Index of the first segment still carrying an unresolved placeholder token.
pub fn leaked_placeholder(segments: &[Segment]) -> Option<usize> {
    segments
        .iter()
        .position(|segment| contains_placeholder(&segment.content))
}

/// Byte length of a list item's marker (`• ` or `12. `), if it has one.
pub fn list_marker_len(content: &str) -> Option<usize> {
    if content.starts_with("• ") {
        return Some("• ".len());
    }
    structure::numbered_marker_len(content)
}
