//! Incremental presentation of one message onto a display surface.
//!
//! A [`Presentation`] is a queue of operations built from a message's
//! segments. Structured pieces (code, headings, list items, math) are applied
//! atomically; prose is revealed a grapheme at a time when the typing effect
//! is on. The caller decides the cadence by calling [`Presentation::advance`]
//! with a budget, typically from a timer tick.

use std::collections::VecDeque;

use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::core::i18n::Language;
use crate::core::message::{Message, Sender, Transcript};
use crate::ui::markdown::{
    inline_spans, list_marker_len, segment_message, InlineStyle, Segment, SegmentKind,
};
use crate::ui::math::{MathDisplay, MathRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingLevel {
    One,
    Two,
    Three,
}

/// Style class of inserted text. Surfaces map these to concrete styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextTag {
    Body(InlineStyle),
    Heading(HeadingLevel, InlineStyle),
    ListItem(InlineStyle),
    Math(MathDisplay),
}

impl TextTag {
    pub fn plain() -> Self {
        TextTag::Body(InlineStyle::default())
    }
}

pub trait DisplaySurface {
    /// Start a new message with its header line.
    fn begin_message(&mut self, sender: Sender, header: &str);
    /// Append text at the end. `\n` starts a new line.
    fn insert(&mut self, text: &str, tag: TextTag);
    /// Append a code block on lines of its own.
    fn insert_code_block(&mut self, code: &str, language: Option<&str>);
    fn at_line_start(&self) -> bool;
    fn scroll_to_end(&mut self);
    /// Close the message with a blank line.
    fn end_message(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    Begin,
    Insert(Vec<(String, TextTag)>),
    /// Inserted on a line of its own.
    Block(Vec<(String, TextTag)>),
    Code {
        code: String,
        language: Option<String>,
    },
    Reveal(Vec<(String, TextTag)>),
    Newline,
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentStatus {
    InProgress,
    Complete,
}

pub struct Presentation {
    sender: Sender,
    header: String,
    ops: VecDeque<Op>,
    /// Graphemes of the front `Reveal` op already shown.
    revealed: usize,
}

impl Presentation {
    pub fn new(
        message: &Message,
        segments: &[Segment],
        renderer: &dyn MathRenderer,
        typing_effect: bool,
        language: Language,
    ) -> Self {
        let mut ops = VecDeque::with_capacity(segments.len() * 2 + 2);
        ops.push_back(Op::Begin);
        let mut after_block = false;
        for segment in segments {
            if after_block
                && segment.kind == SegmentKind::Prose
                && segment.content.is_empty()
                && segment.ends_line
            {
                after_block = false;
                continue;
            }
            after_block = push_segment(&mut ops, segment, renderer, typing_effect);
        }
        ops.push_back(Op::Finish);
        Self {
            sender: message.sender,
            header: message.header(language),
            ops,
            revealed: 0,
        }
    }

    /// Assistant text is segmented and may be typed out; everything else is
    /// shown verbatim at once.
    pub fn for_message(
        message: &Message,
        renderer: &dyn MathRenderer,
        typing_effect: bool,
        language: Language,
    ) -> Self {
        if message.sender.is_assistant() {
            let segments = segment_message(&message.text);
            Self::new(message, &segments, renderer, typing_effect, language)
        } else {
            let mut presentation = Self::new(message, &[], renderer, false, language);
            if !message.text.is_empty() {
                // Between Begin and Finish.
                presentation
                    .ops
                    .insert(1, Op::Insert(vec![(message.text.clone(), TextTag::plain())]));
            }
            presentation
        }
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn is_complete(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply operations until `budget` graphemes have been revealed or the
    /// message is done. Atomic pieces do not count against the budget.
    pub fn advance(&mut self, surface: &mut dyn DisplaySurface, budget: usize) -> PresentStatus {
        let mut budget = budget.max(1);
        while let Some(op) = self.ops.front() {
            match op {
                Op::Reveal(graphemes) => {
                    while self.revealed < graphemes.len() {
                        if budget == 0 {
                            return PresentStatus::InProgress;
                        }
                        let (grapheme, tag) = &graphemes[self.revealed];
                        surface.insert(grapheme, *tag);
                        surface.scroll_to_end();
                        self.revealed += 1;
                        budget -= 1;
                    }
                    self.revealed = 0;
                    self.ops.pop_front();
                }
                _ => {
                    if let Some(op) = self.ops.pop_front() {
                        self.apply(op, surface);
                    }
                }
            }
        }
        PresentStatus::Complete
    }

    /// Show whatever is left at once.
    pub fn finish(&mut self, surface: &mut dyn DisplaySurface) {
        while self.advance(surface, usize::MAX) == PresentStatus::InProgress {}
    }

    fn apply(&self, op: Op, surface: &mut dyn DisplaySurface) {
        match op {
            Op::Begin => surface.begin_message(self.sender, &self.header),
            Op::Insert(spans) => {
                for (text, tag) in spans {
                    surface.insert(&text, tag);
                }
            }
            Op::Block(spans) => {
                if !surface.at_line_start() {
                    surface.insert("\n", TextTag::plain());
                }
                for (text, tag) in spans {
                    surface.insert(&text, tag);
                }
                surface.insert("\n", TextTag::plain());
            }
            Op::Code { code, language } => surface.insert_code_block(&code, language.as_deref()),
            Op::Newline => surface.insert("\n", TextTag::plain()),
            Op::Reveal(spans) => {
                for (text, tag) in spans {
                    surface.insert(&text, tag);
                }
            }
            Op::Finish => surface.end_message(),
        }
        surface.scroll_to_end();
    }
}

/// Queue the operations for one segment. Returns true when the segment left
/// the surface at the start of a fresh line on its own.
fn push_segment(
    ops: &mut VecDeque<Op>,
    segment: &Segment,
    renderer: &dyn MathRenderer,
    typing_effect: bool,
) -> bool {
    let newline = |ops: &mut VecDeque<Op>| {
        if segment.ends_line {
            ops.push_back(Op::Newline);
        }
    };

    match segment.kind {
        SegmentKind::Code => {
            ops.push_back(Op::Code {
                code: segment.content.clone(),
                language: segment.language.clone(),
            });
            return true;
        }
        SegmentKind::Heading1 | SegmentKind::Heading2 | SegmentKind::Heading3 => {
            let level = match segment.kind {
                SegmentKind::Heading1 => HeadingLevel::One,
                SegmentKind::Heading2 => HeadingLevel::Two,
                _ => HeadingLevel::Three,
            };
            let spans = styled(&segment.content, |style| TextTag::Heading(level, style));
            ops.push_back(Op::Insert(spans));
            newline(ops);
        }
        SegmentKind::ListItem => {
            let split = list_marker_len(&segment.content).unwrap_or(0);
            let (marker, rest) = segment.content.split_at(split);
            let mut spans = Vec::new();
            if !marker.is_empty() {
                spans.push((marker.to_string(), TextTag::ListItem(InlineStyle::default())));
            }
            spans.extend(styled(rest, TextTag::ListItem));
            ops.push_back(Op::Insert(spans));
            newline(ops);
        }
        SegmentKind::Math => match renderer.render(segment) {
            Ok(rendered) => {
                let spans = vec![(rendered.text, TextTag::Math(rendered.display))];
                if rendered.display == MathDisplay::Block {
                    ops.push_back(Op::Block(spans));
                    return true;
                }
                ops.push_back(Op::Insert(spans));
                newline(ops);
            }
            Err(err) => {
                debug!(error = %err, "math fell back to source text");
                ops.push_back(Op::Insert(vec![(segment.content.clone(), TextTag::plain())]));
                newline(ops);
            }
        },
        SegmentKind::Prose => {
            let spans = styled(&segment.content, TextTag::Body);
            if typing_effect {
                let graphemes = spans
                    .into_iter()
                    .flat_map(|(text, tag)| {
                        text.graphemes(true)
                            .map(|g| (g.to_string(), tag))
                            .collect::<Vec<_>>()
                    })
                    .collect::<Vec<_>>();
                if !graphemes.is_empty() {
                    ops.push_back(Op::Reveal(graphemes));
                }
            } else if !spans.is_empty() {
                ops.push_back(Op::Insert(spans));
            }
            newline(ops);
        }
    }
    false
}

fn styled(text: &str, tag: impl Fn(InlineStyle) -> TextTag) -> Vec<(String, TextTag)> {
    inline_spans(text)
        .into_iter()
        .map(|(chunk, style)| (chunk, tag(style)))
        .collect()
}

/// Present `message` in one go.
pub fn present(
    message: &Message,
    renderer: &dyn MathRenderer,
    language: Language,
    surface: &mut dyn DisplaySurface,
) {
    Presentation::for_message(message, renderer, false, language).finish(surface);
}

/// A surface that accumulates unstyled text. Used for persisted transcripts
/// and one-shot terminal output.
#[derive(Debug, Default)]
pub struct PlainTextSurface {
    text: String,
}

impl PlainTextSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    fn ensure_line_start(&mut self) {
        if !self.at_line_start() {
            self.text.push('\n');
        }
    }
}

impl DisplaySurface for PlainTextSurface {
    fn begin_message(&mut self, _sender: Sender, header: &str) {
        self.ensure_line_start();
        self.text.push_str(header.trim_end());
        self.text.push('\n');
    }

    fn insert(&mut self, text: &str, tag: TextTag) {
        if matches!(tag, TextTag::ListItem(_)) && self.at_line_start() && !text.starts_with('\n')
        {
            self.text.push_str("  ");
        }
        self.text.push_str(text);
    }

    fn insert_code_block(&mut self, code: &str, _language: Option<&str>) {
        self.ensure_line_start();
        self.text.push_str(code);
        self.ensure_line_start();
    }

    fn at_line_start(&self) -> bool {
        self.text.is_empty() || self.text.ends_with('\n')
    }

    fn scroll_to_end(&mut self) {}

    fn end_message(&mut self) {
        self.ensure_line_start();
        self.text.push('\n');
    }
}

/// The whole transcript as plain text, math typeset, markup removed.
pub fn render_plain(
    transcript: &Transcript,
    renderer: &dyn MathRenderer,
    language: Language,
) -> String {
    let mut surface = PlainTextSurface::new();
    for message in transcript.messages() {
        present(message, renderer, language, &mut surface);
    }
    surface.into_string()
}
