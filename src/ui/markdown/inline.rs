use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InlineStyle {
    pub strong: bool,
    pub emphasis: bool,
    pub code: bool,
    pub strike: bool,
}

impl InlineStyle {
    pub fn is_plain(self) -> bool {
        self == InlineStyle::default()
    }
}

/// Inline markdown styling of a single line. Anything that parses as block
/// structure (quotes, rules, indented code…) comes back as unstyled text.
/// Leading and trailing whitespace is preserved.
pub fn inline_spans(text: &str) -> Vec<(String, InlineStyle)> {
    let core = text.trim();
    if core.is_empty() {
        return plain(text);
    }
    let start = text.len() - text.trim_start().len();
    let lead = &text[..start];
    let trail = &text[start + core.len()..];

    let Some(styled) = parse_inline(core) else {
        return plain(text);
    };

    let mut spans = Vec::with_capacity(styled.len() + 2);
    push_merged(&mut spans, lead, InlineStyle::default());
    for (chunk, style) in styled {
        push_merged(&mut spans, &chunk, style);
    }
    push_merged(&mut spans, trail, InlineStyle::default());
    spans
}

fn plain(text: &str) -> Vec<(String, InlineStyle)> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![(text.to_string(), InlineStyle::default())]
    }
}

fn push_merged(spans: &mut Vec<(String, InlineStyle)>, text: &str, style: InlineStyle) {
    if text.is_empty() {
        return;
    }
    if let Some((last, last_style)) = spans.last_mut() {
        if *last_style == style {
            last.push_str(text);
            return;
        }
    }
    spans.push((text.to_string(), style));
}

fn parse_inline(text: &str) -> Option<Vec<(String, InlineStyle)>> {
    let mut out: Vec<(String, InlineStyle)> = Vec::new();
    let mut strong = 0usize;
    let mut emphasis = 0usize;
    let mut strike = 0usize;

    let current = |strong: usize, emphasis: usize, strike: usize| InlineStyle {
        strong: strong > 0,
        emphasis: emphasis > 0,
        strike: strike > 0,
        code: false,
    };

    for event in Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Start(Tag::Paragraph) | Event::End(TagEnd::Paragraph) => {}
            Event::Start(Tag::Strong) => strong += 1,
            Event::End(TagEnd::Strong) => strong = strong.saturating_sub(1),
            Event::Start(Tag::Emphasis) => emphasis += 1,
            Event::End(TagEnd::Emphasis) => emphasis = emphasis.saturating_sub(1),
            Event::Start(Tag::Strikethrough) => strike += 1,
            Event::End(TagEnd::Strikethrough) => strike = strike.saturating_sub(1),
            // Link text is shown, the destination is not.
            Event::Start(Tag::Link { .. }) | Event::End(TagEnd::Link) => {}
            Event::Text(t) | Event::InlineHtml(t) => {
                push_merged(&mut out, &t, current(strong, emphasis, strike));
            }
            Event::Code(t) => {
                let style = InlineStyle {
                    code: true,
                    ..current(strong, emphasis, strike)
                };
                push_merged(&mut out, &t, style);
            }
            Event::SoftBreak | Event::HardBreak => {
                push_merged(&mut out, " ", current(strong, emphasis, strike));
            }
            _ => return None,
        }
    }
    Some(out)
}
