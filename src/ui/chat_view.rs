//! The transcript pane: a [`DisplaySurface`] backed by styled ratatui lines.

use ratatui::layout::Alignment;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::message::Sender;
use crate::ui::markdown::{list_marker_len, InlineStyle};
use crate::ui::math::MathDisplay;
use crate::ui::presenter::{DisplaySurface, HeadingLevel, TextTag};
use crate::ui::theme::Theme;
use crate::utils::scroll::prewrap_lines;
use crate::utils::syntax::highlight_code_block;

const LIST_INDENT: &str = "  ";

pub struct ChatView {
    lines: Vec<Line<'static>>,
    theme: Theme,
    syntax: bool,
    sender: Sender,
    follow_tail: bool,
    scroll_offset: usize,
    last_max_scroll: usize,
    version: u64,
    wrapped: Option<WrapCache>,
}

struct WrapCache {
    version: u64,
    width: u16,
    lines: Vec<Line<'static>>,
}

impl ChatView {
    pub fn new(theme: Theme, syntax: bool) -> Self {
        Self {
            lines: Vec::new(),
            theme,
            syntax,
            sender: Sender::System,
            follow_tail: true,
            scroll_offset: 0,
            last_max_scroll: 0,
            version: 0,
            wrapped: None,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Swap the theme and drop all content; the caller re-presents the
    /// transcript.
    pub fn reset(&mut self, theme: Theme) {
        self.theme = theme;
        self.lines.clear();
        self.follow_tail = true;
        self.touch();
    }

    pub fn is_following(&self) -> bool {
        self.follow_tail
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    /// Unstyled text of every logical line.
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    /// Wrapped lines for a `width` x `height` viewport, plus the first visible
    /// row.
    pub fn layout(&mut self, width: u16, height: u16) -> (&[Line<'static>], usize) {
        let stale = match &self.wrapped {
            Some(cache) => cache.version != self.version || cache.width != width,
            None => true,
        };
        if stale {
            self.wrapped = Some(WrapCache {
                version: self.version,
                width,
                lines: prewrap_lines(&self.lines, width),
            });
        }
        let total = self.wrapped.as_ref().map_or(0, |c| c.lines.len());
        self.last_max_scroll = total.saturating_sub(height as usize);
        if self.follow_tail || self.scroll_offset >= self.last_max_scroll {
            self.scroll_offset = self.last_max_scroll;
            self.follow_tail = true;
        }
        let lines = self
            .wrapped
            .as_ref()
            .map(|c| c.lines.as_slice())
            .unwrap_or(&[]);
        (lines, self.scroll_offset)
    }

    pub fn scroll_up(&mut self, rows: usize) {
        if self.follow_tail {
            self.scroll_offset = self.last_max_scroll;
        }
        self.follow_tail = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(rows);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(rows);
        if self.scroll_offset >= self.last_max_scroll {
            self.follow_tail = true;
        }
    }

    fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    fn current_line(&mut self) -> &mut Line<'static> {
        if self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    fn new_line(&mut self) {
        self.lines.push(Line::default());
    }

    fn sender_style(&self) -> Style {
        match self.sender {
            Sender::User => self.theme.user_text_style,
            Sender::Assistant(_) => self.theme.assistant_text_style,
            Sender::System => self.theme.system_text_style,
            Sender::Error => self.theme.error_text_style,
        }
    }

    fn inline_style(&self, base: Style, inline: InlineStyle) -> Style {
        let mut style = base;
        if inline.code {
            style = style.patch(self.theme.inline_code_style);
        }
        if inline.strong {
            style = style.add_modifier(Modifier::BOLD);
        }
        if inline.emphasis {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if inline.strike {
            style = style.add_modifier(Modifier::CROSSED_OUT);
        }
        style
    }

    fn style_for(&self, text: &str, tag: TextTag) -> Style {
        match tag {
            TextTag::Body(inline) => self.inline_style(self.sender_style(), inline),
            TextTag::Heading(level, inline) => {
                let base = match level {
                    HeadingLevel::One => self.theme.h1_style,
                    HeadingLevel::Two => self.theme.h2_style,
                    HeadingLevel::Three => self.theme.h3_style,
                };
                self.inline_style(base, inline)
            }
            TextTag::ListItem(inline) => {
                if inline.is_plain() && list_marker_len(text) == Some(text.len()) {
                    self.theme.list_marker_style
                } else {
                    self.inline_style(self.sender_style(), inline)
                }
            }
            TextTag::Math(MathDisplay::Inline) => self.theme.math_inline_style,
            TextTag::Math(MathDisplay::Block) => self.theme.math_block_style,
        }
    }

    fn push_span(&mut self, text: &str, tag: TextTag) {
        let style = self.style_for(text, tag);
        let at_start = self.at_line_start();
        let line = self.current_line();
        if at_start && matches!(tag, TextTag::ListItem(_)) {
            line.spans.push(Span::raw(LIST_INDENT));
        }
        if tag == TextTag::Math(MathDisplay::Block) {
            line.alignment = Some(Alignment::Center);
        }
        match line.spans.last_mut() {
            Some(last) if last.style == style => last.content.to_mut().push_str(text),
            _ => line.spans.push(Span::styled(text.to_string(), style)),
        }
    }
}

impl DisplaySurface for ChatView {
    fn begin_message(&mut self, sender: Sender, header: &str) {
        self.sender = sender;
        if !self.at_line_start() {
            self.new_line();
        }
        let header = Span::styled(header.trim_end().to_string(), self.theme.header_style);
        *self.current_line() = Line::from(header);
        self.new_line();
        self.touch();
    }

    fn insert(&mut self, text: &str, tag: TextTag) {
        let mut pieces = text.split('\n');
        if let Some(first) = pieces.next() {
            if !first.is_empty() {
                self.push_span(first, tag);
            }
        }
        for piece in pieces {
            self.new_line();
            if !piece.is_empty() {
                self.push_span(piece, tag);
            }
        }
        self.touch();
    }

    fn insert_code_block(&mut self, code: &str, language: Option<&str>) {
        if self.at_line_start() {
            self.lines.pop();
        }
        let highlighted = if self.syntax {
            highlight_code_block(language.unwrap_or(""), code, &self.theme)
        } else {
            None
        };
        let lines = highlighted.unwrap_or_else(|| {
            let mut style = self.sender_style();
            if let Some(bg) = self.theme.md_codeblock_bg_color() {
                style = style.bg(bg);
            }
            code.lines()
                .map(|l| Line::from(Span::styled(l.to_string(), style)))
                .collect()
        });
        self.lines.extend(lines);
        self.new_line();
        self.touch();
    }

    fn at_line_start(&self) -> bool {
        self.lines.last().is_none_or(|line| line.spans.is_empty())
    }

    fn scroll_to_end(&mut self) {
        self.follow_tail = true;
    }

    fn end_message(&mut self) {
        if !self.at_line_start() {
            self.new_line();
        }
        self.touch();
    }
}
