use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Pre-wrap lines to `width` columns at word boundaries, breaking tokens that
/// are wider than a whole line. Rendering the result without ratatui's own
/// wrapping keeps line counts (and so scroll offsets) exact.
pub fn prewrap_lines(lines: &[Line<'_>], width: u16) -> Vec<Line<'static>> {
    let width = width as usize;
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        if width == 0 || line.width() <= width {
            out.push(owned(line));
            continue;
        }
        wrap_line(line, width, &mut out);
    }
    out
}

fn owned(line: &Line<'_>) -> Line<'static> {
    let spans: Vec<Span<'static>> = line
        .spans
        .iter()
        .map(|s| Span::styled(s.content.to_string(), s.style))
        .collect();
    let mut result = Line::from(spans).style(line.style);
    result.alignment = line.alignment;
    result
}

struct Wrapper<'o> {
    out: &'o mut Vec<Line<'static>>,
    template: Line<'static>,
    current: Vec<Span<'static>>,
    current_width: usize,
    width: usize,
}

impl Wrapper<'_> {
    fn append(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        self.current_width += text.width();
        if let Some(last) = self.current.last_mut() {
            if last.style == style {
                last.content.to_mut().push_str(text);
                return;
            }
        }
        self.current.push(Span::styled(text.to_string(), style));
    }

    /// Finish the current row at a wrap point; trailing blanks are dropped.
    fn break_line(&mut self) {
        while let Some(last) = self.current.last_mut() {
            let trimmed = last.content.trim_end().len();
            if trimmed == 0 {
                self.current.pop();
                continue;
            }
            last.content.to_mut().truncate(trimmed);
            break;
        }
        self.emit();
    }

    fn emit(&mut self) {
        let mut line = self.template.clone();
        line.spans = std::mem::take(&mut self.current);
        self.out.push(line);
        self.current_width = 0;
    }

    fn push_token(&mut self, token: &str, style: Style) {
        let token_width = token.width();
        if self.current_width + token_width <= self.width {
            self.append(token, style);
            return;
        }
        if token.trim().is_empty() {
            // Break here; the whitespace is swallowed by the line break.
            self.break_line();
            return;
        }
        if token_width <= self.width {
            if self.current_width > 0 {
                self.break_line();
            }
            self.append(token, style);
            return;
        }
        for grapheme in token.graphemes(true) {
            let gw = grapheme.width();
            if self.current_width + gw > self.width && self.current_width > 0 {
                self.break_line();
            }
            self.append(grapheme, style);
        }
    }
}

fn wrap_line(line: &Line<'_>, width: usize, out: &mut Vec<Line<'static>>) {
    let mut template = Line::default().style(line.style);
    template.alignment = line.alignment;
    let mut wrapper = Wrapper {
        out,
        template,
        current: Vec::new(),
        current_width: 0,
        width,
    };
    for span in &line.spans {
        for token in span.content.split_word_bounds() {
            wrapper.push_token(token, span.style);
        }
    }
    if !wrapper.current.is_empty() {
        wrapper.emit();
    }
}
