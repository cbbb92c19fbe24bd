use crate::ui::theme::Theme;
use ratatui::style::{Color as TuiColor, Style};
use ratatui::text::{Line, Span};
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, OnceLock};

// Bounded FIFO cache of highlighted blocks, keyed by (lang, hash).

fn hash_code(lang: &str, code: &str, theme_sig: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    lang.hash(&mut hasher);
    code.hash(&mut hasher);
    theme_sig.hash(&mut hasher);
    hasher.finish()
}

struct SimpleCache {
    map: HashMap<(String, u64), Vec<Line<'static>>>,
    order: VecDeque<(String, u64)>,
    cap: usize,
}

impl SimpleCache {
    fn new(cap: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            cap,
        }
    }

    fn get(&self, k: &(String, u64)) -> Option<Vec<Line<'static>>> {
        self.map.get(k).cloned()
    }

    fn put(&mut self, k: (String, u64), v: Vec<Line<'static>>) {
        if !self.map.contains_key(&k) {
            self.order.push_back(k.clone());
        }
        self.map.insert(k, v);
        while self.map.len() > self.cap {
            match self.order.pop_front() {
                Some(old) => {
                    self.map.remove(&old);
                }
                None => break,
            }
        }
    }
}

const CACHE_CAPACITY: usize = 64;

static SYNTAX_CACHE: OnceLock<Mutex<SimpleCache>> = OnceLock::new();

fn cache() -> &'static Mutex<SimpleCache> {
    SYNTAX_CACHE.get_or_init(|| Mutex::new(SimpleCache::new(CACHE_CAPACITY)))
}

fn is_dark_background(c: &TuiColor) -> bool {
    match c {
        TuiColor::Rgb(r, g, b) => {
            let br = 0.2126 * (*r as f32) + 0.7152 * (*g as f32) + 0.0722 * (*b as f32);
            br < 128.0
        }
        TuiColor::White => false,
        _ => true,
    }
}

fn normalize_lang_hint(s: &str) -> String {
    let t = s.trim().to_ascii_lowercase();
    match t.as_str() {
        "py" | "python" | "python3" => "python".into(),
        "bash" | "sh" | "zsh" | "shell" | "console" => "bash".into(),
        "js" | "javascript" | "jsx" => "javascript".into(),
        "ts" | "tsx" | "typescript" => "typescript".into(),
        "yaml" | "yml" => "yaml".into(),
        "rust" | "rs" => "rust".into(),
        "c" | "h" => "c".into(),
        "cpp" | "c++" | "cc" | "cxx" | "hpp" => "cpp".into(),
        "csharp" | "c#" | "cs" => "cs".into(),
        "kotlin" | "kt" => "kotlin".into(),
        "latex" | "tex" => "latex".into(),
        other => other.into(),
    }
}

pub(crate) fn pick_syntect_theme_name_for_theme(theme: &Theme) -> &'static str {
    if is_dark_background(&theme.background_color) {
        "base16-ocean.dark"
    } else {
        "InspiredGitHub"
    }
}

fn theme_signature(theme: &Theme, chosen_syntect: &str) -> String {
    format!(
        "{}|{:?}|{:?}",
        chosen_syntect,
        theme.md_codeblock_bg_color(),
        theme.background_color
    )
}

/// Highlight `code` as `lang_hint` (empty for plain text). Returns `None` when
/// syntect has no usable theme or fails on a line; callers then fall back to
/// unhighlighted lines.
pub fn highlight_code_block(
    lang_hint: &str,
    code: &str,
    theme: &Theme,
) -> Option<Vec<Line<'static>>> {
    static SYNTAX_SET: OnceLock<syntect::parsing::SyntaxSet> = OnceLock::new();
    static THEME_SET: OnceLock<syntect::highlighting::ThemeSet> = OnceLock::new();
    let ps = SYNTAX_SET.get_or_init(syntect::parsing::SyntaxSet::load_defaults_newlines);
    let ts = THEME_SET.get_or_init(syntect::highlighting::ThemeSet::load_defaults);

    let lang_norm = normalize_lang_hint(lang_hint);
    let theme_name = pick_syntect_theme_name_for_theme(theme);
    let syn_theme = ts
        .themes
        .get(theme_name)
        .or_else(|| ts.themes.get("base16-ocean.dark"))?;

    let key = (
        lang_norm.clone(),
        hash_code(&lang_norm, code, &theme_signature(theme, theme_name)),
    );
    if let Some(lines) = cache().lock().ok().and_then(|c| c.get(&key)) {
        return Some(lines);
    }

    let syntax = ps
        .find_syntax_by_token(&lang_norm)
        .unwrap_or_else(|| ps.find_syntax_plain_text());
    let mut highlighter = syntect::easy::HighlightLines::new(syntax, syn_theme);
    let bg = theme.md_codeblock_bg_color();

    let mut out: Vec<Line<'static>> = Vec::new();
    for line in syntect::util::LinesWithEndings::from(code) {
        let ranges = highlighter.highlight_line(line, ps).ok()?;
        let mut spans: Vec<Span<'static>> = Vec::new();
        for (style, text) in ranges {
            let frag = text.strip_suffix('\n').unwrap_or(text);
            let frag = frag.strip_suffix('\r').unwrap_or(frag);
            if frag.is_empty() {
                continue;
            }
            let fg = style.foreground;
            let mut st = Style::default().fg(TuiColor::Rgb(fg.r, fg.g, fg.b));
            if let Some(bgcol) = bg {
                st = st.bg(bgcol);
            }
            spans.push(Span::styled(frag.to_string(), st));
        }
        out.push(Line::from(spans));
    }

    if let Ok(mut guard) = cache().lock() {
        guard.put(key, out.clone());
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn normalize_lang_hint_maps_common_aliases() {
        assert_eq!(normalize_lang_hint("py"), "python");
        assert_eq!(normalize_lang_hint("JS"), "javascript");
        assert_eq!(normalize_lang_hint("yml"), "yaml");
        assert_eq!(normalize_lang_hint("rs"), "rust");
        assert_eq!(normalize_lang_hint("tex"), "latex");
    }

    #[test]
    fn dark_background_heuristic_basic() {
        assert!(is_dark_background(&Color::Black));
        assert!(!is_dark_background(&Color::White));
        assert!(is_dark_background(&Color::Rgb(10, 10, 10)));
        assert!(!is_dark_background(&Color::Rgb(240, 240, 240)));
    }

    #[test]
    fn theme_selection_matches_brightness() {
        assert_eq!(
            pick_syntect_theme_name_for_theme(&Theme::dark_default()),
            "base16-ocean.dark"
        );
        assert_eq!(
            pick_syntect_theme_name_for_theme(&Theme::light()),
            "InspiredGitHub"
        );
    }

    #[test]
    fn highlighting_keeps_one_line_per_source_line() {
        let theme = Theme::dark_default();
        let lines = highlight_code_block("rust", "fn main() {\n    let x = 1;\n}\n", &theme)
            .expect("highlighting failed");
        assert_eq!(lines.len(), 3);
        let text: String = lines[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "    let x = 1;");
        assert!(lines[1]
            .spans
            .iter()
            .all(|s| s.style.bg == theme.md_codeblock_bg_color()));
    }
}
