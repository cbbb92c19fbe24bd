use ratatui::style::{Color, Modifier, Style};

use crate::core::providers::ProviderId;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    // Overall background color to paint the full frame
    pub background_color: Color,

    // Message styles
    pub header_style: Style,
    pub user_text_style: Style,
    pub assistant_text_style: Style,
    pub system_text_style: Style,
    pub error_text_style: Style,

    // Markdown and math
    pub h1_style: Style,
    pub h2_style: Style,
    pub h3_style: Style,
    pub list_marker_style: Style,
    pub inline_code_style: Style,
    pub md_codeblock_bg: Option<Color>,
    pub math_inline_style: Style,
    pub math_block_style: Style,

    // Chrome
    pub title_style: Style,
    pub input_border_style: Style,
    pub input_title_style: Style,
    pub input_text_style: Style,
    pub input_disabled_style: Style,
    pub status_style: Style,
    pub overlay_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        let bg = Color::Rgb(0x1e, 0x1e, 0x1e);
        let fg = Color::Rgb(0xe6, 0xe6, 0xe6);
        Theme {
            name: "dark",
            background_color: bg,

            header_style: Style::default()
                .fg(Color::Rgb(0x8a, 0x8a, 0x8a))
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Rgb(0x7d, 0xd3, 0xfc)),
            assistant_text_style: Style::default().fg(fg),
            system_text_style: Style::default().fg(Color::Rgb(0x9c, 0xa3, 0xaf)),
            error_text_style: Style::default().fg(Color::Rgb(0xf8, 0x71, 0x71)),

            h1_style: Style::default()
                .fg(Color::Rgb(0xfb, 0xbf, 0x24))
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            h2_style: Style::default()
                .fg(Color::Rgb(0xfc, 0xd3, 0x4d))
                .add_modifier(Modifier::BOLD),
            h3_style: Style::default()
                .fg(Color::Rgb(0xfd, 0xe6, 0x8a))
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
            list_marker_style: Style::default().fg(Color::Rgb(0x60, 0xa5, 0xfa)),
            inline_code_style: Style::default()
                .fg(Color::Rgb(0xf4, 0xa2, 0x61))
                .bg(Color::Rgb(0x2d, 0x2d, 0x2d)),
            md_codeblock_bg: Some(Color::Rgb(0x2b, 0x2b, 0x2b)),
            math_inline_style: Style::default()
                .fg(Color::Rgb(0xc0, 0x84, 0xfc))
                .add_modifier(Modifier::ITALIC),
            math_block_style: Style::default()
                .fg(Color::Rgb(0xc0, 0x84, 0xfc))
                .add_modifier(Modifier::BOLD),

            title_style: Style::default().fg(Color::Gray),
            input_border_style: Style::default().fg(Color::Gray),
            input_title_style: Style::default().fg(Color::Gray),
            input_text_style: Style::default().fg(fg),
            input_disabled_style: Style::default().fg(Color::DarkGray),
            status_style: Style::default().fg(Color::DarkGray),
            overlay_style: Style::default().fg(fg).bg(Color::Rgb(0x26, 0x26, 0x26)),
        }
    }

    pub fn light() -> Self {
        let bg = Color::Rgb(0xfa, 0xfa, 0xfa);
        let fg = Color::Rgb(0x1f, 0x29, 0x37);
        Theme {
            name: "light",
            background_color: bg,

            header_style: Style::default()
                .fg(Color::Rgb(0x6b, 0x72, 0x80))
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Rgb(0x1d, 0x4e, 0xd8)),
            assistant_text_style: Style::default().fg(fg),
            system_text_style: Style::default().fg(Color::Rgb(0x6b, 0x72, 0x80)),
            error_text_style: Style::default().fg(Color::Rgb(0xb9, 0x1c, 0x1c)),

            h1_style: Style::default()
                .fg(Color::Rgb(0x92, 0x40, 0x0e))
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            h2_style: Style::default()
                .fg(Color::Rgb(0xb4, 0x53, 0x09))
                .add_modifier(Modifier::BOLD),
            h3_style: Style::default()
                .fg(Color::Rgb(0xd9, 0x77, 0x06))
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
            list_marker_style: Style::default().fg(Color::Rgb(0x25, 0x63, 0xeb)),
            inline_code_style: Style::default()
                .fg(Color::Rgb(0xc2, 0x41, 0x0c))
                .bg(Color::Rgb(0xf0, 0xf0, 0xf0)),
            md_codeblock_bg: Some(Color::Rgb(0xf0, 0xf0, 0xf0)),
            math_inline_style: Style::default()
                .fg(Color::Rgb(0x7e, 0x22, 0xce))
                .add_modifier(Modifier::ITALIC),
            math_block_style: Style::default()
                .fg(Color::Rgb(0x7e, 0x22, 0xce))
                .add_modifier(Modifier::BOLD),

            title_style: Style::default().fg(Color::DarkGray),
            input_border_style: Style::default().fg(Color::Black),
            input_title_style: Style::default().fg(Color::DarkGray),
            input_text_style: Style::default().fg(fg),
            input_disabled_style: Style::default().fg(Color::Gray),
            status_style: Style::default().fg(Color::Gray),
            overlay_style: Style::default().fg(fg).bg(Color::Rgb(0xee, 0xee, 0xee)),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::dark_default()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    /// The other built-in theme.
    pub fn toggled(&self) -> Self {
        if self.name == "light" {
            Self::dark_default()
        } else {
            Self::light()
        }
    }

    pub fn md_codeblock_bg_color(&self) -> Option<Color> {
        self.md_codeblock_bg
    }

    pub fn base_style(&self) -> Style {
        Style::default()
            .bg(self.background_color)
            .fg(self.assistant_text_style.fg.unwrap_or(Color::Reset))
    }
}

pub fn provider_brand_color(provider: ProviderId) -> Color {
    match provider {
        ProviderId::DeepSeek => Color::Rgb(0x3b, 0x82, 0xf6),
        ProviderId::OpenAi => Color::Rgb(0x10, 0xa3, 0x7f),
        ProviderId::Claude => Color::Rgb(0xff, 0x7f, 0x50),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_and_toggle() {
        assert_eq!(Theme::from_name("Light").unwrap().name, "light");
        assert!(Theme::from_name("dracula").is_none());
        assert_eq!(Theme::dark_default().toggled().name, "light");
        assert_eq!(Theme::light().toggled().name, "dark");
    }

    #[test]
    fn heading_tiers_are_distinct() {
        let theme = Theme::dark_default();
        assert_ne!(theme.h1_style, theme.h2_style);
        assert_ne!(theme.h2_style, theme.h3_style);
        assert_ne!(theme.h3_style, theme.assistant_text_style);
    }

    #[test]
    fn brand_colors() {
        assert_eq!(
            provider_brand_color(ProviderId::DeepSeek),
            Color::Rgb(59, 130, 246)
        );
        assert_eq!(
            provider_brand_color(ProviderId::OpenAi),
            Color::Rgb(16, 163, 127)
        );
        assert_eq!(
            provider_brand_color(ProviderId::Claude),
            Color::Rgb(255, 127, 80)
        );
    }
}
