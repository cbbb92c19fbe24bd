//! UI strings for the two supported interface languages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
}

impl Language {
    pub fn toggle(self) -> Self {
        match self {
            Language::Zh => Language::En,
            Language::En => Language::Zh,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }

    pub fn strings(self) -> &'static Strings {
        match self {
            Language::Zh => &ZH,
            Language::En => &EN,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zh" | "cn" | "chinese" | "中文" => Ok(Language::Zh),
            "en" | "english" => Ok(Language::En),
            other => Err(format!("unknown language '{other}' (expected zh or en)")),
        }
    }
}

/// Localized labels. One static table per language.
pub struct Strings {
    pub you: &'static str,
    pub system: &'static str,
    pub error_sender: &'static str,
    pub error_marker: &'static str,
    pub configure_key: &'static str,
    pub settings_updated: &'static str,
    pub input_title: &'static str,
    pub input_busy_title: &'static str,
    pub history_title: &'static str,
    pub history_empty: &'static str,
    pub help_title: &'static str,
    pub status_ready: &'static str,
    pub status_waiting: &'static str,
    pub status_typing: &'static str,
    pub unknown_command: &'static str,
    pub save_failed: &'static str,
    pub busy_notice: &'static str,
    pub key_usage: &'static str,
    pub help_text: &'static str,
}

static ZH: Strings = Strings {
    you: "你",
    system: "系统",
    error_sender: "错误",
    error_marker: "错误",
    configure_key: "请先设置 {name} API 密钥",
    settings_updated: "设置已更新",
    input_title: "输入消息 (Enter 发送, Alt+Enter 换行)",
    input_busy_title: "等待回复…",
    history_title: "聊天历史",
    history_empty: "暂无聊天记录",
    help_title: "帮助",
    status_ready: "就绪",
    status_waiting: "正在请求",
    status_typing: "正在输出 (Esc 跳过)",
    unknown_command: "未知命令",
    save_failed: "保存聊天记录失败",
    busy_notice: "正在输出回复，请稍后再试",
    key_usage: "用法: /key <deepseek|openai|claude> <密钥>",
    help_text: "按键
  Enter        发送消息
  Alt+Enter    换行
  Esc          跳过打字效果 / 关闭窗口
  PgUp/PgDn    滚动聊天记录
  F1           帮助
  F2           切换模型提供方
  F3           聊天历史
  F4           切换主题
  F5           切换语言
  Ctrl+C       退出

命令
  /provider <名称>      切换提供方
  /key <名称> <密钥>    设置 API 密钥
  /typing on|off        打字效果
  /theme  /lang  /history  /help  /quit",
};

static EN: Strings = Strings {
    you: "You",
    system: "System",
    error_sender: "Error",
    error_marker: "Error",
    configure_key: "Please configure the {name} API key first",
    settings_updated: "Settings updated",
    input_title: "Message (Enter to send, Alt+Enter for newline)",
    input_busy_title: "Waiting for reply…",
    history_title: "Chat history",
    history_empty: "No saved chats yet",
    help_title: "Help",
    status_ready: "Ready",
    status_waiting: "Requesting",
    status_typing: "Typing (Esc to skip)",
    unknown_command: "Unknown command",
    save_failed: "Failed to save chat history",
    busy_notice: "A reply is still being typed; try again when it finishes",
    key_usage: "Usage: /key <deepseek|openai|claude> <api-key>",
    help_text: "Keys
  Enter        Send the message
  Alt+Enter    Insert a newline
  Esc          Skip the typing effect / close overlay
  PgUp/PgDn    Scroll the transcript
  F1           Help
  F2           Next provider
  F3           Chat history
  F4           Toggle theme
  F5           Toggle language
  Ctrl+C       Quit

Commands
  /provider <name>      Switch provider
  /key <name> <key>     Set an API key
  /typing on|off        Typing effect
  /theme  /lang  /history  /help  /quit",
};

impl Strings {
    pub fn configure_key_notice(&self, provider_name: &str) -> String {
        self.configure_key.replace("{name}", provider_name)
    }

    pub fn error_text(&self, detail: &str) -> String {
        format!("{}: {}", self.error_marker, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_language_is_chinese() {
        assert_eq!(Language::default(), Language::Zh);
        assert_eq!(Language::Zh.toggle(), Language::En);
        assert_eq!(Language::En.toggle(), Language::Zh);
    }

    #[test]
    fn configure_notice_names_provider() {
        assert_eq!(
            Language::En.strings().configure_key_notice("Claude"),
            "Please configure the Claude API key first"
        );
        assert_eq!(
            Language::Zh.strings().configure_key_notice("DeepSeek AI"),
            "请先设置 DeepSeek AI API 密钥"
        );
    }

    #[test]
    fn error_text_uses_marker() {
        assert_eq!(Language::En.strings().error_text("boom"), "Error: boom");
        assert_eq!(Language::Zh.strings().error_text("超时"), "错误: 超时");
    }

    #[test]
    fn parses_language_codes() {
        assert_eq!("EN".parse::<Language>().unwrap(), Language::En);
        assert_eq!("zh".parse::<Language>().unwrap(), Language::Zh);
        assert!("fr".parse::<Language>().is_err());
    }
}
