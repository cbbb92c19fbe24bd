//! Protect-extract-restore tokens for code spans.
//!
//! Tokens look like `\u{E000}B<nonce>:<index>\u{E001}`. The nonce is chosen
//! so that the token prefix does not occur anywhere in the source text.

use std::sync::atomic::{AtomicU64, Ordering};

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

static FALLBACK_NONCE: AtomicU64 = AtomicU64::new(0x5eed);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Block,
    Inline,
}

impl TokenKind {
    fn tag(self) -> char {
        match self {
            TokenKind::Block => 'B',
            TokenKind::Inline => 'I',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CodeBlock {
    pub language: Option<String>,
    pub body: String,
    /// The whole fence as it appeared in the source.
    pub original: String,
}

#[derive(Debug)]
pub(crate) struct PlaceholderSet {
    nonce: String,
    blocks: Vec<CodeBlock>,
    inlines: Vec<String>,
}

fn random_nonce() -> String {
    let mut bytes = [0u8; 6];
    if getrandom::fill(&mut bytes).is_ok() {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    } else {
        format!("{:x}", FALLBACK_NONCE.fetch_add(1, Ordering::Relaxed))
    }
}

impl PlaceholderSet {
    pub fn for_source(source: &str) -> Self {
        let mut nonce = random_nonce();
        while source.contains(&format!("{OPEN}B{nonce}"))
            || source.contains(&format!("{OPEN}I{nonce}"))
        {
            nonce = random_nonce();
        }
        Self {
            nonce,
            blocks: Vec::new(),
            inlines: Vec::new(),
        }
    }

    fn token(&self, kind: TokenKind, index: usize) -> String {
        format!("{OPEN}{}{}:{index}{CLOSE}", kind.tag(), self.nonce)
    }

    fn prefix(&self, kind: TokenKind) -> String {
        format!("{OPEN}{}{}:", kind.tag(), self.nonce)
    }

    pub fn protect_block(&mut self, block: CodeBlock) -> String {
        self.blocks.push(block);
        self.token(TokenKind::Block, self.blocks.len() - 1)
    }

    /// `original` is the backtick-delimited span; block tokens inside it are
    /// expanded back first so restoring it never reintroduces a token.
    pub fn protect_inline(&mut self, original: &str) -> String {
        let expanded = self.expand_blocks(original);
        self.inlines.push(expanded);
        self.token(TokenKind::Inline, self.inlines.len() - 1)
    }

    pub fn block(&self, index: usize) -> Option<&CodeBlock> {
        self.blocks.get(index)
    }

    /// Byte ranges and indices of every `kind` token in `line`, in order.
    pub fn find(&self, line: &str, kind: TokenKind) -> Vec<(std::ops::Range<usize>, usize)> {
        let prefix = self.prefix(kind);
        let mut found = Vec::new();
        let mut cursor = 0;
        while let Some(rel) = line[cursor..].find(&prefix) {
            let start = cursor + rel;
            let digits_start = start + prefix.len();
            let Some(close_rel) = line[digits_start..].find(CLOSE) else {
                break;
            };
            let digits_end = digits_start + close_rel;
            let end = digits_end + CLOSE.len_utf8();
            if let Ok(index) = line[digits_start..digits_end].parse::<usize>() {
                found.push((start..end, index));
            }
            cursor = end;
        }
        found
    }

    fn expand_blocks(&self, text: &str) -> String {
        self.replace_tokens(text, TokenKind::Block, |idx| {
            self.blocks.get(idx).map(|b| b.original.as_str())
        })
    }

    pub fn restore_inline(&self, text: &str) -> String {
        self.replace_tokens(text, TokenKind::Inline, |idx| {
            self.inlines.get(idx).map(String::as_str)
        })
    }

    fn replace_tokens<'s>(
        &'s self,
        text: &str,
        kind: TokenKind,
        lookup: impl Fn(usize) -> Option<&'s str>,
    ) -> String {
        let tokens = self.find(text, kind);
        if tokens.is_empty() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for (range, index) in tokens {
            out.push_str(&text[last..range.start]);
            match lookup(index) {
                Some(original) => out.push_str(original),
                None => out.push_str(&text[range.clone()]),
            }
            last = range.end;
        }
        out.push_str(&text[last..]);
        out
    }
}

/// True when `text` contains something shaped like a placeholder token.
pub fn contains_placeholder(text: &str) -> bool {
    let Some(open) = text.find(OPEN) else {
        return false;
    };
    let rest = &text[open + OPEN.len_utf8()..];
    let mut chars = rest.chars();
    matches!(chars.next(), Some('B') | Some('I')) && rest.contains(CLOSE)
}
