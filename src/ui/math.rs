//! Typesets the LaTeX subset found in chat replies into plain Unicode.
//!
//! A terminal cannot draw typeset images, so math is rendered as text using
//! Unicode letters, operators and super/subscript forms. Anything outside the
//! supported subset is an error and the caller shows the raw source instead.

use std::error::Error as StdError;
use std::fmt;

use crate::ui::markdown::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathDisplay {
    /// `$$…$$` or `\[…\]`: own line, centered.
    Block,
    /// `$…$` or `\(…\)`: flows with the surrounding prose.
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMath {
    pub text: String,
    pub display: MathDisplay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathRenderError {
    MissingDelimiters,
    Empty,
    UnknownCommand(String),
    UnbalancedGroup,
    MissingArgument(String),
    TooDeep,
}

impl fmt::Display for MathRenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathRenderError::MissingDelimiters => write!(f, "math is not wrapped in delimiters"),
            MathRenderError::Empty => write!(f, "math expression is empty"),
            MathRenderError::UnknownCommand(name) => write!(f, "unsupported command \\{name}"),
            MathRenderError::UnbalancedGroup => write!(f, "unbalanced braces"),
            MathRenderError::MissingArgument(name) => write!(f, "{name} is missing an argument"),
            MathRenderError::TooDeep => write!(f, "nested deeper than {MAX_DEPTH} levels"),
        }
    }
}

impl StdError for MathRenderError {}

pub trait MathRenderer {
    fn render(&self, segment: &Segment) -> Result<RenderedMath, MathRenderError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeMathRenderer;

impl MathRenderer for UnicodeMathRenderer {
    fn render(&self, segment: &Segment) -> Result<RenderedMath, MathRenderError> {
        let (body, display) = strip_delimiters(&segment.content)?;
        let text = typeset(body)?;
        Ok(RenderedMath { text, display })
    }
}

/// Remove the outer delimiter pair and report which display mode it selects.
pub fn strip_delimiters(raw: &str) -> Result<(&str, MathDisplay), MathRenderError> {
    let raw = raw.trim();
    let pairs: [(&str, &str, MathDisplay); 4] = [
        ("$$", "$$", MathDisplay::Block),
        ("\\[", "\\]", MathDisplay::Block),
        ("\\(", "\\)", MathDisplay::Inline),
        ("$", "$", MathDisplay::Inline),
    ];
    for (open, close, display) in pairs {
        if raw.len() >= open.len() + close.len() && raw.starts_with(open) && raw.ends_with(close) {
            return Ok((&raw[open.len()..raw.len() - close.len()], display));
        }
    }
    Err(MathRenderError::MissingDelimiters)
}

/// Typeset a delimiter-free LaTeX body.
pub fn typeset(body: &str) -> Result<String, MathRenderError> {
    if body.trim().is_empty() {
        return Err(MathRenderError::Empty);
    }
    let mut parser = Parser {
        chars: body.chars().collect(),
        pos: 0,
        depth: 0,
    };
    let rendered = parser.parse_sequence(false)?;
    let collapsed = rendered.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(MathRenderError::Empty);
    }
    Ok(collapsed)
}

/// Groups, arguments and commands each recurse through `parse_atom`.
const MAX_DEPTH: usize = 64;

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

type Rendered = Result<String, MathRenderError>;

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Parse until end of input, or until the `}` closing the current group.
    fn parse_sequence(&mut self, in_group: bool) -> Rendered {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            match c {
                '}' if in_group => {
                    self.pos += 1;
                    return Ok(out);
                }
                '}' => return Err(MathRenderError::UnbalancedGroup),
                '^' | '_' => {
                    self.pos += 1;
                    let name = if c == '^' { "^" } else { "_" };
                    let arg = self.parse_argument(name)?;
                    out.push_str(&script(c == '^', &arg));
                }
                _ => {
                    let atom = self.parse_atom()?;
                    out.push_str(&atom);
                }
            }
        }
        if in_group {
            Err(MathRenderError::UnbalancedGroup)
        } else {
            Ok(out)
        }
    }

    fn parse_atom(&mut self) -> Rendered {
        if self.depth >= MAX_DEPTH {
            return Err(MathRenderError::TooDeep);
        }
        self.depth += 1;
        let atom = self.parse_atom_inner();
        self.depth -= 1;
        atom
    }

    fn parse_atom_inner(&mut self) -> Rendered {
        let Some(c) = self.bump() else {
            return Ok(String::new());
        };
        Ok(match c {
            '{' => self.parse_sequence(true)?,
            '}' => return Err(MathRenderError::UnbalancedGroup),
            '\\' => self.parse_command()?,
            '\'' => "′".to_string(),
            '&' | '~' => " ".to_string(),
            c if c.is_whitespace() => " ".to_string(),
            c => c.to_string(),
        })
    }

    /// A required argument: a group, a command, or a single character.
    fn parse_argument(&mut self, owner: &str) -> Rendered {
        self.skip_whitespace();
        match self.peek() {
            None | Some('}') | Some('^') | Some('_') => {
                Err(MathRenderError::MissingArgument(owner.to_string()))
            }
            Some(_) => self.parse_atom(),
        }
    }

    /// The verbatim text of a `{…}` group, used by `\text` and friends.
    fn raw_group(&mut self, owner: &str) -> Rendered {
        self.skip_whitespace();
        match self.bump() {
            Some('{') => {}
            Some(c) => return Ok(c.to_string()),
            None => return Err(MathRenderError::MissingArgument(owner.to_string())),
        }
        let mut depth = 1usize;
        let mut out = String::new();
        while let Some(c) = self.bump() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                }
                _ => {}
            }
            out.push(c);
        }
        Err(MathRenderError::UnbalancedGroup)
    }

    fn optional_bracket(&mut self) -> Result<Option<String>, MathRenderError> {
        self.skip_whitespace();
        if self.peek() != Some('[') {
            return Ok(None);
        }
        self.pos += 1;
        let mut out = String::new();
        while let Some(c) = self.bump() {
            if c == ']' {
                return Ok(Some(out.trim().to_string()));
            }
            out.push(c);
        }
        Err(MathRenderError::UnbalancedGroup)
    }

    fn command_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek().filter(char::is_ascii_alphabetic) {
            name.push(c);
            self.pos += 1;
        }
        if name.is_empty() {
            if let Some(c) = self.bump() {
                name.push(c);
            }
        }
        name
    }

    fn parse_command(&mut self) -> Rendered {
        let name = self.command_name();
        if let Some(symbol) = symbol(&name) {
            return Ok(symbol.to_string());
        }
        if FUNCTION_NAMES.contains(&name.as_str()) {
            return Ok(name);
        }

        match name.as_str() {
            "frac" | "dfrac" | "tfrac" => {
                let numerator = self.parse_argument(&name)?;
                let denominator = self.parse_argument(&name)?;
                Ok(fraction(&numerator, &denominator))
            }
            "binom" => {
                let n = self.parse_argument(&name)?;
                let k = self.parse_argument(&name)?;
                Ok(format!("C({}, {})", n.trim(), k.trim()))
            }
            "sqrt" => {
                let index = self.optional_bracket()?;
                let radicand = self.parse_argument(&name)?;
                Ok(root(index.as_deref(), &radicand))
            }
            "text" | "textrm" | "textit" | "textbf" | "mbox" | "operatorname" => {
                self.raw_group(&name)
            }
            "mathrm" | "mathit" | "mathbf" | "mathsf" | "mathtt" | "mathcal" | "mathfrak"
            | "boldsymbol" => self.parse_argument(&name),
            "mathbb" => {
                let arg = self.parse_argument(&name)?;
                Ok(arg.chars().map(blackboard).collect())
            }
            "left" | "right" => {
                self.skip_whitespace();
                if self.peek() == Some('.') {
                    self.pos += 1;
                    return Ok(String::new());
                }
                self.parse_argument(&name)
            }
            "not" => {
                let arg = self.parse_argument(&name)?;
                Ok(match arg.as_str() {
                    "=" => "≠".to_string(),
                    "∈" => "∉".to_string(),
                    "⊂" => "⊄".to_string(),
                    _ => format!("{arg}\u{338}"),
                })
            }
            "begin" | "end" => {
                let env = self.raw_group(&name)?;
                let opening = name == "begin";
                Ok(environment_bracket(&env, opening).to_string())
            }
            _ => {
                if let Some(mark) = accent(&name) {
                    let arg = self.parse_argument(&name)?;
                    let wide = name.starts_with("over") || name.starts_with("under");
                    return Ok(apply_accent(&arg, mark, wide));
                }
                Err(MathRenderError::UnknownCommand(name))
            }
        }
    }
}

const FUNCTION_NAMES: &[&str] = &[
    "sin", "cos", "tan", "cot", "sec", "csc", "arcsin", "arccos", "arctan", "sinh", "cosh",
    "tanh", "coth", "log", "ln", "lg", "exp", "lim", "liminf", "limsup", "max", "min", "sup",
    "inf", "det", "gcd", "deg", "arg", "dim", "ker", "hom", "Pr", "mod", "bmod",
];

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" => "ϵ",
        "varepsilon" => "ε",
        "zeta" => "ζ",
        "eta" => "η",
        "theta" => "θ",
        "vartheta" => "ϑ",
        "iota" => "ι",
        "kappa" => "κ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "xi" => "ξ",
        "omicron" => "ο",
        "pi" => "π",
        "varpi" => "ϖ",
        "rho" => "ρ",
        "varrho" => "ϱ",
        "sigma" => "σ",
        "varsigma" => "ς",
        "tau" => "τ",
        "upsilon" => "υ",
        "phi" => "ϕ",
        "varphi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Xi" => "Ξ",
        "Pi" => "Π",
        "Sigma" => "Σ",
        "Upsilon" => "Υ",
        "Phi" => "Φ",
        "Psi" => "Ψ",
        "Omega" => "Ω",

        "times" => "×",
        "cdot" => "⋅",
        "div" => "÷",
        "pm" => "±",
        "mp" => "∓",
        "ast" => "∗",
        "star" => "⋆",
        "circ" => "∘",
        "bullet" => "•",
        "oplus" => "⊕",
        "otimes" => "⊗",
        "leq" | "le" => "≤",
        "geq" | "ge" => "≥",
        "neq" | "ne" => "≠",
        "ll" => "≪",
        "gg" => "≫",
        "approx" => "≈",
        "equiv" => "≡",
        "sim" => "∼",
        "simeq" => "≃",
        "cong" => "≅",
        "propto" => "∝",
        "infty" => "∞",
        "partial" => "∂",
        "nabla" => "∇",
        "sum" => "∑",
        "prod" => "∏",
        "coprod" => "∐",
        "int" => "∫",
        "iint" => "∬",
        "iiint" => "∭",
        "oint" => "∮",
        "forall" => "∀",
        "exists" => "∃",
        "nexists" => "∄",
        "in" => "∈",
        "notin" => "∉",
        "ni" => "∋",
        "subset" => "⊂",
        "subseteq" => "⊆",
        "supset" => "⊃",
        "supseteq" => "⊇",
        "cup" => "∪",
        "cap" => "∩",
        "bigcup" => "⋃",
        "bigcap" => "⋂",
        "emptyset" | "varnothing" => "∅",
        "setminus" => "∖",
        "land" | "wedge" => "∧",
        "lor" | "vee" => "∨",
        "neg" | "lnot" => "¬",
        "to" | "rightarrow" => "→",
        "gets" | "leftarrow" => "←",
        "Rightarrow" | "implies" => "⇒",
        "Leftarrow" => "⇐",
        "leftrightarrow" => "↔",
        "Leftrightarrow" | "iff" => "⇔",
        "mapsto" => "↦",
        "longrightarrow" => "⟶",
        "uparrow" => "↑",
        "downarrow" => "↓",
        "cdots" => "⋯",
        "ldots" | "dots" => "…",
        "vdots" => "⋮",
        "ddots" => "⋱",
        "angle" => "∠",
        "perp" => "⊥",
        "parallel" => "∥",
        "mid" => "∣",
        "langle" => "⟨",
        "rangle" => "⟩",
        "lfloor" => "⌊",
        "rfloor" => "⌋",
        "lceil" => "⌈",
        "rceil" => "⌉",
        "lvert" | "rvert" | "vert" => "|",
        "Vert" | "|" => "‖",
        "hbar" => "ℏ",
        "ell" => "ℓ",
        "Re" => "ℜ",
        "Im" => "ℑ",
        "aleph" => "ℵ",
        "prime" => "′",
        "degree" => "°",
        "therefore" => "∴",
        "because" => "∵",
        "quad" | "qquad" | "," | ":" | ";" | " " => " ",
        "!" | "displaystyle" | "textstyle" | "limits" | "nolimits" | "big" | "Big" | "bigg"
        | "Bigg" | "bigl" | "bigr" | "Bigl" | "Bigr" => "",
        "\\" => "; ",
        "{" => "{",
        "}" => "}",
        "%" => "%",
        "$" => "$",
        "&" => "&",
        "#" => "#",
        "_" => "_",
        _ => return None,
    })
}

fn blackboard(c: char) -> char {
    match c {
        'C' => 'ℂ',
        'H' => 'ℍ',
        'N' => 'ℕ',
        'P' => 'ℙ',
        'Q' => 'ℚ',
        'R' => 'ℝ',
        'Z' => 'ℤ',
        other => other,
    }
}

fn accent(name: &str) -> Option<char> {
    Some(match name {
        "hat" | "widehat" => '\u{302}',
        "tilde" | "widetilde" => '\u{303}',
        "bar" => '\u{304}',
        "overline" => '\u{305}',
        "dot" => '\u{307}',
        "ddot" => '\u{308}',
        "vec" | "overrightarrow" => '\u{20D7}',
        "underline" => '\u{332}',
        _ => return None,
    })
}

fn apply_accent(arg: &str, mark: char, every_char: bool) -> String {
    let mut out = String::with_capacity(arg.len() * 2);
    let last_visible = arg.char_indices().rev().find(|(_, c)| !c.is_whitespace());
    for (idx, c) in arg.char_indices() {
        out.push(c);
        let marked = if every_char {
            !c.is_whitespace()
        } else {
            last_visible.is_some_and(|(last, _)| last == idx)
        };
        if marked {
            out.push(mark);
        }
    }
    out
}

fn environment_bracket(env: &str, opening: bool) -> &'static str {
    match (env.trim(), opening) {
        ("pmatrix", true) => "(",
        ("pmatrix", false) => ")",
        ("bmatrix", true) => "[",
        ("bmatrix", false) => "]",
        ("Bmatrix", true) => "{",
        ("Bmatrix", false) => "}",
        ("vmatrix", _) => "|",
        ("Vmatrix", _) => "‖",
        _ => " ",
    }
}

fn is_simple(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '.')
}

fn fraction(numerator: &str, denominator: &str) -> String {
    let vulgar = match (numerator.trim(), denominator.trim()) {
        ("1", "2") => Some("½"),
        ("1", "3") => Some("⅓"),
        ("2", "3") => Some("⅔"),
        ("1", "4") => Some("¼"),
        ("3", "4") => Some("¾"),
        ("1", "5") => Some("⅕"),
        ("1", "8") => Some("⅛"),
        _ => None,
    };
    if let Some(v) = vulgar {
        return v.to_string();
    }
    let wrap = |part: &str| {
        if is_simple(part) {
            part.trim().to_string()
        } else {
            format!("({})", part.trim())
        }
    };
    format!("{}/{}", wrap(numerator), wrap(denominator))
}

fn root(index: Option<&str>, radicand: &str) -> String {
    let sign = match index {
        None | Some("") | Some("2") => "√".to_string(),
        Some("3") => "∛".to_string(),
        Some("4") => "∜".to_string(),
        Some(n) => format!("{}√", script(true, n)),
    };
    let radicand = radicand.trim();
    if radicand.chars().count() == 1 || is_simple(radicand) {
        format!("{sign}{radicand}")
    } else {
        format!("{sign}({radicand})")
    }
}

fn superscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' | '−' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'a' => 'ᵃ',
        'b' => 'ᵇ',
        'c' => 'ᶜ',
        'd' => 'ᵈ',
        'e' => 'ᵉ',
        'f' => 'ᶠ',
        'g' => 'ᵍ',
        'h' => 'ʰ',
        'i' => 'ⁱ',
        'j' => 'ʲ',
        'k' => 'ᵏ',
        'l' => 'ˡ',
        'm' => 'ᵐ',
        'n' => 'ⁿ',
        'o' => 'ᵒ',
        'p' => 'ᵖ',
        'r' => 'ʳ',
        's' => 'ˢ',
        't' => 'ᵗ',
        'u' => 'ᵘ',
        'v' => 'ᵛ',
        'w' => 'ʷ',
        'x' => 'ˣ',
        'y' => 'ʸ',
        'z' => 'ᶻ',
        'A' => 'ᴬ',
        'B' => 'ᴮ',
        'D' => 'ᴰ',
        'E' => 'ᴱ',
        'G' => 'ᴳ',
        'H' => 'ᴴ',
        'I' => 'ᴵ',
        'J' => 'ᴶ',
        'K' => 'ᴷ',
        'L' => 'ᴸ',
        'M' => 'ᴹ',
        'N' => 'ᴺ',
        'O' => 'ᴼ',
        'P' => 'ᴾ',
        'R' => 'ᴿ',
        'T' => 'ᵀ',
        'U' => 'ᵁ',
        'V' => 'ⱽ',
        'W' => 'ᵂ',
        'α' => 'ᵅ',
        'β' => 'ᵝ',
        'γ' => 'ᵞ',
        'δ' => 'ᵟ',
        'θ' => 'ᶿ',
        'ϕ' | 'φ' => 'ᵠ',
        'χ' => 'ᵡ',
        '′' => '′',
        '*' | '∗' => '*',
        _ => return None,
    })
}

fn subscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' | '−' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'h' => 'ₕ',
        'i' => 'ᵢ',
        'j' => 'ⱼ',
        'k' => 'ₖ',
        'l' => 'ₗ',
        'm' => 'ₘ',
        'n' => 'ₙ',
        'o' => 'ₒ',
        'p' => 'ₚ',
        'r' => 'ᵣ',
        's' => 'ₛ',
        't' => 'ₜ',
        'u' => 'ᵤ',
        'v' => 'ᵥ',
        'x' => 'ₓ',
        'β' => 'ᵦ',
        'γ' => 'ᵧ',
        'ρ' => 'ᵨ',
        'ϕ' | 'φ' => 'ᵩ',
        'χ' => 'ᵪ',
        _ => return None,
    })
}

/// Raise or lower `arg`. Falls back to `^x` / `^(xy)` when some character
/// has no Unicode script form.
fn script(sup: bool, arg: &str) -> String {
    let arg = arg.trim();
    let map = if sup { superscript } else { subscript };
    let mapped: Option<String> = arg.chars().map(map).collect();
    match mapped {
        Some(text) if !text.is_empty() => text,
        _ => {
            let marker = if sup { '^' } else { '_' };
            if arg.chars().count() == 1 {
                format!("{marker}{arg}")
            } else {
                format!("{marker}({arg})")
            }
        }
    }
}
