use std::sync::LazyLock;

use regex::Regex;

/// Math delimiters in priority order: `$$…$$`, `$…$`, `\[…\]`, `\(…\)`.
static MATH_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"\$\$[^$]+\$\$").expect("valid block math pattern"),
        Regex::new(r"\$[^$]+\$").expect("valid inline math pattern"),
        Regex::new(r"\\\[[^\]]+\\\]").expect("valid display math pattern"),
        Regex::new(r"\\\([^)]+\\\)").expect("valid paren math pattern"),
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Run<'a> {
    Text(&'a str),
    Math(&'a str),
}

/// Split `text` into alternating text and math runs in source order. Each
/// pattern only looks inside text runs left by the higher-priority ones.
pub(crate) fn split_math(text: &str) -> Vec<Run<'_>> {
    let mut runs = vec![Run::Text(text)];
    for pattern in MATH_PATTERNS.iter() {
        let mut next = Vec::with_capacity(runs.len());
        for run in runs {
            match run {
                Run::Math(_) => next.push(run),
                Run::Text(body) => split_with(pattern, body, &mut next),
            }
        }
        runs = next;
    }
    runs
}

fn split_with<'a>(pattern: &Regex, body: &'a str, out: &mut Vec<Run<'a>>) {
    let mut last = 0;
    for found in pattern.find_iter(body) {
        if found.start() > last {
            out.push(Run::Text(&body[last..found.start()]));
        }
        out.push(Run::Math(found.as_str()));
        last = found.end();
    }
    if last < body.len() {
        out.push(Run::Text(&body[last..]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_math_wins_over_inline() {
        assert_eq!(
            split_math("a $$x+y$$ b"),
            vec![Run::Text("a "), Run::Math("$$x+y$$"), Run::Text(" b")]
        );
    }

    #[test]
    fn all_four_delimiters_are_found_in_order() {
        let runs = split_math(r"$a$ and \(b\) then \[c\]");
        assert_eq!(
            runs,
            vec![
                Run::Math("$a$"),
                Run::Text(" and "),
                Run::Math(r"\(b\)"),
                Run::Text(" then "),
                Run::Math(r"\[c\]"),
            ]
        );
    }

    #[test]
    fn math_runs_are_not_resplit() {
        // The inline-dollar pattern must not look inside the block run.
        let runs = split_math(r"$$\(q\)$$");
        assert_eq!(runs, vec![Run::Math(r"$$\(q\)$$")]);
    }

    #[test]
    fn whitespace_between_math_is_kept() {
        assert_eq!(
            split_math("$a$ $b$"),
            vec![Run::Math("$a$"), Run::Text(" "), Run::Math("$b$")]
        );
    }

    #[test]
    fn unterminated_math_stays_text() {
        assert_eq!(split_math("cost is $5"), vec![Run::Text("cost is $5")]);
        assert_eq!(split_math(r"\[ x"), vec![Run::Text(r"\[ x")]);
    }
}
