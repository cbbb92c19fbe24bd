use super::*;

fn kinds_and_contents(segments: &[Segment]) -> Vec<(SegmentKind, &str)> {
    segments
        .iter()
        .map(|s| (s.kind, s.content.as_str()))
        .collect()
}

#[test]
fn heading_prose_and_fenced_code() {
    let segments = segment_message("# Title\nSome **text**\n```\nprint(1)\n```");
    assert_eq!(
        kinds_and_contents(&segments),
        vec![
            (SegmentKind::Heading1, "Title"),
            (SegmentKind::Prose, "Some **text**"),
            (SegmentKind::Code, "print(1)\n"),
        ]
    );
    assert!(segments[0].ends_line);
    assert_eq!(segments[2].language, None);
}

#[test]
fn fence_language_tag_is_captured() {
    let segments = segment_message("```rust\nfn main() {}\n```\nafter");
    assert_eq!(segments[0].kind, SegmentKind::Code);
    assert_eq!(segments[0].language.as_deref(), Some("rust"));
    assert_eq!(segments[0].content, "fn main() {}\n");
    assert!(segments[0].ends_line);
    assert_eq!(segments[1], Segment::new(SegmentKind::Prose, "after"));
}

#[test]
fn block_math_is_a_single_math_segment() {
    let segments = segment_message("Energy:\n$$E = mc^2$$\ndone");
    let math: Vec<&Segment> = segments
        .iter()
        .filter(|s| s.kind == SegmentKind::Math)
        .collect();
    assert_eq!(math.len(), 1);
    assert_eq!(math[0].content, "$$E = mc^2$$");
}

#[test]
fn inline_math_flows_within_a_line() {
    let segments = segment_message("Let $x$ be real.\nNext");
    assert_eq!(
        kinds_and_contents(&segments),
        vec![
            (SegmentKind::Prose, "Let "),
            (SegmentKind::Math, "$x$"),
            (SegmentKind::Prose, " be real."),
            (SegmentKind::Prose, "Next"),
        ]
    );
    assert!(!segments[0].ends_line);
    assert!(!segments[1].ends_line);
    assert!(segments[2].ends_line);
}

#[test]
fn text_after_inline_math_is_not_a_list_item() {
    let segments = segment_message("$a$- b");
    assert_eq!(segments[1], Segment::new(SegmentKind::Prose, "- b"));
}

#[test]
fn text_without_delimiters_is_prose_per_line() {
    let text = "first line\nsecond line\n\nfourth";
    let segments = segment_message(text);
    assert_eq!(segments.len(), 4);
    assert!(segments.iter().all(|s| s.kind == SegmentKind::Prose));
    assert_eq!(segments[2].content, "");
    assert_eq!(reassemble(&segments), text);
}

#[test]
fn plain_single_line_is_one_prose_segment() {
    let text = "Nothing special here, just words.";
    assert_eq!(
        segment_message(text),
        vec![Segment::new(SegmentKind::Prose, text)]
    );
}

#[test]
fn round_trip_with_math_and_trailing_newline() {
    let text = "a $x^2$ b \\(y\\)\n$$z$$\nend\n";
    assert_eq!(reassemble(&segment_message(text)), text);
}

#[test]
fn lists_are_normalized_and_numbering_kept() {
    let segments = segment_message("- one\n* two\n3. three");
    assert_eq!(
        kinds_and_contents(&segments),
        vec![
            (SegmentKind::ListItem, "• one"),
            (SegmentKind::ListItem, "• two"),
            (SegmentKind::ListItem, "3. three"),
        ]
    );
}

#[test]
fn inline_code_is_restored_in_place() {
    let segments = segment_message("- run `cargo build` now");
    assert_eq!(
        segments,
        vec![Segment::new(SegmentKind::ListItem, "• run `cargo build` now")]
    );
}

#[test]
fn inline_code_protects_line_prefix() {
    let segments = segment_message("`# not a heading`");
    assert_eq!(segments[0].kind, SegmentKind::Prose);
    assert_eq!(segments[0].content, "`# not a heading`");
}

#[test]
fn code_block_line_discards_surrounding_text() {
    let segments = segment_message("see ```sh\nls\n``` above");
    assert_eq!(
        kinds_and_contents(&segments),
        vec![(SegmentKind::Code, "ls\n")]
    );
}

#[test]
fn two_blocks_on_one_line_emit_two_code_segments() {
    let segments = segment_message("```\na\n``````\nb\n```\ntail");
    assert_eq!(
        kinds_and_contents(&segments),
        vec![
            (SegmentKind::Code, "a\n"),
            (SegmentKind::Code, "b\n"),
            (SegmentKind::Prose, "tail"),
        ]
    );
    assert!(!segments[0].ends_line);
    assert!(segments[1].ends_line);
}

#[test]
fn unterminated_fence_falls_back_to_prose() {
    let segments = segment_message("```python\nprint(1)");
    assert_eq!(
        kinds_and_contents(&segments),
        vec![
            (SegmentKind::Prose, "```python"),
            (SegmentKind::Prose, "print(1)"),
        ]
    );
}

#[test]
fn empty_input_has_no_segments() {
    assert!(segment_message("").is_empty());
}

#[test]
fn placeholders_never_leak() {
    let inputs = [
        "```\ncode\n```",
        "inline `a` and `b`",
        "`x ```\ny\n``` z`",
        "# H `c`\n- `d`\n```js\nlet x = `t`;\n```",
    ];
    for input in inputs {
        let segments = segment_message(input);
        assert_eq!(
            leaked_placeholder(&segments),
            None,
            "leak for {input:?}: {segments:?}"
        );
    }
}

#[test]
fn token_shaped_user_text_comes_back_verbatim() {
    let input = "\u{E000}B0:0\u{E001} looks like a token";
    let segments = segment_message(input);
    assert_eq!(segments, vec![Segment::new(SegmentKind::Prose, input)]);
}

#[test]
fn list_marker_len_handles_both_markers() {
    assert_eq!(list_marker_len("• item"), Some("• ".len()));
    assert_eq!(list_marker_len("42. item"), Some(4));
    assert_eq!(list_marker_len("item"), None);
}
