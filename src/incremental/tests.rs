//! Unit tests for incremental re-parsing.

use pretty_assertions::assert_eq;

use super::incremental::{parse_incremental, relex, ChangedRange, Edit, ReuseCursor};
use crate::{
    config::{Dialect, ParseOptions},
    lexer::lexer::tokenize_significant,
    parser::parser::{parse, parse_tokens, parse_with_options},
};

const TWO_FUNCTIONS: &str = "fn a() {\n    x\n}\n\nfn b() {\n    y\n}\n";

/// Replaces `removed_len` bytes at `start` with `inserted`.
fn apply(source: &str, start: usize, removed_len: usize, inserted: &str) -> (String, Edit) {
    let mut edited = String::from(&source[..start]);
    edited.push_str(inserted);
    edited.push_str(&source[start + removed_len..]);
    (edited, Edit::new(start, removed_len, inserted.len()))
}

fn assert_matches_fresh_parse(source: &str, start: usize, removed_len: usize, inserted: &str) {
    let previous = parse(source).unwrap();
    let (edited, edit) = apply(source, start, removed_len, inserted);

    let incremental = parse_incremental(&edited, &previous, &[edit]).unwrap();
    assert_eq!(incremental, parse(&edited).unwrap());
}

#[test]
fn test_single_edit_range() {
    let range = ChangedRange::from_edits(20, &[Edit::new(5, 2, 4)]).unwrap();
    assert_eq!(
        range,
        ChangedRange {
            start: 5,
            old_end: 7,
            new_end: 9
        }
    );
    assert_eq!(range.delta(), 2);
}

#[test]
fn test_merged_edit_range() {
    // Second edit lies after the first, in post-edit coordinates
    let range = ChangedRange::from_edits(20, &[Edit::new(5, 1, 2), Edit::new(10, 2, 1)]).unwrap();
    assert_eq!(
        range,
        ChangedRange {
            start: 5,
            old_end: 11,
            new_end: 11
        }
    );

    // Second edit lies before the first
    let range = ChangedRange::from_edits(20, &[Edit::new(5, 1, 2), Edit::new(0, 1, 0)]).unwrap();
    assert_eq!(
        range,
        ChangedRange {
            start: 0,
            old_end: 6,
            new_end: 6
        }
    );
}

#[test]
fn test_edit_out_of_bounds() {
    assert_eq!(ChangedRange::from_edits(4, &[Edit::new(3, 2, 0)]), None);
    assert_eq!(
        ChangedRange::from_edits(4, &[Edit::new(0, 0, 2), Edit::new(5, 1, 0)]),
        Some(ChangedRange {
            start: 0,
            old_end: 4,
            new_end: 5
        })
    );
}

#[test]
fn test_no_edits() {
    let range = ChangedRange::from_edits(7, &[]).unwrap();
    assert_eq!(
        range,
        ChangedRange {
            start: 7,
            old_end: 7,
            new_end: 7
        }
    );
    assert!(range.agrees_with("let x 1", "let x 1"));
    assert!(!range.agrees_with("let x 1", "let y 1"));
}

#[test]
fn test_range_agreement() {
    let (edited, edit) = apply("abcdef", 2, 2, "xyz");
    let range = ChangedRange::from_edits(6, &[edit]).unwrap();

    assert!(range.agrees_with("abcdef", &edited));
    assert!(!range.agrees_with("abcdef", "abxyzeg"));
    assert!(!range.agrees_with("abcdef", "abxyzef!"));
}

#[test]
fn test_relex_matches_full_lex() {
    let cases = [
        (TWO_FUNCTIONS, 13, 1, "xyz"),
        (TWO_FUNCTIONS, 0, 2, "struct"),
        (TWO_FUNCTIONS, 14, 0, " // note"),
        (TWO_FUNCTIONS, 13, 0, "\""),
        ("let s = \"abc\"\nlet t = 1", 8, 1, ""),
        ("x 0x1f y", 4, 0, "g"),
    ];

    for (source, start, removed_len, inserted) in cases {
        let (edited, edit) = apply(source, start, removed_len, inserted);
        let range = ChangedRange::from_edits(source.len(), &[edit]).unwrap();

        let relexed = relex(&edited, &tokenize_significant(source), &range);
        assert_eq!(relexed, tokenize_significant(&edited), "edit {:?}", edit);
    }
}

#[test]
fn test_edit_inside_body() {
    assert_matches_fresh_parse(TWO_FUNCTIONS, 31, 1, "y + 1");
}

#[test]
fn test_insert_new_item() {
    assert_matches_fresh_parse(TWO_FUNCTIONS, 16, 0, "struct P { x: i32 }\n");
}

#[test]
fn test_delete_closing_brace() {
    assert_matches_fresh_parse(TWO_FUNCTIONS, 15, 1, "");
}

#[test]
fn test_open_unterminated_string() {
    assert_matches_fresh_parse(TWO_FUNCTIONS, 13, 0, "\"");
}

#[test]
fn test_edit_that_repairs_an_error() {
    let broken = "fn a( {\n}\nfn b() {\n    y\n}\n";
    assert_matches_fresh_parse(broken, 5, 0, ")");
}

#[test]
fn test_sequential_edits() {
    let previous = parse(TWO_FUNCTIONS).unwrap();
    let (first, first_edit) = apply(TWO_FUNCTIONS, 13, 1, "value");
    let (second, second_edit) = apply(&first, 0, 0, "import std.io\n");

    let incremental = parse_incremental(&second, &previous, &[first_edit, second_edit]).unwrap();
    assert_eq!(incremental, parse(&second).unwrap());
}

#[test]
fn test_wrong_edits_fall_back_to_full_parse() {
    let previous = parse(TWO_FUNCTIONS).unwrap();
    let edited = TWO_FUNCTIONS.replace('y', "zz");

    let incremental = parse_incremental(&edited, &previous, &[Edit::new(0, 1, 1)]).unwrap();
    assert_eq!(incremental, parse(&edited).unwrap());
}

#[test]
fn test_previous_dialect_is_kept() {
    let options = ParseOptions::new(Dialect::Extended);
    let source = "fn f() {\n    let x\n}\n";
    let previous = parse_with_options(source, options).unwrap();
    assert!(!previous.has_errors());

    let (edited, edit) = apply(source, 17, 0, "y");
    let incremental = parse_incremental(&edited, &previous, &[edit]).unwrap();
    assert_eq!(incremental.options(), options);
    assert_eq!(incremental, parse_with_options(&edited, options).unwrap());
}

#[test]
fn test_items_before_change_are_reused() {
    let previous = parse(TWO_FUNCTIONS).unwrap();
    let (edited, edit) = apply(TWO_FUNCTIONS, 31, 1, "yy");
    let range = ChangedRange::from_edits(TWO_FUNCTIONS.len(), &[edit]).unwrap();

    let tokens = relex(&edited, previous.tokens(), &range);
    let mut cursor = ReuseCursor::new(&previous, range);
    let tree = parse_tokens(&edited, tokens, previous.options(), Some(&mut cursor)).unwrap();

    assert_eq!(cursor.stats().reused, 1);
    assert_eq!(cursor.stats().reparsed, 1);
    assert_eq!(tree, parse(&edited).unwrap());
}

#[test]
fn test_items_after_change_are_reused_and_shifted() {
    let previous = parse(TWO_FUNCTIONS).unwrap();
    let (edited, edit) = apply(TWO_FUNCTIONS, 13, 1, "xyz");
    let range = ChangedRange::from_edits(TWO_FUNCTIONS.len(), &[edit]).unwrap();

    let tokens = relex(&edited, previous.tokens(), &range);
    let mut cursor = ReuseCursor::new(&previous, range);
    let tree = parse_tokens(&edited, tokens, previous.options(), Some(&mut cursor)).unwrap();

    assert_eq!(cursor.stats().reused, 1);
    assert_eq!(cursor.stats().reparsed, 1);
    assert_eq!(tree, parse(&edited).unwrap());

    let second = &tree.root().children[1].node;
    assert_eq!(second.text(&edited), "fn b() {\n    y\n}");
}

#[test]
fn test_whitespace_edit_inside_item_is_not_reused() {
    let previous = parse(TWO_FUNCTIONS).unwrap();
    let (edited, edit) = apply(TWO_FUNCTIONS, 8, 0, "\n\n");
    let range = ChangedRange::from_edits(TWO_FUNCTIONS.len(), &[edit]).unwrap();

    let tokens = relex(&edited, previous.tokens(), &range);
    let mut cursor = ReuseCursor::new(&previous, range);
    let tree = parse_tokens(&edited, tokens, previous.options(), Some(&mut cursor)).unwrap();

    assert_eq!(cursor.stats().reused, 1);
    assert_eq!(tree, parse(&edited).unwrap());
}
