use grakmat::{
    lines_with_separators, position,
    position::{bound_length, bound_length_with},
    Position,
};

fn assert_lines(text: &str, expected: &[&str]) {
    assert_eq!(lines_with_separators(text), expected, "splitting {text:?}");
}

#[test]
fn line_feeds() {
    assert_lines("a\nb\nc", &["a\n", "b\n", "c"]);
    assert_lines("a\n\nc", &["a\n", "\n", "c"]);
    assert_lines("a\nb\nc\n", &["a\n", "b\n", "c\n"]);
}

#[test]
fn carriage_returns() {
    assert_lines("a\rb\rc", &["a\r", "b\r", "c"]);
    assert_lines("a\r\rc", &["a\r", "\r", "c"]);
    assert_lines("a\rb\rc\r", &["a\r", "b\r", "c\r"]);
}

#[test]
fn crlf_pairs() {
    assert_lines("a\r\nb\r\nc", &["a\r\n", "b\r\n", "c"]);
    assert_lines("a\r\n\r\nc", &["a\r\n", "\r\n", "c"]);
    assert_lines("a\r\nb\r\nc\r\n", &["a\r\n", "b\r\n", "c\r\n"]);
}

#[test]
fn positions_in_a_three_line_text() {
    let text = "ab\ncd\nef";
    let cases = [
        (0, Position::new(1, 1, "ab")),
        (1, Position::new(1, 2, "ab")),
        (2, Position::new(1, 3, "ab")),
        (3, Position::new(2, 1, "cd")),
        (4, Position::new(2, 2, "cd")),
        (5, Position::new(2, 3, "cd")),
        (8, Position::new(3, 3, "ef")),
    ];
    for (offset, expected) in cases {
        assert_eq!(position(text, offset), expected, "offset {offset}");
    }
}

#[test]
fn crlf_position() {
    assert_eq!(position("a\r\nb\r\nc", 3), Position::new(2, 1, "b"));
}

#[test]
fn zero_based_accessors() {
    let pos = position("ab\ncd", 4);
    assert_eq!((pos.line_index(), pos.column_index()), (1, 1));
}

#[test]
fn length_bounding() {
    assert_eq!(bound_length("abc", 5), "abc");
    assert_eq!(bound_length("1234567890", 5), "12345...");
    assert_eq!(
        bound_length_with("1234567890", 5, ", too long input"),
        "12345, too long input"
    );
}
