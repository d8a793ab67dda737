//! Property-based tests for positions and the core combinators.

use grakmat::{char_, lines_with_separators, position, string, Parser, ParserExt, Source};
use proptest::prelude::*;

proptest! {
    #[test]
    fn lines_concatenate_to_the_text(text in "[ab\r\n]{0,40}") {
        prop_assert_eq!(lines_with_separators(&text).concat(), text);
    }

    #[test]
    fn position_matches_manual_count(text in "[ab\n]{0,40}", seed in any::<usize>()) {
        let offset = seed % (text.len() + 1);
        // Past the end, a trailing terminator belongs to the last line.
        prop_assume!(!(offset == text.len() && text.ends_with('\n')));

        let before = &text[..offset];
        let line = 1 + before.matches('\n').count();
        let column = 1 + before.rfind('\n').map_or(offset, |i| offset - i - 1);
        let pos = position(&text, offset);
        prop_assert_eq!(pos.line_number, line);
        prop_assert_eq!(pos.column_number, column);
        prop_assert!(!pos.line_text.contains('\n'));
    }

    #[test]
    fn and_consumes_both_parts(a in 0usize..10, b in 0usize..10) {
        let text = format!("{}{}c", "a".repeat(a), "b".repeat(b));
        let source = Source::new(&text);
        let parser = char_('a').zero_or_more().and(char_('b').zero_or_more());
        let parsed = parser.eat(&source, &text).unwrap();
        prop_assert_eq!(parsed.value.0.len(), a);
        prop_assert_eq!(parsed.value.1.len(), b);
        prop_assert_eq!(parsed.remainder, "c");
    }

    #[test]
    fn or_prefers_the_left(text in "[ab]{1,6}") {
        let left = string("a").map(|_| 1);
        let either = string("a").map(|_| 1).or(char_('a').map(|_| 2));
        let source = Source::new(&text);
        match left.eat(&source, &text) {
            Ok(parsed) => {
                let chosen = either.eat(&source, &text).unwrap();
                prop_assert_eq!(chosen.value, parsed.value);
                prop_assert_eq!(chosen.remainder, parsed.remainder);
            }
            Err(_) => prop_assert!(either.eat(&source, &text).is_err()),
        }
    }

    #[test]
    fn at_least_counts_matches(matches in 0usize..8, min in 0usize..8) {
        let text = format!("{}!", "x".repeat(matches));
        let source = Source::new(&text);
        let result = char_('x').at_least(min).eat(&source, &text);
        if matches >= min {
            let parsed = result.unwrap();
            prop_assert_eq!(parsed.value.len(), matches);
            prop_assert_eq!(parsed.remainder, "!");
        } else {
            prop_assert!(result.is_err());
        }
    }

    #[test]
    fn naming_is_idempotent(text in "[a-z]{0,3}") {
        let once = char_('0').with_name("zero").parse(&text);
        let twice = char_('0').with_name("zero").with_name("zero").parse(&text);
        let (once, twice) = (once.unwrap_err(), twice.unwrap_err());
        prop_assert_eq!(once.expected(), twice.expected());
        prop_assert_eq!(once.error().tag(), twice.error().tag());
        prop_assert_eq!(once.offset(), twice.offset());
    }
}
