//! A grammar-definition language, parsed into an [`ast::Node`](Node) tree.
//!
//! ```text
//! grammar digits;
//! main = (digit)+ { digits.join() };
//! fragment digit: (Char) = [0-9];
//! ```
//!
//! The first rule after the grammar name is the main rule and must carry a
//! code block; other rules may omit it. Expressions combine base expressions
//! with the operators below, all right-associative and of equal precedence:
//!
//! | syntax     | node         |
//! |------------|--------------|
//! | `a b`      | `and`        |
//! | `a, b`     | `_and_`      |
//! | `a \| b`   | `or`         |
//! | `a > b`    | `then`       |
//! | `a -> b`   | `_then_`     |
//! | `a < b`    | `before`     |
//! | `a <- b`   | `_before_`   |
//!
//! A parenthesized expression may be followed by a count: `!`, `?`, `*`,
//! `+`, `{n}`, `{n,}` or `{n,m}`. Prefixing the count with `-` selects the
//! whitespace-skipping variant (`_zeroOrMore_` and so on).

use std::path::Path;

use once_cell::sync::Lazy;

use super::{collect_string, one_of};
use crate::{
    ast::Node,
    error::{Error, SyntaxError},
    parser::{BoxedParser, Parser, ParserExt},
    primitives::{any_of, char_, except, string},
    reference::reference,
    rules::{
        ASTERISK, CARET, COLON, COMMA, DOUBLE_QUOTE, EQUALS_SIGN, EXCLAMATION_MARK,
        GREATER_THAN_SIGN, IDENTIFIER, LEFT_BRACE, LEFT_BRACKET, LEFT_PAREN, LESS_THAN_SIGN,
        MINUS, NUMBER, OPTIONAL_SPACES, PLUS, QUESTION_MARK, QUOTE, RIGHT_BRACE, RIGHT_BRACKET,
        RIGHT_PAREN, SEMICOLON, SPACES, VERTICAL_BAR,
    },
};

// ============================================================================
// LITERALS
// ============================================================================

fn string_character() -> BoxedParser<char> {
    let escaped = char_('\\').then(any_of("\"'\\bnrt")).map(|c| match c {
        'b' => '\u{8}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        other => other,
    });
    except("\"\\").or(escaped).boxed()
}

fn group_character() -> BoxedParser<char> {
    let escaped = char_('\\').then(any_of("^]\\-bnrt")).map(|c| match c {
        'b' => '\u{8}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        other => other,
    });
    except("]\\").or(escaped).with_name("character").boxed()
}

/// Contents of a character group: single characters and `a-z` ranges.
fn group_items() -> BoxedParser<Vec<Node>> {
    let range = group_character()
        .before(MINUS.clone())
        .and(group_character())
        .map(|(first, last)| {
            Node::branch(
                "range",
                vec![
                    Node::with_value("firstChar", first),
                    Node::with_value("lastChar", last),
                ],
            )
        })
        .with_name("range expression");
    let single = group_character().map(|c| Node::with_value("char", c));
    range.or(single).one_or_more().boxed()
}

static PARSER_CREATOR: Lazy<BoxedParser<Node>> = Lazy::new(|| {
    let string_literal = DOUBLE_QUOTE
        .clone()
        .then(string_character().zero_or_more())
        .before(DOUBLE_QUOTE.clone())
        .map(|chars| Node::with_value("string", collect_string(chars)))
        .with_name("string literal")
        .boxed();
    let character_literal = QUOTE
        .clone()
        .then(string_character())
        .before(QUOTE.clone())
        .map(|c| Node::with_value("string", c))
        .with_name("character literal")
        .boxed();
    let excluding = LEFT_BRACKET
        .clone()
        .then(CARET.clone())
        .then(group_items())
        .before(RIGHT_BRACKET.clone())
        .map(|chars| Node::branch("except", chars))
        .with_name("excluding group")
        .boxed();
    let including = LEFT_BRACKET
        .clone()
        .then(group_items())
        .before(RIGHT_BRACKET.clone())
        .map(|chars| Node::branch("anyOf", chars))
        .with_name("including group")
        .boxed();
    let any_character = ASTERISK
        .clone()
        .map(|_| Node::leaf("anyChar"))
        .with_name("any character")
        .boxed();
    one_of(
        string_literal,
        [character_literal, excluding, including, any_character],
    )
    .with_name("parser creator")
    .boxed()
});

// ============================================================================
// EXPRESSIONS
// ============================================================================

/// What follows a parenthesized expression: a count combinator name and its
/// numeric arguments.
struct Suffix {
    combinator: String,
    counts: Vec<Node>,
}

impl Suffix {
    fn plain(combinator: &str) -> Self {
        Self {
            combinator: combinator.to_string(),
            counts: Vec::new(),
        }
    }

    fn spaced(self) -> Self {
        Self {
            combinator: format!("_{}_", self.combinator),
            ..self
        }
    }

    fn apply(self, expression: Node) -> Node {
        let mut children = self.counts;
        children.push(Node::branch("expression", vec![expression]));
        Node::branch(self.combinator, children)
    }
}

/// `{n}`, `{n,}` or `{n,m}`.
fn counted() -> BoxedParser<Suffix> {
    LEFT_BRACE
        .clone()
        .spaced_then(NUMBER.clone())
        .spaced_and(
            COMMA
                .clone()
                .spaced_then(NUMBER.clone().optional())
                .optional(),
        )
        .spaced_before(RIGHT_BRACE.clone())
        .map(|(min, max)| match max {
            None => Suffix {
                combinator: "repeat".into(),
                counts: vec![Node::with_value("times", min)],
            },
            Some(None) => Suffix {
                combinator: "atLeast".into(),
                counts: vec![Node::with_value("times", min)],
            },
            Some(Some(max)) => Suffix {
                combinator: "inRange".into(),
                counts: vec![Node::with_value("min", min), Node::with_value("max", max)],
            },
        })
        .boxed()
}

static SUFFIX: Lazy<BoxedParser<Suffix>> = Lazy::new(|| {
    let unspaced = one_of(
        EXCLAMATION_MARK.clone().map(|_| Suffix::plain("required")).boxed(),
        [
            QUESTION_MARK.clone().map(|_| Suffix::plain("optional")).boxed(),
            ASTERISK.clone().map(|_| Suffix::plain("zeroOrMore")).boxed(),
            PLUS.clone().map(|_| Suffix::plain("oneOrMore")).boxed(),
            counted(),
        ],
    );
    let spaced = MINUS
        .clone()
        .then(one_of(
            ASTERISK.clone().map(|_| Suffix::plain("zeroOrMore")).boxed(),
            [
                PLUS.clone().map(|_| Suffix::plain("oneOrMore")).boxed(),
                OPTIONAL_SPACES.clone().then(counted()).boxed(),
            ],
        ))
        .map(Suffix::spaced);
    OPTIONAL_SPACES
        .clone()
        .then(unspaced.or(spaced))
        .with_name("count combinator")
        .boxed()
});

static BASE_EXPRESSION: Lazy<BoxedParser<Node>> = Lazy::new(|| {
    let parenthesized = LEFT_PAREN
        .clone()
        .spaced_then(reference(|| EXPRESSION.clone()))
        .spaced_before(RIGHT_PAREN.clone())
        .and(SUFFIX.clone().optional())
        .map(|(expression, suffix)| match suffix {
            Some(suffix) => suffix.apply(expression),
            None => Node::branch("grouping", vec![expression]),
        })
        .boxed();
    let rule_reference = IDENTIFIER
        .clone()
        .map(|name| Node::with_value("ruleReference", name))
        .with_name("rule reference")
        .boxed();
    one_of(parenthesized, [rule_reference, PARSER_CREATOR.clone()])
        .with_name("base expression")
        .boxed()
});

static OPERATOR: Lazy<BoxedParser<&'static str>> = Lazy::new(|| {
    one_of(
        VERTICAL_BAR.clone().map(|_| "or").boxed(),
        [
            COMMA.clone().map(|_| "_and_").boxed(),
            string("->").map(|_| "_then_").boxed(),
            GREATER_THAN_SIGN.clone().map(|_| "then").boxed(),
            string("<-").map(|_| "_before_").boxed(),
            LESS_THAN_SIGN.clone().map(|_| "before").boxed(),
        ],
    )
    .with_name("combinator")
    .boxed()
});

static EXPRESSION: Lazy<BoxedParser<Node>> = Lazy::new(|| {
    let operator_tail = OPTIONAL_SPACES
        .clone()
        .then(OPERATOR.clone())
        .spaced_and(reference(|| EXPRESSION.clone()));
    let and_tail = SPACES
        .clone()
        .then(reference(|| EXPRESSION.clone()))
        .map(|right| ("and", right));
    BASE_EXPRESSION
        .clone()
        .and(operator_tail.or(and_tail).optional())
        .map(|(left, tail)| match tail {
            None => left,
            Some((operator, right)) => Node::branch(
                operator,
                vec![
                    Node::branch("left", vec![left]),
                    Node::branch("right", vec![right]),
                ],
            ),
        })
        .with_name("expression")
        .boxed()
});

// ============================================================================
// RULES
// ============================================================================

static NESTED_BLOCK: Lazy<BoxedParser<String>> = Lazy::new(|| {
    LEFT_BRACE
        .clone()
        .then(block_contents())
        .before(RIGHT_BRACE.clone())
        .map(|inner| format!("{{{inner}}}"))
        .boxed()
});

/// Code between braces, nested blocks kept verbatim.
fn block_contents() -> BoxedParser<String> {
    reference(|| NESTED_BLOCK.clone())
        .or(except("{}").map(String::from))
        .zero_or_more()
        .map(|parts| parts.concat())
        .boxed()
}

static CODE: Lazy<BoxedParser<String>> = Lazy::new(|| {
    LEFT_BRACE
        .clone()
        .then(block_contents())
        .before(RIGHT_BRACE.clone())
        .with_name("code")
        .boxed()
});

/// `: (Type)` after a rule name.
static RULE_TYPE: Lazy<BoxedParser<String>> = Lazy::new(|| {
    let ty = char_('(')
        .spaced_then(except(")").one_or_more())
        .spaced_before(char_(')'))
        .map(collect_string)
        .with_name("type");
    COLON.clone().spaced_then(ty).boxed()
});

fn rule_node(
    kind: &str,
    fragment: bool,
    name: String,
    ty: Option<String>,
    expression: Node,
    code: Option<String>,
) -> Node {
    let mut children = Vec::with_capacity(5);
    if fragment {
        children.push(Node::leaf("fragment"));
    }
    children.push(Node::with_value("name", name));
    if let Some(ty) = ty {
        children.push(Node::with_value("type", ty));
    }
    children.push(Node::branch("expression", vec![expression]));
    if let Some(code) = code {
        children.push(Node::with_value("code", code));
    }
    Node::branch(kind, children)
}

static RULE: Lazy<BoxedParser<Node>> = Lazy::new(|| {
    string("fragment")
        .before(SPACES.clone())
        .optional()
        .and(IDENTIFIER.clone())
        .spaced_and(RULE_TYPE.clone().optional())
        .spaced_before(EQUALS_SIGN.clone())
        .spaced_and(EXPRESSION.clone())
        .spaced_and(CODE.clone().optional())
        .map(|((((fragment, name), ty), expression), code)| {
            rule_node("rule", fragment.is_some(), name, ty, expression, code)
        })
        .with_name("rule")
        .boxed()
});

static MAIN_RULE: Lazy<BoxedParser<Node>> = Lazy::new(|| {
    IDENTIFIER
        .clone()
        .spaced_and(RULE_TYPE.clone().optional())
        .spaced_before(EQUALS_SIGN.clone())
        .spaced_and(EXPRESSION.clone())
        .spaced_and(CODE.clone())
        .map(|(((name, ty), expression), code)| {
            rule_node("mainRule", false, name, ty, expression, Some(code))
        })
        .with_name("main rule")
        .boxed()
});

static GRAMMAR: Lazy<BoxedParser<Node>> = Lazy::new(|| {
    let name = string("grammar")
        .before(SPACES.clone())
        .then(IDENTIFIER.clone())
        .map(|name| Node::with_value("name", name))
        .with_name("grammar name");
    OPTIONAL_SPACES
        .clone()
        .then(name)
        .spaced_before(SEMICOLON.clone())
        .spaced_and(MAIN_RULE.clone())
        .spaced_before(SEMICOLON.clone())
        .spaced_and(
            RULE.clone()
                .spaced_before(SEMICOLON.clone())
                .spaced_zero_or_more(),
        )
        .before(OPTIONAL_SPACES.clone())
        .map(|((name, main_rule), rules)| {
            Node::branch("grammar", vec![name, main_rule, Node::branch("rules", rules)])
        })
        .with_name("grammar")
        .boxed()
});

pub fn parser() -> BoxedParser<Node> {
    GRAMMAR.clone()
}

pub fn parse(text: &str) -> Result<Node, SyntaxError> {
    GRAMMAR.parse(text)
}

pub fn parse_file(path: &Path) -> Result<Node, Error> {
    GRAMMAR.parse_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_to(name: &str) -> Node {
        Node::with_value("ruleReference", name)
    }

    fn binary(operator: &str, left: Node, right: Node) -> Node {
        Node::branch(
            operator,
            vec![
                Node::branch("left", vec![left]),
                Node::branch("right", vec![right]),
            ],
        )
    }

    #[test]
    fn small_grammar() {
        let text = "grammar digits;\nmain = (digit)+ { it.join() };\nfragment digit = [0-9];\n";
        let tree = parse(text).unwrap();
        let expected = Node::branch(
            "grammar",
            vec![
                Node::with_value("name", "digits"),
                Node::branch(
                    "mainRule",
                    vec![
                        Node::with_value("name", "main"),
                        Node::branch(
                            "expression",
                            vec![Node::branch(
                                "oneOrMore",
                                vec![Node::branch("expression", vec![reference_to("digit")])],
                            )],
                        ),
                        Node::with_value("code", " it.join() "),
                    ],
                ),
                Node::branch(
                    "rules",
                    vec![Node::branch(
                        "rule",
                        vec![
                            Node::leaf("fragment"),
                            Node::with_value("name", "digit"),
                            Node::branch(
                                "expression",
                                vec![Node::branch(
                                    "anyOf",
                                    vec![Node::branch(
                                        "range",
                                        vec![
                                            Node::with_value("firstChar", "0"),
                                            Node::with_value("lastChar", "9"),
                                        ],
                                    )],
                                )],
                            ),
                        ],
                    )],
                ),
            ],
        );
        assert_eq!(tree, expected);
    }

    #[test]
    fn operators_nest_to_the_right() {
        let tree = EXPRESSION.parse("a | b, c").unwrap();
        assert_eq!(
            tree,
            binary(
                "or",
                reference_to("a"),
                binary("_and_", reference_to("b"), reference_to("c"))
            )
        );
        let tree = EXPRESSION.parse("a -> b <- c").unwrap();
        assert_eq!(
            tree,
            binary(
                "_then_",
                reference_to("a"),
                binary("_before_", reference_to("b"), reference_to("c"))
            )
        );
        let tree = EXPRESSION.parse("a b").unwrap();
        assert_eq!(tree, binary("and", reference_to("a"), reference_to("b")));
    }

    #[test]
    fn count_suffixes() {
        let tree = EXPRESSION.parse("(x)-{2, 5}").unwrap();
        assert_eq!(
            tree,
            Node::branch(
                "_inRange_",
                vec![
                    Node::with_value("min", "2"),
                    Node::with_value("max", "5"),
                    Node::branch("expression", vec![reference_to("x")]),
                ],
            )
        );
        assert_eq!(EXPRESSION.parse("(x){3,}").unwrap().name, "atLeast");
        assert_eq!(EXPRESSION.parse("(x) {3}").unwrap().name, "repeat");
        assert_eq!(EXPRESSION.parse("(x)-*").unwrap().name, "_zeroOrMore_");
        assert_eq!(EXPRESSION.parse("(x)!").unwrap().name, "required");
        assert_eq!(EXPRESSION.parse("(x)").unwrap().name, "grouping");
    }

    #[test]
    fn parser_creators() {
        assert_eq!(
            EXPRESSION.parse(r#""a\"b""#).unwrap(),
            Node::with_value("string", "a\"b")
        );
        assert_eq!(EXPRESSION.parse("'x'").unwrap(), Node::with_value("string", "x"));
        assert_eq!(EXPRESSION.parse("*").unwrap(), Node::leaf("anyChar"));
        let except = EXPRESSION.parse(r"[^\]a-]").unwrap();
        assert_eq!(except.name, "except");
        let values: Vec<&str> = except.children.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["]", "a", "-"]);
    }

    #[test]
    fn nested_code_blocks_are_kept() {
        let tree = parse("grammar g; main = a { if x { y } };").unwrap();
        let main = tree.child("mainRule").unwrap();
        assert_eq!(main.child("code").unwrap().value, " if x { y } ");
    }

    #[test]
    fn rule_types_and_fragment_prefixes() {
        let tree = parse("grammar g; main: (Int) = a {}; fragmentary = b;").unwrap();
        let main = tree.child("mainRule").unwrap();
        assert_eq!(main.child("type").unwrap().value, "Int");
        let rule = &tree.child("rules").unwrap().children[0];
        assert!(rule.child("fragment").is_none());
        assert_eq!(rule.child("name").unwrap().value, "fragmentary");
    }

    #[test]
    fn main_rule_needs_code() {
        let error = parse("grammar g; main = a;").unwrap_err();
        assert_eq!(error.expected(), Some("'{'"));
        assert_eq!(error.got(), Some(";"));
        assert_eq!(error.offset(), 19);
    }
}
