//! Parser combinators over a single line of text.
//!
//! A parser is anything that maps `(input, cursor)` to a [`ParseResult`]: either the
//! produced value together with the cursor just past it, or a [`ParseError`] naming
//! the position where the parser gave up. Parsers never mutate the input and never
//! keep state between calls, so a [`BoxedParser`] can be cloned and reused freely.
//!
//! Larger parsers are built with the methods on [`BoxedParser`] or their operator
//! forms:
//!
//! | method      | operator  | result                                   |
//! |-------------|-----------|------------------------------------------|
//! | `a.then(b)` | `a * b`   | runs both, keeps `b`'s value             |
//! | `a.and(b)`  | `a + b`   | runs both, keeps `(a, b)`                |
//! | `a.or(b)`   | `a \| b`  | first of `a` / `b` that succeeds         |
//! | `a.map(f)`  | `a >> f`  | `a`'s value transformed by `f`           |

use std::ops::{Add, BitOr, Mul, Shr};
use std::rc::Rc;
use thiserror::Error;

/// A successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<T> {
    /// Value produced by the parser.
    pub value: T,
    /// Byte offset of the first unconsumed character.
    pub next: usize,
}

/// Why a parser failed and where.
///
/// `position` is the cursor the failing parser was started at; failures never
/// report partial consumption.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at position {position}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

pub type ParseResult<T> = Result<Parsed<T>, ParseError>;

/// Single-method capability shared by closures and boxed parsers.
pub trait Parser<T> {
    fn parse(&self, input: &str, cursor: usize) -> ParseResult<T>;
}

impl<T, F: Fn(&str, usize) -> ParseResult<T>> Parser<T> for F {
    fn parse(&self, input: &str, cursor: usize) -> ParseResult<T> {
        self(input, cursor)
    }
}

type ParserFn<T> = Rc<dyn Fn(&str, usize) -> ParseResult<T>>;

/// Type-erased, cheaply clonable parser.
pub struct BoxedParser<T> {
    parser: ParserFn<T>,
}

impl<T> Clone for BoxedParser<T> {
    fn clone(&self) -> Self {
        BoxedParser {
            parser: Rc::clone(&self.parser),
        }
    }
}

impl<T: 'static> BoxedParser<T> {
    pub fn new<P: Parser<T> + 'static>(parser: P) -> Self {
        BoxedParser {
            parser: Rc::new(move |input: &str, cursor: usize| parser.parse(input, cursor)),
        }
    }
}

impl<T> Parser<T> for BoxedParser<T> {
    fn parse(&self, input: &str, cursor: usize) -> ParseResult<T> {
        (self.parser)(input, cursor)
    }
}

impl<T: 'static> BoxedParser<T> {
    /// Keep right: parse self, then `other` from where self stopped.
    pub fn then<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<U> {
        BoxedParser::new(move |input: &str, cursor: usize| {
            let first = self.parse(input, cursor)?;
            other.parse(input, first.next)
        })
    }

    /// Sequence: parse self then `other`, keep both values.
    pub fn and<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<(T, U)> {
        BoxedParser::new(move |input: &str, cursor: usize| {
            let first = self.parse(input, cursor)?;
            let second = other.parse(input, first.next)?;
            Ok(Parsed {
                value: (first.value, second.value),
                next: second.next,
            })
        })
    }

    /// Choice: try self, if it fails try `other` from the same cursor.
    ///
    /// First match wins. When both fail, `other`'s error is returned as is.
    pub fn or(self, other: BoxedParser<T>) -> BoxedParser<T> {
        BoxedParser::new(move |input: &str, cursor: usize| {
            match self.parse(input, cursor) {
                Ok(parsed) => Ok(parsed),
                Err(_) => other.parse(input, cursor),
            }
        })
    }

    /// Map: transform the result, keeping the cursor.
    pub fn map<U: 'static, F: Fn(T) -> U + 'static>(self, f: F) -> BoxedParser<U> {
        BoxedParser::new(move |input: &str, cursor: usize| {
            let Parsed { value, next } = self.parse(input, cursor)?;
            Ok(Parsed {
                value: f(value),
                next,
            })
        })
    }
}

// === Operator Overloading ===

/// `*` for keep right: A * B -> B
impl<T: 'static, U: 'static> Mul<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn mul(self, rhs: BoxedParser<U>) -> Self::Output {
        self.then(rhs)
    }
}

/// `+` for sequence: A + B -> (A, B)
impl<T: 'static, U: 'static> Add<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<(T, U)>;

    fn add(self, rhs: BoxedParser<U>) -> Self::Output {
        self.and(rhs)
    }
}

/// `|` for choice: A | B -> A or B
impl<T: 'static> BitOr<BoxedParser<T>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn bitor(self, rhs: BoxedParser<T>) -> Self::Output {
        self.or(rhs)
    }
}

/// `>>` for map: A >> fn -> B
impl<T: 'static, U: 'static, F: Fn(T) -> U + 'static> Shr<F> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn shr(self, f: F) -> Self::Output {
        self.map(f)
    }
}

// === Primitive Parsers ===

fn remaining(input: &str, cursor: usize) -> &str {
    input.get(cursor..).unwrap_or("")
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Exactly one `expected` character.
pub fn character(expected: char) -> BoxedParser<char> {
    BoxedParser::new(move |input: &str, cursor: usize| {
        match remaining(input, cursor).chars().next() {
            Some(found) if found == expected => Ok(Parsed {
                value: found,
                next: cursor + found.len_utf8(),
            }),
            Some(found) => Err(ParseError::new(
                format!("expected '{expected}' but found '{found}'"),
                cursor,
            )),
            None => Err(ParseError::new(
                format!("expected '{expected}' but reached end of input"),
                cursor,
            )),
        }
    })
}

/// One or more spaces or tabs.
pub fn whitespace() -> BoxedParser<String> {
    BoxedParser::new(|input: &str, cursor: usize| {
        let rest = remaining(input, cursor);
        let len = rest.len() - rest.trim_start_matches(is_blank).len();
        if len == 0 {
            return Err(ParseError::new("expected whitespace", cursor));
        }
        Ok(Parsed {
            value: rest[..len].to_string(),
            next: cursor + len,
        })
    })
}

/// An ASCII letter followed by any run of ASCII letters, digits and `_`.
pub fn identifier() -> BoxedParser<String> {
    BoxedParser::new(|input: &str, cursor: usize| {
        let rest = remaining(input, cursor);
        match rest.chars().next() {
            Some(first) if first.is_ascii_alphabetic() => {
                let len = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(rest.len());
                Ok(Parsed {
                    value: rest[..len].to_string(),
                    next: cursor + len,
                })
            }
            Some(found) => Err(ParseError::new(
                format!("expected identifier but found '{found}'"),
                cursor,
            )),
            None => Err(ParseError::new(
                "expected identifier but reached end of input",
                cursor,
            )),
        }
    })
}

/// Text between a pair of double quotes, delimiters excluded.
///
/// There are no escapes: the string ends at the first `"` after the opening one.
pub fn quoted_string() -> BoxedParser<String> {
    BoxedParser::new(|input: &str, cursor: usize| {
        let Some(body) = remaining(input, cursor).strip_prefix('"') else {
            return Err(ParseError::new("expected quoted string", cursor));
        };
        match body.find('"') {
            Some(end) => Ok(Parsed {
                value: body[..end].to_string(),
                // opening quote + body + closing quote
                next: cursor + end + 2,
            }),
            None => Err(ParseError::new("unterminated quoted string", cursor)),
        }
    })
}

/// A run of decimal digits read as an `i32`. Signs are not accepted.
pub fn number() -> BoxedParser<i32> {
    BoxedParser::new(|input: &str, cursor: usize| {
        let rest = remaining(input, cursor);
        let len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(ParseError::new("expected number", cursor));
        }
        rest[..len]
            .parse::<i32>()
            .map(|value| Parsed {
                value,
                next: cursor + len,
            })
            .map_err(|_| ParseError::new("number out of range", cursor))
    })
}

/// Case-sensitive literal `word`.
pub fn keyword(word: &'static str) -> BoxedParser<&'static str> {
    BoxedParser::new(move |input: &str, cursor: usize| {
        if remaining(input, cursor).starts_with(word) {
            Ok(Parsed {
                value: word,
                next: cursor + word.len(),
            })
        } else {
            Err(ParseError::new(format!("expected '{word}'"), cursor))
        }
    })
}

/// Succeeds with `value` without consuming anything.
///
/// Placed last in an alternation it turns the alternatives before it optional.
pub fn succeed<T: Clone + 'static>(value: T) -> BoxedParser<T> {
    BoxedParser::new(move |_: &str, cursor: usize| {
        Ok(Parsed {
            value: value.clone(),
            next: cursor,
        })
    })
}

/// Zero or one occurrence of `parser`.
pub fn optional<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Option<T>> {
    BoxedParser::new(move |input: &str, cursor: usize| match parser.parse(input, cursor) {
        Ok(Parsed { value, next }) => Ok(Parsed {
            value: Some(value),
            next,
        }),
        Err(_) => Ok(Parsed {
            value: None,
            next: cursor,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run<T>(parser: &BoxedParser<T>, input: &str) -> ParseResult<T> {
        parser.parse(input, 0)
    }

    #[test]
    fn test_character_matches_and_reports_mismatch() {
        let p = character('a');
        assert_eq!(run(&p, "ab"), Ok(Parsed { value: 'a', next: 1 }));

        let err = run(&p, "ba").unwrap_err();
        assert_eq!(err.message, "expected 'a' but found 'b'");
        assert_eq!(err.position, 0);

        let err = p.parse("xa", 2).unwrap_err();
        assert_eq!(err.message, "expected 'a' but reached end of input");
        assert_eq!(err.position, 2);
    }

    #[test]
    fn test_whitespace_requires_at_least_one_blank() {
        let p = whitespace();
        assert_eq!(
            run(&p, " \t x"),
            Ok(Parsed {
                value: " \t ".to_string(),
                next: 3
            })
        );
        assert_eq!(run(&p, "x").unwrap_err().position, 0);
        assert!(run(&p, "").is_err());
    }

    #[test]
    fn test_identifier_rules() {
        let p = identifier();
        let parsed = run(&p, "alice_2 rest").unwrap();
        assert_eq!(parsed.value, "alice_2");
        assert_eq!(parsed.next, 7);

        assert!(run(&p, "2alice").is_err());
        assert!(run(&p, "_alice").is_err());
        assert_eq!(
            run(&p, "").unwrap_err().message,
            "expected identifier but reached end of input"
        );
    }

    #[test]
    fn test_quoted_string_excludes_delimiters() {
        let p = quoted_string();
        let parsed = run(&p, r#""Hello World" tail"#).unwrap();
        assert_eq!(parsed.value, "Hello World");
        assert_eq!(parsed.next, 13);

        assert_eq!(run(&p, r#""""#).unwrap().value, "");
        // no escape processing: a backslash is kept and does not protect the quote
        assert_eq!(run(&p, r#""a\"b"#).unwrap().value, r"a\");
    }

    #[test]
    fn test_quoted_string_failures() {
        let p = quoted_string();
        assert_eq!(
            run(&p, r#""never closed"#).unwrap_err().message,
            "unterminated quoted string"
        );
        assert_eq!(run(&p, "bare").unwrap_err().message, "expected quoted string");
    }

    #[test]
    fn test_number_parses_digits_only() {
        let p = number();
        assert_eq!(run(&p, "42x"), Ok(Parsed { value: 42, next: 2 }));
        assert_eq!(run(&p, "0"), Ok(Parsed { value: 0, next: 1 }));
        assert!(run(&p, "-1").is_err());
        assert!(run(&p, "+1").is_err());
    }

    #[test]
    fn test_number_out_of_range_is_a_failure() {
        let err = run(&number(), "99999999999").unwrap_err();
        assert_eq!(err.message, "number out of range");
        assert_eq!(err.position, 0);
    }

    #[test]
    fn test_keyword_is_case_sensitive() {
        let p = keyword("GET");
        assert_eq!(run(&p, "GET USERS").unwrap().next, 3);
        assert!(run(&p, "get USERS").is_err());
        assert!(run(&p, "GE").is_err());
    }

    #[test]
    fn test_then_keeps_right_and_propagates_left_failure() {
        let p = keyword("PING") * whitespace() * identifier();
        assert_eq!(
            run(&p, "PING bob"),
            Ok(Parsed {
                value: "bob".to_string(),
                next: 8
            })
        );

        let err = run(&p, "PONG bob").unwrap_err();
        assert_eq!(err.message, "expected 'PING'");
        assert_eq!(err.position, 0);
    }

    #[test]
    fn test_and_keeps_both_values() {
        let p = identifier() + (whitespace() * number());
        assert_eq!(
            run(&p, "bob 3"),
            Ok(Parsed {
                value: ("bob".to_string(), 3),
                next: 5
            })
        );
        assert_eq!(run(&p, "bob x").unwrap_err().position, 4);
    }

    #[test]
    fn test_or_retries_from_original_cursor() {
        // the left side consumes "GET " before failing; the right side must still see it
        let users = keyword("GET") * whitespace() * keyword("USERS");
        let groups = keyword("GET") * whitespace() * keyword("GROUPS");
        let p = users | groups;
        assert_eq!(
            run(&p, "GET GROUPS"),
            Ok(Parsed {
                value: "GROUPS",
                next: 10
            })
        );
    }

    #[test]
    fn test_or_returns_right_failure_verbatim() {
        let p = keyword("A") | keyword("B");
        let err = run(&p, "C").unwrap_err();
        assert_eq!(err, ParseError::new("expected 'B'", 0));
    }

    #[test]
    fn test_or_is_first_match_wins() {
        let p = keyword("GET") | keyword("GET USERS");
        assert_eq!(run(&p, "GET USERS").unwrap().next, 3);
    }

    #[test]
    fn test_map_keeps_cursor() {
        let p = number() >> |n: i32| n * 2;
        assert_eq!(run(&p, "21 "), Ok(Parsed { value: 42, next: 2 }));
    }

    #[test]
    fn test_succeed_and_optional() {
        assert_eq!(
            succeed(7).parse("abc", 1),
            Ok(Parsed { value: 7, next: 1 })
        );

        let p = optional(whitespace()) * identifier();
        assert_eq!(run(&p, "  bob").unwrap().value, "bob");
        assert_eq!(run(&p, "bob").unwrap().value, "bob");
    }

    #[test]
    fn test_parsers_are_reusable() {
        let p = identifier();
        let copy = p.clone();
        assert_eq!(run(&p, "a").unwrap().value, "a");
        assert_eq!(run(&copy, "b").unwrap().value, "b");
        assert_eq!(run(&p, "c").unwrap().value, "c");
    }
}
