// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Low-level token parsers shared by the statement and expression
//! grammars.
//!
//! These are plain `nom` combinators over [`Span`] — no mutable parser
//! state is threaded through them. The statement grammar in
//! [`super::Parser`] and the expression grammar in [`super::expr`] call
//! these against the slice they currently hold and advance past whatever
//! they consume.

use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not, tag, take_while, take_while1};
use nom::character::complete::{char, digit1, multispace0};
use nom::combinator::{map, opt, recognize, value};
use nom::sequence::{pair, preceded};
use nom::IResult;
use nom_locate::LocatedSpan;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parser input: a string slice tagged with its position in the original
/// source, so parse errors can report a 1-based line and column.
pub type Span<'a> = LocatedSpan<&'a str>;

/// Creates the initial span for a fresh parse.
pub fn new_span(source: &str) -> Span<'_> {
    Span::new(source)
}

/// Consumes zero or more whitespace characters.
pub fn ws0(input: Span) -> IResult<Span, Span> {
    multispace0(input)
}

/// An identifier: `[A-Za-z_][A-Za-z_0-9]*`.
pub fn identifier(input: Span) -> IResult<Span, String> {
    map(
        recognize(pair(
            take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        )),
        |s: Span| s.fragment().to_string(),
    )(input)
}

/// A number literal: optional leading `-`, then `0` or `[1-9][0-9]*`,
/// optional fractional part, parsed as an arbitrary-precision decimal.
pub fn number_literal(input: Span) -> IResult<Span, Decimal> {
    map(
        recognize(pair(
            opt(char('-')),
            pair(
                alt((tag("0"), recognize(pair(
                    nom::character::complete::one_of("123456789"),
                    digit1_or_empty,
                )))),
                opt(pair(char('.'), digit1)),
            ),
        )),
        |s: Span| Decimal::from_str(s.fragment()).unwrap_or(Decimal::ZERO),
    )(input)
}

fn digit1_or_empty(input: Span) -> IResult<Span, Span> {
    nom::bytes::complete::take_while(|c: char| c.is_ascii_digit())(input)
}

/// A quoted string literal, single or double quoted, with `\n \b \v \0 \t`
/// escapes; any other `\c` yields `c` verbatim.
pub fn string_literal(input: Span) -> IResult<Span, String> {
    alt((quoted('\''), quoted('"')))(input)
}

fn quoted<'a>(quote: char) -> impl Fn(Span<'a>) -> IResult<Span<'a>, String> {
    move |input: Span<'a>| {
        let (input, _) = char(quote)(input)?;
        let (input, body) = opt(escaped_transform(
            is_not(match quote {
                '\'' => "'\\",
                _ => "\"\\",
            }),
            '\\',
            |i: Span<'a>| {
                map(nom::character::complete::anychar, |c| {
                    match c {
                        'n' => "\n".to_string(),
                        'b' => "\u{8}".to_string(),
                        'v' => "\u{b}".to_string(),
                        '0' => "\0".to_string(),
                        't' => "\t".to_string(),
                        other => other.to_string(),
                    }
                })(i)
            },
        ))(input)?;
        let (input, _) = char(quote)(input)?;
        Ok((input, body.unwrap_or_default()))
    }
}

/// Matches a literal keyword, `false`/`true`/`null`, as a whole identifier
/// (not a prefix of a longer one).
pub fn keyword<'a>(kw: &'static str) -> impl Fn(Span<'a>) -> IResult<Span<'a>, ()> {
    move |input: Span<'a>| {
        let (rest, ident) = identifier(input)?;
        if ident == kw {
            Ok((rest, ()))
        } else {
            Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Tag,
            )))
        }
    }
}

/// Matches `op`, provided the character immediately following is not
/// itself one of `continuation_chars` — the longest-match disambiguation
/// the expression grammar needs so `==` isn't read as `=` then `=`, etc.
pub fn operator<'a>(
    op: &'static str,
    continuation_chars: &'static str,
) -> impl Fn(Span<'a>) -> IResult<Span<'a>, ()> {
    move |input: Span<'a>| {
        let (rest, _) = tag(op)(input)?;
        if rest
            .fragment()
            .chars()
            .next()
            .map(|c| continuation_chars.contains(c))
            .unwrap_or(false)
        {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Tag,
            )));
        }
        Ok((rest, ()))
    }
}

/// `bool` literal value helper, used by the expression grammar's atomic
/// level.
pub fn bool_literal(input: Span) -> IResult<Span, bool> {
    alt((
        value(true, keyword("true")),
        value(false, keyword("false")),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_matches_leading_underscore() {
        let (_, id) = identifier(new_span("_foo1 bar")).unwrap();
        assert_eq!(id, "_foo1");
    }

    #[test]
    fn number_literal_parses_integers_and_decimals() {
        let (_, n) = number_literal(new_span("42")).unwrap();
        assert_eq!(n, Decimal::from(42));
        let (_, n) = number_literal(new_span("-3.5 ")).unwrap();
        assert_eq!(n, Decimal::new(-35, 1));
    }

    #[test]
    fn string_literal_handles_escapes() {
        let (_, s) = string_literal(new_span(r#""a\nb""#)).unwrap();
        assert_eq!(s, "a\nb");
        let (_, s) = string_literal(new_span(r#"'it\'s'"#)).unwrap();
        assert_eq!(s, "it's");
    }

    #[test]
    fn operator_longest_match() {
        // `==` must not be consumed as a bare `=` when followed by `=`.
        assert!(operator("=", "=")(new_span("==")).is_err());
        assert!(operator("==", "=")(new_span("== x")).is_ok());
    }
}
