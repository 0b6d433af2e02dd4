// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The expression grammar: seven precedence levels, lowest (lambda) to
//! highest (atomic), each left-associative within its level.
//!
//! This module has no mutable parse state of its own — unlike
//! [`super::Parser`], which carries the include resolver and block table,
//! expression parsing is a pure function of its input. [`parse_expression`]
//! is the single public entry point; everything else is an internal
//! precedence level wired together by [`binary_level`].

use crate::ast::Expression;
use crate::error::ParserError;
use crate::parser::lexer::{self, bool_literal, identifier, keyword, number_literal, string_literal, ws0, Span};
use crate::parser::slice_from;

type PResult<'a> = Result<(Span<'a>, Expression), ParserError>;

fn skip_ws(input: Span) -> Span {
    ws0(input).map(|(r, _)| r).unwrap_or(input)
}

fn err(at: Span, message: impl Into<String>) -> ParserError {
    ParserError::Syntax {
        message: message.into(),
        source_name: None,
        line: Some(at.location_line() as usize),
        column: Some(at.get_utf8_column()),
    }
}

/// Parses a single expression, starting at the lambda level (the lowest
/// precedence, tried first so `(a, b) -> a + b` isn't mistaken for a
/// parenthesized expression).
pub fn parse_expression(input: Span) -> PResult {
    parse_lambda(input)
}

// --- 1. lambda --------------------------------------------------------

fn parse_lambda(input: Span) -> PResult {
    if input.fragment().starts_with('(') {
        if let Ok((after_paren, params)) = parse_paren_ident_list(slice_from(input, 1)) {
            let after_ws = skip_ws(after_paren);
            if after_ws.fragment().starts_with("->") {
                let after_arrow = skip_ws(slice_from(after_ws, 2));
                let (after_body, body) = parse_expression(after_arrow)?;
                return Ok((after_body, Expression::Lambda(params, Box::new(body))));
            }
        }
    }
    parse_boolean(input)
}

fn parse_paren_ident_list(mut input: Span) -> Result<(Span, Vec<String>), ()> {
    let mut names = Vec::new();
    loop {
        let after_ws = skip_ws(input);
        if after_ws.fragment().starts_with(')') {
            input = slice_from(after_ws, 1);
            break;
        }
        let (after_name, name) = identifier(after_ws).map_err(|_| ())?;
        names.push(name);
        let after_ws2 = skip_ws(after_name);
        if after_ws2.fragment().starts_with(',') {
            input = slice_from(after_ws2, 1);
        } else if after_ws2.fragment().starts_with(')') {
            input = slice_from(after_ws2, 1);
            break;
        } else {
            return Err(());
        }
    }
    Ok((input, names))
}

// --- 2-5. binary operator levels ---------------------------------------

/// One operator at a binary precedence level: its token, the characters
/// that must *not* follow it (so a shorter operator isn't mistaken for a
/// prefix of a longer one — e.g. bare `=` is never an operator here, but
/// `>` must not match when `>=` was meant), and the function name its
/// use desugars to a call of.
type Op = (&'static str, &'static str, &'static str);

const BOOLEAN_OPS: &[Op] = &[("||", "", "any"), ("&&", "", "all")];
const COMPARATIVE_OPS: &[Op] = &[
    ("==", "", "equals"),
    ("!=", "", "nequals"),
    (">=", "", "greater_equals"),
    ("<=", "", "less_equals"),
    (">", "=", "greater"),
    ("<", "=", "less"),
];
const ADDITIVE_OPS: &[Op] = &[("+", "", "sum"), ("-", "", "difference"), ("~", "", "concat")];
const MULTIPLICATIVE_OPS: &[Op] = &[
    ("//", "", "int_ratio"),
    ("*", "", "product"),
    ("/", "/", "ratio"),
    ("%", "", "modulo"),
];

fn parse_boolean(input: Span) -> PResult {
    binary_level(input, parse_comparative, BOOLEAN_OPS)
}

fn parse_comparative(input: Span) -> PResult {
    binary_level(input, parse_additive, COMPARATIVE_OPS)
}

fn parse_additive(input: Span) -> PResult {
    binary_level(input, parse_multiplicative, ADDITIVE_OPS)
}

fn parse_multiplicative(input: Span) -> PResult {
    binary_level(input, parse_postfix, MULTIPLICATIVE_OPS)
}

fn binary_level<'a>(
    input: Span<'a>,
    next: fn(Span<'a>) -> PResult<'a>,
    ops: &[Op],
) -> PResult<'a> {
    let (mut input, mut left) = next(input)?;
    loop {
        let after_ws = skip_ws(input);
        let mut matched = None;
        for (tok, guard, func) in ops {
            if let Ok((rest, _)) = lexer::operator(tok, guard)(after_ws) {
                matched = Some((rest, *func));
                break;
            }
        }
        let Some((rest, func)) = matched else { break };
        let after_ws2 = skip_ws(rest);
        let (after_right, right) = next(after_ws2)?;
        left = Expression::Call(
            Box::new(Expression::Var(func.to_string())),
            vec![(None, left), (None, right)],
        );
        input = after_right;
    }
    Ok((input, left))
}

// --- 6. postfix chain ---------------------------------------------------

fn parse_postfix(input: Span) -> PResult {
    let (mut input, mut base) = parse_atomic(input)?;
    loop {
        let after_ws = skip_ws(input);
        if after_ws.fragment().starts_with('.') {
            let after_dot = slice_from(after_ws, 1);
            let (after_ident, ident) = identifier(after_dot).map_err(|_| err(after_dot, "expecting an identifier after \".\""))?;
            base = Expression::MemberLookup(Box::new(base), Box::new(Expression::Str(ident)));
            input = after_ident;
        } else if after_ws.fragment().starts_with('[') {
            let after_open = slice_from(after_ws, 1);
            let after_ws2 = skip_ws(after_open);
            let (after_idx, idx) = parse_expression(after_ws2)?;
            let after_ws3 = skip_ws(after_idx);
            if !after_ws3.fragment().starts_with(']') {
                return Err(err(after_ws3, "expecting \"]\""));
            }
            base = Expression::MemberLookup(Box::new(base), Box::new(idx));
            input = slice_from(after_ws3, 1);
        } else if after_ws.fragment().starts_with('(') {
            let (after_args, args) = parse_call_args(slice_from(after_ws, 1))?;
            base = Expression::Call(Box::new(base), args);
            input = after_args;
        } else if after_ws.fragment().starts_with('|') && !after_ws.fragment().starts_with("||") {
            let after_pipe = skip_ws(slice_from(after_ws, 1));
            let (after_callee, callee) = parse_filter_callee(after_pipe)?;
            let after_ws2 = skip_ws(after_callee);
            let (after_args, mut args) = if after_ws2.fragment().starts_with('(') {
                parse_call_args(slice_from(after_ws2, 1))?
            } else {
                (after_ws2, Vec::new())
            };
            args.insert(0, (None, base));
            base = Expression::Call(Box::new(callee), args);
            input = after_args;
        } else {
            break;
        }
    }
    Ok((input, base))
}

/// A filter's right-hand side: the function reference itself (an atomic
/// expression plus any `.member`/`[index]` chain), stopping short of a
/// call or a further filter — those are handled by the caller, which
/// treats a following `(...)` as the filter's extra arguments rather than
/// folding it into the callee expression.
fn parse_filter_callee(input: Span) -> PResult {
    let (mut input, mut base) = parse_atomic(input)?;
    loop {
        let after_ws = skip_ws(input);
        if after_ws.fragment().starts_with('.') {
            let after_dot = slice_from(after_ws, 1);
            let (after_ident, ident) = identifier(after_dot).map_err(|_| err(after_dot, "expecting an identifier after \".\""))?;
            base = Expression::MemberLookup(Box::new(base), Box::new(Expression::Str(ident)));
            input = after_ident;
        } else if after_ws.fragment().starts_with('[') {
            let after_open = slice_from(after_ws, 1);
            let after_ws2 = skip_ws(after_open);
            let (after_idx, idx) = parse_expression(after_ws2)?;
            let after_ws3 = skip_ws(after_idx);
            if !after_ws3.fragment().starts_with(']') {
                return Err(err(after_ws3, "expecting \"]\""));
            }
            base = Expression::MemberLookup(Box::new(base), Box::new(idx));
            input = slice_from(after_ws3, 1);
        } else {
            break;
        }
    }
    Ok((input, base))
}

/// Parses call arguments up to and including the closing `)`; the
/// opening `(` is assumed already consumed. Named arguments (`name =
/// expr`, lookahead-detected so `==` isn't mistaken for `=`) and
/// positional arguments may be mixed freely, in source order.
fn parse_call_args(mut input: Span) -> Result<(Span, Vec<(Option<String>, Expression)>), ParserError> {
    let mut args = Vec::new();
    loop {
        let after_ws = skip_ws(input);
        if after_ws.fragment().starts_with(')') {
            input = slice_from(after_ws, 1);
            break;
        }
        let mut consumed_as_named = false;
        if let Ok((after_id, id)) = identifier(after_ws) {
            let after_ws2 = skip_ws(after_id);
            if after_ws2.fragment().starts_with('=') && !after_ws2.fragment()[1..].starts_with('=') {
                let after_eq = skip_ws(slice_from(after_ws2, 1));
                let (after_val, val) = parse_expression(after_eq)?;
                args.push((Some(id), val));
                input = after_val;
                consumed_as_named = true;
            }
        }
        if !consumed_as_named {
            let (after_val, val) = parse_expression(after_ws)?;
            args.push((None, val));
            input = after_val;
        }
        let after_ws3 = skip_ws(input);
        if after_ws3.fragment().starts_with(',') {
            input = slice_from(after_ws3, 1);
        } else if after_ws3.fragment().starts_with(')') {
            input = slice_from(after_ws3, 1);
            break;
        } else {
            return Err(err(after_ws3, "expecting \",\" or \")\""));
        }
    }
    Ok((input, args))
}

// --- 7. atomic -----------------------------------------------------------

fn parse_atomic(input: Span) -> PResult {
    if let Ok((rest, n)) = number_literal(input) {
        return Ok((rest, Expression::Num(n)));
    }
    if let Ok((rest, s)) = string_literal(input) {
        return Ok((rest, Expression::Str(s)));
    }
    if let Ok((rest, ())) = keyword("null")(input) {
        return Ok((rest, Expression::Null));
    }
    if let Ok((rest, b)) = bool_literal(input) {
        return Ok((rest, Expression::Bool(b)));
    }
    if input.fragment().starts_with('[') {
        return parse_list(input);
    }
    if input.fragment().starts_with('{') {
        return parse_object(input);
    }
    if input.fragment().starts_with('(') {
        let after_open = skip_ws(slice_from(input, 1));
        let (after_expr, e) = parse_expression(after_open)?;
        let after_ws = skip_ws(after_expr);
        if !after_ws.fragment().starts_with(')') {
            return Err(err(after_ws, "expecting \")\""));
        }
        return Ok((slice_from(after_ws, 1), e));
    }
    if let Ok((rest, id)) = identifier(input) {
        return Ok((rest, Expression::Var(id)));
    }
    Err(err(input, "expecting an expression"))
}

fn parse_list(input: Span) -> PResult {
    let mut input = slice_from(input, 1);
    let mut items = Vec::new();
    loop {
        let after_ws = skip_ws(input);
        if after_ws.fragment().starts_with(']') {
            input = slice_from(after_ws, 1);
            break;
        }
        let (after_val, val) = parse_expression(after_ws)?;
        items.push(val);
        let after_ws2 = skip_ws(after_val);
        if after_ws2.fragment().starts_with(',') {
            input = slice_from(after_ws2, 1);
        } else if after_ws2.fragment().starts_with(']') {
            input = slice_from(after_ws2, 1);
            break;
        } else {
            return Err(err(after_ws2, "expecting \",\" or \"]\""));
        }
    }
    Ok((input, Expression::List(items)))
}

fn parse_object(input: Span) -> PResult {
    let mut input = slice_from(input, 1);
    let mut pairs = Vec::new();
    loop {
        let after_ws = skip_ws(input);
        if after_ws.fragment().starts_with('}') {
            input = slice_from(after_ws, 1);
            break;
        }
        let (after_key, key) = parse_expression(after_ws)?;
        let after_ws2 = skip_ws(after_key);
        if !after_ws2.fragment().starts_with(':') {
            return Err(err(after_ws2, "expecting \":\""));
        }
        let after_colon = skip_ws(slice_from(after_ws2, 1));
        let (after_val, val) = parse_expression(after_colon)?;
        pairs.push((key, val));
        let after_ws3 = skip_ws(after_val);
        if after_ws3.fragment().starts_with(',') {
            input = slice_from(after_ws3, 1);
        } else if after_ws3.fragment().starts_with('}') {
            input = slice_from(after_ws3, 1);
            break;
        } else {
            return Err(err(after_ws3, "expecting \",\" or \"}\""));
        }
    }
    Ok((input, Expression::Object(pairs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::new_span;

    fn parse(src: &str) -> Expression {
        parse_expression(new_span(src)).unwrap().1
    }

    fn call_name(e: &Expression) -> &str {
        match e {
            Expression::Call(callee, _) => match &**callee {
                Expression::Var(name) => name,
                _ => panic!("callee is not a bare var"),
            },
            _ => panic!("not a call"),
        }
    }

    #[test]
    fn precedence_additive_over_multiplicative() {
        // a + b * c should parse as a + (b * c): the outer call is `sum`,
        // and its second argument is a `product` call.
        let e = parse("a + b * c");
        assert_eq!(call_name(&e), "sum");
        if let Expression::Call(_, args) = &e {
            assert_eq!(call_name(&args[1].1), "product");
        }
    }

    #[test]
    fn longest_match_operators() {
        assert_eq!(call_name(&parse("a == b")), "equals");
        assert_eq!(call_name(&parse("a != b")), "nequals");
        assert_eq!(call_name(&parse("a >= b")), "greater_equals");
        assert_eq!(call_name(&parse("a <= b")), "less_equals");
        assert_eq!(call_name(&parse("a // b")), "int_ratio");
        assert_eq!(call_name(&parse("a / b")), "ratio");
    }

    #[test]
    fn filter_rewrites_to_call() {
        let e = parse(r#"x | f(y)"#);
        match e {
            Expression::Call(callee, args) => {
                assert!(matches!(*callee, Expression::Var(ref n) if n == "f"));
                assert_eq!(args.len(), 2);
                assert!(matches!(args[0].1, Expression::Var(ref n) if n == "x"));
            }
            _ => panic!("expected a call"),
        }
    }

    #[test]
    fn lambda_parses_and_falls_back_to_parenthesized() {
        assert!(matches!(parse("(a, b) -> a + b"), Expression::Lambda(_, _)));
        assert!(matches!(parse("(a)"), Expression::Var(_)));
    }

    #[test]
    fn named_and_positional_call_args_mix() {
        let e = parse("f(1, 2, name=3, 4)");
        if let Expression::Call(_, args) = e {
            assert_eq!(args.len(), 4);
            assert_eq!(args[2].0.as_deref(), Some("name"));
            assert!(args[0].0.is_none());
        } else {
            panic!("not a call");
        }
    }

    #[test]
    fn member_and_index_chain() {
        let e = parse("a.b[0]");
        assert!(matches!(e, Expression::MemberLookup(_, _)));
    }
}
