// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Abstract syntax tree types produced by the parser and consumed by the
//! evaluator.
//!
//! # Structure
//!
//! A parsed template is a [`Template`]: a body [`Statement`], an optional
//! parent template (set when the source begins with `{% extends %}`), and
//! a table of named [`Block`]s captured while parsing.

use rust_decimal::Decimal;
use std::collections::HashMap;
// `Arc`, not `Rc`: macro and lambda values capture pieces of this tree
// inside a `Send + Sync` closure (see `crate::value::Function`).
use std::sync::Arc;

/// A parsed template.
///
/// Invariant: if `parent` is `Some`, `body` is always `Statement::Null` —
/// all of a derived template's meaningful content lives in `blocks`.
#[derive(Debug, Clone)]
pub struct Template {
    /// The template body (statements in source order).
    pub body: Statement,
    /// The parent template, set for `{% extends %}` templates.
    pub parent: Option<Arc<Template>>,
    /// Named blocks captured while parsing this template.
    pub blocks: HashMap<String, Block>,
}

impl Template {
    /// A template with an empty body, no parent, and no blocks.
    pub fn empty() -> Self {
        Template {
            body: Statement::Null,
            parent: None,
            blocks: HashMap::new(),
        }
    }
}

/// A named section that a derived template may override.
#[derive(Debug, Clone)]
pub struct Block {
    /// The block's body.
    pub body: Statement,
}

/// A named, parameterized statement body, callable as a function.
#[derive(Debug, Clone)]
pub struct Macro {
    /// Parameter names, in declaration order.
    pub args: Vec<String>,
    /// The macro body.
    pub body: Box<Statement>,
}

/// A statement node.
///
/// `Multi` never contains a `Null` child — the parser filters those out
/// as it builds sequences (comments and similarly inert constructs parse
/// to `Null` and are dropped rather than threaded through evaluation).
#[derive(Debug, Clone)]
pub enum Statement {
    /// No-op (the result of parsing a comment, for instance).
    Null,
    /// A sequence of statements, evaluated left to right.
    Multi(Vec<Statement>),
    /// Raw HTML text captured verbatim between tags.
    Literal(String),
    /// `{{ expr }}` — evaluate and emit as (escaped, unless already HTML)
    /// HTML.
    Interpolation(Expression),
    /// `{% if %}` / `{% elif %}` / `{% else %}`, with elif chains
    /// desugared into nested `If`s.
    If(Expression, Box<Statement>, Box<Statement>),
    /// `{% for %}`: value variable, optional index/key variable, the
    /// iteree expression, and the loop body.
    For(String, Option<String>, Expression, Box<Statement>),
    /// `{% set name = expr %}`.
    SetVar(String, Expression),
    /// `{% macro name(...) %} ... {% endmacro %}`.
    DefMacro(String, Macro),
    /// A reference to a named block at the point of definition.
    BlockRef(String),
    /// `{% scope %}` / the desugaring of `{% call %}`: a fresh scope frame
    /// that is discarded when the body finishes evaluating.
    Scoped(Box<Statement>),
    /// `{% include "name" %}`, resolved and parsed at parse time.
    PreprocessedInclude(Arc<Template>),
}

/// An expression node.
#[derive(Debug, Clone)]
pub enum Expression {
    /// A string literal.
    Str(String),
    /// A number literal.
    Num(Decimal),
    /// A boolean literal.
    Bool(bool),
    /// The `null` literal.
    Null,
    /// A variable reference.
    Var(String),
    /// A list literal.
    List(Vec<Expression>),
    /// An object literal: `(key expression, value expression)` pairs in
    /// source order.
    Object(Vec<(Expression, Expression)>),
    /// `base[index]` or the `base.index` sugar for it.
    MemberLookup(Box<Expression>, Box<Expression>),
    /// A function call with `(optional argument name, value)` pairs in
    /// source order.
    Call(Box<Expression>, Vec<(Option<String>, Expression)>),
    /// `(params...) -> body`.
    Lambda(Vec<String>, Box<Expression>),
}

impl Statement {
    /// Wraps a `Vec<Statement>` into a `Multi`, dropping `Null` children
    /// and collapsing a single surviving statement to itself.
    pub fn multi(stmts: Vec<Statement>) -> Statement {
        let mut filtered: Vec<Statement> = stmts
            .into_iter()
            .filter(|s| !matches!(s, Statement::Null))
            .collect();
        match filtered.len() {
            0 => Statement::Null,
            1 => filtered.pop().unwrap(),
            _ => Statement::Multi(filtered),
        }
    }
}
