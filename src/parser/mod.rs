// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The template parser: turns source text into a [`Template`] AST.
//!
//! # Entry points
//!
//! [`parse`] and [`parse_file`] are the two public entry points; both take
//! an [`IncludeResolver`] because `{% extends %}` and `{% include %}` may
//! need to resolve and recursively parse other sources mid-parse.
//!
//! # Tag delimiters
//!
//! See the crate-level documentation for the full grammar. In short: three
//! tag families (`{{ }}` interpolation, `{% %}` statement, `{# #}`
//! comment), each statement/comment tag with a whitespace-trimming variant
//! (`{%- -%}`, `{#- -#}`) that eats adjacent whitespace, and the plain
//! close of a statement/comment tag additionally eating exactly one
//! trailing newline.

pub mod expr;
mod lexer;

use crate::ast::{Block, Expression, Macro, Statement, Template};
use crate::error::{ParserError, Result};
use crate::resolver::IncludeResolver;
use lexer::{new_span, ws0, Span};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Whether a tag's opening delimiter was the plain or whitespace-trimming
/// variant. Either close variant is accepted regardless of which open
/// variant was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trim {
    Plain,
    Trim,
}

/// Parse-time context that does not change within a single template
/// parse: the include resolver and bookkeeping for cycle/depth detection
/// across a chain of `{% extends %}` / `{% include %}`.
struct ParseCtx<'r> {
    resolver: &'r dyn IncludeResolver,
    /// Canonical names currently being parsed, innermost last — used to
    /// detect include cycles.
    stack: Vec<String>,
    max_depth: usize,
}

/// One template's worth of mutable parse state: the block table
/// accumulated as `{% block %}` definitions are encountered.
#[derive(Default)]
struct ParseState {
    blocks: HashMap<String, Block>,
}

/// The default include-recursion ceiling, matching `EngineConfig::default`.
/// `parse`/`parse_file` use this directly; [`crate::engine::Engine`] threads
/// through its own configured value via [`parse_with_depth`]/
/// [`parse_file_with_depth`].
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 64;

/// Parses `source` (named `source_name`, if given) into a [`Template`].
pub fn parse(
    resolver: &dyn IncludeResolver,
    source_name: Option<&str>,
    source: &str,
) -> Result<Template> {
    parse_with_depth(resolver, source_name, source, DEFAULT_MAX_INCLUDE_DEPTH)
}

/// Like [`parse`], with an explicit include-recursion ceiling.
pub fn parse_with_depth(
    resolver: &dyn IncludeResolver,
    source_name: Option<&str>,
    source: &str,
    max_depth: usize,
) -> Result<Template> {
    let name = source_name.unwrap_or("<template>").to_string();
    let _span = tracing::debug_span!("parse_template", source = %name).entered();
    let mut ctx = ParseCtx {
        resolver,
        stack: vec![name.clone()],
        max_depth,
    };
    parse_with_ctx(&mut ctx, &name, source)
}

/// Resolves `source_name` via `resolver`, then parses it.
pub fn parse_file(resolver: &dyn IncludeResolver, source_name: &str) -> Result<Template> {
    parse_file_with_depth(resolver, source_name, DEFAULT_MAX_INCLUDE_DEPTH)
}

/// Like [`parse_file`], with an explicit include-recursion ceiling.
pub fn parse_file_with_depth(
    resolver: &dyn IncludeResolver,
    source_name: &str,
    max_depth: usize,
) -> Result<Template> {
    let _span = tracing::debug_span!("parse_file", source = %source_name).entered();
    let resolved = resolver
        .resolve("", source_name)
        .map_err(|e| ParserError::Syntax {
            message: format!("error reading {source_name:?}: {e}"),
            source_name: Some(source_name.to_string()),
            line: None,
            column: None,
        })?
        .ok_or_else(|| ParserError::TemplateNotFound(source_name.to_string()))?;
    let mut ctx = ParseCtx {
        resolver,
        stack: vec![resolved.name.clone()],
        max_depth,
    };
    parse_with_ctx(&mut ctx, &resolved.name, &resolved.source)
}

fn parse_with_ctx(ctx: &mut ParseCtx, name: &str, source: &str) -> Result<Template> {
    let mut state = ParseState::default();
    let input = new_span(source);
    let (input, _) = skip_ws(input);

    if let Some(after_kw) = try_stmt_open_keyword(input, "extends") {
        let (after_ws, _) = skip_ws(after_kw);
        let (after_expr, target_expr) = expr::parse_expression(after_ws).map_err(|e| e.with_source_name(name))?;
        let target = match &target_expr {
            Expression::Str(s) => s.clone(),
            _ => return Err(syntax_error(source, name, after_expr, "extends target must be a string literal")),
        };
        let after_tag = close_stmt_tag(after_expr)
            .map_err(|_| syntax_error(source, name, after_expr, "expected \"%}\" or \"-%}\""))?;

        let parent = resolve_and_parse(ctx, name, &target)?;

        let mut p = Parser { ctx, state: &mut state, source, name };
        let mut rest = after_tag;
        loop {
            let (after_literal, _) = p.parse_body(rest, &["block"])?;
            rest = after_literal;
            if try_stmt_open_keyword(rest, "block").is_some() {
                let (after_stmt, _) = p.parse_statement(rest)?;
                rest = after_stmt;
            } else {
                break;
            }
        }
        if !rest.fragment().trim().is_empty() {
            return Err(syntax_error(
                source,
                name,
                rest,
                "a derived template may only contain block definitions after `extends`",
            ));
        }

        return Ok(Template {
            body: Statement::Null,
            parent: Some(Arc::new(parent)),
            blocks: state.blocks,
        });
    }

    let mut p = Parser { ctx, state: &mut state, source, name };
    let (rest, body) = p.parse_body(input, &[])?;
    if !rest.fragment().is_empty() {
        return Err(syntax_error(source, name, rest, "unexpected trailing input"));
    }
    Ok(Template {
        body,
        parent: None,
        blocks: state.blocks,
    })
}

fn resolve_and_parse(ctx: &mut ParseCtx, from: &str, name: &str) -> Result<Template> {
    if ctx.stack.len() >= ctx.max_depth {
        return Err(ParserError::IncludeDepthExceeded {
            max: ctx.max_depth,
            name: name.to_string(),
        });
    }
    let resolved = ctx
        .resolver
        .resolve(from, name)
        .map_err(|e| ParserError::Syntax {
            message: format!("error reading {name:?}: {e}"),
            source_name: Some(from.to_string()),
            line: None,
            column: None,
        })?
        .ok_or_else(|| ParserError::TemplateNotFound(name.to_string()))?;

    if ctx.stack.contains(&resolved.name) {
        let mut chain = ctx.stack.clone();
        chain.push(resolved.name.clone());
        warn!(chain = ?chain, "include cycle detected");
        return Err(ParserError::IncludeCycle { chain });
    }
    trace!(depth = ctx.stack.len(), name = %resolved.name, "resolving include");
    ctx.stack.push(resolved.name.clone());
    let result = parse_with_ctx(ctx, &resolved.name, &resolved.source);
    ctx.stack.pop();
    result.map_err(|e| match e {
        ParserError::Syntax { message, .. } => ParserError::Syntax {
            message: format!("in included template {:?}: {message}", resolved.name),
            source_name: Some(from.to_string()),
            line: None,
            column: None,
        },
        other => other,
    })
}

/// The hand-rolled recursive-descent parser over one template's source.
///
/// Holds a reference to the shared [`ParseCtx`] (resolver, include stack)
/// and the per-template [`ParseState`] (block table); the input itself is
/// threaded explicitly through each method rather than stored on `self`,
/// matching the combinator style of [`lexer`] and [`expr`].
pub(crate) struct Parser<'p, 'r, 'a> {
    ctx: &'p mut ParseCtx<'r>,
    state: &'p mut ParseState,
    source: &'a str,
    name: &'a str,
}

impl<'p, 'r, 'a> Parser<'p, 'r, 'a> {
    /// Parses a sequence of statements until either the input is
    /// exhausted or the next statement tag's keyword is one of
    /// `terminators` (which is left unconsumed for the caller).
    fn parse_body(&mut self, mut input: Span<'a>, terminators: &[&str]) -> Result<(Span<'a>, Statement)> {
        let mut stmts = Vec::new();
        loop {
            if input.fragment().is_empty() {
                break;
            }
            if let Some(kw) = peek_stmt_keyword(input) {
                if terminators.contains(&kw.as_str()) {
                    break;
                }
            }
            let (rest, stmt) = self.parse_statement(input)?;
            stmts.push(stmt);
            input = rest;
        }
        Ok((input, Statement::multi(stmts)))
    }

    fn parse_statement(&mut self, input: Span<'a>) -> Result<(Span<'a>, Statement)> {
        if input.fragment().starts_with("{{") {
            return self.parse_interpolation(input);
        }
        if input.fragment().starts_with("{#") {
            return self.parse_comment(input);
        }
        if input.fragment().starts_with("{%") {
            let (after_open, open_trim) = consume_stmt_open(input);
            let (after_ws, _) = skip_ws(after_open);
            let (after_kw, kw) = self.lex(after_ws, lexer::identifier, "a statement keyword")?;
            return match kw.as_str() {
                "if" => self.parse_if(after_kw, open_trim),
                "set" => self.parse_set(after_kw, open_trim),
                "for" => self.parse_for(after_kw, open_trim),
                "include" => self.parse_include(after_kw, open_trim),
                "macro" => self.parse_macro(after_kw, open_trim),
                "block" => self.parse_block(after_kw, open_trim),
                "call" => self.parse_call(after_kw, open_trim),
                "scope" => self.parse_scope(after_kw, open_trim),
                other => Err(self.err(after_kw, format!("unexpected tag {other:?}"))),
            };
        }
        self.parse_literal(input)
    }

    fn parse_literal(&mut self, input: Span<'a>) -> Result<(Span<'a>, Statement)> {
        let bytes = input.fragment();
        let end = find_next_tag(bytes).unwrap_or(bytes.len());
        let text = &bytes[..end];
        if text.is_empty() {
            return Err(self.err(input, "unexpected \"{{\" (a literal must not be empty)"));
        }
        let text = if find_next_tag_is_trim(bytes, end) {
            text.trim_end().to_string()
        } else {
            text.to_string()
        };
        let rest = slice_from(input, end);
        Ok((rest, Statement::Literal(text)))
    }

    fn parse_comment(&mut self, input: Span<'a>) -> Result<(Span<'a>, Statement)> {
        let (after_open, _open_trim) = consume_comment_open(input);
        let bytes = after_open.fragment();
        let end = bytes
            .find("#}")
            .ok_or_else(|| self.err(after_open, "unterminated comment, expected \"#}\""))?;
        let close_trim = end >= 1 && &bytes[end - 1..end] == "-";
        let after = slice_from(after_open, end + 2);
        let (after, _) = if close_trim { skip_ws(after) } else { eat_one_newline(after) };
        Ok((after, Statement::Null))
    }

    fn parse_interpolation(&mut self, input: Span<'a>) -> Result<(Span<'a>, Statement)> {
        let after_open = slice_from(input, 2);
        let (after, e) = expr::parse_expression(after_open).map_err(|e| e.with_source_name(self.name))?;
        let (after, _) = skip_ws(after);
        let after = expect_tag(after, "}}").map_err(|_| self.err(after, "expected \"}}\""))?;
        Ok((after, Statement::Interpolation(e)))
    }

    fn parse_if(&mut self, input: Span<'a>, open_trim: Trim) -> Result<(Span<'a>, Statement)> {
        let (input, _) = skip_ws(input);
        let (input, cond) = expr::parse_expression(input).map_err(|e| e.with_source_name(self.name))?;
        let after = self.close_tag(input, open_trim)?;

        let (after, then_branch) = self.parse_body(after, &["elif", "else", "endif"])?;
        let Some(kw) = peek_stmt_keyword(after) else {
            return Err(self.err(after, "unterminated if, expected \"endif\""));
        };

        match kw.as_str() {
            "elif" => {
                // Desugars into a nested `If`: the recursive call parses
                // "as if" this were a fresh `if` tag and consumes
                // everything up to and including the eventual `endif`.
                let (after_open, elif_trim) = consume_stmt_open(after);
                let (after_ws, _) = skip_ws(after_open);
                let (after_kw, _) = lexer::identifier(after_ws).expect("matched elif above");
                let (after_nested, else_branch) = self.parse_if(after_kw, elif_trim)?;
                Ok((after_nested, Statement::If(cond, Box::new(then_branch), Box::new(else_branch))))
            }
            "else" => {
                let after_tag = self.consume_bare_tag(after, "else")?;
                let (after_body, else_branch) = self.parse_body(after_tag, &["endif"])?;
                let after_end = self.consume_end_tag(after_body, "endif")?;
                Ok((after_end, Statement::If(cond, Box::new(then_branch), Box::new(else_branch))))
            }
            "endif" => {
                let after_end = self.consume_end_tag(after, "endif")?;
                Ok((after_end, Statement::If(cond, Box::new(then_branch), Box::new(Statement::Null))))
            }
            other => Err(self.err(after, format!("unexpected {other:?} inside if"))),
        }
    }

    fn parse_set(&mut self, input: Span<'a>, open_trim: Trim) -> Result<(Span<'a>, Statement)> {
        let (input, _) = skip_ws(input);
        let (input, name) = self.lex(input, lexer::identifier, "a variable name")?;
        let (input, _) = skip_ws(input);
        let input = expect_tag(input, "=").map_err(|_| self.err(input, "expected \"=\""))?;
        let (input, _) = skip_ws(input);
        let (input, e) = expr::parse_expression(input).map_err(|e| e.with_source_name(self.name))?;
        let after = self.close_tag(input, open_trim)?;
        Ok((after, Statement::SetVar(name, e)))
    }

    fn parse_for(&mut self, input: Span<'a>, open_trim: Trim) -> Result<(Span<'a>, Statement)> {
        let (input, _) = skip_ws(input);

        // Disambiguate the three `for` forms by lookahead: `index, var in
        // expr`, `var in expr`, or `expr as var`.
        if let Ok((after_idx, index_var)) = lexer::identifier(input) {
            let (after_ws, _) = skip_ws(after_idx);
            if after_ws.fragment().starts_with(',') {
                let after_comma = slice_from(after_ws, 1);
                let (after_comma, _) = skip_ws(after_comma);
                let (after_var, value_var) = self.lex(after_comma, lexer::identifier, "the loop value variable")?;
                let (after_var, _) = skip_ws(after_var);
                let after_in = expect_tag(after_var, "in").map_err(|_| self.err(after_var, "expected \"in\""))?;
                let (after_in, _) = skip_ws(after_in);
                let (after_expr, iteree) = expr::parse_expression(after_in).map_err(|e| e.with_source_name(self.name))?;
                let after = self.close_tag(after_expr, open_trim)?;
                let (after_body, body) = self.parse_body(after, &["endfor"])?;
                let after_end = self.consume_end_tag(after_body, "endfor")?;
                return Ok((after_end, Statement::For(value_var, Some(index_var), iteree, Box::new(body))));
            }
            if after_ws.fragment().starts_with("in")
                && !after_ws.fragment()[2..].starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_')
            {
                let after_in = slice_from(after_ws, 2);
                let (after_in, _) = skip_ws(after_in);
                let (after_expr, iteree) = expr::parse_expression(after_in).map_err(|e| e.with_source_name(self.name))?;
                let after = self.close_tag(after_expr, open_trim)?;
                let (after_body, body) = self.parse_body(after, &["endfor"])?;
                let after_end = self.consume_end_tag(after_body, "endfor")?;
                return Ok((after_end, Statement::For(index_var, None, iteree, Box::new(body))));
            }
        }

        // `for <expr> as <iter>`.
        let (input, iteree) = expr::parse_expression(input).map_err(|e| e.with_source_name(self.name))?;
        let (input, _) = skip_ws(input);
        let input = expect_tag(input, "as").map_err(|_| self.err(input, "expected \"as\""))?;
        let (input, _) = skip_ws(input);
        let (input, value_var) = self.lex(input, lexer::identifier, "the loop variable")?;
        let after = self.close_tag(input, open_trim)?;
        let (after_body, body) = self.parse_body(after, &["endfor"])?;
        let after_end = self.consume_end_tag(after_body, "endfor")?;
        Ok((after_end, Statement::For(value_var, None, iteree, Box::new(body))))
    }

    fn parse_include(&mut self, input: Span<'a>, open_trim: Trim) -> Result<(Span<'a>, Statement)> {
        let (input, _) = skip_ws(input);
        let (input, target_expr) = expr::parse_expression(input).map_err(|e| e.with_source_name(self.name))?;
        let target = match &target_expr {
            Expression::Str(s) => s.clone(),
            _ => return Err(self.err(input, "include target must be a string literal")),
        };
        let after = self.close_tag(input, open_trim)?;
        let name = self.name.to_string();
        let sub = resolve_and_parse(self.ctx, &name, &target)?;
        Ok((after, Statement::PreprocessedInclude(Arc::new(sub))))
    }

    fn parse_macro(&mut self, input: Span<'a>, open_trim: Trim) -> Result<(Span<'a>, Statement)> {
        let (input, _) = skip_ws(input);
        let (input, name) = self.lex(input, lexer::identifier, "a macro name")?;
        let (input, _) = skip_ws(input);
        let input = expect_tag(input, "(").map_err(|_| self.err(input, "expected \"(\""))?;
        let (input, args) = self.parse_ident_list(input, ")")?;
        let after = self.close_tag(input, open_trim)?;
        let (after_body, body) = self.parse_body(after, &["endmacro"])?;
        let after_end = self.consume_end_tag_with_optional_name(after_body, "endmacro")?;
        Ok((after_end, Statement::DefMacro(name, Macro { args, body: Box::new(body) })))
    }

    fn parse_block(&mut self, input: Span<'a>, open_trim: Trim) -> Result<(Span<'a>, Statement)> {
        let (input, _) = skip_ws(input);
        let (input, name) = self.lex(input, lexer::identifier, "a block name")?;
        let after = self.close_tag(input, open_trim)?;
        let (after_body, body) = self.parse_body(after, &["endblock"])?;
        let after_end = self.consume_end_tag_with_optional_name(after_body, "endblock")?;
        self.state.blocks.insert(name.clone(), Block { body: body.clone() });
        debug!(block = %name, "captured block definition");
        Ok((after_end, Statement::BlockRef(name)))
    }

    fn parse_call(&mut self, input: Span<'a>, open_trim: Trim) -> Result<(Span<'a>, Statement)> {
        let (input, _) = skip_ws(input);
        let (input, caller_args) = if input.fragment().starts_with('(') {
            self.parse_ident_list(slice_from(input, 1), ")")?
        } else {
            (input, Vec::new())
        };
        let (input, _) = skip_ws(input);
        let (input, call_expr) = expr::parse_expression(input).map_err(|e| e.with_source_name(self.name))?;
        let after = self.close_tag(input, open_trim)?;
        let (after_body, body) = self.parse_body(after, &["endcall"])?;
        let after_end = self.consume_end_tag(after_body, "endcall")?;

        let caller_macro = Statement::DefMacro(
            "caller".to_string(),
            Macro { args: caller_args, body: Box::new(body) },
        );
        Ok((
            after_end,
            Statement::Scoped(Box::new(Statement::Multi(vec![caller_macro, Statement::Interpolation(call_expr)]))),
        ))
    }

    fn parse_scope(&mut self, input: Span<'a>, open_trim: Trim) -> Result<(Span<'a>, Statement)> {
        let after = self.close_tag(input, open_trim)?;
        let (after_body, body) = self.parse_body(after, &["endscope"])?;
        let after_end = self.consume_end_tag(after_body, "endscope")?;
        Ok((after_end, Statement::Scoped(Box::new(body))))
    }

    /// Parses a parenthesized, comma-separated identifier list up to and
    /// including `close` (e.g. `")"`), used by `macro` and `call`. The
    /// opening delimiter is assumed already consumed by the caller.
    fn parse_ident_list(&mut self, mut input: Span<'a>, close: &str) -> Result<(Span<'a>, Vec<String>)> {
        let mut names = Vec::new();
        loop {
            let (after_ws, _) = skip_ws(input);
            if after_ws.fragment().starts_with(close) {
                input = slice_from(after_ws, close.len());
                break;
            }
            let (after_name, name) = self.lex(after_ws, lexer::identifier, "a parameter name")?;
            names.push(name);
            let (after_ws2, _) = skip_ws(after_name);
            if after_ws2.fragment().starts_with(',') {
                input = slice_from(after_ws2, 1);
            } else if after_ws2.fragment().starts_with(close) {
                input = slice_from(after_ws2, close.len());
                break;
            } else {
                return Err(self.err(after_ws2, format!("expected \",\" or {close:?}")));
            }
        }
        Ok((input, names))
    }

    /// Closes a `{% ... %}` tag (either close variant is accepted).
    fn close_tag(&mut self, input: Span<'a>, _open_trim: Trim) -> Result<Span<'a>> {
        close_stmt_tag(input).map_err(|_| self.err(input, "expected \"%}\" or \"-%}\""))
    }

    fn consume_bare_tag(&mut self, input: Span<'a>, keyword: &str) -> Result<Span<'a>> {
        let (after_open, open_trim) = consume_stmt_open(input);
        let (after_ws, _) = skip_ws(after_open);
        let after_kw = expect_tag(after_ws, keyword).map_err(|_| self.err(after_ws, format!("expected {keyword:?}")))?;
        self.close_tag(after_kw, open_trim)
    }

    fn consume_end_tag(&mut self, input: Span<'a>, keyword: &str) -> Result<Span<'a>> {
        self.consume_bare_tag(input, keyword)
    }

    /// Like [`Self::consume_end_tag`], but additionally accepts (and
    /// ignores) a trailing bare name, as `{% endblock name %}` /
    /// `{% endmacro name %}` do. The name is never checked against the
    /// opening name.
    fn consume_end_tag_with_optional_name(&mut self, input: Span<'a>, keyword: &str) -> Result<Span<'a>> {
        let (after_open, open_trim) = consume_stmt_open(input);
        let (after_ws, _) = skip_ws(after_open);
        let after_kw = expect_tag(after_ws, keyword).map_err(|_| self.err(after_ws, format!("expected {keyword:?}")))?;
        let (after_ws2, _) = skip_ws(after_kw);
        let after_name = match lexer::identifier(after_ws2) {
            Ok((rest, _)) => rest,
            Err(_) => after_ws2,
        };
        self.close_tag(after_name, open_trim)
    }

    /// Runs a stateless `nom`-style lexer combinator, converting its
    /// error (if any) into a [`ParserError`] tagged with this parse's
    /// source name and location.
    fn lex<O>(
        &self,
        input: Span<'a>,
        f: impl FnOnce(Span<'a>) -> nom::IResult<Span<'a>, O>,
        expecting: &str,
    ) -> Result<(Span<'a>, O)> {
        f(input).map_err(|_| self.err(input, format!("expecting {expecting}")))
    }

    fn err(&self, at: Span<'a>, message: impl Into<String>) -> ParserError {
        syntax_error(self.source, self.name, at, message)
    }
}

fn syntax_error(source: &str, name: &str, at: Span, message: impl Into<String>) -> ParserError {
    let line = at.location_line() as usize;
    let column = at.get_utf8_column();
    let _ = source;
    ParserError::Syntax {
        message: message.into(),
        source_name: Some(name.to_string()),
        line: Some(line),
        column: Some(column),
    }
}

// --- tag delimiter helpers -------------------------------------------------

fn skip_ws(input: Span) -> (Span, ()) {
    ws0(input).map(|(r, _)| (r, ())).unwrap_or((input, ()))
}

fn expect_tag<'a>(input: Span<'a>, tag: &str) -> std::result::Result<Span<'a>, ()> {
    if input.fragment().starts_with(tag) {
        Ok(slice_from(input, tag.len()))
    } else {
        Err(())
    }
}

fn eat_one_newline(input: Span) -> (Span, ()) {
    if input.fragment().starts_with('\n') {
        (slice_from(input, 1), ())
    } else {
        (input, ())
    }
}

/// Consumes `{%` or `{%-`, returning which variant was seen.
fn consume_stmt_open(input: Span) -> (Span, Trim) {
    if input.fragment().starts_with("{%-") {
        (slice_from(input, 3), Trim::Trim)
    } else {
        (slice_from(input, 2), Trim::Plain)
    }
}

fn consume_comment_open(input: Span) -> (Span, Trim) {
    if input.fragment().starts_with("{#-") {
        (slice_from(input, 3), Trim::Trim)
    } else {
        (slice_from(input, 2), Trim::Plain)
    }
}

/// Consumes the close of a `{% %}` tag: whitespace, then `-%}` or `%}`
/// (the latter additionally eating one trailing newline).
fn close_stmt_tag(input: Span) -> std::result::Result<Span, ()> {
    let (input, _) = skip_ws(input);
    if input.fragment().starts_with("-%}") {
        let (after, _) = skip_ws(slice_from(input, 3));
        Ok(after)
    } else if input.fragment().starts_with("%}") {
        let (after, _) = eat_one_newline(slice_from(input, 2));
        Ok(after)
    } else {
        Err(())
    }
}

/// Peeks at the statement tag keyword starting at `input`, without
/// consuming: returns `None` if `input` doesn't start with `{%`/`{%-`, or
/// if what follows isn't an identifier.
fn peek_stmt_keyword(input: Span) -> Option<String> {
    if !input.fragment().starts_with("{%") {
        return None;
    }
    let (after_open, _) = consume_stmt_open(input);
    let (after_ws, _) = skip_ws(after_open);
    lexer::identifier(after_ws).ok().map(|(_, id)| id)
}

/// If `input` starts with `{% <keyword>` (either open trim variant),
/// returns the rest of the input right after the keyword (before the
/// tag's arguments/close). Used for the `extends`/`block` lookaheads that
/// don't go through the generic statement dispatcher.
fn try_stmt_open_keyword<'a>(input: Span<'a>, keyword: &str) -> Option<Span<'a>> {
    if !input.fragment().starts_with("{%") {
        return None;
    }
    let (after_open, _) = consume_stmt_open(input);
    let (after_ws, _) = skip_ws(after_open);
    if after_ws.fragment().starts_with(keyword) {
        Some(slice_from(after_ws, keyword.len()))
    } else {
        None
    }
}

/// Finds the byte offset of the next `{{`, `{%`, or `{#` in `text`, if
/// any.
fn find_next_tag(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'{' && matches!(bytes[i + 1], b'{' | b'%' | b'#') {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn find_next_tag_is_trim(text: &str, at: usize) -> bool {
    text.as_bytes().get(at + 2) == Some(&b'-')
}

/// Advances a [`Span`] by `n` bytes, preserving `nom_locate`'s line/column
/// bookkeeping.
pub(crate) fn slice_from(input: Span, n: usize) -> Span {
    use nom::Slice;
    input.slice(n..)
}
