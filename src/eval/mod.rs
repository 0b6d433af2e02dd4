// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Walks a parsed [`Template`], evaluating expressions against a scope
//! stack and driving HTML emission.
//!
//! The evaluator never inspects a value's concrete representation — it
//! only calls the operations on [`Value`] — and it never touches source
//! text; everything it sees has already gone through [`crate::parser`].
//!
//! # Scope closures and the host boundary
//!
//! A macro or lambda value must be `'static` (see
//! [`crate::value::Function`]): calling it later can't borrow anything
//! from the render that defined it. So `DefMacro` and `Lambda` capture the
//! [`Scope`] at the point of definition *by value* (a deep clone), but they
//! do **not** capture the host [`Context`] — a render's `Context` is
//! borrowed only for the duration of that render, not owned. A variable
//! miss inside a macro or lambda body therefore resolves to `V::null()`
//! directly, rather than falling through to the host `lookup` the way a
//! top-level expression does. In practice this rarely matters: a macro's
//! whole point is that its parameters are what callers pass it.

pub mod scope;

use crate::ast::{Expression, Macro, Statement, Template};
use crate::context::{Context, WriterContext};
use crate::html::Html;
use crate::value::{Function, Value};
use scope::Scope;
use std::sync::Arc;
use tracing::trace;

/// Where emitted HTML goes, and what backs a scope miss — the two things
/// that differ between a top-level render (backed by a host [`Context`])
/// and a closure invocation (backed by nothing but its own output buffer).
trait Sink<V: Value> {
    fn write_html(&mut self, html: &Html);
    fn lookup(&self, name: &str) -> V;
}

struct CtxSink<'a, V, C> {
    ctx: &'a mut C,
    _marker: std::marker::PhantomData<V>,
}

impl<'a, V: Value, C: Context<V>> Sink<V> for CtxSink<'a, V, C> {
    fn write_html(&mut self, html: &Html) {
        self.ctx.write_html(html);
    }

    fn lookup(&self, name: &str) -> V {
        self.ctx.lookup(name)
    }
}

/// The sink used inside a macro/lambda invocation: no host to fall back
/// to, just a local buffer.
struct BufferSink<V> {
    buffer: Html,
    _marker: std::marker::PhantomData<V>,
}

impl<V: Value> BufferSink<V> {
    fn new() -> Self {
        BufferSink { buffer: Html::empty(), _marker: std::marker::PhantomData }
    }
}

impl<V: Value> Sink<V> for BufferSink<V> {
    fn write_html(&mut self, html: &Html) {
        self.buffer.append(html);
    }

    fn lookup(&self, _name: &str) -> V {
        V::null()
    }
}

/// Renders `template` against `ctx`, writing emitted HTML through
/// `Context::write_html`.
pub fn render<V, C>(ctx: &mut C, template: &Template)
where
    V: Value,
    C: Context<V>,
{
    let mut scope = Scope::new();
    seed_builtins(&mut scope);
    let mut sink = CtxSink { ctx, _marker: std::marker::PhantomData };
    render_template(template, &mut scope, &mut sink);
}

/// Renders `template` against a pure lookup function, returning the
/// accumulated output as a single [`Html`] value.
pub fn render_pure<V, F>(lookup_fn: F, template: &Template) -> Html
where
    V: Value,
    F: Fn(&str) -> V,
{
    let mut ctx = WriterContext::from_lookup_fn(lookup_fn);
    render(&mut ctx, template);
    ctx.into_html()
}

/// Binds the evaluator's sole intrinsic: `raw`, a function that re-wraps
/// its first argument's text as unescaped HTML.
fn seed_builtins<V: Value>(scope: &mut Scope<V>) {
    let raw: Function<V> = Arc::new(|args: Vec<(Option<String>, V)>| {
        let first = args.into_iter().next().map(|(_, v)| v).unwrap_or_else(V::null);
        V::from_html(Html::raw(first.to_text()))
    });
    scope.set("raw", V::from_function(raw));
}

/// Follows a template's `parent` chain and evaluates the base template's
/// body, resolving `BlockRef`s against the full chain (most-derived
/// first).
fn render_template<V: Value, S: Sink<V>>(template: &Template, scope: &mut Scope<V>, sink: &mut S) {
    let mut chain: Vec<&Template> = Vec::new();
    let mut cur = template;
    loop {
        chain.push(cur);
        match &cur.parent {
            Some(p) => cur = p,
            None => break,
        }
    }
    let base = *chain.last().expect("chain always has at least `template` itself");
    eval_statement(&base.body, &chain, scope, sink);
}

fn eval_statement<V: Value, S: Sink<V>>(
    stmt: &Statement,
    chain: &[&Template],
    scope: &mut Scope<V>,
    sink: &mut S,
) {
    match stmt {
        Statement::Null => {}
        Statement::Multi(stmts) => {
            for s in stmts {
                eval_statement(s, chain, scope, sink);
            }
        }
        Statement::Literal(text) => sink.write_html(&Html::raw(text.clone())),
        Statement::Interpolation(e) => {
            let v = eval_expression(e, scope, sink);
            sink.write_html(&v.to_html());
        }
        Statement::If(cond, then_branch, else_branch) => {
            if eval_expression(cond, scope, sink).to_boolean() {
                eval_statement(then_branch, chain, scope, sink);
            } else {
                eval_statement(else_branch, chain, scope, sink);
            }
        }
        Statement::For(value_var, index_var, iteree, body) => {
            let iterable = eval_expression(iteree, scope, sink);
            let keys = iterable.iter_keys();
            let values = iterable.to_list();
            for (k, v) in keys.into_iter().zip(values) {
                scope.push_frame();
                scope.set(value_var.clone(), v);
                if let Some(iv) = index_var {
                    scope.set(iv.clone(), k);
                }
                eval_statement(body, chain, scope, sink);
                scope.pop_frame();
            }
        }
        Statement::SetVar(name, e) => {
            let v = eval_expression(e, scope, sink);
            scope.set(name.clone(), v);
        }
        Statement::DefMacro(name, macro_def) => {
            let f = make_macro_function(macro_def, scope);
            scope.set(name.clone(), V::from_function(f));
        }
        Statement::BlockRef(name) => {
            if let Some(owner) = chain.iter().find(|t| t.blocks.contains_key(name)) {
                let block = &owner.blocks[name];
                eval_statement(&block.body, chain, scope, sink);
            } else {
                trace!(block = %name, "block has no definition in the inheritance chain");
            }
        }
        Statement::Scoped(body) => {
            scope.push_frame();
            eval_statement(body, chain, scope, sink);
            scope.pop_frame();
        }
        Statement::PreprocessedInclude(sub) => {
            render_template(sub, scope, sink);
        }
    }
}

fn eval_expression<V: Value, S: Sink<V>>(expr: &Expression, scope: &mut Scope<V>, sink: &mut S) -> V {
    match expr {
        Expression::Str(s) => V::from_str(s.clone()),
        Expression::Num(n) => V::from_number(*n),
        Expression::Bool(b) => V::from_bool(*b),
        Expression::Null => V::null(),
        Expression::Var(name) => scope.get(name).unwrap_or_else(|| sink.lookup(name)),
        Expression::List(items) => {
            let values: Vec<V> = items.iter().map(|e| eval_expression(e, scope, sink)).collect();
            V::from_list(values)
        }
        Expression::Object(pairs) => {
            let entries: Vec<(String, V)> = pairs
                .iter()
                .map(|(k, v)| {
                    let key = eval_expression(k, scope, sink).to_text();
                    let val = eval_expression(v, scope, sink);
                    (key, val)
                })
                .collect();
            V::from_object(entries)
        }
        Expression::MemberLookup(base, idx) => {
            let base_v = eval_expression(base, scope, sink);
            let idx_v = eval_expression(idx, scope, sink);
            base_v.lookup_loose(&idx_v).unwrap_or_else(V::null)
        }
        Expression::Call(callee, args) => {
            let callee_v = eval_expression(callee, scope, sink);
            let evaluated_args: Vec<(Option<String>, V)> = args
                .iter()
                .map(|(name, e)| (name.clone(), eval_expression(e, scope, sink)))
                .collect();
            match callee_v.to_function() {
                Some(f) => f(evaluated_args),
                None => V::null(),
            }
        }
        Expression::Lambda(params, body) => {
            let f = make_lambda_function(params, body, scope);
            V::from_function(f)
        }
    }
}

fn make_macro_function<V: Value>(macro_def: &Macro, scope: &Scope<V>) -> Function<V> {
    let params = macro_def.args.clone();
    let body = (*macro_def.body).clone();
    let captured = scope.clone();
    Arc::new(move |call_args: Vec<(Option<String>, V)>| {
        let mut local_scope = captured.clone();
        local_scope.push_frame();
        bind_params(&mut local_scope, &params, call_args);
        let mut buf: BufferSink<V> = BufferSink::new();
        eval_statement(&body, &[], &mut local_scope, &mut buf);
        V::from_html(buf.buffer)
    })
}

fn make_lambda_function<V: Value>(params: &[String], body: &Expression, scope: &Scope<V>) -> Function<V> {
    let params = params.to_vec();
    let body = body.clone();
    let captured = scope.clone();
    Arc::new(move |call_args: Vec<(Option<String>, V)>| {
        let mut local_scope = captured.clone();
        local_scope.push_frame();
        bind_params(&mut local_scope, &params, call_args);
        let mut buf: BufferSink<V> = BufferSink::new();
        eval_expression(&body, &mut local_scope, &mut buf)
    })
}

/// Binds `params` positionally first, then by name, against `call_args`
/// (order as written at the call site); unfilled trailing parameters bind
/// to `V::null()`. Extra arguments beyond the parameter list are ignored.
fn bind_params<V: Value>(scope: &mut Scope<V>, params: &[String], call_args: Vec<(Option<String>, V)>) {
    let mut by_name: std::collections::HashMap<String, V> = std::collections::HashMap::new();
    let mut positional: Vec<V> = Vec::new();
    for (name, v) in call_args {
        match name {
            Some(n) => {
                by_name.insert(n, v);
            }
            None => positional.push(v),
        }
    }
    let mut positional = positional.into_iter();
    for p in params {
        let v = by_name.remove(p).or_else(|| positional.next()).unwrap_or_else(V::null);
        scope.set(p.clone(), v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Dynamic;
    use std::collections::HashMap as StdHashMap;

    fn run(template_src: &str, vars: StdHashMap<&str, Dynamic>) -> String {
        let resolver = crate::resolver::MemoryResolver::new();
        let template = crate::parser::parse(&resolver, None, template_src).unwrap();
        let html = render_pure(
            move |name: &str| vars.get(name).cloned().unwrap_or(Dynamic::Null),
            &template,
        );
        html.into_string()
    }

    #[test]
    fn literal_fidelity() {
        assert_eq!(run("hello, world", StdHashMap::new()), "hello, world");
    }

    #[test]
    fn if_else_dispatches_on_truthiness() {
        let mut vars = StdHashMap::new();
        vars.insert("flag", Dynamic::Bool(true));
        assert_eq!(
            run("{% if flag %}yes{% else %}no{% endif %}", vars),
            "yes"
        );
    }

    #[test]
    fn for_loop_with_index() {
        let mut vars = StdHashMap::new();
        vars.insert("items", Dynamic::List(vec![Dynamic::str("a"), Dynamic::str("b")]));
        let out = run("{% for i, x in items %}{{ i }}:{{ x }} {% endfor %}", vars);
        assert_eq!(out, "0:a 1:b ");
    }

    #[test]
    fn set_scoping_matches_property_11() {
        let out = run(
            "{% set x = 1 %}{{ x }}{% scope %}{% set x = 2 %}{{ x }}{% endscope %}{{ x }}",
            StdHashMap::new(),
        );
        assert_eq!(out, "121");
    }

    #[test]
    fn macro_call_matches_property_12() {
        let out = run(
            "{% macro greet(name) %}Hi, {{ name }}!{% endmacro %}{{ greet(\"Ann\") }}",
            StdHashMap::new(),
        );
        assert_eq!(out, "Hi, Ann!");
    }

    #[test]
    fn missing_variable_is_soft_null() {
        assert_eq!(run("[{{ nope }}]", StdHashMap::new()), "[]");
    }

    #[test]
    fn raw_bypasses_escaping() {
        let mut vars = StdHashMap::new();
        vars.insert("markup", Dynamic::str("<b>x</b>"));
        assert_eq!(run("{{ markup }}", vars.clone()), "&lt;b&gt;x&lt;/b&gt;");
        assert_eq!(run("{{ raw(markup) }}", vars), "<b>x</b>");
    }
}
