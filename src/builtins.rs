// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Standard operator functions for [`Dynamic`].
//!
//! The expression grammar desugars every binary operator to a call of a
//! plain function value — `a + b` parses to `Call(Var("sum"), [a, b])` (see
//! [`crate::parser::expr`]) — rather than the evaluator special-casing
//! arithmetic. The evaluator itself stays value-type-agnostic: it only
//! ever calls [`crate::value::Value`] operations, none of which include
//! arithmetic or comparison. Resolving what `sum` or `equals` *mean* is a
//! host concern, supplied through [`crate::context::Context::lookup`]. The
//! evaluator itself only ever seeds `raw` into the root scope frame; a host
//! using [`Dynamic`] is expected to fall back to [`standard_builtins`] from
//! its own `lookup` (or `WriterContext`'s lookup closure) when a name isn't
//! one of its own variables.
//!
//! A host embedding its own [`Value`](crate::value::Value) type is free to
//! bind these names to whatever makes sense for its own representation —
//! nothing here is special beyond being this crate's defaults for its
//! reference value type.

use crate::value::{Dynamic, Function};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

fn arg(args: &[(Option<String>, Dynamic)], i: usize) -> Dynamic {
    args.get(i).map(|(_, v)| v.clone()).unwrap_or(Dynamic::Null)
}

fn as_number(v: &Dynamic) -> Option<Decimal> {
    match v {
        Dynamic::Number(n) => Some(*n),
        _ => None,
    }
}

fn dynamic_eq(a: &Dynamic, b: &Dynamic) -> bool {
    match (a, b) {
        (Dynamic::Null, Dynamic::Null) => true,
        (Dynamic::Bool(x), Dynamic::Bool(y)) => x == y,
        (Dynamic::Number(x), Dynamic::Number(y)) => x == y,
        (Dynamic::Str(x), Dynamic::Str(y)) => x == y,
        (Dynamic::List(xs), Dynamic::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| dynamic_eq(x, y))
        }
        (Dynamic::Object(xs), Dynamic::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, v)| ys.get(k).is_some_and(|v2| dynamic_eq(v, v2)))
        }
        (Dynamic::Html(x), Dynamic::Html(y)) => x.as_str() == y.as_str(),
        _ => false,
    }
}

use crate::value::Value;

fn binary(f: impl Fn(Dynamic, Dynamic) -> Dynamic + Send + Sync + 'static) -> Function<Dynamic> {
    Arc::new(move |args| f(arg(&args, 0), arg(&args, 1)))
}

/// The evaluator's default bindings for `Dynamic`, covering every operator
/// name the expression grammar can desugar to.
pub fn standard_builtins() -> HashMap<String, Dynamic> {
    let mut m = HashMap::new();
    let mut def = |name: &str, f: Function<Dynamic>| {
        m.insert(name.to_string(), Dynamic::Function(f));
    };

    def("equals", binary(|a, b| Dynamic::Bool(dynamic_eq(&a, &b))));
    def("nequals", binary(|a, b| Dynamic::Bool(!dynamic_eq(&a, &b))));
    def(
        "greater",
        binary(|a, b| match (as_number(&a), as_number(&b)) {
            (Some(x), Some(y)) => Dynamic::Bool(x > y),
            _ => Dynamic::Bool(a.to_text() > b.to_text()),
        }),
    );
    def(
        "less",
        binary(|a, b| match (as_number(&a), as_number(&b)) {
            (Some(x), Some(y)) => Dynamic::Bool(x < y),
            _ => Dynamic::Bool(a.to_text() < b.to_text()),
        }),
    );
    def(
        "greater_equals",
        binary(|a, b| match (as_number(&a), as_number(&b)) {
            (Some(x), Some(y)) => Dynamic::Bool(x >= y),
            _ => Dynamic::Bool(a.to_text() >= b.to_text()),
        }),
    );
    def(
        "less_equals",
        binary(|a, b| match (as_number(&a), as_number(&b)) {
            (Some(x), Some(y)) => Dynamic::Bool(x <= y),
            _ => Dynamic::Bool(a.to_text() <= b.to_text()),
        }),
    );
    def(
        "sum",
        binary(|a, b| match (as_number(&a), as_number(&b)) {
            (Some(x), Some(y)) => Dynamic::Number(x + y),
            _ => Dynamic::Null,
        }),
    );
    def(
        "difference",
        binary(|a, b| match (as_number(&a), as_number(&b)) {
            (Some(x), Some(y)) => Dynamic::Number(x - y),
            _ => Dynamic::Null,
        }),
    );
    def("concat", binary(|a, b| Dynamic::str(format!("{}{}", a.to_text(), b.to_text()))));
    def(
        "product",
        binary(|a, b| match (as_number(&a), as_number(&b)) {
            (Some(x), Some(y)) => Dynamic::Number(x * y),
            _ => Dynamic::Null,
        }),
    );
    def(
        "ratio",
        binary(|a, b| match (as_number(&a), as_number(&b)) {
            (Some(x), Some(y)) if !y.is_zero() => Dynamic::Number(x / y),
            _ => Dynamic::Null,
        }),
    );
    def(
        "int_ratio",
        binary(|a, b| match (as_number(&a), as_number(&b)) {
            (Some(x), Some(y)) if !y.is_zero() => Dynamic::Number((x / y).trunc()),
            _ => Dynamic::Null,
        }),
    );
    def(
        "modulo",
        binary(|a, b| match (as_number(&a), as_number(&b)) {
            (Some(x), Some(y)) if !y.is_zero() => Dynamic::Number(x % y),
            _ => Dynamic::Null,
        }),
    );
    def("any", binary(|a, b| Dynamic::Bool(a.to_boolean() || b.to_boolean())));
    def("all", binary(|a, b| Dynamic::Bool(a.to_boolean() && b.to_boolean())));

    m
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: &Dynamic, a: Dynamic, b: Dynamic) -> Dynamic {
        match f {
            Dynamic::Function(f) => f(vec![(None, a), (None, b)]),
            _ => panic!("not a function"),
        }
    }

    #[test]
    fn arithmetic_operators() {
        let b = standard_builtins();
        assert_eq!(call(&b["sum"], Dynamic::int(2), Dynamic::int(3)).to_text(), "5");
        assert_eq!(call(&b["difference"], Dynamic::int(5), Dynamic::int(2)).to_text(), "3");
        assert_eq!(call(&b["product"], Dynamic::int(4), Dynamic::int(3)).to_text(), "12");
        assert_eq!(call(&b["ratio"], Dynamic::int(7), Dynamic::int(2)).to_text(), "3.5");
        assert_eq!(call(&b["int_ratio"], Dynamic::int(7), Dynamic::int(2)).to_text(), "3");
        assert_eq!(call(&b["modulo"], Dynamic::int(7), Dynamic::int(2)).to_text(), "1");
    }

    #[test]
    fn division_by_zero_is_null_not_panic() {
        let b = standard_builtins();
        assert!(matches!(call(&b["ratio"], Dynamic::int(1), Dynamic::int(0)), Dynamic::Null));
    }

    #[test]
    fn equality_is_structural() {
        let b = standard_builtins();
        let list_a = Dynamic::List(vec![Dynamic::int(1), Dynamic::int(2)]);
        let list_b = Dynamic::List(vec![Dynamic::int(1), Dynamic::int(2)]);
        assert!(matches!(call(&b["equals"], list_a, list_b), Dynamic::Bool(true)));
        assert!(matches!(call(&b["nequals"], Dynamic::int(1), Dynamic::str("1")), Dynamic::Bool(true)));
    }

    #[test]
    fn boolean_operators_short_circuit_semantics_via_truthiness() {
        let b = standard_builtins();
        assert!(matches!(call(&b["any"], Dynamic::Bool(false), Dynamic::int(1)), Dynamic::Bool(true)));
        assert!(matches!(call(&b["all"], Dynamic::Bool(false), Dynamic::int(1)), Dynamic::Bool(false)));
    }
}
