// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The dynamic value model the evaluator is generic over.
//!
//! The evaluator (see [`crate::eval`]) never constructs or inspects values
//! directly; it only calls the handful of operations declared on the
//! [`Value`] trait. Host programs are expected to implement `Value` for
//! whatever representation their own data already lives in (a JSON tree, a
//! database row, a Lua table, ...). [`Dynamic`] is the reference
//! implementation, used by this crate's own tests and available to callers
//! who don't need anything fancier.

use crate::html::Html;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A callable value: takes ordered `(optional name, argument)` pairs and
/// returns a value. Argument order is preserved exactly as written at the
/// call site, positional and named mixed freely.
pub type Function<V> = Arc<dyn Fn(Vec<(Option<String>, V)>) -> V + Send + Sync>;

/// The operations the evaluator requires of a dynamic value type.
///
/// Implementors should keep these total (never panicking): the engine's
/// soft-fail discipline (see the crate's top-level documentation) depends
/// on every one of these operations always producing *a* value rather than
/// an error.
pub trait Value: Clone + Send + Sync + 'static {
    /// Truthiness: `Null`/`false`/`0`/`""`/`[]`/`{}` are false, everything
    /// else is true.
    fn to_boolean(&self) -> bool;

    /// Canonical textual rendering used for interpolation and string
    /// coercion (e.g. object keys, `~` concatenation).
    fn to_text(&self) -> String;

    /// Converts to an HTML fragment: identity if already HTML, otherwise
    /// the escaped `to_text` rendering.
    fn to_html(&self) -> Html;

    /// Coerces to a list of values: a list is itself, an object yields its
    /// values in iteration order, anything else yields an empty list.
    fn to_list(&self) -> Vec<Self>
    where
        Self: Sized;

    /// The keys to pair with `to_list` during iteration: a list yields
    /// integer indices as numbers, an object yields its string keys,
    /// anything else yields an empty list.
    fn iter_keys(&self) -> Vec<Self>
    where
        Self: Sized;

    /// Indexes into `self` by `index` (numeric index into a list, string
    /// key into an object). Returns `None` if there is nothing there.
    fn lookup_loose(&self, index: &Self) -> Option<Self>
    where
        Self: Sized;

    /// Extracts the callable projection of this value, if any.
    fn to_function(&self) -> Option<Function<Self>>
    where
        Self: Sized;

    /// The null value, used by the evaluator's soft-fail paths.
    fn null() -> Self;

    /// Constructs a boolean value, for evaluating `true`/`false` literals.
    fn from_bool(b: bool) -> Self;

    /// Constructs a number value, for evaluating number literals and
    /// arithmetic results.
    fn from_number(n: Decimal) -> Self;

    /// Constructs a string value, for evaluating string literals.
    fn from_str(s: String) -> Self;

    /// Constructs a list value, for evaluating list literals, preserving
    /// order.
    fn from_list(items: Vec<Self>) -> Self
    where
        Self: Sized;

    /// Constructs an object value, for evaluating object literals; later
    /// duplicate keys take precedence, matching source order.
    fn from_object(entries: Vec<(String, Self)>) -> Self
    where
        Self: Sized;

    /// Wraps an already-safe HTML fragment as a value, bypassing escaping.
    /// Used by the evaluator to build the `raw` built-in.
    fn from_html(html: Html) -> Self;

    /// Wraps a callable as a value. Used by the evaluator to bind `raw`,
    /// macros, and lambdas into scope.
    fn from_function(f: Function<Self>) -> Self
    where
        Self: Sized;
}

/// The engine's reference value implementation: a closed sum of null,
/// boolean, arbitrary-precision number, string, list, object, function,
/// and HTML.
#[derive(Clone)]
pub enum Dynamic {
    /// The absence of a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// An arbitrary-precision decimal number.
    Number(Decimal),
    /// A UTF-8 string.
    Str(String),
    /// An ordered sequence of values.
    List(Vec<Dynamic>),
    /// A mapping from string keys to values, iterated in sorted-key order.
    ///
    /// `BTreeMap` gives a deterministic `iter_keys` order; insertion order
    /// is not preserved.
    Object(BTreeMap<String, Dynamic>),
    /// A callable value.
    Function(Function<Dynamic>),
    /// An already-safe HTML fragment.
    Html(Html),
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Null => write!(f, "Null"),
            Dynamic::Bool(b) => write!(f, "Bool({b})"),
            Dynamic::Number(n) => write!(f, "Number({n})"),
            Dynamic::Str(s) => write!(f, "Str({s:?})"),
            Dynamic::List(xs) => write!(f, "List({xs:?})"),
            Dynamic::Object(m) => write!(f, "Object({m:?})"),
            Dynamic::Function(_) => write!(f, "Function(..)"),
            Dynamic::Html(h) => write!(f, "Html({h:?})"),
        }
    }
}

impl Dynamic {
    /// Shorthand for `Dynamic::Str(s.into())`.
    pub fn str(s: impl Into<String>) -> Self {
        Dynamic::Str(s.into())
    }

    /// Shorthand for a number from an `i64`.
    pub fn int(n: i64) -> Self {
        Dynamic::Number(Decimal::from(n))
    }

    /// Converts from a `serde_json::Value`, used by tests and by host
    /// programs that already have JSON data on hand.
    pub fn from_json(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Dynamic::Null,
            serde_json::Value::Bool(b) => Dynamic::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Dynamic::int)
                .or_else(|| n.as_f64().and_then(Decimal::from_f64_retain).map(Dynamic::Number))
                .unwrap_or(Dynamic::Null),
            serde_json::Value::String(s) => Dynamic::Str(s.clone()),
            serde_json::Value::Array(xs) => Dynamic::List(xs.iter().map(Dynamic::from_json).collect()),
            serde_json::Value::Object(m) => {
                Dynamic::Object(m.iter().map(|(k, v)| (k.clone(), Dynamic::from_json(v))).collect())
            }
        }
    }
}

use rust_decimal::prelude::FromPrimitive;

impl Value for Dynamic {
    fn to_boolean(&self) -> bool {
        match self {
            Dynamic::Null => false,
            Dynamic::Bool(b) => *b,
            Dynamic::Number(n) => !n.is_zero(),
            Dynamic::Str(s) => !s.is_empty(),
            Dynamic::List(xs) => !xs.is_empty(),
            Dynamic::Object(m) => !m.is_empty(),
            Dynamic::Function(_) => true,
            Dynamic::Html(h) => !h.as_str().is_empty(),
        }
    }

    fn to_text(&self) -> String {
        match self {
            Dynamic::Null => String::new(),
            Dynamic::Bool(b) => b.to_string(),
            Dynamic::Number(n) => n.normalize().to_string(),
            Dynamic::Str(s) => s.clone(),
            Dynamic::List(xs) => xs.iter().map(Dynamic::to_text).collect(),
            Dynamic::Object(m) => m.values().map(Dynamic::to_text).collect(),
            Dynamic::Function(_) => "<function>".to_string(),
            Dynamic::Html(h) => h.as_str().to_string(),
        }
    }

    fn to_html(&self) -> Html {
        match self {
            Dynamic::Html(h) => h.clone(),
            other => Html::escape(&other.to_text()),
        }
    }

    fn to_list(&self) -> Vec<Self> {
        match self {
            Dynamic::List(xs) => xs.clone(),
            Dynamic::Object(m) => m.values().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn iter_keys(&self) -> Vec<Self> {
        match self {
            Dynamic::List(xs) => (0..xs.len()).map(|i| Dynamic::int(i as i64)).collect(),
            Dynamic::Object(m) => m.keys().cloned().map(Dynamic::Str).collect(),
            _ => Vec::new(),
        }
    }

    fn lookup_loose(&self, index: &Self) -> Option<Self> {
        match self {
            Dynamic::List(xs) => {
                if let Dynamic::Number(n) = index {
                    let i: i64 = n.to_string().parse().ok()?;
                    usize::try_from(i).ok().and_then(|i| xs.get(i)).cloned()
                } else {
                    None
                }
            }
            Dynamic::Object(m) => m.get(&index.to_text()).cloned(),
            _ => None,
        }
    }

    fn to_function(&self) -> Option<Function<Self>> {
        match self {
            Dynamic::Function(f) => Some(f.clone()),
            _ => None,
        }
    }

    fn null() -> Self {
        Dynamic::Null
    }

    fn from_bool(b: bool) -> Self {
        Dynamic::Bool(b)
    }

    fn from_number(n: Decimal) -> Self {
        Dynamic::Number(n)
    }

    fn from_str(s: String) -> Self {
        Dynamic::Str(s)
    }

    fn from_list(items: Vec<Self>) -> Self {
        Dynamic::List(items)
    }

    fn from_object(entries: Vec<(String, Self)>) -> Self {
        Dynamic::Object(entries.into_iter().collect())
    }

    fn from_html(html: Html) -> Self {
        Dynamic::Html(html)
    }

    fn from_function(f: Function<Self>) -> Self {
        Dynamic::Function(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_matches_spec() {
        assert!(!Dynamic::Null.to_boolean());
        assert!(!Dynamic::Bool(false).to_boolean());
        assert!(!Dynamic::int(0).to_boolean());
        assert!(!Dynamic::str("").to_boolean());
        assert!(!Dynamic::List(vec![]).to_boolean());
        assert!(!Dynamic::Object(BTreeMap::new()).to_boolean());
        assert!(Dynamic::int(1).to_boolean());
        assert!(Dynamic::str("x").to_boolean());
    }

    #[test]
    fn number_text_has_no_trailing_zeros() {
        assert_eq!(Dynamic::Number(Decimal::new(100, 2)).to_text(), "1");
        assert_eq!(Dynamic::Number(Decimal::new(150, 2)).to_text(), "1.5");
    }

    #[test]
    fn lookup_loose_indexes_lists_and_objects() {
        let list = Dynamic::List(vec![Dynamic::int(10), Dynamic::int(20)]);
        assert_eq!(list.lookup_loose(&Dynamic::int(1)).unwrap().to_text(), "20");
        assert!(list.lookup_loose(&Dynamic::int(5)).is_none());

        let mut m = BTreeMap::new();
        m.insert("a".to_string(), Dynamic::int(1));
        let obj = Dynamic::Object(m);
        assert_eq!(obj.lookup_loose(&Dynamic::str("a")).unwrap().to_text(), "1");
        assert!(obj.lookup_loose(&Dynamic::str("missing")).is_none());
    }
}
