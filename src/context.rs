// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The host effect boundary: variable lookup and HTML emission.
//!
//! The evaluator (see [`crate::eval`]) only ever reaches the outside world
//! through a [`Context`] — it never touches a file system, a database, or
//! a socket directly. [`WriterContext`] is the concrete implementation
//! behind [`crate::render_pure`]: it turns a pure `Fn(&str) -> V` lookup
//! function into a full context that accumulates emitted HTML in memory.

use crate::html::Html;
use crate::value::Value;
use std::marker::PhantomData;

/// The evaluator's view of the host: resolve a name to a value, and accept
/// emitted HTML.
pub trait Context<V: Value> {
    /// Resolves a top-level variable name not found in the current scope
    /// stack. Implementations should return `V::null()` rather than
    /// panicking on an unknown name, matching the evaluator's soft-fail
    /// discipline.
    fn lookup(&self, name: &str) -> V;

    /// Appends `html` to the rendered output.
    fn write_html(&mut self, html: &Html);
}

/// A [`Context`] that accumulates output into an in-memory [`Html`] buffer,
/// built from a pure lookup function.
///
/// This is what [`crate::render_pure`] uses under the hood; reach for it
/// directly when a full custom `Context` isn't worth writing.
pub struct WriterContext<V, F> {
    lookup_fn: F,
    buffer: Html,
    _marker: PhantomData<V>,
}

impl<V, F> WriterContext<V, F>
where
    V: Value,
    F: Fn(&str) -> V,
{
    /// Builds a writer context from a pure lookup function, with an empty
    /// output buffer.
    pub fn from_lookup_fn(lookup_fn: F) -> Self {
        WriterContext {
            lookup_fn,
            buffer: Html::empty(),
            _marker: PhantomData,
        }
    }

    /// Consumes the context, returning everything written so far.
    pub fn into_html(self) -> Html {
        self.buffer
    }
}

impl<V, F> Context<V> for WriterContext<V, F>
where
    V: Value,
    F: Fn(&str) -> V,
{
    fn lookup(&self, name: &str) -> V {
        (self.lookup_fn)(name)
    }

    fn write_html(&mut self, html: &Html) {
        self.buffer.append(html);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Dynamic;

    #[test]
    fn writer_context_accumulates_and_looks_up() {
        let mut ctx = WriterContext::from_lookup_fn(|name: &str| {
            if name == "greeting" {
                Dynamic::str("hi")
            } else {
                Dynamic::Null
            }
        });
        assert_eq!(ctx.lookup("greeting").to_text(), "hi");
        assert_eq!(ctx.lookup("missing").to_text(), "");
        ctx.write_html(&Html::raw("<p>"));
        ctx.write_html(&Html::raw("</p>"));
        assert_eq!(ctx.into_html().as_str(), "<p></p>");
    }
}
