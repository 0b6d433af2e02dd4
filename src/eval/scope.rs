// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The evaluator's lexical scope: a stack of frames, innermost last.

use crate::value::Value;
use std::collections::HashMap;

/// A stack of identifier → value frames.
///
/// Lookup walks the stack innermost-first; a full miss is the caller's
/// responsibility to resolve (the evaluator falls through to the host
/// `Context::lookup`). Cloning a `Scope` is a deep clone of every frame —
/// this is what lets closures (`DefMacro`, `Lambda`) capture "the scope at
/// this point in time" by value.
#[derive(Clone)]
pub struct Scope<V> {
    frames: Vec<HashMap<String, V>>,
}

impl<V: Value> Scope<V> {
    /// A scope with a single empty root frame.
    pub fn new() -> Self {
        Scope { frames: vec![HashMap::new()] }
    }

    /// Pushes a fresh, empty frame.
    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Pops the innermost frame.
    ///
    /// Panics if called on the root frame — every push is expected to be
    /// balanced by a pop within the same evaluation, and popping past the
    /// root would indicate a bug in the evaluator, not malformed template
    /// source.
    pub fn pop_frame(&mut self) {
        assert!(self.frames.len() > 1, "popped the root scope frame");
        self.frames.pop();
    }

    /// Binds `name` in the innermost frame, shadowing (but not disturbing)
    /// any outer binding of the same name.
    pub fn set(&mut self, name: impl Into<String>, value: V) {
        self.frames
            .last_mut()
            .expect("scope always has at least a root frame")
            .insert(name.into(), value);
    }

    /// Looks up `name`, innermost frame first.
    pub fn get(&self, name: &str) -> Option<V> {
        self.frames.iter().rev().find_map(|f| f.get(name).cloned())
    }
}

impl<V: Value> Default for Scope<V> {
    fn default() -> Self {
        Scope::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Dynamic;

    #[test]
    fn inner_frame_shadows_outer() {
        let mut s: Scope<Dynamic> = Scope::new();
        s.set("x", Dynamic::int(1));
        s.push_frame();
        s.set("x", Dynamic::int(2));
        assert_eq!(s.get("x").unwrap().to_text(), "2");
        s.pop_frame();
        assert_eq!(s.get("x").unwrap().to_text(), "1");
    }

    #[test]
    fn miss_returns_none() {
        let s: Scope<Dynamic> = Scope::new();
        assert!(s.get("missing").is_none());
    }
}
