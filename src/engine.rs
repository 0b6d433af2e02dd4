// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The [`Engine`] type: a resolver paired with an [`EngineConfig`].
//!
//! This generalizes the teacher's `Engine<R: ResourceResolver>` (which also
//! carries a Lua runtime and a compiled-module cache) down to the knobs this
//! engine actually needs: an include resolver and the include-depth/literal
//! limits in [`EngineConfig`]. There is no compiled-module cache here —
//! parsing this grammar is cheap enough that callers who want caching can
//! cache the returned [`Template`] themselves.

use crate::ast::Template;
use crate::config::EngineConfig;
use crate::context::Context;
use crate::error::Result;
use crate::eval;
use crate::parser;
use crate::resolver::IncludeResolver;
use crate::value::Value;

/// Parses and renders templates against a fixed resolver and configuration.
///
/// # Examples
///
/// ```rust,ignore
/// use wicker::{Engine, MemoryResolver, WriterContext, Dynamic};
///
/// let resolver = MemoryResolver::default();
/// resolver.insert("hello.html", "<p>Hi {{ name }}</p>");
///
/// let engine = Engine::new(resolver);
/// let template = engine.parse_file("hello.html")?;
/// let mut ctx = WriterContext::from_lookup_fn(|n| match n {
///     "name" => Dynamic::str("World"),
///     _ => Dynamic::Null,
/// });
/// engine.render(&mut ctx, &template);
/// # Ok::<(), wicker::ParserError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Engine<R: IncludeResolver> {
    resolver: R,
    config: EngineConfig,
}

impl<R: IncludeResolver> Engine<R> {
    /// An engine over `resolver` using [`EngineConfig::default`].
    pub fn new(resolver: R) -> Self {
        Engine {
            resolver,
            config: EngineConfig::default(),
        }
    }

    /// An engine over `resolver` with an explicit configuration.
    pub fn with_config(resolver: R, config: EngineConfig) -> Self {
        Engine { resolver, config }
    }

    /// Returns a reference to the resolver used by this engine.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Returns the engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parses `source` (named `source_name`, if given) into a [`Template`],
    /// resolving any `{% extends %}`/`{% include %}` through this engine's
    /// resolver and enforcing its configured include-depth ceiling.
    pub fn parse(&self, source_name: Option<&str>, source: &str) -> Result<Template> {
        parser::parse_with_depth(&self.resolver, source_name, source, self.config.max_include_depth)
    }

    /// Resolves `source_name` through this engine's resolver, then parses it.
    pub fn parse_file(&self, source_name: &str) -> Result<Template> {
        parser::parse_file_with_depth(&self.resolver, source_name, self.config.max_include_depth)
    }

    /// Renders `template` into `ctx`, writing HTML and resolving free
    /// variables through `ctx`'s lookup.
    pub fn render<V, C>(&self, ctx: &mut C, template: &Template)
    where
        V: Value,
        C: Context<V>,
    {
        eval::render(ctx, template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::WriterContext;
    use crate::resolver::MemoryResolver;
    use crate::value::Dynamic;

    #[test]
    fn parses_and_renders_through_configured_resolver() {
        let resolver = MemoryResolver::default();
        resolver.insert("hello.html", "<p>Hi {{ name }}</p>");
        let engine = Engine::new(resolver);

        let template = engine.parse_file("hello.html").unwrap();
        let mut ctx = WriterContext::from_lookup_fn(|name: &str| match name {
            "name" => Dynamic::str("World"),
            _ => Dynamic::Null,
        });
        engine.render(&mut ctx, &template);
        assert_eq!(ctx.into_html().as_str(), "<p>Hi World</p>");
    }

    #[test]
    fn with_config_overrides_include_depth() {
        // A genuinely deep, non-cyclic include chain: a -> b -> c -> d.
        // With a ceiling of 3, resolving "d.html" from inside "c.html" (the
        // third nested include, stack = [a, b, c]) trips the ceiling before
        // "d.html" is ever looked up.
        let resolver = MemoryResolver::default();
        resolver.insert("a.html", "{% include \"b.html\" %}");
        resolver.insert("b.html", "{% include \"c.html\" %}");
        resolver.insert("c.html", "{% include \"d.html\" %}");
        let engine = Engine::with_config(
            resolver,
            EngineConfig {
                max_include_depth: 3,
                ..EngineConfig::default()
            },
        );
        let err = engine.parse_file("a.html").unwrap_err();
        match err {
            crate::error::ParserError::IncludeDepthExceeded { max, .. } => assert_eq!(max, 3),
            other => panic!("expected IncludeDepthExceeded, got {other:?}"),
        }
    }

    #[test]
    fn self_include_is_a_cycle_not_a_depth_error() {
        let resolver = MemoryResolver::default();
        resolver.insert("a.html", "{% include \"a.html\" %}");
        let engine = Engine::new(resolver);
        let err = engine.parse_file("a.html").unwrap_err();
        assert!(matches!(err, crate::error::ParserError::IncludeCycle { .. }));
    }
}
