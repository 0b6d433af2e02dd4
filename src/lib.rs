// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

#![warn(missing_docs)]

//! # Wicker
//!
//! An embeddable Jinja-style HTML template engine: a parser and an
//! evaluator, generic over the host's own value representation.
//!
//! ## Features
//!
//! - `{{ }}` interpolation, `{% %}` statements, `{# #}` comments, with
//!   whitespace-trim tag variants
//! - A full expression grammar: lambdas, boolean/comparative/arithmetic
//!   operators, member/index access, filters, mixed positional and named
//!   call arguments
//! - Template inheritance (`extends`/`block`), `include`, `macro`/`call`,
//!   and explicit `scope` blocks
//! - A soft-fail evaluation discipline: a missing variable or a lookup
//!   into the wrong shape of value renders as nothing, never a panic or a
//!   render-aborting error
//!
//! ## Quick Start
//!
//! ```rust
//! use wicker::{parse, MemoryResolver, WriterContext, Dynamic, render};
//!
//! let resolver = MemoryResolver::new();
//! let template = parse(&resolver, Some("hello.html"), "<p>Hi {{ name }}</p>").unwrap();
//!
//! let mut ctx = WriterContext::from_lookup_fn(|name: &str| match name {
//!     "name" => Dynamic::str("World"),
//!     _ => Dynamic::Null,
//! });
//! render(&mut ctx, &template);
//! assert_eq!(ctx.into_html().as_str(), "<p>Hi World</p>");
//! ```
//!
//! ## Bring your own value type
//!
//! Hosts that already have a data representation (a JSON tree, a database
//! row, a scripting-language table) implement [`Value`] for it directly
//! rather than converting through [`Dynamic`]; the parser and evaluator
//! never depend on `Dynamic` themselves.

/// Abstract syntax tree types produced by the parser and consumed by the
/// evaluator.
pub mod ast;
/// Host-supplied built-in operators for the [`Dynamic`] reference value
/// type.
pub mod builtins;
/// Engine-wide limits.
pub mod config;
/// The rendering context: where emitted HTML goes and how free variables
/// are looked up.
pub mod context;
/// The [`Engine`] type tying a resolver to an [`EngineConfig`].
pub mod engine;
/// Error types and source-snippet reporting.
pub mod error;
/// The evaluator: walks a [`Template`](ast::Template) against a scope and
/// a [`Context`](context::Context).
pub mod eval;
/// Safe-HTML string wrapper.
pub mod html;
/// The template parser.
pub mod parser;
/// Include/extends resolution (filesystem, memory).
pub mod resolver;
/// The dynamic value model the evaluator is generic over.
pub mod value;

pub use ast::{Block, Expression, Macro, Statement, Template};
pub use config::EngineConfig;
pub use context::{Context, WriterContext};
pub use engine::Engine;
pub use error::{ParserError, Result, SourceContext};
pub use eval::{render, render_pure};
pub use html::Html;
pub use parser::{parse, parse_file, parse_file_with_depth, parse_with_depth, DEFAULT_MAX_INCLUDE_DEPTH};
#[cfg(feature = "filesystem")]
pub use resolver::FileSystemResolver;
pub use resolver::{path_to_string, IncludeResolver, MemoryResolver, ResolvedSource};
pub use value::{Dynamic, Function, Value};
