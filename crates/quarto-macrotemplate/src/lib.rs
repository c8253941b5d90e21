/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Macro-extensible brace template compiler for Quarto.
//!
//! Templates are plain text with nested `{macro argument ...}` invocations.
//! Compilation parses the text into a brace tree, expands every node through
//! its macro into a [`Fragment`] of output operations, and wraps the result in
//! a reusable [`RenderFn`].
//!
//! Built-in macros:
//!
//! - Value: `{. name}`, `{. items[0].title}`, `{.}` for the current value
//! - Scope: `{-> user <b>{. name}</b>}`
//! - Presence test: `{has subtitle <h2>{. subtitle}</h2>}`
//! - Iteration: `{each items <li>{. name}</li>}`
//! - Current path: `{each items <li id="{path}">...</li>}`
//!
//! Any other name is looked up in the user macros passed through
//! [`CompileOptions`]; user macros also override built-ins of the same name.
//!
//! Missing data never fails a render: absent values print nothing, fail
//! `has`, and iterate zero times. `null` counts as absent; `0`, `""` and
//! `false` are present.
//!
//! # Example
//!
//! ```ignore
//! use quarto_macrotemplate::{CompileOptions, compile};
//! use serde_json::json;
//!
//! let template = compile("<ul>{each items <li>{. name}</li>}</ul>", &CompileOptions::default())?;
//! let output = template.render(&json!({"items": [{"name": "a"}, {"name": "b"}]}));
//! assert_eq!(output, "<ul><li>a</li><li>b</li></ul>");
//! ```

pub mod emit;
pub mod error;
pub mod fragment;
pub mod macros;
pub mod options;
pub mod path;
pub mod registry;
pub mod runtime;
pub mod transform;
pub mod tree;

// Re-export main types at crate root
pub use emit::{RenderFn, wrap};
pub use error::{SourceLocation, TemplateError, TemplateResult};
pub use fragment::{Filter, Fragment, Helper, Op, Scope};
pub use macros::Builtin;
pub use options::CompileOptions;
pub use path::{escape, parse_arg, parse_path};
pub use registry::{Handler, Macro, MacroRegistry};
pub use runtime::{EntryKey, Runtime, StandardRuntime};
pub use transform::{Transformer, transform_children};
pub use tree::{Child, Node, parse};

use crate::error::ANONYMOUS_TEMPLATE;
use serde_json::Value;

/// Compile template text into a render function.
///
/// # Errors
/// [`TemplateError::UnmatchedBrace`] when braces do not balance,
/// [`TemplateError::UnknownMacro`] when a node names no known macro, or any
/// error raised by a user macro. Nothing is returned for partially valid
/// templates.
pub fn compile(source: &str, options: &CompileOptions) -> TemplateResult<RenderFn> {
    let file = options.file();
    let mut root = tree::parse_template(source, file)?;
    let nodes = root.count();

    let fragment = Transformer::new(options.macros(), file).transform_root(&mut root)?;

    tracing::debug!(
        file = file.unwrap_or(ANONYMOUS_TEMPLATE),
        nodes,
        ops = fragment.op_count(),
        include_runtime = options.include_runtime(),
        "Compiled template"
    );
    tracing::trace!(program = %fragment, "Compiled program");

    Ok(wrap(fragment, options))
}

/// Compile and render in one step.
pub fn render(source: &str, data: &Value, options: &CompileOptions) -> TemplateResult<String> {
    Ok(compile(source, options)?.render(data))
}
