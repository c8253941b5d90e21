/*
 * fragment.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Compiled code fragments.
//!
//! Macros turn parse-tree nodes into [`Fragment`]s: flat sequences of [`Op`]s
//! that append to the output when run. Nested regions (`->`, `has`, `each`)
//! carry their own sub-fragment. The emitter interprets these directly, so a
//! fragment is both the "generated code" and the program that renders.
//!
//! Paths stored in ops are relative to the ambient path at the point where
//! the op runs.

use crate::path::escape;
use crate::runtime::Runtime;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A single output-producing operation.
#[derive(Debug, Clone)]
pub enum Op {
    /// Append literal text.
    Text(String),

    /// Resolve a path and append its value (nothing when absent).
    Value(String),

    /// Append the resolved path string itself.
    Path(String),

    /// Run the body with the ambient path extended.
    Scope { path: String, body: Fragment },

    /// Run the body only when the path resolves to a present value.
    When { path: String, body: Fragment },

    /// Run the body once per entry of the resolved array or object, with the
    /// ambient path extended by the entry key.
    Each { path: String, body: Fragment },

    /// Append the output of a render-time helper.
    Call { name: String, helper: Helper },

    /// Render the body, then pass its output through a filter.
    Filter {
        name: String,
        filter: Filter,
        body: Fragment,
    },
}

/// An ordered sequence of ops.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    ops: Vec<Op>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fragment that appends `text`.
    pub fn text(text: impl Into<String>) -> Self {
        let mut fragment = Self::new();
        fragment.push(Op::Text(text.into()));
        fragment
    }

    /// A fragment holding a single op.
    pub fn op(op: Op) -> Self {
        let mut fragment = Self::new();
        fragment.push(op);
        fragment
    }

    /// Append an op. Empty text is dropped and adjacent text is merged.
    pub fn push(&mut self, op: Op) {
        if let Op::Text(text) = &op {
            if text.is_empty() {
                return;
            }
            if let Some(Op::Text(last)) = self.ops.last_mut() {
                last.push_str(text);
                return;
            }
        }
        self.ops.push(op);
    }

    /// Append every op of another fragment.
    pub fn append(&mut self, other: Fragment) {
        for op in other.ops {
            self.push(op);
        }
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Total number of ops, counting nested bodies.
    pub fn op_count(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                Op::Scope { body, .. }
                | Op::When { body, .. }
                | Op::Each { body, .. }
                | Op::Filter { body, .. } => 1 + body.op_count(),
                _ => 1,
            })
            .sum()
    }

    fn write_listing(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        for op in &self.ops {
            match op {
                Op::Text(text) => writeln!(f, "{pad}text \"{}\"", escape(text))?,
                Op::Value(path) => writeln!(f, "{pad}value \"{}\"", escape(path))?,
                Op::Path(path) => writeln!(f, "{pad}path \"{}\"", escape(path))?,
                Op::Call { name, .. } => writeln!(f, "{pad}call {name}")?,
                Op::Scope { path, body } => {
                    writeln!(f, "{pad}scope \"{}\" {{", escape(path))?;
                    body.write_listing(f, indent + 1)?;
                    writeln!(f, "{pad}}}")?;
                }
                Op::When { path, body } => {
                    writeln!(f, "{pad}has \"{}\" {{", escape(path))?;
                    body.write_listing(f, indent + 1)?;
                    writeln!(f, "{pad}}}")?;
                }
                Op::Each { path, body } => {
                    writeln!(f, "{pad}each \"{}\" {{", escape(path))?;
                    body.write_listing(f, indent + 1)?;
                    writeln!(f, "{pad}}}")?;
                }
                Op::Filter { name, body, .. } => {
                    writeln!(f, "{pad}filter {name} {{")?;
                    body.write_listing(f, indent + 1)?;
                    writeln!(f, "{pad}}}")?;
                }
            }
        }
        Ok(())
    }
}

impl From<Op> for Fragment {
    fn from(op: Op) -> Self {
        Fragment::op(op)
    }
}

/// One op per line, nested bodies indented inside braces.
impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_listing(f, 0)
    }
}

/// Read-only view of the render state handed to helpers.
pub struct Scope<'r> {
    data: &'r Value,
    current: Option<&'r Value>,
    path: &'r str,
    runtime: &'r dyn Runtime,
}

impl<'r> Scope<'r> {
    pub(crate) fn new(
        data: &'r Value,
        current: Option<&'r Value>,
        path: &'r str,
        runtime: &'r dyn Runtime,
    ) -> Self {
        Self {
            data,
            current,
            path,
            runtime,
        }
    }

    /// The root data value of this render.
    pub fn data(&self) -> &'r Value {
        self.data
    }

    /// The ambient path in dot notation.
    pub fn path(&self) -> &'r str {
        self.path
    }

    /// Resolve a normalized path relative to the ambient path.
    pub fn resolve(&self, path: &str) -> Option<&'r Value> {
        self.runtime.resolve(self.current?, path)
    }

    /// Stringify a value with the active runtime.
    pub fn stringify(&self, value: &Value) -> String {
        self.runtime.stringify(value)
    }
}

/// A render-time helper producing output text.
#[derive(Clone)]
pub struct Helper(Arc<dyn Fn(&Scope<'_>) -> String + Send + Sync>);

impl Helper {
    pub fn new(f: impl Fn(&Scope<'_>) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub(crate) fn call(&self, scope: &Scope<'_>) -> String {
        (self.0)(scope)
    }
}

impl fmt::Debug for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Helper(..)")
    }
}

/// A post-processor over rendered output.
#[derive(Clone)]
pub struct Filter(Arc<dyn Fn(String) -> String + Send + Sync>);

impl Filter {
    pub fn new(f: impl Fn(String) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub(crate) fn apply(&self, input: String) -> String {
        (self.0)(input)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter(..)")
    }
}
