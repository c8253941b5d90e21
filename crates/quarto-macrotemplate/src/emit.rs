/*
 * emit.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Render function assembly and execution.
//!
//! [`wrap`] packages a compiled [`Fragment`] with its runtime into a
//! [`RenderFn`]. Rendering walks the fragment with a per-call frame
//! holding the output buffer and the ambient path, so one `RenderFn` can be
//! shared freely between threads.

use crate::error::TemplateResult;
use crate::fragment::{Fragment, Op, Scope};
use crate::options::CompileOptions;
use crate::runtime::{EntryKey, Runtime, StandardRuntime, segments};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// The runtime a render function calls into.
#[derive(Debug, Clone)]
enum RuntimeHandle {
    /// Owned by the render function.
    Embedded(StandardRuntime),
    /// Provided by the environment and shared between templates.
    Shared(Arc<dyn Runtime>),
}

impl RuntimeHandle {
    fn get(&self) -> &dyn Runtime {
        match self {
            RuntimeHandle::Embedded(runtime) => runtime,
            RuntimeHandle::Shared(runtime) => runtime.as_ref(),
        }
    }
}

/// A compiled template.
///
/// Cloning is cheap; clones share the compiled program.
#[derive(Debug, Clone)]
pub struct RenderFn {
    program: Arc<Fragment>,
    runtime: RuntimeHandle,
}

/// Package a compiled fragment as a render function.
pub fn wrap(fragment: Fragment, options: &CompileOptions) -> RenderFn {
    let runtime = if options.include_runtime() {
        RuntimeHandle::Embedded(StandardRuntime)
    } else {
        RuntimeHandle::Shared(options.runtime())
    };
    RenderFn {
        program: Arc::new(fragment),
        runtime,
    }
}

impl RenderFn {
    /// Render with the given data, or with an empty object when `None`.
    pub fn call(&self, data: Option<&Value>) -> String {
        let empty = Value::Object(Map::new());
        let mut frame = Frame::new(data.unwrap_or(&empty), self.runtime.get());
        frame.run(&self.program);
        frame.out
    }

    /// Render with the given data.
    pub fn render(&self, data: &Value) -> String {
        self.call(Some(data))
    }

    /// Render any serializable value by converting it to JSON first.
    pub fn render_serialize<T: Serialize + ?Sized>(&self, data: &T) -> TemplateResult<String> {
        let value = serde_json::to_value(data)?;
        Ok(self.render(&value))
    }

    /// The compiled program.
    pub fn program(&self) -> &Fragment {
        &self.program
    }

    /// Readable listing of the compiled program.
    pub fn listing(&self) -> String {
        self.program.to_string()
    }

    /// Whether the render function carries its own runtime.
    pub fn is_self_contained(&self) -> bool {
        matches!(self.runtime, RuntimeHandle::Embedded(_))
    }
}

/// Per-call render state.
///
/// The ambient path is kept as lookup keys rather than dotted text, so entry
/// keys that are empty or contain dots still address their own entry.
struct Frame<'r> {
    data: &'r Value,
    runtime: &'r dyn Runtime,
    path: Vec<EntryKey<'r>>,
    out: String,
}

impl<'r> Frame<'r> {
    fn new(data: &'r Value, runtime: &'r dyn Runtime) -> Self {
        Self {
            data,
            runtime,
            path: Vec::new(),
            out: String::new(),
        }
    }

    /// Extend the ambient path; pair with [`Frame::leave`].
    fn enter(&mut self, path: &'r str) -> usize {
        let mark = self.path.len();
        self.path.extend(segments(path));
        mark
    }

    fn leave(&mut self, mark: usize) {
        self.path.truncate(mark);
    }

    /// The value at the ambient path, before null filtering.
    fn current(&self) -> Option<&'r Value> {
        let mut current = self.data;
        for key in &self.path {
            current = self.runtime.lookup(current, *key)?;
        }
        Some(current)
    }

    fn resolve(&self, path: &str) -> Option<&'r Value> {
        self.runtime.resolve(self.current()?, path)
    }

    /// The ambient path in dot notation.
    fn dotted(&self) -> String {
        let mut dotted = String::new();
        for key in &self.path {
            dotted.push('.');
            match key {
                EntryKey::Index(index) => dotted.push_str(&index.to_string()),
                EntryKey::Name(name) => dotted.push_str(name),
            }
        }
        dotted
    }

    fn run(&mut self, fragment: &'r Fragment) {
        for op in fragment.ops() {
            match op {
                Op::Text(text) => self.out.push_str(text),

                Op::Value(path) => {
                    if let Some(value) = self.resolve(path) {
                        let text = self.runtime.stringify(value);
                        self.out.push_str(&text);
                    }
                }

                Op::Path(path) => {
                    let dotted = self.dotted();
                    self.out.push_str(&dotted);
                    self.out.push_str(path);
                }

                Op::Scope { path, body } => {
                    let mark = self.enter(path);
                    self.run(body);
                    self.leave(mark);
                }

                Op::When { path, body } => {
                    if self.resolve(path).is_some() {
                        self.run(body);
                    }
                }

                Op::Each { path, body } => {
                    let mark = self.enter(path);
                    let value = self.resolve("");
                    let runtime = self.runtime;
                    runtime.iterate(value, &mut |key| {
                        self.path.push(key);
                        self.run(body);
                        self.path.pop();
                    });
                    self.leave(mark);
                }

                Op::Call { helper, .. } => {
                    let path = self.dotted();
                    let scope = Scope::new(self.data, self.current(), &path, self.runtime);
                    let text = helper.call(&scope);
                    self.out.push_str(&text);
                }

                Op::Filter { filter, body, .. } => {
                    let outer = std::mem::take(&mut self.out);
                    self.run(body);
                    let rendered = std::mem::replace(&mut self.out, outer);
                    self.out.push_str(&filter.apply(rendered));
                }
            }
        }
    }
}
