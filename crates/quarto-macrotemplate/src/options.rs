/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Compile options.

use crate::error::TemplateResult;
use crate::fragment::Fragment;
use crate::registry::{Macro, MacroRegistry};
use crate::runtime::{Runtime, shared_runtime};
use crate::transform::Transformer;
use crate::tree::Node;
use std::sync::Arc;

/// Options for [`compile`](crate::compile) and [`render`](crate::render).
///
/// Defaults: built-in macros only, no file name, runtime embedded in the
/// compiled template.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    macros: MacroRegistry,
    file: Option<String>,
    include_runtime: bool,
    runtime: Option<Arc<dyn Runtime>>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            macros: MacroRegistry::new(),
            file: None,
            include_runtime: true,
            runtime: None,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user macro.
    pub fn with_macro(mut self, name: impl Into<String>, handler: impl Macro + 'static) -> Self {
        self.macros.insert(name, Arc::new(handler));
        self
    }

    /// Register a closure as a user macro.
    pub fn with_macro_fn<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Node, &Transformer<'_>) -> TemplateResult<Fragment> + Send + Sync + 'static,
    {
        self.macros.insert_fn(name, f);
        self
    }

    /// Replace the user macro registry.
    pub fn with_macros(mut self, macros: MacroRegistry) -> Self {
        self.macros = macros;
        self
    }

    /// Name the template in error messages.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Embed a standard runtime in the compiled template (`true`), or render
    /// through the shared runtime (`false`).
    pub fn with_include_runtime(mut self, include_runtime: bool) -> Self {
        self.include_runtime = include_runtime;
        self
    }

    /// Shared runtime used when the runtime is not embedded.
    pub fn with_runtime(mut self, runtime: Arc<dyn Runtime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn macros(&self) -> &MacroRegistry {
        &self.macros
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn include_runtime(&self) -> bool {
        self.include_runtime
    }

    /// The configured shared runtime, or the process-wide one.
    pub fn runtime(&self) -> Arc<dyn Runtime> {
        self.runtime.clone().unwrap_or_else(shared_runtime)
    }
}
