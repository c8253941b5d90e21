/*
 * registry.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Macro registry.
//!
//! Macro names resolve to user-supplied macros first and built-ins second,
//! so a user macro registered under a built-in name replaces it for every
//! template compiled with that registry.
//!
//! # Example
//!
//! ```ignore
//! use quarto_macrotemplate::{Fragment, MacroRegistry, Op, parse_path};
//!
//! let mut registry = MacroRegistry::new();
//! registry.insert_fn("quote", |node, transform| {
//!     let path = parse_path(node);
//!     let mut fragment = Fragment::text("\"");
//!     fragment.push(Op::Value(path));
//!     fragment.push(Op::Text("\"".to_string()));
//!     fragment.append(transform.transform_children(node)?);
//!     Ok(fragment)
//! });
//! ```

use crate::error::TemplateResult;
use crate::fragment::Fragment;
use crate::macros::Builtin;
use crate::transform::Transformer;
use crate::tree::Node;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A user-defined macro.
///
/// The macro name has already been claimed from the node's head when
/// `expand` runs. Implementations usually claim their argument with
/// [`parse_arg`](crate::path::parse_arg) or
/// [`parse_path`](crate::path::parse_path) and then hand the rest of the node
/// to [`Transformer::transform_children`].
///
/// # Thread Safety
///
/// Macros must be `Send + Sync` so compiled options can be shared between
/// threads.
pub trait Macro: Send + Sync {
    fn expand(&self, node: &mut Node, transform: &Transformer<'_>) -> TemplateResult<Fragment>;
}

impl<F> Macro for F
where
    F: Fn(&mut Node, &Transformer<'_>) -> TemplateResult<Fragment> + Send + Sync,
{
    fn expand(&self, node: &mut Node, transform: &Transformer<'_>) -> TemplateResult<Fragment> {
        self(node, transform)
    }
}

/// The handler a macro name resolved to.
#[derive(Clone, Copy)]
pub enum Handler<'a> {
    Builtin(Builtin),
    User(&'a dyn Macro),
}

impl Handler<'_> {
    pub fn expand(&self, node: &mut Node, transform: &Transformer<'_>) -> TemplateResult<Fragment> {
        match self {
            Handler::Builtin(builtin) => builtin.expand(node, transform),
            Handler::User(user) => user.expand(node, transform),
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Handler::Builtin(_))
    }
}

/// User macros by name, layered over the built-ins.
#[derive(Clone, Default)]
pub struct MacroRegistry {
    user: HashMap<String, Arc<dyn Macro>>,
}

impl MacroRegistry {
    /// Create a registry holding only the built-ins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a macro, replacing any user macro or built-in of that name.
    pub fn insert(&mut self, name: impl Into<String>, handler: Arc<dyn Macro>) -> &mut Self {
        self.user.insert(name.into(), handler);
        self
    }

    /// Register a closure as a macro.
    pub fn insert_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&mut Node, &Transformer<'_>) -> TemplateResult<Fragment> + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(f))
    }

    /// Resolve a macro name: user macros first, then built-ins.
    pub fn resolve(&self, name: &str) -> Option<Handler<'_>> {
        if let Some(user) = self.user.get(name) {
            return Some(Handler::User(user.as_ref()));
        }
        Builtin::from_name(name).map(Handler::Builtin)
    }

    /// Names of the registered user macros, sorted.
    pub fn user_macro_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.user.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_empty()
    }
}

impl fmt::Debug for MacroRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroRegistry")
            .field("user", &self.user_macro_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Node, _: &Transformer<'_>) -> TemplateResult<Fragment> {
        Ok(Fragment::new())
    }

    #[test]
    fn test_builtins_resolve() {
        let registry = MacroRegistry::new();
        for name in ["out", ".", "->", "has", "each", "path"] {
            let handler = registry.resolve(name);
            assert!(matches!(handler, Some(h) if h.is_builtin()), "{name}");
        }
        assert!(registry.resolve("nope").is_none());
        assert!(registry.resolve("").is_none());
    }

    #[test]
    fn test_user_macro_overrides_builtin() {
        let mut registry = MacroRegistry::new();
        registry.insert_fn("each", noop);
        let handler = registry.resolve("each").unwrap();
        assert!(!handler.is_builtin());
    }

    #[test]
    fn test_user_macro_names_sorted() {
        let mut registry = MacroRegistry::new();
        registry.insert_fn("b", noop).insert_fn("a", noop);
        assert_eq!(registry.user_macro_names(), vec!["a", "b"]);
        assert_eq!(format!("{registry:?}"), r#"MacroRegistry { user: ["a", "b"] }"#);
    }
}
