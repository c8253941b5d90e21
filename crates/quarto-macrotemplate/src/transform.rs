/*
 * transform.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Macro dispatch over the parse tree.
//!
//! [`Transformer::transform`] claims a node's macro name, looks it up in the
//! registry and hands the node to that macro together with the transformer
//! itself, so the macro can recurse into its children without knowing how
//! they are laid out.

use crate::error::{TemplateError, TemplateResult};
use crate::fragment::{Fragment, Op};
use crate::path::parse_arg;
use crate::registry::MacroRegistry;
use crate::tree::{Node, ROOT_MACRO, ROOT_PREFIX};

/// Recursive macro expander for one compilation.
#[derive(Debug, Clone, Copy)]
pub struct Transformer<'a> {
    registry: &'a MacroRegistry,
    file: Option<&'a str>,
}

impl<'a> Transformer<'a> {
    pub fn new(registry: &'a MacroRegistry, file: Option<&'a str>) -> Self {
        Self { registry, file }
    }

    /// The template file name used in error messages, if any.
    pub fn file(&self) -> Option<&'a str> {
        self.file
    }

    /// Expand a node through the macro its head names.
    ///
    /// # Errors
    /// Returns [`TemplateError::UnknownMacro`] when the name is neither a
    /// user macro nor a built-in, and propagates any error from the macro.
    pub fn transform(&self, node: &mut Node) -> TemplateResult<Fragment> {
        let name = parse_arg(node);
        self.dispatch(name, node)
    }

    /// Expand the synthetic root produced by
    /// [`parse_template`](crate::tree::parse_template).
    ///
    /// The root's macro is claimed by removing [`ROOT_PREFIX`] verbatim, so
    /// whitespace at the start of the template stays literal output. A head
    /// without the prefix is expanded like any other node.
    pub fn transform_root(&self, root: &mut Node) -> TemplateResult<Fragment> {
        if !root.head.starts_with(ROOT_PREFIX) {
            return self.transform(root);
        }
        root.head.replace_range(..ROOT_PREFIX.len(), "");
        self.dispatch(ROOT_MACRO.to_string(), root)
    }

    fn dispatch(&self, name: String, node: &mut Node) -> TemplateResult<Fragment> {
        let registry: &'a MacroRegistry = self.registry;
        let Some(handler) = registry.resolve(&name) else {
            return Err(TemplateError::UnknownMacro {
                location: node.position.to_location(self.file),
                name,
            });
        };
        tracing::trace!(
            macro_name = %name,
            builtin = handler.is_builtin(),
            "Expanding macro"
        );
        handler.expand(node, self)
    }

    /// Emit a node's literal slots as text and expand its children, in
    /// document order. See [`transform_children`].
    pub fn transform_children(&self, node: &mut Node) -> TemplateResult<Fragment> {
        transform_children(node, self)
    }
}

/// Walk a node's alternating text slots and children.
///
/// The node's slots are taken, so each node can be expanded once.
pub fn transform_children(
    node: &mut Node,
    transform: &Transformer<'_>,
) -> TemplateResult<Fragment> {
    let mut fragment = Fragment::text(std::mem::take(&mut node.head));
    for child in &mut node.children {
        fragment.append(transform.transform(&mut child.node)?);
        fragment.push(Op::Text(std::mem::take(&mut child.trailing)));
    }
    Ok(fragment)
}
