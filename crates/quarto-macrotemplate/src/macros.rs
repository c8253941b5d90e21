/*
 * macros.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Built-in macros.
//!
//! | name   | behavior                                                        |
//! |--------|-----------------------------------------------------------------|
//! | `out`  | passthrough: emit the node's literal text and children          |
//! | `.`    | emit the value at the path (nothing when absent)                |
//! | `->`   | render the children with the ambient path extended              |
//! | `has`  | render the children only when the path resolves to a value      |
//! | `each` | render the children once per array index / object key           |
//! | `path` | emit the ambient path joined with the argument, not its value   |
//!
//! Any text left in the head after the argument is ordinary literal output.

use crate::error::TemplateResult;
use crate::fragment::{Fragment, Op};
use crate::path::parse_path;
use crate::transform::Transformer;
use crate::tree::Node;

/// The built-in macros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Out,
    Value,
    Scope,
    Has,
    Each,
    Path,
}

impl Builtin {
    pub const ALL: [Builtin; 6] = [
        Builtin::Out,
        Builtin::Value,
        Builtin::Scope,
        Builtin::Has,
        Builtin::Each,
        Builtin::Path,
    ];

    /// The name templates use to invoke this macro.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Out => "out",
            Builtin::Value => ".",
            Builtin::Scope => "->",
            Builtin::Has => "has",
            Builtin::Each => "each",
            Builtin::Path => "path",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    pub fn expand(self, node: &mut Node, transform: &Transformer<'_>) -> TemplateResult<Fragment> {
        let fragment = match self {
            Builtin::Out => transform.transform_children(node)?,
            Builtin::Value => {
                let mut fragment = Fragment::op(Op::Value(parse_path(node)));
                fragment.append(transform.transform_children(node)?);
                fragment
            }
            Builtin::Path => {
                let mut fragment = Fragment::op(Op::Path(parse_path(node)));
                fragment.append(transform.transform_children(node)?);
                fragment
            }
            Builtin::Scope => Fragment::op(Op::Scope {
                path: parse_path(node),
                body: transform.transform_children(node)?,
            }),
            Builtin::Has => Fragment::op(Op::When {
                path: parse_path(node),
                body: transform.transform_children(node)?,
            }),
            Builtin::Each => Fragment::op(Op::Each {
                path: parse_path(node),
                body: transform.transform_children(node)?,
            }),
        };
        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MacroRegistry;
    use crate::tree::parse;
    use pretty_assertions::assert_eq;

    fn expand(builtin: Builtin, head: &str) -> Fragment {
        let registry = MacroRegistry::new();
        let transform = Transformer::new(&registry, None);
        let mut node = parse(head, None).unwrap();
        builtin.expand(&mut node, &transform).unwrap()
    }

    #[test]
    fn test_names_round_trip() {
        for builtin in Builtin::ALL {
            assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
        }
        assert_eq!(Builtin::from_name("if"), None);
    }

    #[test]
    fn test_value_keeps_remaining_text() {
        let fragment = expand(Builtin::Value, "name and more");
        assert_eq!(fragment.to_string(), "value \".name\"\ntext \"and more\"\n");
    }

    #[test]
    fn test_value_of_ambient_path() {
        let fragment = expand(Builtin::Value, "");
        assert_eq!(fragment.to_string(), "value \"\"\n");
    }

    #[test]
    fn test_each_wraps_children() {
        let fragment = expand(Builtin::Each, "items <li>{. name}</li>");
        assert_eq!(
            fragment.to_string(),
            "each \".items\" {\n  text \"<li>\"\n  value \".name\"\n  text \"</li>\"\n}\n"
        );
    }

    #[test]
    fn test_has_and_scope() {
        assert_eq!(
            expand(Builtin::Has, "flag yes").to_string(),
            "has \".flag\" {\n  text \"yes\"\n}\n"
        );
        assert_eq!(
            expand(Builtin::Scope, "a.b {path}").to_string(),
            "scope \".a.b\" {\n  path \"\"\n}\n"
        );
    }

    #[test]
    fn test_out_is_passthrough() {
        let fragment = expand(Builtin::Out, "a {. x} b");
        assert_eq!(
            fragment.to_string(),
            "text \"a \"\nvalue \".x\"\ntext \" b\"\n"
        );
    }
}
