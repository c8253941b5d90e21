/*
 * tree.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Brace tree parser.
//!
//! A template is plain text with `{...}` macro invocations that nest
//! arbitrarily deep. Parsing is a single left-to-right scan that keeps a stack
//! of the nodes still being built; there is no escape syntax for literal
//! braces.
//!
//! Every node keeps its literal text slots even when they are empty, so the
//! transformer can walk a node the same way regardless of its shape:
//!
//! ```text
//! head {child} trailing {child} trailing ...
//! ```

use crate::error::{SourceLocation, TemplateError, TemplateResult};

/// Macro the synthetic root node invokes: the passthrough `out`.
pub const ROOT_MACRO: &str = "out";

/// Head text of the synthetic root node, ahead of the template's own text.
pub const ROOT_PREFIX: &str = "out ";

/// Position of a node's opening brace (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// The start of the template, used for the root node.
    pub const START: Position = Position { line: 1, column: 1 };

    pub fn to_location(self, file: Option<&str>) -> SourceLocation {
        SourceLocation::new(file, self.line, self.column)
    }
}

/// One macro invocation: the raw head text followed by alternating child
/// nodes and the literal text that follows each of them.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Macro name, argument and any literal text up to the first nested brace.
    ///
    /// Argument extraction trims this in place; whatever is left is emitted
    /// as literal output.
    pub head: String,
    pub children: Vec<Child>,
    pub position: Position,
}

/// A nested node together with the literal text up to the next brace.
#[derive(Debug, Clone, PartialEq)]
pub struct Child {
    pub node: Node,
    pub trailing: String,
}

impl Node {
    pub fn new(position: Position) -> Self {
        Self {
            head: String::new(),
            children: Vec::new(),
            position,
        }
    }

    /// Append a character to the last literal slot.
    fn push_char(&mut self, ch: char) {
        match self.children.last_mut() {
            Some(child) => child.trailing.push(ch),
            None => self.head.push(ch),
        }
    }

    /// Reassemble the text this node was parsed from, braces included for
    /// nested nodes. Only exact before any argument has been consumed.
    pub fn to_source(&self) -> String {
        let mut out = self.head.clone();
        for child in &self.children {
            out.push('{');
            out.push_str(&child.node.to_source());
            out.push('}');
            out.push_str(&child.trailing);
        }
        out
    }

    /// Number of nodes in this subtree, including this one.
    pub fn count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| child.node.count())
            .sum::<usize>()
    }
}

/// Parse template text into a tree whose root head is the leading literal
/// text.
///
/// # Errors
/// Returns [`TemplateError::UnmatchedBrace`] for a `}` without a matching
/// `{`, or when the input ends with braces still open.
pub fn parse(text: &str, file: Option<&str>) -> TemplateResult<Node> {
    let mut stack: Vec<Node> = Vec::new();
    let mut current = Node::new(Position::START);
    let mut line = 1;
    let mut column = 1;

    for ch in text.chars() {
        match ch {
            '{' => {
                let opened = Node::new(Position { line, column });
                stack.push(std::mem::replace(&mut current, opened));
            }
            '}' => {
                let Some(parent) = stack.pop() else {
                    return Err(TemplateError::UnmatchedBrace {
                        location: SourceLocation::new(file, line, column),
                        message: "'}' has no matching '{'".to_string(),
                    });
                };
                let finished = std::mem::replace(&mut current, parent);
                current.children.push(Child {
                    node: finished,
                    trailing: String::new(),
                });
            }
            _ => current.push_char(ch),
        }

        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    if !stack.is_empty() {
        return Err(TemplateError::UnmatchedBrace {
            location: current.position.to_location(file),
            message: "'{' is never closed".to_string(),
        });
    }

    Ok(current)
}

/// Parse a whole template, wrapping it in the synthetic `out` root node.
pub fn parse_template(text: &str, file: Option<&str>) -> TemplateResult<Node> {
    let mut root = parse(text, file)?;
    root.head.insert_str(0, ROOT_PREFIX);
    Ok(root)
}
