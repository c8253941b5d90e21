/*
 * path.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Argument and path helpers for macros.
//!
//! Paths are dot-notation strings relative to the ambient path: `.items.0.name`.
//! The empty string is the ambient path itself.

use crate::tree::Node;
use once_cell::sync::Lazy;
use regex::Regex;

/// Leading token of a head slot plus the whitespace after it.
static ARG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\S*)\s*").unwrap());

/// Bracket index syntax: `[3]`.
static INDEX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]").unwrap());

/// Claim the first whitespace-delimited token of the node's head.
///
/// The token and any whitespace following it are removed from the head in
/// place; the rest stays behind as literal text. Returns an empty
/// string when the head holds no token.
pub fn parse_arg(node: &mut Node) -> String {
    let Some(caps) = ARG_RE.captures(&node.head) else {
        return String::new();
    };
    let token = caps[1].to_string();
    let consumed = caps[0].len();
    node.head.replace_range(..consumed, "");
    token
}

/// Claim the next token of the node's head as a normalized path.
pub fn parse_path(node: &mut Node) -> String {
    normalize_path(&parse_arg(node))
}

/// Rewrite a raw path token into dot-notation.
///
/// `items[2].name` becomes `.items.2.name`, `name` becomes `.name`, and `.`
/// (or nothing) becomes the empty path.
pub fn normalize_path(token: &str) -> String {
    let mut path = INDEX_RE.replace_all(token, ".${1}").into_owned();
    if !path.starts_with('.') {
        path.insert(0, '.');
    }
    path.trim_end_matches('.').to_string()
}

/// Quote characters that would end or break a single-line string literal.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out
}
