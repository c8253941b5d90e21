/*
 * runtime.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Render-time support: path resolution, iteration and stringification.
//!
//! Template data is a [`serde_json::Value`]. Resolution never fails: a null
//! base, a missing key, an out-of-range index or a path through a scalar all
//! yield `None` ("absent"). `null` itself counts as absent, while `0`, `""`
//! and `false` are present values that render.

use once_cell::sync::Lazy;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Resolve a dot-notation path against a data value.
///
/// Empty segments are skipped, so `""` and `"."` resolve the base itself.
pub fn resolve<'v>(context: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = context;
    for key in segments(path) {
        current = lookup(current, key)?;
    }
    if current.is_null() { None } else { Some(current) }
}

/// Split a dot-notation path into lookup keys, skipping empty segments.
pub fn segments(path: &str) -> impl Iterator<Item = EntryKey<'_>> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .map(EntryKey::Name)
}

/// Step from a container into one of its entries.
///
/// A name addresses an array only when it is made of ASCII digits. An index
/// addresses an object through its decimal key.
pub fn lookup<'v>(value: &'v Value, key: EntryKey<'_>) -> Option<&'v Value> {
    match (value, key) {
        (Value::Object(map), EntryKey::Name(name)) => map.get(name),
        (Value::Object(map), EntryKey::Index(index)) => map.get(&index.to_string()),
        (Value::Array(items), EntryKey::Index(index)) => items.get(index),
        (Value::Array(items), EntryKey::Name(name)) => items.get(array_index(name)?),
        _ => None,
    }
}

fn array_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Key of one entry visited by [`iterate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKey<'a> {
    /// Position in an array.
    Index(usize),
    /// Own key of an object.
    Name(&'a str),
}

impl fmt::Display for EntryKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKey::Index(i) => write!(f, "{}", i),
            EntryKey::Name(name) => f.write_str(name),
        }
    }
}

/// Visit the entries of an array or object.
///
/// Arrays are visited in index order; objects in `serde_json::Map` order,
/// which is stable for a given value. Absent values and scalars produce no
/// visits.
pub fn iterate<'v>(value: Option<&'v Value>, mut visitor: impl FnMut(EntryKey<'v>)) {
    match value {
        Some(Value::Array(items)) => {
            for index in 0..items.len() {
                visitor(EntryKey::Index(index));
            }
        }
        Some(Value::Object(map)) => {
            for key in map.keys() {
                visitor(EntryKey::Name(key));
            }
        }
        _ => {}
    }
}

/// Render a value as output text.
///
/// - String: as-is
/// - Number: JSON notation
/// - Bool: `true` / `false`
/// - Array: stringified elements joined with `,`
/// - Object: compact JSON
/// - Null: empty
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
        Value::Null => String::new(),
    }
}

/// The operations compiled templates call while rendering.
///
/// The default methods are the standard semantics; a shared runtime may
/// override them for every template compiled against it.
pub trait Runtime: Send + Sync + fmt::Debug {
    fn resolve<'v>(&self, context: &'v Value, path: &str) -> Option<&'v Value> {
        resolve(context, path)
    }

    fn lookup<'v>(&self, value: &'v Value, key: EntryKey<'_>) -> Option<&'v Value> {
        lookup(value, key)
    }

    fn iterate<'v>(&self, value: Option<&'v Value>, visitor: &mut dyn FnMut(EntryKey<'v>)) {
        iterate(value, visitor)
    }

    fn stringify(&self, value: &Value) -> String {
        stringify(value)
    }
}

/// Runtime with the standard resolution and formatting rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRuntime;

impl Runtime for StandardRuntime {}

static SHARED_RUNTIME: Lazy<Arc<dyn Runtime>> = Lazy::new(|| Arc::new(StandardRuntime));

/// Process-wide runtime used by templates that do not embed their own.
pub fn shared_runtime() -> Arc<dyn Runtime> {
    Arc::clone(&SHARED_RUNTIME)
}
