//! Shared utility functions for output formatting

use std::borrow::Cow;

use chrono::{Local, TimeZone};

use crate::tree::PathNode;

pub const BRANCH: &str = "├── ";
pub const LAST_BRANCH: &str = "└── ";
const GUIDE: &str = "│   ";
const BLANK: &str = "    ";

/// Guide columns drawn before a node's connector: one per ancestor below the
/// root, a vertical bar when that ancestor still has siblings to come.
pub fn ancestor_prefix(node: &PathNode) -> String {
    let mut parts = Vec::new();
    let mut ancestor = node.parent();
    while let Some(a) = ancestor {
        if a.parent().is_none() {
            break;
        }
        parts.push(if a.is_last() { BLANK } else { GUIDE });
        ancestor = a.parent();
    }
    parts.reverse();
    parts.concat()
}

pub fn connector(is_last: bool) -> &'static str {
    if is_last { LAST_BRANCH } else { BRANCH }
}

/// Columns the name of a node at `depth` is padded to.
pub fn name_column(name_width: usize, depth: usize) -> usize {
    name_width.saturating_sub(depth * 3)
}

/// Format epoch seconds the way `ctime` does, in local time.
pub fn format_timestamp(secs: i64) -> String {
    match Local.timestamp_opt(secs, 0).single() {
        Some(t) => t.format("%a %b %e %H:%M:%S %Y").to_string(),
        None => secs.to_string(),
    }
}

/// Quote a CSV field when it contains a delimiter, quote or line break.
pub fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Render an optional measure value; not-applicable values render as `n/a`.
pub fn display_value(value: Option<i64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}
