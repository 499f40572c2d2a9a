//! Name-based search criteria for tree walking

use regex::Regex;
use tracing::{Span, warn};

use super::node::NodeKind;

/// Search criteria applied to entry names while listing a directory.
///
/// The expression must match at the start of the name. Each kind is only
/// filtered when its flag is set; entries of an unfiltered kind always pass.
#[derive(Debug, Clone)]
pub struct NameFilter {
    pattern: Regex,
    filter_files: bool,
    filter_directories: bool,
}

impl NameFilter {
    pub fn new(pattern: Regex, filter_files: bool, filter_directories: bool) -> Self {
        Self {
            pattern,
            filter_files,
            filter_directories,
        }
    }

    /// Compile search criteria. An invalid expression disables filtering:
    /// a warning is logged on `span` and `None` is returned.
    pub fn compile(
        expression: &str,
        filter_files: bool,
        filter_directories: bool,
        span: &Span,
    ) -> Option<Self> {
        match Regex::new(expression) {
            Ok(pattern) => Some(Self::new(pattern, filter_files, filter_directories)),
            Err(e) => {
                warn!(
                    parent: span,
                    "search criteria '{}' is invalid, resuming without criteria: {}",
                    expression,
                    e
                );
                None
            }
        }
    }

    /// Check if an entry with this name and kind is kept.
    pub fn admits(&self, name: &str, kind: NodeKind) -> bool {
        let applies = match kind {
            NodeKind::File => self.filter_files,
            NodeKind::Directory => self.filter_directories,
        };
        !applies || self.matches(name)
    }

    fn matches(&self, name: &str) -> bool {
        self.pattern.find(name).is_some_and(|m| m.start() == 0)
    }
}
