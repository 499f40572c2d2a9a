//! Directory listing and child filtering for the walker

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{Span, debug, warn};

use super::config::WalkerConfig;
use super::filter::NameFilter;
use super::node::NodeKind;
use super::utils::{compare_names, should_ignore_name};

/// A child that survived filtering, with its kind already resolved.
#[derive(Debug, Clone)]
pub struct ChildEntry {
    pub path: PathBuf,
    pub kind: NodeKind,
    /// Symlinked directories are yielded but never expanded.
    pub is_symlink: bool,
    pub is_last: bool,
}

impl ChildEntry {
    pub fn expandable(&self) -> bool {
        self.kind == NodeKind::Directory && !self.is_symlink
    }
}

/// Listing and filtering rules for one traversal.
pub struct BaseTraversal<'a> {
    pub config: &'a WalkerConfig,
    pub filter: Option<&'a NameFilter>,
    pub span: &'a Span,
}

impl<'a> BaseTraversal<'a> {
    pub fn new(config: &'a WalkerConfig, filter: Option<&'a NameFilter>, span: &'a Span) -> Self {
        Self {
            config,
            filter,
            span,
        }
    }

    /// List, sort, and filter the children of `dir`.
    ///
    /// Children are ordered case-insensitively by name. An entry is dropped
    /// when it is ignored by name, hidden (with hidden filtering on), or
    /// rejected by the search criteria for its kind. Entries that vanish
    /// before their kind can be resolved are logged and skipped. The last
    /// surviving entry is flagged `is_last`.
    pub fn list_children(&self, dir: &Path) -> Vec<ChildEntry> {
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!(parent: self.span, "cannot list {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let mut named: Vec<(String, PathBuf)> = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => {
                    let name = entry.file_name().to_string_lossy().to_string();
                    named.push((name, entry.path()));
                }
                Err(e) => {
                    warn!(parent: self.span, "skipping unreadable entry in {}: {}", dir.display(), e);
                }
            }
        }
        named.sort_by(|a, b| compare_names(&a.0, &b.0));
        self.select(named)
    }

    /// Apply the ignore, kind and search rules to already sorted entries and
    /// flag the last survivor.
    pub fn select(&self, named: Vec<(String, PathBuf)>) -> Vec<ChildEntry> {
        let mut children = Vec::with_capacity(named.len());
        for (name, path) in named {
            if should_ignore_name(&name, self.config) {
                debug!(parent: self.span, "ignoring {}", path.display());
                continue;
            }

            let (kind, is_symlink) = match resolve_kind(&path) {
                Ok(resolved) => resolved,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!(
                        parent: self.span,
                        "{} disappeared during traversal, skipping",
                        path.display()
                    );
                    continue;
                }
                Err(e) => {
                    warn!(parent: self.span, "cannot stat {}: {}, skipping", path.display(), e);
                    continue;
                }
            };

            if let Some(filter) = self.filter {
                if !filter.admits(&name, kind) {
                    continue;
                }
            }

            children.push(ChildEntry {
                path,
                kind,
                is_symlink,
                is_last: false,
            });
        }

        if let Some(last) = children.last_mut() {
            last.is_last = true;
        }
        children
    }
}

/// Resolve an entry's kind, following symlinks. Dangling links count as files.
pub fn resolve_kind(path: &Path) -> io::Result<(NodeKind, bool)> {
    let link_meta = fs::symlink_metadata(path)?;
    if link_meta.file_type().is_symlink() {
        let kind = match fs::metadata(path) {
            Ok(m) if m.is_dir() => NodeKind::Directory,
            _ => NodeKind::File,
        };
        return Ok((kind, true));
    }
    let kind = if link_meta.is_dir() {
        NodeKind::Directory
    } else {
        NodeKind::File
    };
    Ok((kind, false))
}
