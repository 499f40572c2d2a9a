//! PathNode - one file-system entry produced by the walker

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::UNIX_EPOCH;

use crate::identifier::{IdentifierEngine, base_name};

/// Kind of a traversal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Directory,
}

/// One visited entry.
///
/// Nodes hold a shared link to their parent, so the ancestor chain stays
/// alive as long as any descendant does; parents never hold their children.
/// The identifier is resolved once at construction. Measures are not cached:
/// each call re-queries the file system.
#[derive(Debug)]
pub struct PathNode {
    path: PathBuf,
    kind: NodeKind,
    parent: Option<Rc<PathNode>>,
    depth: usize,
    is_last: bool,
    identifier: String,
}

impl PathNode {
    /// Create the traversal root (depth 0, no parent).
    pub fn root(path: PathBuf, kind: NodeKind, engine: &IdentifierEngine) -> Self {
        Self::new(path, kind, None, false, engine)
    }

    /// Create a node under `parent`. Depth is derived from the parent.
    pub fn new(
        path: PathBuf,
        kind: NodeKind,
        parent: Option<Rc<PathNode>>,
        is_last: bool,
        engine: &IdentifierEngine,
    ) -> Self {
        let depth = parent.as_ref().map_or(0, |p| p.depth + 1);
        let own = engine.identify_name(&base_name(&path), kind);
        let identifier = match (&parent, kind) {
            (Some(p), NodeKind::File) if engine.prefixes_files_with_parent() => {
                format!("{}/{}", p.identifier, own)
            }
            _ => own,
        };

        Self {
            path,
            kind,
            parent,
            depth,
            is_last,
            identifier,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> String {
        base_name(&self.path)
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn parent(&self) -> Option<&PathNode> {
        self.parent.as_deref()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_last(&self) -> bool {
        self.is_last
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Byte length for a file. For a directory, the mean byte length of its
    /// immediate file children rounded to the nearest integer, or 0 when it has
    /// none.
    pub fn file_size(&self) -> io::Result<u64> {
        match self.kind {
            NodeKind::File => Ok(fs::metadata(&self.path)?.len()),
            NodeKind::Directory => {
                let sizes: Vec<u64> = immediate_children(&self.path)?
                    .into_iter()
                    .filter(|p| p.is_file())
                    .filter_map(|p| fs::metadata(p).ok())
                    .map(|m| m.len())
                    .collect();
                if sizes.is_empty() {
                    return Ok(0);
                }
                let total: u64 = sizes.iter().sum();
                Ok((total as f64 / sizes.len() as f64).round() as u64)
            }
        }
    }

    /// Last modification time in whole seconds since the Unix epoch.
    pub fn modified_time(&self) -> io::Result<i64> {
        let modified = fs::metadata(&self.path)?.modified()?;
        Ok(match modified.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => -(e.duration().as_secs() as i64),
        })
    }

    /// Number of files directly under a directory; `None` for files.
    pub fn file_count(&self) -> io::Result<Option<u64>> {
        self.count_children(|p| p.is_file())
    }

    /// Number of directories directly under a directory; `None` for files.
    pub fn dir_count(&self) -> io::Result<Option<u64>> {
        self.count_children(|p| p.is_dir())
    }

    fn count_children(&self, keep: impl Fn(&Path) -> bool) -> io::Result<Option<u64>> {
        match self.kind {
            NodeKind::File => Ok(None),
            NodeKind::Directory => {
                let count = immediate_children(&self.path)?
                    .iter()
                    .filter(|p| keep(p))
                    .count();
                Ok(Some(count as u64))
            }
        }
    }
}

fn immediate_children(dir: &Path) -> io::Result<Vec<PathBuf>> {
    Ok(fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect())
}
