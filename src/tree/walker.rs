//! TreeWalker - lazy depth-first traversal yielding one node per pull

use std::io;
use std::path::Path;
use std::rc::Rc;
use std::vec::IntoIter;

use tracing::{Span, debug};

use crate::error::Result;
use crate::identifier::IdentifierEngine;

use super::config::WalkerConfig;
use super::filter::NameFilter;
use super::node::{NodeKind, PathNode};
use super::traversal::{BaseTraversal, ChildEntry, resolve_kind};

/// Walks a directory tree, producing a [`PathNode`] for the root and every
/// descendant that survives filtering.
pub struct TreeWalker {
    config: WalkerConfig,
    engine: IdentifierEngine,
    filter: Option<NameFilter>,
    span: Span,
}

impl TreeWalker {
    pub fn new(config: WalkerConfig, engine: IdentifierEngine) -> Self {
        Self {
            config,
            engine,
            filter: None,
            span: Span::current(),
        }
    }

    pub fn with_filter(mut self, filter: NameFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Report traversal events under `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn engine(&self) -> &IdentifierEngine {
        &self.engine
    }

    /// Start a fresh traversal of `root`.
    ///
    /// Fails only if `root` itself cannot be stat'ed. Nothing below the root is
    /// read until the returned iterator is pulled.
    pub fn walk(&self, root: &Path) -> Result<Walk<'_>> {
        let (kind, _) = resolve_kind(root)?;
        if !root.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is a dangling link", root.display()),
            )
            .into());
        }
        debug!(parent: &self.span, "walking {}", root.display());
        let node = Rc::new(PathNode::root(root.to_path_buf(), kind, &self.engine));
        Ok(Walk {
            walker: self,
            pending_root: Some(node),
            pending_expand: None,
            stack: Vec::new(),
        })
    }
}

/// One directory being iterated: its node and the children not yet yielded.
struct Frame {
    parent: Rc<PathNode>,
    children: IntoIter<ChildEntry>,
}

/// Pre-order, depth-first iterator over a tree.
///
/// The traversal keeps an explicit stack of frames. A directory's children
/// are listed on the pull after the directory itself is yielded, so dropping
/// the iterator early stops all file-system access.
pub struct Walk<'w> {
    walker: &'w TreeWalker,
    pending_root: Option<Rc<PathNode>>,
    pending_expand: Option<Rc<PathNode>>,
    stack: Vec<Frame>,
}

impl Walk<'_> {
    fn expand(&mut self, node: Rc<PathNode>) {
        let traversal = BaseTraversal::new(
            &self.walker.config,
            self.walker.filter.as_ref(),
            &self.walker.span,
        );
        let children = traversal.list_children(node.path());
        self.stack.push(Frame {
            parent: node,
            children: children.into_iter(),
        });
    }

    fn schedule(&mut self, node: &Rc<PathNode>, expandable: bool) {
        if expandable && self.walker.config.expands_at(node.depth()) {
            self.pending_expand = Some(Rc::clone(node));
        }
    }
}

impl Iterator for Walk<'_> {
    type Item = Rc<PathNode>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.pending_root.take() {
            // a symlinked root is followed; only symlinked children stay closed
            let expandable = root.kind() == NodeKind::Directory;
            self.schedule(&root, expandable);
            return Some(root);
        }

        if let Some(dir) = self.pending_expand.take() {
            self.expand(dir);
        }

        loop {
            let frame = self.stack.last_mut()?;
            match frame.children.next() {
                Some(child) => {
                    let expandable = child.expandable();
                    let node = Rc::new(PathNode::new(
                        child.path,
                        child.kind,
                        Some(Rc::clone(&frame.parent)),
                        child.is_last,
                        &self.walker.engine,
                    ));
                    self.schedule(&node, expandable);
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
