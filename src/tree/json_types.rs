//! Materialized tree for JSON output

use std::path::PathBuf;
use std::rc::Rc;

use serde::Serialize;

use super::node::{NodeKind, PathNode};

/// A node of the fully built tree. Files have no children; directories own
/// theirs in traversal order.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    File {
        name: String,
        path: PathBuf,
        identifier: String,
    },
    Dir {
        name: String,
        path: PathBuf,
        identifier: String,
        children: Vec<TreeNode>,
    },
}

impl TreeNode {
    fn from_node(node: &PathNode) -> Self {
        match node.kind() {
            NodeKind::File => TreeNode::File {
                name: node.name(),
                path: node.path().to_path_buf(),
                identifier: node.identifier().to_string(),
            },
            NodeKind::Directory => TreeNode::Dir {
                name: node.name(),
                path: node.path().to_path_buf(),
                identifier: node.identifier().to_string(),
                children: Vec::new(),
            },
        }
    }

    /// Assemble a pre-order node stream into a tree. Returns `None` for an
    /// empty stream.
    pub fn build<I>(nodes: I) -> Option<TreeNode>
    where
        I: IntoIterator<Item = Rc<PathNode>>,
    {
        // stack[i] holds the open node at depth i
        let mut stack: Vec<TreeNode> = Vec::new();

        for node in nodes {
            while stack.len() > node.depth() {
                close_top(&mut stack);
            }
            stack.push(TreeNode::from_node(&node));
        }

        while stack.len() > 1 {
            close_top(&mut stack);
        }
        stack.pop()
    }

    pub fn name(&self) -> &str {
        match self {
            TreeNode::File { name, .. } => name,
            TreeNode::Dir { name, .. } => name,
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            TreeNode::File { identifier, .. } => identifier,
            TreeNode::Dir { identifier, .. } => identifier,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, TreeNode::Dir { .. })
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::File { .. } => &[],
            TreeNode::Dir { children, .. } => children,
        }
    }
}

fn close_top(stack: &mut Vec<TreeNode>) {
    if let Some(done) = stack.pop() {
        if let Some(TreeNode::Dir { children, .. }) = stack.last_mut() {
            children.push(done);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::IdentifierEngine;
    use crate::test_utils::TestTree;
    use crate::tree::{TreeWalker, WalkerConfig};

    #[test]
    fn test_build_mirrors_directory_layout() {
        let tree = TestTree::new();
        tree.add_file("sub-01/anat/sub-01_T1w.nii.gz", "x");
        tree.add_file("sub-01/dwi/sub-01_dwi.nii.gz", "x");
        tree.add_file("README", "x");

        let walker = TreeWalker::new(
            WalkerConfig::default(),
            IdentifierEngine::with_default_expressions(false).unwrap(),
        );
        let root = TreeNode::build(walker.walk(tree.path()).unwrap()).unwrap();

        assert!(root.is_dir());
        let top: Vec<_> = root.children().iter().map(|c| c.name()).collect();
        assert_eq!(top, vec!["README", "sub-01"]);

        let subject = &root.children()[1];
        assert_eq!(subject.identifier(), "sub-");
        let modalities: Vec<_> = subject.children().iter().map(|c| c.name()).collect();
        assert_eq!(modalities, vec!["anat", "dwi"]);
        assert_eq!(
            subject.children()[0].children()[0].identifier(),
            "_T1w.nii.gz"
        );
    }

    #[test]
    fn test_build_empty_stream() {
        assert!(TreeNode::build(Vec::new()).is_none());
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let node = TreeNode::File {
            name: "a.txt".to_string(),
            path: PathBuf::from("/data/a.txt"),
            identifier: "a.txt".to_string(),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "file");
        assert_eq!(json["identifier"], "a.txt");
    }
}
