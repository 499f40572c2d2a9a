//! Directory configuration comparison
//!
//! A configuration is one "shape" of a directory: the sorted list of its
//! immediate children's identifiers. Directories sharing an identifier are
//! expected to share a shape across a repeating dataset; the aggregator
//! buckets each qualifying directory under its identifier and shape so the
//! variants (and the paths exhibiting them) can be reported.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{Span, debug, warn};

use crate::error::{CheckError, Result};
use crate::identifier::IdentifierEngine;
use crate::tree::PathNode;

/// Which directory depths take part in configuration comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthSelection {
    #[default]
    All,
    Target(usize),
    /// Inclusive on both ends.
    Range { start: usize, end: usize },
}

impl DepthSelection {
    /// Resolve the selection from its configured parts. An enabled, complete
    /// range wins over a target depth; with neither, every depth qualifies.
    pub fn resolve(
        target_depth: Option<usize>,
        use_range: bool,
        range: Option<(usize, usize)>,
    ) -> Self {
        match (use_range, range, target_depth) {
            (true, Some((start, end)), _) => DepthSelection::Range { start, end },
            (_, _, Some(depth)) => DepthSelection::Target(depth),
            _ => DepthSelection::All,
        }
    }

    pub fn admits(&self, depth: usize) -> bool {
        match *self {
            DepthSelection::All => true,
            DepthSelection::Target(target) => depth == target,
            DepthSelection::Range { start, end } => (start..=end).contains(&depth),
        }
    }
}

/// One distinct shape observed for an identifier and the directories that
/// have it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    /// Child identifiers, sorted.
    pub structure: Vec<String>,
    pub paths: Vec<PathBuf>,
}

/// Identifier → its distinct configurations, in discovery order.
pub type ConfigurationSet = BTreeMap<String, Vec<Configuration>>;

/// Buckets directories by (identifier, shape).
pub struct ConfigurationAggregator {
    engine: IdentifierEngine,
    selection: DepthSelection,
    configurations: ConfigurationSet,
    span: Span,
}

impl ConfigurationAggregator {
    pub fn new(engine: IdentifierEngine, selection: DepthSelection) -> Self {
        Self {
            engine,
            selection,
            configurations: ConfigurationSet::new(),
            span: Span::current(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn selection(&self) -> DepthSelection {
        self.selection
    }

    /// Record one traversal node.
    ///
    /// Files, the traversal root and directories outside the depth selection
    /// are skipped. The shape is computed by listing the directory afresh and
    /// identifying every child (unprefixed), independent of what the walker
    /// filtered.
    pub fn record(&mut self, node: &PathNode) -> Result<()> {
        if !node.is_dir() || node.depth() == 0 || !self.selection.admits(node.depth()) {
            return Ok(());
        }

        let shape = match self.shape_of(node.path()) {
            Ok(shape) => shape,
            Err(CheckError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    parent: &self.span,
                    "{} disappeared before its configuration was read, skipping",
                    node.path().display()
                );
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let identifier = node.identifier();
        let path = node.path().to_path_buf();
        let span = &self.span;
        let list = self
            .configurations
            .entry(identifier.to_string())
            .or_default();

        match list.iter_mut().find(|c| c.structure == shape) {
            Some(existing) => existing.paths.push(path),
            None => {
                debug!(
                    parent: span,
                    "configuration #{} for '{}': {:?}",
                    list.len() + 1,
                    identifier,
                    shape
                );
                list.push(Configuration {
                    structure: shape,
                    paths: vec![path],
                });
            }
        }
        Ok(())
    }

    fn shape_of(&self, dir: &Path) -> Result<Vec<String>> {
        let mut shape = Vec::new();
        for entry in fs::read_dir(dir)? {
            let child = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!(parent: &self.span, "skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            match self.engine.identify(&child, false) {
                Ok(identifier) => shape.push(identifier),
                Err(CheckError::InvalidPathKind { .. }) if vanished(&child) => {
                    warn!(
                        parent: &self.span,
                        "{} disappeared during traversal, skipping",
                        child.display()
                    );
                }
                Err(e) => return Err(e),
            }
        }
        shape.sort();
        Ok(shape)
    }

    /// Configurations recorded so far.
    pub fn snapshot(&self) -> &ConfigurationSet {
        &self.configurations
    }

    pub fn into_configurations(self) -> ConfigurationSet {
        self.configurations
    }
}

fn vanished(path: &Path) -> bool {
    matches!(fs::symlink_metadata(path), Err(e) if e.kind() == io::ErrorKind::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestTree;
    use crate::tree::{TreeWalker, WalkerConfig};
    use std::collections::HashSet;

    fn engine() -> IdentifierEngine {
        IdentifierEngine::with_default_expressions(false).unwrap()
    }

    fn aggregate(tree: &TestTree, selection: DepthSelection) -> ConfigurationSet {
        let walker = TreeWalker::new(WalkerConfig::default(), engine());
        let mut aggregator = ConfigurationAggregator::new(engine(), selection);
        for node in walker.walk(tree.path()).unwrap() {
            aggregator.record(&node).unwrap();
        }
        aggregator.into_configurations()
    }

    fn three_subjects() -> TestTree {
        let tree = TestTree::new();
        tree.add_file("sub-01/anat/sub-01_T1w.nii.gz", "x");
        tree.add_file("sub-01/dwi/sub-01_dwi.nii.gz", "x");
        tree.add_file("sub-02/anat/sub-02_T1w.nii.gz", "x");
        tree.add_file("sub-02/dwi/sub-02_dwi.nii.gz", "x");
        tree.add_file("sub-03/anat/sub-03_T1w.nii.gz", "x");
        tree
    }

    #[test]
    fn test_matching_shapes_share_a_configuration() {
        let tree = three_subjects();
        let configurations = aggregate(&tree, DepthSelection::Target(1));

        let subjects = &configurations["sub-"];
        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[0].structure, vec!["anat", "dwi"]);
        assert_eq!(
            subjects[0].paths,
            vec![tree.path().join("sub-01"), tree.path().join("sub-02")]
        );
        assert_eq!(subjects[1].structure, vec!["anat"]);
        assert_eq!(subjects[1].paths, vec![tree.path().join("sub-03")]);
    }

    #[test]
    fn test_target_depth_excludes_other_levels() {
        let tree = three_subjects();
        let configurations = aggregate(&tree, DepthSelection::Target(1));
        assert!(!configurations.contains_key("anat"));
        assert!(!configurations.contains_key("dwi"));
    }

    #[test]
    fn test_all_depths_include_nested_directories() {
        let tree = three_subjects();
        let configurations = aggregate(&tree, DepthSelection::All);
        let anat = &configurations["anat"];
        assert_eq!(anat.len(), 1);
        assert_eq!(anat[0].structure, vec!["_T1w.nii.gz"]);
        assert_eq!(anat[0].paths.len(), 3);
    }

    #[test]
    fn test_root_and_files_never_recorded() {
        let tree = three_subjects();
        let configurations = aggregate(&tree, DepthSelection::All);
        let root_name = tree
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        let all_paths: Vec<_> = configurations
            .values()
            .flatten()
            .flat_map(|c| c.paths.iter())
            .collect();
        assert!(all_paths.iter().all(|p| p.as_path() != tree.path()));
        assert!(all_paths.iter().all(|p| p.is_dir()));
        assert!(!configurations.contains_key(&root_name));
    }

    #[test]
    fn test_paths_partitioned_per_identifier() {
        let tree = three_subjects();
        tree.add_file("sub-04/anat/sub-04_T1w.nii.gz", "x");
        tree.add_file("sub-04/func/sub-04_bold.nii.gz", "x");
        let configurations = aggregate(&tree, DepthSelection::All);

        for list in configurations.values() {
            let structures: HashSet<_> = list.iter().map(|c| c.structure.clone()).collect();
            assert_eq!(structures.len(), list.len());

            let paths: Vec<_> = list.iter().flat_map(|c| c.paths.clone()).collect();
            let unique: HashSet<_> = paths.iter().collect();
            assert_eq!(unique.len(), paths.len());
        }

        let subject_paths: HashSet<_> = configurations["sub-"]
            .iter()
            .flat_map(|c| c.paths.clone())
            .collect();
        let expected: HashSet<_> = ["sub-01", "sub-02", "sub-03", "sub-04"]
            .iter()
            .map(|s| tree.path().join(s))
            .collect();
        assert_eq!(subject_paths, expected);
    }

    #[test]
    fn test_shape_is_a_multiset() {
        let tree = TestTree::new();
        tree.add_file("sub-01/ses-1/a_x.txt", "x");
        tree.add_file("sub-01/ses-2/a_x.txt", "x");
        tree.add_file("sub-02/ses-1/a_x.txt", "x");
        let configurations = aggregate(&tree, DepthSelection::Target(1));

        let subjects = &configurations["sub-"];
        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[0].structure, vec!["ses-", "ses-"]);
        assert_eq!(subjects[1].structure, vec!["ses-"]);
    }

    #[test]
    fn test_shape_ignores_walker_filters() {
        let tree = three_subjects();
        tree.add_file("sub-01/.hidden", "");
        let walker = TreeWalker::new(
            WalkerConfig {
                filter_hidden: true,
                ..Default::default()
            },
            engine(),
        );
        let mut aggregator = ConfigurationAggregator::new(engine(), DepthSelection::Target(1));
        for node in walker.walk(tree.path()).unwrap() {
            aggregator.record(&node).unwrap();
        }
        let subjects = &aggregator.snapshot()["sub-"];
        assert!(
            subjects
                .iter()
                .any(|c| c.structure == vec![".hidden", "anat", "dwi"])
        );
    }

    #[test]
    fn test_depth_selection_resolution() {
        assert_eq!(
            DepthSelection::resolve(Some(2), true, Some((1, 3))),
            DepthSelection::Range { start: 1, end: 3 }
        );
        assert_eq!(
            DepthSelection::resolve(Some(2), false, Some((1, 3))),
            DepthSelection::Target(2)
        );
        assert_eq!(
            DepthSelection::resolve(Some(2), true, None),
            DepthSelection::Target(2)
        );
        assert_eq!(DepthSelection::resolve(None, false, None), DepthSelection::All);
    }

    #[test]
    fn test_depth_selection_admits() {
        let range = DepthSelection::Range { start: 1, end: 2 };
        assert!(!range.admits(0));
        assert!(range.admits(1));
        assert!(range.admits(2));
        assert!(!range.admits(3));
        assert!(DepthSelection::Target(3).admits(3));
        assert!(!DepthSelection::Target(3).admits(2));
        assert!(DepthSelection::All.admits(7));
    }
}
