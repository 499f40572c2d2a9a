//! Per-identifier measure collection
//!
//! Every traversal node contributes one value per requested measure, stored
//! under `measure → identifier → path`. Values that do not apply to a node's
//! kind (counts on a file) are recorded as `None`.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use tracing::{Span, warn};

use crate::error::{CheckError, Result};
use crate::tree::PathNode;

/// A named scalar statistic taken per path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// Files directly under a directory.
    FileCount,
    /// Directories directly under a directory.
    DirCount,
    /// Bytes for a file; mean immediate-file size for a directory.
    FileSize,
    /// Seconds since the Unix epoch.
    ModifiedTime,
}

impl Measure {
    /// All measures, in canonical request order.
    pub const ALL: [Measure; 4] = [
        Measure::FileCount,
        Measure::DirCount,
        Measure::FileSize,
        Measure::ModifiedTime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Measure::FileCount => "file_count",
            Measure::DirCount => "dir_count",
            Measure::FileSize => "file_size",
            Measure::ModifiedTime => "modified_time",
        }
    }

    /// Query the live file system for this measure on `node`.
    pub fn value(&self, node: &PathNode) -> io::Result<Option<i64>> {
        Ok(match self {
            Measure::FileCount => node.file_count()?.map(|n| n as i64),
            Measure::DirCount => node.dir_count()?.map(|n| n as i64),
            Measure::FileSize => Some(node.file_size()? as i64),
            Measure::ModifiedTime => Some(node.modified_time()?),
        })
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Measure {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        Measure::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| CheckError::Config(format!("unknown measure '{}'", s)))
    }
}

/// identifier → path → value for one measure.
pub type IdentifierValues = BTreeMap<String, BTreeMap<PathBuf, Option<i64>>>;

/// The full measurement record.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MeasureRecord {
    /// Measures in the order they were requested.
    pub measures: Vec<Measure>,
    pub values: BTreeMap<Measure, IdentifierValues>,
}

impl MeasureRecord {
    pub fn get(&self, measure: Measure) -> Option<&IdentifierValues> {
        self.values.get(&measure)
    }

    /// Value recorded for one path, if any. `Some(None)` means the measure was
    /// recorded as not applicable.
    pub fn value(&self, measure: Measure, identifier: &str, path: &Path) -> Option<Option<i64>> {
        self.values
            .get(&measure)?
            .get(identifier)?
            .get(path)
            .copied()
    }

    /// Number of distinct identifiers measured by the first requested measure.
    pub fn identifier_count(&self) -> usize {
        self.measures
            .first()
            .and_then(|m| self.values.get(m))
            .map_or(0, |ids| ids.len())
    }
}

/// Collects measures while the tree is traversed.
pub struct MeasureAggregator {
    record: MeasureRecord,
    span: Span,
}

impl MeasureAggregator {
    /// Duplicate measures are dropped, keeping first-request order.
    pub fn new(measures: &[Measure]) -> Self {
        let mut requested: Vec<Measure> = Vec::new();
        for m in measures {
            if !requested.contains(m) {
                requested.push(*m);
            }
        }
        let values = requested
            .iter()
            .map(|m| (*m, IdentifierValues::new()))
            .collect();
        Self {
            record: MeasureRecord {
                measures: requested,
                values,
            },
            span: Span::current(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn measures(&self) -> &[Measure] {
        &self.record.measures
    }

    /// Record every requested measure for `node`.
    ///
    /// A node that vanished before it could be measured is logged and left
    /// out entirely; other I/O failures are returned.
    pub fn record(&mut self, node: &PathNode) -> Result<()> {
        let mut taken = Vec::with_capacity(self.record.measures.len());
        for measure in &self.record.measures {
            match measure.value(node) {
                Ok(value) => taken.push((*measure, value)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!(
                        parent: &self.span,
                        "{} disappeared before it was measured, skipping",
                        node.path().display()
                    );
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        }

        for (measure, value) in taken {
            self.record
                .values
                .entry(measure)
                .or_default()
                .entry(node.identifier().to_string())
                .or_default()
                .insert(node.path().to_path_buf(), value);
        }
        Ok(())
    }

    pub fn snapshot(&self) -> &MeasureRecord {
        &self.record
    }

    pub fn finalize(self) -> MeasureRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::IdentifierEngine;
    use crate::test_utils::TestTree;
    use crate::tree::{TreeWalker, WalkerConfig};

    fn collect(tree: &TestTree, measures: &[Measure]) -> MeasureRecord {
        let walker = TreeWalker::new(
            WalkerConfig::default(),
            IdentifierEngine::with_default_expressions(false).unwrap(),
        );
        let mut aggregator = MeasureAggregator::new(measures);
        for node in walker.walk(tree.path()).unwrap() {
            aggregator.record(&node).unwrap();
        }
        aggregator.finalize()
    }

    #[test]
    fn test_measure_names_round_trip() {
        for m in Measure::ALL {
            assert_eq!(m.name().parse::<Measure>().unwrap(), m);
        }
        assert!("line_count".parse::<Measure>().is_err());
    }

    #[test]
    fn test_values_grouped_by_identifier() {
        let tree = TestTree::new();
        tree.add_file("sub-01/anat/sub-01_T1w.nii.gz", "abcd");
        tree.add_file("sub-02/anat/sub-02_T1w.nii.gz", "ab");

        let record = collect(&tree, &[Measure::FileSize, Measure::FileCount]);
        let sizes = &record.get(Measure::FileSize).unwrap()["_T1w.nii.gz"];
        assert_eq!(sizes.len(), 2);
        assert_eq!(
            sizes[&tree.path().join("sub-01/anat/sub-01_T1w.nii.gz")],
            Some(4)
        );
        assert_eq!(
            sizes[&tree.path().join("sub-02/anat/sub-02_T1w.nii.gz")],
            Some(2)
        );

        let anat_counts = &record.get(Measure::FileCount).unwrap()["anat"];
        assert!(anat_counts.values().all(|v| *v == Some(1)));
    }

    #[test]
    fn test_counts_on_files_are_not_applicable() {
        let tree = TestTree::new();
        tree.add_file("sub-01/sub-01_scans.tsv", "x");

        let record = collect(&tree, &[Measure::DirCount]);
        let path = tree.path().join("sub-01/sub-01_scans.tsv");
        assert_eq!(
            record.value(Measure::DirCount, "_scans.tsv", &path),
            Some(None)
        );
    }

    #[test]
    fn test_requested_order_kept_and_deduplicated() {
        let aggregator = MeasureAggregator::new(&[
            Measure::ModifiedTime,
            Measure::FileCount,
            Measure::ModifiedTime,
        ]);
        assert_eq!(
            aggregator.measures(),
            &[Measure::ModifiedTime, Measure::FileCount]
        );
    }

    #[test]
    fn test_unrequested_measure_absent() {
        let tree = TestTree::new();
        tree.add_file("a_x.txt", "x");
        let record = collect(&tree, &[Measure::FileSize]);
        assert!(record.get(Measure::ModifiedTime).is_none());
    }

    #[test]
    fn test_every_path_recorded_once() {
        let tree = TestTree::new();
        tree.add_file("sub-01/a_x.txt", "x");
        tree.add_file("sub-02/a_x.txt", "x");
        let record = collect(&tree, &[Measure::FileCount]);
        let total: usize = record
            .get(Measure::FileCount)
            .unwrap()
            .values()
            .map(|paths| paths.len())
            .sum();
        // root, two subject dirs, two files
        assert_eq!(total, 5);
        assert_eq!(record.identifier_count(), 3);
    }
}
