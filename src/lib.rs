//! treecheck - compare the shape of repeating, templated directory trees
//!
//! A dataset laid out per subject (`sub-01/anat/sub-01_T1w.nii.gz`, ...)
//! should repeat the same structure under every subject. treecheck reduces
//! each name to an identifier, measures every path, and groups directories
//! by the identifiers they contain so deviations stand out.

pub mod check;
pub mod configurations;
pub mod error;
pub mod identifier;
pub mod logging;
pub mod output;
pub mod settings;
pub mod stats;
pub mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use check::{Analysis, run_check};
pub use configurations::{
    Configuration, ConfigurationAggregator, ConfigurationSet, DepthSelection,
};
pub use error::{CheckError, Result};
pub use identifier::IdentifierEngine;
pub use logging::{LogOptions, Verbosity, build_subscriber};
pub use output::{OutputConfig, Report, SummaryWriter, Tolerance, TreeFormatter};
pub use settings::Settings;
pub use stats::{Measure, MeasureAggregator, MeasureRecord};
pub use tree::{NameFilter, NodeKind, PathNode, TreeNode, TreeWalker, Walk, WalkerConfig};
