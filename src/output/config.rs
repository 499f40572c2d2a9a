//! Output configuration types

use crate::stats::Measure;

/// Width the node name column is padded to at depth 0. Each level of depth
/// takes three columns from it.
pub const DEFAULT_NAME_WIDTH: usize = 60;

/// Configuration for text tree formatting.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
    /// Measures shown next to each node, where they apply to the node's kind.
    pub measures: Vec<Measure>,
    pub name_width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_color: true,
            measures: Vec::new(),
            name_width: DEFAULT_NAME_WIDTH,
        }
    }
}
