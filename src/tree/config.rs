//! Configuration types for the tree walker

/// Configuration for tree walking behavior.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Skip entries whose name starts with `.`, including whole hidden subtrees.
    pub filter_hidden: bool,
    /// Names (exact, or glob patterns) whose entries and subtrees are skipped.
    pub ignore_patterns: Vec<String>,
    /// Directories at or beyond this depth are yielded but not expanded.
    pub depth_limit: Option<usize>,
}

impl WalkerConfig {
    /// Check if a node at `depth` may have its children listed.
    pub fn expands_at(&self, depth: usize) -> bool {
        self.depth_limit.is_none_or(|limit| depth < limit)
    }
}
