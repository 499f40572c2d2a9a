//! Directory tree walking logic
//!
//! - `TreeWalker` / `Walk`: lazy pre-order traversal producing `PathNode`s
//! - `TreeNode`: the same traversal materialized in memory, for JSON output

mod config;
mod filter;
mod json_types;
mod node;
mod traversal;
mod utils;
mod walker;

pub use config::WalkerConfig;
pub use filter::NameFilter;
pub use json_types::TreeNode;
pub use node::{NodeKind, PathNode};
pub use traversal::resolve_kind;
pub use utils::glob_match;
pub use walker::{TreeWalker, Walk};
