//! Identifier extraction
//!
//! An identifier is the subject-agnostic part of a file or directory name.
//! `sub-15464521_T1w.nii.gz` and `sub-25484441_T1w.nii.gz` both reduce to
//! `_T1w.nii.gz` with the default file expression, and every `sub-NNNN`
//! directory reduces to `sub-`. Identifiers are what measures and
//! configurations are aggregated under.

use std::path::Path;

use regex::Regex;

use crate::error::{CheckError, Result};
use crate::tree::NodeKind;

/// Keep everything from the first `_` onward, dropping a leading subject token.
pub const DEFAULT_FILE_EXPRESSION: &str = "_.*$";

/// Keep everything up to and including the first `-`.
pub const DEFAULT_DIRECTORY_EXPRESSION: &str = "^.*-";

/// Maps path names to identifiers with one expression for files and one for
/// directories.
///
/// Expressions use search semantics: the leftmost match anywhere in the name
/// is kept. Anchor the expression with `^`/`$` to get anchored behavior. When
/// nothing matches, or the match is empty, the full name is kept.
#[derive(Debug, Clone)]
pub struct IdentifierEngine {
    file_pattern: Regex,
    directory_pattern: Regex,
    treat_unknown_as_file: bool,
    prefix_files_with_parent: bool,
}

impl IdentifierEngine {
    /// Compile both expressions.
    ///
    /// `treat_unknown_as_file` controls paths that are neither an existing file
    /// nor an existing directory: `false` makes [`identify`](Self::identify)
    /// fail with [`CheckError::InvalidPathKind`], `true` applies the file
    /// expression to them.
    pub fn new(
        file_expression: &str,
        directory_expression: &str,
        treat_unknown_as_file: bool,
    ) -> Result<Self> {
        Ok(Self {
            file_pattern: compile(file_expression)?,
            directory_pattern: compile(directory_expression)?,
            treat_unknown_as_file,
            prefix_files_with_parent: false,
        })
    }

    /// Engine using [`DEFAULT_FILE_EXPRESSION`] and [`DEFAULT_DIRECTORY_EXPRESSION`].
    pub fn with_default_expressions(treat_unknown_as_file: bool) -> Result<Self> {
        Self::new(
            DEFAULT_FILE_EXPRESSION,
            DEFAULT_DIRECTORY_EXPRESSION,
            treat_unknown_as_file,
        )
    }

    /// Prefix file identifiers with their parent directory's identifier when
    /// identifying traversal nodes.
    pub fn with_parent_prefix(mut self, enabled: bool) -> Self {
        self.prefix_files_with_parent = enabled;
        self
    }

    pub fn prefixes_files_with_parent(&self) -> bool {
        self.prefix_files_with_parent
    }

    pub fn file_expression(&self) -> &str {
        self.file_pattern.as_str()
    }

    pub fn directory_expression(&self) -> &str {
        self.directory_pattern.as_str()
    }

    /// Identify a path by querying the file system for its kind.
    ///
    /// With `prefix_with_parent`, a file's identifier becomes
    /// `"<parent identifier>/<file identifier>"`. The parent is identified
    /// without prefixing, and directories are never prefixed.
    pub fn identify(&self, path: &Path, prefix_with_parent: bool) -> Result<String> {
        let name = base_name(path);

        if path.is_file() {
            let own = self.identify_name(&name, NodeKind::File);
            if prefix_with_parent {
                let parent = parent_or_current(path);
                let parent_identifier = self.identify(parent, false)?;
                return Ok(format!("{}/{}", parent_identifier, own));
            }
            return Ok(own);
        }

        if path.is_dir() {
            return Ok(self.identify_name(&name, NodeKind::Directory));
        }

        if self.treat_unknown_as_file {
            Ok(self.identify_name(&name, NodeKind::File))
        } else {
            Err(CheckError::InvalidPathKind {
                path: path.to_path_buf(),
            })
        }
    }

    /// Identify a bare name whose kind is already known. Pure; never touches
    /// the file system.
    pub fn identify_name(&self, name: &str, kind: NodeKind) -> String {
        let pattern = match kind {
            NodeKind::File => &self.file_pattern,
            NodeKind::Directory => &self.directory_pattern,
        };
        match pattern.find(name) {
            Some(m) if !m.as_str().is_empty() => m.as_str().to_string(),
            _ => name.to_string(),
        }
    }
}

fn compile(expression: &str) -> Result<Regex> {
    Regex::new(expression).map_err(|source| CheckError::InvalidPattern {
        pattern: expression.to_string(),
        source,
    })
}

/// Final path component, or the whole path for roots like `/` and `.`.
pub(crate) fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn parent_or_current(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
