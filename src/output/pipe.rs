//! Per-file records for piping into other tools

use std::io::{self, Write};

use tracing::{Span, warn};

use crate::tree::PathNode;

/// Writes `path,identifier,file_size,modified_time` for every file node.
pub struct PipeWriter<W: Write> {
    out: W,
    span: Span,
}

impl<W: Write> PipeWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            span: Span::none(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Directories are skipped. Size and modification time are read from the
    /// file itself, whichever measures were requested. A file that vanished
    /// since it was listed is skipped with a warning.
    pub fn write_node(&mut self, node: &PathNode) -> io::Result<()> {
        if node.is_dir() {
            return Ok(());
        }
        let stat = node
            .file_size()
            .and_then(|size| Ok((size, node.modified_time()?)));
        let (size, modified) = match stat {
            Ok(stat) => stat,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    parent: &self.span,
                    "{} disappeared before it was piped, skipping",
                    node.path().display()
                );
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        writeln!(
            self.out,
            "{},{},{},{}",
            node.path().display(),
            node.identifier(),
            size,
            modified
        )
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
