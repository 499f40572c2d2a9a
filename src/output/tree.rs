//! Text tree formatter
//!
//! `TreeFormatter` renders walker nodes one at a time as they are produced,
//! so the tree can be written while the traversal is still running.

use std::io;

use termcolor::{Color, ColorSpec, WriteColor};

use crate::stats::{Measure, MeasureRecord};
use crate::tree::PathNode;

use super::config::OutputConfig;
use super::utils::{ancestor_prefix, connector, format_timestamp, name_column};

const MEASURE_COLUMN: usize = 40;
const TIME_COLUMN: usize = 60;

/// Streaming tree formatter over any color-aware sink.
pub struct TreeFormatter<W: WriteColor> {
    config: OutputConfig,
    out: W,
    dir_count: usize,
    file_count: usize,
}

impl<W: WriteColor> TreeFormatter<W> {
    pub fn new(config: OutputConfig, out: W) -> Self {
        Self {
            config,
            out,
            dir_count: 0,
            file_count: 0,
        }
    }

    /// Write one node line. Measure values are looked up in `record`; a
    /// measure that was not recorded for the node is left out of the line.
    pub fn write_node(&mut self, node: &PathNode, record: &MeasureRecord) -> io::Result<()> {
        let name = node.name();
        let is_root = node.parent().is_none();

        if !is_root {
            write!(
                self.out,
                "{}{}",
                ancestor_prefix(node),
                connector(node.is_last())
            )?;
            if node.is_dir() {
                self.dir_count += 1;
            } else {
                self.file_count += 1;
            }
        }

        let width = name_column(self.config.name_width, node.depth());
        if node.is_dir() {
            self.out
                .set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true))?;
            write!(self.out, "{}", name)?;
            self.out.reset()?;
        } else {
            write!(self.out, "{}", name)?;
        }

        let measures = self.measure_text(node, record);
        if measures.is_empty() {
            writeln!(self.out)?;
        } else {
            let pad = width.saturating_sub(name.chars().count());
            writeln!(self.out, "{}{}", " ".repeat(pad), measures.trim_end())?;
        }
        Ok(())
    }

    fn measure_text(&self, node: &PathNode, record: &MeasureRecord) -> String {
        let mut text = String::new();
        for measure in &self.config.measures {
            let Some(Some(value)) = record.value(*measure, node.identifier(), node.path()) else {
                continue;
            };
            let (cell, column) = match measure {
                Measure::FileSize => (format!("File size = {} bytes", value), MEASURE_COLUMN),
                Measure::DirCount => (format!("Directory count = {}", value), MEASURE_COLUMN),
                Measure::FileCount => (format!("File count = {}", value), MEASURE_COLUMN),
                Measure::ModifiedTime => (
                    format!("Modification time = {}", format_timestamp(value)),
                    TIME_COLUMN,
                ),
            };
            text.push_str(&format!("{:<width$}", cell, width = column));
        }
        text
    }

    /// Write the trailing count line and hand back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "{} directories, {} files",
            self.dir_count, self.file_count
        )?;
        self.out.flush()?;
        Ok(self.out)
    }
}
