//! One complete check: traverse, aggregate, then write reports
//!
//! The traversal feeds every node into the measure and configuration
//! aggregators and the streaming writers. Report files are only written by
//! [`Analysis::write_reports`], after the traversal has finished.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::Local;
use termcolor::{Buffer, BufferWriter, ColorChoice};
use tracing::{Span, info};

use crate::configurations::{ConfigurationAggregator, ConfigurationSet};
use crate::error::Result;
use crate::output::{
    OutputConfig, PipeWriter, Report, SummaryWriter, TreeFormatter, render_histograms, write_csv,
};
use crate::settings::Settings;
use crate::stats::{MeasureAggregator, MeasureRecord};
use crate::tree::{PathNode, TreeNode, TreeWalker};

/// Everything a traversal produced.
#[derive(Debug)]
pub struct Analysis {
    pub root: PathBuf,
    pub measures: MeasureRecord,
    pub configurations: Option<ConfigurationSet>,
    /// Rendered text tree, when requested.
    pub text_tree: Option<Buffer>,
    /// Materialized tree, kept for the JSON report.
    pub tree: Option<TreeNode>,
    pub node_count: usize,
}

/// Traverse the configured root.
///
/// `color_tree` selects ANSI codes for the in-memory text tree. Piped
/// records, when enabled, are written to `pipe` as nodes are visited.
pub fn run_check<W: Write>(
    settings: &Settings,
    color_tree: bool,
    pipe: W,
    span: &Span,
) -> Result<Analysis> {
    let root = settings.root()?.to_path_buf();
    let engine = settings.identifier_engine()?;
    let measures = settings.measures();

    let mut walker =
        TreeWalker::new(settings.walker_config(), engine.clone()).with_span(span.clone());
    if let Some(filter) = settings.name_filter(span) {
        walker = walker.with_filter(filter);
    }

    let mut measure_aggregator = MeasureAggregator::new(&measures).with_span(span.clone());
    let mut configuration_aggregator = settings.configurations.get_configurations.then(|| {
        ConfigurationAggregator::new(engine, settings.depth_selection()).with_span(span.clone())
    });
    let mut formatter = settings.output.create_text_tree.then(|| {
        let config = OutputConfig {
            use_color: color_tree,
            measures: measures.clone(),
            ..Default::default()
        };
        let buffer = if color_tree {
            Buffer::ansi()
        } else {
            Buffer::no_color()
        };
        TreeFormatter::new(config, buffer)
    });
    let mut pipe = settings
        .pipeline
        .pipe_data
        .then(|| PipeWriter::new(pipe).with_span(span.clone()));
    let mut kept: Option<Vec<Rc<PathNode>>> = settings.output.create_json.then(Vec::new);

    info!(parent: span, "checking {}", root.display());
    let mut node_count = 0;
    for node in walker.walk(&root)? {
        node_count += 1;
        measure_aggregator.record(&node)?;
        if let Some(aggregator) = configuration_aggregator.as_mut() {
            aggregator.record(&node)?;
        }
        if let Some(pipe) = pipe.as_mut() {
            pipe.write_node(&node)?;
        }
        if let Some(formatter) = formatter.as_mut() {
            formatter.write_node(&node, measure_aggregator.snapshot())?;
        }
        if let Some(kept) = kept.as_mut() {
            kept.push(node);
        }
    }

    let configurations = configuration_aggregator.map(|a| a.into_configurations());
    info!(
        parent: span,
        "visited {} nodes, {} identifiers measured, {} directory identifiers with configurations",
        node_count,
        measure_aggregator.snapshot().identifier_count(),
        configurations.as_ref().map_or(0, |c| c.len())
    );

    Ok(Analysis {
        root,
        measures: measure_aggregator.finalize(),
        configurations,
        text_tree: formatter.map(|f| f.finish()).transpose()?,
        tree: kept.and_then(TreeNode::build),
        node_count,
    })
}

impl Analysis {
    /// Write every requested report. Reports without a configured path go to
    /// stdout.
    pub fn write_reports(
        &self,
        settings: &Settings,
        color: ColorChoice,
        span: &Span,
    ) -> Result<()> {
        let output = &settings.output;

        if let Some(tree) = &self.text_tree {
            match &output.tree_path {
                Some(path) => write_file(path, tree.as_slice())?,
                None => BufferWriter::stdout(color).print(tree)?,
            }
        }

        if output.create_summary {
            let mut summary =
                SummaryWriter::new(&self.measures).with_tolerance(settings.tolerance());
            if let Some(configurations) = &self.configurations {
                summary = summary.with_configurations(configurations);
            }
            let text = summary.render(&self.root, Local::now());
            emit(output.summary_path.as_deref(), text.as_bytes())?;
        }

        if output.create_csv {
            let mut bytes = Vec::new();
            let rows = write_csv(&self.measures, &mut bytes)?;
            info!(parent: span, "CSV holds {} rows", rows);
            emit(output.csv_path.as_deref(), &bytes)?;
        }

        if output.create_json {
            let mut report = Report::new(&self.root, &self.measures);
            if let Some(configurations) = &self.configurations {
                report = report.with_configurations(configurations);
            }
            if let Some(tree) = &self.tree {
                report = report.with_tree(tree);
            }
            let mut text = report.to_json()?;
            text.push('\n');
            emit(output.json_path.as_deref(), text.as_bytes())?;
        }

        if settings.visualization.create_histograms {
            let text = render_histograms(&self.measures, settings.histogram_options());
            emit(None, text.as_bytes())?;
        }
        Ok(())
    }
}

fn emit(path: Option<&Path>, bytes: &[u8]) -> io::Result<()> {
    match path {
        Some(path) => write_file(path, bytes),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)
}
