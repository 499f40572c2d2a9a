//! Run settings
//!
//! Settings come from an optional TOML file whose sections mirror the
//! command line. Every section and key has a default, so a partial file (or
//! none at all) is valid. The binary applies its flags on top of the loaded
//! value before calling [`Settings::validate`].

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use tracing::Span;
use tracing_subscriber::filter::LevelFilter;

use crate::configurations::DepthSelection;
use crate::error::{CheckError, Result};
use crate::identifier::{DEFAULT_DIRECTORY_EXPRESSION, DEFAULT_FILE_EXPRESSION, IdentifierEngine};
use crate::output::{HistogramOptions, Tolerance};
use crate::stats::Measure;
use crate::tree::{NameFilter, WalkerConfig};

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "treecheck.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub input: InputSettings,
    pub categorization: CategorizationSettings,
    pub search_criteria: SearchSettings,
    pub filter: FilterSettings,
    pub measures: MeasureSettings,
    pub measures_averaging: AveragingSettings,
    pub configurations: ConfigurationSettings,
    pub output: OutputSettings,
    pub visualization: VisualizationSettings,
    pub pipeline: PipelineSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputSettings {
    pub root_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategorizationSettings {
    pub file_expression: String,
    pub directory_expression: String,
    /// Paths that are neither a file nor a directory are errors when set;
    /// otherwise they are identified as files.
    pub check_file: bool,
    pub prefix_with_parent: bool,
}

impl Default for CategorizationSettings {
    fn default() -> Self {
        Self {
            file_expression: DEFAULT_FILE_EXPRESSION.to_string(),
            directory_expression: DEFAULT_DIRECTORY_EXPRESSION.to_string(),
            check_file: true,
            prefix_with_parent: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchSettings {
    pub use_search_criteria: bool,
    pub expression: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSettings {
    pub filter_files: bool,
    pub filter_directories: bool,
    pub filter_hidden: bool,
    pub ignore_list: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeasureSettings {
    pub file_count: bool,
    pub dir_count: bool,
    pub file_size: bool,
    pub modified_time: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AveragingSettings {
    pub size_rounding_percentage: f64,
    pub time_rounding_seconds: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigurationSettings {
    pub get_configurations: bool,
    pub target_depth: Option<usize>,
    pub use_depth_range: bool,
    pub range_start: Option<usize>,
    pub range_end: Option<usize>,
    pub limit_depth: bool,
    pub depth_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    pub create_summary: bool,
    pub summary_path: Option<PathBuf>,
    pub create_text_tree: bool,
    pub tree_path: Option<PathBuf>,
    pub create_csv: bool,
    pub csv_path: Option<PathBuf>,
    pub create_json: bool,
    pub json_path: Option<PathBuf>,
}

impl OutputSettings {
    /// Fill every unset output path with its default file name under `dir`.
    pub fn place_in(&mut self, dir: &Path) {
        for (slot, name) in [
            (&mut self.summary_path, "summary.txt"),
            (&mut self.tree_path, "tree.txt"),
            (&mut self.csv_path, "measures.csv"),
            (&mut self.json_path, "report.json"),
        ] {
            if slot.is_none() {
                *slot = Some(dir.join(name));
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisualizationSettings {
    pub create_histograms: bool,
    pub histograms_per_measure: usize,
    pub histogram_bins: usize,
}

impl Default for VisualizationSettings {
    fn default() -> Self {
        let options = HistogramOptions::default();
        Self {
            create_histograms: false,
            histograms_per_measure: options.per_measure,
            histogram_bins: options.bins,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSettings {
    pub pipe_data: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Level for the log file.
    pub log_level: String,
    pub log_path: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_path: None,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load settings from `path`. Without a path, [`DEFAULT_SETTINGS_FILE`]
    /// in the working directory is used when it exists, and built-in
    /// defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_SETTINGS_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let text = fs::read_to_string(&path).map_err(|e| {
            CheckError::Config(format!("cannot read settings '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Check everything that must hold before a traversal starts.
    pub fn validate(&self) -> Result<()> {
        let root = self.root()?;
        if !root.is_dir() {
            return Err(CheckError::Config(format!(
                "root '{}' is not an existing directory",
                root.display()
            )));
        }

        self.identifier_engine()?;

        if let Some((start, end)) = self.depth_range() {
            if start > end {
                return Err(CheckError::Config(format!(
                    "depth range start {} is greater than its end {}",
                    start, end
                )));
            }
        } else if self.configurations.use_depth_range {
            return Err(CheckError::Config(
                "depth range enabled without both range_start and range_end".to_string(),
            ));
        }

        if self.configurations.limit_depth && self.configurations.depth_limit.is_none() {
            return Err(CheckError::Config(
                "limit_depth is set but depth_limit is missing".to_string(),
            ));
        }

        if !self.measures_averaging.size_rounding_percentage.is_finite()
            || self.measures_averaging.size_rounding_percentage < 0.0
        {
            return Err(CheckError::Config(
                "size_rounding_percentage must be a non-negative number".to_string(),
            ));
        }

        self.log_level()?;
        Ok(())
    }

    pub fn root(&self) -> Result<&Path> {
        self.input
            .root_path
            .as_deref()
            .ok_or_else(|| CheckError::Config("no root directory given".to_string()))
    }

    pub fn identifier_engine(&self) -> Result<IdentifierEngine> {
        let c = &self.categorization;
        Ok(IdentifierEngine::new(&c.file_expression, &c.directory_expression, !c.check_file)?
            .with_parent_prefix(c.prefix_with_parent))
    }

    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            filter_hidden: self.filter.filter_hidden,
            ignore_patterns: self.filter.ignore_list.clone(),
            depth_limit: self
                .configurations
                .depth_limit
                .filter(|_| self.configurations.limit_depth),
        }
    }

    /// Search criteria, if enabled. An invalid expression is reported on
    /// `span` and leaves the traversal unfiltered.
    pub fn name_filter(&self, span: &Span) -> Option<NameFilter> {
        if !self.search_criteria.use_search_criteria {
            return None;
        }
        NameFilter::compile(
            &self.search_criteria.expression,
            self.filter.filter_files,
            self.filter.filter_directories,
            span,
        )
    }

    fn depth_range(&self) -> Option<(usize, usize)> {
        self.configurations
            .range_start
            .zip(self.configurations.range_end)
    }

    pub fn depth_selection(&self) -> DepthSelection {
        DepthSelection::resolve(
            self.configurations.target_depth,
            self.configurations.use_depth_range,
            self.depth_range(),
        )
    }

    /// Requested measures in canonical order.
    pub fn measures(&self) -> Vec<Measure> {
        let m = &self.measures;
        [
            (m.file_count, Measure::FileCount),
            (m.dir_count, Measure::DirCount),
            (m.file_size, Measure::FileSize),
            (m.modified_time, Measure::ModifiedTime),
        ]
        .into_iter()
        .filter_map(|(enabled, measure)| enabled.then_some(measure))
        .collect()
    }

    pub fn tolerance(&self) -> Tolerance {
        Tolerance {
            size_percentage: self.measures_averaging.size_rounding_percentage,
            time_seconds: self.measures_averaging.time_rounding_seconds as i64,
        }
    }

    pub fn histogram_options(&self) -> HistogramOptions {
        HistogramOptions {
            per_measure: self.visualization.histograms_per_measure,
            bins: self.visualization.histogram_bins,
        }
    }

    pub fn log_level(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.logging.log_level).map_err(|_| {
            CheckError::Config(format!("unknown log level '{}'", self.logging.log_level))
        })
    }
}
