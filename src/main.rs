//! CLI entry point for treecheck

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use termcolor::ColorChoice;
use tracing::info_span;
use treecheck::{LogOptions, Result, Settings, Verbosity, build_subscriber, run_check};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether a stream gets color, based on mode and environment.
fn should_use_color(mode: ColorMode, is_terminal: bool) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // https://no-color.org/
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            is_terminal
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "treecheck")]
#[command(about = "Compare the structure of repeating, templated directory trees")]
#[command(version)]
struct Args {
    /// Root directory of the dataset
    #[arg(value_name = "ROOT", conflicts_with = "root")]
    path: Option<PathBuf>,

    /// Root directory of the dataset (same as the positional argument)
    #[arg(long = "root", value_name = "ROOT")]
    root: Option<PathBuf>,

    /// Settings file (default: ./treecheck.toml when present)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Apply the search expression to files
    #[arg(long = "filter-files")]
    filter_files: bool,

    /// Apply the search expression to directories
    #[arg(long = "filter-directories")]
    filter_directories: bool,

    /// Skip entries whose name starts with '.'
    #[arg(long = "filter-hidden")]
    filter_hidden: bool,

    /// Skip entries matching NAME, exactly or as a glob (can be used multiple times)
    #[arg(short = 'I', long = "ignore", value_name = "NAME")]
    ignore: Vec<String>,

    /// Keep only entries whose name starts with a match of REGEX
    #[arg(long = "search", value_name = "REGEX")]
    search: Option<String>,

    /// Measure the number of files directly under each directory
    #[arg(long = "file-count")]
    file_count: bool,

    /// Measure the number of directories directly under each directory
    #[arg(long = "dir-count")]
    dir_count: bool,

    /// Measure file sizes (mean of immediate files for directories)
    #[arg(long = "file-size")]
    file_size: bool,

    /// Measure modification times
    #[arg(long = "modified-time")]
    modified_time: bool,

    /// Sizes within PCT percent of the most common size are not outliers
    #[arg(long = "size-rounding", value_name = "PCT")]
    size_rounding: Option<f64>,

    /// Times within DURATION of the most common time are not outliers
    /// Duration format: 30s, 5m, 1h, 7d
    #[arg(long = "time-round", value_name = "DURATION", value_parser = parse_duration_string)]
    time_round: Option<Duration>,

    /// Write the summary of configurations and outliers
    #[arg(long = "summary")]
    summary: bool,

    /// Write the text tree
    #[arg(long = "tree")]
    tree: bool,

    /// Write the CSV of all measures
    #[arg(long = "csv")]
    csv: bool,

    /// Write the JSON report
    #[arg(long = "json")]
    json: bool,

    /// Directory for report files (default: print to stdout)
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    output: Option<PathBuf>,

    /// Print text histograms of every measure
    #[arg(long = "histograms")]
    histograms: bool,

    /// Print `path,identifier,file_size,modified_time` for every file
    #[arg(long = "pipe-data")]
    pipe_data: bool,

    /// Group directories by the identifiers they contain
    #[arg(long = "get-configurations")]
    get_configurations: bool,

    /// Only compare configurations of directories at depth N
    #[arg(long = "target-depth", value_name = "N")]
    target_depth: Option<usize>,

    /// Only compare configurations of directories between two depths (inclusive)
    #[arg(long = "depth-range", num_args = 2, value_names = ["START", "END"])]
    depth_range: Option<Vec<usize>>,

    /// Do not descend below depth N
    #[arg(short = 'L', long = "depth-limit", value_name = "N")]
    depth_limit: Option<usize>,

    /// Also write log messages to FILE
    #[arg(long = "log", value_name = "FILE")]
    log: Option<PathBuf>,

    /// Level for the log file: error, warn, info, debug, trace
    #[arg(long = "log-level", value_name = "LEVEL")]
    log_level: Option<String>,

    /// Show progress messages
    #[arg(short = 'v', long = "verbose", conflicts_with = "debug")]
    verbose: bool,

    /// Show debug messages
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,
}

/// Parse a duration string like "90s", "5m", "1h" with humantime.
fn parse_duration_string(s: &str) -> std::result::Result<Duration, String> {
    humantime::parse_duration(s.trim()).map_err(|e| e.to_string())
}

impl Args {
    /// Layer the command line over settings loaded from file. Flags only ever
    /// switch things on; values replace what the file had.
    fn apply(&self, settings: &mut Settings) {
        if let Some(root) = self.path.as_ref().or(self.root.as_ref()) {
            settings.input.root_path = Some(root.clone());
        }

        let filter = &mut settings.filter;
        filter.filter_files |= self.filter_files;
        filter.filter_directories |= self.filter_directories;
        filter.filter_hidden |= self.filter_hidden;
        filter.ignore_list.extend(self.ignore.iter().cloned());

        if let Some(expression) = &self.search {
            settings.search_criteria.use_search_criteria = true;
            settings.search_criteria.expression = expression.clone();
            // a bare --search applies to both kinds
            if !settings.filter.filter_files && !settings.filter.filter_directories {
                settings.filter.filter_files = true;
                settings.filter.filter_directories = true;
            }
        }

        let measures = &mut settings.measures;
        measures.file_count |= self.file_count;
        measures.dir_count |= self.dir_count;
        measures.file_size |= self.file_size;
        measures.modified_time |= self.modified_time;

        if let Some(pct) = self.size_rounding {
            settings.measures_averaging.size_rounding_percentage = pct;
        }
        if let Some(duration) = self.time_round {
            settings.measures_averaging.time_rounding_seconds = duration.as_secs();
        }

        let output = &mut settings.output;
        output.create_summary |= self.summary;
        output.create_text_tree |= self.tree;
        output.create_csv |= self.csv;
        output.create_json |= self.json;
        if let Some(dir) = &self.output {
            output.place_in(dir);
        }
        settings.visualization.create_histograms |= self.histograms;
        settings.pipeline.pipe_data |= self.pipe_data;

        let configurations = &mut settings.configurations;
        configurations.get_configurations |= self.get_configurations;
        if let Some(depth) = self.target_depth {
            configurations.target_depth = Some(depth);
        }
        if let Some(&[start, end]) = self.depth_range.as_deref() {
            configurations.use_depth_range = true;
            configurations.range_start = Some(start);
            configurations.range_end = Some(end);
        }
        if let Some(limit) = self.depth_limit {
            configurations.limit_depth = true;
            configurations.depth_limit = Some(limit);
        }

        if let Some(path) = &self.log {
            settings.logging.log_path = Some(path.clone());
        }
        if let Some(level) = &self.log_level {
            settings.logging.log_level = level.clone();
        }
    }

    fn verbosity(&self) -> Verbosity {
        match (self.verbose, self.debug) {
            (_, true) => Verbosity::Debug,
            (true, false) => Verbosity::Verbose,
            (false, false) => Verbosity::Quiet,
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);
    settings.validate()?;

    let log_options = LogOptions {
        verbosity: args.verbosity(),
        ansi: should_use_color(args.color, io::stderr().is_terminal()),
        file: settings.logging.log_path.clone(),
        file_level: settings.log_level()?,
    };
    let subscriber = build_subscriber(&log_options)?;

    let stdout_color = should_use_color(args.color, io::stdout().is_terminal());
    let color_tree = stdout_color && settings.output.tree_path.is_none();
    let choice = if stdout_color {
        ColorChoice::Always
    } else {
        ColorChoice::Never
    };

    tracing::subscriber::with_default(subscriber, || {
        let root = settings.root()?.display().to_string();
        let span = info_span!("check", root = %root);
        let analysis = run_check(&settings, color_tree, io::stdout(), &span)?;
        analysis.write_reports(&settings, choice, &span)
    })
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("treecheck: {}", e);
        process::exit(1);
    }
}
