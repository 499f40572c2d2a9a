//! Textual summary of configurations and measure outliers

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::configurations::ConfigurationSet;
use crate::stats::{Measure, MeasureRecord};

use super::utils::display_value;

/// How far a value may be from the most common one and still count as
/// matching it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tolerance {
    /// Percentage of the mode, applied to `file_size`.
    pub size_percentage: f64,
    /// Absolute seconds, applied to `modified_time`.
    pub time_seconds: i64,
}

impl Tolerance {
    pub fn matches(&self, measure: Measure, mode: i64, value: i64) -> bool {
        let distance = (value - mode).unsigned_abs();
        match measure {
            Measure::FileSize => {
                distance as f64 <= mode.unsigned_abs() as f64 * self.size_percentage / 100.0
            }
            Measure::ModifiedTime => distance <= self.time_seconds.unsigned_abs(),
            Measure::FileCount | Measure::DirCount => distance == 0,
        }
    }
}

/// Most common value in a path map and its number of occurrences. Ties go
/// to the value of the first path in sorted path order.
fn mode(values: &BTreeMap<PathBuf, Option<i64>>) -> Option<(Option<i64>, usize)> {
    let mut counts: Vec<(Option<i64>, usize)> = Vec::new();
    for value in values.values() {
        match counts.iter_mut().find(|(v, _)| v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((*value, 1)),
        }
    }
    counts
        .into_iter()
        .fold(None, |best, (v, n)| match best {
            Some((_, best_n)) if best_n >= n => best,
            _ => Some((v, n)),
        })
}

/// Builds the summary text.
pub struct SummaryWriter<'a> {
    record: &'a MeasureRecord,
    configurations: Option<&'a ConfigurationSet>,
    tolerance: Tolerance,
}

impl<'a> SummaryWriter<'a> {
    pub fn new(record: &'a MeasureRecord) -> Self {
        Self {
            record,
            configurations: None,
            tolerance: Tolerance::default(),
        }
    }

    pub fn with_configurations(mut self, configurations: &'a ConfigurationSet) -> Self {
        self.configurations = Some(configurations);
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn render(&self, root: &Path, now: DateTime<Local>) -> String {
        let root_name = root
            .file_name()
            .map_or_else(|| root.to_string_lossy(), |n| n.to_string_lossy());
        let mut output = String::new();
        let _ = write!(
            output,
            "***** Analysis of file structure at : '{}' *****\nCreated: {}\nTarget directory : {}\n\n",
            root_name,
            now.format("%a %b %e %H:%M:%S %Y"),
            root.display()
        );

        if let Some(configurations) = self.configurations {
            self.render_configurations(&mut output, configurations);
        }
        for measure in &self.record.measures {
            self.render_measure(&mut output, *measure);
        }
        output
    }

    fn render_configurations(&self, output: &mut String, configurations: &ConfigurationSet) {
        for (identifier, list) in configurations {
            let _ = write!(output, "\nConfigurations for directory **{}**:", identifier);
            let mut sorted: Vec<_> = list.iter().collect();
            // stable, so equal counts keep discovery order
            sorted.sort_by(|a, b| b.paths.len().cmp(&a.paths.len()));
            for (i, configuration) in sorted.iter().enumerate() {
                let _ = write!(
                    output,
                    "\n     Configuration #{} was found in {} directories. Contains the following : \n            {:?}",
                    i + 1,
                    configuration.paths.len(),
                    configuration.structure
                );
            }
        }
    }

    fn render_measure(&self, output: &mut String, measure: Measure) {
        let _ = write!(output, "\n\nOccurrences for measure  :     **{}**\n", measure);
        let Some(identifiers) = self.record.get(measure) else {
            return;
        };

        let mut sorted: Vec<_> = identifiers.iter().collect();
        sorted.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

        for (identifier, paths) in sorted {
            let Some((Some(mode_value), _)) = mode(paths) else {
                continue;
            };
            let matching = |value: &Option<i64>| {
                value.is_some_and(|v| self.tolerance.matches(measure, mode_value, v))
            };
            let found = paths.values().filter(|v| matching(v)).count();

            let _ = write!(
                output,
                "    In '{}' :\n        {} of {} found {} times\n",
                identifier, measure, mode_value, found
            );
            if found < paths.len() {
                output.push_str("          Outliers :\n");
                for (path, value) in paths {
                    if !matching(value) {
                        let _ = writeln!(
                            output,
                            "            {}  has : {}",
                            path.display(),
                            display_value(*value)
                        );
                    }
                }
            }
        }
    }
}
