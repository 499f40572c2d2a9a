//! Text histograms of measure distributions

use std::fmt::Write as _;

use crate::stats::{Measure, MeasureRecord};

const BAR_WIDTH: usize = 40;

/// Histogram layout options.
#[derive(Debug, Clone, Copy)]
pub struct HistogramOptions {
    /// Identifiers shown per measure, most data points first.
    pub per_measure: usize,
    pub bins: usize,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        Self {
            per_measure: 8,
            bins: 20,
        }
    }
}

/// Equal-width bin counts over `values`, with the lower edge of each bin.
fn bin(values: &[i64], bins: usize) -> Vec<(f64, usize)> {
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return Vec::new();
    };
    let bins = bins.max(1);
    let width = if max == min {
        1.0
    } else {
        (max - min) as f64 / bins as f64
    };
    let mut counts = vec![0usize; bins];
    for &v in values {
        let index = (((v - min) as f64) / width) as usize;
        counts[index.min(bins - 1)] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, n)| (min as f64 + i as f64 * width, n))
        .collect()
}

/// Render histograms for every measure in the record.
pub fn render_histograms(record: &MeasureRecord, options: HistogramOptions) -> String {
    let mut output = String::new();
    for measure in &record.measures {
        render_measure(&mut output, record, *measure, options);
    }
    output
}

fn render_measure(
    output: &mut String,
    record: &MeasureRecord,
    measure: Measure,
    options: HistogramOptions,
) {
    let Some(identifiers) = record.get(measure) else {
        return;
    };
    let _ = writeln!(output, "== {} ==", measure);

    let mut sorted: Vec<_> = identifiers.iter().collect();
    sorted.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let shown = sorted
        .into_iter()
        .filter(|(_, paths)| paths.values().any(|v| v.is_some_and(|v| v != 0)))
        .take(options.per_measure);

    for (identifier, paths) in shown {
        let values: Vec<i64> = paths.values().flatten().copied().collect();
        let _ = writeln!(output, "{} ({} values)", identifier, values.len());

        let bins = bin(&values, options.bins);
        let tallest = bins.iter().map(|(_, n)| *n).max().unwrap_or(0).max(1);
        for (edge, count) in bins {
            let bar = "#".repeat(count * BAR_WIDTH / tallest);
            let _ = writeln!(
                output,
                "  {:>14.1} | {:<width$} {}",
                edge,
                bar,
                count,
                width = BAR_WIDTH
            );
        }
        output.push('\n');
    }
}
