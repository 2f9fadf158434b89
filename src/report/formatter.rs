use crate::model::Cohort;
use crate::projection::{BlendedSummary, ProjectionResult};
use itertools::Itertools;

const HEADERS: [&str; 7] = [
    "Cohort",
    "Volume",
    "Current Conv.",
    "Projected Conv.",
    "Lift",
    "Current Paid",
    "Projected Paid",
];

/// Formats projection results as a plain-text summary table.
pub struct SummaryFormatter;

impl SummaryFormatter {
    /// One row per cohort that still exists, followed by a blended footer row.
    pub fn format(
        results: &[ProjectionResult],
        cohorts: &[Cohort],
        blended: &BlendedSummary,
    ) -> String {
        let mut rows: Vec<[String; 7]> = results
            .iter()
            .filter_map(|r| {
                let cohort = cohorts.iter().find(|c| c.id == r.cohort_id)?;
                Some([
                    cohort.name.clone(),
                    Self::format_count(cohort.total_entry_volume()),
                    Self::format_ratio(r.baseline_conversion),
                    Self::format_ratio(r.projected_conversion),
                    Self::format_delta(r.delta),
                    Self::format_count(r.baseline_paid),
                    Self::format_count(r.projected_paid),
                ])
            })
            .collect();

        let total_volume: f64 = cohorts.iter().map(Cohort::total_entry_volume).sum();
        rows.push([
            "Blended".to_string(),
            Self::format_count(total_volume),
            Self::format_ratio(blended.baseline_conversion),
            Self::format_ratio(blended.projected_conversion),
            Self::format_delta(blended.delta),
            Self::format_count(blended.total_base_paid),
            Self::format_count(blended.total_proj_paid),
        ]);

        let mut widths = HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        let render = |cells: &[String]| {
            cells
                .iter()
                .zip(widths)
                .enumerate()
                .map(|(i, (cell, w))| {
                    if i == 0 {
                        format!("{:<w$}", cell)
                    } else {
                        format!("{:>w$}", cell)
                    }
                })
                .join("  ")
        };

        let header = render(&HEADERS.map(str::to_string));
        let rule = "-".repeat(header.len());
        let footer = rows.pop().map(|row| render(&row)).unwrap_or_default();

        let mut lines = vec![header, rule.clone()];
        lines.extend(rows.iter().map(|row| render(row)));
        lines.push(rule);
        lines.push(footer);
        lines.join("\n")
    }

    /// A fraction as a percentage with two decimals, e.g. `0.2` -> `20.00%`.
    pub fn format_ratio(ratio: f64) -> String {
        format!("{:.2}%", ratio * 100.0)
    }

    /// A conversion change in percentage points; zero renders as `--`.
    pub fn format_delta(delta: f64) -> String {
        if delta == 0.0 {
            "--".to_string()
        } else {
            format!("{:+.2}pp", delta * 100.0)
        }
    }

    /// A customer count rounded to the nearest whole number.
    pub fn format_count(count: f64) -> String {
        format!("{}", count.round() as i64)
    }
}
