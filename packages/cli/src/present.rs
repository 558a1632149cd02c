//! Text renderings of a summary set for each execution context.

use covid_widget_summary_models::{CaseSummary, GeoLevel};

use crate::pipeline::PipelineOutcome;

/// Where the output is going to be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExecutionContext {
    /// Compact home-screen widget lines
    #[default]
    Widget,
    /// In-app table, one block per area
    Table,
    /// Single spoken sentence
    Voice,
}

/// Message shown when neither live nor cached data exists.
pub const UNAVAILABLE_MESSAGE: &str = "Case data is unavailable right now.";

/// Renders `outcome` for `context`.
#[must_use]
pub fn render(context: ExecutionContext, outcome: &PipelineOutcome) -> String {
    let Some(summaries) = outcome.summaries().filter(|s| !s.is_empty()) else {
        return UNAVAILABLE_MESSAGE.to_string();
    };
    let cached = matches!(outcome, PipelineOutcome::Cached { .. });

    match context {
        ExecutionContext::Widget => render_widget(summaries, cached),
        ExecutionContext::Table => render_table(summaries, cached),
        ExecutionContext::Voice => render_voice(summaries),
    }
}

fn render_widget(summaries: &[CaseSummary], cached: bool) -> String {
    let mut lines = Vec::with_capacity(summaries.len() * 2 + 1);
    for summary in summaries {
        lines.push(summary.long_label.clone());
        lines.push(format!(
            "  {} {} new",
            summary.trend_direction.arrow(),
            format_number(summary.new_cases)
        ));
    }
    if let Some(updated) = last_updated(summaries) {
        let suffix = if cached { " (cached)" } else { "" };
        lines.push(format!("Updated {updated}{suffix}"));
    }
    lines.join("\n")
}

fn render_table(summaries: &[CaseSummary], cached: bool) -> String {
    let rows: Vec<(String, String)> = summaries
        .iter()
        .flat_map(|summary| {
            let header = match summary.level {
                GeoLevel::Country => "Country-wide".to_string(),
                GeoLevel::SubRegion | GeoLevel::Region => summary.long_label.clone(),
            };
            let mut block = vec![
                (format!("[{header}]"), String::new()),
                ("New cases".to_string(), format_number(summary.new_cases)),
                ("Total cases".to_string(), format_number(summary.total_cases)),
            ];
            if let Some(active) = summary.active_cases {
                block.push(("Active cases".to_string(), format_signed(active)));
            }
            block
        })
        .chain(last_updated(summaries).map(|updated| {
            let label = if cached {
                "Last Updated (cached)"
            } else {
                "Last Updated"
            };
            (label.to_string(), updated)
        }))
        .collect();

    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| {
            if value.is_empty() {
                label.clone()
            } else {
                format!("{label:<width$}  {value:>12}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_voice(summaries: &[CaseSummary]) -> String {
    let find = |level: GeoLevel| summaries.iter().find(|s| s.level == level);

    match (find(GeoLevel::SubRegion), find(GeoLevel::Region)) {
        (Some(hr), Some(pt)) => format!(
            "There are {} new cases in your health region {} and {} new cases in {} today.",
            format_number(hr.new_cases),
            hr.long_label,
            format_number(pt.new_cases),
            pt.long_label
        ),
        (None, Some(area)) | (Some(area), None) => format!(
            "There are {} new cases in {} today.",
            format_number(area.new_cases),
            area.long_label
        ),
        (None, None) => summaries.first().map_or_else(
            || UNAVAILABLE_MESSAGE.to_string(),
            |area| {
                format!(
                    "There are {} new cases in {} today.",
                    format_number(area.new_cases),
                    area.long_label
                )
            },
        ),
    }
}

/// Timestamp of the country summary, falling back to the first summary.
fn last_updated(summaries: &[CaseSummary]) -> Option<String> {
    summaries
        .iter()
        .find(|s| s.level == GeoLevel::Country)
        .or_else(|| summaries.first())
        .map(|s| s.last_updated.format("%Y-%m-%d %H:%M %:z").to_string())
}

/// Formats a count with comma thousands separators.
#[must_use]
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn format_signed(n: i64) -> String {
    let formatted = format_number(n.unsigned_abs());
    if n < 0 { format!("-{formatted}") } else { formatted }
}
