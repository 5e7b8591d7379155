// File export — CSV tables and markdown summary reports.
//
// CSV gets the same table the terminal shows, unrounded, so downstream
// spreadsheet work starts from full-precision values.

use std::path::Path;

use anyhow::{Context, Result};

use crate::compare::ComparisonView;
use crate::pipeline::AnalysisResult;

/// Render a comparison view as CSV, groups as columns.
pub fn comparison_to_csv(view: &ComparisonView) -> String {
    let mut out = String::new();

    match view {
        ComparisonView::Prevalence { groups, rows } => {
            push_row(
                &mut out,
                std::iter::once("theme").chain(groups.iter().map(String::as_str)),
            );
            for row in rows {
                let values: Vec<String> = row.values.iter().map(|v| v.to_string()).collect();
                push_row(
                    &mut out,
                    std::iter::once(row.theme_name.as_str())
                        .chain(values.iter().map(String::as_str)),
                );
            }
        }

        ComparisonView::Distribution { groups, rows, .. } => {
            push_row(
                &mut out,
                std::iter::once("question").chain(groups.iter().map(String::as_str)),
            );
            for row in rows {
                let counts: Vec<String> = row.counts.iter().map(|c| c.to_string()).collect();
                push_row(
                    &mut out,
                    std::iter::once(row.question_text.as_str())
                        .chain(counts.iter().map(String::as_str)),
                );
            }
        }

        ComparisonView::ResponseLength { groups, rows } => {
            let mut header = vec!["theme".to_string()];
            for group in groups {
                header.push(format!("{group}_matched"));
                header.push(format!("{group}_mean"));
                header.push(format!("{group}_variance"));
            }
            push_row(&mut out, header.iter().map(String::as_str));
            for row in rows {
                let mut fields = vec![row.theme_name.clone()];
                for stats in &row.stats {
                    fields.push(stats.matched.to_string());
                    fields.push(stats.mean.to_string());
                    fields.push(stats.variance.to_string());
                }
                push_row(&mut out, fields.iter().map(String::as_str));
            }
        }
    }

    out
}

/// Write a comparison view to a CSV file.
pub fn write_comparison_csv(view: &ComparisonView, path: &Path) -> Result<()> {
    std::fs::write(path, comparison_to_csv(view))
        .with_context(|| format!("Failed to write CSV to {}", path.display()))?;
    Ok(())
}

/// Render a markdown summary of one analysis run: parameters, groups,
/// and the taxonomy with its keywords.
pub fn summary_markdown(title: &str, result: &AnalysisResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {title}\n\n"));
    out.push_str(&format!(
        "Generated: {}\n\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    ));
    out.push_str(&format!(
        "- Extraction method: {}\n- Minimum theme frequency: {}\n- Requested themes: {}\n- Records: {}\n\n",
        result.params.extraction_method,
        result.params.min_theme_freq,
        result.params.num_themes,
        result.total_records(),
    ));

    out.push_str("## Groups\n\n");
    out.push_str("| Group | Records |\n|---|---|\n");
    for group in &result.groups {
        out.push_str(&format!("| {} | {} |\n", group.group, group.len()));
    }
    out.push('\n');

    out.push_str("## Themes\n\n");
    if result.taxonomy.is_empty() {
        out.push_str("No themes met the frequency threshold.\n");
    } else {
        out.push_str("| Theme | Keywords |\n|---|---|\n");
        for theme in result.taxonomy.themes() {
            out.push_str(&format!(
                "| {} | {} |\n",
                theme.name,
                theme.keywords.join(", ")
            ));
        }
    }

    out
}

/// Write the markdown summary to a file.
pub fn write_summary_report(title: &str, result: &AnalysisResult, path: &Path) -> Result<()> {
    std::fs::write(path, summary_markdown(title, result))
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(())
}

fn push_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let escaped: Vec<String> = fields.map(csv_field).collect();
    out.push_str(&escaped.join(","));
    out.push('\n');
}

/// Quote a field when it contains a comma, quote, or newline.
fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
