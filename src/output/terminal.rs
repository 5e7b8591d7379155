// Colored terminal output for taxonomies, comparison views, and project
// lists.
//
// This module handles all terminal-specific formatting: colors, tables,
// alignment. The main.rs command handlers delegate here.

use colored::Colorize;

use crate::compare::ComparisonView;
use crate::db::models::ProjectSummary;
use crate::themes::taxonomy::Taxonomy;

const QUESTION_PREVIEW: usize = 50;

/// Display the discovered taxonomy.
pub fn display_taxonomy(taxonomy: &Taxonomy) {
    if taxonomy.is_empty() {
        println!(
            "No themes found. Try lowering --min-freq or using a different extraction method."
        );
        return;
    }

    println!(
        "\n{}",
        format!(
            "=== Themes ({}, {} via {}) ===",
            taxonomy.len(),
            plural(taxonomy.record_count as usize, "record"),
            taxonomy.method
        )
        .bold()
    );
    println!();

    for (i, theme) in taxonomy.themes().iter().enumerate() {
        println!("  {:>3}. {}", i + 1, theme.name.cyan().bold());
        println!("       {}", theme.keywords.join(", ").dimmed());
    }
    println!();
}

/// Display a comparison view as an aligned table, groups as columns.
pub fn display_comparison(view: &ComparisonView) {
    match view {
        ComparisonView::Prevalence { groups, rows } => {
            println!("\n{}", "=== Theme Prevalence ===".bold());
            print_group_header("Theme", groups);

            for row in rows {
                print!("  {:<32}", truncate_label(&row.theme_name));
                for v in &row.values {
                    print!(" {:>10}", colorize_prevalence(*v));
                }
                println!();
            }
            println!();
        }

        ComparisonView::Distribution {
            theme_name,
            groups,
            rows,
        } => {
            println!(
                "\n{}",
                format!("=== Question Distribution: {theme_name} ===").bold()
            );
            if rows.is_empty() {
                println!("  No questions matched this theme in any group.\n");
                return;
            }
            print_group_header("Question", groups);

            for row in rows {
                let preview = super::truncate_chars(&row.question_text, QUESTION_PREVIEW);
                print!("  {:<32}", truncate_label(&preview));
                for count in &row.counts {
                    if *count == 0 {
                        print!(" {:>10}", "-".dimmed());
                    } else {
                        print!(" {count:>10}");
                    }
                }
                println!();
            }
            println!();
        }

        ComparisonView::ResponseLength { groups, rows } => {
            println!("\n{}", "=== Response Length (chars) ===".bold());
            print_group_header("Theme", groups);

            for row in rows {
                print!("  {:<32}", truncate_label(&row.theme_name));
                for stats in &row.stats {
                    if stats.matched == 0 {
                        print!(" {:>10}", "-".dimmed());
                    } else {
                        print!(" {:>10}", format!("{:.0}±{:.0}", stats.mean, stats.variance.sqrt()));
                    }
                }
                println!();
            }
            println!("  {}", "mean ± std dev over matching responses".dimmed());
            println!();
        }
    }
}

/// Display the saved project list.
pub fn display_projects(projects: &[ProjectSummary], current: Option<i64>) {
    if projects.is_empty() {
        println!("No saved projects. Run `weft process` to create one.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Projects ({}) ===", projects.len()).bold()
    );
    println!();
    println!(
        "  {:>4}  {:<32} {:<20}",
        "Id".dimmed(),
        "Name".dimmed(),
        "Created".dimmed(),
    );
    println!("  {}", "-".repeat(60).dimmed());

    for project in projects {
        let marker = if current == Some(project.id) {
            "*".green().bold().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "  {:>3}{} {:<32} {:<20}",
            project.id,
            marker,
            truncate_label(&project.name),
            project.created_at.dimmed(),
        );
    }
    println!();
}

fn print_group_header(label: &str, groups: &[String]) {
    println!();
    print!("  {:<32}", label.dimmed());
    for group in groups {
        print!(" {:>10}", super::truncate_chars(group, 9).dimmed());
    }
    println!();
    println!("  {}", "-".repeat(34 + 11 * groups.len()).dimmed());
}

fn truncate_label(text: &str) -> String {
    super::truncate_chars(text, 30)
}

fn colorize_prevalence(value: f64) -> colored::ColoredString {
    let text = format!("{:.1}%", value * 100.0);
    if value >= 0.5 {
        text.green().bold()
    } else if value >= 0.2 {
        text.normal()
    } else if value > 0.0 {
        text.dimmed()
    } else {
        "-".dimmed()
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}
