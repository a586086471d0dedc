//! Text rendering of the dashboard.
//!
//! Layout follows the web dashboard: a matrix of latest versions with one
//! column per environment, a "Last Updated" column, an optional history
//! table for the focused app, and a version footer.

use std::fmt::Display;

use chrono::TimeZone;
use deploytrail_core::{parse_deployed_at, ConsistencyRule, DashboardView, DeploymentRecord};

/// Placeholder for an environment the app was never deployed to.
pub const ABSENT: &str = "-";
const CONSISTENT: &str = "✓";
const INCONSISTENT: &str = "✗";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render the whole dashboard for one frame.
pub fn render_dashboard<Tz>(view: &DashboardView, version: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    out.push_str("DeployTrail\n");
    out.push_str("===========\n\n");
    out.push_str(&render_matrix(view, tz));

    if let Some(history) = &view.history {
        out.push_str(&format!("\n\nDeployment History for {}\n", history.app));
        out.push_str(&render_history(&history.deployments, tz));
    }

    if !view.rejected.is_empty() {
        out.push_str(&format!(
            "\n\nSkipped {} record(s) with invalid timestamps:\n",
            view.rejected.len()
        ));
        for r in &view.rejected {
            out.push_str(&format!("  #{} {}/{}: {}\n", r.id, r.app, r.environment, r.reason));
        }
    }

    out.push_str(&format!("\n\nDeployTrail version {}", version));
    out
}

/// Matrix of latest versions per app and environment.
pub fn render_matrix<Tz>(view: &DashboardView, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if view.rows.is_empty() {
        return "No deployments recorded yet.".to_string();
    }

    let mut header = vec!["App".to_string()];
    header.extend(view.environments.iter().cloned());
    header.push("Last Updated".to_string());

    let rows: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.app.clone()];
            for env in &view.environments {
                cells.push(match row.cell(env) {
                    Some(cell) => format!(
                        "{} {}",
                        cell.version,
                        if cell.consistent { CONSISTENT } else { INCONSISTENT }
                    ),
                    None => ABSENT.to_string(),
                });
            }
            cells.push(
                row.last_updated
                    .map(|at| at.with_timezone(tz).format(TIME_FORMAT).to_string())
                    .unwrap_or_else(|| ABSENT.to_string()),
            );
            cells
        })
        .collect();

    let legend = match view.rule {
        ConsistencyRule::Majority => "✓ matches the app's majority version",
        ConsistencyRule::AllSame => "✓ all environments run the same version",
    };

    format!(
        "Latest Versions per App\n{}\n({})",
        format_table(&header, &rows),
        legend
    )
}

/// History table for one app, newest first as received.
pub fn render_history<Tz>(deployments: &[DeploymentRecord], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if deployments.is_empty() {
        return "No deployments for this app.".to_string();
    }

    let header: Vec<String> = ["ID", "Environment", "Version", "Note", "Deployed At"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows: Vec<Vec<String>> = deployments
        .iter()
        .map(|d| {
            vec![
                d.id.to_string(),
                d.environment.clone(),
                d.version.clone(),
                d.note
                    .as_deref()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(ABSENT)
                    .to_string(),
                format_timestamp(&d.deployed_at, tz),
            ]
        })
        .collect();

    format_table(&header, &rows)
}

/// Format a raw `deployed_at` in `tz`, falling back to the raw text.
pub fn format_timestamp<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match parse_deployed_at(raw) {
        Ok(at) => at.with_timezone(tz).format(TIME_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}

fn format_table(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width - cell.chars().count();
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(header));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in rows {
        out.push('\n');
        out.push_str(&line(row));
    }
    out
}
