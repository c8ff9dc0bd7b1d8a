// Report rendering for ranked links

use crate::error::Result;
use crate::model::ScoredLink;
use colored::Colorize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct RankingReport<'a> {
    source: &'a str,
    generator: &'static str,
    version: &'static str,
    generated_at: String,
    links: &'a [ScoredLink],
}

/// Render a ranking in `format`. With `explain`, every link is followed by
/// its normalized signal values (JSON always carries them).
pub fn render_ranking(
    source: &str,
    links: &[ScoredLink],
    format: ReportFormat,
    explain: bool,
) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(source, links, explain)),
        ReportFormat::Json => generate_json_report(source, links),
        ReportFormat::Csv => Ok(generate_csv_report(links, explain)),
        ReportFormat::Markdown => Ok(generate_markdown_report(source, links, explain)),
    }
}

pub fn generate_text_report(source: &str, links: &[ScoredLink], explain: bool) -> String {
    let mut report = String::new();

    report.push_str(&format!("{} {}\n\n", "Top links for".bold(), source.cyan().bold()));

    if links.is_empty() {
        report.push_str(&format!("  {}\n", "No relevant links found.".yellow()));
        return report;
    }

    let width = links.iter().map(|l| l.title.chars().count()).max().unwrap_or(0);
    for (idx, link) in links.iter().enumerate() {
        report.push_str(&format!(
            "  {:>2}. {:<width$}  {}\n",
            idx + 1,
            link.title,
            format!("{:6.2}", link.score).green(),
            width = width
        ));
        if explain {
            let s = &link.signals;
            report.push_str(&format!(
                "      {}\n",
                format!(
                    "affinity {:.3}  similarity {:.3}  authority {:.3}  popularity {:.3}  position {:.3}",
                    s.graph_affinity, s.similarity, s.authority, s.popularity, s.link_position
                )
                .dimmed()
            ));
        }
    }

    report
}

pub fn generate_json_report(source: &str, links: &[ScoredLink]) -> Result<String> {
    let report = RankingReport {
        source,
        generator: "linkrank",
        version: env!("CARGO_PKG_VERSION"),
        generated_at: chrono::Utc::now().to_rfc3339(),
        links,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn generate_csv_report(links: &[ScoredLink], explain: bool) -> String {
    let mut report = String::from("rank,title,score");
    if explain {
        report.push_str(",graph_affinity,similarity,authority,popularity,link_position");
    }
    report.push('\n');

    for (idx, link) in links.iter().enumerate() {
        report.push_str(&format!("{},{},{:.4}", idx + 1, csv_field(&link.title), link.score));
        if explain {
            let s = &link.signals;
            report.push_str(&format!(
                ",{:.4},{:.4},{:.4},{:.4},{:.4}",
                s.graph_affinity, s.similarity, s.authority, s.popularity, s.link_position
            ));
        }
        report.push('\n');
    }

    report
}

pub fn generate_markdown_report(source: &str, links: &[ScoredLink], explain: bool) -> String {
    let mut report = format!("# Top links for {}\n\n", source);

    if links.is_empty() {
        report.push_str("_No relevant links found._\n");
        return report;
    }

    if explain {
        report.push_str("| # | Title | Score | Affinity | Similarity | Authority | Popularity | Position |\n");
        report.push_str("|---|-------|------:|---------:|-----------:|----------:|-----------:|---------:|\n");
    } else {
        report.push_str("| # | Title | Score |\n");
        report.push_str("|---|-------|------:|\n");
    }

    for (idx, link) in links.iter().enumerate() {
        let title = link.title.replace('|', "\\|");
        if explain {
            let s = &link.signals;
            report.push_str(&format!(
                "| {} | {} | {:.2} | {:.3} | {:.3} | {:.3} | {:.3} | {:.3} |\n",
                idx + 1,
                title,
                link.score,
                s.graph_affinity,
                s.similarity,
                s.authority,
                s.popularity,
                s.link_position
            ));
        } else {
            report.push_str(&format!("| {} | {} | {:.2} |\n", idx + 1, title, link.score));
        }
    }

    report
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
