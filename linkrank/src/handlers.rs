use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use linkrank_core::config::DEFAULT_CONFIG_PATH;
use linkrank_core::rank::{CandidateVerdict, Verdict};
use linkrank_core::report::{ReportFormat, render_ranking};
use linkrank_core::{LinkRanker, RankConfig, Weights};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// Helper functions for rank and links handlers

/// Parse one line of an existing-nodes file. Blank lines and `#` comments
/// yield nothing.
pub fn parse_existing_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(line.to_string())
}

/// Load existing node titles from a newline-delimited file
pub fn load_existing_from_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read existing nodes file {}", path.display()))?;

    Ok(content.lines().filter_map(parse_existing_line).collect())
}

/// Existing node titles from `--existing` flags followed by `--existing-file`
pub fn collect_existing(args: &ArgMatches) -> Result<Vec<String>> {
    let mut existing: Vec<String> = args
        .get_many::<String>("existing")
        .map(|values| values.filter_map(|v| parse_existing_line(v)).collect())
        .unwrap_or_default();

    if let Some(path) = args.get_one::<PathBuf>("existing-file") {
        existing.extend(load_existing_from_file(path)?);
    }

    Ok(existing)
}

pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// The configuration file to load: an explicit `--config`, else the default
/// location when a file exists there.
pub fn resolve_config_path(explicit: Option<&PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(expand_path(&path.to_string_lossy()));
    }
    let default = expand_path(DEFAULT_CONFIG_PATH);
    default.exists().then_some(default)
}

fn load_config(args: &ArgMatches) -> Result<RankConfig> {
    let path = resolve_config_path(args.get_one::<PathBuf>("config"));
    RankConfig::load(path.as_deref()).context("Failed to load configuration")
}

/// Install the stderr log subscriber. `RUST_LOG` applies unless `-v` asks
/// for debug output from the linkrank crates.
pub fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,linkrank=debug,linkrank_core=debug,linkrank_fetch=debug")
    } else {
        let fallback = if quiet { "error" } else { "warn" };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    pb
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> io::Result<String> {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush()?;
    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    Ok(response.trim().to_lowercase())
}

pub async fn handle_rank(args: &ArgMatches) -> Result<()> {
    let title = args
        .get_one::<String>("TITLE")
        .context("A source article title is required")?;
    let quiet = args.get_flag("quiet");
    let explain = args.get_flag("explain");
    let format_name = args.get_one::<String>("format").map(String::as_str).unwrap_or("text");
    let format = ReportFormat::from_str(format_name)
        .with_context(|| format!("Unknown report format '{}'", format_name))?;

    let mut config = load_config(args)?;
    if let Some(preset) = args.get_one::<String>("preset") {
        config.weights =
            Weights::preset(preset).with_context(|| format!("Unknown weight preset '{}'", preset))?;
    }
    if let Some(&top) = args.get_one::<usize>("top") {
        config = config.with_top_n(top);
    }

    let existing = collect_existing(args)?;
    debug!("{} existing nodes supplied", existing.len());

    let ranker = LinkRanker::new(config)?;

    let progress = (!quiet && format == ReportFormat::Text)
        .then(|| spinner(format!("Ranking links of {}...", title)));
    let result = ranker.rank_links(title, &existing).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let links = result.with_context(|| format!("Failed to rank links of '{}'", title))?;
    print!("{}", render_ranking(title, &links, format, explain)?);
    Ok(())
}

pub async fn handle_links(args: &ArgMatches) -> Result<()> {
    let title = args
        .get_one::<String>("TITLE")
        .context("A source article title is required")?;
    let quiet = args.get_flag("quiet");

    let config = load_config(args)?;
    let existing = collect_existing(args)?;
    let ranker = LinkRanker::new(config)?;

    let progress = (!quiet).then(|| spinner(format!("Extracting links of {}...", title)));
    let verdicts = ranker.candidate_verdicts(title, &existing).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    print!("{}", format_verdicts(title, &verdicts));
    Ok(())
}

/// Render the filtering decision for each intro link, followed by a count
/// of the links that would be ranked.
pub fn format_verdicts(source: &str, verdicts: &[CandidateVerdict]) -> String {
    let mut report = format!("{} {}\n\n", "Intro links of".bold(), source.cyan().bold());

    if verdicts.is_empty() {
        report.push_str(&format!("  {}\n", "No intro links found.".yellow()));
        return report;
    }

    for candidate in verdicts {
        match &candidate.verdict {
            Verdict::Kept => {
                report.push_str(&format!("  {} {}\n", "✓".green().bold(), candidate.title));
            }
            other => {
                report.push_str(&format!(
                    "  {} {} {}\n",
                    "✗".red(),
                    candidate.title.dimmed(),
                    format!("({})", other).dimmed()
                ));
            }
        }
    }

    let kept = verdicts.iter().filter(|c| c.verdict == Verdict::Kept).count();
    report.push_str(&format!(
        "\n{} of {} links kept\n",
        kept.to_string().green().bold(),
        verdicts.len()
    ));
    report
}

/// Write the default configuration to `path`, creating parent directories
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let content = RankConfig::default().to_toml()?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write configuration to {}", path.display()))?;
    Ok(())
}

pub fn handle_init(args: &ArgMatches) -> Result<()> {
    print_divider();
    println!("{}", "  LINKRANK INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let raw_path = args
        .get_one::<String>("PATH")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_PATH);
    let force = args.get_flag("force");
    let config_path = expand_path(raw_path);

    println!(
        "{} Target: {}",
        "→".blue(),
        config_path.display().to_string().bright_white()
    );
    println!();

    if config_path.exists() && !force {
        println!("{}", "⚠ WARNING".yellow().bold());
        println!("Configuration file already exists:");
        println!(
            "  {} {}",
            "•".yellow(),
            config_path.display().to_string().bright_white()
        );
        println!();

        let response = print_prompt("Do you want to overwrite it? [y/N]:")?;
        println!();

        if response != "y" && response != "yes" {
            println!("{} Initialization cancelled.", "✗".red().bold());
            return Ok(());
        }
        println!("{} Proceeding with overwrite", "→".yellow().bold());
        println!();
    }

    write_default_config(&config_path)?;

    print_divider();
    println!("{}", "  INITIALIZATION COMPLETE".green().bold());
    print_divider();
    println!();
    println!(
        "{} Configuration: {}",
        "✓".green().bold(),
        config_path.display().to_string().bright_white()
    );
    println!(
        "{} Override any key with LINKRANK__<SECTION>__<KEY>, e.g. LINKRANK__WEIGHTS__SIMILARITY",
        "ℹ".blue()
    );
    println!();
    Ok(())
}
