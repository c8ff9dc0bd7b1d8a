use clap::{arg, command};
use linkrank_core::config::DEFAULT_CONFIG_PATH;
use std::path::PathBuf;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

fn existing_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-e --"existing" <LABEL>)
            .required(false)
            .help("Title of a node already in the knowledge graph (repeatable)")
            .action(clap::ArgAction::Append),
    )
    .arg(
        arg!(--"existing-file" <PATH>)
            .required(false)
            .help("Path to a newline-delimited file of existing node titles")
            .value_parser(clap::value_parser!(PathBuf)),
    )
    .arg(
        arg!(-c --"config" <PATH>)
            .required(false)
            .help(format!(
                "Configuration file (default: {} when present)",
                DEFAULT_CONFIG_PATH
            ))
            .value_parser(clap::value_parser!(PathBuf)),
    )
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("linkrank")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("linkrank")
        .about("Rank the outbound links of an encyclopedia article by relevance")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress progress and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Log ranking progress to stderr")
                .required(false)
                .global(true)
                .conflicts_with("quiet"),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(existing_args(
            command!("rank")
                .about(
                    "Rank the intro links of an article against the existing graph and print \
                the most relevant ones.",
                )
                .arg(arg!(<TITLE>).help("Title of the source article"))
                .arg(
                    arg!(-n --"top" <N>)
                        .required(false)
                        .help("Number of links to return (default: top_n from the configuration)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"preset" <PRESET>)
                        .required(false)
                        .help("Signal weighting scheme")
                        .value_parser(["default", "link-position"]),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, csv, markdown")
                        .value_parser(["text", "json", "csv", "markdown", "md"])
                        .default_value("text"),
                )
                .arg(
                    arg!(--"explain")
                        .required(false)
                        .help("Show the normalized signals behind every score")
                        .action(clap::ArgAction::SetTrue),
                ),
        ))
        .subcommand(existing_args(
            command!("links")
                .about("List the intro links of an article and why each one is kept or dropped")
                .arg(arg!(<TITLE>).help("Title of the source article")),
        ))
        .subcommand(
            command!("init")
                .about("Writes the default linkrank configuration file")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Location of the configuration file")
                        .default_value(DEFAULT_CONFIG_PATH),
                )
                .arg(
                    arg!(-f - -"force")
                        .help("Overwrite an existing configuration file without asking")
                        .required(false),
                ),
        )
}
