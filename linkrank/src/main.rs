use colored::Colorize;
use linkrank::commands::command_argument_builder;
use linkrank::handlers::{handle_init, handle_links, handle_rank, init_tracing};

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();
    let quiet = matches.get_flag("quiet");
    let verbose = matches.get_flag("verbose");

    init_tracing(verbose, quiet);

    let result = match matches.subcommand() {
        Some(("rank", primary_command)) => handle_rank(primary_command).await,
        Some(("links", primary_command)) => handle_links(primary_command).await,
        Some(("init", primary_command)) => handle_init(primary_command),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
