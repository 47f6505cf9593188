use clap::ArgMatches;
use colored::Colorize;
use commands::command_argument_builder;
use phishscope::handlers::*;
use tracing_subscriber::EnvFilter;

mod commands;

const BANNER: &str = r#"
   ___  __   _     __   ____
  / _ \/ /  (_)__ / /  / __/______  ___  ___
 / ___/ _ \/ (_-</ _ \_\ \/ __/ _ \/ _ \/ -_)
/_/  /_//_/_/___/_//_/___/\__/\___/ .__/\__/
                                 /_/
"#;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    let Some((name, sub_matches)) = chosen_command.subcommand() else {
        if !quiet {
            println!("{}", BANNER.bright_cyan().bold());
            println!("  Run {} for available commands", "phishscope --help".bright_white());
        }
        return;
    };

    // The TUI owns the terminal, so it gets no stdout log subscriber
    if name != "ui" {
        init_tracing(chosen_command.get_count("verbose"));
    }

    let client = match build_client(&chosen_command) {
        Ok(client) => client,
        Err(e) => exit_with_error(&e),
    };

    let result = match (name, sub_matches) {
        ("ui", _) => run_tui(client).await,
        ("stats", args) => handle_stats(&client, args, quiet).await,
        ("search", args) => handle_search(&client, args, quiet).await,
        ("sources", _) => handle_sources(&client, quiet).await,
        ("certs", args) => handle_certs(&client, args, quiet).await,
        ("recent", args) => handle_recent(&client, args, quiet).await,
        ("health", args) => handle_health(&client, args, quiet).await,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        exit_with_error(&e);
    }
}

async fn handle_certs(client: &phishscope_client::ApiClient, args: &ArgMatches, quiet: bool) -> Result<(), String> {
    match args.subcommand() {
        Some(("list", secondary_command)) => handle_certs_list(client, secondary_command, quiet).await,
        Some(("get", secondary_command)) => handle_certs_get(client, secondary_command, quiet).await,
        Some(("domains", secondary_command)) => handle_certs_domains(client, secondary_command, quiet).await,
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

async fn run_tui(client: phishscope_client::ApiClient) -> Result<(), String> {
    tokio::task::spawn_blocking(move || phishscope_tui::run(client))
        .await
        .map_err(|e| format!("TUI task failed: {}", e))?
        .map_err(|e| format!("Error running TUI: {}", e))
}

fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("{} {}", "✗".red().bold(), message.red());
    std::process::exit(1);
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
