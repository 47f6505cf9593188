use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("phishscope")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("phishscope")
        .about("Search and monitor phishing intelligence feeds")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false).global(true))
        .arg(
            arg!(-v --"verbose" ...)
                .help("Increase log verbosity (-v info, -vv debug)")
                .global(true),
        )
        .arg(
            arg!(--"api-url" <URL>)
                .required(false)
                .help("Backend base URL (overrides PHISHSCOPE_API_BASE_URL)")
                .value_parser(clap::value_parser!(Url))
                .global(true),
        )
        .arg(
            arg!(--"timeout" <MILLIS>)
                .required(false)
                .help("Request timeout in milliseconds (overrides PHISHSCOPE_API_TIMEOUT)")
                .value_parser(clap::value_parser!(u64).range(1..))
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(command!("ui").about("Launch the interactive terminal UI"))
        .subcommand(
            command!("stats")
                .about("Show the statistics dashboard")
                .arg(
                    arg!(-w --"watch")
                        .required(false)
                        .help("Keep refreshing every 30 seconds until interrupted")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print the raw statistics as JSON")
                        .action(clap::ArgAction::SetTrue)
                        .conflicts_with("watch"),
                ),
        )
        .subcommand(
            command!("search")
                .about("Search every intelligence source at once")
                .arg(arg!(<QUERY>).help("Domain, URL or keyword to look for"))
                .arg(
                    arg!(-s --"sources" <SOURCES>)
                        .required(false)
                        .help("Comma-separated source ids, e.g. phishtank,ut1_gambling (default: all)"),
                )
                .arg(
                    arg!(-l --"limit" <NUM>)
                        .required(false)
                        .help("Maximum results requested from the backend")
                        .value_parser(clap::value_parser!(u32).range(1..=1000))
                        .default_value("50"),
                )
                .arg(
                    arg!(--"offset" <NUM>)
                        .required(false)
                        .help("Results to skip on the backend")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("0"),
                )
                .arg(
                    arg!(-p --"page" <NUM>)
                        .required(false)
                        .help("Page of each result type to display")
                        .value_parser(clap::value_parser!(u32).range(1..))
                        .default_value("1"),
                )
                .arg(
                    arg!(--"page-size" <NUM>)
                        .required(false)
                        .help("Results per page")
                        .value_parser(["10", "20", "50", "100"])
                        .default_value("20"),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print the raw response as JSON")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(command!("sources").about("List searchable sources, UT1 categories and usage examples"))
        .subcommand(
            command!("certs")
                .about("Browse collected SSL certificates")
                .subcommand_required(true)
                .subcommand(
                    command!("list")
                        .about("List certificates page by page")
                        .arg(
                            arg!(-p --"page" <NUM>)
                                .required(false)
                                .value_parser(clap::value_parser!(u32).range(1..))
                                .default_value("1"),
                        )
                        .arg(
                            arg!(-l --"limit" <NUM>)
                                .required(false)
                                .value_parser(clap::value_parser!(u32).range(1..=1000))
                                .default_value("50"),
                        )
                        .arg(arg!(--"search" <TEXT>).required(false).help("Filter on subject CN"))
                        .arg(
                            arg!(--"has-domains")
                                .required(false)
                                .help("Only certificates that list domains")
                                .action(clap::ArgAction::SetTrue),
                        ),
                )
                .subcommand(
                    command!("get")
                        .about("Show one certificate")
                        .arg(arg!(<ID>).value_parser(clap::value_parser!(i64))),
                )
                .subcommand(
                    command!("domains")
                        .about("Find certificates covering a domain")
                        .arg(arg!(<QUERY>).help("Domain fragment to look for"))
                        .arg(
                            arg!(-l --"limit" <NUM>)
                                .required(false)
                                .value_parser(clap::value_parser!(u32).range(1..=100))
                                .default_value("10"),
                        ),
                ),
        )
        .subcommand(
            command!("recent").about("Show recently added certificates").arg(
                arg!(-l --"limit" <NUM>)
                    .required(false)
                    .value_parser(clap::value_parser!(u32).range(1..=100))
                    .default_value("10"),
            ),
        )
        .subcommand(
            command!("health").about("Check API and database health").arg(
                arg!(--"db")
                    .required(false)
                    .help("Query the database health endpoint only")
                    .action(clap::ArgAction::SetTrue),
            ),
        )
}
