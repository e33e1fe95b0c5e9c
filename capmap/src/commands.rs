use clap::{arg, command};
use url::Url;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

/// Tenant, credentials and transport overrides shared by every subcommand
fn with_connection_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(--"tenant" <TENANT>)
            .required(true)
            .env("LEANIX_TENANT")
            .help("LeanIX tenant, as in https://<TENANT>.leanix.net"),
    )
    .arg(
        arg!(--"token" <TOKEN>)
            .required(false)
            .env("LEANIX_API_TOKEN")
            .hide_env_values(true)
            .help("Bearer token for the Pathfinder API"),
    )
    .arg(
        arg!(--"token-file" <PATH>)
            .required(false)
            .help("Read the bearer token from a file (takes precedence over --token)")
            .value_parser(clap::value_parser!(std::path::PathBuf)),
    )
    .arg(
        arg!(--"endpoint" <URL>)
            .required(false)
            .help("Override the GraphQL endpoint derived from the tenant")
            .value_parser(clap::value_parser!(Url)),
    )
    .arg(
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Request timeout in seconds (default: no explicit timeout)")
            .value_parser(clap::value_parser!(u64)),
    )
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("capmap")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("capmap")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and progress output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" ... "Increase log verbosity (-v info, -vv debug)")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(with_connection_args(
            command!("apps")
                .about(
                    "Walk a business capability tree and list the applications linked to each \
                capability.",
                )
                .arg(
                    arg!(-r --"root" <ID>)
                        .required(true)
                        .help("Fact sheet id of the root business capability"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, csv, markdown")
                        .value_parser(["text", "json", "csv", "markdown"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"strict-names")
                        .required(false)
                        .help("Fail when two capabilities share a name instead of keeping the last one")
                        .action(clap::ArgAction::SetTrue),
                ),
        ))
        .subcommand(with_connection_args(
            command!("tree")
                .about("Walk a business capability tree and list every capability visited")
                .arg(
                    arg!(-r --"root" <ID>)
                        .required(true)
                        .help("Fact sheet id of the root business capability"),
                ),
        ))
        .subcommand(with_connection_args(
            command!("node")
                .about("Fetch a single business capability and print it as JSON")
                .arg(
                    arg!(-i --"id" <ID>)
                        .required(true)
                        .help("Fact sheet id of the business capability"),
                ),
        ))
}
