use capmap_client::{CapabilityClient, CapabilityNode, CollisionPolicy};
use capmap_core::report::{ReportFormat, generate_report, save_report, tree_report};
use capmap_core::{WalkOptions, execute_tree, execute_walk};
use clap::ArgMatches;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use url::Url;

/// Everything needed to build a client, resolved once from flags and env
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub tenant: String,
    pub token: String,
    pub endpoint: Option<Url>,
    pub timeout: Option<Duration>,
}

impl ConnectionConfig {
    pub fn from_args(args: &ArgMatches) -> Result<Self, String> {
        let tenant = args
            .get_one::<String>("tenant")
            .ok_or_else(|| "--tenant or LEANIX_TENANT must be provided".to_string())?
            .clone();
        let token = resolve_token(
            args.get_one::<String>("token"),
            args.get_one::<PathBuf>("token-file"),
        )?;

        Ok(Self {
            tenant,
            token,
            endpoint: args.get_one::<Url>("endpoint").cloned(),
            timeout: args.get_one::<u64>("timeout").map(|s| Duration::from_secs(*s)),
        })
    }

    pub fn into_client(self) -> Result<CapabilityClient, String> {
        let mut client =
            CapabilityClient::new(&self.tenant, &self.token).map_err(|e| e.to_string())?;
        if let Some(endpoint) = self.endpoint {
            client = client.with_endpoint(endpoint);
        }
        if let Some(timeout) = self.timeout {
            client = client.with_timeout(timeout).map_err(|e| e.to_string())?;
        }
        Ok(client)
    }
}

/// Pick the token from the flag/env value or from a token file
pub fn resolve_token(token: Option<&String>, token_file: Option<&PathBuf>) -> Result<String, String> {
    if let Some(path) = token_file {
        load_token_from_file(path)
    } else if let Some(token) = token {
        Ok(token.clone())
    } else {
        Err("Either --token, --token-file or LEANIX_API_TOKEN must be provided".to_string())
    }
}

/// Read a token file, expanding `~` and trimming surrounding whitespace
pub fn load_token_from_file(path: &Path) -> Result<String, String> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::tilde(raw.as_ref());
    let expanded_path = Path::new(expanded.as_ref());

    let content = fs::read_to_string(expanded_path)
        .map_err(|e| format!("Failed to read token file {}: {}", expanded_path.display(), e))?;

    let token = content.trim();
    if token.is_empty() {
        return Err(format!("Token file {} is empty", expanded_path.display()));
    }
    Ok(token.to_string())
}

pub fn log_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

pub fn init_tracing(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_max_level(log_level(verbosity))
        .with_writer(std::io::stderr)
        .init();
}

pub fn print_banner() {
    eprintln!("{}", "═".repeat(60).bright_blue().bold());
    eprintln!(
        "{}",
        format!("  CAPMAP v{}", env!("CARGO_PKG_VERSION"))
            .bright_white()
            .bold()
    );
    eprintln!("  {}", "LeanIX business capabilities → applications".cyan());
    eprintln!("{}", "═".repeat(60).bright_blue().bold());
}

/// Pretty JSON for a fetched node, or a not-found notice
pub fn render_node(node_id: &str, node: Option<&CapabilityNode>) -> Result<String, String> {
    match node {
        Some(node) => serde_json::to_string_pretty(node).map_err(|e| e.to_string()),
        None => Ok(format!("Business capability {} does not exist", node_id)),
    }
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "✗".red().bold(), msg);
    std::process::exit(1);
}

fn client_from_args(args: &ArgMatches) -> CapabilityClient {
    match ConnectionConfig::from_args(args).and_then(ConnectionConfig::into_client) {
        Ok(client) => client,
        Err(e) => fail(e),
    }
}

pub async fn handle_apps(sub_matches: &ArgMatches) {
    let client = client_from_args(sub_matches);
    let quiet = sub_matches.get_flag("quiet");
    let root_id = sub_matches
        .get_one::<String>("root")
        .cloned()
        .unwrap_or_else(|| fail("--root must be provided"));
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let output = sub_matches.get_one::<PathBuf>("output");
    let collision = if sub_matches.get_flag("strict-names") {
        CollisionPolicy::Fail
    } else {
        CollisionPolicy::Overwrite
    };

    if !quiet {
        eprintln!("\n{} Walking capability tree from {}", "→".blue(), root_id.bright_white());
        eprintln!("{} Endpoint: {}\n", "→".blue(), client.endpoint());
    }

    let options = WalkOptions {
        root_id,
        collision,
        show_progress: !quiet,
    };

    let outcome = match execute_walk(client, options).await {
        Ok(outcome) => outcome,
        Err(e) => fail(format!("Walk failed: {}", e)),
    };

    let report = match generate_report(&outcome, format) {
        Ok(report) => report,
        Err(e) => fail(format!("Failed to render report: {}", e)),
    };

    match output {
        Some(path) => {
            if let Err(e) = save_report(&report, path) {
                fail(format!("Failed to save report: {}", e));
            }
            eprintln!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => print!("{}", report),
    }
}

pub async fn handle_tree(sub_matches: &ArgMatches) {
    let client = client_from_args(sub_matches);
    let quiet = sub_matches.get_flag("quiet");
    let root_id = sub_matches
        .get_one::<String>("root")
        .cloned()
        .unwrap_or_else(|| fail("--root must be provided"));

    match execute_tree(client, &root_id, !quiet).await {
        Ok(nodes) => print!("{}", tree_report(&nodes)),
        Err(e) => fail(format!("Walk failed: {}", e)),
    }
}

pub async fn handle_node(sub_matches: &ArgMatches) {
    let client = client_from_args(sub_matches);
    let node_id = sub_matches
        .get_one::<String>("id")
        .cloned()
        .unwrap_or_else(|| fail("--id must be provided"));

    let node = match client.fetch_node(&node_id).await {
        Ok(node) => node,
        Err(e) => fail(format!("Fetch failed: {}", e)),
    };

    match render_node(&node_id, node.as_ref()) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => fail(e),
    }
}
