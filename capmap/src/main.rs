use capmap::commands::command_argument_builder;
use capmap::handlers::{handle_apps, handle_node, handle_tree, init_tracing, print_banner};

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    init_tracing(chosen_command.get_count("verbose"));

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    match chosen_command.subcommand() {
        Some(("apps", primary_command)) => handle_apps(primary_command).await,
        Some(("tree", primary_command)) => handle_tree(primary_command).await,
        Some(("node", primary_command)) => handle_node(primary_command).await,
        // No subcommand provided, just show the banner
        None => {}
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
