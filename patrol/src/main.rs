use commands::command_argument_builder;
use patrol::handlers::{GroupSelection, handle_suite};
use patrol_core::print_banner;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    match chosen_command.subcommand() {
        Some(("run", primary_command)) => {
            handle_suite(primary_command, GroupSelection::All, quiet).await
        }
        Some(("links", primary_command)) => {
            handle_suite(primary_command, GroupSelection::Links, quiet).await
        }
        Some(("newsletter", primary_command)) => {
            handle_suite(primary_command, GroupSelection::Newsletter, quiet).await
        }
        Some(("crawlability", primary_command)) => {
            handle_suite(primary_command, GroupSelection::Crawlability, quiet).await
        }
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
