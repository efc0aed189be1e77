use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

/// Flags shared by every suite subcommand.
fn suite_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-b --"base-url" <URL>)
            .required(false)
            .help("Target site to test (overrides the BASE_URL environment variable)")
            .value_parser(clap::value_parser!(Url)),
    )
    .arg(
        arg!(-w --"workers" <NUM_WORKERS>)
            .required(false)
            .help("The number of async worker 'threads' running parallel cases.")
            .value_parser(clap::value_parser!(usize)),
    )
    .arg(
        arg!(-r --"retries" <NUM>)
            .required(false)
            .help("How many times a failed case is re-run from scratch before it counts as failed")
            .value_parser(clap::value_parser!(u32)),
    )
    .arg(
        arg!(-e --"engine" <ENGINES>)
            .required(false)
            .help("Comma-separated browser engines: chromium, chrome, edge (default: all three)"),
    )
    .arg(
        arg!(-o --"output-dir" <PATH>)
            .required(false)
            .help("Directory for reports, step traces and the broken link log")
            .value_parser(clap::value_parser!(std::path::PathBuf))
            .default_value("."),
    )
    .arg(
        arg!(-f --"format" <FORMAT>)
            .required(false)
            .help("Report format: text, json, html, all")
            .value_parser(["text", "json", "html", "all"])
            .default_value("all"),
    )
    .arg(
        arg!(--"headful")
            .required(false)
            .help("Run browsers with a visible window (default: headless)")
            .action(clap::ArgAction::SetTrue),
    )
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("patrol")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("patrol")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(suite_args(command!("run").about(
            "Run the full suite: newsletter form, link health and crawlability checks \
            across every configured engine.",
        )))
        .subcommand(suite_args(
            command!("links").about("Check the configured pages for broken links"),
        ))
        .subcommand(suite_args(
            command!("newsletter").about("Exercise the newsletter signup form"),
        ))
        .subcommand(suite_args(
            command!("crawlability").about("Audit sitemap.xml and robots.txt over plain HTTP"),
        ))
}
