pub mod config;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod trace;

pub use config::SuiteConfig;
pub use report::{ReportFormat, RunReport};
pub use runner::{Case, CaseResult, CaseStatus, Runner, ScenarioGroup};
pub use trace::CaseContext;

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
   ___  ___ ______________  ____  __
  / _ \/ _ /_  __/ _ \/ __ \/ /
 / ___/ __ |/ / / , _/ /_/ / /__
/_/  /_/ |_/_/ /_/|_|\____/____/
"#;
    println!("{}", banner.bright_cyan().bold());
    println!(
        "{}",
        "  end-to-end QA for marketing sites\n".bright_white()
    );
}
