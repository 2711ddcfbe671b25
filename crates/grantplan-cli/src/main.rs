use std::process::ExitCode;

use clap::Parser;
use grantplan_cli::{project_root, run, Cli};
use grantplan_core::errors::ErrorCode;
use grantplan_core::tracing::init_tracing;

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli, &project_root()) {
        Ok(report) => {
            print!("{}", report.output);
            eprint!("{}", report.warnings);
            if report.failed_units > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("{}", e.coded_string());
            ExitCode::from(2)
        }
    }
}
