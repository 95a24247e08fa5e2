//! Demo binary: runs the shopping-cart suite through the full CLI surface

use clap::Parser;
use testrig_cli::{run_cli, Args, ExitStatus};

fn main() {
    // clap exits with code 2 on its own for malformed flags
    let args = Args::parse();

    let status = match testrig_cli::demo::demo_suite() {
        Ok(suite) => match run_cli(&suite, &args) {
            Ok(status) => status,
            Err(err) => {
                eprintln!("error: {err}");
                ExitStatus::UsageError
            }
        },
        Err(err) => {
            eprintln!("error: {err}");
            ExitStatus::UsageError
        }
    };

    std::process::exit(status.code());
}
