//! # netaudit
//!

use clap::Parser;
use netaudit_cli::Cli;

fn main() {
    let cli = Cli::parse();
    std::process::exit(netaudit_cli::run(cli));
}
