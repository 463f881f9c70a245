//! Classforge CLI - Generate Java skeletons from draw.io class diagrams

mod cli;

use clap::Parser;

fn main() {
    // Logging is configured inside `run` once the flags are known
    let cli_args = cli::Cli::parse();

    let mut app = cli::ClassforgeApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
