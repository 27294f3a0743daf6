//! sarmeta CLI entrypoint.
//!
//! Thin wrapper over the `cli` module: parse args, report, exit. A product
//! that cannot be opened is not an error; only a failing stdout is.
//! For programmatic use, prefer the library API (`sarmeta::MetadataReporter`).

use clap::Parser;

mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();
    cli::run(args)
}
