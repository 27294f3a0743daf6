use std::io;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use sarmeta::MetadataReporter;

use super::args::{CliArgs, Request};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        init_logging();
    }

    let Request { view, path, opts } = args.command.into_request();
    let Some(path) = path else {
        debug!("No product path given, nothing to report");
        return Ok(());
    };

    let mut out = io::stdout().lock();
    let lines = MetadataReporter::new().report(view, &path, &opts, &mut out)?;
    debug!("Reported {} of {:?}: {} lines", view, path, lines);
    Ok(())
}
