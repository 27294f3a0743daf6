//! Command Line Interface (CLI) layer for sarmeta.
//!
//! This module defines argument parsing (`args`) and the dispatch logic
//! (`runner`). It maps the positional arguments of each subcommand onto a
//! `MetadataView` plus `FormatOptions` and hands them to the library reporter.
//!
//! If you are embedding sarmeta into another application, call
//! `sarmeta::MetadataReporter` directly instead.
pub mod args;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
