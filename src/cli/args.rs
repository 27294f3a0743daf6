use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use sarmeta::{FormatOptions, MetadataView};

#[derive(Debug, Parser)]
#[command(
    name = "sarmeta",
    version,
    about = "Print band names, pixel spacing or polarisations of a raster product"
)]
pub struct CliArgs {
    /// Enable diagnostics on standard error (RUST_LOG overrides the level)
    #[arg(long, global = true, default_value_t = false)]
    pub log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print one line per band: <DELIMITER><band>[::<product>]
    ListBands(ListBandsArgs),
    /// Print "Range spacing" and "Azimuth spacing" lines, or nothing if either is missing
    PixelSpacing(DelimitedArgs),
    /// Print one line per polarisation: <DELIMITER><polarisation>
    Polarisations(DelimitedArgs),
}

#[derive(Debug, Args)]
pub struct ListBandsArgs {
    /// Product to read. Without it nothing is printed
    pub path: Option<PathBuf>,

    /// Printed in front of every band name
    #[arg(allow_hyphen_values = true)]
    pub delimiter: Option<String>,

    /// Append "::<product name>" to every line when exactly "True"
    #[arg(allow_hyphen_values = true)]
    pub append_product_name: Option<String>,
}

#[derive(Debug, Args)]
pub struct DelimitedArgs {
    /// Product to read. Without it nothing is printed
    pub path: Option<PathBuf>,

    /// Separator placed between fields
    #[arg(allow_hyphen_values = true)]
    pub delimiter: Option<String>,
}

/// What one invocation asks for
#[derive(Debug, PartialEq, Eq)]
pub struct Request {
    pub view: MetadataView,
    pub path: Option<PathBuf>,
    pub opts: FormatOptions,
}

impl Command {
    pub fn into_request(self) -> Request {
        match self {
            Command::ListBands(args) => Request {
                view: MetadataView::Bands,
                path: args.path,
                opts: FormatOptions::from_args(
                    args.delimiter.as_deref(),
                    args.append_product_name.as_deref(),
                ),
            },
            Command::PixelSpacing(args) => Request {
                view: MetadataView::PixelSpacing,
                path: args.path,
                opts: FormatOptions::from_args(args.delimiter.as_deref(), None),
            },
            Command::Polarisations(args) => Request {
                view: MetadataView::Polarisations,
                path: args.path,
                opts: FormatOptions::from_args(args.delimiter.as_deref(), None),
            },
        }
    }
}
