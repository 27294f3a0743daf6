//! The metadata reporter: open a product, pick one metadata view, format it
//! into delimiter-separated lines and write them out.
//!
//! Unopenable products are skipped silently; the only error a report can
//! return is a failure of the output sink.
use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::io::ProductIo;
use crate::product::{Product, ProductHandle, ProductOpener};
use crate::types::{FormatOptions, MetadataView, PRODUCT_NAME_SEPARATOR};

pub const RANGE_SPACING: &str = "range_spacing";
pub const AZIMUTH_SPACING: &str = "azimuth_spacing";

/// Abstracted metadata keys holding the polarisation of each measurement data set
pub const POLARISATION_KEYS: [&str; 4] = [
    "mds1_tx_rx_polar",
    "mds2_tx_rx_polar",
    "mds3_tx_rx_polar",
    "mds4_tx_rx_polar",
];

/// One line per band, in declaration order
pub fn band_lines(product: &dyn Product, opts: &FormatOptions) -> Vec<String> {
    product
        .bands()
        .iter()
        .map(|band| {
            if opts.append_product_name {
                format!(
                    "{}{}{}{}",
                    opts.delimiter,
                    band.name,
                    PRODUCT_NAME_SEPARATOR,
                    product.name()
                )
            } else {
                format!("{}{}", opts.delimiter, band.name)
            }
        })
        .collect()
}

/// Range and azimuth spacing lines, or `None` unless both attributes exist
pub fn pixel_spacing_lines(product: &dyn Product, opts: &FormatOptions) -> Option<[String; 2]> {
    let metadata = product.abstracted_metadata()?;
    let range = metadata.attribute(RANGE_SPACING)?;
    let azimuth = metadata.attribute(AZIMUTH_SPACING)?;
    let d = &opts.delimiter;
    Some([
        format!("Range spacing{d}{}{d}{}", range.value, range.unit_or_empty()),
        format!("Azimuth spacing{d}{}{d}{}", azimuth.value, azimuth.unit_or_empty()),
    ])
}

/// One line per declared polarisation; blank and `-` entries are skipped
pub fn polarisation_lines(product: &dyn Product, opts: &FormatOptions) -> Vec<String> {
    let Some(metadata) = product.abstracted_metadata() else {
        return Vec::new();
    };
    POLARISATION_KEYS
        .iter()
        .filter_map(|key| metadata.attribute(key))
        .map(|attr| attr.value.trim())
        .filter(|pol| !pol.is_empty() && *pol != "-")
        .map(|pol| format!("{}{}", opts.delimiter, pol))
        .collect()
}

/// Recover band names from captured band-listing output.
///
/// Lines not containing `delimiter` are ignored (the listing may be interleaved
/// with unrelated output); the leading delimiter is cut off and the rest trimmed.
pub fn parse_band_lines(output: &str, delimiter: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.contains(delimiter))
        .filter_map(|line| line.get(delimiter.len()..))
        .map(|name| name.trim().to_string())
        .collect()
}

/// Split `band::product` into its parts
pub fn split_product_name(line: &str) -> (&str, Option<&str>) {
    match line.rsplit_once(PRODUCT_NAME_SEPARATOR) {
        Some((band, product)) => (band, Some(product)),
        None => (line, None),
    }
}

/// Opens products through `O` and writes metadata reports
#[derive(Debug, Clone, Default)]
pub struct MetadataReporter<O = ProductIo> {
    opener: O,
}

impl MetadataReporter<ProductIo> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<O: ProductOpener> MetadataReporter<O> {
    pub fn with_opener(opener: O) -> Self {
        Self { opener }
    }

    /// Write the lines of `view` for the product at `path`. Returns the number
    /// of lines written; zero when the product cannot be opened.
    pub fn report<W: Write>(
        &self,
        view: MetadataView,
        path: &Path,
        opts: &FormatOptions,
        out: &mut W,
    ) -> Result<usize> {
        let Some(product) = self.open(path) else {
            return Ok(0);
        };

        let lines = match view {
            MetadataView::Bands => band_lines(&*product, opts),
            MetadataView::PixelSpacing => match pixel_spacing_lines(&*product, opts) {
                Some(lines) => lines.to_vec(),
                None => {
                    debug!("{:?} lacks range or azimuth spacing", path);
                    Vec::new()
                }
            },
            MetadataView::Polarisations => polarisation_lines(&*product, opts),
        };

        for line in &lines {
            writeln!(out, "{}", line)?;
        }
        out.flush()?;
        product.close();
        Ok(lines.len())
    }

    pub fn list_bands<W: Write>(
        &self,
        path: &Path,
        opts: &FormatOptions,
        out: &mut W,
    ) -> Result<usize> {
        self.report(MetadataView::Bands, path, opts, out)
    }

    pub fn report_pixel_spacing<W: Write>(
        &self,
        path: &Path,
        opts: &FormatOptions,
        out: &mut W,
    ) -> Result<usize> {
        self.report(MetadataView::PixelSpacing, path, opts, out)
    }

    pub fn list_polarisations<W: Write>(
        &self,
        path: &Path,
        opts: &FormatOptions,
        out: &mut W,
    ) -> Result<usize> {
        self.report(MetadataView::Polarisations, path, opts, out)
    }

    fn open(&self, path: &Path) -> Option<ProductHandle> {
        match self.opener.open(path) {
            Ok(product) => {
                info!("Opened {} ({} bands)", product.name(), product.bands().len());
                Some(ProductHandle::new(product))
            }
            Err(e) => {
                debug!("Skipping {:?}: {}", path, e);
                None
            }
        }
    }
}

/// List band names of the product at `path` using the built-in readers
pub fn list_bands<W: Write>(path: &Path, opts: &FormatOptions, out: &mut W) -> Result<usize> {
    MetadataReporter::new().list_bands(path, opts, out)
}

/// Report range and azimuth pixel spacing using the built-in readers
pub fn report_pixel_spacing<W: Write>(
    path: &Path,
    opts: &FormatOptions,
    out: &mut W,
) -> Result<usize> {
    MetadataReporter::new().report_pixel_spacing(path, opts, out)
}

/// List polarisations using the built-in readers
pub fn list_polarisations<W: Write>(
    path: &Path,
    opts: &FormatOptions,
    out: &mut W,
) -> Result<usize> {
    MetadataReporter::new().list_polarisations(path, opts, out)
}
