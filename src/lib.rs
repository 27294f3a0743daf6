#![doc = r#"
SARMETA — print band names, pixel spacing and polarisations of SAR/EO raster products.

The crate opens a product (BEAM-DIMAP `.dim`, Sentinel-1 SAFE, or anything GDAL can
read), pulls one small piece of metadata out of it and writes it as plain,
delimiter-separated lines. It powers the `sarmeta` CLI and is meant to be called by
tools that scrape those lines back out.

Products that cannot be opened produce no output and no error: callers treat
"nothing printed" as "nothing to report".

Quick start: list bands
-----------------------
```rust,no_run
use std::path::Path;
use sarmeta::{list_bands, FormatOptions};

fn main() -> sarmeta::Result<()> {
    let opts = FormatOptions::new("__band:").with_append_product_name(true);
    let mut out = std::io::stdout().lock();
    list_bands(Path::new("/data/S1A_IW_GRDH_Cal.dim"), &opts, &mut out)?;
    Ok(())
}
```

Pixel spacing into a buffer
---------------------------
```rust,no_run
use std::path::Path;
use sarmeta::{report_pixel_spacing, FormatOptions};

fn main() -> sarmeta::Result<()> {
    let mut out = Vec::new();
    let lines = report_pixel_spacing(
        Path::new("/data/S1A_IW_GRDH_1SDV.SAFE"),
        &FormatOptions::new("\t"),
        &mut out,
    )?;
    // Either 0 (missing product or spacing) or 2 lines.
    assert!(lines == 0 || lines == 2);
    Ok(())
}
```

Custom readers
--------------
Anything implementing [`ProductOpener`] can stand in for the built-in readers, which
is how the reporter is tested without files on disk.

```rust
use std::path::Path;
use sarmeta::{Band, FormatOptions, MetadataReporter, OpenError, ParsedProduct, Product};

fn main() -> sarmeta::Result<()> {
    let opener = |_: &Path| -> Result<Box<dyn Product>, OpenError> {
        Ok(Box::new(ParsedProduct {
            name: "RS2_20140101".to_string(),
            bands: vec![Band::new("VH"), Band::new("VV")],
            metadata: None,
        }))
    };
    let mut out = Vec::new();
    MetadataReporter::with_opener(opener).list_bands(
        Path::new("sample.img"),
        &FormatOptions::new(">"),
        &mut out,
    )?;
    assert_eq!(out, b">VH\n>VV\n");
    Ok(())
}
```

Feature flags
-------------
- `gdal` (default): fall back to GDAL for formats without a dedicated reader.

Useful modules
--------------
- [`report`] — the reporter and the line formatters.
- [`product`] — the `Product` interface and the closing `ProductHandle`.
- [`io`] — DIMAP, SAFE and GDAL readers.
- [`path`] — GDAL subdataset name resolution.
- [`error`] — crate-level `Error` and `Result`.
"#]

pub mod error;
pub mod io;
pub mod path;
pub mod product;
pub mod report;
pub mod types;

// Types
pub use error::{Error, OpenError, Result};
pub use product::{
    Band, MetadataAttribute, MetadataElement, ParsedProduct, Product, ProductHandle,
    ProductOpener,
};
pub use types::{FormatOptions, MetadataView};

// Readers
pub use io::{DimapReader, ProductFormat, ProductIo, SafeReader};

// Reporting
pub use report::{
    MetadataReporter, band_lines, list_bands, list_polarisations, parse_band_lines,
    pixel_spacing_lines, polarisation_lines, report_pixel_spacing,
};
