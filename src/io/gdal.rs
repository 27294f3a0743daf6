use gdal::{Dataset, Metadata};
use std::path::Path;
use tracing::debug;

use crate::error::OpenError;
use crate::product::{Band, MetadataElement, Product};

/// Any raster GDAL can open (GeoTIFF, ENVI, NetCDF, HDF5, ...).
///
/// Bands are named after their GDAL description, or `band_<n>` when the
/// description is empty. GDAL has no abstracted metadata, so spacing and
/// polarisation reports come out empty for these products.
pub struct GdalProduct {
    dataset: Option<Dataset>,
    name: String,
    bands: Vec<Band>,
}

impl GdalProduct {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, OpenError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::open_named(path, name)
    }

    /// Open a dataset under an explicit display name. `dataset` may be any
    /// name GDAL understands, including subdatasets and `/vsi*/` paths.
    pub fn open_named<P: AsRef<Path>>(dataset: P, name: String) -> Result<Self, OpenError> {
        let dataset = Dataset::open(dataset.as_ref())?;
        let count = dataset.raster_count() as usize;
        let mut bands = Vec::with_capacity(count);
        for index in 1..=count {
            let band = dataset.rasterband(index)?;
            bands.push(Band::new(band_name(band.description().ok(), index)));
        }
        debug!("GDAL dataset {}: {} bands", name, count);
        Ok(GdalProduct {
            dataset: Some(dataset),
            name,
            bands,
        })
    }
}

fn band_name(description: Option<String>, index: usize) -> String {
    match description {
        Some(d) if !d.trim().is_empty() => d,
        _ => format!("band_{}", index),
    }
}

impl Product for GdalProduct {
    fn name(&self) -> &str {
        &self.name
    }

    fn bands(&self) -> &[Band] {
        &self.bands
    }

    fn abstracted_metadata(&self) -> Option<&MetadataElement> {
        None
    }

    fn close(&mut self) {
        if self.dataset.take().is_some() {
            debug!("Closed GDAL dataset {}", self.name);
        }
    }
}
