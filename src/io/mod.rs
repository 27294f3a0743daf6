//! Product readers.
//! `dimap` reads BEAM-DIMAP headers, `sentinel1` reads SAFE directories and
//! `gdal` (feature `gdal`) covers any other raster GDAL can open. `ProductIo`
//! picks the reader for a path.
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::OpenError;
use crate::path;
use crate::product::{Product, ProductOpener};

pub mod dimap;
pub use dimap::DimapReader;

pub mod sentinel1;
pub use sentinel1::SafeReader;

#[cfg(feature = "gdal")]
pub mod gdal;
#[cfg(feature = "gdal")]
pub use self::gdal::GdalProduct;

const SAFE_MANIFEST: &str = "manifest.safe";

/// Product formats with a dedicated reader
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ProductFormat {
    Dimap,
    Safe,
    Gdal,
}

/// Decide which reader handles `path`. Returns the format together with the
/// path that reader expects (the SAFE directory for a `manifest.safe` file).
pub fn detect(path: &Path) -> Option<(ProductFormat, PathBuf)> {
    if path.is_dir() {
        if path.join(SAFE_MANIFEST).is_file() {
            return Some((ProductFormat::Safe, path.to_path_buf()));
        }
        return None;
    }
    if path.file_name().is_some_and(|n| n == SAFE_MANIFEST) {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        return Some((ProductFormat::Safe, dir.to_path_buf()));
    }
    let is_dim = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("dim"));
    if is_dim {
        return Some((ProductFormat::Dimap, path.to_path_buf()));
    }
    if cfg!(feature = "gdal") {
        Some((ProductFormat::Gdal, path.to_path_buf()))
    } else {
        None
    }
}

/// Default opener. GDAL dataset names (`SENTINEL2_L1C:...`, `/vsizip/...`) go
/// to GDAL first; otherwise the name is resolved to a file and dispatched on
/// format.
#[derive(Copy, Clone, Debug, Default)]
pub struct ProductIo;

impl ProductIo {
    pub fn read_product(path: &Path) -> Result<Box<dyn Product>, OpenError> {
        let raw = path.to_string_lossy();
        let resolved = path::resolve(&raw);
        if let Some(format) = &resolved.format {
            debug!("{:?} names reader format {}", path, format);
        }
        if path::is_gdal_dataset_name(&raw) {
            if let Some(product) = open_dataset_name(&raw, &resolved.path) {
                return Ok(product);
            }
        }
        let path = resolved.path;
        if !path.exists() {
            return Err(OpenError::NotFound(path));
        }
        let Some((format, path)) = detect(&path) else {
            return Err(OpenError::Unsupported(path));
        };
        debug!("Reading {:?} as {:?}", path, format);
        match format {
            ProductFormat::Dimap => Ok(Box::new(DimapReader::open(&path)?)),
            ProductFormat::Safe => Ok(Box::new(SafeReader::open(&path)?)),
            #[cfg(feature = "gdal")]
            ProductFormat::Gdal => Ok(Box::new(GdalProduct::open(&path)?)),
            #[cfg(not(feature = "gdal"))]
            ProductFormat::Gdal => Err(OpenError::Unsupported(path)),
        }
    }
}

/// Hand a GDAL-only name to GDAL as is, displayed under the resolved file's stem
#[cfg(feature = "gdal")]
fn open_dataset_name(raw: &str, resolved: &Path) -> Option<Box<dyn Product>> {
    let name = resolved
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match GdalProduct::open_named(raw, name) {
        Ok(product) => Some(Box::new(product)),
        Err(e) => {
            debug!("GDAL could not open {}: {}", raw, e);
            None
        }
    }
}

#[cfg(not(feature = "gdal"))]
fn open_dataset_name(raw: &str, _resolved: &Path) -> Option<Box<dyn Product>> {
    debug!("{} needs GDAL, trying it as a file", raw);
    None
}

impl ProductOpener for ProductIo {
    fn open(&self, path: &Path) -> Result<Box<dyn Product>, OpenError> {
        Self::read_product(path)
    }
}
