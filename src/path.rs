//! Resolve GDAL-style dataset names to plain product paths.
//!
//! GDAL exposes Sentinel-2 products as subdatasets such as
//! `SENTINEL2_L1C:/vsizip/S2A.zip/MTD_MSIL1C.xml:10m:EPSG_32633`. Product readers
//! want the metadata file itself, and the UTM zone in the suffix names the
//! multi-resolution reader format.
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

static SENTINEL2_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^SENTINEL2_L[123][ABC](_TILE)?:(/vsizip/)?(.[:]?[^:]+):([^:]*):?(.*)").unwrap()
});

/// A driver prefix (`NETCDF:`, `SENTINEL2_L1C:`, `GTIFF_DIR:`) or a `/vsi*/` virtual file system
static GDAL_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(/vsi[a-z0-9_]+/|[A-Za-z][A-Za-z0-9_]+:)").unwrap());

/// A path ready to hand to a product reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPath {
    pub path: PathBuf,
    /// Reader format implied by the dataset name, if any
    pub format: Option<String>,
}

/// Strip GDAL subdataset decoration from `gdal_path`. Anything that is not a
/// Sentinel-2 subdataset name is returned unchanged.
pub fn resolve(gdal_path: &str) -> ProductPath {
    match SENTINEL2_RE.captures(gdal_path) {
        Some(caps) => ProductPath {
            path: PathBuf::from(&caps[3]),
            format: caps.get(5).and_then(|proj| sentinel2_format(proj.as_str())),
        },
        None => ProductPath {
            path: PathBuf::from(gdal_path),
            format: None,
        },
    }
}

/// Whether `name` only makes sense to GDAL: a subdataset name or a virtual
/// file system path. Windows drive letters (`C:`) do not count.
pub fn is_gdal_dataset_name(name: &str) -> bool {
    GDAL_NAME_RE.is_match(name)
}

/// `EPSG_326zz` is UTM north, `EPSG_327zz` UTM south
fn sentinel2_format(proj: &str) -> Option<String> {
    let hemisphere = match proj.as_bytes().get(7)? {
        b'6' => 'N',
        _ => 'S',
    };
    let zone = proj.get(8..10)?;
    Some(format!("SENTINEL-2-MSI-MultiRes-UTM{}{}", zone, hemisphere))
}
