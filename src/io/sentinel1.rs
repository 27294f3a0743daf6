use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::OpenError;
use crate::product::{ABSTRACTED_METADATA, Band, MetadataAttribute, MetadataElement, ParsedProduct};
use crate::report::{AZIMUTH_SPACING, POLARISATION_KEYS, RANGE_SPACING};

/// Metadata extracted from a SAFE directory
#[derive(Debug, Clone, Default)]
pub struct SafeMetadata {
    pub mission: String,
    pub product_type: String,
    pub instrument_mode: Option<String>,
    pub pass_direction: Option<String>,
    pub acquisition_start: Option<String>,
    pub polarizations: Vec<String>,
    /// Swath and polarisation of each annotation file, in file-name order
    pub swaths: Vec<(String, String)>,
    /// Spacing values as written in the first annotation file
    pub pixel_spacing_range: Option<String>,
    pub pixel_spacing_azimuth: Option<String>,
}

/// Reader for Sentinel-1 SAFE directories.
///
/// Band names follow the toolbox conventions: `Amplitude_<POL>` and
/// `Intensity_<POL>` for detected products, `i_`/`q_`/`Intensity_` per swath
/// for complex ones.
pub struct SafeReader;

impl SafeReader {
    pub fn open<P: AsRef<Path>>(safe_dir: P) -> Result<ParsedProduct, OpenError> {
        let base = safe_dir.as_ref().to_path_buf();
        let manifest = base.join("manifest.safe");
        if !manifest.is_file() {
            return Err(OpenError::Malformed(format!(
                "{} has no manifest.safe",
                base.display()
            )));
        }

        let mut meta = Self::parse_manifest_safe(&manifest, SafeMetadata::default())?;
        let annotation = base.join("annotation");
        if annotation.is_dir() {
            meta = Self::parse_annotation_files(&annotation, meta)?;
        } else {
            warn!("{:?} has no annotation directory", base);
        }

        let name = product_name(&base);
        let bands = bands_for(&meta);
        info!("SAFE product {}: {} bands", name, bands.len());
        Ok(ParsedProduct {
            metadata: Some(abstracted_metadata(&name, &meta)),
            name,
            bands,
        })
    }

    fn parse_manifest_safe(path: &Path, mut meta: SafeMetadata) -> Result<SafeMetadata, OpenError> {
        let mut reader = Reader::from_file(path)?;
        reader.trim_text(true);
        let mut buf = Vec::new();
        let mut curr = String::new();
        let mut in_platform_section = false;
        let mut in_acquisition_period = false;
        let mut in_orbit_properties = false;
        let mut in_standalone_product_info = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    match tag.as_str() {
                        "platform" => in_platform_section = true,
                        "acquisitionPeriod" => in_acquisition_period = true,
                        "orbitProperties" => in_orbit_properties = true,
                        "standAloneProductInformation" => in_standalone_product_info = true,
                        _ => {}
                    }
                    curr = tag;
                }
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"platform" => in_platform_section = false,
                    b"acquisitionPeriod" => in_acquisition_period = false,
                    b"orbitProperties" => in_orbit_properties = false,
                    b"standAloneProductInformation" => in_standalone_product_info = false,
                    _ => {}
                },
                Event::Text(e) => {
                    let txt = e.unescape()?;
                    match curr.as_str() {
                        "number" if in_platform_section && meta.mission.is_empty() => {
                            meta.mission = format!("SENTINEL-1{}", txt.trim())
                        }
                        "mode" if in_platform_section => {
                            meta.instrument_mode = Some(txt.to_string())
                        }
                        "startTime" if in_acquisition_period => {
                            meta.acquisition_start = Some(txt.to_string())
                        }
                        "pass" if in_orbit_properties => {
                            meta.pass_direction = Some(txt.to_uppercase())
                        }
                        "productType" if in_standalone_product_info => {
                            meta.product_type = txt.to_string()
                        }
                        "transmitterReceiverPolarisation" if in_standalone_product_info => {
                            meta.polarizations.push(txt.to_uppercase());
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(meta)
    }

    fn parse_annotation_files(
        annotation_path: &Path,
        mut meta: SafeMetadata,
    ) -> Result<SafeMetadata, OpenError> {
        let mut files: Vec<PathBuf> = fs::read_dir(annotation_path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        files.retain(|p| p.extension().is_some_and(|e| e == "xml"));
        files.sort();
        for path in files {
            meta = Self::parse_annotation_xml(&path, meta)?;
        }
        Ok(meta)
    }

    fn parse_annotation_xml(path: &Path, mut meta: SafeMetadata) -> Result<SafeMetadata, OpenError> {
        let mut reader = Reader::from_file(path)?;
        reader.trim_text(true);
        let mut buf = Vec::new();
        let mut curr = String::new();
        let mut in_ads_header = false;
        let mut in_image_information = false;
        let mut swath = None;
        let mut polarisation = None;
        let mut range_spacing = None;
        let mut azimuth_spacing = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    match tag.as_str() {
                        "adsHeader" => in_ads_header = true,
                        "imageInformation" => in_image_information = true,
                        _ => {}
                    }
                    curr = tag;
                }
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"adsHeader" => in_ads_header = false,
                    b"imageInformation" => in_image_information = false,
                    _ => {}
                },
                Event::Text(e) => {
                    let txt = e.unescape()?;
                    match curr.as_str() {
                        "missionId" if in_ads_header && meta.mission.is_empty() => {
                            meta.mission = txt.replace("S1", "SENTINEL-1")
                        }
                        "productType" if in_ads_header && meta.product_type.is_empty() => {
                            meta.product_type = txt.to_string()
                        }
                        "mode" if in_ads_header && meta.instrument_mode.is_none() => {
                            meta.instrument_mode = Some(txt.to_string())
                        }
                        "swath" if in_ads_header => swath = Some(txt.to_string()),
                        "polarisation" if in_ads_header => {
                            polarisation = Some(txt.to_uppercase())
                        }
                        "rangePixelSpacing" if in_image_information => {
                            range_spacing = Some(txt.trim().to_string())
                        }
                        "azimuthPixelSpacing" if in_image_information => {
                            azimuth_spacing = Some(txt.trim().to_string())
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let (Some(swath), Some(pol)) = (swath, polarisation) {
            if !meta.polarizations.contains(&pol) {
                meta.polarizations.push(pol.clone());
            }
            meta.swaths.push((swath, pol));
        }
        // Complex products carry one annotation per swath; the first one wins.
        if meta.pixel_spacing_range.is_none() {
            meta.pixel_spacing_range = range_spacing;
        }
        if meta.pixel_spacing_azimuth.is_none() {
            meta.pixel_spacing_azimuth = azimuth_spacing;
        }
        Ok(meta)
    }
}

fn product_name(base: &Path) -> String {
    let name = base
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(".SAFE") {
        Some(stem) => stem.to_string(),
        None => name,
    }
}

fn is_complex(meta: &SafeMetadata) -> bool {
    meta.product_type.eq_ignore_ascii_case("SLC")
}

fn bands_for(meta: &SafeMetadata) -> Vec<Band> {
    if is_complex(meta) {
        meta.swaths
            .iter()
            .flat_map(|(swath, pol)| {
                ["i", "q", "Intensity"].map(|part| Band::new(format!("{part}_{swath}_{pol}")))
            })
            .collect()
    } else {
        meta.polarizations
            .iter()
            .flat_map(|pol| {
                [
                    Band::new(format!("Amplitude_{pol}")),
                    Band::new(format!("Intensity_{pol}")),
                ]
            })
            .collect()
    }
}

fn abstracted_metadata(name: &str, meta: &SafeMetadata) -> MetadataElement {
    let mut md = MetadataElement::new(ABSTRACTED_METADATA);
    md.add_attribute(MetadataAttribute::new("PRODUCT", name, None));
    md.add_attribute(MetadataAttribute::new("PRODUCT_TYPE", &meta.product_type, None));
    md.add_attribute(MetadataAttribute::new("MISSION", &meta.mission, None));
    if let Some(mode) = &meta.instrument_mode {
        md.add_attribute(MetadataAttribute::new("ACQUISITION_MODE", mode, None));
    }
    if let Some(pass) = &meta.pass_direction {
        md.add_attribute(MetadataAttribute::new("PASS", pass, None));
    }
    if let Some(start) = &meta.acquisition_start {
        md.add_attribute(MetadataAttribute::new("first_line_time", start, Some("utc")));
    }
    for (key, pol) in POLARISATION_KEYS.iter().zip(&meta.polarizations) {
        md.add_attribute(MetadataAttribute::new(*key, pol, None));
    }
    if let Some(range) = &meta.pixel_spacing_range {
        md.add_attribute(MetadataAttribute::new(RANGE_SPACING, range, Some("m")));
    }
    if let Some(azimuth) = &meta.pixel_spacing_azimuth {
        md.add_attribute(MetadataAttribute::new(AZIMUTH_SPACING, azimuth, Some("m")));
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Product;

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xfdu:XFDU xmlns:xfdu="urn:ccsds:schema:xfdu:1" xmlns:safe="http://www.esa.int/safe/sentinel-1.0"
           xmlns:s1sarl1="http://www.esa.int/safe/sentinel-1.0/sentinel-1/sar/level-1">
  <metadataSection>
    <metadataObject ID="platform">
      <metadataWrap><xmlData>
        <safe:platform>
          <safe:familyName>SENTINEL-1</safe:familyName>
          <safe:number>A</safe:number>
          <safe:instrument><safe:extension><s1sarl1:instrumentMode>
            <s1sarl1:mode>IW</s1sarl1:mode>
          </s1sarl1:instrumentMode></safe:extension></safe:instrument>
        </safe:platform>
      </xmlData></metadataWrap>
    </metadataObject>
    <metadataObject ID="measurementOrbitReference">
      <metadataWrap><xmlData><safe:orbitReference>
        <safe:extension><s1:orbitProperties xmlns:s1="http://www.esa.int/safe/sentinel-1.0/sentinel-1">
          <s1:pass>ASCENDING</s1:pass>
        </s1:orbitProperties></safe:extension>
      </safe:orbitReference></xmlData></metadataWrap>
    </metadataObject>
    <metadataObject ID="generalProductInformation">
      <metadataWrap><xmlData>
        <s1sarl1:standAloneProductInformation>
          <s1sarl1:productType>GRD</s1sarl1:productType>
          <s1sarl1:transmitterReceiverPolarisation>VV</s1sarl1:transmitterReceiverPolarisation>
          <s1sarl1:transmitterReceiverPolarisation>VH</s1sarl1:transmitterReceiverPolarisation>
        </s1sarl1:standAloneProductInformation>
      </xmlData></metadataWrap>
    </metadataObject>
  </metadataSection>
</xfdu:XFDU>
"#;

    fn annotation(swath: &str, pol: &str, range: &str) -> String {
        format!(
            r#"<product>
  <adsHeader><missionId>S1A</missionId><productType>GRD</productType>
    <polarisation>{pol}</polarisation><mode>IW</mode><swath>{swath}</swath></adsHeader>
  <imageAnnotation><imageInformation>
    <rangePixelSpacing>{range}</rangePixelSpacing>
    <azimuthPixelSpacing>1.000000e+01</azimuthPixelSpacing>
  </imageInformation></imageAnnotation>
</product>"#
        )
    }

    fn safe_dir(manifest: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let safe = dir.path().join("S1A_IW_GRDH_1SDV_20150101.SAFE");
        fs::create_dir_all(safe.join("annotation")).unwrap();
        fs::write(safe.join("manifest.safe"), manifest).unwrap();
        (dir, safe)
    }

    #[test]
    fn grd_product_bands_and_spacing() {
        let (_dir, safe) = safe_dir(MANIFEST);
        fs::write(
            safe.join("annotation/s1a-iw-grd-vh-001.xml"),
            annotation("IW", "VH", "1.000000e+01"),
        )
        .unwrap();
        fs::write(
            safe.join("annotation/s1a-iw-grd-vv-002.xml"),
            annotation("IW", "VV", "1.000000e+01"),
        )
        .unwrap();

        let product = SafeReader::open(&safe).unwrap();
        assert_eq!(product.name(), "S1A_IW_GRDH_1SDV_20150101");
        let names: Vec<_> = product.bands().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(
            names,
            ["Amplitude_VV", "Intensity_VV", "Amplitude_VH", "Intensity_VH"]
        );

        let md = product.abstracted_metadata().unwrap();
        assert_eq!(md.attribute("MISSION").unwrap().value, "SENTINEL-1A");
        assert_eq!(md.attribute("PASS").unwrap().value, "ASCENDING");
        assert_eq!(md.attribute("mds1_tx_rx_polar").unwrap().value, "VV");
        assert_eq!(md.attribute("mds2_tx_rx_polar").unwrap().value, "VH");
        let range = md.attribute(RANGE_SPACING).unwrap();
        assert_eq!(range.value, "1.000000e+01");
        assert_eq!(range.unit.as_deref(), Some("m"));
        assert!(md.attribute(AZIMUTH_SPACING).is_some());
    }

    #[test]
    fn slc_bands_are_per_swath() {
        let manifest = MANIFEST.replace(">GRD<", ">SLC<");
        let (_dir, safe) = safe_dir(&manifest);
        fs::write(
            safe.join("annotation/s1a-iw1-slc-vv-004.xml"),
            annotation("IW1", "VV", "2.329562e+00"),
        )
        .unwrap();
        fs::write(
            safe.join("annotation/s1a-iw2-slc-vv-005.xml"),
            annotation("IW2", "VV", "2.329562e+00"),
        )
        .unwrap();

        let product = SafeReader::open(&safe).unwrap();
        let names: Vec<_> = product.bands().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "i_IW1_VV",
                "q_IW1_VV",
                "Intensity_IW1_VV",
                "i_IW2_VV",
                "q_IW2_VV",
                "Intensity_IW2_VV"
            ]
        );
    }

    #[test]
    fn without_annotations_spacing_is_absent() {
        let (_dir, safe) = safe_dir(MANIFEST);
        fs::remove_dir(safe.join("annotation")).unwrap();
        let product = SafeReader::open(&safe).unwrap();
        let md = product.abstracted_metadata().unwrap();
        assert!(md.attribute(RANGE_SPACING).is_none());
        assert_eq!(product.bands().len(), 4);
    }

    #[test]
    fn directory_without_manifest_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SafeReader::open(dir.path()),
            Err(OpenError::Malformed(_))
        ));
    }
}
