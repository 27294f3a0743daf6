use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::Path;
use tracing::{info, warn};

use crate::error::OpenError;
use crate::product::{ABSTRACTED_METADATA, Band, MetadataAttribute, MetadataElement, ParsedProduct};

const ROOT_TAG: &str = "Dimap_Document";

/// Reader for BEAM-DIMAP (`.dim`) product headers.
///
/// Only the XML header is read: the dataset name, the band list from
/// `Spectral_Band_Info` and the `MDElem`/`MDATTR` metadata tree.
pub struct DimapReader;

impl DimapReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<ParsedProduct, OpenError> {
        let path = path.as_ref();
        let mut reader = Reader::from_file(path)?;
        reader.trim_text(true);
        let mut buf = Vec::new();
        let mut curr = String::new();
        let mut seen_root = false;
        let mut in_band_info = false;
        let mut dataset_name: Option<String> = None;
        let mut bands = Vec::new();

        // Open MDElem nodes, innermost last, and the MDATTR being read
        let mut stack: Vec<MetadataElement> = Vec::new();
        let mut roots: Vec<MetadataElement> = Vec::new();
        let mut pending: Option<MetadataAttribute> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    match tag.as_str() {
                        ROOT_TAG => seen_root = true,
                        "Spectral_Band_Info" => in_band_info = true,
                        "MDElem" => stack.push(MetadataElement::new(
                            attr(&reader, e, "name")?.unwrap_or_default(),
                        )),
                        "MDATTR" => pending = Some(md_attribute(&reader, e)?),
                        _ => {}
                    }
                    curr = tag;
                }
                Event::Empty(ref e) => match e.local_name().as_ref() {
                    b"MDElem" => {
                        let name = attr(&reader, e, "name")?.unwrap_or_default();
                        let element = MetadataElement::new(name);
                        attach(&mut stack, &mut roots, element);
                    }
                    b"MDATTR" => {
                        let attribute = md_attribute(&reader, e)?;
                        match stack.last_mut() {
                            Some(parent) => parent.add_attribute(attribute),
                            None => warn!("MDATTR {} outside MDElem", attribute.name),
                        }
                    }
                    _ => {}
                },
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"Spectral_Band_Info" => in_band_info = false,
                    b"MDElem" => {
                        if let Some(element) = stack.pop() {
                            attach(&mut stack, &mut roots, element);
                        }
                    }
                    b"MDATTR" => {
                        if let Some(attribute) = pending.take() {
                            match stack.last_mut() {
                                Some(parent) => parent.add_attribute(attribute),
                                None => warn!("MDATTR {} outside MDElem", attribute.name),
                            }
                        }
                    }
                    _ => {}
                },
                Event::Text(e) => {
                    let txt = e.unescape()?;
                    match curr.as_str() {
                        "DATASET_NAME" if dataset_name.is_none() => {
                            dataset_name = Some(txt.trim().to_string())
                        }
                        "BAND_NAME" if in_band_info => bands.push(Band::new(txt.trim())),
                        "MDATTR" => {
                            if let Some(attribute) = pending.as_mut() {
                                attribute.value.push_str(&txt);
                            }
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !seen_root {
            return Err(OpenError::Malformed(format!(
                "{} has no {} element",
                path.display(),
                ROOT_TAG
            )));
        }

        let name = match dataset_name {
            Some(name) if !name.is_empty() => name,
            _ => file_stem(path),
        };
        let metadata = roots
            .iter()
            .find_map(|root| root.find_element(ABSTRACTED_METADATA))
            .cloned();

        info!("DIMAP product {}: {} bands", name, bands.len());
        Ok(ParsedProduct {
            name,
            bands,
            metadata,
        })
    }
}

fn attach(stack: &mut [MetadataElement], roots: &mut Vec<MetadataElement>, element: MetadataElement) {
    match stack.last_mut() {
        Some(parent) => parent.add_element(element),
        None => roots.push(element),
    }
}

/// Attribute values are decoded with the encoding the header declares.
fn attr<B>(reader: &Reader<B>, e: &BytesStart, key: &str) -> Result<Option<String>, OpenError> {
    for a in e.attributes() {
        let a = a.map_err(OpenError::malformed)?;
        if a.key.as_ref() == key.as_bytes() {
            return Ok(Some(a.decode_and_unescape_value(reader)?.into_owned()));
        }
    }
    Ok(None)
}

fn md_attribute<B>(reader: &Reader<B>, e: &BytesStart) -> Result<MetadataAttribute, OpenError> {
    let name = attr(reader, e, "name")?.unwrap_or_default();
    let unit = attr(reader, e, "unit")?;
    Ok(MetadataAttribute::new(name, String::new(), unit.as_deref()))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Product;
    use std::fs;

    const HEADER: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<Dimap_Document name="subset.dim">
    <Dataset_Id>
        <DATASET_SERIES>BEAM-PRODUCT</DATASET_SERIES>
        <DATASET_NAME>S1A_IW_GRDH_1SDV_20150101_Cal</DATASET_NAME>
    </Dataset_Id>
    <Image_Interpretation>
        <Spectral_Band_Info>
            <BAND_INDEX>0</BAND_INDEX>
            <BAND_NAME>Sigma0_VH</BAND_NAME>
            <PHYSICAL_UNIT>intensity</PHYSICAL_UNIT>
        </Spectral_Band_Info>
        <Spectral_Band_Info>
            <BAND_INDEX>1</BAND_INDEX>
            <BAND_NAME>Sigma0_VV</BAND_NAME>
        </Spectral_Band_Info>
    </Image_Interpretation>
    <Dataset_Sources>
        <MDElem name="metadata">
            <MDElem name="Abstracted_Metadata">
                <MDATTR name="PRODUCT" type="ascii" mode="rw">S1A_IW_GRDH_1SDV_20150101</MDATTR>
                <MDATTR name="mds1_tx_rx_polar" type="ascii" mode="rw">VH</MDATTR>
                <MDATTR name="mds3_tx_rx_polar" type="ascii" mode="rw" />
                <MDATTR name="range_spacing" type="float64" unit="m" mode="rw">10.0</MDATTR>
                <MDATTR name="azimuth_spacing" type="float64" unit="m" mode="rw">10.0</MDATTR>
                <MDElem name="Orbit_State_Vectors" />
            </MDElem>
            <MDElem name="history" />
        </MDElem>
    </Dataset_Sources>
</Dimap_Document>
"#;

    fn write(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subset.dim");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_name_bands_and_abstracted_metadata() {
        let (_dir, path) = write(HEADER);
        let product = DimapReader::open(&path).unwrap();
        assert_eq!(product.name(), "S1A_IW_GRDH_1SDV_20150101_Cal");
        let names: Vec<_> = product.bands().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Sigma0_VH", "Sigma0_VV"]);

        let md = product.abstracted_metadata().unwrap();
        let range = md.attribute("range_spacing").unwrap();
        assert_eq!(range.value, "10.0");
        assert_eq!(range.unit.as_deref(), Some("m"));
        assert_eq!(md.attribute("mds3_tx_rx_polar").unwrap().value, "");
        assert!(md.element("Orbit_State_Vectors").is_some());
    }

    #[test]
    fn falls_back_to_file_stem_and_tolerates_missing_metadata() {
        let (_dir, path) = write(
            r#"<Dimap_Document><Image_Interpretation><Spectral_Band_Info>
               <BAND_NAME>band_1</BAND_NAME></Spectral_Band_Info></Image_Interpretation>
               </Dimap_Document>"#,
        );
        let product = DimapReader::open(&path).unwrap();
        assert_eq!(product.name(), "subset");
        assert_eq!(product.bands().len(), 1);
        assert!(product.abstracted_metadata().is_none());
    }

    #[test]
    fn honours_latin1_declaration() {
        let mut header = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<Dimap_Document>\n".to_vec();
        header.extend_from_slice(b"<Image_Interpretation><Spectral_Band_Info><BAND_NAME>VV</BAND_NAME>");
        header.extend_from_slice(b"<PHYSICAL_UNIT>\xB0</PHYSICAL_UNIT></Spectral_Band_Info></Image_Interpretation>\n");
        header.extend_from_slice(b"<Dataset_Sources><MDElem name=\"metadata\"><MDElem name=\"Abstracted_Metadata\">");
        header.extend_from_slice(b"<MDATTR name=\"incidence_near\" type=\"float64\" unit=\"\xB0\">30.5</MDATTR>");
        header.extend_from_slice(b"</MDElem></MDElem></Dataset_Sources></Dimap_Document>\n");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.dim");
        fs::write(&path, header).unwrap();

        let product = DimapReader::open(&path).unwrap();
        let names: Vec<_> = product.bands().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["VV"]);
        let incidence = product
            .abstracted_metadata()
            .and_then(|md| md.attribute("incidence_near"))
            .unwrap();
        assert_eq!(incidence.unit.as_deref(), Some("\u{b0}"));
    }

    #[test]
    fn rejects_non_dimap_xml() {
        let (_dir, path) = write("<kml><Document/></kml>");
        assert!(matches!(
            DimapReader::open(&path),
            Err(OpenError::Malformed(_))
        ));
    }
}
