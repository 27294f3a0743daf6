//! Read-only view of an opened raster product.
//!
//! Readers in [`crate::io`] turn a path into a `Box<dyn Product>`; the reporter
//! only ever sees this trait. [`ProductHandle`] owns an opened product for the
//! duration of one report and closes it exactly once.
use std::ops::Deref;
use std::path::Path;

use tracing::debug;

use crate::error::OpenError;

/// Name of the metadata element holding the toolbox-normalised attributes.
pub const ABSTRACTED_METADATA: &str = "Abstracted_Metadata";

/// A named band of a product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Band {
    pub name: String,
}

impl Band {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A leaf value in a product's metadata tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataAttribute {
    pub name: String,
    /// Value as text, exactly as the product stores it
    pub value: String,
    /// Physical unit, if the product declares one
    pub unit: Option<String>,
}

impl MetadataAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>, unit: Option<&str>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            unit: unit.map(str::to_string),
        }
    }

    /// Unit text, empty when undeclared
    pub fn unit_or_empty(&self) -> &str {
        self.unit.as_deref().unwrap_or("")
    }
}

/// A node of the metadata tree: ordered attributes plus nested elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataElement {
    pub name: String,
    attributes: Vec<MetadataAttribute>,
    elements: Vec<MetadataElement>,
}

impl MetadataElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_attribute(&mut self, attribute: MetadataAttribute) {
        self.attributes.push(attribute);
    }

    pub fn add_element(&mut self, element: MetadataElement) {
        self.elements.push(element);
    }

    pub fn with_attribute(mut self, attribute: MetadataAttribute) -> Self {
        self.add_attribute(attribute);
        self
    }

    /// First attribute whose name matches `key` exactly
    pub fn attribute(&self, key: &str) -> Option<&MetadataAttribute> {
        self.attributes.iter().find(|a| a.name == key)
    }

    /// First direct child element named `name`
    pub fn element(&self, name: &str) -> Option<&MetadataElement> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Depth-first search for an element named `name`, including `self`
    pub fn find_element(&self, name: &str) -> Option<&MetadataElement> {
        if self.name == name {
            return Some(self);
        }
        self.elements.iter().find_map(|e| e.find_element(name))
    }

    pub fn attributes(&self) -> &[MetadataAttribute] {
        &self.attributes
    }

    pub fn elements(&self) -> &[MetadataElement] {
        &self.elements
    }
}

/// An opened product, as exposed by a reader
pub trait Product {
    /// Display name of the product
    fn name(&self) -> &str;

    /// Bands in declaration order
    fn bands(&self) -> &[Band];

    /// The abstracted metadata element, when the reader can supply one
    fn abstracted_metadata(&self) -> Option<&MetadataElement>;

    /// Release any resources held by the reader
    fn close(&mut self) {}
}

/// Turns a path into an opened product
pub trait ProductOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn Product>, OpenError>;
}

impl<F> ProductOpener for F
where
    F: Fn(&Path) -> Result<Box<dyn Product>, OpenError>,
{
    fn open(&self, path: &Path) -> Result<Box<dyn Product>, OpenError> {
        self(path)
    }
}

/// A product whose headers were fully parsed at open time
#[derive(Debug, Clone, Default)]
pub struct ParsedProduct {
    pub name: String,
    pub bands: Vec<Band>,
    pub metadata: Option<MetadataElement>,
}

impl Product for ParsedProduct {
    fn name(&self) -> &str {
        &self.name
    }

    fn bands(&self) -> &[Band] {
        &self.bands
    }

    fn abstracted_metadata(&self) -> Option<&MetadataElement> {
        self.metadata.as_ref()
    }
}

/// Scoped owner of an opened product.
///
/// The product is closed when the handle is dropped, or earlier via
/// [`ProductHandle::close`]; either way `Product::close` runs exactly once.
pub struct ProductHandle {
    inner: Box<dyn Product>,
    closed: bool,
}

impl ProductHandle {
    pub fn new(inner: Box<dyn Product>) -> Self {
        Self {
            inner,
            closed: false,
        }
    }

    /// Close the product now instead of at end of scope
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            debug!("Closing product {}", self.inner.name());
            self.inner.close();
        }
    }
}

impl Deref for ProductHandle {
    type Target = dyn Product;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl Drop for ProductHandle {
    fn drop(&mut self) {
        self.release();
    }
}
