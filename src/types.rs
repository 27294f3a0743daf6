//! Shared types used across sarmeta: `FormatOptions` and `MetadataView`.
use clap::ValueEnum;

/// Literal value that turns on appending the product name to band lines
pub const APPEND_SENTINEL: &str = "True";

/// Separator between a band name and the appended product name
pub const PRODUCT_NAME_SEPARATOR: &str = "::";

/// Which piece of metadata to report
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum MetadataView {
    Bands,
    PixelSpacing,
    Polarisations,
}

impl std::fmt::Display for MetadataView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MetadataView::Bands => "bands",
            MetadataView::PixelSpacing => "pixel spacing",
            MetadataView::Polarisations => "polarisations",
        };
        write!(f, "{}", s)
    }
}

/// Formatting options for one invocation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Inserted before band names and between spacing fields
    pub delimiter: String,
    /// Append `::<product name>` to every band line
    pub append_product_name: bool,
}

impl FormatOptions {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            append_product_name: false,
        }
    }

    pub fn with_append_product_name(mut self, append: bool) -> Self {
        self.append_product_name = append;
        self
    }

    /// Build options from raw argument values. Only the exact string `"True"`
    /// enables appending.
    pub fn from_args(delimiter: Option<&str>, append_product_name: Option<&str>) -> Self {
        Self {
            delimiter: delimiter.unwrap_or_default().to_string(),
            append_product_name: append_product_name == Some(APPEND_SENTINEL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_sentinel_appends() {
        assert!(FormatOptions::from_args(None, Some("True")).append_product_name);
        for value in ["true", "TRUE", "", "False", "True "] {
            assert!(
                !FormatOptions::from_args(None, Some(value)).append_product_name,
                "{value:?} must not enable appending"
            );
        }
        assert!(!FormatOptions::from_args(None, None).append_product_name);
    }

    #[test]
    fn delimiter_defaults_to_empty() {
        assert_eq!(FormatOptions::from_args(None, None).delimiter, "");
        assert_eq!(FormatOptions::from_args(Some("|"), None).delimiter, "|");
    }
}
