//! FILENAME: core/execution/src/headers.rs
//! Header metadata attached to grid cells and columns.
//!
//! Every cell and every column carries an ordered list of `MappingHeader`s
//! describing where it came from, outermost context first.

use serde::{Deserialize, Serialize};

// ============================================================================
// ATTRIBUTE HEADERS
// ============================================================================

/// The attribute a display form belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeFormOf {
    pub uri: String,
    pub identifier: String,
    pub name: String,
}

/// Identifies one attribute dimension (through its display form).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeHeader {
    /// Local identifier used by sort items and locators.
    pub local_identifier: String,

    /// Display form identifier.
    pub identifier: String,

    /// Display form uri.
    pub uri: String,

    /// Display form title.
    pub name: String,

    pub form_of: AttributeFormOf,

    /// Totals requested for this attribute.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub total_items: Vec<TotalHeaderItem>,
}

impl AttributeHeader {
    pub fn display_form_uri(&self) -> &str {
        &self.uri
    }

    /// Uri of the attribute itself; element uris are built from it.
    pub fn attribute_uri(&self) -> &str {
        &self.form_of.uri
    }
}

/// One concrete value of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeHeaderItem {
    pub uri: String,
    pub name: String,
}

impl AttributeHeaderItem {
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        AttributeHeaderItem {
            uri: uri.into(),
            name: name.into(),
        }
    }
}

// ============================================================================
// MEASURE AND TOTAL HEADERS
// ============================================================================

/// One measure instance in a result.
///
/// `uri` and `identifier` are absent for computed measures (arithmetic
/// measures have no backing metadata object).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureHeaderItem {
    pub local_identifier: String,
    pub name: String,
    #[serde(default)]
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl MeasureHeaderItem {
    /// Uri if present and non-empty.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref().filter(|uri| !uri.is_empty())
    }

    /// Identifier if present and non-empty.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref().filter(|id| !id.is_empty())
    }
}

/// A total (subtotal or grand total) header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalHeaderItem {
    pub name: String,
    /// Total function, e.g. "sum", "avg", "max".
    #[serde(rename = "type")]
    pub total_type: String,
}

// ============================================================================
// MAPPING HEADER
// ============================================================================

/// Provenance of a grid cell or column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MappingHeader {
    AttributeHeader(AttributeHeader),
    AttributeHeaderItem(AttributeHeaderItem),
    MeasureHeaderItem(MeasureHeaderItem),
    TotalHeaderItem(TotalHeaderItem),
}

impl MappingHeader {
    /// Display name of the header.
    pub fn name(&self) -> &str {
        match self {
            MappingHeader::AttributeHeader(header) => &header.name,
            MappingHeader::AttributeHeaderItem(item) => &item.name,
            MappingHeader::MeasureHeaderItem(item) => &item.name,
            MappingHeader::TotalHeaderItem(item) => &item.name,
        }
    }

    pub fn as_attribute_item(&self) -> Option<&AttributeHeaderItem> {
        match self {
            MappingHeader::AttributeHeaderItem(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_total(&self) -> bool {
        matches!(self, MappingHeader::TotalHeaderItem(_))
    }
}
