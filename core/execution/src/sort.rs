//! FILENAME: core/execution/src/sort.rs
//! Sort items understood by the query engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction shared by the grid sort model and the query engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Asc
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Sort rows by the values of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSortItem {
    pub attribute_identifier: String,
    pub direction: SortDirection,
    /// Sort by an aggregation of the measures instead of the attribute values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
}

/// Sort rows by the values of one measure column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureSortItem {
    pub direction: SortDirection,
    /// Address of the column: attribute elements outer to inner, then the measure.
    pub locators: Vec<LocatorItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortItem {
    AttributeSortItem(AttributeSortItem),
    MeasureSortItem(MeasureSortItem),
}

impl SortItem {
    pub fn attribute(attribute_identifier: impl Into<String>, direction: SortDirection) -> Self {
        SortItem::AttributeSortItem(AttributeSortItem {
            attribute_identifier: attribute_identifier.into(),
            direction,
            aggregation: None,
        })
    }

    pub fn direction(&self) -> SortDirection {
        match self {
            SortItem::AttributeSortItem(item) => item.direction,
            SortItem::MeasureSortItem(item) => item.direction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeLocatorItem {
    pub attribute_identifier: String,
    /// Element uri, `<attribute uri>/elements?id=<element id>`.
    pub element: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureLocatorItem {
    pub measure_identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocatorItem {
    AttributeLocatorItem(AttributeLocatorItem),
    MeasureLocatorItem(MeasureLocatorItem),
}
