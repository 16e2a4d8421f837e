//! FILENAME: core/execution/src/result.rs
//! Execution response and execution result.
//!
//! The response describes the shape (which headers sit in which dimension),
//! the result carries the value matrix plus the concrete header items for
//! every row and column of that matrix.

use serde::{Deserialize, Serialize};
use crate::headers::{AttributeHeader, MeasureHeaderItem};
use crate::{COLUMN_DIMENSION, ROW_DIMENSION};

// ============================================================================
// RESPONSE
// ============================================================================

/// Wrapper matching the `{"measureHeaderItem": {...}}` shape of measure group items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureGroupItem {
    pub measure_header_item: MeasureHeaderItem,
}

/// All measures of a result, in result order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureGroupHeader {
    pub items: Vec<MeasureGroupItem>,
}

impl MeasureGroupHeader {
    pub fn measure(&self, index: usize) -> Option<&MeasureHeaderItem> {
        self.items.get(index).map(|item| &item.measure_header_item)
    }

    pub fn position_of(&self, local_identifier: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.measure_header_item.local_identifier == local_identifier)
    }
}

/// One header level of a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DimensionHeader {
    AttributeHeader(AttributeHeader),
    MeasureGroupHeader(MeasureGroupHeader),
}

impl DimensionHeader {
    pub fn as_attribute(&self) -> Option<&AttributeHeader> {
        match self {
            DimensionHeader::AttributeHeader(header) => Some(header),
            DimensionHeader::MeasureGroupHeader(_) => None,
        }
    }

    pub fn as_measure_group(&self) -> Option<&MeasureGroupHeader> {
        match self {
            DimensionHeader::MeasureGroupHeader(group) => Some(group),
            DimensionHeader::AttributeHeader(_) => None,
        }
    }
}

/// Header levels of one dimension, outer to inner.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultDimension {
    pub headers: Vec<DimensionHeader>,
}

/// Header metadata of an execution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponse {
    pub dimensions: Vec<ResultDimension>,
}

impl ExecutionResponse {
    /// Header levels of the given dimension; empty if the dimension is absent.
    pub fn headers(&self, dimension: usize) -> &[DimensionHeader] {
        self.dimensions
            .get(dimension)
            .map(|dim| dim.headers.as_slice())
            .unwrap_or(&[])
    }

    pub fn row_headers(&self) -> &[DimensionHeader] {
        self.headers(ROW_DIMENSION)
    }

    pub fn column_headers(&self) -> &[DimensionHeader] {
        self.headers(COLUMN_DIMENSION)
    }

    /// Attribute headers placed on rows, outer to inner.
    pub fn row_attribute_headers(&self) -> impl Iterator<Item = &AttributeHeader> {
        self.row_headers().iter().filter_map(DimensionHeader::as_attribute)
    }

    /// The measure group of a dimension, if measures are placed there.
    pub fn measure_group(&self, dimension: usize) -> Option<&MeasureGroupHeader> {
        self.headers(dimension)
            .iter()
            .find_map(DimensionHeader::as_measure_group)
    }
}

// ============================================================================
// RESULT
// ============================================================================

/// Measure entry of the result header items: only the position in the measure group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMeasureHeaderItem {
    pub name: String,
    pub order: usize,
}

/// Concrete header item for one row or column of the result matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultHeaderItem {
    AttributeHeaderItem(crate::headers::AttributeHeaderItem),
    MeasureHeaderItem(ResultMeasureHeaderItem),
    TotalHeaderItem(crate::headers::TotalHeaderItem),
}

/// Paging window of a result when it is fetched in pages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub count: Vec<usize>,
    pub offset: Vec<usize>,
    pub total: Vec<usize>,
}

/// The value matrix plus its header items.
///
/// `header_items[dimension][level][index]`: one list per header level of
/// each dimension, aligned with the rows (dimension 0) or columns
/// (dimension 1) of `data`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub data: Vec<Vec<Option<String>>>,
    #[serde(default)]
    pub header_items: Vec<Vec<Vec<ResultHeaderItem>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

impl ExecutionResult {
    /// Header item levels of a dimension; empty if absent.
    pub fn header_items(&self, dimension: usize) -> &[Vec<ResultHeaderItem>] {
        self.header_items
            .get(dimension)
            .map(|levels| levels.as_slice())
            .unwrap_or(&[])
    }

    /// Value at (row, column), `None` when the matrix has no such cell.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.data.get(row)?.get(column)?.as_deref()
    }

    /// Absolute index of the first row of this result page.
    pub fn row_offset(&self) -> usize {
        self.paging
            .as_ref()
            .and_then(|paging| paging.offset.first().copied())
            .unwrap_or(0)
    }
}
