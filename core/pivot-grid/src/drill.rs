//! FILENAME: core/pivot-grid/src/drill.rs
//! Drill intersection resolver.
//!
//! Describes "what this cell is" for drill handlers: one entry per mapping
//! header attached to the cell, in the order the headers were given.

use serde::{Deserialize, Serialize};
use execution::{Afm, MappingHeader, MeasureHeaderItem, ObjQualifier};
use crate::adapter::{ColumnKind, ColumnNode, GridModel, RowRecord};
use crate::col_id::get_attribute_element_id_from_uri;
use crate::error::{PivotGridError, Result};
use crate::logging::log_debug;

/// Addressable metadata object behind an intersection entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillHeader {
    pub uri: String,
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillIntersectionEntry {
    pub id: String,
    pub title: String,
    /// Absent for computed measures, which have no backing object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<DrillHeader>,
}

/// One cell of a drilled row, as handed to drill handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DrillRowValue {
    Header { id: String, name: String },
    Value(Option<String>),
}

// ============================================================================
// INTERSECTION
// ============================================================================

/// Maps each drill item to its intersection entry. No deduplication.
pub fn get_drill_intersection(drill_items: &[MappingHeader], afm: &Afm) -> Vec<DrillIntersectionEntry> {
    drill_items
        .iter()
        .map(|item| match item {
            MappingHeader::AttributeHeader(header) => DrillIntersectionEntry {
                id: header.identifier.clone(),
                title: header.name.clone(),
                header: Some(DrillHeader {
                    uri: header.uri.clone(),
                    identifier: header.identifier.clone(),
                }),
            },
            MappingHeader::AttributeHeaderItem(element) => DrillIntersectionEntry {
                id: get_attribute_element_id_from_uri(&element.uri)
                    .unwrap_or(&element.uri)
                    .to_string(),
                title: element.name.clone(),
                header: Some(DrillHeader {
                    uri: element.uri.clone(),
                    identifier: String::new(),
                }),
            },
            MappingHeader::MeasureHeaderItem(measure) => DrillIntersectionEntry {
                id: measure.local_identifier.clone(),
                title: measure.name.clone(),
                header: measure_drill_header(measure, afm),
            },
            MappingHeader::TotalHeaderItem(total) => DrillIntersectionEntry {
                id: total.total_type.clone(),
                title: total.name.clone(),
                header: None,
            },
        })
        .collect()
}

fn measure_drill_header(measure: &MeasureHeaderItem, afm: &Afm) -> Option<DrillHeader> {
    if measure.uri().is_some() || measure.identifier().is_some() {
        return Some(DrillHeader {
            uri: measure.uri().unwrap_or_default().to_string(),
            identifier: measure.identifier().unwrap_or_default().to_string(),
        });
    }
    match afm.measure_qualifier(&measure.local_identifier)? {
        ObjQualifier::Uri(uri) if !uri.is_empty() => Some(DrillHeader {
            uri: uri.clone(),
            identifier: String::new(),
        }),
        ObjQualifier::Identifier(identifier) if !identifier.is_empty() => Some(DrillHeader {
            uri: String::new(),
            identifier: identifier.clone(),
        }),
        _ => None,
    }
}

// ============================================================================
// CELL CONTEXT
// ============================================================================

/// Drill items of one cell: row context first, then the column's own items.
///
/// A row-attribute cell yields the attribute header followed by the row's
/// element. Any other cell yields every row element (each followed by its
/// attribute header) and then the column path.
pub fn cell_drill_items(model: &GridModel, row_index: usize, col_id: &str) -> Result<Vec<MappingHeader>> {
    let row = model.row(row_index).ok_or(PivotGridError::RowOutOfRange {
        row: row_index,
        row_count: model.row_data.len(),
    })?;
    let column = model
        .find_column(col_id)
        .ok_or_else(|| PivotGridError::UnknownColumn(col_id.to_string()))?;

    let mut items = Vec::new();
    if column.kind == ColumnKind::RowAttribute {
        items.extend(column.drill_items.iter().cloned());
        items.extend(row.header_item(col_id).cloned());
    } else {
        for row_column in model.row_attribute_columns() {
            if let Some(element) = row.header_item(&row_column.col_id) {
                items.push(element.clone());
                items.extend(row_column.drill_items.iter().cloned());
            }
        }
        items.extend(column.drill_items.iter().cloned());
    }

    log_debug!("DRILL", "cell ({}, {}) has {} drill items", row_index, col_id, items.len());
    Ok(items)
}

/// Row values in leaf-column order: header items as `{id, name}`, measure
/// cells as their raw value.
pub fn get_drill_row_data(leaf_columns: &[&ColumnNode], row: &RowRecord) -> Vec<DrillRowValue> {
    leaf_columns
        .iter()
        .map(|column| match row.header_item(&column.col_id) {
            Some(MappingHeader::AttributeHeaderItem(element)) => DrillRowValue::Header {
                id: get_attribute_element_id_from_uri(&element.uri)
                    .unwrap_or(&element.uri)
                    .to_string(),
                name: element.name.clone(),
            },
            Some(MappingHeader::TotalHeaderItem(total)) => DrillRowValue::Header {
                id: total.total_type.clone(),
                name: total.name.clone(),
            },
            Some(other) => DrillRowValue::Header {
                id: String::new(),
                name: other.name().to_string(),
            },
            None => DrillRowValue::Value(row.value(&column.col_id).map(str::to_string)),
        })
        .collect()
}
