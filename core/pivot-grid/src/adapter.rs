//! FILENAME: core/pivot-grid/src/adapter.rs
//! Execution -> grid adapter.
//!
//! Turns an execution response (header metadata) and an execution result
//! (value matrix) into the column tree and the flat row records the grid
//! renders.
//!
//! Algorithm:
//! 1. One row-attribute column per attribute header on the row dimension
//! 2. For every result column, walk the column header levels outer to inner
//!    and insert the path into the column tree (only combinations present in
//!    the result materialize)
//! 3. For every result row, map row-attribute columns to their header items
//!    and measure leaves to the matrix values
//!
//! Shape mismatches never fail: cells that the matrix does not have become
//! `None`, columns whose header levels disagree are left out.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use execution::{
    AttributeHeader, DimensionHeader, ExecutionResponse, ExecutionResult, MappingHeader,
    ResultHeaderItem, COLUMN_DIMENSION, ROW_DIMENSION,
};
use crate::col_id::{encode, ColIdSegment};
use crate::logging::{log_debug, log_warn};
use crate::tree::{get_forest_leaves, index_of_forest_node_by, node_at_forest_path, TreeNode};

// ============================================================================
// COLUMN TREE
// ============================================================================

/// What a grid column stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Header column of a row attribute (values come from `header_item_map`).
    RowAttribute,
    /// Group header for one value of a column attribute.
    ColumnAttribute,
    /// Measure column (values come from the result matrix).
    Measure,
}

/// One node of the column tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnNode {
    /// Encoded path, unique within the tree.
    pub col_id: String,

    /// Render-time lookup key into a row record; equal to `col_id`.
    pub field: String,

    pub header_name: String,

    pub kind: ColumnKind,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ColumnNode>,

    /// Provenance, outermost context first.
    pub drill_items: Vec<MappingHeader>,

    /// Index into a result-matrix row (leaves of the column dimension only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_index: Option<usize>,
}

impl ColumnNode {
    fn new(
        col_id: String,
        header_name: String,
        kind: ColumnKind,
        drill_items: Vec<MappingHeader>,
    ) -> Self {
        ColumnNode {
            field: col_id.clone(),
            col_id,
            header_name,
            kind,
            children: Vec::new(),
            drill_items,
            column_index: None,
        }
    }

    fn row_attribute(header: &AttributeHeader) -> Self {
        let header_name = if header.form_of.name.is_empty() {
            header.name.clone()
        } else {
            header.form_of.name.clone()
        };
        ColumnNode::new(
            ColIdSegment::row_attribute(header).to_string(),
            header_name,
            ColumnKind::RowAttribute,
            vec![MappingHeader::AttributeHeader(header.clone())],
        )
    }

    /// Node carrying only an id, for id-based tree lookups.
    fn lookup_key(col_id: &str) -> Self {
        ColumnNode::new(col_id.to_string(), String::new(), ColumnKind::Measure, Vec::new())
    }
}

impl TreeNode for ColumnNode {
    fn children(&self) -> &[Self] {
        &self.children
    }
}

// ============================================================================
// ROW RECORDS
// ============================================================================

/// One grid row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRecord {
    /// Row-attribute column id -> header item of this row.
    pub header_item_map: FxHashMap<String, MappingHeader>,

    /// Leaf column id -> matrix value (`None` for missing cells).
    pub values: FxHashMap<String, Option<String>>,
}

impl RowRecord {
    pub fn header_item(&self, col_id: &str) -> Option<&MappingHeader> {
        self.header_item_map.get(col_id)
    }

    pub fn value(&self, col_id: &str) -> Option<&str> {
        self.values.get(col_id).and_then(|value| value.as_deref())
    }

    /// Text to render in a cell: header item name for attribute columns,
    /// the raw value for measure columns, `empty_text` otherwise.
    pub fn display_value<'a>(&'a self, col_id: &str, empty_text: &'a str) -> &'a str {
        if let Some(header) = self.header_item(col_id) {
            return header.name();
        }
        self.value(col_id).unwrap_or(empty_text)
    }

    /// Whether any row header of this row is a total.
    pub fn is_total(&self) -> bool {
        self.header_item_map.values().any(MappingHeader::is_total)
    }
}

// ============================================================================
// GRID MODEL
// ============================================================================

/// The column tree plus the rows built from one execution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridModel {
    /// Row-attribute columns followed by the column tree roots.
    pub column_defs: Vec<ColumnNode>,
    pub row_data: Vec<RowRecord>,
}

impl GridModel {
    /// Nothing to render.
    pub fn is_empty(&self) -> bool {
        self.column_defs.is_empty()
    }

    pub fn leaf_columns(&self) -> Vec<&ColumnNode> {
        get_forest_leaves(&self.column_defs)
    }

    pub fn row_attribute_columns(&self) -> impl Iterator<Item = &ColumnNode> {
        self.column_defs
            .iter()
            .filter(|column| column.kind == ColumnKind::RowAttribute)
    }

    pub fn row_attribute_col_ids(&self) -> Vec<String> {
        self.row_attribute_columns()
            .map(|column| column.col_id.clone())
            .collect()
    }

    /// Path of the column with this id (first index selects the root).
    pub fn column_path(&self, col_id: &str) -> Option<Vec<usize>> {
        let target = ColumnNode::lookup_key(col_id);
        index_of_forest_node_by(&target, &self.column_defs, |candidate, target| {
            candidate.col_id == target.col_id
        })
    }

    pub fn find_column(&self, col_id: &str) -> Option<&ColumnNode> {
        let path = self.column_path(col_id)?;
        node_at_forest_path(&self.column_defs, &path)
    }

    pub fn row(&self, index: usize) -> Option<&RowRecord> {
        self.row_data.get(index)
    }
}

// ============================================================================
// BUILDING
// ============================================================================

/// One level of a column path before it is merged into the tree.
struct ColumnPathStep {
    col_id: String,
    header_name: String,
    kind: ColumnKind,
    drill_items: Vec<MappingHeader>,
}

/// Builds the grid model from an execution response and result.
pub fn execution_to_grid_adapter(
    response: &ExecutionResponse,
    result: &ExecutionResult,
) -> GridModel {
    let row_columns = build_row_attribute_columns(response);
    let column_tree = build_column_tree(response, result);

    let leaves: Vec<(String, usize)> = get_forest_leaves(&column_tree)
        .into_iter()
        .filter_map(|leaf| leaf.column_index.map(|index| (leaf.col_id.clone(), index)))
        .collect();

    let row_data = build_rows(result, &row_columns, &leaves);

    log_debug!(
        "ADAPTER",
        "built {} row attribute columns, {} column leaves, {} rows",
        row_columns.len(),
        leaves.len(),
        row_data.len()
    );

    let mut column_defs: Vec<ColumnNode> = row_columns.into_iter().map(|(_, column)| column).collect();
    column_defs.extend(column_tree);

    GridModel { column_defs, row_data }
}

/// Row-attribute columns paired with the header level they read from.
fn build_row_attribute_columns(response: &ExecutionResponse) -> Vec<(usize, ColumnNode)> {
    let mut columns = Vec::new();
    for (level, header) in response.row_headers().iter().enumerate() {
        match header {
            DimensionHeader::AttributeHeader(attribute) => {
                columns.push((level, ColumnNode::row_attribute(attribute)));
            }
            DimensionHeader::MeasureGroupHeader(_) => {
                log_warn!("ADAPTER", "measure group on rows is not rendered as a column");
            }
        }
    }
    columns
}

fn build_column_tree(response: &ExecutionResponse, result: &ExecutionResult) -> Vec<ColumnNode> {
    let headers = response.column_headers();
    let levels = result.header_items(COLUMN_DIMENSION);
    if headers.is_empty() || levels.is_empty() {
        return Vec::new();
    }

    let column_count = levels.iter().map(Vec::len).min().unwrap_or(0);
    if levels.len() != headers.len() || levels.iter().any(|level| level.len() != column_count) {
        log_warn!(
            "ADAPTER",
            "column header shape mismatch: {} header levels, {} item levels; using {} columns",
            headers.len(),
            levels.len(),
            column_count
        );
    }

    let mut roots = ColumnLevel::default();
    for column in 0..column_count {
        match column_path(headers, levels, column) {
            Some(path) => roots.insert(&path, column),
            None => log_warn!("ADAPTER", "column {} has inconsistent header items, skipped", column),
        }
    }
    roots.into_nodes()
}

fn column_path(
    headers: &[DimensionHeader],
    levels: &[Vec<ResultHeaderItem>],
    column: usize,
) -> Option<Vec<ColumnPathStep>> {
    let mut segments = Vec::with_capacity(headers.len());
    let mut drill_items = Vec::new();
    let mut steps = Vec::with_capacity(headers.len());

    for (header, level_items) in headers.iter().zip(levels) {
        let (segment, header_name, kind) = match (header, level_items.get(column)?) {
            (DimensionHeader::AttributeHeader(attribute), ResultHeaderItem::AttributeHeaderItem(item)) => {
                let segment = ColIdSegment::attribute_element(&item.uri)?;
                drill_items.push(MappingHeader::AttributeHeaderItem(item.clone()));
                drill_items.push(MappingHeader::AttributeHeader(attribute.clone()));
                (segment, item.name.clone(), ColumnKind::ColumnAttribute)
            }
            (DimensionHeader::MeasureGroupHeader(group), ResultHeaderItem::MeasureHeaderItem(item)) => {
                let measure = group.measure(item.order)?;
                drill_items.push(MappingHeader::MeasureHeaderItem(measure.clone()));
                (ColIdSegment::measure(item.order), item.name.clone(), ColumnKind::Measure)
            }
            // Column totals and mismatched levels.
            _ => return None,
        };
        segments.push(segment);
        steps.push(ColumnPathStep {
            col_id: encode(&segments),
            header_name,
            kind,
            drill_items: drill_items.clone(),
        });
    }
    Some(steps)
}

/// Column tree under construction, with a col id index per sibling list.
#[derive(Default)]
struct ColumnLevel {
    nodes: Vec<ColumnNode>,
    children: Vec<ColumnLevel>,
    index: FxHashMap<String, usize>,
}

impl ColumnLevel {
    fn insert(&mut self, path: &[ColumnPathStep], column: usize) {
        let Some((step, rest)) = path.split_first() else {
            return;
        };
        let position = match self.index.get(&step.col_id) {
            Some(position) => *position,
            None => {
                self.nodes.push(ColumnNode::new(
                    step.col_id.clone(),
                    step.header_name.clone(),
                    step.kind,
                    step.drill_items.clone(),
                ));
                self.children.push(ColumnLevel::default());
                let position = self.nodes.len() - 1;
                self.index.insert(step.col_id.clone(), position);
                position
            }
        };
        if rest.is_empty() {
            let node = &mut self.nodes[position];
            if node.column_index.is_some() {
                log_warn!("ADAPTER", "duplicate column {} at index {}, keeping the first", node.col_id, column);
            } else {
                node.column_index = Some(column);
            }
        } else {
            self.children[position].insert(rest, column);
        }
    }

    fn into_nodes(self) -> Vec<ColumnNode> {
        self.nodes
            .into_iter()
            .zip(self.children)
            .map(|(mut node, children)| {
                node.children = children.into_nodes();
                node
            })
            .collect()
    }
}

fn build_rows(
    result: &ExecutionResult,
    row_columns: &[(usize, ColumnNode)],
    leaves: &[(String, usize)],
) -> Vec<RowRecord> {
    let levels = result.header_items(ROW_DIMENSION);
    let row_count = if row_columns.is_empty() {
        result.data.len()
    } else {
        row_columns
            .iter()
            .map(|(level, _)| levels.get(*level).map_or(0, Vec::len))
            .min()
            .unwrap_or(0)
    };
    if row_count < result.data.len() {
        log_warn!(
            "ADAPTER",
            "row header shape mismatch: headers describe {} rows, matrix has {}; extra rows dropped",
            row_count,
            result.data.len()
        );
    } else if row_count > result.data.len() {
        log_debug!(
            "ADAPTER",
            "row headers describe {} rows, matrix has {}; missing cells become empty",
            row_count,
            result.data.len()
        );
    }

    (0..row_count)
        .map(|row| {
            let mut header_item_map = FxHashMap::default();
            for (level, column) in row_columns {
                let header = match levels.get(*level).and_then(|items| items.get(row)) {
                    Some(ResultHeaderItem::AttributeHeaderItem(item)) => {
                        MappingHeader::AttributeHeaderItem(item.clone())
                    }
                    Some(ResultHeaderItem::TotalHeaderItem(total)) => {
                        MappingHeader::TotalHeaderItem(total.clone())
                    }
                    Some(ResultHeaderItem::MeasureHeaderItem(_)) | None => continue,
                };
                header_item_map.insert(column.col_id.clone(), header);
            }

            let values = leaves
                .iter()
                .map(|(col_id, column)| (col_id.clone(), result.cell(row, *column).map(str::to_string)))
                .collect();

            RowRecord { header_item_map, values }
        })
        .collect()
}
