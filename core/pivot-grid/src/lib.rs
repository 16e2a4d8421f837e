//! FILENAME: core/pivot-grid/src/lib.rs
//! Pivot grid adapter.
//!
//! Turns an analytical execution (response + result) into the column tree
//! and row records a data grid renders, and maps grid interactions back to
//! analytical terms.
//!
//! Layers:
//! - `col_id`: Column id codec (how a column names its header path)
//! - `tree`: Depth-first helpers over the column tree
//! - `adapter`: Execution -> grid model (WHAT we display)
//! - `drill`: Cell -> drill intersection
//! - `sort`: Grid sort model <-> sort items
//! - `grouping`: Row grouping decision and spans
//! - `table`: Versioned facade tying the above together

mod logging;

pub mod error;
pub mod col_id;
pub mod tree;
pub mod adapter;
pub mod drill;
pub mod sort;
pub mod grouping;
pub mod table;

pub use error::{PivotGridError, Result};
pub use col_id::{
    decode, encode, escape_token, get_attribute_element_id_from_uri, get_parsed_fields, unescape_token, ColIdSegment,
    ParsedField,
};
pub use tree::{
    get_forest_leaves, get_tree_leaves, index_of_forest_node, index_of_forest_node_by,
    index_of_tree_node, index_of_tree_node_by, node_at_forest_path, node_at_path, TreeNode,
};
pub use adapter::{execution_to_grid_adapter, ColumnKind, ColumnNode, GridModel, RowRecord};
pub use drill::{
    cell_drill_items, get_drill_intersection, get_drill_row_data, DrillHeader,
    DrillIntersectionEntry, DrillRowValue,
};
pub use sort::{get_sort_item_by_col_id, get_sort_model_from_sort_items, get_sorts_from_model, SortModelEntry};
pub use grouping::{
    is_sorted_by_first_attribute, next_grouping_state, AttributeGroupingProvider,
    DefaultGroupingProvider, GroupingInput, GroupingProvider, GroupingProviderFactory,
    GroupingState, RowGroupingEngine, RowSpan,
};
pub use table::{DrillEvent, PivotTable, PivotTableConfig, UpdateTicket};
