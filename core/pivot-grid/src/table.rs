//! FILENAME: core/pivot-grid/src/table.rs
//! Pivot table facade.
//!
//! Owns the current execution, the grid snapshot built from it and the row
//! grouping state. Updates are versioned: a result arriving for a superseded
//! request is dropped without touching the current snapshot.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use execution::{Execution, ExecutionResult, SortItem};
use crate::adapter::{execution_to_grid_adapter, GridModel, RowRecord};
use crate::drill::{cell_drill_items, get_drill_intersection, get_drill_row_data, DrillIntersectionEntry, DrillRowValue};
use crate::error::{PivotGridError, Result};
use crate::grouping::{GroupingInput, GroupingState, RowGroupingEngine, RowSpan};
use crate::logging::{log_debug, log_info, log_warn};
use crate::sort::{get_sort_model_from_sort_items, get_sorts_from_model, SortModelEntry};

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotTableConfig {
    /// Merge repeated leading attribute values when the rows allow it.
    #[serde(default = "default_true")]
    pub group_rows: bool,

    /// Text shown for cells without a value.
    #[serde(default)]
    pub empty_cell_text: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for PivotTableConfig {
    fn default() -> Self {
        PivotTableConfig {
            group_rows: true,
            empty_cell_text: None,
        }
    }
}

// ============================================================================
// TABLE
// ============================================================================

/// Issued by [`PivotTable::begin_update`]; only the latest ticket is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateTicket {
    version: u64,
}

impl UpdateTicket {
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Payload handed to drill handlers for one clicked cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillEvent {
    pub row_index: usize,
    pub col_id: String,
    pub intersection: Vec<DrillIntersectionEntry>,
    pub row: Vec<DrillRowValue>,
}

pub struct PivotTable {
    config: PivotTableConfig,
    version: u64,
    execution: Option<Arc<Execution>>,
    snapshot: Option<Arc<GridModel>>,
    grouping: RowGroupingEngine,
}

impl PivotTable {
    pub fn new(config: PivotTableConfig) -> Self {
        PivotTable {
            config,
            version: 0,
            execution: None,
            snapshot: None,
            grouping: RowGroupingEngine::new(),
        }
    }

    pub fn config(&self) -> &PivotTableConfig {
        &self.config
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Starts a new request, superseding any update still in flight.
    pub fn begin_update(&mut self) -> UpdateTicket {
        self.version += 1;
        UpdateTicket { version: self.version }
    }

    /// Installs the result of the request `ticket` was issued for.
    ///
    /// Returns `false` and keeps the current snapshot when the ticket is stale.
    pub fn complete_update(&mut self, ticket: UpdateTicket, execution: Execution) -> bool {
        if ticket.version != self.version {
            log_debug!(
                "TABLE",
                "discarding result of update {} (current {})",
                ticket.version,
                self.version
            );
            return false;
        }

        let model = execution_to_grid_adapter(&execution.execution_response, &execution.execution_result);
        log_info!(
            "TABLE",
            "update {}: {} root columns, {} rows",
            ticket.version,
            model.column_defs.len(),
            model.row_data.len()
        );
        self.execution = Some(Arc::new(execution));
        self.snapshot = Some(Arc::new(model));
        self.regroup();
        true
    }

    pub fn set_group_rows(&mut self, group_rows: bool) {
        if self.config.group_rows == group_rows {
            return;
        }
        self.config.group_rows = group_rows;
        self.regroup();
    }

    fn regroup(&mut self) {
        let (Some(execution), Some(model)) = (&self.execution, &self.snapshot) else {
            return;
        };
        let input = GroupingInput::new(
            self.config.group_rows,
            execution.execution_request.sorts(),
            &execution.execution_response,
        );
        self.grouping.update(input, model);
    }

    /// Merges a further page of the execution `ticket` was issued for.
    ///
    /// Rows land at the page's absolute offset and grouping runs continue
    /// across the page boundary. Pages of a superseded update and pages that
    /// fall outside the result's total row count are rejected. Returns the
    /// number of rows merged.
    pub fn append_page(&mut self, ticket: UpdateTicket, page: &ExecutionResult) -> Result<usize> {
        if ticket.version != self.version {
            log_debug!(
                "TABLE",
                "discarding page of update {} (current {})",
                ticket.version,
                self.version
            );
            return Err(PivotGridError::StaleUpdate {
                version: ticket.version,
                current: self.version,
            });
        }

        let (execution, model) = self.current()?;
        let page_model = execution_to_grid_adapter(&execution.execution_response, page);
        let page_rows = page_model.row_data.len();
        let (row_offset, end) = page_window(page, page_rows, model.row_data.len())?;

        let mut model = model.clone();
        if model.row_data.len() < end {
            model.row_data.resize_with(end, RowRecord::default);
        }
        for (index, row) in page_model.row_data.iter().enumerate() {
            model.row_data[row_offset + index] = row.clone();
        }

        self.grouping.process_page(&page_model.row_data, row_offset);
        self.snapshot = Some(Arc::new(model));
        log_debug!("TABLE", "merged {} rows at offset {}", page_rows, row_offset);
        Ok(page_rows)
    }

    pub fn snapshot(&self) -> Result<Arc<GridModel>> {
        self.snapshot.clone().ok_or(PivotGridError::NoSnapshot)
    }

    fn current(&self) -> Result<(&Execution, &GridModel)> {
        match (&self.execution, &self.snapshot) {
            (Some(execution), Some(model)) => Ok((execution.as_ref(), model.as_ref())),
            _ => Err(PivotGridError::NoSnapshot),
        }
    }

    /// Hidden until a result with at least one column arrives.
    pub fn is_table_hidden(&self) -> bool {
        self.snapshot
            .as_ref()
            .map_or(true, |model| model.column_defs.is_empty())
    }

    /// Cell text with missing values replaced by the configured placeholder.
    pub fn cell_text(&self, row_index: usize, col_id: &str) -> Result<String> {
        let (_, model) = self.current()?;
        let row = model.row(row_index).ok_or(PivotGridError::RowOutOfRange {
            row: row_index,
            row_count: model.row_data.len(),
        })?;
        let empty_text = self.config.empty_cell_text.as_deref().unwrap_or("");
        Ok(row.display_value(col_id, empty_text).to_string())
    }

    // ------------------------------------------------------------------------
    // Sorting
    // ------------------------------------------------------------------------

    /// Sort items for the next request from the grid's sort model.
    pub fn sorts_for_model(&self, sort_model: &[SortModelEntry]) -> Result<Vec<SortItem>> {
        let (execution, _) = self.current()?;
        get_sorts_from_model(sort_model, execution)
    }

    /// Grid sort model reflecting the sorts of the current request.
    pub fn sort_model(&self) -> Result<Vec<SortModelEntry>> {
        let (execution, _) = self.current()?;
        get_sort_model_from_sort_items(execution.execution_request.sorts(), execution)
    }

    // ------------------------------------------------------------------------
    // Drilling
    // ------------------------------------------------------------------------

    pub fn drill_intersection(&self, row_index: usize, col_id: &str) -> Result<Vec<DrillIntersectionEntry>> {
        let (execution, model) = self.current()?;
        let drill_items = cell_drill_items(model, row_index, col_id)?;
        Ok(get_drill_intersection(&drill_items, &execution.execution_request.afm))
    }

    pub fn drill_event(&self, row_index: usize, col_id: &str) -> Result<DrillEvent> {
        let (_, model) = self.current()?;
        let intersection = self.drill_intersection(row_index, col_id)?;
        let row = model.row(row_index).ok_or(PivotGridError::RowOutOfRange {
            row: row_index,
            row_count: model.row_data.len(),
        })?;
        Ok(DrillEvent {
            row_index,
            col_id: col_id.to_string(),
            intersection,
            row: get_drill_row_data(&model.leaf_columns(), row),
        })
    }

    // ------------------------------------------------------------------------
    // Grouping
    // ------------------------------------------------------------------------

    pub fn grouping_state(&self) -> GroupingState {
        self.grouping.state()
    }

    pub fn grouping(&self) -> &RowGroupingEngine {
        &self.grouping
    }

    pub fn row_spans(&self) -> Vec<RowSpan> {
        self.grouping.row_spans()
    }

    pub fn is_repeated_value(&self, col_id: &str, row_index: usize) -> bool {
        self.grouping.is_repeated_value(col_id, row_index)
    }
}

/// Start and end row of a page, bounded by the result's total row count.
///
/// Without a total the page must start within the rows loaded so far.
fn page_window(page: &ExecutionResult, page_rows: usize, loaded_rows: usize) -> Result<(usize, usize)> {
    let offset = page.row_offset();
    let total = page
        .paging
        .as_ref()
        .and_then(|paging| paging.total.first().copied());
    let invalid = || PivotGridError::InvalidPage {
        offset,
        rows: page_rows,
        total: total.unwrap_or(loaded_rows),
    };

    let end = offset.checked_add(page_rows).ok_or_else(invalid)?;
    let fits = match total {
        Some(total) => end <= total,
        None => offset <= loaded_rows,
    };
    if !fits {
        log_warn!(
            "TABLE",
            "page of {} rows at offset {} rejected ({} total)",
            page_rows,
            offset,
            total.unwrap_or(loaded_rows)
        );
        return Err(invalid());
    }
    Ok((offset, end))
}

impl Default for PivotTable {
    fn default() -> Self {
        Self::new(PivotTableConfig::default())
    }
}
