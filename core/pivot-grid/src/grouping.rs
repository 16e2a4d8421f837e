//! FILENAME: core/pivot-grid/src/grouping.rs
//! Row grouping.
//!
//! Consecutive rows sharing the leading row attribute value are visually
//! merged. Grouping is only meaningful when the rows arrive sorted by that
//! attribute, so the decision takes the sortedness as an explicit input and
//! every evaluation starts from a freshly created provider.

use serde::{Deserialize, Serialize};
use execution::{ExecutionResponse, MappingHeader, SortItem};
use crate::adapter::{GridModel, RowRecord};
use crate::logging::{log_debug, log_info, log_warn};

// ============================================================================
// DECISION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupingState {
    Grouped,
    Ungrouped,
}

/// Everything the grouping decision depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupingInput {
    /// Host preference.
    pub group_rows: bool,
    pub sorted_by_first_attribute: bool,
    pub has_row_attributes: bool,
}

impl GroupingInput {
    pub fn new(group_rows: bool, sorts: &[SortItem], response: &ExecutionResponse) -> Self {
        GroupingInput {
            group_rows,
            sorted_by_first_attribute: is_sorted_by_first_attribute(sorts, response),
            has_row_attributes: response.row_attribute_headers().next().is_some(),
        }
    }
}

pub fn next_grouping_state(input: GroupingInput) -> GroupingState {
    if input.group_rows && input.sorted_by_first_attribute && input.has_row_attributes {
        GroupingState::Grouped
    } else {
        GroupingState::Ungrouped
    }
}

/// True when rows come ordered by the first row attribute.
///
/// No sorts means the engine's default order, which is by row attributes.
pub fn is_sorted_by_first_attribute(sorts: &[SortItem], response: &ExecutionResponse) -> bool {
    let Some(first_sort) = sorts.first() else {
        return true;
    };
    let Some(first_attribute) = response.row_attribute_headers().next() else {
        return false;
    };
    matches!(
        first_sort,
        SortItem::AttributeSortItem(item) if item.attribute_identifier == first_attribute.local_identifier
    )
}

/// A run of rows merged under one leading attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSpan {
    pub row_index: usize,
    pub span: usize,
}

// ============================================================================
// PROVIDERS
// ============================================================================

pub trait GroupingProvider {
    fn is_enabled(&self) -> bool;

    /// Forgets every processed page.
    fn reset(&mut self);

    /// Feeds rows starting at absolute index `row_offset`. `col_ids` are the
    /// row attribute columns, leading column first.
    fn process_page(&mut self, rows: &[RowRecord], row_offset: usize, col_ids: &[String]);

    fn is_repeated_value(&self, col_id: &str, row_index: usize) -> bool;

    /// True when `row_index` starts a new run.
    fn is_group_boundary(&self, row_index: usize) -> bool;

    fn row_spans(&self) -> Vec<RowSpan>;
}

/// Provider used when grouping is off. Repeats nothing.
#[derive(Debug, Default)]
pub struct DefaultGroupingProvider;

impl GroupingProvider for DefaultGroupingProvider {
    fn is_enabled(&self) -> bool {
        false
    }

    fn reset(&mut self) {}

    fn process_page(&mut self, _rows: &[RowRecord], _row_offset: usize, _col_ids: &[String]) {}

    fn is_repeated_value(&self, _col_id: &str, _row_index: usize) -> bool {
        false
    }

    fn is_group_boundary(&self, _row_index: usize) -> bool {
        true
    }

    fn row_spans(&self) -> Vec<RowSpan> {
        Vec::new()
    }
}

/// Groups by element uri of the row attribute columns.
///
/// A column is repeated at a row when its element equals the previous row's
/// and every column before it is repeated too.
#[derive(Debug, Default)]
pub struct AttributeGroupingProvider {
    col_ids: Vec<String>,
    /// Element uris per absolute row; `None` for totals and unloaded rows.
    row_keys: Vec<Option<Vec<Option<String>>>>,
}

impl AttributeGroupingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(&self, row_index: usize, column: usize) -> Option<&str> {
        self.row_keys
            .get(row_index)?
            .as_ref()?
            .get(column)?
            .as_deref()
    }

    fn repeated_at(&self, column: usize, row_index: usize) -> bool {
        if row_index == 0 {
            return false;
        }
        (0..=column).all(|position| {
            match (self.key(row_index, position), self.key(row_index - 1, position)) {
                (Some(current), Some(previous)) => current == previous,
                _ => false,
            }
        })
    }

    fn is_loaded(&self, row_index: usize) -> bool {
        matches!(self.row_keys.get(row_index), Some(Some(_)))
    }
}

fn row_keys(row: &RowRecord, col_ids: &[String]) -> Option<Vec<Option<String>>> {
    if row.is_total() {
        return None;
    }
    Some(
        col_ids
            .iter()
            .map(|col_id| match row.header_item(col_id) {
                Some(MappingHeader::AttributeHeaderItem(item)) => Some(item.uri.clone()),
                _ => None,
            })
            .collect(),
    )
}

impl GroupingProvider for AttributeGroupingProvider {
    fn is_enabled(&self) -> bool {
        true
    }

    fn reset(&mut self) {
        self.col_ids.clear();
        self.row_keys.clear();
    }

    fn process_page(&mut self, rows: &[RowRecord], row_offset: usize, col_ids: &[String]) {
        if self.col_ids != col_ids {
            if !self.col_ids.is_empty() {
                log_debug!("GROUPING", "row attribute columns changed, dropping processed rows");
            }
            self.row_keys.clear();
            self.col_ids = col_ids.to_vec();
        }

        let Some(end) = row_offset.checked_add(rows.len()) else {
            log_warn!("GROUPING", "page of {} rows at offset {} overflows, ignored", rows.len(), row_offset);
            return;
        };
        if self.row_keys.len() < end {
            self.row_keys.resize(end, None);
        }
        for (index, row) in rows.iter().enumerate() {
            self.row_keys[row_offset + index] = row_keys(row, &self.col_ids);
        }
    }

    fn is_repeated_value(&self, col_id: &str, row_index: usize) -> bool {
        self.col_ids
            .iter()
            .position(|candidate| candidate == col_id)
            .map_or(false, |column| self.repeated_at(column, row_index))
    }

    fn is_group_boundary(&self, row_index: usize) -> bool {
        !self.repeated_at(0, row_index)
    }

    fn row_spans(&self) -> Vec<RowSpan> {
        let mut spans = Vec::new();
        if self.col_ids.is_empty() {
            return spans;
        }
        let mut row_index = 0;
        while row_index < self.row_keys.len() {
            if !self.is_loaded(row_index) || self.key(row_index, 0).is_none() {
                row_index += 1;
                continue;
            }
            let mut span = 1;
            while self.repeated_at(0, row_index + span) {
                span += 1;
            }
            spans.push(RowSpan { row_index, span });
            row_index += span;
        }
        spans
    }
}

/// Picks the provider for one grouping evaluation.
pub struct GroupingProviderFactory;

impl GroupingProviderFactory {
    pub fn create_provider(group_rows: bool) -> Box<dyn GroupingProvider> {
        if group_rows {
            Box::new(AttributeGroupingProvider::new())
        } else {
            Box::new(DefaultGroupingProvider)
        }
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Holds the current grouping state and provider of one table.
pub struct RowGroupingEngine {
    state: GroupingState,
    provider: Box<dyn GroupingProvider>,
    col_ids: Vec<String>,
    evaluations: usize,
}

impl Default for RowGroupingEngine {
    fn default() -> Self {
        RowGroupingEngine {
            state: GroupingState::Ungrouped,
            provider: GroupingProviderFactory::create_provider(false),
            col_ids: Vec::new(),
            evaluations: 0,
        }
    }
}

impl RowGroupingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-evaluates grouping for a new snapshot or preference.
    ///
    /// The previous provider is dropped, so no span of an older result
    /// survives the update.
    pub fn update(&mut self, input: GroupingInput, model: &GridModel) -> GroupingState {
        let state = next_grouping_state(input);
        if state != self.state {
            log_info!("GROUPING", "{:?} -> {:?} ({:?})", self.state, state, input);
        }

        self.provider = GroupingProviderFactory::create_provider(state == GroupingState::Grouped);
        self.col_ids = model.row_attribute_col_ids();
        self.provider.process_page(&model.row_data, 0, &self.col_ids);
        self.state = state;
        self.evaluations += 1;
        state
    }

    /// Feeds an additional page of the current result.
    pub fn process_page(&mut self, rows: &[RowRecord], row_offset: usize) {
        self.provider.process_page(rows, row_offset, &self.col_ids);
    }

    pub fn state(&self) -> GroupingState {
        self.state
    }

    pub fn provider(&self) -> &dyn GroupingProvider {
        self.provider.as_ref()
    }

    /// Number of providers created so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn row_spans(&self) -> Vec<RowSpan> {
        self.provider.row_spans()
    }

    pub fn is_repeated_value(&self, col_id: &str, row_index: usize) -> bool {
        self.provider.is_repeated_value(col_id, row_index)
    }
}
