//! FILENAME: core/execution/src/lib.rs
//! Analytical execution data model.
//!
//! Shared types describing an already-run analytical query. The pivot grid
//! adapter depends on this crate only for these types.
//!
//! Layers:
//! - `headers`: Attribute / measure / total headers and the mapping header union
//! - `result`: Execution response (header metadata) and result (value matrix)
//! - `afm`: Query definition used to resolve symbolic identifiers
//! - `sort`: Sort items and locators sent back to the query engine

pub mod headers;
pub mod result;
pub mod afm;
pub mod sort;

pub use headers::*;
pub use result::*;
pub use afm::*;
pub use sort::*;

/// Dimension index holding the row headers.
pub const ROW_DIMENSION: usize = 0;

/// Dimension index holding the column headers.
pub const COLUMN_DIMENSION: usize = 1;

/// A complete execution: what was asked, the header metadata, and the data.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub execution_request: ExecutionRequest,
    pub execution_response: ExecutionResponse,
    pub execution_result: ExecutionResult,
}

/// The request half of an execution.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    pub afm: Afm,
    #[serde(default)]
    pub result_spec: Option<ResultSpec>,
}

impl ExecutionRequest {
    /// Sort items of the result spec, empty when none were requested.
    pub fn sorts(&self) -> &[SortItem] {
        self.result_spec
            .as_ref()
            .map(|spec| spec.sorts.as_slice())
            .unwrap_or(&[])
    }
}
