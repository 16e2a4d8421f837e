//! FILENAME: core/pivot-grid/src/sort.rs
//! Grid sort model <-> analytical sort items.
//!
//! The grid reports sorting as `{colId, sort}` entries. Column ids are
//! decoded with the codec and resolved against the execution headers: a bare
//! attribute column sorts by that attribute, a measure column sorts by the
//! measure at the attribute elements of its path.

use serde::{Deserialize, Serialize};
use execution::{
    AttributeHeader, AttributeLocatorItem, DimensionHeader, Execution, ExecutionResponse,
    LocatorItem, MeasureGroupHeader, MeasureLocatorItem, MeasureSortItem, SortDirection, SortItem,
    COLUMN_DIMENSION,
};
use crate::col_id::{
    attribute_token, decode, display_form_token, element_uri, encode, get_attribute_element_id_from_uri,
    unescape_token, ColIdSegment,
};
use crate::error::{PivotGridError, Result};
use crate::logging::log_debug;

/// One entry of the grid's sort model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortModelEntry {
    pub col_id: String,
    pub sort: SortDirection,
}

impl SortModelEntry {
    pub fn new(col_id: impl Into<String>, sort: SortDirection) -> Self {
        SortModelEntry {
            col_id: col_id.into(),
            sort,
        }
    }
}

// ============================================================================
// GRID -> SORT ITEMS
// ============================================================================

/// Translates one sorted grid column into a sort item.
pub fn get_sort_item_by_col_id(execution: &Execution, col_id: &str, direction: SortDirection) -> Result<SortItem> {
    let response = &execution.execution_response;
    let segments = decode(col_id)?;
    let Some((last, outer)) = segments.split_last() else {
        return Err(PivotGridError::MalformedColId {
            col_id: col_id.to_string(),
            segment: String::new(),
        });
    };

    match last {
        ColIdSegment::Attribute { attribute_token, element_token: None } if outer.is_empty() => {
            let header = response
                .row_attribute_headers()
                .find(|header| display_form_token(header) == *attribute_token)
                .ok_or_else(|| PivotGridError::UnknownAttribute {
                    col_id: col_id.to_string(),
                    token: attribute_token.clone(),
                })?;
            Ok(SortItem::attribute(header.local_identifier.clone(), direction))
        }
        ColIdSegment::Measure { index } => {
            let measure = response
                .measure_group(COLUMN_DIMENSION)
                .and_then(|group| group.measure(*index))
                .ok_or_else(|| PivotGridError::UnknownMeasure {
                    col_id: col_id.to_string(),
                    index: *index,
                })?;

            let mut locators = outer
                .iter()
                .map(|segment| attribute_locator(response, col_id, segment))
                .collect::<Result<Vec<_>>>()?;
            locators.push(LocatorItem::MeasureLocatorItem(MeasureLocatorItem {
                measure_identifier: measure.local_identifier.clone(),
            }));

            Ok(SortItem::MeasureSortItem(MeasureSortItem { direction, locators }))
        }
        other => Err(PivotGridError::UnexpectedSegment {
            col_id: col_id.to_string(),
            segment: other.to_string(),
        }),
    }
}

fn attribute_locator(response: &ExecutionResponse, col_id: &str, segment: &ColIdSegment) -> Result<LocatorItem> {
    let ColIdSegment::Attribute { attribute_token: token, element_token: Some(element) } = segment else {
        return Err(PivotGridError::UnexpectedSegment {
            col_id: col_id.to_string(),
            segment: segment.to_string(),
        });
    };
    let header = column_attribute_headers(response)
        .find(|header| attribute_token(header).as_deref() == Some(token.as_str()))
        .ok_or_else(|| PivotGridError::UnknownAttribute {
            col_id: col_id.to_string(),
            token: token.clone(),
        })?;

    Ok(LocatorItem::AttributeLocatorItem(AttributeLocatorItem {
        attribute_identifier: header.local_identifier.clone(),
        element: element_uri(header.attribute_uri(), &unescape_token(element)),
    }))
}

fn column_attribute_headers(response: &ExecutionResponse) -> impl Iterator<Item = &AttributeHeader> {
    response
        .column_headers()
        .iter()
        .filter_map(DimensionHeader::as_attribute)
}

/// Translates the whole grid sort model, keeping the grid's priority order.
pub fn get_sorts_from_model(sort_model: &[SortModelEntry], execution: &Execution) -> Result<Vec<SortItem>> {
    let sorts = sort_model
        .iter()
        .map(|entry| get_sort_item_by_col_id(execution, &entry.col_id, entry.sort))
        .collect::<Result<Vec<_>>>()?;
    log_debug!("SORT", "translated {} grid sort entries", sorts.len());
    Ok(sorts)
}

// ============================================================================
// SORT ITEMS -> GRID
// ============================================================================

/// Rebuilds the grid sort model for sort items of a previous request.
pub fn get_sort_model_from_sort_items(sorts: &[SortItem], execution: &Execution) -> Result<Vec<SortModelEntry>> {
    let response = &execution.execution_response;
    sorts
        .iter()
        .map(|sort| match sort {
            SortItem::AttributeSortItem(item) => {
                let header = response
                    .row_attribute_headers()
                    .find(|header| header.local_identifier == item.attribute_identifier)
                    .ok_or_else(|| PivotGridError::UnknownLocator(item.attribute_identifier.clone()))?;
                Ok(SortModelEntry::new(
                    ColIdSegment::row_attribute(header).to_string(),
                    item.direction,
                ))
            }
            SortItem::MeasureSortItem(item) => {
                let group = response
                    .measure_group(COLUMN_DIMENSION)
                    .ok_or(PivotGridError::MissingDimension("column measure group"))?;
                let segments = item
                    .locators
                    .iter()
                    .map(|locator| locator_segment(response, group, locator))
                    .collect::<Result<Vec<_>>>()?;
                Ok(SortModelEntry::new(encode(&segments), item.direction))
            }
        })
        .collect()
}

fn locator_segment(
    response: &ExecutionResponse,
    group: &MeasureGroupHeader,
    locator: &LocatorItem,
) -> Result<ColIdSegment> {
    match locator {
        LocatorItem::AttributeLocatorItem(locator) => {
            let header = column_attribute_headers(response)
                .find(|header| header.local_identifier == locator.attribute_identifier)
                .ok_or_else(|| PivotGridError::UnknownLocator(locator.attribute_identifier.clone()))?;
            let element_id = get_attribute_element_id_from_uri(&locator.element)
                .ok_or_else(|| PivotGridError::UnknownLocator(locator.element.clone()))?;
            ColIdSegment::attribute_element(&element_uri(header.attribute_uri(), element_id))
                .ok_or_else(|| PivotGridError::UnknownLocator(locator.element.clone()))
        }
        LocatorItem::MeasureLocatorItem(locator) => group
            .position_of(&locator.measure_identifier)
            .map(ColIdSegment::measure)
            .ok_or_else(|| PivotGridError::UnknownLocator(locator.measure_identifier.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use execution::{
        AttributeFormOf, ExecutionRequest, ExecutionResult, MeasureGroupItem, MeasureHeaderItem,
        ResultDimension,
    };

    fn attribute(local_identifier: &str, display_form: u32, attribute: u32) -> DimensionHeader {
        DimensionHeader::AttributeHeader(AttributeHeader {
            local_identifier: local_identifier.to_string(),
            identifier: format!("label.{}", local_identifier),
            uri: format!("/gdc/md/p/obj/{}", display_form),
            name: local_identifier.to_string(),
            form_of: AttributeFormOf {
                uri: format!("/gdc/md/p/obj/{}", attribute),
                identifier: String::new(),
                name: local_identifier.to_string(),
            },
            total_items: Vec::new(),
        })
    }

    fn execution() -> Execution {
        let measure = |id: &str| MeasureGroupItem {
            measure_header_item: MeasureHeaderItem {
                local_identifier: id.to_string(),
                name: id.to_string(),
                format: String::new(),
                uri: None,
                identifier: None,
            },
        };
        Execution {
            execution_request: ExecutionRequest::default(),
            execution_response: ExecutionResponse {
                dimensions: vec![
                    ResultDimension { headers: vec![attribute("state", 2211, 2210), attribute("city", 2208, 2207)] },
                    ResultDimension {
                        headers: vec![
                            attribute("year", 2011, 2009),
                            attribute("month", 2073, 2071),
                            DimensionHeader::MeasureGroupHeader(MeasureGroupHeader {
                                items: vec![measure("franchiseFeesIdentifier"), measure("adRoyaltyIdentifier")],
                            }),
                        ],
                    },
                ],
            },
            execution_result: ExecutionResult::default(),
        }
    }

    #[test]
    fn test_attribute_sort_item() {
        assert_eq!(
            get_sort_item_by_col_id(&execution(), "a_2211", SortDirection::Asc).unwrap(),
            SortItem::attribute("state", SortDirection::Asc)
        );
        assert_eq!(
            get_sort_item_by_col_id(&execution(), "a_2208", SortDirection::Desc).unwrap(),
            SortItem::attribute("city", SortDirection::Desc)
        );
    }

    #[test]
    fn test_measure_sort_item() {
        let item = get_sort_item_by_col_id(&execution(), "a_2009_1-a_2071_1-m_0", SortDirection::Asc).unwrap();
        assert_eq!(
            item,
            SortItem::MeasureSortItem(MeasureSortItem {
                direction: SortDirection::Asc,
                locators: vec![
                    LocatorItem::AttributeLocatorItem(AttributeLocatorItem {
                        attribute_identifier: "year".to_string(),
                        element: "/gdc/md/p/obj/2009/elements?id=1".to_string(),
                    }),
                    LocatorItem::AttributeLocatorItem(AttributeLocatorItem {
                        attribute_identifier: "month".to_string(),
                        element: "/gdc/md/p/obj/2071/elements?id=1".to_string(),
                    }),
                    LocatorItem::MeasureLocatorItem(MeasureLocatorItem {
                        measure_identifier: "franchiseFeesIdentifier".to_string(),
                    }),
                ],
            })
        );
    }

    #[test]
    fn test_measure_only_column() {
        let item = get_sort_item_by_col_id(&execution(), "m_1", SortDirection::Desc).unwrap();
        assert_eq!(
            item,
            SortItem::MeasureSortItem(MeasureSortItem {
                direction: SortDirection::Desc,
                locators: vec![LocatorItem::MeasureLocatorItem(MeasureLocatorItem {
                    measure_identifier: "adRoyaltyIdentifier".to_string(),
                })],
            })
        );
    }

    #[test]
    fn test_unresolvable_columns_are_errors() {
        let execution = execution();
        assert!(matches!(
            get_sort_item_by_col_id(&execution, "a_9999", SortDirection::Asc),
            Err(PivotGridError::UnknownAttribute { token, .. }) if token == "9999"
        ));
        assert!(matches!(
            get_sort_item_by_col_id(&execution, "a_2009_1-m_7", SortDirection::Asc),
            Err(PivotGridError::UnknownMeasure { index: 7, .. })
        ));
        assert!(matches!(
            get_sort_item_by_col_id(&execution, "a_4242_1-m_0", SortDirection::Asc),
            Err(PivotGridError::UnknownAttribute { .. })
        ));
        // A column attribute group header is not sortable.
        assert!(matches!(
            get_sort_item_by_col_id(&execution, "a_2009_1", SortDirection::Asc),
            Err(PivotGridError::UnexpectedSegment { .. })
        ));
        assert!(matches!(
            get_sort_item_by_col_id(&execution, "m_0-m_1", SortDirection::Asc),
            Err(PivotGridError::UnexpectedSegment { .. })
        ));
        assert!(get_sort_item_by_col_id(&execution, "garbage", SortDirection::Asc).is_err());
    }

    #[test]
    fn test_sorts_from_model_keep_grid_order() {
        let model = vec![
            SortModelEntry::new("a_2009_1-a_2071_1-m_0", SortDirection::Desc),
            SortModelEntry::new("a_2211", SortDirection::Asc),
        ];
        let sorts = get_sorts_from_model(&model, &execution()).unwrap();
        assert_eq!(sorts.len(), 2);
        assert!(matches!(&sorts[0], SortItem::MeasureSortItem(item) if item.direction == SortDirection::Desc));
        assert_eq!(sorts[1], SortItem::attribute("state", SortDirection::Asc));
    }

    #[test]
    fn test_sorts_from_model_fail_on_stale_column() {
        let model = vec![
            SortModelEntry::new("a_2211", SortDirection::Asc),
            SortModelEntry::new("a_1", SortDirection::Asc),
        ];
        assert!(get_sorts_from_model(&model, &execution()).is_err());
    }

    #[test]
    fn test_sort_model_round_trip() {
        let execution = execution();
        let model = vec![
            SortModelEntry::new("a_2009_1-a_2071_3-m_1", SortDirection::Desc),
            SortModelEntry::new("a_2208", SortDirection::Asc),
        ];
        let sorts = get_sorts_from_model(&model, &execution).unwrap();
        assert_eq!(get_sort_model_from_sort_items(&sorts, &execution).unwrap(), model);
    }

    #[test]
    fn test_element_ids_with_separators_keep_their_uri() {
        let execution = execution();
        let item = get_sort_item_by_col_id(&execution, "a_2009_1%5F2-m_0", SortDirection::Asc).unwrap();
        let SortItem::MeasureSortItem(sort) = &item else {
            panic!("expected a measure sort, got {:?}", item);
        };
        assert_eq!(
            sort.locators[0],
            LocatorItem::AttributeLocatorItem(AttributeLocatorItem {
                attribute_identifier: "year".to_string(),
                element: "/gdc/md/p/obj/2009/elements?id=1_2".to_string(),
            })
        );
        assert_eq!(
            get_sort_model_from_sort_items(&[item], &execution).unwrap(),
            vec![SortModelEntry::new("a_2009_1%5F2-m_0", SortDirection::Asc)]
        );
    }

    #[test]
    fn test_sort_model_wire_shape() {
        let entry: SortModelEntry = serde_json::from_str(r#"{"colId":"a_2211","sort":"desc"}"#).unwrap();
        assert_eq!(entry, SortModelEntry::new("a_2211", SortDirection::Desc));
    }
}
