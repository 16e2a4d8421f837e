//! FILENAME: tests/common/mod.rs
//! Execution fixtures for pivot grid integration tests.

#![allow(dead_code)]

use execution::{
    Afm, AfmAttribute, AfmMeasure, AttributeFormOf, AttributeHeader, AttributeHeaderItem,
    DimensionHeader, Execution, ExecutionRequest, ExecutionResponse, ExecutionResult,
    MeasureDefinition, MeasureGroupHeader, MeasureGroupItem, MeasureHeaderItem, ObjQualifier,
    ResultDimension, ResultHeaderItem, ResultMeasureHeaderItem, ResultSpec,
    SimpleMeasureDefinition, SortItem,
};

pub const PROJECT: &str = "/gdc/md/storybook";

/// (local identifier, display form obj, attribute obj, label)
pub const STATE: (&str, u32, u32, &str) = ("state", 2211, 2210, "Location State");
pub const CITY: (&str, u32, u32, &str) = ("city", 2208, 2207, "Location City");
pub const QUARTER: (&str, u32, u32, &str) = ("year", 2011, 2009, "Quarter/Year (Date)");
pub const MONTH: (&str, u32, u32, &str) = ("month", 2073, 2071, "Month/Year (Date)");

pub const MEASURES: [(&str, &str, u32); 4] = [
    ("franchiseFeesIdentifier", "$ Franchise Fees", 6685),
    ("franchiseFeesAdRoyaltyIdentifier", "$ Franchise Fees (Ad Royalty)", 6694),
    ("franchiseFeesInitialFranchiseFeeIdentifier", "$ Franchise Fees (Initial Franchise Fee)", 6695),
    ("franchiseFeesIdentifierOngoingRoyalty", "$ Franchise Fees (Ongoing Royalty)", 6696),
];

pub fn obj_uri(id: u32) -> String {
    format!("{}/obj/{}", PROJECT, id)
}

pub fn element_uri(attribute: u32, element: u32) -> String {
    format!("{}/obj/{}/elements?id={}", PROJECT, attribute, element)
}

pub fn attribute_header(fixture: (&str, u32, u32, &str)) -> AttributeHeader {
    let (local_identifier, display_form, attribute, label) = fixture;
    AttributeHeader {
        local_identifier: local_identifier.to_string(),
        identifier: format!("label.{}", local_identifier),
        uri: obj_uri(display_form),
        name: label.to_string(),
        form_of: AttributeFormOf {
            uri: obj_uri(attribute),
            identifier: format!("attr.{}", local_identifier),
            name: label.to_string(),
        },
        total_items: Vec::new(),
    }
}

/// State/City rows: 13 rows with State runs of 2, 4, 1, 3 and 3.
pub struct LocationFixture;

impl LocationFixture {
    pub fn rows() -> Vec<(&'static str, u32, &'static str, u32)> {
        vec![
            ("Alabama", 6340109, "Dothan", 6340110),
            ("Alabama", 6340109, "Hoover", 6340111),
            ("California", 6340107, "Highland Village", 6340116),
            ("California", 6340107, "Irvine", 6340112),
            ("California", 6340107, "Montgomery", 6340113),
            ("California", 6340107, "San Jose", 6340114),
            ("Florida", 6340108, "Deerfield Beach", 6340115),
            ("New York", 6340106, "New York", 6340117),
            ("New York", 6340106, "Preston", 6340118),
            ("New York", 6340106, "Rochester", 6340119),
            ("Texas", 6340105, "Austin", 6340120),
            ("Texas", 6340105, "Dallas", 6340121),
            ("Texas", 6340105, "Houston", 6340122),
        ]
    }

    pub fn spans() -> Vec<(usize, usize)> {
        vec![(0, 2), (2, 4), (6, 1), (7, 3), (10, 3)]
    }
}

/// Q1 2017 by January/February, four measures under each month.
pub struct DateFixture;

impl DateFixture {
    pub fn quarter() -> (&'static str, u32) {
        ("Q1/2017", 1)
    }

    pub fn months() -> Vec<(&'static str, u32)> {
        vec![("Jan 2017", 1), ("Feb 2017", 2)]
    }
}

fn measure_header_items() -> Vec<MeasureGroupItem> {
    MEASURES
        .iter()
        .map(|(local_identifier, name, _)| MeasureGroupItem {
            measure_header_item: MeasureHeaderItem {
                local_identifier: local_identifier.to_string(),
                name: name.to_string(),
                format: "#,##0.00".to_string(),
                uri: None,
                identifier: None,
            },
        })
        .collect()
}

fn afm() -> Afm {
    Afm {
        attributes: [STATE, CITY, QUARTER, MONTH]
            .iter()
            .map(|(local_identifier, display_form, _, _)| AfmAttribute {
                local_identifier: local_identifier.to_string(),
                display_form: ObjQualifier::Uri(obj_uri(*display_form)),
            })
            .collect(),
        measures: MEASURES
            .iter()
            .map(|(local_identifier, _, obj)| AfmMeasure {
                local_identifier: local_identifier.to_string(),
                definition: MeasureDefinition::Measure(SimpleMeasureDefinition {
                    item: ObjQualifier::Uri(obj_uri(*obj)),
                    aggregation: None,
                    compute_ratio: false,
                }),
                alias: None,
                format: None,
            })
            .collect(),
    }
}

/// Cell value at row `row`, column `column` of the data matrix.
pub fn cell_value(row: usize, column: usize) -> String {
    format!("{}.5", 1000 * (row + 1) + column)
}

/// The full execution: State, City on rows; Quarter, Month and measures on columns.
pub fn execution(sorts: Vec<SortItem>) -> Execution {
    let rows = LocationFixture::rows();
    let (quarter_name, quarter_id) = DateFixture::quarter();
    let months = DateFixture::months();

    let mut quarter_items = Vec::new();
    let mut month_items = Vec::new();
    let mut measure_items = Vec::new();
    for (month_name, month_id) in &months {
        for order in 0..MEASURES.len() {
            quarter_items.push(ResultHeaderItem::AttributeHeaderItem(AttributeHeaderItem::new(
                element_uri(QUARTER.2, quarter_id),
                quarter_name,
            )));
            month_items.push(ResultHeaderItem::AttributeHeaderItem(AttributeHeaderItem::new(
                element_uri(MONTH.2, *month_id),
                *month_name,
            )));
            measure_items.push(ResultHeaderItem::MeasureHeaderItem(ResultMeasureHeaderItem {
                name: MEASURES[order].1.to_string(),
                order,
            }));
        }
    }
    let column_count = measure_items.len();

    let state_items: Vec<ResultHeaderItem> = rows
        .iter()
        .map(|(name, id, _, _)| {
            ResultHeaderItem::AttributeHeaderItem(AttributeHeaderItem::new(element_uri(STATE.2, *id), *name))
        })
        .collect();
    let city_items: Vec<ResultHeaderItem> = rows
        .iter()
        .map(|(_, _, name, id)| {
            ResultHeaderItem::AttributeHeaderItem(AttributeHeaderItem::new(element_uri(CITY.2, *id), *name))
        })
        .collect();

    Execution {
        execution_request: ExecutionRequest {
            afm: afm(),
            result_spec: Some(ResultSpec {
                dimensions: Vec::new(),
                sorts,
            }),
        },
        execution_response: ExecutionResponse {
            dimensions: vec![
                ResultDimension {
                    headers: vec![
                        DimensionHeader::AttributeHeader(attribute_header(STATE)),
                        DimensionHeader::AttributeHeader(attribute_header(CITY)),
                    ],
                },
                ResultDimension {
                    headers: vec![
                        DimensionHeader::AttributeHeader(attribute_header(QUARTER)),
                        DimensionHeader::AttributeHeader(attribute_header(MONTH)),
                        DimensionHeader::MeasureGroupHeader(MeasureGroupHeader {
                            items: measure_header_items(),
                        }),
                    ],
                },
            ],
        },
        execution_result: ExecutionResult {
            data: (0..rows.len())
                .map(|row| (0..column_count).map(|column| Some(cell_value(row, column))).collect())
                .collect(),
            header_items: vec![
                vec![state_items, city_items],
                vec![quarter_items, month_items, measure_items],
            ],
            paging: None,
        },
    }
}
