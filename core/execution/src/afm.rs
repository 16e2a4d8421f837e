//! FILENAME: core/execution/src/afm.rs
//! Query definition (AFM) and result spec.
//!
//! Only the parts needed to resolve identifiers are modelled. Unknown keys
//! (filters, native totals) are ignored on deserialization.

use serde::{Deserialize, Serialize};
use crate::sort::SortItem;

/// Reference to a metadata object, either by uri or by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjQualifier {
    Uri(String),
    Identifier(String),
}

/// An attribute (display form) requested by the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AfmAttribute {
    pub local_identifier: String,
    pub display_form: ObjQualifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleMeasureDefinition {
    pub item: ObjQualifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
    #[serde(default)]
    pub compute_ratio: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopMeasureDefinition {
    pub measure_identifier: String,
    pub pop_attribute: ObjQualifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousPeriodDateDataSet {
    pub data_set: ObjQualifier,
    pub periods_ago: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousPeriodMeasureDefinition {
    pub measure_identifier: String,
    pub date_data_sets: Vec<PreviousPeriodDateDataSet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArithmeticMeasureDefinition {
    pub measure_identifiers: Vec<String>,
    pub operator: String,
}

/// How a measure is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeasureDefinition {
    /// Backed by a stored metric or fact.
    Measure(SimpleMeasureDefinition),
    /// Period-over-period derivation of another measure.
    PopMeasure(PopMeasureDefinition),
    /// Previous-period derivation of another measure.
    PreviousPeriodMeasure(PreviousPeriodMeasureDefinition),
    /// Computed from other measures; has no backing object.
    ArithmeticMeasure(ArithmeticMeasureDefinition),
}

impl MeasureDefinition {
    /// Local identifier of the master measure for derived measures.
    pub fn master_measure_identifier(&self) -> Option<&str> {
        match self {
            MeasureDefinition::PopMeasure(def) => Some(&def.measure_identifier),
            MeasureDefinition::PreviousPeriodMeasure(def) => Some(&def.measure_identifier),
            MeasureDefinition::Measure(_) | MeasureDefinition::ArithmeticMeasure(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AfmMeasure {
    pub local_identifier: String,
    pub definition: MeasureDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// The query definition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Afm {
    #[serde(default)]
    pub attributes: Vec<AfmAttribute>,
    #[serde(default)]
    pub measures: Vec<AfmMeasure>,
}

impl Afm {
    pub fn measure(&self, local_identifier: &str) -> Option<&AfmMeasure> {
        self.measures
            .iter()
            .find(|measure| measure.local_identifier == local_identifier)
    }

    /// Qualifier of the stored object behind a measure.
    ///
    /// Derived measures resolve through their master measure; arithmetic
    /// measures (and unknown identifiers) resolve to `None`.
    pub fn measure_qualifier(&self, local_identifier: &str) -> Option<&ObjQualifier> {
        let mut current = self.measure(local_identifier)?;
        // Bounded by the measure count; a cyclic definition ends in `None`.
        for _ in 0..=self.measures.len() {
            match &current.definition {
                MeasureDefinition::Measure(def) => return Some(&def.item),
                MeasureDefinition::ArithmeticMeasure(_) => return None,
                derived => {
                    let master = derived.master_measure_identifier()?;
                    current = self.measure(master)?;
                }
            }
        }
        None
    }
}

// ============================================================================
// RESULT SPEC
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSpecDimension {
    pub item_identifiers: Vec<String>,
}

/// Result layout and ordering requested from the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSpec {
    #[serde(default)]
    pub dimensions: Vec<ResultSpecDimension>,
    #[serde(default)]
    pub sorts: Vec<SortItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(local_identifier: &str, uri: &str) -> AfmMeasure {
        AfmMeasure {
            local_identifier: local_identifier.to_string(),
            definition: MeasureDefinition::Measure(SimpleMeasureDefinition {
                item: ObjQualifier::Uri(uri.to_string()),
                aggregation: None,
                compute_ratio: false,
            }),
            alias: None,
            format: None,
        }
    }

    #[test]
    fn test_derived_measure_resolves_to_master() {
        let afm = Afm {
            attributes: Vec::new(),
            measures: vec![
                simple("m1", "/gdc/md/p/obj/6694"),
                AfmMeasure {
                    local_identifier: "m1_pop".to_string(),
                    definition: MeasureDefinition::PopMeasure(PopMeasureDefinition {
                        measure_identifier: "m1".to_string(),
                        pop_attribute: ObjQualifier::Identifier("date.year".to_string()),
                    }),
                    alias: None,
                    format: None,
                },
            ],
        };
        assert_eq!(
            afm.measure_qualifier("m1_pop"),
            Some(&ObjQualifier::Uri("/gdc/md/p/obj/6694".to_string()))
        );
    }

    #[test]
    fn test_arithmetic_measure_has_no_qualifier() {
        let afm = Afm {
            attributes: Vec::new(),
            measures: vec![
                simple("m1", "/gdc/md/p/obj/1"),
                AfmMeasure {
                    local_identifier: "am1".to_string(),
                    definition: MeasureDefinition::ArithmeticMeasure(ArithmeticMeasureDefinition {
                        measure_identifiers: vec!["m1".to_string(), "m1".to_string()],
                        operator: "sum".to_string(),
                    }),
                    alias: None,
                    format: None,
                },
            ],
        };
        assert_eq!(afm.measure_qualifier("am1"), None);
        assert_eq!(afm.measure_qualifier("missing"), None);
    }

    #[test]
    fn test_cyclic_derivation_terminates() {
        let derived = |id: &str, master: &str| AfmMeasure {
            local_identifier: id.to_string(),
            definition: MeasureDefinition::PreviousPeriodMeasure(PreviousPeriodMeasureDefinition {
                measure_identifier: master.to_string(),
                date_data_sets: Vec::new(),
            }),
            alias: None,
            format: None,
        };
        let afm = Afm {
            attributes: Vec::new(),
            measures: vec![derived("a", "b"), derived("b", "a")],
        };
        assert_eq!(afm.measure_qualifier("a"), None);
    }

    #[test]
    fn test_measure_definition_wire_shape() {
        let json = r#"{"localIdentifier":"m1","definition":{"measure":{"item":{"identifier":"aabHeqImaK0d"}}}}"#;
        let measure: AfmMeasure = serde_json::from_str(json).unwrap();
        assert_eq!(
            measure.definition,
            MeasureDefinition::Measure(SimpleMeasureDefinition {
                item: ObjQualifier::Identifier("aabHeqImaK0d".to_string()),
                aggregation: None,
                compute_ratio: false,
            })
        );
    }
}
