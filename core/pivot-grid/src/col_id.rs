//! FILENAME: core/pivot-grid/src/col_id.rs
//! Column id codec.
//!
//! A column id names a grid column and encodes its position in the header
//! tree, so sort and drill handlers can recover the meaning of a column
//! without a side lookup table:
//!
//! - `a_<attribute>`: row attribute column
//! - `a_<attribute>_<element>`: column attribute value
//! - `m_<index>`: measure leaf (index into the measure group)
//!
//! Levels are joined with `-`, e.g. `a_2009_1-a_2071_1-m_0`.
//! Separator characters inside a token are percent-escaped.

use smallvec::SmallVec;
use std::fmt;
use execution::AttributeHeader;
use crate::error::{PivotGridError, Result};

pub const FIELD_TYPE_ATTRIBUTE: &str = "a";
pub const FIELD_TYPE_MEASURE: &str = "m";
pub const ID_SEPARATOR: char = '_';
pub const FIELD_SEPARATOR: char = '-';

const ID_SEPARATOR_STR: &str = "_";
const FIELD_SEPARATOR_STR: &str = "-";

const OBJ_MARKER: &str = "/obj/";
const ELEMENTS_MARKER: &str = "/elements?id=";

/// Tokens of one column id level, e.g. `["a", "2009", "1"]`.
pub type ParsedField = SmallVec<[String; 3]>;

// ============================================================================
// TOKENIZING
// ============================================================================

/// Splits a column id into levels and each level into its tokens.
///
/// Permissive: malformed input yields whatever the split produces.
pub fn get_parsed_fields(col_id: &str) -> Vec<ParsedField> {
    col_id
        .split(FIELD_SEPARATOR)
        .map(|field| field.split(ID_SEPARATOR).map(str::to_string).collect())
        .collect()
}

/// Object id and optional element id of a metadata uri.
///
/// `/gdc/md/p/obj/2009/elements?id=1` gives `("2009", Some("1"))`,
/// `/gdc/md/p/obj/2211` gives `("2211", None)`.
pub fn uri_tokens(uri: &str) -> Option<(&str, Option<&str>)> {
    let (_, rest) = uri.rsplit_once(OBJ_MARKER)?;
    let (object_id, element_id) = match rest.split_once(ELEMENTS_MARKER) {
        Some((object_id, element_id)) => (object_id, Some(element_id)),
        None => (rest, None),
    };
    if object_id.is_empty() || element_id == Some("") {
        return None;
    }
    Some((object_id, element_id))
}

/// Element id of an attribute element uri (`.../elements?id=6340109` gives `6340109`).
pub fn get_attribute_element_id_from_uri(uri: &str) -> Option<&str> {
    uri.rsplit_once("elements?id=")
        .map(|(_, id)| id)
        .filter(|id| !id.is_empty())
}

/// Builds the element uri addressed by an attribute locator.
pub fn element_uri(attribute_uri: &str, element_token: &str) -> String {
    format!("{}{}{}", attribute_uri, ELEMENTS_MARKER, element_token)
}

const ESCAPE: char = '%';

/// Escapes the separators (and the escape char itself) inside a token, so
/// distinct ids never share a column id: `1_2` gives `1%5F2`.
pub fn escape_token(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len());
    for c in token.chars() {
        match c {
            ESCAPE => escaped.push_str("%25"),
            ID_SEPARATOR => escaped.push_str("%5F"),
            FIELD_SEPARATOR => escaped.push_str("%2D"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Inverse of [`escape_token`]. Unknown escapes are kept verbatim.
pub fn unescape_token(token: &str) -> String {
    let mut unescaped = String::with_capacity(token.len());
    let mut rest = token;
    while let Some(index) = rest.find(ESCAPE) {
        unescaped.push_str(&rest[..index]);
        let escape = rest.get(index..index + 3);
        let decoded = match escape {
            Some("%25") => Some(ESCAPE),
            Some("%5F") => Some(ID_SEPARATOR),
            Some("%2D") => Some(FIELD_SEPARATOR),
            _ => None,
        };
        match decoded {
            Some(c) => {
                unescaped.push(c);
                rest = &rest[index + 3..];
            }
            None => {
                unescaped.push(ESCAPE);
                rest = &rest[index + 1..];
            }
        }
    }
    unescaped.push_str(rest);
    unescaped
}

/// Token naming a row attribute column: the display form object id, or the
/// local identifier when the uri carries no object id.
pub fn display_form_token(header: &AttributeHeader) -> String {
    match uri_tokens(header.display_form_uri()) {
        Some((object_id, None)) => escape_token(object_id),
        _ => escape_token(&header.local_identifier),
    }
}

/// Token naming the attribute behind a column attribute level.
pub fn attribute_token(header: &AttributeHeader) -> Option<String> {
    match uri_tokens(header.attribute_uri()) {
        Some((object_id, None)) => Some(escape_token(object_id)),
        _ => None,
    }
}

// ============================================================================
// TYPED SEGMENTS
// ============================================================================

/// One decoded level of a column id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColIdSegment {
    Attribute {
        attribute_token: String,
        element_token: Option<String>,
    },
    Measure {
        index: usize,
    },
}

impl ColIdSegment {
    pub fn row_attribute(header: &AttributeHeader) -> Self {
        ColIdSegment::Attribute {
            attribute_token: display_form_token(header),
            element_token: None,
        }
    }

    /// Segment of a column attribute value, from the element uri.
    pub fn attribute_element(element_uri: &str) -> Option<Self> {
        match uri_tokens(element_uri)? {
            (object_id, Some(element_id)) => Some(ColIdSegment::Attribute {
                attribute_token: escape_token(object_id),
                element_token: Some(escape_token(element_id)),
            }),
            (_, None) => None,
        }
    }

    pub fn measure(index: usize) -> Self {
        ColIdSegment::Measure { index }
    }

    /// Decodes one token group produced by [`get_parsed_fields`].
    pub fn from_field(col_id: &str, field: &[String]) -> Result<Self> {
        let malformed = || PivotGridError::MalformedColId {
            col_id: col_id.to_string(),
            segment: field.join(ID_SEPARATOR_STR),
        };
        match field {
            [kind, attribute] if kind == FIELD_TYPE_ATTRIBUTE && !attribute.is_empty() => {
                Ok(ColIdSegment::Attribute {
                    attribute_token: attribute.clone(),
                    element_token: None,
                })
            }
            [kind, attribute, element]
                if kind == FIELD_TYPE_ATTRIBUTE && !attribute.is_empty() && !element.is_empty() =>
            {
                Ok(ColIdSegment::Attribute {
                    attribute_token: attribute.clone(),
                    element_token: Some(element.clone()),
                })
            }
            [kind, index] if kind == FIELD_TYPE_MEASURE => index
                .parse::<usize>()
                .map(|index| ColIdSegment::Measure { index })
                .map_err(|_| malformed()),
            _ => Err(malformed()),
        }
    }

    pub fn is_measure(&self) -> bool {
        matches!(self, ColIdSegment::Measure { .. })
    }
}

impl fmt::Display for ColIdSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColIdSegment::Attribute { attribute_token, element_token: None } => {
                write!(f, "{}{}{}", FIELD_TYPE_ATTRIBUTE, ID_SEPARATOR, attribute_token)
            }
            ColIdSegment::Attribute { attribute_token, element_token: Some(element) } => write!(
                f,
                "{}{}{}{}{}",
                FIELD_TYPE_ATTRIBUTE, ID_SEPARATOR, attribute_token, ID_SEPARATOR, element
            ),
            ColIdSegment::Measure { index } => {
                write!(f, "{}{}{}", FIELD_TYPE_MEASURE, ID_SEPARATOR, index)
            }
        }
    }
}

/// Joins segments into a column id.
pub fn encode(segments: &[ColIdSegment]) -> String {
    segments
        .iter()
        .map(ColIdSegment::to_string)
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR_STR)
}

/// Strict counterpart of [`get_parsed_fields`].
pub fn decode(col_id: &str) -> Result<Vec<ColIdSegment>> {
    get_parsed_fields(col_id)
        .iter()
        .map(|field| ColIdSegment::from_field(col_id, field))
        .collect()
}
