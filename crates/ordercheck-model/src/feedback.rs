//! Structured error feedback returned by the spec endpoints.
//!
//! Failed uploads and confirmations come back with a JSON body that, besides
//! the `error`/`message` pair, may describe data errors, mapping problems,
//! fix suggestions and the expected file format. [`ErrorBody`] mirrors that
//! wire shape loosely; [`ErrorFeedback`] is the typed report built from it.
//!
//! Suggestion entries arrive as a string-keyed object whose key encodes the
//! kind (`column_mapping`, `missing_columns`, `<column>_null`,
//! `<column>_duplicate`, anything else). [`Suggestion`] turns that convention
//! into a tagged variant so consumers can match exhaustively.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ColumnConfig;
use crate::preview::display_cell;

/// Checklist shown when the server offers no specific suggestion.
pub const GENERAL_ADVICE: &[&str] = &[
    "Make sure the Excel file contains every required column",
    "Check that column headers match a configured name or alias",
    "Make sure required columns contain no empty cells",
    "Check numeric columns for non-numeric values",
    "Consider a custom mapping to assign columns by hand",
];

/// Loosely typed error body as sent by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub data_errors: BTreeMap<String, RawDataError>,
    #[serde(default)]
    pub mapping_result: Option<MappingProblems>,
    #[serde(default)]
    pub suggestions: BTreeMap<String, RawSuggestion>,
    #[serde(default)]
    pub structured_suggestions: BTreeMap<String, StructuredSuggestion>,
    #[serde(default)]
    pub column_mapping_info: Option<ColumnMappingInfo>,
}

impl ErrorBody {
    /// Human-readable message: `error` first, then `message`.
    pub fn headline(&self) -> Option<&str> {
        non_blank(self.error.as_deref()).or_else(|| non_blank(self.message.as_deref()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDataError {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub rows: Vec<Value>,
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSuggestion {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Value>,
    #[serde(default)]
    pub values: Vec<Value>,
    #[serde(default)]
    pub suggested_values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredSuggestion {
    #[serde(default)]
    pub possible_mappings: Vec<String>,
}

/// Mapping outcome attached to a failed auto-mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingProblems {
    #[serde(default)]
    pub missing_required: Vec<String>,
    #[serde(default)]
    pub unmapped_columns: Vec<String>,
}

impl MappingProblems {
    pub fn is_empty(&self) -> bool {
        self.missing_required.is_empty() && self.unmapped_columns.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMappingInfo {
    #[serde(default)]
    pub required_columns: Vec<String>,
    #[serde(default)]
    pub optional_columns: Vec<String>,
    #[serde(default)]
    pub required_columns_description: BTreeMap<String, ColumnDescription>,
    #[serde(default)]
    pub optional_columns_description: BTreeMap<String, ColumnDescription>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescription {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Kind of a per-column data error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataErrorKind {
    NullValues,
    DuplicateValues,
    InvalidType,
    NegativeValues,
    FormatError,
    RangeError,
    ReferenceError,
    Other(String),
}

impl DataErrorKind {
    pub fn parse(code: &str) -> Self {
        match code {
            "null_values" => Self::NullValues,
            "duplicate_values" => Self::DuplicateValues,
            "invalid_type" => Self::InvalidType,
            "negative_values" => Self::NegativeValues,
            "format_error" => Self::FormatError,
            "range_error" => Self::RangeError,
            "reference_error" => Self::ReferenceError,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::NullValues => "Empty values",
            Self::DuplicateValues => "Duplicate values",
            Self::InvalidType => "Invalid data type",
            Self::NegativeValues => "Negative values",
            Self::FormatError => "Format error",
            Self::RangeError => "Out of range",
            Self::ReferenceError => "Reference error",
            Self::Other(code) => code,
        }
    }
}

/// A data error reported for one standard column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataError {
    pub column: String,
    pub kind: DataErrorKind,
    pub message: String,
    pub rows: Vec<String>,
    pub values: Vec<String>,
}

/// A fix suggestion, one variant per suggestion kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// Candidate standard columns for an unrecognised header.
    ColumnMapping {
        message: Option<String>,
        candidates: Vec<String>,
    },
    /// Required columns absent from the file.
    MissingColumns {
        message: Option<String>,
        columns: Vec<String>,
    },
    /// Empty cells in a column, optionally with proposed fill values.
    NullValues {
        column: String,
        message: Option<String>,
        advice: Option<String>,
        rows: Vec<String>,
        suggested_values: Vec<String>,
    },
    /// Repeated values in a column that must be unique.
    DuplicateValues {
        column: String,
        message: Option<String>,
        advice: Option<String>,
        rows: Vec<String>,
        values: Vec<String>,
        suggested_values: Vec<String>,
    },
    Generic {
        key: String,
        message: Option<String>,
        advice: Option<String>,
        rows: Vec<String>,
        values: Vec<String>,
    },
}

impl Suggestion {
    /// Classify one entry of the server's `suggestions` object.
    pub fn from_entry(key: &str, raw: &RawSuggestion) -> Self {
        let message = raw.message.clone();
        if key == "column_mapping" && !raw.suggestions.is_empty() {
            return Self::ColumnMapping {
                message,
                candidates: raw.suggestions.clone(),
            };
        }
        if key == "missing_columns" && !raw.columns.is_empty() {
            return Self::MissingColumns {
                message,
                columns: raw.columns.clone(),
            };
        }
        if !raw.rows.is_empty() {
            if let Some(column) = key.strip_suffix("_null") {
                return Self::NullValues {
                    column: column.to_string(),
                    message,
                    advice: raw.suggestion.clone(),
                    rows: texts(&raw.rows),
                    suggested_values: texts(&raw.suggested_values),
                };
            }
            if let Some(column) = key.strip_suffix("_duplicate") {
                return Self::DuplicateValues {
                    column: column.to_string(),
                    message,
                    advice: raw.suggestion.clone(),
                    rows: texts(&raw.rows),
                    values: texts(&raw.values),
                    suggested_values: texts(&raw.suggested_values),
                };
            }
        }
        Self::Generic {
            key: key.to_string(),
            message,
            advice: raw.suggestion.clone(),
            rows: texts(&raw.rows),
            values: texts(&raw.values),
        }
    }

    pub fn title(&self) -> &str {
        let message = match self {
            Self::ColumnMapping { message, .. }
            | Self::MissingColumns { message, .. }
            | Self::NullValues { message, .. }
            | Self::DuplicateValues { message, .. }
            | Self::Generic { message, .. } => message.as_deref(),
        };
        message.unwrap_or("Suggested fix")
    }
}

fn texts(values: &[Value]) -> Vec<String> {
    values.iter().map(display_cell).collect()
}

/// Expected format of one standard column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRequirement {
    pub name: String,
    pub description: Option<String>,
    pub examples: Vec<String>,
}

/// Required and optional columns a spec file must follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatRequirements {
    pub required: Vec<ColumnRequirement>,
    pub optional: Vec<ColumnRequirement>,
}

impl FormatRequirements {
    pub fn from_info(info: &ColumnMappingInfo) -> Self {
        let describe = |columns: &[String], descriptions: &BTreeMap<String, ColumnDescription>| {
            columns
                .iter()
                .map(|name| {
                    let entry = descriptions.get(name);
                    ColumnRequirement {
                        name: name.clone(),
                        description: entry.and_then(|d| d.description.clone()),
                        examples: entry.map(|d| d.examples.clone()).unwrap_or_default(),
                    }
                })
                .collect::<Vec<_>>()
        };
        Self {
            required: describe(&info.required_columns, &info.required_columns_description),
            optional: describe(&info.optional_columns, &info.optional_columns_description),
        }
    }

    /// Requirements derived from a column configuration (aliases as examples).
    pub fn from_config(config: &ColumnConfig) -> Self {
        let describe = |columns: &[String]| {
            columns
                .iter()
                .map(|name| ColumnRequirement {
                    name: name.clone(),
                    description: default_description(name).map(str::to_string),
                    examples: config.aliases(name).iter().take(3).cloned().collect(),
                })
                .collect::<Vec<_>>()
        };
        Self {
            required: describe(&config.required_columns),
            optional: describe(&config.optional_columns),
        }
    }
}

impl Default for FormatRequirements {
    fn default() -> Self {
        let bare = |names: &[&str]| {
            names
                .iter()
                .map(|name| ColumnRequirement {
                    name: (*name).to_string(),
                    description: default_description(name).map(str::to_string),
                    examples: Vec::new(),
                })
                .collect::<Vec<_>>()
        };
        Self {
            required: bare(&["item_id", "product_name"]),
            optional: bare(&["size", "color", "standard_unit_price"]),
        }
    }
}

fn default_description(column: &str) -> Option<&'static str> {
    match column {
        "item_id" => Some("Unique product identifier, must not be empty"),
        "product_name" => Some("Product name or description"),
        "size" => Some("Product size or specification"),
        "color" => Some("Product color"),
        "standard_unit_price" => Some("Standard unit price, must be a number"),
        _ => None,
    }
}

/// Typed, display-ready report built from an [`ErrorBody`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorFeedback {
    pub headline: String,
    pub error_code: Option<String>,
    /// Secondary message, present only when it differs from the headline.
    pub detail: Option<String>,
    pub warnings: Vec<String>,
    pub data_errors: Vec<DataError>,
    pub mapping: Option<MappingProblems>,
    pub suggestions: Vec<Suggestion>,
    /// original column -> candidate standard columns
    pub possible_mappings: Vec<(String, Vec<String>)>,
    pub format: FormatRequirements,
}

impl ErrorFeedback {
    pub fn from_body(body: &ErrorBody) -> Self {
        let headline = body.headline().unwrap_or("Validation failed").to_string();
        let detail = non_blank(body.message.as_deref())
            .filter(|m| *m != headline)
            .map(str::to_string);
        let data_errors = body
            .data_errors
            .iter()
            .map(|(column, raw)| DataError {
                column: column.clone(),
                kind: DataErrorKind::parse(raw.kind.as_deref().unwrap_or_default()),
                message: raw.message.clone().unwrap_or_default(),
                rows: texts(&raw.rows),
                values: texts(&raw.values),
            })
            .collect();
        let suggestions = body
            .suggestions
            .iter()
            .map(|(key, raw)| Suggestion::from_entry(key, raw))
            .collect();
        let possible_mappings = body
            .structured_suggestions
            .iter()
            .filter(|(_, s)| !s.possible_mappings.is_empty())
            .map(|(column, s)| (column.clone(), s.possible_mappings.clone()))
            .collect();
        let format = body
            .column_mapping_info
            .as_ref()
            .map(FormatRequirements::from_info)
            .unwrap_or_default();
        Self {
            headline,
            error_code: body.error_code.clone(),
            detail,
            warnings: body.warnings.clone(),
            data_errors,
            mapping: body.mapping_result.clone().filter(|m| !m.is_empty()),
            suggestions,
            possible_mappings,
            format,
        }
    }

    /// True when the report has more than the headline to show.
    pub fn has_details(&self) -> bool {
        !self.warnings.is_empty() || !self.data_errors.is_empty() || self.mapping.is_some()
    }

    /// True when neither typed suggestions nor column hints are available,
    /// in which case [`GENERAL_ADVICE`] applies.
    pub fn needs_general_advice(&self) -> bool {
        self.suggestions.is_empty() && self.possible_mappings.is_empty()
    }
}
