//! Preview tables projected from sample rows.
//!
//! These are pure functions of the session's loaded data: the original table
//! shows every discovered column, the mapped table shows the standard columns
//! selected by a mapping, in configuration order.

use std::collections::BTreeMap;

use ordercheck_model::{ColumnConfig, MappingMode, PreviewRow};

/// Header of a projected column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewColumn {
    /// Column shown in the header.
    pub name: String,
    /// True for required standard columns.
    pub required: bool,
    /// Original column the values are read from.
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedRow {
    pub row_index: u64,
    /// Display text, one entry per column.
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectedTable {
    pub columns: Vec<PreviewColumn>,
    pub rows: Vec<ProjectedRow>,
}

impl ProjectedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    fn from_columns(columns: Vec<PreviewColumn>, rows: &[PreviewRow]) -> Self {
        let rows = rows
            .iter()
            .map(|row| ProjectedRow {
                row_index: row.row_index,
                cells: columns.iter().map(|c| row.cell_text(&c.source)).collect(),
            })
            .collect();
        Self { columns, rows }
    }
}

/// Side-by-side preview for one mapping mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedPreview {
    pub mode: MappingMode,
    pub original: ProjectedTable,
    pub mapped: ProjectedTable,
}

/// Table of the sample rows with every discovered original column.
pub fn original_table(original_columns: &[String], rows: &[PreviewRow]) -> ProjectedTable {
    let columns = original_columns
        .iter()
        .map(|name| PreviewColumn {
            name: name.clone(),
            required: false,
            source: name.clone(),
        })
        .collect();
    ProjectedTable::from_columns(columns, rows)
}

/// Table of the sample rows under a standard -> original mapping.
///
/// Only configured standard columns that the mapping assigns are shown.
pub fn mapped_table(
    config: &ColumnConfig,
    mapping: &BTreeMap<String, String>,
    rows: &[PreviewRow],
) -> ProjectedTable {
    let columns = config
        .standard_columns()
        .filter_map(|standard| {
            mapping.get(standard).map(|original| PreviewColumn {
                name: standard.to_string(),
                required: config.is_required(standard),
                source: original.clone(),
            })
        })
        .collect();
    ProjectedTable::from_columns(columns, rows)
}

/// Invert an original -> standard mapping into standard -> original.
///
/// When several originals claim the same standard column the first one in
/// key order wins.
pub fn invert_mapping(mapped_columns: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut inverted = BTreeMap::new();
    for (original, standard) in mapped_columns {
        inverted
            .entry(standard.clone())
            .or_insert_with(|| original.clone());
    }
    inverted
}
