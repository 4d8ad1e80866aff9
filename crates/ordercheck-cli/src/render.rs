//! Terminal rendering of previews, spec lists and error reports.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::NaiveDateTime;
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use ordercheck_map::{DialogStatus, ProjectedTable};
use ordercheck_model::feedback::GENERAL_ADVICE;
use ordercheck_model::{
    ColumnConfig, ColumnSuggestion, CompareStats, ConfirmAck, ConvertedFile, ErrorFeedback,
    ExtractedTable, FileStatus, FormatRequirements, SheetPreview, SpecSummary, Suggestion,
};

/// Status value the server writes into comparison rows with problems.
const ROW_FAILED: &str = "有问题";

pub fn preview_table(projected: &ProjectedTable) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("#")];
    header.extend(projected.columns.iter().map(|column| {
        if column.required {
            header_cell(&format!("{} *", column.name))
        } else {
            header_cell(&column.name)
        }
    }));
    table.set_header(header);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for row in &projected.rows {
        let mut cells = vec![dim_cell(row.row_index)];
        cells.extend(row.cells.iter().map(|text| {
            if text.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(text)
            }
        }));
        table.add_row(cells);
    }
    table
}

/// Standard columns with their source column under the current overrides.
pub fn mapping_table(config: &ColumnConfig, overrides: &BTreeMap<String, String>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Standard column"),
        header_cell("Required"),
        header_cell("Source column"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for standard in config.standard_columns() {
        let required = config.is_required(standard);
        let source = match overrides.get(standard) {
            Some(original) => Cell::new(original),
            None if required => Cell::new("missing")
                .fg(Color::Red)
                .add_attribute(Attribute::Bold),
            None => dim_cell("-"),
        };
        table.add_row(vec![
            Cell::new(standard),
            if required {
                Cell::new("yes").fg(Color::Yellow)
            } else {
                dim_cell("no")
            },
            source,
        ]);
    }
    table
}

/// Server hints for columns it could not map.
pub fn hints_table(hints: &BTreeMap<String, ColumnSuggestion>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Original column"),
        header_cell("Candidates"),
        header_cell("Confidence"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for (original, hint) in hints {
        let mut candidates = hint.suggestions.clone();
        if let Some(mapped) = &hint.mapped_to
            && !candidates.contains(mapped)
        {
            candidates.insert(0, mapped.clone());
        }
        table.add_row(vec![
            Cell::new(original),
            Cell::new(candidates.join(", ")),
            match hint.confidence {
                Some(value) => Cell::new(format!("{:.0}%", value * 100.0)),
                None => dim_cell("-"),
            },
        ]);
    }
    table
}

pub fn config_table(config: &ColumnConfig) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Standard column"),
        header_cell("Required"),
        header_cell("Aliases"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for standard in config.standard_columns() {
        let aliases = config.aliases(standard);
        table.add_row(vec![
            Cell::new(standard).add_attribute(Attribute::Bold),
            if config.is_required(standard) {
                Cell::new("yes").fg(Color::Yellow)
            } else {
                dim_cell("no")
            },
            if aliases.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(aliases.join(", "))
            },
        ]);
    }
    table
}

/// Required and optional columns with descriptions and header examples.
pub fn format_guide_table(format: &FormatRequirements) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Required"),
        header_cell("Description"),
        header_cell("Example headers"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for (required, columns) in [(true, &format.required), (false, &format.optional)] {
        for column in columns {
            table.add_row(vec![
                Cell::new(&column.name).add_attribute(Attribute::Bold),
                if required {
                    Cell::new("yes").fg(Color::Yellow)
                } else {
                    dim_cell("no")
                },
                match &column.description {
                    Some(description) => Cell::new(description),
                    None => dim_cell("-"),
                },
                if column.examples.is_empty() {
                    dim_cell("-")
                } else {
                    Cell::new(column.examples.join(", "))
                },
            ]);
        }
    }
    table
}

/// Totals of an order check followed by one row per problem kind.
pub fn compare_stats_table(stats: &CompareStats) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Result"), header_cell("Rows")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![
        Cell::new("Total records").add_attribute(Attribute::Bold),
        Cell::new(stats.total_records),
    ]);
    table.add_row(vec![
        Cell::new("Passed"),
        Cell::new(stats.passed_records()).fg(Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("With problems"),
        if stats.error_records > 0 {
            Cell::new(stats.error_records).fg(Color::Red)
        } else {
            dim_cell(0)
        },
    ]);
    table.add_row(vec![
        Cell::new("Pass rate"),
        Cell::new(format!("{:.1}%", stats.pass_rate())).add_attribute(Attribute::Bold),
    ]);
    for (kind, count) in stats.error_counts() {
        table.add_row(vec![
            Cell::new(format!("  {}", kind.display_name())),
            Cell::new(count).fg(Color::Yellow),
        ]);
    }
    table
}

/// Rows of a stored workbook; comparison rows with problems are highlighted.
pub fn sheet_table(preview: &SheetPreview) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("#")];
    header.extend(preview.column_names().iter().map(|name| header_cell(name)));
    table.set_header(header);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, row) in preview.rows().into_iter().enumerate() {
        let failed = row.iter().any(|cell| cell == ROW_FAILED);
        let mut cells = vec![dim_cell(index + 1)];
        cells.extend(row.into_iter().map(|text| {
            if text.is_empty() {
                dim_cell("-")
            } else if failed {
                Cell::new(text).fg(Color::Red)
            } else {
                Cell::new(text)
            }
        }));
        table.add_row(cells);
    }
    table
}

/// One table extracted from an order PDF.
pub fn extracted_table(extracted: &ExtractedTable) -> Table {
    let mut table = Table::new();
    if !extracted.columns.is_empty() {
        table.set_header(
            extracted
                .columns
                .iter()
                .map(|name| header_cell(name))
                .collect::<Vec<_>>(),
        );
    }
    apply_table_style(&mut table);
    for row in extracted.rows() {
        table.add_row(row.into_iter().map(|text| {
            if text.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(text)
            }
        }));
    }
    table
}

/// Caption line above an extracted table.
pub fn extracted_caption(extracted: &ExtractedTable) -> String {
    let mut caption = format!("Table {} (page {})", extracted.table_index, extracted.page);
    if let Some(accuracy) = extracted.accuracy {
        let _ = write!(caption, ", accuracy {:.0}%", accuracy * 100.0);
    }
    if let Some(total) = extracted.total_rows
        && total > extracted.data.len() as u64
    {
        let _ = write!(caption, ", showing {} of {total} rows", extracted.data.len());
    }
    caption
}

pub fn converted_table(files: &[ConvertedFile]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File ID"),
        header_cell("File"),
        header_cell("Source PDF"),
        header_cell("Converted"),
        header_cell("Bytes"),
        header_cell("Records"),
        header_cell("Present"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    align_column(&mut table, 6, CellAlignment::Center);
    for file in files {
        table.add_row(vec![
            dim_cell(file.file_id.as_str()),
            Cell::new(file.display_name()),
            match &file.original_filename {
                Some(name) if !name.is_empty() => Cell::new(name),
                _ => dim_cell("-"),
            },
            Cell::new(format_upload_time(&file.convert_time)),
            Cell::new(file.file_size),
            Cell::new(file.record_count),
            if file.exists {
                Cell::new("yes").fg(Color::Green)
            } else {
                Cell::new("missing")
                    .fg(Color::Red)
                    .add_attribute(Attribute::Bold)
            },
        ]);
    }
    table
}

pub fn spec_table(specs: &[SpecSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Spec ID"),
        header_cell("File"),
        header_cell("Uploaded"),
        header_cell("Bytes"),
        header_cell("Records"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for spec in specs {
        table.add_row(vec![
            dim_cell(spec.spec_id.as_str()),
            Cell::new(&spec.filename),
            Cell::new(format_upload_time(&spec.upload_time)),
            Cell::new(spec.file_size),
            Cell::new(spec.record_count),
        ]);
    }
    table
}

pub fn file_status_table(status: &FileStatus) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Item"), header_cell("Value")]);
    apply_table_style(&mut table);
    let flag = |present: bool| {
        if present {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::Red)
        }
    };
    table.add_row(vec![
        Cell::new("Status"),
        Cell::new(status.status.as_deref().unwrap_or("unknown")),
    ]);
    if let Some(filename) = &status.filename {
        table.add_row(vec![Cell::new("File"), Cell::new(filename)]);
    }
    table.add_row(vec![Cell::new("PDF"), flag(status.pdf_exists)]);
    table.add_row(vec![Cell::new("Excel"), flag(status.excel_exists)]);
    table.add_row(vec![Cell::new("Metadata"), flag(status.metadata_exists)]);
    table
}

pub fn status_line(status: &DialogStatus) -> String {
    match status {
        DialogStatus::Idle => "Idle".to_string(),
        DialogStatus::Loading => "Loading mapping preview...".to_string(),
        DialogStatus::AutoComplete { mapped } => {
            format!("Automatic mapping complete ({mapped} columns recognised)")
        }
        DialogStatus::AutoIncomplete { missing } => format!(
            "Automatic mapping incomplete, missing required columns: {}",
            missing.join(", ")
        ),
        DialogStatus::Error(message) => format!("Error: {message}"),
        DialogStatus::Confirmed { message } => message.clone(),
    }
}

pub fn ack_summary(ack: &ConfirmAck) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        ack.message.as_deref().unwrap_or("Mapping confirmed")
    );
    if let Some(spec_id) = &ack.spec_id {
        let _ = writeln!(out, "  Spec ID:  {spec_id}");
    }
    if let Some(filename) = &ack.filename {
        let _ = writeln!(out, "  File:     {filename}");
    }
    if let Some(count) = ack.record_count {
        let _ = writeln!(out, "  Records:  {count}");
    }
    if let Some(mode) = ack.mapping_type {
        match ack.mapping_count {
            Some(count) => {
                let _ = writeln!(out, "  Mapping:  {} ({count} columns)", mode.display_name());
            }
            None => {
                let _ = writeln!(out, "  Mapping:  {}", mode.display_name());
            }
        }
    }
    if let Some(time) = &ack.upload_time {
        let _ = writeln!(out, "  Uploaded: {}", format_upload_time(time));
    }
    out
}

/// Multi-section report for a failed upload or confirmation.
pub fn feedback_report(feedback: &ErrorFeedback) -> String {
    let mut out = String::new();
    match &feedback.error_code {
        Some(code) => {
            let _ = writeln!(out, "{} [{code}]", feedback.headline);
        }
        None => {
            let _ = writeln!(out, "{}", feedback.headline);
        }
    }
    if let Some(detail) = &feedback.detail {
        let _ = writeln!(out, "  {detail}");
    }

    if feedback.has_details() {
        let _ = writeln!(out, "\nDetails:");
        for warning in &feedback.warnings {
            let _ = writeln!(out, "  ! {warning}");
        }
        for error in &feedback.data_errors {
            let _ = write!(
                out,
                "  {} ({}): {}",
                error.column,
                error.kind.display_name(),
                error.message
            );
            if !error.rows.is_empty() {
                let _ = write!(out, " [rows: {}]", error.rows.join(", "));
            }
            if !error.values.is_empty() {
                let _ = write!(out, " [values: {}]", error.values.join(", "));
            }
            out.push('\n');
        }
        if let Some(mapping) = &feedback.mapping {
            if !mapping.missing_required.is_empty() {
                let _ = writeln!(
                    out,
                    "  Missing required columns: {}",
                    mapping.missing_required.join(", ")
                );
            }
            if !mapping.unmapped_columns.is_empty() {
                let _ = writeln!(
                    out,
                    "  Unrecognised columns: {}",
                    mapping.unmapped_columns.join(", ")
                );
            }
        }
    }

    let _ = writeln!(out, "\nSuggestions:");
    for suggestion in &feedback.suggestions {
        write_suggestion(&mut out, suggestion);
    }
    for (column, candidates) in &feedback.possible_mappings {
        let _ = writeln!(
            out,
            "  - \"{column}\" may correspond to: {}",
            candidates.join(", ")
        );
    }
    if feedback.needs_general_advice() {
        for advice in GENERAL_ADVICE {
            let _ = writeln!(out, "  - {advice}");
        }
    }

    let _ = writeln!(out, "\nExpected format:");
    for (label, columns) in [
        ("required", &feedback.format.required),
        ("optional", &feedback.format.optional),
    ] {
        for column in columns {
            let _ = write!(out, "  {} ({label})", column.name);
            if let Some(description) = &column.description {
                let _ = write!(out, ": {description}");
            }
            if !column.examples.is_empty() {
                let _ = write!(out, " e.g. {}", column.examples.join(", "));
            }
            out.push('\n');
        }
    }
    out
}

fn write_suggestion(out: &mut String, suggestion: &Suggestion) {
    let _ = write!(out, "  - {}", suggestion.title());
    match suggestion {
        Suggestion::ColumnMapping { candidates, .. } => {
            let _ = write!(out, ": {}", candidates.join(", "));
        }
        Suggestion::MissingColumns { columns, .. } => {
            let _ = write!(out, ": {}", columns.join(", "));
        }
        Suggestion::NullValues {
            column,
            advice,
            rows,
            suggested_values,
            ..
        } => {
            let _ = write!(out, " ({column}, rows {})", rows.join(", "));
            if let Some(advice) = advice {
                let _ = write!(out, "; {advice}");
            }
            if !suggested_values.is_empty() {
                let _ = write!(out, "; try: {}", suggested_values.join(", "));
            }
        }
        Suggestion::DuplicateValues {
            column,
            advice,
            rows,
            values,
            suggested_values,
            ..
        } => {
            let _ = write!(out, " ({column}, rows {})", rows.join(", "));
            if !values.is_empty() {
                let _ = write!(out, "; duplicates: {}", values.join(", "));
            }
            if let Some(advice) = advice {
                let _ = write!(out, "; {advice}");
            }
            if !suggested_values.is_empty() {
                let _ = write!(out, "; try: {}", suggested_values.join(", "));
            }
        }
        Suggestion::Generic {
            advice,
            rows,
            values,
            ..
        } => {
            if let Some(advice) = advice {
                let _ = write!(out, ": {advice}");
            }
            if !rows.is_empty() {
                let _ = write!(out, " [rows: {}]", rows.join(", "));
            }
            if !values.is_empty() {
                let _ = write!(out, " [values: {}]", values.join(", "));
            }
        }
    }
    out.push('\n');
}

/// Server timestamps are ISO 8601 without zone; shown to the minute.
pub fn format_upload_time(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
