//! Subcommand implementations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use ordercheck_cli::render::{
    ack_summary, compare_stats_table, config_table, converted_table, extracted_caption,
    extracted_table, feedback_report, file_status_table, format_guide_table, hints_table,
    mapping_table, preview_table, sheet_table, spec_table, status_line,
};
use ordercheck_cli::settings::{ClientSettings, save_settings, settings_path};
use ordercheck_client::SpecClient;
use ordercheck_map::{
    DialogEvent, DialogOutcome, MappingApi, MappingDialog, SessionError, SessionPhase,
};
use ordercheck_model::{
    ApiError, CompareRequest, ErrorFeedback, ExtractedTable, FileId, FormatRequirements,
    MappingMode, SheetPreview, SpecId,
};
use tracing::{info, warn};

use crate::cli::{CheckArgs, MapArgs, TemplateArgs};

pub fn run_config(client: &SpecClient) -> Result<()> {
    let config = client
        .column_config()
        .map_err(|err| api_failure(&err, "load the column configuration"))?;
    println!("{}", config_table(&config));

    let format = match client.column_mapping_info() {
        Ok(info) => FormatRequirements::from_info(&info),
        Err(err) => {
            warn!(error = %err, "Format guide unavailable, deriving it from the configuration");
            FormatRequirements::from_config(&config)
        }
    };
    println!("Spec file format:");
    println!("{}", format_guide_table(&format));
    Ok(())
}

pub fn run_map(client: SpecClient, args: &MapArgs) -> Result<()> {
    args.validate().map_err(anyhow::Error::msg)?;
    let (file_id, filename) = match (&args.file, &args.file_id, &args.filename) {
        (Some(path), _, _) => {
            let upload = client
                .upload_for_mapping(path)
                .map_err(|err| api_failure(&err, "upload the spec file"))?;
            let filename = upload
                .original_filename
                .clone()
                .or_else(|| {
                    path.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                })
                .unwrap_or_else(|| path.display().to_string());
            info!(file_id = %upload.file_id, "Spec file uploaded");
            (upload.file_id, filename)
        }
        (None, Some(id), Some(filename)) => (FileId::new(id.as_str())?, filename.clone()),
        _ => bail!("either FILE or --file-id with --filename is required"),
    };

    let mode = MappingMode::from(args.mode);
    let mut dialog = MappingDialog::new(client);
    let scope = dialog.show(file_id, filename);
    println!("{}", status_line(dialog.status()));
    if dialog.session().phase() == SessionPhase::LoadFailed {
        bail!(
            "{}",
            dialog
                .session()
                .last_error()
                .unwrap_or("could not load the mapping preview")
        );
    }

    dialog.handle(scope, DialogEvent::TabSelected(mode))?;
    for assignment in &args.set {
        dialog
            .handle(
                scope,
                DialogEvent::ColumnSelected {
                    standard: assignment.standard.clone(),
                    original: assignment.original.clone(),
                },
            )
            .with_context(|| format!("cannot set {}", assignment.standard))?;
    }

    print_preview(&dialog)?;

    if args.dry_run {
        dialog.handle(scope, DialogEvent::CancelClicked)?;
        println!("Dry run: mapping not confirmed.");
        return Ok(());
    }

    match dialog.handle(scope, DialogEvent::ConfirmClicked) {
        Ok(DialogOutcome::Confirmed(ack)) => {
            print!("{}", ack_summary(&ack));
            Ok(())
        }
        Ok(outcome) => bail!("mapping was not confirmed ({outcome:?})"),
        Err(SessionError::Api(err)) => Err(api_failure(&err, "confirm the mapping")),
        Err(err) => {
            if dialog.active_tab() != mode {
                eprintln!("Hint: rerun with --mode custom and --set for the missing columns.");
            }
            Err(err.into())
        }
    }
}

fn print_preview<A: MappingApi>(dialog: &MappingDialog<A>) -> Result<()> {
    let session = dialog.session();
    if let (Some(config), Some(mapping)) = (session.config(), session.mapping(dialog.active_tab()))
    {
        println!("Column mapping ({}):", dialog.active_tab().display_name());
        println!("{}", mapping_table(config, &mapping));
    }
    if let Some(suggestion) = session.suggestion()
        && !suggestion.hints.is_empty()
    {
        println!("Unrecognised columns:");
        println!("{}", hints_table(&suggestion.hints));
    }
    let preview = dialog.preview()?;
    println!("Original data:");
    println!("{}", preview_table(&preview.original));
    println!("Mapped preview:");
    if preview.mapped.columns.is_empty() {
        println!("  (no columns mapped)");
    } else {
        println!("{}", preview_table(&preview.mapped));
    }
    Ok(())
}

pub fn run_specs_list(client: &SpecClient) -> Result<()> {
    let specs = client
        .list_specs()
        .map_err(|err| api_failure(&err, "list specs"))?;
    if specs.is_empty() {
        println!("No specs stored.");
    } else {
        println!("{}", spec_table(&specs));
    }
    Ok(())
}

pub fn run_specs_preview(client: &SpecClient, spec_id: &str) -> Result<()> {
    let spec_id = SpecId::new(spec_id)?;
    let preview = client
        .preview_spec(&spec_id)
        .map_err(|err| api_failure(&err, "preview the spec"))?;
    print_sheet(&preview);
    Ok(())
}

pub fn run_specs_delete(client: &SpecClient, spec_id: &str) -> Result<()> {
    let spec_id = SpecId::new(spec_id)?;
    let ack = client
        .delete_spec(&spec_id)
        .map_err(|err| api_failure(&err, "delete the spec"))?;
    println!(
        "{}",
        ack.message
            .unwrap_or_else(|| format!("Spec {spec_id} deleted"))
    );
    Ok(())
}

pub fn run_check(client: &SpecClient, args: &CheckArgs) -> Result<()> {
    let request = CompareRequest {
        order_file_id: FileId::new(args.order.as_str())?,
        spec_id: SpecId::new(args.spec.as_str())?,
        check_total_calc: !args.skip_total_check,
    };
    let response = client
        .compare_orders(&request)
        .map_err(|err| api_failure(&err, "check the order"))?;
    info!(
        result_id = %response.result_file_id,
        errors = response.stats.error_records,
        "Order check finished"
    );
    println!("Order check complete (result {})", response.result_file_id);
    println!("{}", compare_stats_table(&response.stats));

    if args.preview {
        let preview = client
            .preview_comparison(&response.result_file_id)
            .map_err(|err| api_failure(&err, "preview the check result"))?;
        print_sheet(&preview);
    }
    if let Some(output) = &args.output {
        let bytes = client
            .download_comparison(&response.result_file_id)
            .map_err(|err| api_failure(&err, "download the check result"))?;
        write_download(output, &bytes)?;
    }
    Ok(())
}

pub fn run_pdf_upload(client: &SpecClient, path: &Path, convert: bool) -> Result<()> {
    let upload = client
        .upload_pdf(path)
        .map_err(|err| api_failure(&err, "upload the order PDF"))?;
    info!(file_id = %upload.file_id, "Order PDF uploaded");
    println!(
        "{} (file ID {})",
        upload.message.as_deref().unwrap_or("Uploaded"),
        upload.file_id
    );
    if convert {
        run_pdf_convert(client, upload.file_id.as_str())?;
    } else {
        println!("Convert it with: ordercheck pdf convert {}", upload.file_id);
    }
    Ok(())
}

pub fn run_pdf_convert(client: &SpecClient, file_id: &str) -> Result<()> {
    let file_id = FileId::new(file_id)?;
    let conversion = client
        .convert_pdf(&file_id)
        .map_err(|err| api_failure(&err, "convert the order PDF"))?;
    println!(
        "{}: {} table(s) extracted into {}",
        conversion.message.as_deref().unwrap_or("Converted"),
        conversion.tables_count,
        conversion
            .filename
            .as_deref()
            .unwrap_or(conversion.file_id.as_str())
    );
    print_extracted(&conversion.preview_data);
    Ok(())
}

pub fn run_pdf_list(client: &SpecClient) -> Result<()> {
    let files = client
        .list_converted()
        .map_err(|err| api_failure(&err, "list converted files"))?;
    if files.is_empty() {
        println!("No converted order files.");
        return Ok(());
    }
    println!("{}", converted_table(&files));
    let missing = files.iter().filter(|file| !file.exists).count();
    if missing > 0 {
        eprintln!(
            "Warning: {missing} file(s) are missing on the server; inspect them with `ordercheck status <FILE_ID>`."
        );
    }
    Ok(())
}

pub fn run_pdf_preview(client: &SpecClient, file_id: &str) -> Result<()> {
    let file_id = FileId::new(file_id)?;
    let preview = client
        .preview_pdf(&file_id)
        .map_err(|err| api_failure(&err, "preview the order PDF"))?;
    println!("{} table(s) found", preview.tables_count);
    print_extracted(&preview.preview_data);
    Ok(())
}

pub fn run_pdf_download(
    client: &SpecClient,
    file_id: &str,
    output: Option<&Path>,
) -> Result<()> {
    let file_id = FileId::new(file_id)?;
    let bytes = client
        .download_converted(&file_id)
        .map_err(|err| api_failure(&err, "download the converted file"))?;
    let output =
        output.map_or_else(|| PathBuf::from(format!("{file_id}.xlsx")), Path::to_path_buf);
    write_download(&output, &bytes)
}

pub fn run_pdf_delete(client: &SpecClient, file_id: &str) -> Result<()> {
    let file_id = FileId::new(file_id)?;
    let ack = client
        .delete_converted(&file_id)
        .map_err(|err| api_failure(&err, "delete the converted file"))?;
    println!(
        "{}",
        ack.message
            .unwrap_or_else(|| format!("Converted file {file_id} deleted"))
    );
    Ok(())
}

fn print_sheet(preview: &SheetPreview) {
    if preview.data.is_empty() {
        println!("  (no rows)");
        return;
    }
    println!("{}", sheet_table(preview));
    if preview.is_truncated() {
        println!(
            "Showing {} of {} rows.",
            preview.data.len(),
            preview.total_rows.unwrap_or_default()
        );
    }
    if let Some(errors) = preview.error_rows {
        println!("Rows with problems: {errors}");
    }
}

fn print_extracted(tables: &[ExtractedTable]) {
    if tables.is_empty() {
        println!("  (no tables)");
    }
    for table in tables {
        println!("{}", extracted_caption(table));
        println!("{}", extracted_table(table));
    }
}

fn write_download(output: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(output, bytes).with_context(|| format!("failed to write {}", output.display()))?;
    println!("Saved {} bytes to {}", bytes.len(), output.display());
    Ok(())
}

pub fn run_status(client: &SpecClient, file_id: &str) -> Result<()> {
    let file_id = FileId::new(file_id)?;
    let status = client
        .file_status(&file_id)
        .map_err(|err| api_failure(&err, "check the file status"))?;
    println!("{}", file_status_table(&status));
    Ok(())
}

pub fn run_template(
    client: &SpecClient,
    settings: &ClientSettings,
    args: &TemplateArgs,
) -> Result<()> {
    let rows = args.rows.unwrap_or(settings.template_rows);
    let bytes = client
        .download_template(rows)
        .map_err(|err| api_failure(&err, "download the template"))?;
    info!(rows, "Spec template downloaded");
    write_download(&args.output, &bytes)
}

pub fn run_settings(settings: &ClientSettings, save: bool) -> Result<()> {
    match settings_path() {
        Some(path) => println!("Settings file: {}", path.display()),
        None => println!("Settings file: (unavailable on this platform)"),
    }
    print!("{}", toml::to_string_pretty(settings)?);
    if save {
        let path = save_settings(settings)?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}

/// Print the server's feedback report, if any, and wrap the error.
fn api_failure(err: &ApiError, action: &str) -> anyhow::Error {
    if let Some(body) = err.body() {
        eprint!("{}", feedback_report(&ErrorFeedback::from_body(body)));
    }
    anyhow::Error::new(err.clone()).context(format!("could not {action}"))
}
