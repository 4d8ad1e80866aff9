//! ordercheck command-line client.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use ordercheck_cli::logging::{LogConfig, LogFormat, init_logging};
use ordercheck_cli::settings::{BASE_URL_ENV, Overrides, load_settings};
use ordercheck_client::SpecClient;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, PdfCommand, SpecsCommand};
use crate::commands::{
    run_check, run_config, run_map, run_pdf_convert, run_pdf_delete, run_pdf_download,
    run_pdf_list, run_pdf_preview, run_pdf_upload, run_settings, run_specs_delete,
    run_specs_list, run_specs_preview, run_status, run_template,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings().with_overrides(Overrides {
        base_url: cli.base_url.clone(),
        timeout_secs: cli.timeout,
        env_base_url: std::env::var(BASE_URL_ENV).ok(),
    });
    if let Command::Settings { save } = cli.command {
        return run_settings(&settings, save);
    }

    let client = SpecClient::new(&settings.client_config())?;
    tracing::debug!(base_url = client.base_url(), "Client ready");
    match cli.command {
        Command::Config => run_config(&client),
        Command::Map(args) => run_map(client, &args),
        Command::Check(args) => run_check(&client, &args),
        Command::Pdf(PdfCommand::Upload { file, no_convert }) => {
            run_pdf_upload(&client, &file, !no_convert)
        }
        Command::Pdf(PdfCommand::Convert { file_id }) => run_pdf_convert(&client, &file_id),
        Command::Pdf(PdfCommand::List) => run_pdf_list(&client),
        Command::Pdf(PdfCommand::Preview { file_id }) => run_pdf_preview(&client, &file_id),
        Command::Pdf(PdfCommand::Download { file_id, output }) => {
            run_pdf_download(&client, &file_id, output.as_deref())
        }
        Command::Pdf(PdfCommand::Delete { file_id }) => run_pdf_delete(&client, &file_id),
        Command::Specs(SpecsCommand::List) => run_specs_list(&client),
        Command::Specs(SpecsCommand::Preview { spec_id }) => run_specs_preview(&client, &spec_id),
        Command::Specs(SpecsCommand::Delete { spec_id }) => run_specs_delete(&client, &spec_id),
        Command::Status { file_id } => run_status(&client, &file_id),
        Command::Template(args) => run_template(&client, &settings, &args),
        Command::Settings { .. } => Ok(()),
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
