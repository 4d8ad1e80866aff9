//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use ordercheck_model::MappingMode;

#[derive(Parser)]
#[command(
    name = "ordercheck",
    version,
    about = "Confirm spec-file column mappings against the ordercheck server",
    long_about = "Upload an Excel spec file, review the server's column mapping,\n\
                  adjust it by hand if needed and confirm it. Convert order PDFs\n\
                  and check them against a stored spec."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Server address (overrides ORDERCHECK_BASE_URL and the settings file).
    #[arg(long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds (0 disables it).
    #[arg(long = "timeout", value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the standard columns, their aliases and the spec format guide.
    Config,

    /// Review and confirm the column mapping of a spec file.
    Map(MapArgs),

    /// Check a converted order file against a stored spec.
    Check(CheckArgs),

    /// Upload, convert and manage order PDFs.
    #[command(subcommand)]
    Pdf(PdfCommand),

    /// Manage stored specs.
    #[command(subcommand)]
    Specs(SpecsCommand),

    /// Show the conversion status of an order file.
    Status {
        #[arg(value_name = "FILE_ID")]
        file_id: String,
    },

    /// Download the spec file template.
    Template(TemplateArgs),

    /// Show the effective client settings.
    Settings {
        /// Write the effective settings to the settings file.
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args)]
pub struct MapArgs {
    /// Spec file to upload.
    #[arg(value_name = "FILE", required_unless_present = "file_id")]
    pub file: Option<PathBuf>,

    /// Use a file that was already uploaded for mapping.
    #[arg(
        long = "file-id",
        value_name = "ID",
        conflicts_with = "file",
        requires = "filename"
    )]
    pub file_id: Option<String>,

    /// Original filename of the uploaded file.
    #[arg(long = "filename", value_name = "NAME", requires = "file_id")]
    pub filename: Option<String>,

    /// Which mapping to confirm.
    #[arg(long = "mode", value_enum, default_value = "auto")]
    pub mode: ModeArg,

    /// Set a source column: `standard=original`, or `standard=` to clear.
    #[arg(long = "set", value_name = "STANDARD=ORIGINAL", value_parser = parse_assignment)]
    pub set: Vec<Assignment>,

    /// Show the preview without confirming.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl MapArgs {
    /// Reject combinations that would silently ignore user input.
    pub fn validate(&self) -> Result<(), String> {
        if !self.set.is_empty() && matches!(self.mode, ModeArg::Auto) {
            return Err(
                "--set only takes effect with --mode custom; automatic mapping ignores overrides"
                    .to_string(),
            );
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum SpecsCommand {
    /// List stored specs.
    List,
    /// Show the first rows of a stored spec.
    Preview {
        #[arg(value_name = "SPEC_ID")]
        spec_id: String,
    },
    /// Delete a stored spec.
    Delete {
        #[arg(value_name = "SPEC_ID")]
        spec_id: String,
    },
}

#[derive(Args)]
pub struct CheckArgs {
    /// Converted order file (see `ordercheck pdf list`).
    #[arg(long = "order", value_name = "FILE_ID")]
    pub order: String,

    /// Spec to check against (see `ordercheck specs list`).
    #[arg(long = "spec", value_name = "SPEC_ID")]
    pub spec: String,

    /// Do not verify quantity x unit price against the row total.
    #[arg(long = "skip-total-check")]
    pub skip_total_check: bool,

    /// Print the first rows of the result.
    #[arg(long = "preview")]
    pub preview: bool,

    /// Save the result workbook.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum PdfCommand {
    /// Upload an order PDF and convert it to Excel.
    Upload {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Only upload; convert later with `pdf convert`.
        #[arg(long = "no-convert")]
        no_convert: bool,
    },
    /// Convert an uploaded order PDF.
    Convert {
        #[arg(value_name = "FILE_ID")]
        file_id: String,
    },
    /// List converted order files.
    List,
    /// Show the tables extracted from an uploaded order PDF.
    Preview {
        #[arg(value_name = "FILE_ID")]
        file_id: String,
    },
    /// Save a converted order workbook.
    Download {
        #[arg(value_name = "FILE_ID")]
        file_id: String,
        /// Defaults to `<FILE_ID>.xlsx`.
        #[arg(long = "output", short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Delete a converted order file.
    Delete {
        #[arg(value_name = "FILE_ID")]
        file_id: String,
    },
}

#[derive(Args)]
pub struct TemplateArgs {
    /// Sample rows in the template (default from settings).
    #[arg(long = "rows", value_name = "N")]
    pub rows: Option<u32>,

    /// Where to save the template.
    #[arg(
        long = "output",
        short = 'o',
        value_name = "PATH",
        default_value = "spec_template.xlsx"
    )]
    pub output: PathBuf,
}

/// One `--set` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub standard: String,
    pub original: Option<String>,
}

pub fn parse_assignment(raw: &str) -> Result<Assignment, String> {
    let (standard, original) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected STANDARD=ORIGINAL, got {raw:?}"))?;
    let standard = standard.trim();
    if standard.is_empty() {
        return Err("standard column must not be empty".to_string());
    }
    // Headers may carry surrounding spaces; only the key is normalised.
    Ok(Assignment {
        standard: standard.to_string(),
        original: (!original.trim().is_empty()).then(|| original.to_string()),
    })
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Auto,
    Custom,
}

impl From<ModeArg> for MappingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => Self::Auto,
            ModeArg::Custom => Self::Custom,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn assignment_parsing() {
        assert_eq!(
            parse_assignment("product_name=产品名称").unwrap(),
            Assignment {
                standard: "product_name".to_string(),
                original: Some("产品名称".to_string()),
            }
        );
        assert_eq!(parse_assignment("color=").unwrap().original, None);
        assert_eq!(parse_assignment("color=  ").unwrap().original, None);
        assert_eq!(
            parse_assignment(" color = 颜色 ").unwrap(),
            Assignment {
                standard: "color".to_string(),
                original: Some(" 颜色 ".to_string()),
            }
        );
        assert!(parse_assignment("color").is_err());
        assert!(parse_assignment("=颜色").is_err());
    }

    #[test]
    fn map_accepts_uploaded_file_id() {
        let cli = Cli::try_parse_from([
            "ordercheck",
            "map",
            "--file-id",
            "abc",
            "--filename",
            "spec.xlsx",
            "--mode",
            "custom",
            "--set",
            "item_id=编号",
        ])
        .unwrap();
        let Command::Map(args) = cli.command else {
            panic!("expected map command");
        };
        assert!(args.file.is_none());
        assert_eq!(args.set.len(), 1);
        assert!(matches!(args.mode, ModeArg::Custom));
    }

    #[test]
    fn map_rejects_overrides_in_auto_mode() {
        let cli = Cli::try_parse_from(["ordercheck", "map", "spec.xlsx", "--set", "color=颜色"])
            .unwrap();
        let Command::Map(args) = cli.command else {
            panic!("expected map command");
        };
        assert!(args.validate().is_err());

        let cli = Cli::try_parse_from([
            "ordercheck",
            "map",
            "spec.xlsx",
            "--mode",
            "custom",
            "--set",
            "color=颜色",
        ])
        .unwrap();
        let Command::Map(args) = cli.command else {
            panic!("expected map command");
        };
        assert!(args.validate().is_ok());
    }

    #[test]
    fn check_takes_order_and_spec() {
        let cli = Cli::try_parse_from([
            "ordercheck",
            "check",
            "--order",
            "o-1",
            "--spec",
            "s-1",
            "--skip-total-check",
        ])
        .unwrap();
        let Command::Check(args) = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(args.order, "o-1");
        assert!(args.skip_total_check);
        assert!(args.output.is_none());
        assert!(Cli::try_parse_from(["ordercheck", "check", "--order", "o-1"]).is_err());
    }

    #[test]
    fn pdf_upload_converts_by_default() {
        let cli = Cli::try_parse_from(["ordercheck", "pdf", "upload", "order.pdf"]).unwrap();
        let Command::Pdf(PdfCommand::Upload { file, no_convert }) = cli.command else {
            panic!("expected pdf upload");
        };
        assert_eq!(file, PathBuf::from("order.pdf"));
        assert!(!no_convert);
    }

    #[test]
    fn map_requires_a_file() {
        assert!(Cli::try_parse_from(["ordercheck", "map"]).is_err());
        assert!(Cli::try_parse_from(["ordercheck", "map", "--file-id", "abc"]).is_err());
    }
}
