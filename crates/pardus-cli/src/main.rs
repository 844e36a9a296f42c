//! Pardus - export Paradox table files
//!
//! One subcommand per output format; the pipeline below is shared.

use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use pardus_core::{FieldSelection, ParadoxFile, RecordStore};

use pardus_cli::cli::{Cli, Command, ExportArgs, InputArgs};
use pardus_cli::config::{parse_type_overrides, OutputConfig};
use pardus_cli::error::{report_error, Result};
use pardus_cli::output::sql::SqlTypeMap;
use pardus_cli::output::{create_formatter, OutputFormat};
use pardus_cli::pipeline::{run_export, ExportContext};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, verbose);
            ExitCode::from(1)
        }
    }
}

/// Initialize logging based on CLI options.
fn init_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Main entry point logic.
fn run(cli: Cli) -> Result<()> {
    let out_path = cli.output;

    match cli.command {
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "pardus", &mut io::stdout());
            Ok(())
        }
        Command::Info(cmd) => {
            let mut store = open_store(&cmd.input)?;
            let config = OutputConfig::default();
            execute(
                &mut store,
                None,
                config,
                OutputFormat::Info,
                out_path.as_deref(),
            )
        }
        Command::Csv(cmd) => {
            let mut store = open_store(&cmd.input)?;
            let config = OutputConfig::from_args(&cmd.export, store.meta())
                .with_separators(cmd.delimiter, cmd.enclosure)
                .with_header(cmd.with_header);
            execute(
                &mut store,
                fields(&cmd.export),
                config,
                OutputFormat::Csv,
                out_path.as_deref(),
            )
        }
        Command::Sql(cmd) => {
            let mut store = open_store(&cmd.input)?;
            let config = OutputConfig::from_args(&cmd.export, store.meta());
            let types = SqlTypeMap::postgres()
                .with_overrides(parse_type_overrides(&cmd.sql_type)?);
            execute(
                &mut store,
                fields(&cmd.export),
                config,
                OutputFormat::Sql {
                    mode: cmd.mode,
                    types,
                },
                out_path.as_deref(),
            )
        }
        Command::Sqlite(cmd) => {
            let mut store = open_store(&cmd.input)?;
            let config = OutputConfig::from_args(&cmd.export, store.meta());
            execute(
                &mut store,
                fields(&cmd.export),
                config,
                OutputFormat::Sqlite,
                out_path.as_deref(),
            )
        }
        Command::Html(cmd) => {
            let mut store = open_store(&cmd.input)?;
            let config = OutputConfig::from_args(&cmd.export, store.meta());
            execute(
                &mut store,
                fields(&cmd.export),
                config,
                OutputFormat::Html,
                out_path.as_deref(),
            )
        }
        Command::Debug(cmd) => {
            let mut store = open_store(&cmd.input)?;
            let config = OutputConfig::from_args(&cmd.export, store.meta());
            execute(
                &mut store,
                fields(&cmd.export),
                config,
                OutputFormat::Debug,
                out_path.as_deref(),
            )
        }
    }
}

fn fields(export: &ExportArgs) -> Option<&str> {
    export.fields.as_deref()
}

/// Open the table file and attach the blob file when given.
fn open_store(input: &InputArgs) -> Result<ParadoxFile> {
    tracing::debug!(file = %input.file.display(), "opening table file");
    let store = ParadoxFile::open(&input.file)?;
    match &input.blob_file {
        Some(blob) => {
            tracing::debug!(file = %blob.display(), "attaching blob file");
            Ok(store.with_blob_file(blob)?)
        }
        None => Ok(store),
    }
}

/// Compile the field selection, build the context and run the export.
fn execute(
    store: &mut ParadoxFile,
    pattern: Option<&str>,
    config: OutputConfig,
    format: OutputFormat,
    out_path: Option<&Path>,
) -> Result<()> {
    let selection = FieldSelection::compile(pattern, store.schema())?;
    let ctx = ExportContext::new(store, &selection, config);
    let mut formatter = create_formatter(format);
    let mut sink = open_sink(out_path)?;
    let written = run_export(store, &ctx, formatter.as_mut(), &mut sink)?;
    tracing::info!(rows = written, "export complete");
    Ok(())
}

/// The output sink: a file when `-o` was given, stdout otherwise.
fn open_sink(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(std::fs::File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    })
}
