//! pdfjuggle - rearrange, rotate and impose PDF pages.

use clap::Parser;
use log::{LevelFilter, debug};
use lopdf::Document;
use std::path::Path;
use std::process;

use pdfjuggle::cli::Cli;
use pdfjuggle::config::{Config, Operation, OverwriteMode};
use pdfjuggle::dump::dump_object;
use pdfjuggle::error::{JuggleError, Result};
use pdfjuggle::impose::impose;
use pdfjuggle::io::{PdfReader, PdfWriter, WriteOptions};
use pdfjuggle::metadata::{clear_metadata, unset_metadata_fields, write_metadata};
use pdfjuggle::output::{
    DocumentSummary, OutputFormatter, display_summary, display_write_statistics,
};
use pdfjuggle::pages::{insert_pages, remove_pages, rotate_pages};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Default log level follows the verbosity flags; `RUST_LOG` wins.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<()> {
    let config = cli.to_config()?;
    let formatter = OutputFormatter::from_config(&config);
    debug!("running with {config:?}");

    if formatter.is_verbose() {
        formatter.section(&format!("{} v{}", pdfjuggle::NAME, pdfjuggle::VERSION));
    }

    let reader = PdfReader::new();

    if let Operation::Info { json } = config.operation {
        let loaded = reader.load(&config.input).await?;
        let summary = DocumentSummary::from_loaded(&loaded);
        if json {
            let text = summary
                .to_json()
                .map_err(|e| JuggleError::other(format!("Failed to serialize summary: {e}")))?;
            println!("{text}");
        } else {
            display_summary(&formatter, &summary);
        }
        return Ok(());
    }

    if let Operation::Dump { number, generation } = config.operation {
        let loaded = PdfReader::allow_empty().load(&config.input).await?;
        let dump = dump_object(&loaded.document, (number, generation))?;
        println!("{dump}");
        if formatter.is_verbose() {
            let references: Vec<String> = dump
                .references()
                .map(|(n, g)| format!("{n} {g} R"))
                .collect();
            formatter.detail("References", &references.join(", "));
        }
        return Ok(());
    }

    let Some(output) = config.output.clone() else {
        return Err(JuggleError::invalid_config("An output file is required"));
    };

    let writer = PdfWriter::with_options(WriteOptions {
        compress: config.compress,
        ..Default::default()
    });
    writer.can_write(&output).await?;
    handle_output_overwrite(&config, &output, &formatter).await?;

    let document = apply_operation(&config, &reader, &formatter).await?;

    formatter.info(&format!("Writing to: {}", output.display()));
    let stats = writer.save_with_stats(&document, &output).await?;
    display_write_statistics(&formatter, &stats);

    Ok(())
}

/// Load the input and run the configured edit on it.
async fn apply_operation(
    config: &Config,
    reader: &PdfReader,
    formatter: &OutputFormatter,
) -> Result<Document> {
    match &config.operation {
        Operation::Info { .. } | Operation::Dump { .. } => Err(JuggleError::other(
            "inspection commands do not produce a document",
        )),

        Operation::Insert { source, position } => {
            let paths = [config.input.clone(), source.clone()];
            let mut loaded = reader.load_many(&paths, 2).await.into_iter();
            let (Some(dest), Some(src)) = (loaded.next(), loaded.next()) else {
                return Err(JuggleError::other("Failed to load inputs"));
            };
            let mut dest = dest?;
            let src = src?;

            formatter.info(&format!(
                "Inserting {} page(s) from {}",
                src.page_count,
                src.path.display()
            ));
            let stats = insert_pages(&mut dest.document, &src.document, *position)?;
            formatter.detail("First page", &(stats.first_index + 1).to_string());
            formatter.detail("Objects copied", &stats.objects_copied.to_string());
            Ok(dest.document)
        }

        Operation::Remove { pages } => {
            let mut loaded = reader.load(&config.input).await?;
            let removed = remove_pages(&mut loaded.document, pages)?;
            formatter.info(&format!(
                "Removed {removed} of {} page(s)",
                loaded.page_count
            ));
            Ok(loaded.document)
        }

        Operation::Rotate {
            rotation,
            relative,
            pages,
        } => {
            let mut loaded = reader.load(&config.input).await?;
            let rotated = rotate_pages(&mut loaded.document, *rotation, *relative, pages.as_ref())?;
            formatter.info(&format!(
                "Rotated {rotated} page(s) {} {} degrees",
                if *relative { "by" } else { "to" },
                rotation.as_degrees()
            ));
            Ok(loaded.document)
        }

        Operation::Meta {
            metadata,
            clear,
            unset,
        } => {
            let mut loaded = PdfReader::allow_empty().load(&config.input).await?;
            if *clear {
                clear_metadata(&mut loaded.document)?;
                formatter.info("Cleared document information");
            }
            if !unset.is_empty() {
                let removed = unset_metadata_fields(&mut loaded.document, unset.as_slice())?;
                formatter.info(&format!("Removed {removed} document information field(s)"));
            }
            if !metadata.is_empty() {
                write_metadata(&mut loaded.document, metadata)?;
                formatter.info("Updated document information");
            }
            Ok(loaded.document)
        }

        Operation::Impose { layout } => {
            let loaded = reader.load(&config.input).await?;
            let (document, stats) = impose(&loaded.document, layout)?;
            formatter.info(&format!(
                "Imposed {} page(s) onto {} sheet(s)",
                stats.pages_placed, stats.sheets
            ));
            formatter.detail("Objects copied", &stats.objects_copied.to_string());
            Ok(document)
        }
    }
}

/// Handle output file overwrite scenarios.
async fn handle_output_overwrite(
    config: &Config,
    output: &Path,
    formatter: &OutputFormatter,
) -> Result<()> {
    if !tokio::fs::try_exists(output).await.unwrap_or(false) {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(JuggleError::output_exists(output.to_path_buf())),
        OverwriteMode::Prompt => {
            // No prompt in quiet mode, treat as no-clobber
            if formatter.is_quiet() {
                return Err(JuggleError::output_exists(output.to_path_buf()));
            }

            formatter.warning(&format!("Output file already exists: {}", output.display()));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| JuggleError::other(format!("Failed to read input: {err}")))?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(())
            } else {
                Err(JuggleError::Cancelled)
            }
        }
    }
}
