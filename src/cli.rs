//! CLI argument parsing for pdfjuggle.
//!
//! This module defines the command-line interface structure using `clap`.
//! Each subcommand maps onto one [`Operation`]; [`Cli::to_config`] turns
//! the parsed arguments into a validated [`Config`].
//!
//! # Examples
//!
//! ```no_run
//! use clap::Parser;
//! use pdfjuggle::cli::Cli;
//!
//! let cli = Cli::parse();
//! let config = cli.to_config().expect("Invalid configuration");
//! println!("Reading {}", config.input.display());
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::{
    Config, ImposeLayout, InsertPosition, Metadata, Operation, OverwriteMode, PageRange, Rotation,
    SheetSize,
};
use crate::error::{JuggleError, Result};

/// Rearrange, rotate, annotate and impose the pages of PDF documents.
#[derive(Parser, Debug)]
#[command(name = "pdfjuggle")]
#[command(version)]
#[command(about = "Rearrange, rotate and impose PDF pages", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Operation to perform
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output - show statistics and timings
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all non-error output
    ///
    /// Only errors and warnings will be printed.
    /// Useful for scripts and automation.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force overwrite of existing output file without confirmation
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Never overwrite existing output file
    ///
    /// If the output file already exists, exit with an error
    /// instead of prompting or overwriting.
    #[arg(long, global = true, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Write streams without compressing them
    #[arg(long, global = true)]
    pub no_compress: bool,
}

/// pdfjuggle subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show page count, version and document information
    Info {
        /// PDF file to inspect
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Insert every page of another PDF
    ///
    /// Examples:
    ///   pdfjuggle insert report.pdf cover.pdf --at 1 -o out.pdf
    ///   pdfjuggle insert report.pdf appendix.pdf -o out.pdf
    Insert {
        /// PDF file to insert into
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// PDF file whose pages are inserted
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Insert before this page (1-indexed); appends when omitted
        #[arg(long, value_name = "PAGE")]
        at: Option<usize>,

        /// Output PDF file path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Remove pages
    ///
    /// Examples:
    ///   pdfjuggle remove in.pdf --pages 2 -o out.pdf
    ///   pdfjuggle remove in.pdf --pages "1-3,10" -o out.pdf
    Remove {
        /// PDF file to edit
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Pages to remove (1-indexed, e.g. "1-5,10")
        #[arg(short, long, value_name = "RANGE")]
        pages: String,

        /// Output PDF file path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Rotate pages
    ///
    /// Examples:
    ///   pdfjuggle rotate in.pdf --degrees 90 -o out.pdf
    ///   pdfjuggle rotate in.pdf --degrees -90 --relative --pages 2-4 -o out.pdf
    Rotate {
        /// PDF file to edit
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Rotation in degrees (0, 90, 180, 270; any multiple of 90 with --relative)
        #[arg(short, long, value_name = "DEGREES", allow_negative_numbers = true)]
        degrees: i64,

        /// Add to each page's current rotation instead of replacing it
        #[arg(long)]
        relative: bool,

        /// Pages to rotate (1-indexed); all pages when omitted
        #[arg(short, long, value_name = "RANGE")]
        pages: Option<String>,

        /// Output PDF file path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Set or clear document information
    Meta {
        /// PDF file to edit
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Set title
        #[arg(long, value_name = "TEXT")]
        title: Option<String>,

        /// Set author
        #[arg(long, value_name = "TEXT")]
        author: Option<String>,

        /// Set subject
        #[arg(long, value_name = "TEXT")]
        subject: Option<String>,

        /// Set keywords (comma-separated)
        #[arg(long, value_name = "TEXT")]
        keywords: Option<String>,

        /// Set creator application
        #[arg(long, value_name = "TEXT")]
        creator: Option<String>,

        /// Set producer application
        #[arg(long, value_name = "TEXT")]
        producer: Option<String>,

        /// Remove all existing fields before setting new ones
        #[arg(long)]
        clear: bool,

        /// Remove one field (title, author, subject, keywords, creator,
        /// producer, creation-date, mod-date); repeatable
        #[arg(long, value_name = "FIELD", value_parser = parse_info_field)]
        unset: Vec<String>,

        /// Output PDF file path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Print one object with its references and stream data
    ///
    /// Examples:
    ///   pdfjuggle dump in.pdf 12
    ///   pdfjuggle dump in.pdf 7 1
    Dump {
        /// PDF file to inspect
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Object number
        #[arg(value_name = "NUMBER")]
        number: u32,

        /// Generation number
        #[arg(value_name = "GENERATION", default_value_t = 0)]
        generation: u16,
    },

    /// Place pages n-up on larger sheets
    ///
    /// Examples:
    ///   pdfjuggle impose in.pdf -o out.pdf
    ///   pdfjuggle impose in.pdf --grid 2x2 --sheet a3 --margin 18 -o out.pdf
    Impose {
        /// PDF file to impose
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Cells per sheet as COLUMNSxROWS
        #[arg(short, long, value_name = "GRID", default_value = "2x1")]
        grid: String,

        /// Sheet size: a4, a3, letter, legal (optionally -landscape) or WxH in points
        #[arg(short, long, value_name = "SIZE", default_value = "a4-landscape")]
        sheet: String,

        /// Blank border around the grid, in points
        #[arg(short, long, value_name = "POINTS", default_value_t = 0.0)]
        margin: f32,

        /// Output PDF file path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A page range, grid or sheet size cannot be parsed
    /// - Rotation degrees are invalid
    /// - `--at` is 0
    /// - `meta` is given nothing to change
    /// - Configuration validation fails
    pub fn to_config(&self) -> Result<Config> {
        let (input, output, operation) = match &self.command {
            Command::Info { input, json } => (input.clone(), None, Operation::Info { json: *json }),

            Command::Insert {
                input,
                source,
                at,
                output,
            } => {
                let position = match at {
                    None => InsertPosition::End,
                    Some(0) => {
                        return Err(JuggleError::invalid_config(
                            "--at is 1-indexed; use 1 to insert before the first page",
                        ));
                    }
                    Some(page) => InsertPosition::Before(page - 1),
                };
                let operation = Operation::Insert {
                    source: source.clone(),
                    position,
                };
                (input.clone(), Some(output.clone()), operation)
            }

            Command::Remove {
                input,
                pages,
                output,
            } => {
                let operation = Operation::Remove {
                    pages: parse_page_range(pages)?,
                };
                (input.clone(), Some(output.clone()), operation)
            }

            Command::Rotate {
                input,
                degrees,
                relative,
                pages,
                output,
            } => {
                let rotation = if *relative {
                    Rotation::from_relative_degrees(*degrees)?
                } else {
                    Rotation::from_degrees(*degrees)?
                };
                let pages = pages.as_deref().map(parse_page_range).transpose()?;
                let operation = Operation::Rotate {
                    rotation,
                    relative: *relative,
                    pages,
                };
                (input.clone(), Some(output.clone()), operation)
            }

            Command::Meta {
                input,
                title,
                author,
                subject,
                keywords,
                creator,
                producer,
                clear,
                unset,
                output,
            } => {
                let metadata = Metadata {
                    title: title.clone(),
                    author: author.clone(),
                    subject: subject.clone(),
                    keywords: keywords.clone(),
                    creator: creator.clone(),
                    producer: producer.clone(),
                    ..Default::default()
                }
                .normalized();

                if metadata.is_empty() && !clear && unset.is_empty() {
                    return Err(JuggleError::invalid_config(
                        "Nothing to change: pass a field such as --title, --unset or --clear",
                    ));
                }

                let operation = Operation::Meta {
                    metadata,
                    clear: *clear,
                    unset: unset.clone(),
                };
                (input.clone(), Some(output.clone()), operation)
            }

            Command::Dump {
                input,
                number,
                generation,
            } => {
                if *number == 0 {
                    return Err(JuggleError::invalid_config("Object numbers start at 1"));
                }
                let operation = Operation::Dump {
                    number: *number,
                    generation: *generation,
                };
                (input.clone(), None, operation)
            }

            Command::Impose {
                input,
                grid,
                sheet,
                margin,
                output,
            } => {
                let (columns, rows) = ImposeLayout::parse_grid(grid)
                    .map_err(|e| JuggleError::invalid_config(format!("{e:#}")))?;
                let sheet = SheetSize::from_str(sheet)
                    .map_err(|e| JuggleError::invalid_config(format!("{e:#}")))?;
                let operation = Operation::Impose {
                    layout: ImposeLayout {
                        columns,
                        rows,
                        sheet,
                        margin: *margin,
                    },
                };
                (input.clone(), Some(output.clone()), operation)
            }
        };

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let config = Config {
            input,
            output,
            operation,
            verbose: self.verbose,
            quiet: self.quiet,
            overwrite_mode,
            compress: !self.no_compress,
        };

        config.validate().map_err(|e| {
            JuggleError::invalid_config(format!("Configuration validation failed: {e:#}"))
        })?;

        Ok(config)
    }
}

/// Map a field name given to `--unset` onto its `Info` key.
fn parse_info_field(name: &str) -> std::result::Result<String, String> {
    Metadata::info_key(name)
        .map(str::to_string)
        .map_err(|e| format!("{e:#}"))
}

fn parse_page_range(pages: &str) -> Result<PageRange> {
    PageRange::parse(pages).map_err(|e| JuggleError::invalid_config(format!("{e:#}")))
}
