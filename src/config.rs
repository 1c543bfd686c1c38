//! Configuration module for pdfjuggle.
//!
//! This module turns CLI arguments into a validated configuration that
//! drives a single document operation. It handles:
//! - Page range and grid parsing
//! - Rotation and sheet size normalization
//! - Metadata collection
//! - Validation of argument combinations

use anyhow::{Context, bail};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{JuggleError, Result};

/// Page rotation in degrees, as stored in a page's `Rotate` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    /// Upright.
    #[default]
    None,
    /// Rotate 90 degrees clockwise.
    Clockwise90,
    /// Rotate 180 degrees.
    Rotate180,
    /// Rotate 270 degrees clockwise (90 counter-clockwise).
    Clockwise270,
}

impl Rotation {
    /// Parse rotation from degrees.
    ///
    /// # Arguments
    ///
    /// * `degrees` - Rotation in degrees: 0, 90, 180 or 270
    ///
    /// # Errors
    ///
    /// Returns [`JuggleError::InvalidRotation`] for any other value.
    pub fn from_degrees(degrees: i64) -> Result<Self> {
        match degrees {
            0 => Ok(Self::None),
            90 => Ok(Self::Clockwise90),
            180 => Ok(Self::Rotate180),
            270 => Ok(Self::Clockwise270),
            _ => Err(JuggleError::InvalidRotation { degrees }),
        }
    }

    /// Parse a relative rotation such as `-90` or `450`.
    ///
    /// The value is reduced modulo 360 before it is checked.
    ///
    /// # Errors
    ///
    /// Returns [`JuggleError::InvalidRotation`] if the value is not a
    /// multiple of 90.
    pub fn from_relative_degrees(degrees: i64) -> Result<Self> {
        Self::from_degrees(degrees.rem_euclid(360)).map_err(|_| JuggleError::InvalidRotation { degrees })
    }

    /// Get rotation as degrees.
    pub fn as_degrees(&self) -> i64 {
        match self {
            Self::None => 0,
            Self::Clockwise90 => 90,
            Self::Rotate180 => 180,
            Self::Clockwise270 => 270,
        }
    }

    /// Combine two rotations.
    pub fn then(self, other: Rotation) -> Rotation {
        match (self.as_degrees() + other.as_degrees()).rem_euclid(360) {
            90 => Self::Clockwise90,
            180 => Self::Rotate180,
            270 => Self::Clockwise270,
            _ => Self::None,
        }
    }
}

/// Page range specification.
///
/// Supports individual pages and ranges:
/// - "1" - single page
/// - "1-5" - range of pages (inclusive)
/// - "1,3,5" - multiple individual pages
/// - "1-5,10-15" - combination of ranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRange {
    source: String,
    ranges: Vec<PageRangeItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PageRangeItem {
    Single(u32),
    Range(u32, u32),
}

impl PageRange {
    /// Parse a page range string.
    ///
    /// # Arguments
    ///
    /// * `s` - Page range string (e.g., "1-5,10,15-20")
    ///
    /// # Errors
    ///
    /// Returns an error if the string format is invalid or contains invalid page numbers.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfjuggle::config::PageRange;
    ///
    /// let range = PageRange::parse("1-5,10").unwrap();
    /// assert!(range.contains(3));
    /// assert!(range.contains(10));
    /// assert!(!range.contains(7));
    /// ```
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let mut ranges = Vec::new();

        if s.trim().is_empty() {
            bail!("Page range cannot be empty");
        }

        for part in s.split(',') {
            let part = part.trim();

            if part.contains('-') {
                let parts: Vec<&str> = part.split('-').collect();
                if parts.len() != 2 {
                    bail!("Invalid page range format: {part}. Expected format like '1-5'");
                }

                let start: u32 = parts[0]
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid page number: {}", parts[0]))?;

                let end: u32 = parts[1]
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid page number: {}", parts[1]))?;

                if start == 0 || end == 0 {
                    bail!("Page numbers must be positive (1-indexed)");
                }

                if start > end {
                    bail!(
                        "Invalid range {start}-{end}: start page must be less than or equal to end page"
                    );
                }

                ranges.push(PageRangeItem::Range(start, end));
            } else {
                let page: u32 = part
                    .parse()
                    .with_context(|| format!("Invalid page number: {part}"))?;

                if page == 0 {
                    bail!("Page numbers must be positive (1-indexed)");
                }

                ranges.push(PageRangeItem::Single(page));
            }
        }

        Ok(Self {
            source: s.trim().to_string(),
            ranges,
        })
    }

    /// Check if a page number is included in this range.
    ///
    /// # Arguments
    ///
    /// * `page` - 1-indexed page number
    pub fn contains(&self, page: u32) -> bool {
        self.ranges.iter().any(|item| match item {
            PageRangeItem::Single(p) => *p == page,
            PageRangeItem::Range(start, end) => page >= *start && page <= *end,
        })
    }

    /// Get all page numbers included in this range up to a maximum.
    ///
    /// # Returns
    ///
    /// A sorted, deduplicated vector of 1-indexed page numbers.
    pub fn to_pages(&self, max_pages: u32) -> Vec<u32> {
        (1..=max_pages).filter(|p| self.contains(*p)).collect()
    }

    /// Check whether any selected page lies beyond `max_pages`.
    pub fn exceeds(&self, max_pages: u32) -> bool {
        self.ranges.iter().any(|item| match item {
            PageRangeItem::Single(p) => *p > max_pages,
            PageRangeItem::Range(_, end) => *end > max_pages,
        })
    }

    /// The range as it was written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Document information to read from or write to a PDF.
///
/// Dates are kept as raw PDF date strings (`D:YYYYMMDDHHmmSS...`).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Metadata {
    /// Document title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Document author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Document subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    /// Application that created the original document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    /// Application that produced the PDF.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    /// Creation date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    /// Last modification date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod_date: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, value)| value.is_none())
    }

    /// Trim every field, dropping those that end up empty.
    pub fn normalized(self) -> Self {
        let clean = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: clean(self.title),
            author: clean(self.author),
            subject: clean(self.subject),
            keywords: clean(self.keywords),
            creator: clean(self.creator),
            producer: clean(self.producer),
            creation_date: clean(self.creation_date),
            mod_date: clean(self.mod_date),
        }
    }

    /// Fields paired with their `Info` dictionary keys.
    pub fn fields(&self) -> [(&'static str, Option<&str>); 8] {
        [
            ("Title", self.title.as_deref()),
            ("Author", self.author.as_deref()),
            ("Subject", self.subject.as_deref()),
            ("Keywords", self.keywords.as_deref()),
            ("Creator", self.creator.as_deref()),
            ("Producer", self.producer.as_deref()),
            ("CreationDate", self.creation_date.as_deref()),
            ("ModDate", self.mod_date.as_deref()),
        ]
    }

    /// `Info` key for a field name such as `title` or `mod-date`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the accepted fields if `name` is unknown.
    pub fn info_key(name: &str) -> anyhow::Result<&'static str> {
        let key = match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "title" => "Title",
            "author" => "Author",
            "subject" => "Subject",
            "keywords" => "Keywords",
            "creator" => "Creator",
            "producer" => "Producer",
            "creation-date" => "CreationDate",
            "mod-date" => "ModDate",
            _ => bail!(
                "Unknown metadata field '{name}' (expected title, author, subject, keywords, \
                 creator, producer, creation-date or mod-date)"
            ),
        };
        Ok(key)
    }

    /// Mutable access to the field stored under an `Info` key.
    pub(crate) fn field_mut(&mut self, key: &[u8]) -> Option<&mut Option<String>> {
        match key {
            b"Title" => Some(&mut self.title),
            b"Author" => Some(&mut self.author),
            b"Subject" => Some(&mut self.subject),
            b"Keywords" => Some(&mut self.keywords),
            b"Creator" => Some(&mut self.creator),
            b"Producer" => Some(&mut self.producer),
            b"CreationDate" => Some(&mut self.creation_date),
            b"ModDate" => Some(&mut self.mod_date),
            _ => None,
        }
    }
}

/// Sheet dimensions in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetSize {
    /// Width in points.
    pub width: f32,
    /// Height in points.
    pub height: f32,
}

impl SheetSize {
    /// ISO A4 portrait.
    pub const A4: Self = Self::new(595.0, 842.0);
    /// ISO A3 portrait.
    pub const A3: Self = Self::new(842.0, 1191.0);
    /// US Letter portrait.
    pub const LETTER: Self = Self::new(612.0, 792.0);
    /// US Legal portrait.
    pub const LEGAL: Self = Self::new(612.0, 1008.0);

    /// Create a sheet size from its dimensions.
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The same sheet turned sideways.
    pub fn landscape(self) -> Self {
        Self::new(self.height, self.width)
    }
}

impl FromStr for SheetSize {
    type Err = anyhow::Error;

    /// Parse a named size (`a4`, `a3`, `letter`, `legal`, optionally suffixed
    /// with `-landscape`) or explicit `WIDTHxHEIGHT` in points.
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let lower = s.trim().to_lowercase();
        let (name, landscape) = match lower.strip_suffix("-landscape") {
            Some(name) => (name, true),
            None => (lower.as_str(), false),
        };

        let size = match name {
            "a4" => Self::A4,
            "a3" => Self::A3,
            "letter" => Self::LETTER,
            "legal" => Self::LEGAL,
            custom => {
                let (w, h) = custom.split_once('x').with_context(|| {
                    format!("Unknown sheet size: {s}. Use a4, a3, letter, legal or WIDTHxHEIGHT")
                })?;
                let width: f32 = w
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid sheet width: {w}"))?;
                let height: f32 = h
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid sheet height: {h}"))?;
                Self::new(width, height)
            }
        };

        if !(size.width > 0.0 && size.height > 0.0) {
            bail!("Sheet dimensions must be positive: {s}");
        }

        Ok(if landscape { size.landscape() } else { size })
    }
}

/// How source pages are arranged on output sheets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImposeLayout {
    /// Cells per row.
    pub columns: u32,
    /// Rows per sheet.
    pub rows: u32,
    /// Sheet size.
    pub sheet: SheetSize,
    /// Blank border around the grid, in points.
    pub margin: f32,
}

impl Default for ImposeLayout {
    fn default() -> Self {
        Self {
            columns: 2,
            rows: 1,
            sheet: SheetSize::A4.landscape(),
            margin: 0.0,
        }
    }
}

impl ImposeLayout {
    /// Parse a grid such as `2x2` or `4x1` into `(columns, rows)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfjuggle::config::ImposeLayout;
    ///
    /// assert_eq!(ImposeLayout::parse_grid("3x2").unwrap(), (3, 2));
    /// assert!(ImposeLayout::parse_grid("0x2").is_err());
    /// ```
    pub fn parse_grid(s: &str) -> anyhow::Result<(u32, u32)> {
        let (c, r) = s
            .trim()
            .to_lowercase()
            .split_once('x')
            .map(|(c, r)| (c.trim().to_string(), r.trim().to_string()))
            .with_context(|| format!("Invalid grid: {s}. Expected format like '2x2'"))?;

        let columns: u32 = c
            .parse()
            .with_context(|| format!("Invalid column count: {c}"))?;
        let rows: u32 = r.parse().with_context(|| format!("Invalid row count: {r}"))?;

        if columns == 0 || rows == 0 {
            bail!("Grid must have at least one column and one row: {s}");
        }

        Ok((columns, rows))
    }

    /// Pages that fit on one sheet.
    pub fn cells_per_sheet(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Check the layout leaves room for at least one drawable cell.
    ///
    /// # Errors
    ///
    /// Returns an error for empty grids, non-positive sheets and margins
    /// that swallow the whole sheet.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.columns == 0 || self.rows == 0 {
            bail!("Grid must have at least one column and one row");
        }

        if !(self.sheet.width > 0.0 && self.sheet.height > 0.0) {
            bail!("Sheet dimensions must be positive");
        }

        if self.margin < 0.0 {
            bail!("Margin cannot be negative");
        }

        if self.margin * 2.0 >= self.sheet.width || self.margin * 2.0 >= self.sheet.height {
            bail!("Margin of {} leaves no room on the sheet", self.margin);
        }

        Ok(())
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Where inserted pages go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertPosition {
    /// Before the page at this 0-based index.
    Before(usize),
    /// After the last page.
    #[default]
    End,
}

/// The document operation to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Print document information.
    Info {
        /// Emit JSON instead of text.
        json: bool,
    },
    /// Insert every page of another document.
    Insert {
        /// Document whose pages are inserted.
        source: PathBuf,
        /// Insertion point.
        position: InsertPosition,
    },
    /// Remove pages.
    Remove {
        /// Pages to remove.
        pages: PageRange,
    },
    /// Rotate pages.
    Rotate {
        /// Rotation to apply.
        rotation: Rotation,
        /// Add to the current rotation instead of replacing it.
        relative: bool,
        /// Pages to rotate, all when `None`.
        pages: Option<PageRange>,
    },
    /// Change document information.
    Meta {
        /// Fields to set.
        metadata: Metadata,
        /// Remove all existing fields first.
        clear: bool,
        /// `Info` keys to remove.
        unset: Vec<String>,
    },
    /// Print one object.
    Dump {
        /// Object number.
        number: u32,
        /// Generation number.
        generation: u16,
    },
    /// Place pages n-up on new sheets.
    Impose {
        /// Sheet layout.
        layout: ImposeLayout,
    },
}

impl Operation {
    /// Whether the operation produces an output document.
    pub fn writes_output(&self) -> bool {
        !matches!(self, Self::Info { .. } | Self::Dump { .. })
    }
}

/// Complete configuration for one pdfjuggle run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Document being read (and edited).
    pub input: PathBuf,

    /// Where the result is written.
    pub output: Option<PathBuf>,

    /// What to do.
    pub operation: Operation,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compress streams when writing.
    pub compress: bool,
}

impl Config {
    /// Create a configuration with default flags.
    pub fn new(input: PathBuf, output: Option<PathBuf>, operation: Operation) -> Self {
        Self {
            input,
            output,
            operation,
            verbose: false,
            quiet: false,
            overwrite_mode: OverwriteMode::default(),
            compress: true,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Verbose and quiet modes are both enabled
    /// - An editing operation has no output path
    /// - The output path is also an input
    /// - The imposition layout is unusable
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if self.operation.writes_output() {
            let Some(output) = &self.output else {
                bail!("An output file is required");
            };

            if output == &self.input {
                bail!(
                    "Output file cannot be the same as the input file: {}",
                    output.display()
                );
            }

            if let Operation::Insert { source, .. } = &self.operation
                && source == output
            {
                bail!(
                    "Output file cannot be the same as the inserted file: {}",
                    output.display()
                );
            }
        }

        if let Operation::Impose { layout } = &self.operation {
            layout.validate()?;
        }

        Ok(())
    }
}
