//! Output rendering for CLI commands
//!
//! Supports aligned tables for humans and JSON, CSV and YAML for scripts.

use std::io::Write;

use clap::ValueEnum;
use color_eyre::Result;
use metalcloud_api::Pagination;
use serde::{Deserialize, Serialize};

/// Longest cell shown in list tables before truncation
const MAX_CELL_WIDTH: usize = 40;

/// Output format selected with `--format`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    Json,
    Csv,
    Yaml,
}

/// Types that can be rendered as table rows
pub trait Tabular: Serialize {
    /// Singular noun used in list footers, e.g. "server"
    const NOUN: &'static str;

    /// Column headers, in the same order as [`Tabular::row`]
    fn headers() -> &'static [&'static str];

    /// Cell values for this item
    fn row(&self) -> Vec<String>;
}

/// Result of a mutation that returns nothing to show
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
    pub success: bool,
}

/// Renders values in the selected [`OutputFormat`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Printer {
    format: OutputFormat,
}

impl Printer {
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write a list of items, with page information when known
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn list<W: Write, T: Tabular>(
        &self,
        writer: &mut W,
        items: &[T],
        pagination: Option<&Pagination>,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Table => write_table(writer, items, pagination)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *writer, items)?;
                writeln!(writer)?;
            }
            OutputFormat::Csv => write_csv(writer, items)?,
            OutputFormat::Yaml => write!(writer, "{}", serde_yaml::to_string(items)?)?,
        }
        Ok(())
    }

    /// Write a single item
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn item<W: Write, T: Tabular>(&self, writer: &mut W, item: &T) -> Result<()> {
        match self.format {
            OutputFormat::Table => write_details(writer, item)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *writer, item)?;
                writeln!(writer)?;
            }
            OutputFormat::Csv => write_csv(writer, std::slice::from_ref(item))?,
            OutputFormat::Yaml => write!(writer, "{}", serde_yaml::to_string(item)?)?,
        }
        Ok(())
    }

    /// Report a mutation that returned an updated object
    ///
    /// Tables get a one-line summary, structured formats get the object.
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn outcome<W: Write, T: Tabular>(
        &self,
        writer: &mut W,
        summary: &str,
        item: &T,
    ) -> Result<()> {
        if self.format == OutputFormat::Table {
            writeln!(writer, "✓ {summary}")?;
            Ok(())
        } else {
            self.item(writer, item)
        }
    }

    /// Report a mutation that returned nothing
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn message<W: Write>(&self, writer: &mut W, text: &str) -> Result<()> {
        self.write_message(writer, text, true)
    }

    /// Report a declined confirmation prompt
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn cancelled<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.write_message(writer, "Operation cancelled", false)
    }

    fn write_message<W: Write>(&self, writer: &mut W, text: &str, success: bool) -> Result<()> {
        let message = Message {
            message: text.to_string(),
            success,
        };
        match self.format {
            OutputFormat::Table if success => writeln!(writer, "✓ {text}")?,
            OutputFormat::Table => writeln!(writer, "{text}")?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *writer, &message)?;
                writeln!(writer)?;
            }
            OutputFormat::Csv => {
                let mut csv = csv::Writer::from_writer(&mut *writer);
                csv.write_record(["message", "success"])?;
                csv.write_record([message.message.as_str(), if success { "true" } else { "false" }])?;
                csv.flush()?;
            }
            OutputFormat::Yaml => write!(writer, "{}", serde_yaml::to_string(&message)?)?,
        }
        Ok(())
    }
}
