//! JSON record writer
//!
//! Provides utilities for writing mapped records to a file or stdout.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Layout of the written records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RecordFormat {
    /// One JSON array holding every record
    #[default]
    Json,
    /// One JSON object per line
    Jsonl,
}

/// Configuration for the record writer
#[derive(Debug, Clone, Default)]
pub struct JsonWriterConfig {
    format: RecordFormat,
    pretty: bool,
}

impl JsonWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the record layout
    #[must_use]
    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.format = format;
        self
    }

    /// Indent the JSON array output
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Get the record layout
    #[must_use]
    pub fn format(&self) -> RecordFormat {
        self.format
    }

    /// Get pretty printing enabled
    #[must_use]
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

/// Write records to any writer, returning the number written
pub fn write_json<W, T>(writer: W, records: &[T], config: &JsonWriterConfig) -> Result<usize>
where
    W: Write,
    T: Serialize,
{
    let mut writer = BufWriter::new(writer);

    match config.format {
        RecordFormat::Json if config.pretty => {
            serde_json::to_writer_pretty(&mut writer, records).map_err(serialize_error)?;
        }
        RecordFormat::Json => serde_json::to_writer(&mut writer, records).map_err(serialize_error)?,
        RecordFormat::Jsonl => {
            for record in records {
                serde_json::to_writer(&mut writer, record).map_err(serialize_error)?;
                writeln!(writer)?;
            }
        }
    }
    if config.format == RecordFormat::Json {
        writeln!(writer)?;
    }

    writer
        .flush()
        .map_err(|e| Error::output(format!("Failed to flush records: {e}")))?;
    Ok(records.len())
}

/// Write records to `destination`, or stdout when it is `None`
pub fn write_records<T: Serialize>(
    records: &[T],
    destination: Option<&Path>,
    config: &JsonWriterConfig,
) -> Result<usize> {
    match destination {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                Error::output(format!("Failed to create file <{}>: {e}", path.display()))
            })?;
            write_json(file, records, config)
        }
        None => write_json(io::stdout().lock(), records, config),
    }
}

fn serialize_error(e: serde_json::Error) -> Error {
    Error::output(format!("Failed to serialize records: {e}"))
}
