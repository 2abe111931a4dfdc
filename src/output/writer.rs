//! CSV file writer
//!
//! Provides the tabular sink: dataset, sample and schema summary files for
//! each endpoint plus one combined summary per run.

use crate::error::{Error, Result};
use crate::schema::{ColumnProfile, SchemaProfile};
use crate::types::{column_order, format_float, value_text, Record};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// UTF-8 byte order mark, expected by spreadsheet tools for Korean text
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header of schema summary files
pub const SUMMARY_HEADER: [&str; 6] = [
    "column",
    "inferred_type",
    "missing_rate",
    "nunique",
    "min",
    "max",
];

/// Name of the combined summary file
pub const ALL_SUMMARY_FILE: &str = "_all_schema_summary.csv";

/// Configuration for the CSV writer
#[derive(Debug, Clone)]
pub struct CsvWriterConfig {
    bom: bool,
    sample_rows: usize,
}

impl Default for CsvWriterConfig {
    fn default() -> Self {
        Self {
            bom: true,
            sample_rows: 10,
        }
    }
}

impl CsvWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the byte order mark
    #[must_use]
    pub fn with_bom(mut self, enabled: bool) -> Self {
        self.bom = enabled;
        self
    }

    /// Set the number of rows in sample files
    #[must_use]
    pub fn with_sample_rows(mut self, rows: usize) -> Self {
        self.sample_rows = rows;
        self
    }

    /// Whether a byte order mark is written
    #[must_use]
    pub fn is_bom_enabled(&self) -> bool {
        self.bom
    }

    /// Rows in sample files
    #[must_use]
    pub fn sample_rows(&self) -> usize {
        self.sample_rows
    }
}

/// Files written for one endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub data: PathBuf,
    pub summary: PathBuf,
    pub sample: PathBuf,
}

/// CSV sink rooted at an output directory
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
    config: CsvWriterConfig,
}

impl CsvSink {
    /// Create a sink writing into `dir`
    pub fn new(dir: impl Into<PathBuf>, config: CsvWriterConfig) -> Self {
        Self {
            dir: dir.into(),
            config,
        }
    }

    /// Output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write data, summary and sample files for one endpoint
    pub fn write_endpoint(
        &self,
        name: &str,
        records: &[Record],
        profile: &SchemaProfile,
    ) -> Result<WrittenFiles> {
        let files = WrittenFiles {
            data: self.write_dataset(name, records)?,
            summary: self.write_summary(name, profile)?,
            sample: self.write_sample(name, records)?,
        };
        debug!(endpoint = name, dir = %self.dir.display(), "wrote CSV outputs");
        Ok(files)
    }

    /// `<name>_data.csv`: every record, columns in first-seen order
    pub fn write_dataset(&self, name: &str, records: &[Record]) -> Result<PathBuf> {
        let path = self.path(&format!("{name}_data.csv"))?;
        write_records(&path, records, self.config.bom)?;
        Ok(path)
    }

    /// `<name>_sample.csv`: the first `sample_rows` records
    pub fn write_sample(&self, name: &str, records: &[Record]) -> Result<PathBuf> {
        let path = self.path(&format!("{name}_sample.csv"))?;
        let head = &records[..records.len().min(self.config.sample_rows)];
        // Sample keeps the full dataset's columns
        let columns = column_order(records);
        let mut writer = open_csv(&path, self.config.bom)?;
        write_rows(&mut writer, &columns, head)?;
        writer.flush()?;
        Ok(path)
    }

    /// `<name>_schema_summary.csv`
    pub fn write_summary(&self, name: &str, profile: &SchemaProfile) -> Result<PathBuf> {
        let path = self.path(&format!("{name}_schema_summary.csv"))?;
        let mut writer = open_csv(&path, self.config.bom)?;
        writer.write_record(SUMMARY_HEADER)?;
        for column in profile {
            writer.write_record(summary_row(column))?;
        }
        writer.flush()?;
        Ok(path)
    }

    /// `_all_schema_summary.csv`: every profile tagged with its `api_name`
    pub fn write_combined_summary<'a, I>(&self, profiles: I) -> Result<PathBuf>
    where
        I: IntoIterator<Item = (&'a str, &'a SchemaProfile)>,
    {
        let path = self.path(ALL_SUMMARY_FILE)?;
        let mut writer = open_csv(&path, self.config.bom)?;

        let mut header: Vec<&str> = SUMMARY_HEADER.to_vec();
        header.push("api_name");
        writer.write_record(&header)?;

        for (api_name, profile) in profiles {
            for column in profile {
                let mut row = summary_row(column);
                row.push(api_name.to_string());
                writer.write_record(&row)?;
            }
        }
        writer.flush()?;
        Ok(path)
    }

    fn path(&self, file: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            Error::output(format!(
                "Failed to create output directory '{}': {e}",
                self.dir.display()
            ))
        })?;
        Ok(self.dir.join(file))
    }
}

/// One summary line: column, type, missing rate, cardinality, min, max
pub fn summary_row(column: &ColumnProfile) -> Vec<String> {
    vec![
        column.name.clone(),
        column.inferred_type.to_string(),
        format_float(column.missing_rate),
        column.distinct_count.to_string(),
        column.min.as_ref().map(ToString::to_string).unwrap_or_default(),
        column.max.as_ref().map(ToString::to_string).unwrap_or_default(),
    ]
}

/// Write records to a CSV file with a header of all columns
pub fn write_records(path: impl AsRef<Path>, records: &[Record], bom: bool) -> Result<usize> {
    let columns = column_order(records);
    let mut writer = open_csv(path.as_ref(), bom)?;
    write_rows(&mut writer, &columns, records)?;
    writer.flush()?;
    Ok(records.len())
}

fn open_csv(path: &Path, bom: bool) -> Result<csv::Writer<BufWriter<File>>> {
    let file = File::create(path).map_err(|e| {
        Error::output(format!("Failed to create file '{}': {e}", path.display()))
    })?;
    let mut out = BufWriter::new(file);
    if bom {
        out.write_all(UTF8_BOM)?;
    }
    Ok(csv::Writer::from_writer(out))
}

fn write_rows<W: Write>(
    writer: &mut csv::Writer<W>,
    columns: &[String],
    records: &[Record],
) -> Result<()> {
    if columns.is_empty() {
        return Ok(());
    }
    writer.write_record(columns)?;
    for record in records {
        let row = columns
            .iter()
            .map(|c| record.get(c).and_then(value_text).unwrap_or_default());
        writer.write_record(row)?;
    }
    Ok(())
}
