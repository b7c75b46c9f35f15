use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::report::ReportTable;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unsupported export format: .{0} (use .csv or .json)")]
    UnsupportedExtension(String),

    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        cause: anyhow::Error,
    },
}

/// Write the report table to `path`.  Dispatch by extension.
pub fn write_table(path: &Path, table: &ReportTable) -> Result<(), ExportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let written = match ext.as_str() {
        "csv" => write_csv(path, table),
        "json" => write_json(path, table),
        other => return Err(ExportError::UnsupportedExtension(other.to_string())),
    };

    written.map_err(|cause| ExportError::Write {
        path: path.to_path_buf(),
        cause,
    })?;
    log::info!("Exported {} rows to {}", table.rows.len(), path.display());
    Ok(())
}

fn write_csv(path: &Path, table: &ReportTable) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer
        .write_record([&table.key_column, &table.value_column])
        .context("writing CSV header")?;
    for row in &table.rows {
        writer
            .write_record([row.key.to_string(), table.measure.format(row.value)])
            .context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_json(path: &Path, table: &ReportTable) -> Result<()> {
    let file = File::create(path).context("creating JSON file")?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, table).context("serialising report")?;
    out.flush().context("flushing JSON")?;
    Ok(())
}
