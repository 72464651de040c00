use crate::{error::Result, scrape::record::ResultSet};
use std::{fs,
          path::{Path, PathBuf}};

/// Durable storage for the result set
pub trait RecordSink {
    /// Replace whatever was stored before with `results` in full
    fn persist(&mut self, results: &ResultSet) -> Result<()>;
}

/// Writes the result set as CSV: header row, then one row per record
///
/// The file is written beside the target and renamed over it, so readers never
/// see a half-written table.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RecordSink for CsvSink {
    fn persist(&mut self, results: &ResultSet) -> Result<()> {
        let staging = self.staging_path();

        let mut writer = csv::Writer::from_path(&staging)?;
        writer.write_record(results.columns())?;
        for record in results.records() {
            writer.write_record(record.values())?;
        }
        writer.flush()?;
        drop(writer);

        fs::rename(&staging, &self.path)?;
        log::debug!("Wrote {} record(s) to {}", results.len(), self.path.display());
        Ok(())
    }
}
