//! Report artifacts and file naming
//!
//! Reports are written by the external pipeline as `{SYMBOL}_report_{YYYYmmdd_HHMMSS}.md`
//! under the output directory. This module computes those paths, finds the newest one for a
//! symbol, and loads a finished report for delivery.

use crate::error::{MarketError, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Symbol reported on when none is given
pub const DEFAULT_SYMBOL: &str = "NVS";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Inputs handed to the report-writing pipeline for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInputs {
    /// Ticker symbol the report covers
    pub stock_symbol: String,
    /// Wall-clock time of the run
    pub current_datetime: DateTime<Local>,
}

impl Default for RunInputs {
    fn default() -> Self {
        Self::new(DEFAULT_SYMBOL)
    }
}

impl RunInputs {
    /// Inputs for `symbol`, stamped with the current time
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            stock_symbol: normalize_symbol(&symbol.into()),
            current_datetime: Local::now(),
        }
    }

    /// Where this run's report should be written
    pub fn report_path(&self, output_dir: &Path) -> PathBuf {
        report_path(output_dir, &self.stock_symbol, self.current_datetime)
    }
}

/// A finished report, read in full
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub file_path: PathBuf,
    pub content: String,
    pub channel: String,
}

impl ReportArtifact {
    /// Read a report file destined for `channel`
    ///
    /// A missing file is reported as [`MarketError::MissingArtifact`].
    pub async fn load(path: impl AsRef<Path>, channel: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(MarketError::MissingArtifact(path.to_path_buf()));
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MarketError::MissingArtifact(path.to_path_buf())
            } else {
                MarketError::IoError(e)
            }
        })?;

        Ok(Self {
            file_path: path.to_path_buf(),
            content,
            channel: channel.into(),
        })
    }

    /// Base name of the file
    pub fn file_name(&self) -> String {
        self.file_path
            .file_name()
            .map_or_else(
                || self.file_path.display().to_string(),
                |n| n.to_string_lossy().into_owned(),
            )
    }

    /// Content length in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// File name for a report on `symbol` produced at `at`
pub fn report_file_name(symbol: &str, at: DateTime<Local>) -> String {
    format!(
        "{}_report_{}.md",
        normalize_symbol(symbol),
        at.format(TIMESTAMP_FORMAT)
    )
}

/// Full path for a report on `symbol` produced at `at`
pub fn report_path(output_dir: &Path, symbol: &str, at: DateTime<Local>) -> PathBuf {
    output_dir.join(report_file_name(symbol, at))
}

/// Newest report for `symbol` in `output_dir`, if any
///
/// Timestamps in the name sort chronologically, so the greatest name wins. A missing
/// directory yields `None`.
pub fn latest_report(output_dir: &Path, symbol: &str) -> Result<Option<PathBuf>> {
    let prefix = format!("{}_report_", normalize_symbol(symbol));

    let entries = match std::fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut newest: Option<(String, PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !(name.starts_with(&prefix) && name.ends_with(".md")) {
            continue;
        }
        if newest.as_ref().is_none_or(|(best, _)| name > *best) {
            newest = Some((name, entry.path()));
        }
    }

    Ok(newest.map(|(_, path)| path))
}
