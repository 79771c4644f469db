//! Report collation: walk a directory of benchmark reports and write one
//! summary row per entry.
//!
//! Entries are processed strictly in sequence. By default the first entry that
//! cannot be read or extracted aborts the run; rows already written stay
//! written. With `skip_invalid`, failing entries are logged and skipped.

use crate::extract::{self, ExtractError, ExtractedRecord, Field};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Output rendering for collated records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Header line, then one separator-joined row per report.
    #[default]
    Csv,
    /// One JSON object per report, no header.
    Jsonl,
}

/// Resolved collation settings (config merged with CLI overrides).
#[derive(Debug, Clone)]
pub struct CollateOptions {
    pub format: OutputFormat,
    pub separator: String,
    pub sort: bool,
    pub include: Option<glob::Pattern>,
    pub skip_invalid: bool,
}

impl Default for CollateOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            separator: ", ".to_string(),
            sort: false,
            include: None,
            skip_invalid: false,
        }
    }
}

/// Outcome of a completed collation run.
#[derive(Debug, Default)]
pub struct CollateSummary {
    /// Number of record rows written (header excluded).
    pub written: usize,
    /// Entries skipped because they failed to read or extract.
    pub skipped: Vec<PathBuf>,
}

/// Collates every report in a folder into a single output stream.
pub struct ReportCollator {
    options: CollateOptions,
}

impl ReportCollator {
    pub fn new(options: CollateOptions) -> Self {
        Self { options }
    }

    /// List the entries of `folder` that will be collated.
    ///
    /// Files and subdirectories alike are returned, in filesystem order unless
    /// sorting is enabled. The include pattern, if any, is matched against
    /// the entry's file name.
    pub fn entries(&self, folder: &Path) -> Result<Vec<PathBuf>, CollateError> {
        let read_dir = std::fs::read_dir(folder).map_err(|e| CollateError::ReadDir {
            path: folder.to_path_buf(),
            source: e,
        })?;

        let mut paths = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| CollateError::ReadDir {
                path: folder.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();

            if let Some(pattern) = &self.options.include {
                let name = entry.file_name();
                if !pattern.matches(&name.to_string_lossy()) {
                    tracing::debug!(path = %path.display(), "excluded by include pattern");
                    continue;
                }
            }

            paths.push(path);
        }

        if self.options.sort {
            paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        }

        Ok(paths)
    }

    /// Collate `folder` into `out`.
    ///
    /// Writes the header (CSV only), then one row per entry. Read and
    /// extraction failures abort the run unless `skip_invalid` is set; write
    /// failures always abort.
    pub fn run<W: Write>(
        &self,
        folder: &Path,
        out: &mut W,
    ) -> Result<CollateSummary, CollateError> {
        let folder = resolve_folder(folder);
        tracing::debug!(folder = %folder.display(), "collating reports");

        if self.options.format == OutputFormat::Csv {
            writeln!(out, "{}", self.header()).map_err(CollateError::Write)?;
        }

        let mut summary = CollateSummary::default();
        for path in self.entries(&folder)? {
            let record = match collate_entry(&path) {
                Ok(record) => record,
                Err(e) if self.options.skip_invalid => {
                    tracing::warn!(
                        error = %e,
                        path = %path.display(),
                        "skipping invalid report"
                    );
                    summary.skipped.push(path);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let line = self.render(&path, &record)?;
            writeln!(out, "{line}").map_err(CollateError::Write)?;
            summary.written += 1;
        }

        Ok(summary)
    }

    /// Header line for CSV output.
    pub fn header(&self) -> String {
        let names: Vec<&str> = Field::ALL.iter().map(|f| f.name()).collect();
        names.join(&self.options.separator)
    }

    fn render(&self, path: &Path, record: &ExtractedRecord) -> Result<String, CollateError> {
        match self.options.format {
            OutputFormat::Csv => Ok(record.values().join(&self.options.separator)),
            OutputFormat::Jsonl => {
                let file = path.file_name().unwrap_or(path.as_os_str()).to_string_lossy();
                let row = JsonRow {
                    file: &file,
                    record,
                };
                serde_json::to_string(&row).map_err(|e| CollateError::Serialize { source: e })
            }
        }
    }
}

#[derive(Serialize)]
struct JsonRow<'a> {
    file: &'a str,
    #[serde(flatten)]
    record: &'a ExtractedRecord,
}

/// Canonicalize `folder`, falling back to the path as given.
fn resolve_folder(folder: &Path) -> PathBuf {
    match folder.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!(error = %e, folder = %folder.display(), "could not resolve folder");
            folder.to_path_buf()
        }
    }
}

/// Read one report and extract its record.
fn collate_entry(path: &Path) -> Result<ExtractedRecord, CollateError> {
    let content = std::fs::read_to_string(path).map_err(|e| CollateError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    extract::extract_record(&content).map_err(|e| CollateError::Extract {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Errors from collating a report folder.
#[derive(Debug)]
pub enum CollateError {
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Extract {
        path: PathBuf,
        source: ExtractError,
    },
    Serialize {
        source: serde_json::Error,
    },
    Write(std::io::Error),
}

impl std::fmt::Display for CollateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollateError::ReadDir { path, source } => {
                write!(f, "failed to list {}: {source}", path.display())
            }
            CollateError::Read { path, source } => {
                write!(f, "I/O error reading {}: {source}", path.display())
            }
            CollateError::Extract { path, source } => {
                write!(f, "{}: {source}", path.display())
            }
            CollateError::Serialize { source } => {
                write!(f, "failed to serialize record: {source}")
            }
            CollateError::Write(e) => write!(f, "failed to write output: {e}"),
        }
    }
}

impl std::error::Error for CollateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollateError::ReadDir { source, .. } => Some(source),
            CollateError::Read { source, .. } => Some(source),
            CollateError::Extract { source, .. } => Some(source),
            CollateError::Serialize { source } => Some(source),
            CollateError::Write(e) => Some(e),
        }
    }
}
