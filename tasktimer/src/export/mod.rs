//! Report generation for the task list.
//!
//! Both formats are read-only views over a task snapshot:
//! - [`csv::to_csv`]: spreadsheet-friendly listing with a summary block
//! - [`pdf::to_pdf`]: paginated A4 report with per-category sections
//!
//! [`save_report`] renders one of them and writes it into the export
//! directory under a dated file name.

pub mod csv;
pub mod pdf;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tasktimer_proto::{Category, Task};

/// Errors that can occur while producing a report.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The PDF document could not be assembled.
    #[error("failed to build PDF: {0}")]
    Pdf(String),

    /// The report file could not be written.
    #[error("failed to write report {path}: {source}")]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Output format of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values.
    Csv,
    /// Portable Document Format.
    Pdf,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
        }
    }
}

/// Where and how reports are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    /// Directory the report files land in.
    pub directory: PathBuf,
    /// File name prefix, followed by `_dd-mm-yyyy`.
    pub file_prefix: String,
    /// Title printed at the top of PDF reports.
    pub title: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            file_prefix: "relatorio_tarefas".to_string(),
            title: "RELATÓRIO DE TAREFAS".to_string(),
        }
    }
}

/// Formats seconds as zero-padded `HH:MM:SS`. Hours are not capped.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Builds `<prefix>_dd-mm-yyyy.<ext>`.
#[must_use]
pub fn report_file_name(prefix: &str, date: NaiveDate, extension: &str) -> String {
    format!("{prefix}_{}.{extension}", date.format("%d-%m-%Y"))
}

/// Sum of effective elapsed seconds, optionally limited to one category.
pub(crate) fn total_seconds(tasks: &[Task], category: Option<Category>) -> u64 {
    tasks
        .iter()
        .filter(|t| category.is_none_or(|c| t.category == c))
        .map(Task::elapsed)
        .sum()
}

/// Renders `tasks` in `format` and writes the result into
/// `settings.directory`. Returns the path written.
///
/// # Errors
///
/// Returns [`ExportError::Pdf`] if the PDF cannot be assembled and
/// [`ExportError::Io`] if the directory or file cannot be written.
pub fn save_report(
    tasks: &[Task],
    format: ExportFormat,
    settings: &ReportSettings,
    date: NaiveDate,
) -> Result<PathBuf, ExportError> {
    let bytes = match format {
        ExportFormat::Csv => csv::to_csv(tasks).into_bytes(),
        ExportFormat::Pdf => pdf::to_pdf(tasks, &settings.title, date)?,
    };
    let path = settings.directory.join(report_file_name(
        &settings.file_prefix,
        date,
        format.extension(),
    ));
    write_file(&settings.directory, &path, &bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "report written");
    Ok(path)
}

fn write_file(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    std::fs::write(path, bytes).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
