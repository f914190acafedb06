use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LoadError>;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Worksheet '{0}' not found")]
    MissingSheet(String),

    #[error("Workbook has no worksheets: {0:?}")]
    NoWorksheet(PathBuf),

    #[error("Unsupported data format: {0}")]
    UnsupportedFormat(String),
}
