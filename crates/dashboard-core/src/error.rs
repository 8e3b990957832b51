use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the usage dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV stream itself could not be decoded (bad UTF-8, broken header).
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// The header row lacks one or more required activity columns.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A filter selection is inconsistent (e.g. start after end).
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = DashboardError::FileRead {
            path: PathBuf::from("/some/usage.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/usage.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_missing_columns() {
        let err = DashboardError::MissingColumns(vec!["Host".to_string(), "User".to_string()]);
        assert_eq!(err.to_string(), "Missing required columns: Host, User");
    }

    #[test]
    fn test_error_display_invalid_filter() {
        let err = DashboardError::InvalidFilter("start after end".to_string());
        assert_eq!(err.to_string(), "Invalid filter: start after end");
    }

    #[test]
    fn test_error_from_csv() {
        // Invalid UTF-8 in a header field cannot be decoded into a String record.
        let bytes: &[u8] = b"Date,\xff\xfe\n";
        let mut reader = csv::Reader::from_reader(bytes);
        let csv_err = reader.headers().unwrap_err();
        let err: DashboardError = csv_err.into();
        assert!(err.to_string().contains("Failed to parse CSV"));
    }
}
