use plotters::drawing::DrawingAreaErrorKind;
use std::{
    io,
    path::{Path, PathBuf},
};

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error(
        "Cannot save to '{}'. It may be open elsewhere or you lack permissions.",
        path.display()
    )]
    PermissionDenied { path: PathBuf },

    #[error(transparent)]
    Io(io::Error),

    #[error(transparent)]
    Csv(csv::Error),
}

impl SaveError {
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => SaveError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => SaveError::Io(err),
        }
    }

    pub fn from_csv(path: &Path, err: csv::Error) -> Self {
        if let csv::ErrorKind::Io(io_err) = err.kind() {
            if io_err.kind() == io::ErrorKind::PermissionDenied {
                return SaveError::PermissionDenied {
                    path: path.to_path_buf(),
                };
            }
        }
        SaveError::Csv(err)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("no diary table at '{}'", path.display())]
    NoData { path: PathBuf },

    #[error("the diary table has no entries")]
    EmptyData,

    #[error("the diary table has no '{0}' column")]
    MissingColumn(&'static str),

    #[error("failed to read the diary table: {0}")]
    Read(#[from] csv::Error),

    #[error("failed to open the diary table: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("line {line}: '{value}' is not a date")]
    BadDate { line: u64, value: String },

    #[error("line {line}: could not convert '{value}' in {column} to a number")]
    BadNumber {
        column: &'static str,
        line: u64,
        value: String,
    },

    #[error("line {line}: '{value}' in {column} is neither true nor false")]
    BadFlag {
        column: &'static str,
        line: u64,
        value: String,
    },

    #[error("failed to draw chart: {0}")]
    Render(String),

    #[error("failed to write chart: {0}")]
    Io(#[from] io::Error),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for PlotError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        PlotError::Render(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_is_singled_out() {
        let err = SaveError::from_io(
            Path::new("diary_data.csv"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );

        assert!(matches!(err, SaveError::PermissionDenied { .. }));
        assert_eq!(
            err.to_string(),
            "Cannot save to 'diary_data.csv'. It may be open elsewhere or you lack permissions."
        );
    }

    #[test]
    fn other_io_errors_pass_through() {
        let err = SaveError::from_io(
            Path::new("diary_data.csv"),
            io::Error::other("disk on fire"),
        );

        assert!(matches!(err, SaveError::Io(_)));
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn csv_io_errors_are_classified() {
        let csv_err = csv::Error::from(io::Error::from(io::ErrorKind::PermissionDenied));
        let err = SaveError::from_csv(Path::new("diary_data.csv"), csv_err);

        assert!(matches!(err, SaveError::PermissionDenied { .. }));
    }
}
