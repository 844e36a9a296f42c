//! Error types for the pardus CLI

use thiserror::Error;

/// CLI-specific error type.
#[derive(Error, Debug)]
pub enum CliError {
    /// An error from the core decoding or store layer.
    #[error("{0}")]
    Core(#[from] pardus_core::Error),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Type alias for CLI results.
pub type Result<T> = std::result::Result<T, CliError>;

/// Print an error to stderr.
///
/// If `verbose` is true, prints the debug format; otherwise the
/// user-facing display format.
pub fn report_error(error: &CliError, verbose: bool) {
    if verbose {
        eprintln!("Error: {:?}", error);
    } else {
        eprintln!("Error: {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let err = CliError::InvalidArgument("bad type override".to_string());
        assert_eq!(format!("{}", err), "Invalid argument: bad type override");
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CliError = io_err.into();
        assert!(matches!(err, CliError::Io(_)));
    }

    #[test]
    fn test_core_error_from() {
        let core = pardus_core::Error::RecordOutOfRange(9);
        let err: CliError = core.into();
        assert!(matches!(err, CliError::Core(_)));
    }
}
