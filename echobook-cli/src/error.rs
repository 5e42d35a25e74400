//! Error handling for the CLI application

use std::fmt;

/// Custom error type for CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// File not found or inaccessible
    FileNotFound(String),
    /// Configuration error
    ConfigError(String),
    /// A setting needed by the command was given neither as a flag nor in the config file
    MissingSetting(String),
    /// API key environment variable is unset
    MissingApiKey(String),
    /// The checked book has defects
    Defects(usize),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::FileNotFound(path) => write!(f, "File not found: {path}"),
            CliError::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            CliError::MissingSetting(name) => write!(
                f,
                "Missing setting: {name} (pass it as a flag or set it in echobook.toml)"
            ),
            CliError::MissingApiKey(var) => {
                write!(f, "API key not found: environment variable {var} is not set")
            }
            CliError::Defects(count) => write!(f, "Found {count} defects"),
        }
    }
}

impl std::error::Error for CliError {}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_not_found_error_display() {
        let error = CliError::FileNotFound("book.txt".to_string());
        assert_eq!(error.to_string(), "File not found: book.txt");
    }

    #[test]
    fn test_missing_setting_display() {
        let error = CliError::MissingSetting("book.code".to_string());
        assert!(error.to_string().contains("book.code"));
        assert!(error.to_string().contains("echobook.toml"));
    }

    #[test]
    fn test_missing_api_key_display() {
        let error = CliError::MissingApiKey("OPENAI_API_KEY".to_string());
        assert_eq!(
            error.to_string(),
            "API key not found: environment variable OPENAI_API_KEY is not set"
        );
    }

    #[test]
    fn test_defects_display() {
        assert_eq!(CliError::Defects(3).to_string(), "Found 3 defects");
    }

    #[test]
    fn test_cli_error_through_anyhow() {
        let failure: CliResult<()> = Err(CliError::ConfigError("bad".to_string()).into());
        let err = failure.unwrap_err();
        assert!(err.downcast_ref::<CliError>().is_some());
        assert_eq!(err.to_string(), "Configuration error: bad");
    }
}
