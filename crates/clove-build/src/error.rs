/// Build error types
use std::path::PathBuf;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No source root found for {}", .path.display())]
    NoSourceRoot { path: PathBuf },

    #[error("Process exited with code {exit_code}{}", format_stderr(.stderr))]
    ProcessFailed { exit_code: i32, stderr: String },

    #[error("{count} reflection warnings found")]
    ReflectionWarningsAsErrors { count: usize },

    #[error("Failed to write script file in {}: {error}", .dir.display())]
    TemporaryFileIo {
        dir: PathBuf,
        error: std::io::Error,
    },

    #[error("Failed to launch '{}': {error}", .program.display())]
    ProcessSpawn {
        program: PathBuf,
        error: std::io::Error,
    },

    #[error("Invalid classpath: {0}")]
    InvalidClasspath(String),

    #[error("I/O error at {}: {error}", .path.display())]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] clove_config::ConfigError),

    #[error("Build state error: {0}")]
    StateError(String),
}

fn format_stderr(stderr: &str) -> String {
    if stderr.trim().is_empty() {
        String::new()
    } else {
        format!(":\n{}", stderr.trim_end())
    }
}

impl BuildError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            error,
        }
    }

    /// Create a missing source root error
    pub fn no_source_root(path: impl Into<PathBuf>) -> Self {
        Self::NoSourceRoot { path: path.into() }
    }

    /// Create a process failure carrying the captured stderr tail
    pub fn process_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::ProcessFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Create a script file error
    pub fn temporary_file(dir: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::TemporaryFileIo {
            dir: dir.into(),
            error,
        }
    }

    /// Exit code of a failed process, if this error came from one
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ProcessFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_failed_message_includes_stderr() {
        let err = BuildError::process_failed(1, "Exception in thread \"main\"\n");
        let message = err.to_string();
        assert!(message.starts_with("Process exited with code 1:"));
        assert!(message.contains("Exception in thread"));
        assert_eq!(err.exit_code(), Some(1));
    }

    #[test]
    fn test_process_failed_message_without_stderr() {
        let err = BuildError::process_failed(2, "  \n");
        assert_eq!(err.to_string(), "Process exited with code 2");
    }

    #[test]
    fn test_reflection_warnings_message() {
        let err = BuildError::ReflectionWarningsAsErrors { count: 3 };
        assert_eq!(err.to_string(), "3 reflection warnings found");
        assert_eq!(err.exit_code(), None);
    }
}
