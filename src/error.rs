use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("source query error: {0}")]
    Source(String),
    #[error("malformed result row: {0}")]
    MalformedRow(String),
    #[error("ticket submission error: {0}")]
    Ticketing(String),
    #[error("dedup store error: {0}")]
    Store(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Configuration(_) => 2,
            AppError::Source(_) => 3,
            _ => 1,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_exit_codes() {
        assert_eq!(AppError::Configuration("x".into()).exit_code(), 2);
        assert_eq!(AppError::Source("x".into()).exit_code(), 3);
        assert_eq!(AppError::Store("x".into()).exit_code(), 1);
        assert_eq!(
            AppError::Io(io::Error::from(io::ErrorKind::PermissionDenied)).exit_code(),
            1
        );
    }
}
