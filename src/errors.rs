//! Errors
//!
//! Custom error types used throughout the `quantile_intervals` crate.
use thiserror::Error;

/// Errors that can occur while training or querying interval models.
#[derive(Debug, Error)]
pub enum IntervalError {
    /// A configuration value is invalid, for example a quantile level outside of (0, 1).
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Prediction intervals were requested from a predictor trained without them.
    #[error("This predictor was not trained with prediction intervals. Pass predict_intervals to train first.")]
    NotTrained,
    /// An operation needing a trained predictor was called before `train`.
    #[error("The predictor must be trained before calling {0}.")]
    Untrained(String),
    /// The data is not usable, for example a non numeric output column.
    #[error("Invalid data: {0}")]
    Data(String),
    /// A required column was absent from the data.
    #[error("Column {0} was not found in the data.")]
    MissingColumn(String),
    /// Unable to write model to file.
    #[error("Unable to write model to file: {0}")]
    UnableToWrite(String),
    /// Unable to read model from file.
    #[error("Unable to read model from a file {0}")]
    UnableToRead(String),
}

/// Broad classification of an [`IntervalError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    NotTrained,
    Data,
    Io,
}

impl IntervalError {
    /// The class of failure this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            IntervalError::Configuration(_) | IntervalError::ParseString(..) | IntervalError::InvalidParameter(..) => {
                ErrorKind::Configuration
            }
            IntervalError::NotTrained | IntervalError::Untrained(_) => ErrorKind::NotTrained,
            IntervalError::Data(_) | IntervalError::MissingColumn(_) => ErrorKind::Data,
            IntervalError::UnableToWrite(_) | IntervalError::UnableToRead(_) => ErrorKind::Io,
        }
    }

    /// Whether the error was caused by a bad value supplied by the caller,
    /// as opposed to an IO failure.
    pub fn is_value_error(&self) -> bool {
        self.kind() != ErrorKind::Io
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(IntervalError::NotTrained.kind(), ErrorKind::NotTrained);
        assert_eq!(
            IntervalError::ParseString("x".to_string(), "ReturnShape".to_string(), "df".to_string()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(IntervalError::MissingColumn("CHAS".to_string()).kind(), ErrorKind::Data);
        assert!(IntervalError::Data("bad".to_string()).is_value_error());
        assert!(!IntervalError::UnableToRead("nope".to_string()).is_value_error());
    }

    #[test]
    fn test_error_display() {
        let e = IntervalError::ParseString(
            "this will not work".to_string(),
            "ReturnShape".to_string(),
            "df, list".to_string(),
        );
        assert_eq!(
            e.to_string(),
            "Invalid value this will not work passed for ReturnShape, expected one of df, list."
        );
    }
}
