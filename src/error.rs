use std::path::PathBuf;

use thiserror::Error;

use crate::xml::ParseError;

/// Failure to obtain a report document.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to fetch snow report: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("snow report is not valid XML: {0}")]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_convert() {
        let err: ReportError = ParseError::Malformed("no root element found".to_string()).into();
        assert!(matches!(err, ReportError::Parse(_)));
        assert_eq!(
            err.to_string(),
            "snow report is not valid XML: malformed XML: no root element found"
        );
    }
}
