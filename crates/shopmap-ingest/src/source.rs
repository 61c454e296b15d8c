use std::path::PathBuf;

use reqwest::Url;

use crate::error::IngestError;

/// Where the tabular shop file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(Url),
    Path(PathBuf),
}

impl DataSource {
    /// `http://` and `https://` strings are URLs; everything else is a path.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::InvalidSource`] for a blank value or an
    /// `http(s)://` value that is not a well-formed URL.
    pub fn parse(raw: &str) -> Result<Self, IngestError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IngestError::InvalidSource {
                raw: raw.to_string(),
                reason: "empty data source".to_string(),
            });
        }

        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(trimmed).map_err(|e| IngestError::InvalidSource {
                raw: trimmed.to_string(),
                reason: e.to_string(),
            })?;
            Ok(DataSource::Url(url))
        } else {
            Ok(DataSource::Path(PathBuf::from(trimmed)))
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Url(url) => f.write_str(url.as_str()),
            DataSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}
