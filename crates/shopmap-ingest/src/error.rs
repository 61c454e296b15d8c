use shopmap_core::MalformedInputError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid data source {raw:?}: {reason}")]
    InvalidSource { raw: String, reason: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input from {source_label}: {error}")]
    Malformed {
        source_label: String,
        #[source]
        error: MalformedInputError,
    },
}
