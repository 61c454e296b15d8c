use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A credential the map cannot render without is absent.
    #[error("{0} is not set; add it to .env (e.g. {0}=your-key) and restart")]
    ConfigurationMissing(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read schema file {path}: {source}")]
    SchemaFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema file: {0}")]
    SchemaFileParse(#[from] serde_yaml::Error),

    #[error("schema validation failed: {0}")]
    Validation(String),
}

/// The ingestion source as a whole could not be read as a table.
///
/// Individual bad rows never produce this; they are filtered and counted.
#[derive(Debug, Error)]
pub enum MalformedInputError {
    #[error("input is empty")]
    Empty,

    #[error("input is not delimiter-separated text: {0}")]
    Csv(#[from] csv::Error),

    #[error("header row matches no known column (found: {})", found.join(", "))]
    UnrecognizedHeader { found: Vec<String> },
}
