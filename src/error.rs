use thiserror::Error;

#[derive(Error, Debug)]
pub enum LakehouseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown metadata property: {0}")]
    UnknownProperty(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid write mode: {0}")]
    InvalidWriteMode(String),

    #[error("Missing job config key: {0}")]
    MissingConfigKey(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Notebook error: {0}")]
    Notebook(String),

    #[error("Read error: {0}")]
    Read(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(String),

    #[error("Delta error: {0}")]
    Delta(String),

    #[error("Excel error: {0}")]
    Excel(String),
}

impl From<polars::error::PolarsError> for LakehouseError {
    fn from(err: polars::error::PolarsError) -> Self {
        LakehouseError::Polars(err.to_string())
    }
}

impl From<deltalake::DeltaTableError> for LakehouseError {
    fn from(err: deltalake::DeltaTableError) -> Self {
        LakehouseError::Delta(err.to_string())
    }
}

impl From<calamine::XlsxError> for LakehouseError {
    fn from(err: calamine::XlsxError) -> Self {
        LakehouseError::Excel(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LakehouseError>;
