use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardError {
    #[error("Unknown institute: {0}")]
    UnknownInstitute(String),
    #[error("Service is not invocable: {0}")]
    UnknownService(String),
    #[error("At least one institute must be selected")]
    EmptySelection,
    #[error("Options error: {0}")]
    Options(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CardError>;
