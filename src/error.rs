use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Topology error: {0}")]
    Topology(String),

    #[error("Operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, GeometryError>;
