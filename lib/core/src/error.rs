use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no comparable properties found")]
    NoComparables,

    #[error("insufficient comparable properties: none of {candidates} candidates cleared the similarity threshold")]
    InsufficientEvidence { candidates: usize },

    #[error("data quality: {0}")]
    DataQuality(String),

    #[error("listing not found: {0}")]
    ListingNotFound(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
