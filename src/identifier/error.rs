use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentifierError {
    #[error("Invalid DOI: {0}")]
    InvalidDoi(String),

    #[error("Invalid arXiv ID: {0}")]
    InvalidArxiv(String),

    #[error("Invalid PubMed ID: {0}")]
    InvalidPmid(String),
}
