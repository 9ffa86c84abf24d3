use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to fetch DOI {doi}: HTTP {code}")]
    DoiHttp { doi: String, code: u16 },

    #[error("PubMed ID conversion failed: HTTP {0}")]
    PubmedHttp(u16),

    #[error("arXiv query failed: HTTP {0}")]
    ArxivHttp(u16),

    #[error("Failed to parse PubMed response: {0}")]
    Json(#[from] serde_json::Error),
}
