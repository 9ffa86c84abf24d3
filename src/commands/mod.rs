pub mod arxiv;
pub mod doi;
pub mod pmid;

use crate::bibtex::{self, BibtexError};
use crate::identifier::IdentifierError;
use crate::output;
use crate::remote::{DoiApi, LookupError};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid identifier: {0}")]
    Identifier(#[from] IdentifierError),

    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("BibTeX processing failed: {0}")]
    Bibtex(#[from] BibtexError),

    #[error("No DOI found for {0}")]
    NoDoi(String),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared tail of every subcommand: fetch the BibTeX record for a resolved
/// DOI, normalize it, then print it or write it to the requested path.
pub(crate) fn fetch_and_emit(
    doi: &str,
    out: Option<&Path>,
    overwrite: bool,
) -> Result<(), CommandError> {
    crate::blog_working!("Fetching", "{}", doi);
    let raw = DoiApi::get_bibtex(doi)?;
    let normalized = bibtex::normalize_bibtex(&raw)?;

    match out {
        Some(path) => {
            output::save_bibtex(&normalized, path, !overwrite)?;
            crate::blog_done!("Wrote", "{}", path.display());
        }
        None => print!("{}", normalized),
    }
    Ok(())
}
