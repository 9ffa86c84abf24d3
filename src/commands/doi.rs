use super::{fetch_and_emit, CommandError};
use crate::identifier;
use std::path::Path;

/// `doi2bib doi <IDENTIFIER>`: accepts a bare DOI, a `doi:`-prefixed one or
/// a resolver URL.
pub fn run(input: &str, out: Option<&Path>, overwrite: bool) -> Result<(), CommandError> {
    let doi = identifier::normalize_doi(input)?;
    fetch_and_emit(&doi, out, overwrite)
}
