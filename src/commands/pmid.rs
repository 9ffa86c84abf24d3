use super::{fetch_and_emit, CommandError};
use crate::identifier;
use crate::remote::PubmedApi;
use std::path::Path;

/// `doi2bib pmid <ID>`: resolve a PMID or PMC identifier to a DOI through
/// the NCBI ID-conversion service, then fetch like any other DOI.
pub fn run(input: &str, out: Option<&Path>, overwrite: bool) -> Result<(), CommandError> {
    let pmid = identifier::normalize_pmid(input)?;
    crate::blog_working!("Resolving", "PubMed {}", pmid);

    let doi = PubmedApi::get_doi(&pmid)?.ok_or_else(|| CommandError::NoDoi(pmid.clone()))?;
    fetch_and_emit(&doi, out, overwrite)
}
