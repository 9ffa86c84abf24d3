use super::{fetch_and_emit, CommandError};
use crate::identifier;
use crate::remote::ArxivApi;
use regex::Regex;
use std::path::Path;

/// `doi2bib arxiv <ID>`: resolve the arXiv identifier to a DOI through the
/// arXiv query API, then fetch like any other DOI.
pub fn run(input: &str, out: Option<&Path>, overwrite: bool) -> Result<(), CommandError> {
    let arxiv_id = identifier::normalize_arxiv_id(input)?;
    crate::blog_working!("Resolving", "arXiv:{}", arxiv_id);

    let doi = match ArxivApi::get_doi(&arxiv_id)? {
        Some(doi) => doi,
        None => fallback_doi(&arxiv_id)
            .ok_or_else(|| CommandError::NoDoi(format!("arXiv:{}", arxiv_id)))?,
    };
    fetch_and_emit(&doi, out, overwrite)
}

/// Unpublished arXiv entries are indexed by DataCite under
/// `10.48550/arXiv.<id>` (without the version suffix); try that before
/// giving up.
fn fallback_doi(arxiv_id: &str) -> Option<String> {
    let core = Regex::new(r"v\d+$").unwrap().replace(arxiv_id, "");
    identifier::normalize_doi(&format!("10.48550/arXiv.{}", core)).ok()
}
