mod error;
pub use error::IdentifierError;

use regex::Regex;
use url::Url;

/// Case-insensitive ASCII prefix test, returning the remainder on match.
fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes()) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

fn is_url(s: &str) -> bool {
    strip_prefix_ci(s, "http://").is_some() || strip_prefix_ci(s, "https://").is_some()
}

/// Reduce any accepted DOI form (bare, `doi:`-prefixed, resolver URL,
/// percent-encoded) to the bare `10.<registrant>/<suffix>` string.
pub fn normalize_doi(input: &str) -> Result<String, IdentifierError> {
    let mut s = input.trim().to_string();
    if let Some(rest) = strip_prefix_ci(&s, "doi:") {
        s = rest.to_string();
    }
    if is_url(&s) {
        let url = Url::parse(&s).map_err(|_| IdentifierError::InvalidDoi(input.to_string()))?;
        s = url.path().trim_start_matches('/').to_string();
    }
    let s = urlencoding::decode(&s)
        .map_err(|_| IdentifierError::InvalidDoi(input.to_string()))?
        .into_owned();
    let re = Regex::new(r"^10\..+/.+$").unwrap();
    if re.is_match(&s) {
        Ok(s)
    } else {
        Err(IdentifierError::InvalidDoi(input.to_string()))
    }
}

/// Validate a bare PMID (`2389612`) or PMC identifier (`PMC3531190`).
pub fn normalize_pmid(input: &str) -> Result<String, IdentifierError> {
    let s = input.trim();
    let re = Regex::new(r"^(\d+|PMC\d+(\.\d+)?)$").unwrap();
    if re.is_match(s) {
        Ok(s.to_string())
    } else {
        Err(IdentifierError::InvalidPmid(input.to_string()))
    }
}

/// Validate a new-style arXiv identifier, with or without the `arXiv:`
/// prefix and an optional version suffix.
pub fn normalize_arxiv_id(input: &str) -> Result<String, IdentifierError> {
    let mut s = input.trim();
    if let Some(rest) = strip_prefix_ci(s, "arxiv:") {
        s = rest.trim();
    }
    let re = Regex::new(r"^\d+\.\d+(v\d+)?$").unwrap();
    if re.is_match(s) {
        Ok(s.to_string())
    } else {
        Err(IdentifierError::InvalidArxiv(input.to_string()))
    }
}
