mod error;
pub use error::LookupError;

use quick_xml::{events::Event, Reader};
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header;
use serde::Deserialize;
use std::time::Duration;

// Constants
const DOI_API_URL: &str = "https://doi.org/";
const ARXIV_API_URL: &str = "https://export.arxiv.org/api/query?id_list=";
const PUBMED_IDCONV_URL: &str = "https://www.ncbi.nlm.nih.gov/pmc/utils/idconv/v1.0/?format=json&ids=";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = concat!("doi2bib/", env!("CARGO_PKG_VERSION"));

fn client() -> Result<Client, LookupError> {
    Ok(Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?)
}

/// Handles BibTeX retrieval through doi.org content negotiation
pub struct DoiApi;

impl DoiApi {
    pub fn get_bibtex(doi: &str) -> Result<String, LookupError> {
        let url = format!("{}{}", DOI_API_URL, doi);
        let response = client()?
            .get(&url)
            .header(header::ACCEPT, "application/x-bibtex; charset=utf-8")
            .send()?;

        if response.status().is_success() {
            Ok(response.text()?)
        } else {
            Err(LookupError::DoiHttp {
                doi: doi.to_string(),
                code: response.status().as_u16(),
            })
        }
    }
}

/// Handles DOI lookup from the NCBI ID-conversion service
pub struct PubmedApi;

#[derive(Debug, Deserialize)]
struct IdConvResponse {
    #[serde(default)]
    records: Vec<IdConvRecord>,
}

#[derive(Debug, Deserialize)]
struct IdConvRecord {
    doi: Option<String>,
}

impl PubmedApi {
    pub fn get_doi(pmid: &str) -> Result<Option<String>, LookupError> {
        let url = format!("{}{}", PUBMED_IDCONV_URL, pmid);
        let response = client()?.get(&url).send()?;

        if !response.status().is_success() {
            return Err(LookupError::PubmedHttp(response.status().as_u16()));
        }
        Ok(scan_idconv_response(&response.text()?)?)
    }
}

/// Extract the DOI of the first record in an ID-converter JSON body.
/// An empty `records` array or a record without a DOI yields `None`.
pub fn scan_idconv_response(body: &str) -> Result<Option<String>, serde_json::Error> {
    let parsed: IdConvResponse = serde_json::from_str(body)?;
    Ok(parsed.records.into_iter().next().and_then(|record| record.doi))
}

/// Handles DOI lookup from the arXiv query API
pub struct ArxivApi;

impl ArxivApi {
    pub fn get_doi(arxiv_id: &str) -> Result<Option<String>, LookupError> {
        let url = format!("{}{}", ARXIV_API_URL, arxiv_id);
        let response = client()?.get(&url).send()?;

        if !response.status().is_success() {
            return Err(LookupError::ArxivHttp(response.status().as_u16()));
        }
        Ok(scan_arxiv_feed(&response.text()?))
    }
}

/// Scan an arXiv Atom feed for a DOI: a namespaced `<arxiv:doi>` element
/// first, then a bare `<doi>` element, then a doi.org hyperlink. The body
/// is only XML-like; a step that cannot read it yields to the next one.
pub fn scan_arxiv_feed(xml: &str) -> Option<String> {
    if let Some(doi) = read_doi_element(xml, b"arxiv:doi") {
        return Some(doi);
    }
    if let Some(doi) = read_doi_element(xml, b"doi") {
        return Some(doi);
    }
    let re = Regex::new(r#"href=["']https?://(?:dx\.)?doi\.org/([^"']+)["']"#).unwrap();
    if let Some(caps) = re.captures(xml) {
        let raw = caps[1].trim();
        let doi = urlencoding::decode(raw)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        return Some(doi);
    }
    None
}

fn read_doi_element(xml: &str, tag: &[u8]) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut in_doi_tag = false;

    loop {
        // malformed markup just means this step found nothing
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == tag => in_doi_tag = true,
            Ok(Event::Text(e)) if in_doi_tag => {
                return e.unescape().ok().map(|text| text.trim().to_string());
            }
            Ok(Event::End(e)) if e.name().as_ref() == tag => in_doi_tag = false,
            Ok(Event::Eof) | Err(_) => break,
            _ => (),
        }
        buf.clear();
    }

    None
}
