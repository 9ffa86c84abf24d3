mod error;
pub use error::BibtexError;

use biblatex::{Bibliography, Chunk, Entry, Spanned};
use indexmap::IndexMap;
use regex::Regex;

/// Fields whose values get the TeX special-character treatment.
const ENCODED_FIELDS: [&str; 3] = ["title", "journal", "booktitle"];

/// Sequential find-and-replace table for characters that publishers tend to
/// ship as raw unicode. Source characters are disjoint, so entry order does
/// not affect the result.
const SPECIAL_CHARS: &[(&str, &str)] = &[
    ("a\u{300}", "\\`a"),
    ("\u{f4}", "\\^o"),
    ("\u{ea}", "\\^e"),
    ("\u{e2}", "\\^a"),
    ("\u{ae}", "{\\textregistered}"),
    ("\u{e7}", "\\c{c}"),
    ("\u{f6}", "\\\"{o}"),
    ("\u{e4}", "\\\"{a}"),
    ("\u{fc}", "\\\"{u}"),
    ("\u{d6}", "\\\"{O}"),
    ("\u{c4}", "\\\"{A}"),
    ("\u{dc}", "\\\"{U}"),
];

/// An owned, parser-independent view of one BibTeX entry: the entry type,
/// the citation key and the fields in their parsed order.
#[derive(Debug, Clone, PartialEq)]
pub struct BibEntry {
    pub entry_type: String,
    pub key: String,
    pub fields: IndexMap<String, String>,
}

/// Parse raw BibTeX text, normalize every entry and render the result back
/// to text, preserving entry order.
pub fn normalize_bibtex(bib_str: &str) -> Result<String, BibtexError> {
    let bibliography =
        Bibliography::parse(bib_str).map_err(|e| BibtexError::ParseFailed(e.to_string()))?;

    let mut entries: Vec<BibEntry> = bibliography
        .into_iter()
        .map(|entry| to_owned_entry(&entry))
        .collect();

    for entry in &mut entries {
        normalize_entry(entry);
    }

    Ok(entries
        .iter()
        .map(render_entry)
        .collect::<Vec<_>>()
        .join("\n"))
}

fn to_owned_entry(entry: &Entry) -> BibEntry {
    let mut fields = IndexMap::new();
    for (name, chunks) in &entry.fields {
        fields.insert(name.clone(), chunks_to_value(chunks));
    }
    BibEntry {
        entry_type: entry.entry_type.to_string(),
        key: entry.key.clone(),
        fields,
    }
}

/// Flatten a chunk list back into field-value text: brace-protected chunks
/// keep their braces, math chunks come back as a braced math group. The
/// parser splits `{$...$}` into empty verbatim chunks around a math chunk;
/// dropping the empty ones merges the group back together.
fn chunks_to_value(chunks: &[Spanned<Chunk>]) -> String {
    let mut value = String::new();
    for chunk in chunks {
        match &chunk.v {
            Chunk::Normal(s) => value.push_str(s),
            Chunk::Verbatim(s) if s.is_empty() => {}
            Chunk::Verbatim(s) => {
                value.push('{');
                value.push_str(s);
                value.push('}');
            }
            Chunk::Math(s) => {
                value.push_str("{$");
                value.push_str(s);
                value.push_str("$}");
            }
        }
    }
    value
}

/// Apply the field rewrites in their fixed order. Later rules may depend on
/// earlier cleanups within a field; rules on different fields commute.
fn normalize_entry(entry: &mut BibEntry) {
    entry.key = entry.key.replace('_', "");

    if let Some(pages) = entry.fields.get("pages").cloned() {
        match normalize_pages(&pages) {
            Some(pages) => {
                entry.fields.insert("pages".to_string(), pages);
            }
            None => {
                entry.fields.shift_remove("pages");
            }
        }
    }

    if let Some(url) = entry.fields.get("url").cloned() {
        entry.fields.insert("url".to_string(), decode_percent(&url));
    }

    if let Some(title) = entry.fields.get("title").cloned() {
        entry
            .fields
            .insert("title".to_string(), wrap_math_tokens(&title));
    }

    if let Some(month) = entry.fields.get("month").cloned() {
        entry
            .fields
            .insert("month".to_string(), strip_month_braces(&month));
    }

    for field in ENCODED_FIELDS {
        if let Some(value) = entry.fields.get(field).cloned() {
            entry
                .fields
                .insert(field.to_string(), encode_special_chars(&value));
        }
    }
}

/// `n/a-n/a` drops the field; a single-hyphen range becomes a double-hyphen
/// range unless the value already contains `--`.
fn normalize_pages(pages: &str) -> Option<String> {
    if pages.eq_ignore_ascii_case("n/a-n/a") {
        return None;
    }
    if pages.contains("--") {
        Some(pages.to_string())
    } else {
        Some(pages.replace('-', "--"))
    }
}

fn decode_percent(value: &str) -> String {
    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

/// Wrap brace-delimited `\var...` macro tokens in math-mode delimiters so
/// they render: `{\varX}` becomes `{$\varX$}`. The parser pads commands
/// with a trailing space inside the braces, so whitespace before the
/// closing brace is absorbed.
fn wrap_math_tokens(title: &str) -> String {
    let re = Regex::new(r"\{(\\var[A-Z]?[a-z]*)\s*\}").unwrap();
    re.replace_all(title, "{$$${1}$$}").into_owned()
}

fn strip_month_braces(month: &str) -> String {
    let month = month.trim();
    if month.len() >= 2 && month.starts_with('{') && month.ends_with('}') {
        month[1..month.len() - 1].to_string()
    } else {
        month.to_string()
    }
}

fn encode_special_chars(value: &str) -> String {
    let mut value = value.to_string();
    for (source, replacement) in SPECIAL_CHARS {
        value = value.replace(source, replacement);
    }
    value
}

fn render_entry(entry: &BibEntry) -> String {
    let mut out = String::new();
    out.push('@');
    out.push_str(&entry.entry_type);
    out.push('{');
    out.push_str(&entry.key);
    out.push_str(",\n");
    for (name, value) in &entry.fields {
        out.push_str("    ");
        out.push_str(name);
        out.push_str(" = {");
        out.push_str(value);
        out.push_str("},\n");
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underscores_are_removed_from_keys() {
        let bib = "@article{my_key_2024,\n title = {T},\n}";
        let out = normalize_bibtex(bib).unwrap();
        assert!(out.contains("@article{mykey2024,"), "{out}");
    }

    #[test]
    fn single_hyphen_page_range_is_doubled() {
        let bib = "@article{k, pages = {100-110}}";
        let out = normalize_bibtex(bib).unwrap();
        assert!(out.contains("pages = {100--110}"), "{out}");
    }

    #[test]
    fn double_hyphen_page_range_is_untouched() {
        let bib = "@article{k, pages = {100--110}}";
        let out = normalize_bibtex(bib).unwrap();
        assert!(out.contains("pages = {100--110}"), "{out}");
    }

    #[test]
    fn na_pages_are_dropped_case_insensitively() {
        for pages in ["n/a-n/a", "n/a-N/A", "N/A-N/A"] {
            let bib = format!("@article{{k, pages = {{{pages}}}, year = {{2020}}}}");
            let out = normalize_bibtex(&bib).unwrap();
            assert!(!out.contains("pages"), "{out}");
            assert!(out.contains("year = {2020}"), "{out}");
        }
    }

    #[test]
    fn pages_rules_pure() {
        assert_eq!(normalize_pages("100-110"), Some("100--110".to_string()));
        assert_eq!(normalize_pages("e100-e110"), Some("e100--e110".to_string()));
        assert_eq!(normalize_pages("100--110"), Some("100--110".to_string()));
        assert_eq!(
            normalize_pages("ArticleNumber"),
            Some("ArticleNumber".to_string())
        );
        assert_eq!(normalize_pages("n/a-n/a"), None);
        assert_eq!(normalize_pages("N/a-N/A"), None);
    }

    #[test]
    fn url_is_percent_decoded() {
        let bib = "@article{k, url = {https://doi.org/10.1002/%28SICI%291096}}";
        let out = normalize_bibtex(bib).unwrap();
        assert!(
            out.contains("url = {https://doi.org/10.1002/(SICI)1096}"),
            "{out}"
        );
    }

    #[test]
    fn var_macros_are_wrapped_in_math_mode() {
        assert_eq!(
            wrap_math_tokens(r"A study of {\varX} phenomena"),
            r"A study of {$\varX$} phenomena"
        );
        assert_eq!(
            wrap_math_tokens(r"{\varEpsilon} and {\vartheta}"),
            r"{$\varEpsilon$} and {$\vartheta$}"
        );
        // Command tokens padded with trailing whitespace still match.
        assert_eq!(
            wrap_math_tokens(r"A study of {\varX } phenomena"),
            r"A study of {$\varX$} phenomena"
        );
        // Non-matching brace groups stay untouched.
        assert_eq!(
            wrap_math_tokens(r"{\textbf{x}} and {\varX2}"),
            r"{\textbf{x}} and {\varX2}"
        );
        // Already wrapped tokens do not match again.
        assert_eq!(
            wrap_math_tokens(r"A study of {$\varX$} phenomena"),
            r"A study of {$\varX$} phenomena"
        );
    }

    #[test]
    fn month_outer_braces_are_stripped_once() {
        let bib = "@article{k, month = \"{January}\"}";
        let out = normalize_bibtex(bib).unwrap();
        assert!(out.contains("month = {January}"), "{out}");

        assert_eq!(strip_month_braces("{January}"), "January");
        assert_eq!(strip_month_braces("  {January}  "), "January");
        assert_eq!(strip_month_braces("{{January}}"), "{January}");
        assert_eq!(strip_month_braces("January"), "January");
    }

    #[test]
    fn special_characters_are_encoded() {
        assert_eq!(encode_special_chars("Z\u{fc}rich"), "Z\\\"{u}rich");
        assert_eq!(encode_special_chars("\u{d6}ko"), "\\\"{O}ko");
        assert_eq!(
            encode_special_chars("fa\u{e7}ade\u{ae}"),
            "fa\\c{c}ade{\\textregistered}"
        );
        assert_eq!(encode_special_chars("plain ascii"), "plain ascii");
    }

    #[test]
    fn journal_field_gets_encoded() {
        let bib = "@article{k, journal = {Annalen der Ph\u{f6}nik}}";
        let out = normalize_bibtex(bib).unwrap();
        assert!(out.contains("Ph\\\"{o}nik"), "{out}");
    }

    #[test]
    fn entry_order_is_preserved() {
        let bib = "@article{zzz, title = {Z}}\n\n@book{aaa, title = {A}}";
        let out = normalize_bibtex(bib).unwrap();
        let z = out.find("@article{zzz").unwrap();
        let a = out.find("@book{aaa").unwrap();
        assert!(z < a, "{out}");
    }

    #[test]
    fn normalization_is_idempotent() {
        let bib = concat!(
            "@article{some_key_1, pages = {10-20}, month = \"{March}\",\n",
            "  journal = {Annalen der Ph\u{f6}nik},\n",
            "  url = {https://doi.org/10.1002/%28SICI%291096},\n",
            "  year = {1999}}\n",
            "@book{other_key, title = {Plain title}, pages = {n/a-n/a}}"
        );
        let once = normalize_bibtex(bib).unwrap();
        let twice = normalize_bibtex(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn var_macro_is_wrapped_through_the_full_pipeline() {
        let bib = r"@article{k, title = {A study of {\varX} phenomena}}";
        let once = normalize_bibtex(bib).unwrap();
        assert!(once.contains(r"{$\varX$}"), "{once}");

        let twice = normalize_bibtex(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn wrapped_math_group_survives_reparsing() {
        let bib = r"@article{k, title = {A study of {$\varX$} phenomena}}";
        let out = normalize_bibtex(bib).unwrap();
        assert!(out.contains(r"title = {A study of {$\varX$} phenomena}"), "{out}");
    }

    #[test]
    fn entry_less_input_renders_empty() {
        assert_eq!(normalize_bibtex("").unwrap(), "");
    }
}
