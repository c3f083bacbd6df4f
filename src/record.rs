//! Flat paper record and the industry-affiliation heuristic.

use serde::{Deserialize, Serialize};

/// Placeholder written in place of any absent field.
pub const SENTINEL: &str = "N/A";

/// Lower-case substrings that mark an affiliation as non-academic.
pub const COMPANY_KEYWORDS: &[&str] = &[
    "pharma",
    "biotech",
    "company",
    "inc.",
    "ltd.",
    "corporation",
];

/// CSV column order for exported records
pub const RECORD_COLUMNS: &[&str] = &[
    "Title",
    "PubmedID",
    "Authors",
    "Company Affiliations",
    "Corresponding Author Email",
];

/// One PubMed article reduced to the exported columns.
///
/// Every field is always populated; missing source data is replaced by
/// [`SENTINEL`] when the record is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "PubmedID")]
    pub pubmed_id: String,
    /// Comma-separated names of authors that have an affiliation
    #[serde(rename = "Authors")]
    pub authors: String,
    /// Comma-separated affiliations that matched [`COMPANY_KEYWORDS`]
    #[serde(rename = "Company Affiliations")]
    pub company_affiliations: String,
    #[serde(rename = "Corresponding Author Email")]
    pub corresponding_author_email: String,
}

/// Whether an affiliation looks like an industry one.
///
/// Plain substring test on the lower-cased text, so "Pharmaceuticals" and
/// "Acme Inc." both match.
pub fn is_company_affiliation(affiliation: &str) -> bool {
    let lower = affiliation.to_lowercase();
    COMPANY_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Accept an affiliation string as the email column only if it has an `@`.
pub fn email_or_sentinel(affiliation: Option<&str>) -> String {
    match affiliation {
        Some(text) if text.contains('@') => text.to_string(),
        _ => SENTINEL.to_string(),
    }
}

/// Accumulates authors of one article and produces the joined columns.
#[derive(Debug, Default)]
pub(crate) struct AuthorTally {
    names: Vec<String>,
    companies: Vec<String>,
}

impl AuthorTally {
    /// Record one author. Authors without an affiliation are skipped.
    pub(crate) fn push(&mut self, name: String, affiliation: Option<String>) {
        let Some(affiliation) = affiliation else {
            return;
        };
        self.names.push(name);
        if is_company_affiliation(&affiliation) {
            self.companies.push(affiliation);
        }
    }

    pub(crate) fn authors(&self) -> String {
        self.names.join(", ")
    }

    pub(crate) fn company_affiliations(&self) -> String {
        if self.companies.is_empty() {
            SENTINEL.to_string()
        } else {
            self.companies.join(", ")
        }
    }
}

/// Compose "Given Family", or the sentinel if either part is missing.
pub(crate) fn full_name(fore_name: Option<&str>, last_name: Option<&str>) -> String {
    match (fore_name, last_name) {
        (Some(fore), Some(last)) => format!("{} {}", fore, last),
        _ => SENTINEL.to_string(),
    }
}
