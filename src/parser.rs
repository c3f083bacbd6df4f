//! EFetch XML extraction.
//!
//! Walks the `PubmedArticleSet` document with a pull parser and reduces every
//! `PubmedArticle` element (at any depth) to a [`PaperRecord`]. Each field
//! is taken from the *first* matching element; later matches are ignored even
//! when the first one turned out empty.

use crate::error::{FetcherError, Result};
use crate::record::{email_or_sentinel, full_name, AuthorTally, PaperRecord, SENTINEL};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, instrument};

/// Parse an EFetch `retmode=xml` response into records, in document order.
///
/// Fails with [`FetcherError::XmlParse`] if the document is not well formed.
#[instrument(skip(xml), fields(xml_size = xml.len()))]
pub fn parse_articles(xml: &str) -> Result<Vec<PaperRecord>> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<String> = Vec::new();
    let mut seen_root = false;
    let mut current: Option<ArticleBuilder> = None;
    let mut records = Vec::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(FetcherError::XmlParse(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        };

        match event {
            Event::Start(e) => {
                if stack.is_empty() && seen_root {
                    return Err(junk_after_root());
                }
                seen_root = true;
                stack.push(tag_name(e.name().as_ref()));

                if let Some(article) = current.as_mut() {
                    article.open(&stack);
                } else if stack.last().is_some_and(|n| n == "PubmedArticle") {
                    current = Some(ArticleBuilder::new(stack.len()));
                }
            }
            Event::Empty(e) => {
                if stack.is_empty() && seen_root {
                    return Err(junk_after_root());
                }
                seen_root = true;
                let name = tag_name(e.name().as_ref());

                if let Some(article) = current.as_mut() {
                    let parent = stack.last().map(String::as_str);
                    article.open_empty(&name, parent, stack.len() + 1);
                } else if name == "PubmedArticle" {
                    records.push(ArticleBuilder::new(stack.len() + 1).finish());
                }
            }
            Event::End(_) => {
                let depth = stack.len();
                if current.as_ref().is_some_and(|a| a.depth == depth) {
                    if let Some(article) = current.take() {
                        records.push(article.finish());
                    }
                } else if let Some(article) = current.as_mut() {
                    article.close(depth);
                }
                stack.pop();
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|e| FetcherError::XmlParse(format!("Failed to decode XML text: {}", e)))?;
                if stack.is_empty() {
                    if !text.trim().is_empty() {
                        return Err(FetcherError::XmlParse(
                            "text outside of the document element".to_string(),
                        ));
                    }
                } else if let Some(article) = current.as_mut() {
                    article.text(&text);
                }
            }
            Event::CData(e) => {
                if let Some(article) = current.as_mut() {
                    article.text(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(FetcherError::XmlParse(format!(
            "unexpected end of document, <{}> is not closed",
            open
        )));
    }
    if !seen_root {
        return Err(FetcherError::XmlParse("no document element".to_string()));
    }

    debug!(count = records.len(), "Parsed EFetch articles");
    Ok(records)
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn junk_after_root() -> FetcherError {
    FetcherError::XmlParse("junk after document element".to_string())
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// First-match slot for one extracted value.
#[derive(Debug, Default)]
enum Slot {
    #[default]
    Open,
    Pending,
    Filled(Option<String>),
}

impl Slot {
    /// Reserve the slot for the element that just opened. Returns false if an
    /// earlier element already owns it.
    fn claim(&mut self) -> bool {
        if matches!(self, Slot::Open) {
            *self = Slot::Pending;
            true
        } else {
            false
        }
    }

    fn fill(&mut self, value: Option<String>) {
        *self = Slot::Filled(value);
    }

    fn into_value(self) -> Option<String> {
        match self {
            Slot::Filled(value) => value,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    PubmedId,
    Email,
    ForeName,
    LastName,
    Affiliation,
}

#[derive(Debug)]
struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

#[derive(Debug)]
struct AuthorFrame {
    depth: usize,
    fore_name: Slot,
    last_name: Slot,
    affiliation: Slot,
}

impl AuthorFrame {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            fore_name: Slot::default(),
            last_name: Slot::default(),
            affiliation: Slot::default(),
        }
    }
}

/// State for the `PubmedArticle` currently being read.
#[derive(Debug)]
struct ArticleBuilder {
    depth: usize,
    title: Slot,
    pubmed_id: Slot,
    email: Slot,
    author: Option<AuthorFrame>,
    tally: AuthorTally,
    captures: Vec<Capture>,
}

impl ArticleBuilder {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            title: Slot::default(),
            pubmed_id: Slot::default(),
            email: Slot::default(),
            author: None,
            tally: AuthorTally::default(),
            captures: Vec::new(),
        }
    }

    /// A start tag inside the article; `stack` ends with its name.
    fn open(&mut self, stack: &[String]) {
        let depth = stack.len();
        let Some(name) = stack.last().map(String::as_str) else {
            return;
        };
        let parent = depth.checked_sub(2).map(|i| stack[i].as_str());

        for field in self.claim_fields(name, parent, depth) {
            self.captures.push(Capture {
                field,
                depth,
                text: String::new(),
            });
        }

        if name == "Author" && self.author.is_none() {
            self.author = Some(AuthorFrame::new(depth));
        }
    }

    /// A self-closing tag: it still claims its slots, with no text.
    fn open_empty(&mut self, name: &str, parent: Option<&str>, depth: usize) {
        for field in self.claim_fields(name, parent, depth) {
            self.fill(field, None);
        }
    }

    fn claim_fields(&mut self, name: &str, parent: Option<&str>, depth: usize) -> Vec<Field> {
        let mut fields = Vec::new();
        match name {
            "ArticleTitle" => {
                if self.title.claim() {
                    fields.push(Field::Title);
                }
            }
            "PMID" => {
                if self.pubmed_id.claim() {
                    fields.push(Field::PubmedId);
                }
            }
            "ForeName" | "LastName" => {
                if let Some(author) = self.author.as_mut() {
                    // direct children of <Author> only
                    if depth == author.depth + 1 {
                        let (slot, field) = if name == "ForeName" {
                            (&mut author.fore_name, Field::ForeName)
                        } else {
                            (&mut author.last_name, Field::LastName)
                        };
                        if slot.claim() {
                            fields.push(field);
                        }
                    }
                }
            }
            "Affiliation" => {
                if let Some(author) = self.author.as_mut() {
                    if author.affiliation.claim() {
                        fields.push(Field::Affiliation);
                    }
                }
                if parent == Some("AffiliationInfo") && self.email.claim() {
                    fields.push(Field::Email);
                }
            }
            _ => {}
        }
        fields
    }

    fn text(&mut self, text: &str) {
        for capture in &mut self.captures {
            capture.text.push_str(text);
        }
    }

    /// An end tag inside the article at `depth`.
    fn close(&mut self, depth: usize) {
        while self.captures.last().is_some_and(|c| c.depth == depth) {
            if let Some(capture) = self.captures.pop() {
                self.fill(capture.field, non_empty(capture.text));
            }
        }

        if self.author.as_ref().is_some_and(|a| a.depth == depth) {
            if let Some(author) = self.author.take() {
                let fore = author.fore_name.into_value();
                let last = author.last_name.into_value();
                let name = full_name(fore.as_deref(), last.as_deref());
                self.tally.push(name, author.affiliation.into_value());
            }
        }
    }

    fn fill(&mut self, field: Field, value: Option<String>) {
        match field {
            Field::Title => self.title.fill(value),
            Field::PubmedId => self.pubmed_id.fill(value),
            Field::Email => self.email.fill(value),
            Field::ForeName | Field::LastName | Field::Affiliation => {
                if let Some(author) = self.author.as_mut() {
                    match field {
                        Field::ForeName => author.fore_name.fill(value),
                        Field::LastName => author.last_name.fill(value),
                        _ => author.affiliation.fill(value),
                    }
                }
            }
        }
    }

    fn finish(self) -> PaperRecord {
        let email = self.email.into_value();
        PaperRecord {
            title: self.title.into_value().unwrap_or_else(|| SENTINEL.to_string()),
            pubmed_id: self
                .pubmed_id
                .into_value()
                .unwrap_or_else(|| SENTINEL.to_string()),
            authors: self.tally.authors(),
            company_affiliations: self.tally.company_affiliations(),
            corresponding_author_email: email_or_sentinel(email.as_deref()),
        }
    }
}
