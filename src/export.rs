//! CSV export and console rendering of paper records.

use crate::error::Result;
use crate::record::{PaperRecord, RECORD_COLUMNS};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Default output file used by the CLI
pub const DEFAULT_OUTPUT: &str = "pubmed_papers.csv";

/// Write records to `path` with a header row.
///
/// Returns the number of rows written. Nothing is written for an empty slice.
pub fn save_csv(path: &Path, records: &[PaperRecord]) -> Result<usize> {
    if records.is_empty() {
        return Ok(0);
    }

    // header comes from RECORD_COLUMNS; rows are serialized without one
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    wtr.write_record(RECORD_COLUMNS)?;
    for record in records {
        wtr.serialize(record)?;
    }

    wtr.flush()?;
    info!(path = %path.display(), rows = records.len(), "Saved CSV");
    Ok(records.len())
}

/// Read a file produced by [`save_csv`] back into records.
pub fn load_csv(path: &Path) -> Result<Vec<PaperRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let mut records = Vec::new();
    for row in rdr.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Print one record as an indented block.
pub fn render_record<W: Write>(out: &mut W, record: &PaperRecord) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Title: {}", record.title)?;
    writeln!(out, "   PubMed ID: {}", record.pubmed_id)?;
    writeln!(out, "   Authors: {}", record.authors)?;
    writeln!(out, "   Company Affiliations: {}", record.company_affiliations)?;
    writeln!(
        out,
        "   Corresponding Author Email: {}",
        record.corresponding_author_email
    )
}
