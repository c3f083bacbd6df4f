//! # pubmed-industry
//!
//! Searches PubMed, pulls the matching records, flags authors with industry
//! affiliations and exports the result as CSV.
//!
//! ## Modules
//!
//! - [`eutils`] - esearch/efetch client
//! - [`parser`] - EFetch XML extraction
//! - [`record`] - Paper record and the company-affiliation heuristic
//! - [`export`] - CSV export and console rendering
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pubmed_industry::{fetch_details, search};
//!
//! #[tokio::main]
//! async fn main() {
//!     let ids = search("cancer immunotherapy", 10).await;
//!     let papers = fetch_details(&ids).await;
//!     println!("Found {} papers", papers.len());
//! }
//! ```

pub mod error;
pub mod eutils;
pub mod export;
pub mod parser;
pub mod record;

pub use error::{FetcherError, Result};
pub use eutils::{fetch_details, search, ClientConfig, PubMedClient};
pub use export::{load_csv, render_record, save_csv};
pub use record::PaperRecord;
