//! Scraping logic: site profiles, field extraction, detail pages and the listing loop
//!
//! - [`SiteProfile`]: which locators hold which fields on the target site
//! - [`extract_field`]: first-match-wins lookup over a field's locator candidates
//! - [`DetailScraper`]: one detail page to one [`ProjectRecord`]
//! - [`ListingNavigator`]: drives the whole run and persists after every success

pub mod config;
pub mod detail;
pub mod extract;
pub mod navigator;
pub mod profile;
pub mod record;
pub mod sink;

pub use config::RunOptions;
pub use detail::DetailScraper;
pub use extract::{Lookup, extract_field, first_hit};
pub use navigator::{ListingNavigator, RunOutcome, RunSummary};
pub use profile::{FieldSpec, SiteProfile};
pub use record::{ProjectRecord, ResultSet, SENTINEL};
pub use sink::{CsvSink, RecordSink};
