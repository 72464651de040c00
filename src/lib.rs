//! # rera-scraper
//!
//! Scrapes real-estate project registrations from a RERA portal by driving Chrome via the
//! Chrome DevTools Protocol (CDP).
//!
//! ## Features
//!
//! - **Browser Session Management**: Launch Chrome with a realistic user agent; the session is
//!   released on every exit path
//! - **Resilient Extraction**: Each field has an ordered list of CSS/XPath locators, the first
//!   one yielding text wins, and a miss becomes `"N/A"` instead of an error
//! - **Navigation Recovery**: A failed detail-page visit falls back to history-back, then reload,
//!   and the run carries on
//! - **Crash-safe Output**: The CSV is rewritten after every scraped project
//!
//! ## CLI
//!
//! ```bash
//! # Scrape the first 6 projects into rera_projects.csv
//! cargo run --bin rera-scraper
//!
//! # Watch the browser while scraping 10 projects
//! cargo run --bin rera-scraper -- --headed --count 10
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use rera_scraper::{CsvSink, LaunchOptions, ListingNavigator, RunOptions, SiteProfile};
//!
//! let profile = SiteProfile::odisha_rera();
//! let options = RunOptions::new().target_count(3);
//! let mut sink = CsvSink::new(&options.output);
//!
//! let summary = ListingNavigator::new(&profile, &options).run(&LaunchOptions::default(), &mut sink);
//! println!("{} of {} projects scraped", summary.succeeded, summary.attempted);
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Browser session, launch options, locators and the [`PageDriver`] boundary
//! - [`scrape`]: Site profiles, field extraction, detail scraping, the listing loop, output
//! - [`error`]: Error types and result aliases

pub mod browser;
pub mod error;
pub mod scrape;

#[cfg(test)]
pub(crate) mod testing;

pub use browser::{BrowserSession, LaunchOptions, Launcher, Locator, PageDriver, Session, SessionGuard, SettleWait};
pub use error::{Result, ScrapeError};
pub use scrape::{CsvSink, DetailScraper, FieldSpec, ListingNavigator, ProjectRecord, RecordSink, ResultSet, RunOptions,
                 RunOutcome, RunSummary, SENTINEL, SiteProfile};
