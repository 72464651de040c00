//! First-match-wins extraction over ordered locator candidates

use crate::{browser::{Locator, PageDriver},
            error::Result,
            scrape::{profile::FieldSpec, record::SENTINEL}};
use std::time::Duration;

/// Outcome of a single locator attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The locator produced a usable value
    Hit(T),
    /// Nothing usable there: no match, a timeout, or empty text
    Miss,
    /// The driver failed for some other reason
    Fault(String),
}

impl<T> Lookup<T> {
    /// Classify a driver result: absence and timeouts are misses, anything else is a fault
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Lookup::Hit(value),
            Err(e) if e.is_miss() => Lookup::Miss,
            Err(e) => Lookup::Fault(e.to_string()),
        }
    }
}

/// Try `attempt` on each candidate in order and return the first hit
///
/// Candidates after the first hit are never attempted.
pub fn first_hit<T, F>(candidates: &[Locator], mut attempt: F) -> Option<T>
where
    F: FnMut(&Locator) -> Lookup<T>,
{
    for locator in candidates {
        match attempt(locator) {
            Lookup::Hit(value) => return Some(value),
            Lookup::Miss => log::debug!("No match for {}", locator),
            Lookup::Fault(reason) => log::debug!("Locator {} failed: {}", locator, reason),
        }
    }
    None
}

/// Trimmed text behind `locator`; blank text counts as a miss
pub fn lookup_text<D: PageDriver + ?Sized>(page: &D, locator: &Locator, timeout: Duration) -> Lookup<String> {
    match Lookup::from_result(page.text_of(locator, timeout)) {
        Lookup::Hit(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() { Lookup::Miss } else { Lookup::Hit(trimmed.to_string()) }
        }
        Lookup::Miss => Lookup::Miss,
        Lookup::Fault(reason) => Lookup::Fault(reason),
    }
}

/// Value of `field`, or [`SENTINEL`] when no candidate yields text
pub fn extract_field<D: PageDriver + ?Sized>(page: &D, field: &FieldSpec, timeout: Duration) -> String {
    match first_hit(&field.locators, |locator| lookup_text(page, locator, timeout)) {
        Some(value) => value,
        None => {
            log::debug!("'{}' not found with {} locator(s)", field.name, field.locators.len());
            SENTINEL.to_string()
        }
    }
}
