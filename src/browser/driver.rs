use crate::{browser::locator::Locator, error::Result};
use std::time::Duration;

/// The browser operations the scraper relies on
///
/// Implemented by [`BrowserSession`](crate::browser::BrowserSession) for a real
/// Chrome tab. Every wait is bounded by the timeout passed in; no element
/// handle outlives a single call, so implementations never hand out references
/// that could go stale across navigations.
pub trait PageDriver {
    /// Load `url` and wait for the navigation to commit
    fn navigate(&self, url: &str) -> Result<()>;

    /// Block until the page has had no network activity for a short quiet window
    ///
    /// After [`click_nth`](Self::click_nth), [`go_back`](Self::go_back) or
    /// [`reload`](Self::reload) the window only starts once a different page
    /// is showing.
    fn wait_for_network_idle(&self, timeout: Duration) -> Result<()>;

    /// Block until an element matching `locator` is visible
    fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<()>;

    /// Visible text of the first element matching `locator`, untrimmed
    fn text_of(&self, locator: &Locator, timeout: Duration) -> Result<String>;

    /// Wait for the first visible element matching `locator` and click it
    fn click(&self, locator: &Locator, timeout: Duration) -> Result<()>;

    /// Number of visible elements currently matching `locator`
    fn count(&self, locator: &Locator) -> Result<usize>;

    /// Click the `index`-th visible element currently matching `locator`
    fn click_nth(&self, locator: &Locator, index: usize) -> Result<()>;

    /// Browser-history back
    fn go_back(&self) -> Result<()>;

    /// Hard reload of the current page
    fn reload(&self) -> Result<()>;

    /// Fixed delay
    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Two-phase readiness wait: network idle, then a fixed grace period
///
/// Network idle can fire before script-rendered content is painted; the grace
/// period covers that gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleWait {
    /// Upper bound on the network-idle phase
    pub idle_timeout: Duration,

    /// Fixed delay after the page went idle
    pub grace: Duration,
}

impl SettleWait {
    pub fn new(idle_timeout: Duration, grace: Duration) -> Self {
        Self { idle_timeout, grace }
    }

    /// Run both phases against `page`
    pub fn settle<D: PageDriver + ?Sized>(&self, page: &D) -> Result<()> {
        page.wait_for_network_idle(self.idle_timeout)?;
        page.pause(self.grace);
        Ok(())
    }
}

impl Default for SettleWait {
    fn default() -> Self {
        Self { idle_timeout: Duration::from_secs(30), grace: Duration::from_secs(2) }
    }
}
