use crate::browser::SettleWait;
use std::{path::PathBuf, time::Duration};

pub const DEFAULT_TARGET_COUNT: usize = 6;
pub const DEFAULT_OUTPUT: &str = "rera_projects.csv";

/// Tunables for a scraping run
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// How many detail pages to visit at most
    pub target_count: usize,

    /// Where the CSV goes
    pub output: PathBuf,

    /// Wait after the listing page loads
    pub listing_settle: SettleWait,

    /// Wait after every in-run navigation (open detail, back, recovery)
    pub page_settle: SettleWait,

    /// How long to wait for the first entry point on the listing
    pub entry_timeout: Duration,

    /// Per-candidate timeout for field lookups
    pub field_timeout: Duration,

    /// Per-candidate timeout for the secondary tab control
    pub tab_timeout: Duration,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_count(mut self, count: usize) -> Self {
        self.target_count = count;
        self
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    pub fn field_timeout(mut self, timeout: Duration) -> Self {
        self.field_timeout = timeout;
        self
    }

    pub fn tab_timeout(mut self, timeout: Duration) -> Self {
        self.tab_timeout = timeout;
        self
    }

    pub fn entry_timeout(mut self, timeout: Duration) -> Self {
        self.entry_timeout = timeout;
        self
    }

    /// Grace period applied after every page settle, listing included
    pub fn grace(mut self, grace: Duration) -> Self {
        self.listing_settle.grace = grace;
        self.page_settle.grace = grace;
        self
    }

    /// Upper bound for every network-idle wait
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.listing_settle.idle_timeout = timeout;
        self.page_settle.idle_timeout = timeout;
        self
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            output: PathBuf::from(DEFAULT_OUTPUT),
            listing_settle: SettleWait::new(Duration::from_secs(30), Duration::from_secs(3)),
            page_settle: SettleWait::new(Duration::from_secs(30), Duration::from_secs(2)),
            entry_timeout: Duration::from_secs(10),
            field_timeout: Duration::from_secs(5),
            tab_timeout: Duration::from_secs(30),
        }
    }
}
