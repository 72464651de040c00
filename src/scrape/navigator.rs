use crate::{browser::{Launcher, PageDriver, SessionGuard},
            error::{Result, ScrapeError},
            scrape::{config::RunOptions,
                     detail::DetailScraper,
                     profile::SiteProfile,
                     record::{ProjectRecord, ResultSet},
                     sink::RecordSink}};

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every planned entry was attempted
    Completed,
    /// The listing had fewer entry points than planned by the time the loop got there
    StoppedEarly,
    /// The browser could not be started
    SetupFailed(String),
    /// The listing page failed to load or showed no entry points
    ListingUnavailable(String),
}

/// What a run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries whose detail page the navigator tried to open
    pub attempted: usize,
    /// Records appended to the result set
    pub succeeded: usize,
    pub outcome: RunOutcome,
}

impl RunSummary {
    fn new() -> Self {
        Self { attempted: 0, succeeded: 0, outcome: RunOutcome::Completed }
    }

    fn aborted(outcome: RunOutcome) -> Self {
        Self { outcome, ..Self::new() }
    }

    /// Whether the run ended before the item loop started
    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, RunOutcome::SetupFailed(_) | RunOutcome::ListingUnavailable(_))
    }
}

enum Visit {
    Done,
    ListingShrunk,
}

/// Walks the listing page, scraping one detail page per entry point
pub struct ListingNavigator<'a> {
    profile: &'a SiteProfile,
    options: &'a RunOptions,
    scraper: DetailScraper<'a>,
}

impl<'a> ListingNavigator<'a> {
    pub fn new(profile: &'a SiteProfile, options: &'a RunOptions) -> Self {
        Self { profile, options, scraper: DetailScraper::new(profile, options) }
    }

    /// Run a full scrape, persisting to `sink` after every successful item
    ///
    /// The session opened from `launcher` is closed on every exit path,
    /// unwinding included.
    pub fn run<L: Launcher, K: RecordSink>(&self, launcher: &L, sink: &mut K) -> RunSummary {
        log::info!("=== Starting the scraping process ===");

        let session = match launcher.open() {
            Ok(session) => session,
            Err(e) => {
                log::error!("Error setting up browser: {}", e);
                return RunSummary::aborted(RunOutcome::SetupFailed(e.to_string()));
            }
        };
        let page = SessionGuard::new(session);

        let summary = self.drive(&*page, sink);

        log::info!("Cleaning up and closing browser...");
        drop(page);

        summary
    }

    fn drive<D: PageDriver + ?Sized, K: RecordSink>(&self, page: &D, sink: &mut K) -> RunSummary {
        let available = match self.open_listing(page) {
            Ok(count) => count,
            Err(e) => {
                log::error!("No projects found on the page: {}", e);
                return RunSummary::aborted(RunOutcome::ListingUnavailable(e.to_string()));
            }
        };

        let planned = available.min(self.options.target_count);
        log::info!("Found {} projects on the page, will scrape the first {}", available, planned);

        let mut results = ResultSet::new(self.profile.columns());
        let mut summary = RunSummary::new();

        for index in 0..planned {
            log::info!("--- Processing project #{} ---", index + 1);

            match self.visit(page, index, &mut results, sink, &mut summary) {
                Ok(Visit::Done) => {}
                Ok(Visit::ListingShrunk) => {
                    log::warn!("Could not find project button #{}, stopping", index + 1);
                    summary.outcome = RunOutcome::StoppedEarly;
                    break;
                }
                Err(e) => {
                    log::error!("Error processing project #{}: {}", index + 1, e);
                    self.recover(page);
                }
            }
        }

        log::info!(
            "=== Scraping process completed: {} of {} attempted project(s) scraped ===",
            summary.succeeded,
            summary.attempted
        );
        summary
    }

    /// Load the listing and count its entry points
    fn open_listing<D: PageDriver + ?Sized>(&self, page: &D) -> Result<usize> {
        let entry = &self.profile.entry_point;

        log::info!("Opening {}", self.profile.listing_url);
        page.navigate(&self.profile.listing_url)?;
        self.options.listing_settle.settle(page)?;

        log::info!("Waiting for project list to load...");
        page.wait_for(entry, self.options.entry_timeout).map_err(|e| {
            ScrapeError::ListingUnavailable(format!("no entry point within {:?}: {}", self.options.entry_timeout, e))
        })?;

        match page.count(entry)? {
            0 => Err(ScrapeError::ListingUnavailable(format!("no elements match {}", entry))),
            count => Ok(count),
        }
    }

    fn visit<D: PageDriver + ?Sized, K: RecordSink>(
        &self,
        page: &D,
        index: usize,
        results: &mut ResultSet,
        sink: &mut K,
        summary: &mut RunSummary,
    ) -> Result<Visit> {
        let entry = &self.profile.entry_point;
        let number = index + 1;

        // Handles from an earlier enumeration may point at nodes detached by the last navigation
        if index >= page.count(entry)? {
            return Ok(Visit::ListingShrunk);
        }
        summary.attempted += 1;

        log::info!("Opening details for project #{}...", number);
        page.click_nth(entry, index)?;
        self.options.page_settle.settle(page)?;

        match self.scraper.scrape(page) {
            Some(record) => {
                log_record(number, &record);
                results.push(record);
                summary.succeeded += 1;

                sink.persist(results)?;
                log::info!("Saved project #{} ({} record(s) total)", number, results.len());
            }
            None => log::warn!("Skipping project #{}: details could not be scraped", number),
        }

        log::info!("Returning to project list...");
        page.go_back()?;
        self.options.page_settle.settle(page)?;

        Ok(Visit::Done)
    }

    /// One history-back; if that fails, a hard reload. Never fails itself.
    fn recover<D: PageDriver + ?Sized>(&self, page: &D) {
        log::info!("Attempting to recover...");

        let back = page.go_back().and_then(|()| self.options.page_settle.settle(page));
        match back {
            Ok(()) => log::info!("Recovered, back on project list"),
            Err(e) => {
                log::warn!("Recovery failed ({}), reloading page...", e);
                if let Err(e) = page.reload() {
                    log::error!("Reload failed: {}", e);
                }
                page.pause(self.options.page_settle.grace);
            }
        }
    }
}

fn log_record(number: usize, record: &ProjectRecord) {
    log::info!("Scraped project #{}", number);
    for (column, value) in record.columns().zip(record.values()) {
        log::info!("  {}: {}", column, value);
    }
}
