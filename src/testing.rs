//! Scripted stand-ins for the browser and the output file

use crate::{browser::{Launcher, Locator, PageDriver, Session},
            error::{Result, ScrapeError},
            scrape::{record::ResultSet, sink::RecordSink}};
use std::{cell::{Cell, RefCell},
          collections::{HashMap, HashSet},
          rc::Rc,
          time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Blank,
    Listing,
    Detail(usize),
}

/// Content of one fake detail page, keyed by locator
#[derive(Debug, Clone, Default)]
pub struct FakeDetail {
    primary: HashMap<Locator, String>,
    tab: Option<Locator>,
    secondary: HashMap<Locator, String>,
    faults: HashSet<Locator>,
}

impl FakeDetail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, locator: &Locator, text: &str) -> Self {
        self.primary.insert(locator.clone(), text.to_string());
        self
    }

    /// Locator that activates the secondary tab
    pub fn tab(mut self, locator: &Locator) -> Self {
        self.tab = Some(locator.clone());
        self
    }

    /// Text only visible once the tab is active
    pub fn secondary_text(mut self, locator: &Locator, text: &str) -> Self {
        self.secondary.insert(locator.clone(), text.to_string());
        self
    }

    /// Reading this locator fails with a non-miss error
    pub fn fault(mut self, locator: &Locator) -> Self {
        self.faults.insert(locator.clone());
        self
    }
}

/// A single-tab browser whose pages are scripted up front
#[derive(Default)]
pub struct FakePage {
    details: Vec<FakeDetail>,
    location: Cell<Option<Location>>,
    tab_active: Cell<bool>,
    fail_navigation: Cell<bool>,
    /// (entry, n): the n-th idle wait (1-based) during a visit to `entry` times out
    idle_faults: RefCell<HashSet<(usize, usize)>>,
    visit_idle_waits: Cell<usize>,
    /// Remaining history-back failures while on a given detail page
    back_faults: RefCell<HashMap<usize, usize>>,
    fail_reload: Cell<bool>,
    panic_on_click: Cell<Option<usize>>,
    text_calls: RefCell<Vec<Locator>>,
    clicks: RefCell<Vec<usize>>,
    backs: Cell<usize>,
    reloads: Cell<usize>,
    pauses: RefCell<Vec<Duration>>,
    closes: Cell<usize>,
}

impl FakePage {
    /// A listing whose i-th entry point opens `details[i]`
    pub fn listing(details: Vec<FakeDetail>) -> Rc<Self> {
        Rc::new(Self { details, ..Self::default() })
    }

    /// Already sitting on a single detail page
    pub fn showing(detail: FakeDetail) -> Rc<Self> {
        let page = Self { details: vec![detail], ..Self::default() };
        page.location.set(Some(Location::Detail(0)));
        Rc::new(page)
    }

    pub fn fail_navigation(&self) {
        self.fail_navigation.set(true);
    }

    pub fn fail_idle_wait(&self, entry: usize, nth: usize) {
        self.idle_faults.borrow_mut().insert((entry, nth));
    }

    pub fn fail_back(&self, entry: usize, times: usize) {
        self.back_faults.borrow_mut().insert(entry, times);
    }

    pub fn fail_reload(&self) {
        self.fail_reload.set(true);
    }

    pub fn panic_on_click(&self, entry: usize) {
        self.panic_on_click.set(Some(entry));
    }

    pub fn location(&self) -> Location {
        self.location.get().unwrap_or(Location::Blank)
    }

    pub fn text_calls(&self) -> Vec<Locator> {
        self.text_calls.borrow().clone()
    }

    pub fn clicks(&self) -> Vec<usize> {
        self.clicks.borrow().clone()
    }

    pub fn backs(&self) -> usize {
        self.backs.get()
    }

    pub fn reloads(&self) -> usize {
        self.reloads.get()
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.borrow().clone()
    }

    pub fn closes(&self) -> usize {
        self.closes.get()
    }

    fn current_detail(&self) -> Option<(usize, &FakeDetail)> {
        match self.location() {
            Location::Detail(i) => self.details.get(i).map(|detail| (i, detail)),
            _ => None,
        }
    }

    fn on_listing(&self) -> bool {
        self.location() == Location::Listing
    }
}

impl PageDriver for Rc<FakePage> {
    fn navigate(&self, url: &str) -> Result<()> {
        if self.fail_navigation.get() {
            return Err(ScrapeError::NavigationFailed(format!("{} unreachable", url)));
        }
        self.location.set(Some(Location::Listing));
        Ok(())
    }

    fn wait_for_network_idle(&self, timeout: Duration) -> Result<()> {
        if let Some((entry, _)) = self.current_detail() {
            let n = self.visit_idle_waits.get() + 1;
            self.visit_idle_waits.set(n);
            if self.idle_faults.borrow().contains(&(entry, n)) {
                return Err(ScrapeError::Timeout(format!("network idle after {:?}", timeout)));
            }
        }
        Ok(())
    }

    fn wait_for(&self, locator: &Locator, _timeout: Duration) -> Result<()> {
        if self.count(locator)? > 0 {
            Ok(())
        } else {
            Err(ScrapeError::ElementNotFound(locator.to_string()))
        }
    }

    fn text_of(&self, locator: &Locator, _timeout: Duration) -> Result<String> {
        self.text_calls.borrow_mut().push(locator.clone());

        let (_, detail) = self
            .current_detail()
            .ok_or_else(|| ScrapeError::ElementNotFound(locator.to_string()))?;

        if detail.faults.contains(locator) {
            return Err(ScrapeError::EvaluationFailed(format!("stale node for {}", locator)));
        }

        let secondary = if self.tab_active.get() { detail.secondary.get(locator) } else { None };
        detail
            .primary
            .get(locator)
            .or(secondary)
            .cloned()
            .ok_or_else(|| ScrapeError::ElementNotFound(locator.to_string()))
    }

    fn click(&self, locator: &Locator, _timeout: Duration) -> Result<()> {
        match self.current_detail() {
            Some((_, detail)) if detail.tab.as_ref() == Some(locator) => {
                self.tab_active.set(true);
                Ok(())
            }
            _ => Err(ScrapeError::ElementNotFound(locator.to_string())),
        }
    }

    fn count(&self, _locator: &Locator) -> Result<usize> {
        Ok(if self.on_listing() { self.details.len() } else { 0 })
    }

    fn click_nth(&self, locator: &Locator, index: usize) -> Result<()> {
        if !self.on_listing() || index >= self.details.len() {
            return Err(ScrapeError::ElementNotFound(format!("#{} of {}", index, locator)));
        }
        if self.panic_on_click.get() == Some(index) {
            panic!("renderer crashed opening entry {}", index);
        }
        self.clicks.borrow_mut().push(index);
        self.location.set(Some(Location::Detail(index)));
        self.tab_active.set(false);
        self.visit_idle_waits.set(0);
        Ok(())
    }

    fn go_back(&self) -> Result<()> {
        self.backs.set(self.backs.get() + 1);

        if let Some((entry, _)) = self.current_detail() {
            let mut faults = self.back_faults.borrow_mut();
            if let Some(remaining) = faults.get_mut(&entry) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(ScrapeError::NavigationFailed("history entry gone".to_string()));
                }
            }
            drop(faults);
            self.location.set(Some(Location::Listing));
        }
        Ok(())
    }

    fn reload(&self) -> Result<()> {
        self.reloads.set(self.reloads.get() + 1);
        if self.fail_reload.get() {
            return Err(ScrapeError::NavigationFailed("reload refused".to_string()));
        }
        self.tab_active.set(false);
        Ok(())
    }

    fn pause(&self, duration: Duration) {
        self.pauses.borrow_mut().push(duration);
    }
}

impl Session for Rc<FakePage> {
    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
    }
}

/// Hands out the same fake page for every open
pub struct FakeLauncher {
    pub page: Rc<FakePage>,
    pub fail: bool,
}

impl FakeLauncher {
    pub fn new(page: Rc<FakePage>) -> Self {
        Self { page, fail: false }
    }

    pub fn failing(page: Rc<FakePage>) -> Self {
        Self { page, fail: true }
    }
}

impl Launcher for FakeLauncher {
    type Session = Rc<FakePage>;

    fn open(&self) -> Result<Rc<FakePage>> {
        if self.fail {
            return Err(ScrapeError::LaunchFailed("no chrome binary".to_string()));
        }
        Ok(Rc::clone(&self.page))
    }
}

/// Keeps a copy of every persisted result set
#[derive(Default)]
pub struct MemorySink {
    pub writes: Vec<ResultSet>,
    /// 1-based write number that fails
    pub fail_on: Option<usize>,
}

impl MemorySink {
    pub fn last(&self) -> Option<&ResultSet> {
        self.writes.last()
    }
}

impl RecordSink for MemorySink {
    fn persist(&mut self, results: &ResultSet) -> Result<()> {
        if self.fail_on == Some(self.writes.len() + 1) {
            self.fail_on = None;
            return Err(ScrapeError::Io(std::io::Error::other("disk full")));
        }
        self.writes.push(results.clone());
        Ok(())
    }
}
