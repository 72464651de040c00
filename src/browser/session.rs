use crate::{browser::{config::LaunchOptions, driver::PageDriver, locator::Locator},
            error::{Result, ScrapeError}};
use headless_chrome::{Browser, Element, Tab,
                      protocol::cdp::{Network, types::Event}};
use serde::Deserialize;
use std::{cell::Cell,
          collections::HashSet,
          ffi::OsStr,
          ops::{Deref, DerefMut},
          sync::{Arc, Mutex, PoisonError},
          thread,
          time::{Duration, Instant}};

/// Interval between page-state samples and visibility checks
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Reports the document state and which page is showing
///
/// `timeOrigin` changes with every new document; the URL also changes on
/// in-page route changes.
const PAGE_STATE_JS: &str = r#"
    (function() {
        return JSON.stringify({
            ready: document.readyState,
            page: performance.timeOrigin + ' ' + window.location.href
        });
    })()
"#;

/// Same notion of visible as a user would have: a non-empty box that is not hidden
const VISIBLE_JS: &str = r#"
    function() {
        const rect = this.getBoundingClientRect();
        return rect.width > 0 && rect.height > 0 && window.getComputedStyle(this).visibility !== 'hidden';
    }
"#;

const GO_BACK_JS: &str = r#"
    (function() {
        window.history.back();
        return true;
    })()
"#;

/// A browser session that can be released explicitly
pub trait Session: PageDriver {
    /// Release every resource held by the session
    ///
    /// Must not panic or fail; problems are logged. Calling it again is a no-op.
    fn close(&mut self);
}

/// Something that can open sessions
pub trait Launcher {
    type Session: Session;

    fn open(&self) -> Result<Self::Session>;
}

impl Launcher for LaunchOptions {
    type Session = BrowserSession;

    fn open(&self) -> Result<BrowserSession> {
        BrowserSession::launch(self.clone())
    }
}

/// Closes the wrapped session when dropped, including during unwinding
pub struct SessionGuard<S: Session> {
    session: S,
}

impl<S: Session> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: Session> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: Session> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: Session> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.session.close();
    }
}

#[derive(Debug, PartialEq, Deserialize)]
struct PageState {
    ready: String,
    page: String,
}

/// Requests the tab has sent and not yet seen finish, fed from CDP network events
#[derive(Debug, Default)]
struct NetworkActivity {
    in_flight: HashSet<String>,
    events: u64,
}

impl NetworkActivity {
    fn started(&mut self, request_id: &str) {
        // A redirect re-announces the same id
        self.in_flight.insert(request_id.to_string());
        self.events += 1;
    }

    fn ended(&mut self, request_id: &str) {
        self.in_flight.remove(request_id);
        self.events += 1;
    }

    fn on_event(&mut self, event: &Event) {
        match event {
            Event::NetworkRequestWillBeSent(ev) => self.started(&ev.params.request_id),
            Event::NetworkLoadingFinished(ev) => self.ended(&ev.params.request_id),
            Event::NetworkLoadingFailed(ev) => self.ended(&ev.params.request_id),
            _ => {}
        }
    }
}

/// One look at the page while waiting for it to go quiet
#[derive(Debug, Clone, PartialEq)]
struct PageSample {
    complete: bool,
    page: String,
    in_flight: usize,
    events: u64,
}

/// Quiet-window bookkeeping behind [`BrowserSession::wait_for_network_idle`]
///
/// The window starts at the first sample showing a complete document, no
/// request in flight and a page other than `departed`, and restarts whenever
/// a later sample differs.
#[derive(Debug)]
struct QuietWindow {
    window: Duration,
    /// Page that was up when the wait was triggered by a click or history move
    departed: Option<String>,
    last: Option<PageSample>,
    quiet_since: Option<Instant>,
}

impl QuietWindow {
    fn new(window: Duration, departed: Option<String>) -> Self {
        Self { window, departed, last: None, quiet_since: None }
    }

    /// Record `sample` (`None` when the page could not be read) taken at `now`
    ///
    /// Returns true once the page has stayed quiet for the whole window.
    fn observe(&mut self, sample: Option<PageSample>, now: Instant) -> bool {
        let Some(sample) = sample else {
            self.last = None;
            self.quiet_since = None;
            return false;
        };

        if self.departed.as_deref().is_some_and(|page| page != sample.page) {
            self.departed = None;
        }

        let unchanged = self.last.as_ref() == Some(&sample);
        let settled = sample.complete && sample.in_flight == 0 && self.departed.is_none();
        self.last = Some(sample);

        if !settled {
            self.quiet_since = None;
            return false;
        }
        if !unchanged {
            self.quiet_since = Some(now);
        }

        let since = *self.quiet_since.get_or_insert(now);
        now.duration_since(since) >= self.window
    }
}

fn is_visible(element: &Element<'_>) -> bool {
    match element.call_js_fn(VISIBLE_JS, Vec::new(), false) {
        Ok(result) => result.value.and_then(|value| value.as_bool()).unwrap_or(false),
        // Detached between lookup and check
        Err(e) => {
            log::debug!("Visibility check failed: {}", e);
            false
        }
    }
}

/// Browser session that manages a Chrome/Chromium instance and the single tab it drives
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance; dropping it kills the process
    browser: Option<Browser>,

    tab: Option<Arc<Tab>>,

    network: Arc<Mutex<NetworkActivity>>,

    /// Page shown before the last click-through or history move, until a wait consumes it
    departed: Cell<Option<String>>,

    network_idle_window: Duration,

    slow_motion: Duration,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    ///
    /// On failure everything acquired so far is released before returning.
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // The default idle timeout of 30 seconds would close the browser in the middle of a slow run
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.sandbox = options.sandbox;

        if let Some(path) = options.chrome_path.clone() {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir.clone() {
            launch_opts.user_data_dir = Some(dir);
        }

        let browser = Browser::new(launch_opts).map_err(|e| ScrapeError::LaunchFailed(e.to_string()))?;

        // An early return from here on drops `browser`, which terminates the process
        let tab = browser
            .new_tab()
            .map_err(|e| ScrapeError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        let network = Arc::new(Mutex::new(NetworkActivity::default()));

        if let Err(e) = Self::configure_tab(&tab, &options, &network) {
            if let Err(close_err) = tab.close(false) {
                log::warn!("Failed to close tab after setup error: {}", close_err);
            }
            return Err(e);
        }

        log::info!(
            "Browser launched ({} mode, {}x{})",
            if options.headless { "headless" } else { "headed" },
            options.window_width,
            options.window_height
        );

        Ok(Self {
            browser: Some(browser),
            tab: Some(tab),
            network,
            departed: Cell::new(None),
            network_idle_window: options.network_idle_window,
            slow_motion: options.slow_motion,
        })
    }

    fn configure_tab(tab: &Arc<Tab>, options: &LaunchOptions, network: &Arc<Mutex<NetworkActivity>>) -> Result<()> {
        tab.set_user_agent(&options.user_agent, None, None)
            .map_err(|e| ScrapeError::TabOperationFailed(format!("Failed to set user agent: {}", e)))?;
        tab.set_default_timeout(options.default_timeout);

        // Every Network.enable parameter is optional and the set differs between protocol revisions
        let enable: Network::Enable = serde_json::from_value(serde_json::json!({}))?;
        tab.call_method(enable)
            .map_err(|e| ScrapeError::TabOperationFailed(format!("Failed to enable network events: {}", e)))?;

        let tracker = Arc::clone(network);
        tab.add_event_listener(Arc::new(move |event: &Event| {
            tracker.lock().unwrap_or_else(PoisonError::into_inner).on_event(event);
        }))
        .map_err(|e| ScrapeError::TabOperationFailed(format!("Failed to watch network events: {}", e)))?;

        Ok(())
    }

    /// The tab this session drives
    pub fn tab(&self) -> Result<&Arc<Tab>> {
        self.tab
            .as_ref()
            .ok_or_else(|| ScrapeError::TabOperationFailed("Session is closed".to_string()))
    }

    /// Whether the session still holds its browser
    pub fn is_open(&self) -> bool {
        self.browser.is_some()
    }

    fn find(&self, locator: &Locator, timeout: Duration) -> Result<Element<'_>> {
        let tab = self.tab()?;
        let found = match locator {
            Locator::Css(selector) => tab.wait_for_element_with_custom_timeout(selector, timeout),
            Locator::XPath(expr) => tab.wait_for_xpath_with_custom_timeout(expr, timeout),
        };
        found.map_err(|e| ScrapeError::ElementNotFound(format!("'{}': {}", locator, e)))
    }

    fn elements(&self, locator: &Locator) -> Result<Vec<Element<'_>>> {
        let tab = self.tab()?;
        let found = match locator {
            Locator::Css(selector) => tab.find_elements(selector),
            Locator::XPath(expr) => tab.find_elements_by_xpath(expr),
        };

        // headless_chrome reports an empty match as an error
        match found {
            Ok(elements) => Ok(elements),
            Err(e) => {
                log::debug!("No elements for '{}': {}", locator, e);
                Ok(Vec::new())
            }
        }
    }

    fn visible_elements(&self, locator: &Locator) -> Result<Vec<Element<'_>>> {
        Ok(self.elements(locator)?.into_iter().filter(|element| is_visible(element)).collect())
    }

    /// Poll until at least one element matching `locator` is visible
    fn wait_visible(&self, locator: &Locator, timeout: Duration) -> Result<Vec<Element<'_>>> {
        let start = Instant::now();
        loop {
            let visible = self.visible_elements(locator)?;
            if !visible.is_empty() {
                return Ok(visible);
            }
            if start.elapsed() >= timeout {
                return Err(ScrapeError::Timeout(format!("'{}' not visible after {:?}", locator, timeout)));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn page_state(&self) -> Result<PageState> {
        let result = self
            .tab()?
            .evaluate(PAGE_STATE_JS, false)
            .map_err(|e| ScrapeError::EvaluationFailed(e.to_string()))?;

        let value = result
            .value
            .ok_or_else(|| ScrapeError::EvaluationFailed("No value returned for page state".to_string()))?;
        let json: String = serde_json::from_value(value)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn sample(&self) -> Result<PageSample> {
        let state = self.page_state()?;
        let network = self.network.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(PageSample {
            complete: state.ready == "complete",
            page: state.page,
            in_flight: network.in_flight.len(),
            events: network.events,
        })
    }

    /// Remember the current page so the next idle wait holds out for a different one
    fn mark_departure(&self) {
        match self.page_state() {
            Ok(state) => self.departed.set(Some(state.page)),
            Err(e) => {
                log::debug!("Could not read page before leaving it: {}", e);
                self.departed.set(None);
            }
        }
    }

    fn slow_down(&self) {
        if !self.slow_motion.is_zero() {
            thread::sleep(self.slow_motion);
        }
    }
}

impl PageDriver for BrowserSession {
    fn navigate(&self, url: &str) -> Result<()> {
        self.slow_down();
        self.departed.set(None);
        let tab = self.tab()?;
        tab.navigate_to(url)
            .map_err(|e| ScrapeError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;
        tab.wait_until_navigated()
            .map_err(|e| ScrapeError::NavigationFailed(format!("Navigation to {} did not complete: {}", url, e)))?;
        Ok(())
    }

    fn wait_for_network_idle(&self, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        let mut quiet = QuietWindow::new(self.network_idle_window, self.departed.take());

        loop {
            let sample = match self.sample() {
                Ok(sample) => Some(sample),
                // The execution context is torn down while a new document loads
                Err(e) => {
                    log::debug!("Page state unavailable: {}", e);
                    None
                }
            };

            if quiet.observe(sample, Instant::now()) {
                return Ok(());
            }
            if start.elapsed() > timeout {
                return Err(ScrapeError::Timeout(format!("network idle after {:?}", timeout)));
            }

            thread::sleep(POLL_INTERVAL);
        }
    }

    fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<()> {
        self.wait_visible(locator, timeout).map(|_| ())
    }

    fn text_of(&self, locator: &Locator, timeout: Duration) -> Result<String> {
        let element = self.find(locator, timeout)?;
        element
            .get_inner_text()
            .map_err(|e| ScrapeError::EvaluationFailed(format!("Failed to read text of '{}': {}", locator, e)))
    }

    fn click(&self, locator: &Locator, timeout: Duration) -> Result<()> {
        let visible = self.wait_visible(locator, timeout)?;
        let element = visible
            .first()
            .ok_or_else(|| ScrapeError::ElementNotFound(format!("'{}'", locator)))?;
        self.slow_down();
        element
            .click()
            .map_err(|e| ScrapeError::EvaluationFailed(format!("Failed to click '{}': {}", locator, e)))?;
        Ok(())
    }

    fn count(&self, locator: &Locator) -> Result<usize> {
        Ok(self.visible_elements(locator)?.len())
    }

    fn click_nth(&self, locator: &Locator, index: usize) -> Result<()> {
        let elements = self.visible_elements(locator)?;
        let element = elements.get(index).ok_or_else(|| {
            ScrapeError::ElementNotFound(format!("No element #{} for '{}' ({} visible)", index, locator, elements.len()))
        })?;
        self.slow_down();
        self.mark_departure();
        element
            .click()
            .map_err(|e| ScrapeError::EvaluationFailed(format!("Failed to click element #{}: {}", index, e)))?;
        Ok(())
    }

    fn go_back(&self) -> Result<()> {
        self.mark_departure();
        self.tab()?
            .evaluate(GO_BACK_JS, false)
            .map_err(|e| ScrapeError::NavigationFailed(format!("Failed to go back: {}", e)))?;
        Ok(())
    }

    fn reload(&self) -> Result<()> {
        self.mark_departure();
        self.tab()?
            .reload(false, None)
            .map_err(|e| ScrapeError::NavigationFailed(format!("Failed to reload: {}", e)))?;
        Ok(())
    }
}

impl Session for BrowserSession {
    fn close(&mut self) {
        // Tab and browser are released independently
        if let Some(tab) = self.tab.take() {
            if let Err(e) = tab.close(false) {
                log::warn!("Failed to close tab: {}", e);
            }
        }

        if let Some(browser) = self.browser.take() {
            drop(browser);
            log::info!("Browser closed");
        }
    }
}
