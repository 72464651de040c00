//! Browser session management and the page-driver boundary
//!
//! - [`BrowserSession`]: a Chrome instance plus the one tab the scraper drives
//! - [`PageDriver`]: the operations the scraping logic needs from a page
//! - [`Locator`]: CSS or XPath element locators
//! - [`SessionGuard`]: closes a session on every exit path

pub mod config;
pub mod driver;
pub mod locator;
pub mod session;

pub use config::LaunchOptions;
pub use driver::{PageDriver, SettleWait};
pub use locator::Locator;
pub use session::{BrowserSession, Launcher, Session, SessionGuard};
