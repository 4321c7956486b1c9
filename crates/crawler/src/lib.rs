// ABOUTME: Main library entry point for the DayBoard substitution-plan crawler.
// ABOUTME: Re-exports the public API: Crawler, CrawlerBuilder, Options, CookieJar, Entry, CrawlError.

//! DayBoard crawler - a session-authenticated scraper for an ASP.NET
//! timetable portal.
//!
//! The crate logs into the portal, maintains a cookie-based session,
//! discovers the per-session data endpoint, and normalizes the raw
//! substitution-plan payload into [`Entry`] records.
//!
//! # Example
//!
//! ```no_run
//! use dayboard_crawler::{Crawler, CrawlError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), CrawlError> {
//!     let mut crawler = Crawler::builder().build();
//!     crawler.login("166162", "password").await?;
//!     for entry in crawler.fetch_timetable().await? {
//!         println!("{} {} {}", entry.date, entry.class, entry.kind);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod cookies;
pub mod entries;
pub mod error;
pub mod hidden;
pub mod login;
pub mod options;
pub mod resolver;
pub mod session;

pub use crate::client::Crawler;
pub use crate::cookies::CookieJar;
pub use crate::entries::{parse_entries, Entry};
pub use crate::error::{CrawlError, ErrorCode};
pub use crate::hidden::{extract_hidden_fields, extract_submit_button};
pub use crate::options::{CrawlerBuilder, Options};
pub use crate::resolver::find_data_endpoint;
pub use crate::session::{SessionClient, SessionResponse};
