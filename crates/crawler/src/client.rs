// ABOUTME: The Crawler facade owning the session client, cookie jar, and stored credentials.
// ABOUTME: Exposes login(), set_cookie(), fetch_timetable(), and the legacy remote JSON path.

use crate::cookies::CookieJar;
use crate::entries::{parse_entries, Entry};
use crate::error::CrawlError;
use crate::login::run_login;
use crate::options::{CrawlerBuilder, Options};
use crate::resolver::resolve_data_endpoint;
use crate::session::SessionClient;

/// Username/password pair supplied by the caller. Held in memory for the
/// lifetime of the crawler only; persistence is the caller's concern.
#[derive(Debug, Clone)]
struct Credential {
    username: String,
    password: String,
}

/// Session-authenticated crawler for the timetable portal.
///
/// One crawler instance owns one session (cookie jar). A crawl is strictly
/// sequential: login, resolve the data endpoint, fetch, parse. Concurrent
/// crawls must use separate instances; sharing one would race on the jar.
pub struct Crawler {
    opts: Options,
    session: SessionClient,
    jar: CookieJar,
    credential: Option<Credential>,
}

impl Crawler {
    /// Create a new CrawlerBuilder for configuring the crawler.
    pub fn builder() -> CrawlerBuilder {
        CrawlerBuilder::new()
    }

    /// Create a new Crawler with the given options.
    pub fn new(opts: Options) -> Self {
        let session = SessionClient::new(&opts);
        Self {
            opts,
            session,
            jar: CookieJar::new(),
            credential: None,
        }
    }

    /// The active configuration.
    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// The accumulated session cookie, possibly empty.
    pub fn cookie(&self) -> &str {
        self.jar.get()
    }

    /// Inject a session cookie obtained out-of-band (e.g. from an embedded
    /// browser view). Replaces any existing session state wholesale and is
    /// equally valid input to the jar as the programmatic login flow.
    pub fn set_cookie(&mut self, raw: impl Into<String>) {
        self.jar.set(raw);
    }

    /// Run the login handshake, establishing an authenticated session.
    ///
    /// Always starts from a fresh jar: a cancelled or failed prior attempt
    /// cannot be resumed from partial cookie state. A rejected login also
    /// invalidates the session: the partial handshake cookies are discarded
    /// rather than left for a later fetch to send. On success the
    /// credentials are retained so [`Crawler::fetch_timetable`] can re-login
    /// once when the session goes stale.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), CrawlError> {
        self.jar.clear();
        self.credential = None;
        if let Err(err) =
            run_login(&self.session, &mut self.jar, &self.opts, username, password).await
        {
            self.jar.clear();
            return Err(err);
        }
        self.credential = Some(Credential {
            username: username.to_string(),
            password: password.to_string(),
        });
        Ok(())
    }

    /// Resolve the data endpoint, fetch it, and parse the plan entries.
    ///
    /// Each successful call produces a complete new list; there is no
    /// incremental merge. An empty vec can mean a legitimately empty plan.
    ///
    /// When the resolver reports the endpoint missing (the stale-session
    /// signal) and credentials are on hand from a prior [`Crawler::login`],
    /// the login is re-run exactly once and the resolve retried; a second
    /// miss propagates rather than looping against a broken target.
    pub async fn fetch_timetable(&mut self) -> Result<Vec<Entry>, CrawlError> {
        let endpoint = match resolve_data_endpoint(&self.session, &self.jar, &self.opts).await {
            Ok(endpoint) => endpoint,
            Err(err) if err.is_endpoint_not_found() => {
                let Some(cred) = self.credential.clone() else {
                    return Err(err);
                };
                self.jar.clear();
                run_login(
                    &self.session,
                    &mut self.jar,
                    &self.opts,
                    &cred.username,
                    &cred.password,
                )
                .await?;
                resolve_data_endpoint(&self.session, &self.jar, &self.opts).await?
            }
            Err(err) => return Err(err),
        };

        let res = self
            .session
            .get(&endpoint, Some(self.jar.get()), Some(&self.opts.dashboard_url()))
            .await?;
        Ok(parse_entries(&res.body))
    }

    /// Fetch plan entries from the unauthenticated remote API.
    ///
    /// Legacy alternative to the crawl flow: a single JSON GET against a
    /// mirror service, no session involved. Goes through the same parse
    /// path as the data endpoint.
    pub async fn fetch_remote_entries(&self, url: &str) -> Result<Vec<Entry>, CrawlError> {
        let res = self.session.get(url, None, None).await?;
        Ok(parse_entries(&res.body))
    }
}
