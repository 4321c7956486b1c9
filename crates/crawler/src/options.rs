// ABOUTME: Configuration options for the DayBoard crawler including Options and CrawlerBuilder.
// ABOUTME: CrawlerBuilder provides a fluent API for constructing Crawler instances with custom settings.

use std::time::Duration;

use crate::client::Crawler;

/// Default base origin of the timetable portal.
pub const DEFAULT_BASE_URL: &str = "https://www.dsbmobile.de";

/// Generic mobile-browser User-Agent. The portal varies behavior on (and
/// sometimes rejects) default HTTP-library identifiers.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Mobile Safari/537.36";

/// Configuration options for the crawler.
#[derive(Debug, Clone)]
pub struct Options {
    pub base_url: String,
    pub login_path: String,
    pub dashboard_path: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Form field name the login form expects for the username.
    pub username_field: String,
    /// Form field name the login form expects for the password.
    pub password_field: String,
    pub http_client: Option<reqwest::Client>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_path: "/Login.aspx".to_string(),
            dashboard_path: "/Default.aspx?menu=0&item=0".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            username_field: "txtUser".to_string(),
            password_field: "txtPass".to_string(),
            http_client: None,
        }
    }
}

impl Options {
    /// Absolute URL of the login page.
    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_url, self.login_path)
    }

    /// Absolute URL of the authenticated dashboard shell.
    pub fn dashboard_url(&self) -> String {
        format!("{}{}", self.base_url, self.dashboard_path)
    }
}

/// Builder for constructing Crawler instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct CrawlerBuilder {
    opts: Options,
}

impl CrawlerBuilder {
    /// Create a new CrawlerBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base origin URL (no trailing slash).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base = base_url.into();
        while base.ends_with('/') {
            base.pop();
        }
        self.opts.base_url = base;
        self
    }

    /// Set the login page path.
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.opts.login_path = path.into();
        self
    }

    /// Set the dashboard page path.
    pub fn dashboard_path(mut self, path: impl Into<String>) -> Self {
        self.opts.dashboard_path = path.into();
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the login form's username/password field names.
    pub fn credential_fields(
        mut self,
        username_field: impl Into<String>,
        password_field: impl Into<String>,
    ) -> Self {
        self.opts.username_field = username_field.into();
        self.opts.password_field = password_field.into();
        self
    }

    /// Use a custom HTTP client.
    ///
    /// The client must be built with redirects disabled; the login sequencer
    /// inspects 302 responses itself.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Build the Crawler with the configured options.
    pub fn build(self) -> Crawler {
        Crawler::new(self.opts)
    }
}
