// ABOUTME: SessionClient wrapping reqwest with redirects disabled and portal-compatible headers.
// ABOUTME: Attaches the jar's cookie on request and surfaces Set-Cookie and Location for the caller.

use crate::error::CrawlError;
use crate::options::Options;

/// `Accept` header resembling a generic browser; the portal serves a
/// different (and unusable) shell to clients that only accept `*/*`.
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "de-DE,de;q=0.9";

/// One HTTP exchange as seen by the login sequencer and resolver.
///
/// Redirects are never followed automatically, so `status` is the literal
/// wire status (200 or 302 mid-flow) and `location` carries the redirect
/// target when the server issued one.
#[derive(Debug, Clone)]
pub struct SessionResponse {
    pub status: u16,
    pub location: Option<String>,
    pub set_cookie: Vec<String>,
    pub body: String,
}

/// HTTP client for the portal session.
///
/// All requests go out with the configured mobile User-Agent and fixed
/// `Accept`/`Accept-Language` headers. The cookie is passed explicitly per
/// request rather than through a client-level store so the jar stays the
/// single owner of session state.
pub struct SessionClient {
    http: reqwest::Client,
}

impl SessionClient {
    /// Build a session client from the crawler options.
    ///
    /// Uses the injected `http_client` when present; otherwise constructs
    /// one with redirects disabled and the configured timeout.
    pub fn new(opts: &Options) -> Self {
        let http = opts.http_client.clone().unwrap_or_else(|| {
            reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .expect("failed to build HTTP client")
        });
        Self { http }
    }

    /// GET a URL, attaching the cookie when one is supplied.
    ///
    /// `cookie: None` is used for the very first request of the login flow,
    /// before any session cookie exists.
    pub async fn get(
        &self,
        url: &str,
        cookie: Option<&str>,
        referer: Option<&str>,
    ) -> Result<SessionResponse, CrawlError> {
        let mut request = self
            .http
            .get(url)
            .header("Accept", ACCEPT)
            .header("Accept-Language", ACCEPT_LANGUAGE);
        if let Some(cookie) = cookie.filter(|c| !c.is_empty()) {
            request = request.header("Cookie", cookie);
        }
        if let Some(referer) = referer {
            request = request.header("Referer", referer);
        }
        self.execute(url, "Get", request).await
    }

    /// POST a url-encoded form body, attaching cookie, Origin, and Referer.
    pub async fn post_form(
        &self,
        url: &str,
        form_body: String,
        cookie: &str,
        origin: &str,
        referer: &str,
    ) -> Result<SessionResponse, CrawlError> {
        let mut request = self
            .http
            .post(url)
            .header("Accept", ACCEPT)
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Origin", origin)
            .header("Referer", referer)
            .body(form_body);
        if !cookie.is_empty() {
            request = request.header("Cookie", cookie);
        }
        self.execute(url, "Post", request).await
    }

    async fn execute(
        &self,
        url: &str,
        op: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<SessionResponse, CrawlError> {
        let response = request.send().await.map_err(|e| {
            CrawlError::transport(url, op, Some(anyhow::anyhow!("request failed: {}", e)))
        })?;

        let status = response.status().as_u16();
        // 200 and 302 are the only statuses the crawl flow branches on;
        // anything else means the crawl cannot proceed.
        if status != 200 && status != 302 {
            return Err(CrawlError::transport(
                url,
                op,
                Some(anyhow::anyhow!("unexpected status {}", status)),
            ));
        }

        let location = response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let set_cookie = response
            .headers()
            .get_all("set-cookie")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .collect();

        let body = response.text().await.map_err(|e| {
            CrawlError::transport(url, op, Some(anyhow::anyhow!("body read failed: {}", e)))
        })?;

        Ok(SessionResponse {
            status,
            location,
            set_cookie,
            body,
        })
    }
}
