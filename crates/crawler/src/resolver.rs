// ABOUTME: Data-endpoint resolver that locates the per-session data handler URL in the dashboard shell.
// ABOUTME: A missing match is surfaced as EndpointNotFound, the stale-session signal.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::cookies::CookieJar;
use crate::error::CrawlError;
use crate::options::Options;
use crate::session::SessionClient;

/// The platform's data-handler naming convention: a randomized per-session
/// token between a fixed prefix and suffix. Quoting around the path varies
/// across shell versions, so only the path itself is matched.
static DATA_ENDPOINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/data/[A-Za-z0-9]+/plan\.json").unwrap());

/// Scan dashboard HTML for the data-handler path.
///
/// Returns the first match in source order, or `None`. Pure function so the
/// pattern matching stays testable without a session.
pub fn find_data_endpoint(dashboard_html: &str) -> Option<&str> {
    DATA_ENDPOINT_RE
        .find(dashboard_html)
        .map(|m| m.as_str())
}

/// Fetch the authenticated dashboard and resolve the absolute data-endpoint URL.
///
/// The endpoint path is randomized per session, so it must be rediscovered
/// on every crawl. When the pattern is absent the session is almost always
/// stale (the portal serves the login shell instead of the dashboard);
/// callers may re-run the login sequence once before giving up.
pub async fn resolve_data_endpoint(
    session: &SessionClient,
    jar: &CookieJar,
    opts: &Options,
) -> Result<String, CrawlError> {
    let dashboard_url = opts.dashboard_url();
    let res = session
        .get(&dashboard_url, Some(jar.get()), Some(&dashboard_url))
        .await?;

    let Some(path) = find_data_endpoint(&res.body) else {
        return Err(CrawlError::endpoint_not_found(
            &dashboard_url,
            "Resolve",
            Some(anyhow::anyhow!(
                "no data-handler path in dashboard HTML (session expired?)"
            )),
        ));
    };

    let base = Url::parse(&opts.base_url).map_err(|e| {
        CrawlError::invalid_url(
            &opts.base_url,
            "Resolve",
            Some(anyhow::anyhow!("bad base URL: {}", e)),
        )
    })?;
    let endpoint = base.join(path).map_err(|e| {
        CrawlError::invalid_url(
            path,
            "Resolve",
            Some(anyhow::anyhow!("bad endpoint path: {}", e)),
        )
    })?;
    Ok(endpoint.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn finds_endpoint_path_in_markup() {
        let html = r#"<script src="/static/app.js"></script>
            <a href="/data/a8Xk29qL/plan.json">plan</a>"#;
        assert_eq!(find_data_endpoint(html), Some("/data/a8Xk29qL/plan.json"));
    }

    #[test]
    fn first_match_wins_in_source_order() {
        let html = "/data/first01/plan.json and /data/second2/plan.json";
        assert_eq!(find_data_endpoint(html), Some("/data/first01/plan.json"));
    }

    #[test]
    fn no_match_on_login_shell() {
        let html = "<html><form action='/Login.aspx'></form></html>";
        assert_eq!(find_data_endpoint(html), None);
    }

    #[tokio::test]
    async fn resolves_absolute_url_against_base() {
        let server = MockServer::start();
        let dash = server.mock(|when, then| {
            when.method(GET)
                .path("/Default.aspx")
                .query_param("menu", "0")
                .header("Cookie", "sid=ok");
            then.status(200)
                .body("<html>var url = \"/data/abc123/plan.json\";</html>");
        });

        let opts = Options {
            base_url: server.base_url(),
            ..Options::default()
        };
        let session = SessionClient::new(&opts);
        let mut jar = CookieJar::new();
        jar.set("sid=ok");

        let url = resolve_data_endpoint(&session, &jar, &opts)
            .await
            .expect("resolve should succeed");
        dash.assert();
        assert_eq!(url, format!("{}/data/abc123/plan.json", server.base_url()));
    }

    #[tokio::test]
    async fn missing_pattern_is_endpoint_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/Default.aspx");
            then.status(200).body("<html>please log in</html>");
        });

        let opts = Options {
            base_url: server.base_url(),
            ..Options::default()
        };
        let session = SessionClient::new(&opts);
        let jar = CookieJar::new();

        let err = resolve_data_endpoint(&session, &jar, &opts)
            .await
            .expect_err("login shell has no endpoint");
        assert!(err.is_endpoint_not_found());
    }
}
