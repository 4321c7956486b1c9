// ABOUTME: CookieJar holding the accumulated session cookie string for one crawl session.
// ABOUTME: Append-only merge of Set-Cookie headers; duplicate names are preserved, not deduplicated.

/// Accumulated session cookie state for a single crawl session.
///
/// The jar holds one semicolon-joined `name=value` string, built up from
/// the `Set-Cookie` headers seen during the login handshake (or injected
/// wholesale via [`CookieJar::set`] when a cookie was obtained out-of-band,
/// e.g. from an embedded browser view).
///
/// `merge` is append-only: a cookie name that appears twice across the
/// handshake yields a redundant pair in the header. Which occurrence a
/// server honors is undefined by cookie-header semantics; this mirrors the
/// upstream flow and is exercised (not fixed) in tests.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    value: String,
}

impl CookieJar {
    /// Create an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held cookie string wholesale.
    pub fn set(&mut self, raw: impl Into<String>) {
        self.value = raw.into();
    }

    /// Merge `Set-Cookie` header values into the jar.
    ///
    /// For each header value, only the leading `name=value` pair (the part
    /// before the first `;`) is kept; attributes like `Path` and `HttpOnly`
    /// are dropped. Empty pairs are skipped.
    pub fn merge<S: AsRef<str>>(&mut self, set_cookie_headers: &[S]) {
        for header in set_cookie_headers {
            let pair = header
                .as_ref()
                .split(';')
                .next()
                .unwrap_or_default()
                .trim();
            if pair.is_empty() {
                continue;
            }
            if !self.value.is_empty() {
                self.value.push_str("; ");
            }
            self.value.push_str(pair);
        }
    }

    /// The current accumulated cookie string, possibly empty.
    pub fn get(&self) -> &str {
        &self.value
    }

    /// Returns true if no cookie has been captured yet.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Reset the jar to the empty state.
    pub fn clear(&mut self) {
        self.value.clear();
    }
}
