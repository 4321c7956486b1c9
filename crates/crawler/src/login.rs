// ABOUTME: Login sequencer driving the multi-step ASP.NET authentication handshake.
// ABOUTME: GET login form, forward hidden fields, POST credentials, follow the success redirect once.

use url::Url;

use crate::cookies::CookieJar;
use crate::error::CrawlError;
use crate::hidden::{extract_hidden_fields, extract_submit_button};
use crate::options::Options;
use crate::session::SessionClient;

/// Fallback submit-button pair when the login form carries no named submit
/// input. Matches the portal's markup at the time of writing; the live
/// form's button is always preferred.
const FALLBACK_SUBMIT: (&str, &str) = ("ctl03", "Anmelden");

/// Resolve a redirect `Location` (possibly relative) against the base origin.
fn resolve_location(base_url: &str, location: &str, op: &str) -> Result<String, CrawlError> {
    let base = Url::parse(base_url).map_err(|e| {
        CrawlError::invalid_url(base_url, op, Some(anyhow::anyhow!("bad base URL: {}", e)))
    })?;
    let resolved = base.join(location).map_err(|e| {
        CrawlError::invalid_url(location, op, Some(anyhow::anyhow!("bad Location: {}", e)))
    })?;
    Ok(resolved.to_string())
}

/// Run the full login handshake, mutating `jar` as cookies arrive.
///
/// Steps, strictly sequential:
/// 1. GET the login page with no cookie, redirects disabled.
/// 2. Merge any `Set-Cookie` into the jar regardless of status.
/// 3. If the GET came back 302, follow exactly one hop with the jar's
///    cookie attached to obtain the form HTML.
/// 4. Scan the form HTML for hidden fields and the submit button.
/// 5. Build a url-encoded body forwarding every hidden field verbatim, with
///    the username/password fields set explicitly and the submit pair
///    appended last.
/// 6. POST it with cookie, Origin, and Referer, redirects disabled.
/// 7. 302 means success: merge new cookies and GET the redirect target once
///    to establish the session (body discarded). Anything else is
///    `AuthFailed`, with the response body captured for diagnostics.
///
/// No retry happens here; retry policy belongs to the caller.
pub async fn run_login(
    session: &SessionClient,
    jar: &mut CookieJar,
    opts: &Options,
    username: &str,
    password: &str,
) -> Result<(), CrawlError> {
    let login_url = opts.login_url();

    // Step 1: first contact, no cookie yet.
    let get_res = session.get(&login_url, None, None).await?;
    jar.merge(&get_res.set_cookie);

    // Step 3: some deployments 302 straight away; one hop converges on the
    // form HTML either way.
    let form_html = if get_res.status == 302 {
        let location = get_res.location.as_deref().ok_or_else(|| {
            CrawlError::transport(
                &login_url,
                "Login",
                Some(anyhow::anyhow!("302 without Location header")),
            )
        })?;
        let follow_url = resolve_location(&opts.base_url, location, "Login")?;
        let follow = session.get(&follow_url, Some(jar.get()), None).await?;
        jar.merge(&follow.set_cookie);
        follow.body
    } else {
        get_res.body
    };

    // Steps 4-5: forward whatever anti-forgery state the form carries. The
    // field set varies by deployment, so nothing here is hardcoded; the
    // credential fields are always set explicitly, overriding any hidden
    // field of the same name.
    let mut hidden = extract_hidden_fields(&form_html);
    hidden.remove(&opts.username_field);
    hidden.remove(&opts.password_field);
    let (submit_name, submit_value) = extract_submit_button(&form_html)
        .unwrap_or_else(|| (FALLBACK_SUBMIT.0.to_string(), FALLBACK_SUBMIT.1.to_string()));

    let mut form = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in &hidden {
        form.append_pair(name, value);
    }
    form.append_pair(&opts.username_field, username);
    form.append_pair(&opts.password_field, password);
    form.append_pair(&submit_name, &submit_value);
    let form_body = form.finish();

    // Step 6: submit credentials.
    let post_res = session
        .post_form(
            &login_url,
            form_body,
            jar.get(),
            &opts.base_url,
            &login_url,
        )
        .await?;

    // Step 8: anything but a 302 is a rejected login. The body is usually
    // an HTML error page; capture a snippet for diagnostics, don't parse it.
    if post_res.status != 302 {
        let snippet: String = post_res.body.chars().take(512).collect();
        return Err(CrawlError::auth_failed(
            &login_url,
            "Login",
            Some(anyhow::anyhow!(
                "expected 302 redirect, got {}: {}",
                post_res.status,
                snippet
            )),
        ));
    }

    // Step 7: capture post-login cookies and follow the redirect once to
    // fully establish the session. Only the side effect matters.
    jar.merge(&post_res.set_cookie);
    let location = post_res.location.as_deref().ok_or_else(|| {
        CrawlError::transport(
            &login_url,
            "Login",
            Some(anyhow::anyhow!("302 without Location header")),
        )
    })?;
    let target = resolve_location(&opts.base_url, location, "Login")?;
    session.get(&target, Some(jar.get()), None).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn setup(server: &MockServer) -> (SessionClient, CookieJar, Options) {
        let opts = Options {
            base_url: server.base_url(),
            ..Options::default()
        };
        (SessionClient::new(&opts), CookieJar::new(), opts)
    }

    const LOGIN_FORM: &str = r#"<html><body><form method="post" action="/Login.aspx">
        <input type="hidden" name="__VIEWSTATE" value="vs-token" />
        <input type="hidden" name="__EVENTVALIDATION" value="ev-token" />
        <input type="text" name="txtUser" />
        <input type="password" name="txtPass" />
        <input type="submit" name="ctl03" value="Anmelden" />
    </form></body></html>"#;

    #[tokio::test]
    async fn successful_login_accumulates_cookies_from_get_and_post() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/Login.aspx").header_missing("Cookie");
            then.status(200)
                .header("Set-Cookie", "ASP.NET_SessionId=s1; Path=/; HttpOnly")
                .body(LOGIN_FORM);
        });
        let post = server.mock(|when, then| {
            when.method(POST)
                .path("/Login.aspx")
                .header("Cookie", "ASP.NET_SessionId=s1")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body_includes("__VIEWSTATE=vs-token")
                .body_includes("__EVENTVALIDATION=ev-token")
                .body_includes("txtUser=alice")
                .body_includes("txtPass=s3cret")
                .body_includes("ctl03=Anmelden");
            then.status(302)
                .header("Location", "/Default.aspx")
                .header("Set-Cookie", "DSBmobile=auth1; Path=/");
        });
        let establish = server.mock(|when, then| {
            when.method(GET)
                .path("/Default.aspx")
                .header("Cookie", "ASP.NET_SessionId=s1; DSBmobile=auth1");
            then.status(200).body("dashboard");
        });

        let (session, mut jar, opts) = setup(&server);
        run_login(&session, &mut jar, &opts, "alice", "s3cret")
            .await
            .expect("login should succeed");

        post.assert();
        establish.assert();
        assert_eq!(jar.get(), "ASP.NET_SessionId=s1; DSBmobile=auth1");
    }

    #[tokio::test]
    async fn initial_302_is_followed_exactly_once() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/Login.aspx").header_missing("Cookie");
            then.status(302)
                .header("Location", "/Login.aspx?redirected=1")
                .header("Set-Cookie", "hop=1; Path=/");
        });
        let form = server.mock(|when, then| {
            when.method(GET)
                .path("/Login.aspx")
                .query_param("redirected", "1")
                .header("Cookie", "hop=1");
            then.status(200)
                .header("Set-Cookie", "form=2; Path=/")
                .body(LOGIN_FORM);
        });
        let post = server.mock(|when, then| {
            when.method(POST)
                .path("/Login.aspx")
                .header("Cookie", "hop=1; form=2");
            then.status(302).header("Location", "/Default.aspx");
        });
        server.mock(|when, then| {
            when.method(GET).path("/Default.aspx");
            then.status(200).body("");
        });

        let (session, mut jar, opts) = setup(&server);
        run_login(&session, &mut jar, &opts, "u", "p")
            .await
            .expect("login should succeed");
        form.assert();
        post.assert();
        assert_eq!(jar.get(), "hop=1; form=2");
    }

    #[tokio::test]
    async fn post_status_200_is_auth_failure_and_jar_is_not_mutated_further() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/Login.aspx");
            then.status(200)
                .header("Set-Cookie", "sid=pre; Path=/")
                .body(LOGIN_FORM);
        });
        server.mock(|when, then| {
            when.method(POST).path("/Login.aspx");
            then.status(200)
                .header("Set-Cookie", "rejected=1; Path=/")
                .body("<html>Anmeldung fehlgeschlagen</html>");
        });

        let (session, mut jar, opts) = setup(&server);
        let err = run_login(&session, &mut jar, &opts, "u", "wrong")
            .await
            .expect_err("200 on POST is a rejected login");
        assert!(err.is_auth_failed());
        // Diagnostics carry the error page, the jar keeps only pre-POST state.
        assert!(err.to_string().contains("fehlgeschlagen"));
        assert_eq!(jar.get(), "sid=pre");
    }

    #[tokio::test]
    async fn post_302_without_location_is_transport_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/Login.aspx");
            then.status(200).body(LOGIN_FORM);
        });
        server.mock(|when, then| {
            when.method(POST).path("/Login.aspx");
            // Redirect status with no target: the session cannot be
            // established, so this must not pass for a successful login.
            then.status(302);
        });

        let (session, mut jar, opts) = setup(&server);
        let err = run_login(&session, &mut jar, &opts, "u", "p")
            .await
            .expect_err("302 without Location cannot establish a session");
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn submit_button_pair_is_taken_from_markup() {
        let server = MockServer::start();
        let form_html = r#"<form>
            <input type="hidden" name="__VIEWSTATE" value="x">
            <input type="submit" name="btnLogin" value="Sign in">
        </form>"#;
        server.mock(|when, then| {
            when.method(GET).path("/Login.aspx");
            then.status(200).body(form_html);
        });
        let post = server.mock(|when, then| {
            when.method(POST)
                .path("/Login.aspx")
                .body_includes("btnLogin=Sign+in");
            then.status(302).header("Location", "/Default.aspx");
        });
        server.mock(|when, then| {
            when.method(GET).path("/Default.aspx");
            then.status(200).body("");
        });

        let (session, mut jar, opts) = setup(&server);
        run_login(&session, &mut jar, &opts, "u", "p")
            .await
            .expect("login should succeed");
        post.assert();
    }

    #[tokio::test]
    async fn hidden_credential_fields_are_overridden_not_duplicated() {
        let server = MockServer::start();
        // A pathological form carrying the credential fields as hidden inputs.
        let form_html = r#"<form>
            <input type="hidden" name="txtUser" value="stale">
            <input type="hidden" name="__VIEWSTATE" value="x">
            <input type="submit" name="go" value="Go">
        </form>"#;
        server.mock(|when, then| {
            when.method(GET).path("/Login.aspx");
            then.status(200).body(form_html);
        });
        let post = server.mock(|when, then| {
            when.method(POST)
                .path("/Login.aspx")
                .body_includes("txtUser=fresh")
                .body_excludes("txtUser=stale");
            then.status(302).header("Location", "/Default.aspx");
        });
        server.mock(|when, then| {
            when.method(GET).path("/Default.aspx");
            then.status(200).body("");
        });

        let (session, mut jar, opts) = setup(&server);
        run_login(&session, &mut jar, &opts, "fresh", "p")
            .await
            .expect("login should succeed");
        post.assert();
    }
}
