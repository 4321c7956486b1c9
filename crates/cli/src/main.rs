// ABOUTME: CLI binary for the DayBoard substitution-plan crawler.
// ABOUTME: Logs into the portal (or reuses a cookie), fetches the plan, and prints entries as JSON.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use dayboard_crawler::{Crawler, CrawlError, Entry};

#[derive(Parser, Debug)]
#[command(name = "dayboard")]
#[command(about = "Fetch and normalize substitution-plan entries from the timetable portal")]
struct Args {
    /// Portal username
    #[arg(short = 'u', long = "username")]
    username: Option<String>,

    /// Portal password
    #[arg(short = 'p', long = "password")]
    password: Option<String>,

    /// Session cookie obtained out-of-band (skips the login flow)
    #[arg(long = "cookie", conflicts_with_all = ["username", "password"])]
    cookie: Option<String>,

    /// Fetch from the unauthenticated remote API instead of crawling
    #[arg(long = "remote", conflicts_with_all = ["username", "password", "cookie"])]
    remote: Option<String>,

    /// Base origin of the portal
    #[arg(long = "base-url", default_value = "https://www.dsbmobile.de")]
    base_url: String,

    /// Keep only entries whose class label contains this substring
    #[arg(long = "class")]
    class: Option<String>,

    /// Keep only entries whose teacher code contains this substring
    #[arg(long = "teacher")]
    teacher: Option<String>,

    /// Overall request timeout in seconds
    #[arg(long = "timeout", default_value_t = 30)]
    timeout_secs: u64,

    /// Pretty-print the JSON output
    #[arg(long = "pretty")]
    pretty: bool,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,
}

/// Substring filters from the app's filter UI, applied case-insensitively.
fn apply_filters(entries: Vec<Entry>, class: Option<&str>, teacher: Option<&str>) -> Vec<Entry> {
    entries
        .into_iter()
        .filter(|e| {
            class
                .map(|c| e.class.to_lowercase().contains(&c.to_lowercase()))
                .unwrap_or(true)
                && teacher
                    .map(|t| e.old_teacher.to_lowercase().contains(&t.to_lowercase()))
                    .unwrap_or(true)
        })
        .collect()
}

/// Map error kinds to distinct exit codes so wrapping scripts can branch on
/// bad credentials vs. a stale session vs. the network.
fn exit_code_for(err: &CrawlError) -> ExitCode {
    if err.is_auth_failed() {
        ExitCode::from(2)
    } else if err.is_endpoint_not_found() {
        ExitCode::from(3)
    } else if err.is_transport() {
        ExitCode::from(4)
    } else {
        ExitCode::FAILURE
    }
}

async fn run(args: &Args) -> Result<Vec<Entry>, CrawlError> {
    let mut crawler = Crawler::builder()
        .base_url(&args.base_url)
        .timeout(Duration::from_secs(args.timeout_secs))
        .build();

    if let Some(ref remote) = args.remote {
        return crawler.fetch_remote_entries(remote).await;
    }

    if let Some(ref cookie) = args.cookie {
        crawler.set_cookie(cookie.clone());
    } else if let (Some(ref user), Some(ref pass)) = (&args.username, &args.password) {
        crawler.login(user, pass).await?;
    }

    crawler.fetch_timetable().await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if args.remote.is_none()
        && args.cookie.is_none()
        && (args.username.is_none() || args.password.is_none())
    {
        eprintln!("error: supply --username and --password, --cookie, or --remote");
        return ExitCode::FAILURE;
    }

    let start = Instant::now();
    let result = run(&args).await;
    let elapsed = start.elapsed();

    if args.timing {
        eprintln!("elapsed: {} ms", elapsed.as_millis());
    }

    match result {
        Ok(entries) => {
            let entries =
                apply_filters(entries, args.class.as_deref(), args.teacher.as_deref());
            let out = if args.pretty {
                serde_json::to_string_pretty(&entries)
            } else {
                serde_json::to_string(&entries)
            };
            match out {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("error: failed to serialize entries: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Err(err) => {
            eprintln!("error: {}", err);
            exit_code_for(&err)
        }
    }
}
