//! End-to-end harvest flow against a scripted page.
//!
//! Each scenario serves a fixed sequence of rendered feeds (one per scroll
//! position) and checks what the harvester returns and why it stopped:
//! - limit and first-seen ordering
//! - deduplication and the three-pass stall stop
//! - post-filter admission and the scroll budget
//! - a feed that stops rendering containers stalls with what it had
//! - credential failures surfacing before any navigation
//! - navigation, login-wall and readiness failures

use chrono::{Duration, Utc};
use cortex_harvest::config::HarvestConfig;
use cortex_harvest::credentials::{
    Cookie, CredentialBundle, FileSessionProvider, SessionProvider,
};
use cortex_harvest::criteria::FilterCriteria;
use cortex_harvest::error::{HarvestError, HarvestResult};
use cortex_harvest::harvest::{Harvester, StopReason};
use cortex_harvest::renderer::scripted::ScriptedContext;
use std::path::Path;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

// ── Fixtures ──

struct Post {
    handle: &'static str,
    n: u32,
    likes: u64,
}

fn post(handle: &'static str, n: u32) -> Post {
    Post {
        handle,
        n,
        likes: 0,
    }
}

fn liked(n: u32, likes: u64) -> Post {
    Post {
        handle: "alice",
        n,
        likes,
    }
}

fn render(posts: &[Post]) -> String {
    let body: String = posts
        .iter()
        .map(|p| {
            format!(
                r#"<article data-testid="tweet">
                    <div data-testid="User-Name">
                        <a href="/{h}"><span>{h} display</span></a>
                        <a href="/{h}"><span>@{h}</span></a>
                        <a href="/{h}/status/{n}"><time datetime="2025-08-01T{hh:02}:00:00.000Z">Aug 1</time></a>
                    </div>
                    <div data-testid="tweetText">post number {n}</div>
                    <button data-testid="like"><span>{likes}</span></button>
                </article>"#,
                h = p.handle,
                n = p.n,
                hh = p.n % 24,
                likes = p.likes,
            )
        })
        .collect();
    format!("<html><body><main>{body}</main></body></html>")
}

fn bundle(age: Duration) -> CredentialBundle {
    CredentialBundle {
        cookies: vec![
            Cookie {
                name: "auth_token".into(),
                value: "secret".into(),
                domain: ".x.com".into(),
                path: "/".into(),
            },
            Cookie {
                name: "ct0".into(),
                value: "csrf".into(),
                domain: String::new(),
                path: "/".into(),
            },
        ],
        user_agent: "Mozilla/5.0 (harvest-test)".into(),
        captured_at: Utc::now() - age,
    }
}

fn store(path: &Path, bundle: &CredentialBundle) {
    let json = serde_json::to_string_pretty(bundle).unwrap();
    std::fs::write(path, json).unwrap();
}

/// Session held in memory.
struct StaticSession(CredentialBundle);

impl SessionProvider for StaticSession {
    fn load(&self) -> HarvestResult<CredentialBundle> {
        Ok(self.0.clone())
    }
}

fn harvester() -> Harvester {
    harvester_with(HarvestConfig::immediate())
}

fn harvester_with(config: HarvestConfig) -> Harvester {
    let session = StaticSession(bundle(Duration::hours(1)));
    assert_ok!(Harvester::new(config, Box::new(session)))
}

fn texts(records: &[cortex_harvest::ContentRecord]) -> Vec<String> {
    records.iter().map(|r| r.text.clone()).collect()
}

// ── Pagination ──

#[tokio::test]
async fn test_growing_feed_stops_at_limit() {
    let mut page = ScriptedContext::new(vec![
        render(&[post("alice", 1), post("alice", 2), post("alice", 3)]),
        render(&(1..=6).map(|n| post("alice", n)).collect::<Vec<_>>()),
        render(&(1..=9).map(|n| post("alice", n)).collect::<Vec<_>>()),
    ]);
    let criteria = FilterCriteria {
        limit: 5,
        ..Default::default()
    };

    let report = assert_ok!(harvester().run(&mut page, &criteria).await);
    assert_eq!(report.stop_reason, StopReason::LimitReached);
    assert_eq!(report.passes, 2);
    assert_eq!(report.scrolls, 1);
    assert_eq!(
        texts(&report.records),
        (1..=5).map(|n| format!("post number {n}")).collect::<Vec<_>>()
    );
    assert_eq!(page.scrolls(), 1);
}

#[tokio::test]
async fn test_repeating_feed_stops_after_three_empty_passes() {
    let repeated = render(&(1..=4).map(|n| post("bob", n)).collect::<Vec<_>>());
    let mut page = ScriptedContext::new(vec![repeated]);
    let criteria = FilterCriteria {
        limit: 10,
        ..Default::default()
    };

    let report = assert_ok!(harvester().run(&mut page, &criteria).await);
    assert_eq!(report.stop_reason, StopReason::Stalled);
    assert_eq!(report.records.len(), 4);
    assert_eq!(report.passes, 4);
    assert_eq!(report.scrolls, 3);

    let mut ids: Vec<&str> = report.records.iter().map(|r| r.id.as_str()).collect();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}

#[tokio::test]
async fn test_repeating_feed_respects_smaller_limit() {
    let repeated = render(&(1..=4).map(|n| post("bob", n)).collect::<Vec<_>>());
    let mut page = ScriptedContext::new(vec![repeated]);
    let criteria = FilterCriteria {
        limit: 2,
        ..Default::default()
    };

    let records = assert_ok!(harvester().harvest(&mut page, &criteria).await);
    assert_eq!(texts(&records), vec!["post number 1", "post number 2"]);
    assert_eq!(page.scrolls(), 0);
}

#[tokio::test]
async fn test_post_filter_applies_before_limit() {
    let mut page = ScriptedContext::new(vec![
        render(&[liked(1, 1), liked(2, 50), liked(3, 2), liked(4, 70)]),
        render(&[liked(3, 2), liked(4, 70), liked(5, 90), liked(6, 95)]),
    ]);
    let criteria = FilterCriteria {
        limit: 3,
        min_likes: 10,
        ..Default::default()
    };

    let report = assert_ok!(harvester().run(&mut page, &criteria).await);
    assert_eq!(report.stop_reason, StopReason::LimitReached);
    assert_eq!(
        texts(&report.records),
        vec!["post number 2", "post number 4", "post number 5"]
    );
    assert!(report.records.iter().all(|r| r.engagement.likes >= 10));
}

#[tokio::test]
async fn test_scroll_budget_bounds_endless_feed() {
    let frames = (1..=30)
        .map(|n| render(&[post("carol", n)]))
        .collect::<Vec<_>>();
    let mut page = ScriptedContext::new(frames);
    let config = HarvestConfig {
        min_scroll_budget: 3,
        scroll_budget_factor: 0,
        ..HarvestConfig::immediate()
    };
    let criteria = FilterCriteria {
        limit: 100,
        ..Default::default()
    };

    let report = assert_ok!(harvester_with(config).run(&mut page, &criteria).await);
    assert_eq!(report.stop_reason, StopReason::ScrollBudgetExhausted);
    assert_eq!(report.scrolls, 3);
    assert_eq!(report.records.len(), 4);
}

#[tokio::test]
async fn test_feed_that_empties_stalls_with_earlier_records() {
    let mut page = ScriptedContext::new(vec![
        render(&[post("alice", 1), post("alice", 2)]),
        "<html><body><p>empty</p></body></html>".into(),
    ]);
    let criteria = FilterCriteria {
        limit: 10,
        ..Default::default()
    };

    let report = assert_ok!(harvester().run(&mut page, &criteria).await);
    assert_eq!(report.stop_reason, StopReason::Stalled);
    assert_eq!(report.passes, 4);
    assert_eq!(report.scrolls, 3);
    assert_eq!(
        texts(&report.records),
        vec!["post number 1", "post number 2"]
    );
}

#[tokio::test]
async fn test_target_url_and_credentials() {
    let mut page = ScriptedContext::new(vec![render(&[post("rustlang", 1)])]);
    let criteria = FilterCriteria {
        author: Some("@rustlang".into()),
        ..Default::default()
    };

    let records = assert_ok!(harvester().harvest(&mut page, &criteria).await);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].author.handle, "rustlang");
    assert_eq!(page.navigations(), ["https://x.com/rustlang".to_string()]);

    let applied = page.credentials().expect("credentials applied");
    assert_eq!(applied.user_agent, "Mozilla/5.0 (harvest-test)");
    assert_eq!(applied.cookies[0].domain, ".x.com");
    assert_eq!(applied.cookies[1].domain, "x.com");
}

// ── Credentials ──

#[tokio::test]
async fn test_missing_session_fails_before_navigation() {
    let dir = TempDir::new().unwrap();
    let provider = FileSessionProvider::new(dir.path().join("twitter-auth.json"));
    let harvester = assert_ok!(Harvester::new(
        HarvestConfig::immediate(),
        Box::new(provider)
    ));
    let mut page = ScriptedContext::new(vec![render(&[post("alice", 1)])]);

    let err = assert_err!(harvester.harvest(&mut page, &FilterCriteria::default()).await);
    assert!(matches!(err, HarvestError::AuthMissing { .. }));
    assert!(err.is_auth());
    assert!(page.navigations().is_empty());
    assert!(page.credentials().is_none());
}

#[tokio::test]
async fn test_expired_session_fails_before_navigation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("twitter-auth.json");
    store(&path, &bundle(Duration::days(8)));
    let provider = FileSessionProvider::new(&path);
    let harvester = assert_ok!(Harvester::new(
        HarvestConfig::immediate(),
        Box::new(provider)
    ));
    let mut page = ScriptedContext::new(vec![render(&[post("alice", 1)])]);

    let err = assert_err!(harvester.harvest(&mut page, &FilterCriteria::default()).await);
    assert!(matches!(
        err,
        HarvestError::AuthExpired {
            age_days: 8,
            max_age_days: 7
        }
    ));
    assert!(page.navigations().is_empty());
}

#[tokio::test]
async fn test_session_from_the_future_fails_before_navigation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("twitter-auth.json");
    store(&path, &bundle(-Duration::days(365)));
    let harvester = assert_ok!(Harvester::new(
        HarvestConfig::immediate(),
        Box::new(FileSessionProvider::new(&path))
    ));
    let mut page = ScriptedContext::new(vec![render(&[post("alice", 1)])]);

    let err = assert_err!(harvester.harvest(&mut page, &FilterCriteria::default()).await);
    assert!(matches!(err, HarvestError::AuthFromFuture { .. }));
    assert!(err.is_auth());
    assert!(page.navigations().is_empty());
}

#[tokio::test]
async fn test_stored_session_is_used() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("twitter-auth.json");
    store(&path, &bundle(Duration::days(2)));
    let provider = FileSessionProvider::new(&path);
    let harvester = assert_ok!(Harvester::new(
        HarvestConfig::immediate(),
        Box::new(provider)
    ));
    let mut page = ScriptedContext::new(vec![render(&[post("alice", 1)])]);

    let records = assert_ok!(harvester.harvest(&mut page, &FilterCriteria::default()).await);
    assert_eq!(records.len(), 1);
    assert_eq!(page.navigations(), ["https://x.com/home".to_string()]);
}

#[tokio::test]
async fn test_invalid_criteria_fail_before_navigation() {
    let mut page = ScriptedContext::new(vec![render(&[post("alice", 1)])]);
    let criteria = FilterCriteria {
        limit: 0,
        ..Default::default()
    };

    let err = assert_err!(harvester().harvest(&mut page, &criteria).await);
    assert!(matches!(err, HarvestError::InvalidCriteria(_)));
    assert!(page.navigations().is_empty());
}

// ── Page failures ──

#[tokio::test]
async fn test_navigation_failure_is_wrapped() {
    let mut page = ScriptedContext::new(vec![]).fail_navigation("net::ERR_NAME_NOT_RESOLVED");
    let criteria = FilterCriteria {
        search: Some("rust".into()),
        ..Default::default()
    };

    let err = assert_err!(harvester().harvest(&mut page, &criteria).await);
    match err {
        HarvestError::Navigation { url, reason } => {
            assert!(url.starts_with("https://x.com/search?q=rust"));
            assert_eq!(reason, "net::ERR_NAME_NOT_RESOLVED");
        }
        other => panic!("expected navigation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_redirect_is_rejected() {
    let mut page = ScriptedContext::new(vec![render(&[post("alice", 1)])])
        .redirect_to("https://x.com/i/flow/login?redirect_after_login=%2Fhome");

    let err = assert_err!(harvester().harvest(&mut page, &FilterCriteria::default()).await);
    assert!(matches!(err, HarvestError::SessionRejected { .. }));
    assert_eq!(page.scrolls(), 0);
}

#[tokio::test]
async fn test_handle_starting_with_login_is_not_a_wall() {
    let mut page = ScriptedContext::new(vec![render(&[post("loginradius", 1)])]);
    let criteria = FilterCriteria {
        author: Some("loginradius".into()),
        ..Default::default()
    };

    let records = assert_ok!(harvester().harvest(&mut page, &criteria).await);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].author.handle, "loginradius");
    assert_eq!(page.navigations(), ["https://x.com/loginradius".to_string()]);
}

#[tokio::test]
async fn test_feed_that_never_renders_times_out() {
    let mut page = ScriptedContext::new(vec![
        "<html><body><p>Something went wrong. Try reloading.</p></body></html>".into(),
    ]);

    let err = assert_err!(harvester().harvest(&mut page, &FilterCriteria::default()).await);
    assert!(matches!(
        err,
        HarvestError::Timeout {
            timeout_ms: 20_000,
            ..
        }
    ));
}
