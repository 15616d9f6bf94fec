//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the match API and test the
//! full traversal end-to-end against a temporary data directory.

use match_crawler::config::{ApiConfig, Config, CrawlerConfig, OutputConfig};
use match_crawler::crawler::{
    run_crawl, CompletionReason, CrawlController, CrawlOutcome, RateGovernor,
};
use match_crawler::state::{AccountId, CrawlPhase, MatchId};
use match_crawler::storage::{ArtifactKind, ArtifactStore, FsArtifactStore};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const API_KEY: &str = "RGAPI-test-key";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, data_dir: &Path, max_matches: u64) -> Config {
    Config {
        api: ApiConfig {
            api_key: API_KEY.to_string(),
            base_url: base_url.to_string(),
        },
        crawler: CrawlerConfig {
            root_account_id: "1000".to_string(),
            max_requests_per_minute: 40,
            max_matches_to_crawl: max_matches,
        },
        output: OutputConfig {
            data_directory: data_dir.to_str().unwrap().to_string(),
        },
    }
}

fn recent_matches_body(game_ids: &[&str]) -> String {
    let entries: Vec<String> = game_ids
        .iter()
        .map(|id| format!(r#"{{"platformId":"NA1","gameId":{},"champion":22}}"#, id))
        .collect();
    format!(r#"{{"matches":[{}],"totalGames":{}}}"#, entries.join(","), game_ids.len())
}

fn match_body(game_id: &str, accounts: &[&str]) -> String {
    let players: Vec<String> = accounts
        .iter()
        .map(|a| format!(r#"{{"player":{{"accountId":{},"summonerName":"p"}}}}"#, a))
        .collect();
    format!(
        r#"{{"gameId":{},"participantIdentities":[{}]}}"#,
        game_id,
        players.join(",")
    )
}

async fn mount_recent(server: &MockServer, account: &str, status: u16, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/lol/match/v3/matchlists/by-account/{}/recent",
            account
        )))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_match(server: &MockServer, id: &str, status: u16, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/lol/match/v3/matches/{}", id)))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_timeline(server: &MockServer, id: &str, status: u16, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/lol/match/v3/timelines/by-match/{}", id)))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .expect(times)
        .mount(server)
        .await;
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_scenario_seed_account_two_matches_one_failure() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();

    mount_recent(&server, "1000", 200, &recent_matches_body(&["555", "556"]), 1).await;
    mount_match(&server, "555", 200, &match_body("555", &["1000", "2000"]), 1).await;
    mount_timeline(&server, "555", 200, r#"{"frames":[]}"#, 1).await;
    mount_match(&server, "556", 500, "", 1).await;
    mount_timeline(&server, "556", 200, "{}", 0).await;
    mount_recent(&server, "2000", 404, "", 1).await;

    let config = create_test_config(&server.uri(), data_dir.path(), 100);
    let (mut controller, feed) = CrawlController::new(config).expect("controller");

    let outcome = controller.start().await.expect("crawl");
    assert_eq!(
        outcome,
        CrawlOutcome::Completed(CompletionReason::FrontierExhausted)
    );
    assert_eq!(controller.phase(), CrawlPhase::Completed);

    let state = controller.state();
    assert_eq!(state.matches.seen_len(), 2);
    assert!(state.matches.contains(&MatchId::new("555")));
    assert!(state.matches.contains(&MatchId::new("556")));
    assert_eq!(state.accounts.seen_len(), 2);
    assert!(state.accounts.contains(&AccountId::new("1000")));
    assert!(state.accounts.contains(&AccountId::new("2000")));

    assert_eq!(controller.matches_crawled(), 1);
    assert_eq!(*feed.crawled.borrow(), 1);

    assert_eq!(
        files_in(data_dir.path()),
        vec!["Match555.txt", "Timeline555.txt"]
    );
}

#[tokio::test]
async fn test_cap_reached_halts_mid_queue() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();

    mount_recent(&server, "1000", 200, &recent_matches_body(&["555", "556"]), 1).await;
    mount_match(&server, "555", 200, &match_body("555", &["1000", "2000"]), 1).await;
    mount_timeline(&server, "555", 200, "{}", 1).await;
    mount_match(&server, "556", 200, &match_body("556", &["3000"]), 0).await;
    mount_recent(&server, "2000", 200, &recent_matches_body(&["557"]), 0).await;

    let config = create_test_config(&server.uri(), data_dir.path(), 1);
    let (mut controller, _feed) = CrawlController::new(config).expect("controller");

    let outcome = controller.start().await.expect("crawl");
    assert_eq!(outcome, CrawlOutcome::Completed(CompletionReason::CapReached));
    assert_eq!(controller.matches_crawled(), 1);

    // The unprocessed match stays queued in the abandoned state
    let pending: Vec<String> = controller
        .state()
        .matches
        .pending()
        .map(|m| m.to_string())
        .collect();
    assert_eq!(pending, vec!["556"]);
}

#[tokio::test]
async fn test_missing_timeline_leaves_orphan_that_resume_repairs() {
    let data_dir = TempDir::new().unwrap();

    // First run: the timeline request fails
    {
        let server = MockServer::start().await;
        mount_recent(&server, "1000", 200, &recent_matches_body(&["700"]), 1).await;
        mount_match(&server, "700", 200, &match_body("700", &["1000"]), 1).await;
        mount_timeline(&server, "700", 503, "", 1).await;

        let config = create_test_config(&server.uri(), data_dir.path(), 100);
        let (mut controller, _feed) = CrawlController::new(config).expect("controller");
        controller.start().await.expect("crawl");

        assert_eq!(controller.matches_crawled(), 0);
        assert_eq!(files_in(data_dir.path()), vec!["Match700.txt"]);
    }

    // Second run: resume deletes the orphan and the match is fetched again
    let server = MockServer::start().await;
    mount_recent(&server, "1000", 200, &recent_matches_body(&["700"]), 1).await;
    mount_match(&server, "700", 200, &match_body("700", &["1000"]), 1).await;
    mount_timeline(&server, "700", 200, "{}", 1).await;

    let config = create_test_config(&server.uri(), data_dir.path(), 100);
    let (mut controller, mut feed) = CrawlController::new(config).expect("controller");

    let summary = controller.load_existing().expect("resume");
    assert_eq!(summary.orphans_removed, 1);
    assert_eq!(summary.matches_loaded, 0);
    assert!(feed
        .drain_lines()
        .iter()
        .any(|l| l.message.contains("Timeline700.txt does not exist")));

    controller.start().await.expect("crawl");
    assert_eq!(controller.matches_crawled(), 1);
    assert_eq!(
        files_in(data_dir.path()),
        vec!["Match700.txt", "Timeline700.txt"]
    );
}

#[tokio::test]
async fn test_resume_skips_matches_already_on_disk() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();

    let store = FsArtifactStore::new(data_dir.path()).unwrap();
    let existing = MatchId::new("1");
    store
        .save(ArtifactKind::Match, &existing, &match_body("1", &["1000", "3000"]))
        .unwrap();
    store.save(ArtifactKind::Timeline, &existing, "{}").unwrap();

    // Participants from disk are queued before the re-seeded root
    mount_recent(&server, "1000", 200, &recent_matches_body(&["1", "2"]), 1).await;
    mount_recent(&server, "3000", 404, "", 1).await;
    mount_match(&server, "1", 200, "{}", 0).await;
    mount_match(&server, "2", 200, &match_body("2", &["3000"]), 1).await;
    mount_timeline(&server, "2", 200, "{}", 1).await;

    let config = create_test_config(&server.uri(), data_dir.path(), 100);
    let outcome = run_crawl(config, true).await.expect("crawl");
    assert_eq!(
        outcome,
        CrawlOutcome::Completed(CompletionReason::FrontierExhausted)
    );

    let complete = store.list(ArtifactKind::Timeline).unwrap();
    assert_eq!(complete, vec![MatchId::new("1"), MatchId::new("2")]);
}

#[tokio::test]
async fn test_malformed_recent_matches_is_skipped() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();

    mount_recent(&server, "1000", 200, r#"{"matches":[{"gameId":55"#, 1).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/lol/match/v3/matches/.*$"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), data_dir.path(), 100);
    let (mut controller, mut feed) = CrawlController::new(config).expect("controller");

    let outcome = controller.start().await.expect("crawl");
    assert_eq!(
        outcome,
        CrawlOutcome::Completed(CompletionReason::FrontierExhausted)
    );
    assert_eq!(controller.state().matches.seen_len(), 0);
    assert!(feed
        .drain_lines()
        .iter()
        .any(|l| l.message.contains("Could not extract matches of account 1000")));
}

#[tokio::test]
async fn test_stop_request_halts_at_match_boundary() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();

    mount_recent(&server, "1000", 200, &recent_matches_body(&["555", "556"]), 1).await;
    mount_match(&server, "555", 200, &match_body("555", &["2000"]), 1).await;
    mount_timeline(&server, "555", 200, "{}", 1).await;
    // Whether 556 is fetched depends on when the watcher runs
    Mock::given(method("GET"))
        .and(path_regex(r"^/lol/match/v3/(matches|timelines/by-match)/556$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(match_body("556", &["3000"])))
        .mount(&server)
        .await;
    mount_recent(&server, "2000", 200, &recent_matches_body(&[]), 0).await;

    let config = create_test_config(&server.uri(), data_dir.path(), 100);
    let (mut controller, mut feed) = CrawlController::new(config).expect("controller");

    let stop = controller.stop_handle();
    let watcher = tokio::spawn(async move {
        while let Some(line) = feed.lines.recv().await {
            if line.message.contains("Timeline555.txt") {
                stop.stop();
                break;
            }
        }
    });

    let outcome = controller.start().await.expect("crawl");
    watcher.await.unwrap();

    assert_eq!(outcome, CrawlOutcome::Stopped);
    assert_eq!(controller.phase(), CrawlPhase::Stopped);
    assert!(controller.state().accounts.pending().any(|a| a.to_string() == "2000"));
}

#[tokio::test]
async fn test_requests_over_cap_wait_for_window_boundary() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();
    let window = Duration::from_millis(200);

    let arrivals = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&arrivals);
    Mock::given(method("GET"))
        .and(query_param("api_key", API_KEY))
        .respond_with(move |request: &Request| {
            recorder.lock().unwrap().push(Instant::now());
            let body = match request.url.path() {
                "/lol/match/v3/matchlists/by-account/1000/recent" => {
                    recent_matches_body(&["555"])
                }
                "/lol/match/v3/matches/555" => match_body("555", &["1000"]),
                _ => r#"{"frames":[]}"#.to_string(),
            };
            ResponseTemplate::new(200).set_body_string(body)
        })
        .expect(3)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), data_dir.path(), 100);
    let (controller, mut feed) = CrawlController::new(config).expect("controller");
    let mut controller = controller.with_governor(RateGovernor::with_window(1, window));

    let started = Instant::now();
    let outcome = controller.start().await.expect("crawl");
    assert_eq!(
        outcome,
        CrawlOutcome::Completed(CompletionReason::FrontierExhausted)
    );
    assert_eq!(controller.matches_crawled(), 1);

    // One request per window: recent list, then match, then timeline
    let arrivals = arrivals.lock().unwrap().clone();
    assert_eq!(arrivals.len(), 3);
    assert!(arrivals[1].duration_since(started) >= window);
    assert!(arrivals[2].duration_since(started) >= window * 2);

    let lines = feed.drain_lines();
    let waits = lines
        .iter()
        .filter(|l| l.message.starts_with("Reached limit, waiting"))
        .count();
    assert_eq!(waits, 2);
    assert!(lines
        .iter()
        .any(|l| l.message == "Crawled 0 matches so far."));
}

#[tokio::test]
async fn test_empty_success_body_is_treated_as_absent() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();

    mount_recent(&server, "1000", 200, &recent_matches_body(&["555"]), 1).await;
    mount_match(&server, "555", 200, "", 1).await;
    mount_timeline(&server, "555", 200, "{}", 0).await;

    let config = create_test_config(&server.uri(), data_dir.path(), 100);
    let (mut controller, mut feed) = CrawlController::new(config).expect("controller");

    controller.start().await.expect("crawl");
    assert_eq!(controller.matches_crawled(), 0);
    assert!(files_in(data_dir.path()).is_empty());
    assert!(feed
        .drain_lines()
        .iter()
        .any(|l| l.message == "error downloading match 555: empty body (HTTP 200)"));
}
