//! End-to-end batch tests against a mock metadata endpoint

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use postcap::batch::{parse_batch_lines, read_batch_file, run_sequential};
use postcap::config::Config;
use postcap::extract::PostExtractor;
use postcap::output::{exit_code_for, write_combined_json, write_failures_file, CombinedReport};

fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.source.base_url = base_url.to_string();
    config.fetch.max_retries = 0;
    config.fetch.initial_delay_secs = 0;
    config
}

fn payload(caption: &str, author: &str) -> serde_json::Value {
    serde_json::json!({
        "graphql": {
            "shortcode_media": {
                "edge_media_to_caption": {"edges": [{"node": {"text": caption}}]},
                "owner": {"username": author},
                "edge_media_preview_like": {"count": 5},
                "taken_at_timestamp": 1_700_000_000,
                "is_video": false
            }
        }
    })
}

async fn mount_post(server: &MockServer, shortcode: &str, caption: &str, author: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/p/{}/", shortcode)))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload(caption, author)))
        .mount(server)
        .await;
}

async fn mount_missing(server: &MockServer, shortcode: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/p/{}/", shortcode)))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

#[tokio::test]
async fn batch_file_runs_end_to_end() {
    let server = MockServer::start().await;
    mount_post(&server, "AAA", "First caption", "author_one").await;
    mount_post(&server, "BBB", "Second caption", "author_two").await;
    mount_missing(&server, "CCC").await;

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "First::https://www.instagram.com/p/AAA/").unwrap();
    writeln!(file, "# a comment").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "https://www.instagram.com/p/BBB/").unwrap();
    writeln!(file, "Missing::https://www.instagram.com/p/CCC/").unwrap();

    let items = read_batch_file(file.path()).unwrap();
    assert_eq!(items.len(), 3);

    let config = test_config(&server.uri());
    let extractor = PostExtractor::new(&config).unwrap();
    let extractor_ref = &extractor;

    let run = run_sequential(&items, Duration::ZERO, |item| async move {
        extractor_ref.extract(&item.label, &item.url).await
    })
    .await;

    assert_eq!(run.total(), items.len());
    assert_eq!(run.success_count(), 2);
    assert_eq!(run.failure_count(), 1);

    let labels: Vec<_> = run.successes.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, ["First", "unspecified"]);
    assert_eq!(run.successes[0].caption_text, "First caption");
    assert_eq!(run.successes[1].author_handle, "author_two");
    assert_eq!(run.failures[0].label, "Missing");
    assert!(run.failures[0].error_description.contains("Post not found"));

    assert_eq!(exit_code_for(&run), 0);
}

#[tokio::test]
async fn mostly_failed_batch_exits_nonzero_and_failures_round_trip() {
    let server = MockServer::start().await;
    mount_post(&server, "OK1", "Only success", "author").await;
    for shortcode in ["BAD1", "BAD2", "BAD3"] {
        mount_missing(&server, shortcode).await;
    }

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "https://www.instagram.com/p/OK1/").unwrap();
    for shortcode in ["BAD1", "BAD2", "BAD3"] {
        writeln!(file, "{}::https://www.instagram.com/p/{}/", shortcode, shortcode).unwrap();
    }

    let items = read_batch_file(file.path()).unwrap();
    let config = test_config(&server.uri());
    let extractor = PostExtractor::new(&config).unwrap();
    let extractor_ref = &extractor;

    let run = run_sequential(&items, Duration::ZERO, |item| async move {
        extractor_ref.extract(&item.label, &item.url).await
    })
    .await;

    assert_eq!(run.total(), 4);
    assert_eq!(run.failure_count(), 3);
    assert_eq!(exit_code_for(&run), 1);

    // the failure list must be directly reusable as batch input
    let dir = tempfile::tempdir().unwrap();
    let failures_path = write_failures_file(&run.failures, dir.path())
        .unwrap()
        .unwrap();
    let reread = parse_batch_lines(&std::fs::read_to_string(failures_path).unwrap());

    assert_eq!(reread.len(), 3);
    assert!(reread
        .iter()
        .all(|item| item.url.starts_with("https://www.instagram.com/p/BAD")));
    assert_eq!(reread[0].label, "BAD1");
}

#[tokio::test]
async fn combined_json_report_carries_all_successes() {
    let server = MockServer::start().await;
    mount_post(&server, "JJJ", "Json caption", "json_author").await;
    mount_post(&server, "KKK", "Another caption", "json_author").await;

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "One::https://www.instagram.com/p/JJJ/").unwrap();
    writeln!(file, "Two::https://www.instagram.com/p/KKK/").unwrap();

    let items = read_batch_file(file.path()).unwrap();
    let config = test_config(&server.uri());
    let extractor = PostExtractor::new(&config).unwrap();
    let extractor_ref = &extractor;

    let run = run_sequential(&items, Duration::ZERO, |item| async move {
        extractor_ref.extract(&item.label, &item.url).await
    })
    .await;

    let dir = tempfile::tempdir().unwrap();
    let report_path = write_combined_json(&run, dir.path()).unwrap();
    let report: CombinedReport =
        serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();

    assert_eq!(report.total_count, 2);
    let labels: Vec<_> = report.results.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, ["One", "Two"]);
    assert_eq!(report.results[0].like_count, 5);
}

#[tokio::test]
async fn rate_limited_item_recovers_within_the_batch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/p/SLOW/"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_post(&server, "SLOW", "Worth the wait", "patient_author").await;

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Slow::https://www.instagram.com/p/SLOW/").unwrap();

    let items = read_batch_file(file.path()).unwrap();
    let mut config = test_config(&server.uri());
    config.fetch.max_retries = 3;

    let extractor = PostExtractor::new(&config).unwrap();
    let extractor_ref = &extractor;

    let run = run_sequential(&items, Duration::ZERO, |item| async move {
        extractor_ref.extract(&item.label, &item.url).await
    })
    .await;

    assert_eq!(run.success_count(), 1);
    assert_eq!(run.successes[0].caption_text, "Worth the wait");
}
