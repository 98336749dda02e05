//! Integration tests for a full search-and-download run
//!
//! A wiremock server stands in for both the search API and the image CDN;
//! every run writes into its own temporary directory.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use derpi_fetcher::app::{
    ClientConfig, Coordinator, CoordinatorConfig, DownloadQueue, ExistingFilePolicy,
    QuerySource, RetryPolicy, SearchClient, SearchQuery, SessionResult, SourceEnd, Storage,
    WorkerConfig,
};

const SEARCH_PATH: &str = "/api/v1/json/search/images";
const IMAGE_BYTES: &[u8] = b"not really a png";

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries, Duration::from_millis(10))
}

fn test_config(workers: usize, existing: ExistingFilePolicy) -> CoordinatorConfig {
    let worker = WorkerConfig {
        worker_count: workers,
        retry: fast_retry(5),
        existing_files: existing,
    };
    CoordinatorConfig::default()
        .with_worker_config(worker)
        .with_search_retry(fast_retry(5))
}

fn client_for(base_url: &str) -> Arc<SearchClient> {
    let config = ClientConfig::default()
        .with_base_url(base_url)
        .with_request_timeout(Duration::from_secs(5));
    Arc::new(SearchClient::with_config(&config).unwrap())
}

/// One search record as the API would return it
fn record_json(server: &MockServer, id: u64, extension: &str) -> String {
    let artist = if id % 2 == 0 { "alpha" } else { "b/eta" };
    format!(
        r#"{{"id":{id},"score": {score},"tags":["safe","artist:{artist}"],"representations":{{"full":"{uri}/img/{id}.{extension}","thumb":"{uri}/thumb/{id}.png"}}}}"#,
        id = id,
        score = id * 3,
        artist = artist,
        uri = server.uri(),
        extension = extension,
    )
}

fn page_body(records: &[String]) -> String {
    format!(r#"{{"images":[{}],"total":{}}}"#, records.join(","), records.len())
}

async fn mount_page(server: &MockServer, page: u32, records: &[String]) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_body(records)))
        .mount(server)
        .await;
}

/// Mount `sizes.len()` result pages followed by an empty page
///
/// Record IDs run consecutively from 1. The page after the empty one must
/// never be requested.
async fn mount_search(server: &MockServer, sizes: &[u64]) -> Vec<String> {
    let mut all = Vec::new();
    let mut next_id = 1;
    for (index, size) in sizes.iter().enumerate() {
        let records: Vec<String> = (next_id..next_id + size)
            .map(|id| record_json(server, id, "png"))
            .collect();
        next_id += size;
        mount_page(server, index as u32 + 1, &records).await;
        all.extend(records);
    }

    let empty_page = sizes.len() as u32 + 1;
    mount_page(server, empty_page, &[]).await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", (empty_page + 1).to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_body(&[])))
        .expect(0)
        .mount(server)
        .await;

    all
}

async fn mount_images(server: &MockServer, expected: u64) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/img/\d+\.\w+$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(IMAGE_BYTES))
        .expect(expected)
        .mount(server)
        .await;
}

async fn run(
    base_url: &str,
    output: &Path,
    config: CoordinatorConfig,
    query: &str,
) -> SessionResult {
    Coordinator::new(config, client_for(base_url), Arc::new(Storage::new(output)))
        .run(SearchQuery::new(query), CancellationToken::new())
        .await
        .unwrap()
}

/// Every file under `root` with the given extension
fn files_with_extension(root: &Path, extension: &str) -> Vec<std::path::PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().map_or(false, |e| e == extension) {
                found.push(path);
            }
        }
    }
    found
}

/// Test a multi-page search
///
/// Verifies that pages of 50, 50 and 20 results followed by an empty page
/// download all 120 images, stop paging at the empty page and produce a
/// count equal to the files on disk.
#[tokio::test]
async fn test_three_pages_download_every_result() {
    let server = MockServer::start().await;
    mount_search(&server, &[50, 50, 20]).await;
    mount_images(&server, 120).await;
    let output = TempDir::new().unwrap();

    let result = run(
        &server.uri(),
        output.path(),
        test_config(8, ExistingFilePolicy::CountAsDownloaded),
        "safe",
    )
    .await;

    assert_eq!(result.source.end, SourceEnd::Exhausted);
    assert_eq!(result.source.pages_fetched, 4);
    assert_eq!(result.source.items_enqueued, 120);
    assert_eq!(result.downloaded, 120);
    assert_eq!(result.pool.downloaded, 120);
    assert_eq!(result.pool.abandoned, 0);
    assert!(!result.search_failed());

    assert_eq!(files_with_extension(output.path(), "png").len(), 120);
    assert_eq!(files_with_extension(output.path(), "json").len(), 120);
    assert!(output.path().join("alpha").join("2.png").exists());
    assert!(output.path().join("b_eta").join("1.png").exists());
}

/// Test sidecar content and naming
///
/// Verifies that the sidecar holds the record text exactly as the API sent
/// it, that author tags are sanitized, sorted and joined, and that a
/// `.JPEG` URL is saved as `.jpg`.
#[tokio::test]
async fn test_sidecar_matches_raw_record() {
    let server = MockServer::start().await;
    let raw = format!(
        r#"{{"id":77,  "tags":["artist:zed","safe","artist:a\\b"],"extra":{{"nested":[1, 2]}},"representations":{{"full":"{}/img/77.JPEG"}}}}"#,
        server.uri()
    );
    mount_page(&server, 1, &[raw.clone()]).await;
    mount_page(&server, 2, &[]).await;
    mount_images(&server, 1).await;
    let output = TempDir::new().unwrap();

    let result = run(
        &server.uri(),
        output.path(),
        test_config(2, ExistingFilePolicy::CountAsDownloaded),
        "artist:zed",
    )
    .await;
    assert_eq!(result.downloaded, 1);

    let directory = output.path().join("a_b-&-zed");
    let image = std::fs::read(directory.join("77.jpg")).unwrap();
    assert_eq!(image, IMAGE_BYTES);

    let sidecar = std::fs::read_to_string(directory.join("77.json")).unwrap();
    assert_eq!(sidecar, raw);
}

/// Test records without author tags
#[tokio::test]
async fn test_untagged_record_goes_to_unknown() {
    let server = MockServer::start().await;
    let raw = format!(
        r#"{{"id":5,"tags":["safe"],"representations":{{"full":"{}/img/5.gif"}}}}"#,
        server.uri()
    );
    mount_page(&server, 1, &[raw]).await;
    mount_page(&server, 2, &[]).await;
    mount_images(&server, 1).await;
    let output = TempDir::new().unwrap();

    let result = run(
        &server.uri(),
        output.path(),
        test_config(1, ExistingFilePolicy::CountAsDownloaded),
        "safe",
    )
    .await;

    assert_eq!(result.downloaded, 1);
    assert!(output.path().join("unknown").join("5.gif").exists());
    assert!(output.path().join("unknown").join("5.json").exists());
}

/// Test search response retry
///
/// Verifies that an undecodable page is requested again and, once it
/// decodes, each of its results is downloaded exactly once.
#[tokio::test]
async fn test_malformed_page_retried_without_duplicates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;
    mount_search(&server, &[3]).await;
    mount_images(&server, 3).await;
    let output = TempDir::new().unwrap();

    let result = run(
        &server.uri(),
        output.path(),
        test_config(2, ExistingFilePolicy::CountAsDownloaded),
        "safe",
    )
    .await;

    assert_eq!(result.source.end, SourceEnd::Exhausted);
    assert_eq!(result.source.items_enqueued, 3);
    assert_eq!(result.downloaded, 3);
}

/// Test a search that never gets a response
///
/// Verifies that the run ends as a failed search with nothing downloaded
/// rather than hanging or returning an error.
#[tokio::test]
async fn test_transport_failure_ends_search() {
    let output = TempDir::new().unwrap();
    let result = run(
        "http://127.0.0.1:1",
        output.path(),
        test_config(2, ExistingFilePolicy::CountAsDownloaded),
        "safe",
    )
    .await;

    assert_eq!(result.source.end, SourceEnd::TransportFailed);
    assert!(result.search_failed());
    assert_eq!(result.downloaded, 0);
    assert_eq!(result.source.items_enqueued, 0);
}

/// Test retry exhaustion for a download
///
/// Verifies that a server error is attempted `1 + max_retries` times, the
/// task is abandoned and the count stays at zero.
#[tokio::test]
async fn test_server_error_abandoned_after_retries() {
    let server = MockServer::start().await;
    mount_search(&server, &[1]).await;
    Mock::given(method("GET"))
        .and(path("/img/1.png"))
        .respond_with(ResponseTemplate::new(500))
        .expect(6)
        .mount(&server)
        .await;
    let output = TempDir::new().unwrap();

    let result = run(
        &server.uri(),
        output.path(),
        test_config(1, ExistingFilePolicy::CountAsDownloaded),
        "safe",
    )
    .await;

    assert_eq!(result.downloaded, 0);
    assert_eq!(result.pool.abandoned, 1);
    assert_eq!(result.pool.failed_attempts, 6);
    assert!(files_with_extension(output.path(), "png").is_empty());
    assert!(files_with_extension(output.path(), "tmp").is_empty());
}

/// Test a permanently missing image
///
/// Verifies that a 404 is not retried and the remaining images still
/// download.
#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;
    mount_search(&server, &[2]).await;
    Mock::given(method("GET"))
        .and(path("/img/1.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_images(&server, 1).await;
    let output = TempDir::new().unwrap();

    let result = run(
        &server.uri(),
        output.path(),
        test_config(1, ExistingFilePolicy::CountAsDownloaded),
        "safe",
    )
    .await;

    assert_eq!(result.downloaded, 1);
    assert_eq!(result.pool.abandoned, 1);
    assert_eq!(result.pool.failed_attempts, 1);
}

/// Test the existing-file policies
///
/// Verifies that an image already on disk is never fetched, and that it
/// counts toward the total only under `CountAsDownloaded`.
#[tokio::test]
async fn test_existing_file_policies() {
    for (policy, expected) in [
        (ExistingFilePolicy::CountAsDownloaded, 1),
        (ExistingFilePolicy::Ignore, 0),
    ] {
        let server = MockServer::start().await;
        mount_search(&server, &[1]).await;
        mount_images(&server, 0).await;

        let output = TempDir::new().unwrap();
        let directory = output.path().join("b_eta");
        std::fs::create_dir_all(&directory).unwrap();
        std::fs::write(directory.join("1.png"), b"earlier").unwrap();

        let result = run(&server.uri(), output.path(), test_config(1, policy), "safe").await;

        assert_eq!(result.downloaded, expected, "policy {:?}", policy);
        assert_eq!(result.pool.already_present, 1);
        assert_eq!(result.pool.downloaded, 0);
        let kept = std::fs::read(directory.join("1.png")).unwrap();
        assert_eq!(kept, b"earlier");
    }
}

/// Test repeating a run
///
/// Verifies that a second run over the same output makes no image requests
/// and reports the same count under `CountAsDownloaded`.
#[tokio::test]
async fn test_second_run_is_idempotent() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let config = test_config(4, ExistingFilePolicy::CountAsDownloaded);

    mount_search(&server, &[10, 5]).await;
    mount_images(&server, 15).await;
    let first = run(&server.uri(), output.path(), config.clone(), "safe").await;
    assert_eq!(first.downloaded, 15);
    server.verify().await;

    server.reset().await;
    mount_search(&server, &[10, 5]).await;
    mount_images(&server, 0).await;
    let second = run(&server.uri(), output.path(), config, "safe").await;

    assert_eq!(second.downloaded, 15);
    assert_eq!(second.pool.downloaded, 0);
    assert_eq!(second.pool.already_present, 15);
    assert_eq!(files_with_extension(output.path(), "png").len(), 15);
}

/// Test cancellation while the queue is full
///
/// Verifies that a producer blocked on a full queue with no consumer
/// returns promptly once cancelled.
#[tokio::test]
async fn test_cancel_unblocks_full_queue() {
    let server = MockServer::start().await;
    mount_search(&server, &[50]).await;

    let source = QuerySource::new(
        client_for(&server.uri()),
        SearchQuery::new("safe"),
        fast_retry(5),
    );
    let (sender, receiver) = DownloadQueue::bounded(1);
    let cancel = CancellationToken::new();
    let handle = source.spawn(sender, cancel.clone());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!handle.is_finished());
    assert_eq!(receiver.len(), 1);

    cancel.cancel();
    let report = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("producer did not stop after cancellation")
        .unwrap();

    assert_eq!(report.end, SourceEnd::Cancelled);
    assert_eq!(report.items_enqueued, 1);
    drop(receiver);
}

/// Test cancelling a whole run
///
/// Verifies that a cancelled run still returns a result and that the
/// count matches the images actually written.
#[tokio::test]
async fn test_cancelled_run_count_matches_files() {
    let server = MockServer::start().await;
    mount_search(&server, &[50, 50]).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/img/\d+\.png$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(IMAGE_BYTES)
                .set_delay(Duration::from_millis(50)),
        )
        .mount(&server)
        .await;
    let output = TempDir::new().unwrap();

    let coordinator = Coordinator::new(
        test_config(2, ExistingFilePolicy::CountAsDownloaded),
        client_for(&server.uri()),
        Arc::new(Storage::new(output.path())),
    );
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        coordinator.run(SearchQuery::new("safe"), cancel),
    )
    .await
    .expect("run did not finish after cancellation")
    .unwrap();

    assert!(result.cancelled());
    assert!(result.downloaded < 100);
    assert_eq!(
        result.downloaded as usize,
        files_with_extension(output.path(), "png").len()
    );
}
