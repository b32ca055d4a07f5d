//! Cross-crate integration tests exercising `run_review` end to end against
//! in-memory stores and a loopback HTTP stub standing in for an Ollama
//! server, covering the review-pipeline scenarios: a clean staged run, a
//! mixed-severity commit run, a cache hit on re-run, and cancellation
//! mid-run. Hebbian reinforcement and changelog grouping are covered by
//! `critique-memory`'s own unit tests and are out of this crate's boundary
//! (changelog rendering is template formatting, not part of `run_review`).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use critique_engine::config::{CacheConfig, EngineConfig, GitConfig, MemoryConfig, ProviderConfig, ReviewConfig};
use critique_engine::pipeline::{run_review, ReviewInput};
use critique_engine::CacheHandle;
use critique_providers::{ProviderClient, ProviderKind};

/// A canned `/api/generate` responder. Each entry maps a substring expected
/// in the request body (the prompt embeds `File: <path>`) to the raw text
/// Ollama would put in its `response` field; requests matching no marker
/// fall back to `default_response`.
struct StubOllama {
    base_url: String,
    call_count: Arc<AtomicU32>,
}

async fn spawn_stub_ollama(markers: HashMap<&'static str, String>, default_response: String, latency: Option<Duration>) -> StubOllama {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback listener");
    let addr = listener.local_addr().expect("local addr");
    let call_count = Arc::new(AtomicU32::new(0));
    let accept_count = call_count.clone();

    tokio::spawn(async move {
        loop {
            let (mut stream, _) = match listener.accept().await {
                Ok(pair) => pair,
                Err(_) => break,
            };
            let markers = markers.clone();
            let default_response = default_response.clone();
            let call_count = accept_count.clone();
            tokio::spawn(async move {
                let body = match read_http_request_body(&mut stream).await {
                    Ok(body) => body,
                    Err(_) => return,
                };
                call_count.fetch_add(1, Ordering::SeqCst);
                if let Some(delay) = latency {
                    tokio::time::sleep(delay).await;
                }
                let response_text = markers
                    .iter()
                    .find(|(marker, _)| body.contains(*marker))
                    .map(|(_, text)| text.clone())
                    .unwrap_or(default_response);
                let payload = serde_json::json!({ "response": response_text }).to_string();
                let http = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    payload.len(),
                    payload
                );
                let _ = stream.write_all(http.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    StubOllama { base_url: format!("http://{addr}"), call_count }
}

/// Reads a minimal HTTP/1.1 request off `stream`: headers up to `\r\n\r\n`,
/// then `Content-Length` more bytes of body. Good enough for reqwest's own
/// request shape; not a general-purpose HTTP parser.
async fn read_http_request_body(stream: &mut tokio::net::TcpStream) -> std::io::Result<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "connection closed before headers complete"));
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let header_text = String::from_utf8_lossy(&buf[..header_end]);
    let content_length: usize = header_text
        .lines()
        .find_map(|line| line.to_ascii_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_string()))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    while buf.len() - header_end < content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Ok(String::from_utf8_lossy(&buf[header_end..header_end + content_length.min(buf.len() - header_end)]).into_owned())
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

struct Fixture {
    _dir: tempfile::TempDir,
    repo: git2::Repository,
    repo_path: std::path::PathBuf,
}

fn init_repo() -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = git2::Repository::init(dir.path()).expect("init repo");
    {
        let mut config = repo.config().expect("repo config");
        config.set_str("user.name", "Test").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }
    let repo_path = dir.path().to_path_buf();
    Fixture { _dir: dir, repo, repo_path }
}

fn commit_all(fixture: &Fixture, message: &str) -> git2::Oid {
    let mut index = fixture.repo.index().expect("index");
    index.add_all(["*"], git2::IndexAddOption::DEFAULT, None).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = fixture.repo.find_tree(tree_id).unwrap();
    let sig = fixture.repo.signature().unwrap();
    let parent = fixture.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    fixture.repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents).unwrap()
}

fn base_config(repo_path: &std::path::Path, cache_dir: &std::path::Path, endpoint: &str) -> EngineConfig {
    EngineConfig {
        provider: ProviderConfig { name: ProviderKind::Ollama, model: "llama3".into(), base_url: endpoint.into(), api_key: None, timeout_secs: 5, max_tokens: 512, temperature: 0.2 },
        git: GitConfig { repo_path: repo_path.to_string_lossy().into_owned(), base_branch: "main".into(), ignore_patterns: Vec::new() },
        review: ReviewConfig { max_concurrency: 2, deadline_secs: 600, ..ReviewConfig::default() },
        cache: CacheConfig { enabled: true, dir: cache_dir.to_string_lossy().into_owned(), ttl_secs: 3600, max_entries: 100 },
        memory: MemoryConfig { enabled: false, ..MemoryConfig::default() },
        ..Default::default()
    }
}

fn provider_for(config: &EngineConfig) -> ProviderClient {
    ProviderClient::from_config(critique_providers::ModelConfig {
        provider: config.provider.name,
        model: config.provider.model.clone(),
        endpoint: config.provider.base_url.clone(),
        api_key: None,
        max_tokens: config.provider.max_tokens,
        temperature: config.provider.temperature,
        top_p: 0.9,
        timeout_secs: config.provider.timeout_secs,
        max_retries: 0,
    })
    .expect("construct provider client")
}

/// Scenario: staged review, all clean. Expect zero issues, a nonzero score,
/// and one history row inserted with no issue rows of its own (the row
/// count check lives at the history-store level; here we assert the
/// aggregate matches the clean stub response).
#[tokio::test]
async fn staged_review_all_clean() {
    let fixture = init_repo();
    std::fs::write(fixture.repo_path.join("sum.go"), "package main\n\nfunc sum(a int, b int) int {\n\treturn a + b\n}\n").unwrap();
    commit_all(&fixture, "initial");
    std::fs::write(fixture.repo_path.join("sum.go"), "package main\n\nfunc sum(a int, b int) int {\n\treturn a + b + 0\n}\n").unwrap();
    let mut index = fixture.repo.index().unwrap();
    index.add_path(std::path::Path::new("sum.go")).unwrap();
    index.write().unwrap();

    let clean = serde_json::json!({ "issues": [], "summary": "ok", "score": 95 }).to_string();
    let stub = spawn_stub_ollama(HashMap::new(), clean, None).await;

    let cache_dir = tempfile::tempdir().unwrap();
    let config = base_config(&fixture.repo_path, cache_dir.path(), &stub.base_url);
    let provider = provider_for(&config);
    let rules = critique_rules::Rules::default();
    let cache = CacheHandle::new(&config.cache);
    let history = critique_history::HistoryStore::open(":memory:").await.unwrap();

    let result = run_review(&config, ReviewInput::Staged, &provider, &rules, &cache, Some(&history), None, None, CancellationToken::new())
        .await
        .expect("run_review succeeds");

    assert_eq!(result.total_issues, 0);
    assert_eq!(result.overall_score, Some(95.0));
    assert_eq!(stub.call_count.load(Ordering::SeqCst), 1);
}

/// Scenario: commit review, mixed severities. Two files, one critical
/// security issue and one style warning. Expects the severity histogram and
/// a commit-analysis archive write.
#[tokio::test]
async fn commit_review_mixed_severities() {
    let fixture = init_repo();
    std::fs::write(fixture.repo_path.join("a.go"), "package main\n\nfunc a() {}\n").unwrap();
    std::fs::write(fixture.repo_path.join("b.go"), "package main\n\nfunc b() {}\n").unwrap();
    commit_all(&fixture, "initial");
    std::fs::write(fixture.repo_path.join("a.go"), "package main\n\nfunc a() { query(\"SELECT * FROM x WHERE y=\" + input) }\n").unwrap();
    std::fs::write(fixture.repo_path.join("b.go"), "package main\n\nfunc B() {}\n").unwrap();
    let head_commit = commit_all(&fixture, "mixed severities");

    let response_a = serde_json::json!({
        "issues": [{"type": "security", "severity": "critical", "message": "SQLi", "suggestion": "parameterize"}],
        "summary": "security issue found",
        "score": 20,
    })
    .to_string();
    let response_b = serde_json::json!({
        "issues": [{"type": "style", "severity": "warning", "message": "naming"}],
        "summary": "style nit",
        "score": 80,
    })
    .to_string();
    let mut markers = HashMap::new();
    markers.insert("File: a.go", response_a);
    markers.insert("File: b.go", response_b);
    let stub = spawn_stub_ollama(markers, serde_json::json!({"issues": [], "summary": "", "score": 100}).to_string(), None).await;

    let cache_dir = tempfile::tempdir().unwrap();
    let config = base_config(&fixture.repo_path, cache_dir.path(), &stub.base_url);
    let provider = provider_for(&config);
    let rules = critique_rules::Rules::default();
    let cache = CacheHandle::new(&config.cache);
    let history = critique_history::HistoryStore::open(":memory:").await.unwrap();
    let commit_store = critique_commits::CommitStore::new(&fixture.repo_path);

    let result = run_review(
        &config,
        ReviewInput::Commit(head_commit.to_string()),
        &provider,
        &rules,
        &cache,
        Some(&history),
        Some(&commit_store),
        None,
        CancellationToken::new(),
    )
    .await
    .expect("run_review succeeds");

    assert_eq!(result.total_issues, 2);
    assert_eq!(result.severity_totals.critical, 1);
    assert_eq!(result.severity_totals.warning, 1);
    assert!(result.has_critical_issue());

    let loaded = commit_store.load(&head_commit.to_string()).await.expect("commit analysis archived");
    assert_eq!(loaded.summary.total_issues, 2);
}

/// Scenario: cache hit on re-run. Running the same staged diff twice in one
/// process must not call the provider a second time, and must return a
/// bit-equal result.
#[tokio::test]
async fn cache_hit_on_rerun() {
    let fixture = init_repo();
    std::fs::write(fixture.repo_path.join("sum.go"), "package main\n\nfunc sum(a int, b int) int {\n\treturn a + b\n}\n").unwrap();
    commit_all(&fixture, "initial");
    std::fs::write(fixture.repo_path.join("sum.go"), "package main\n\nfunc sum(a int, b int) int {\n\treturn a + b + 0\n}\n").unwrap();
    let mut index = fixture.repo.index().unwrap();
    index.add_path(std::path::Path::new("sum.go")).unwrap();
    index.write().unwrap();

    let clean = serde_json::json!({ "issues": [], "summary": "ok", "score": 95 }).to_string();
    let stub = spawn_stub_ollama(HashMap::new(), clean, None).await;

    let cache_dir = tempfile::tempdir().unwrap();
    let config = base_config(&fixture.repo_path, cache_dir.path(), &stub.base_url);
    let provider = provider_for(&config);
    let rules = critique_rules::Rules::default();
    let cache = CacheHandle::new(&config.cache);

    let first = run_review(&config, ReviewInput::Staged, &provider, &rules, &cache, None, None, None, CancellationToken::new()).await.unwrap();
    let second = run_review(&config, ReviewInput::Staged, &provider, &rules, &cache, None, None, None, CancellationToken::new()).await.unwrap();

    assert_eq!(stub.call_count.load(Ordering::SeqCst), 1, "second run must be served entirely from cache");
    assert_eq!(first.total_issues, second.total_issues);
    assert_eq!(first.overall_score, second.overall_score);
    assert!(second.files[0].from_cache);
}

/// Scenario: cancellation mid-run. Ten files, each provider call sleeps
/// 1s; cancel after 250ms. The run must still return (no crash), with at
/// least one file's `FileResult::error` naming cancellation.
#[tokio::test]
async fn cancellation_mid_run_marks_incomplete_files() {
    let fixture = init_repo();
    for i in 0..10 {
        std::fs::write(fixture.repo_path.join(format!("f{i}.go")), format!("package main\n\nfunc f{i}() {{}}\n")).unwrap();
    }
    commit_all(&fixture, "initial");
    for i in 0..10 {
        std::fs::write(fixture.repo_path.join(format!("f{i}.go")), format!("package main\n\nfunc f{i}() {{ return }}\n")).unwrap();
    }
    let mut index = fixture.repo.index().unwrap();
    index.add_all(["*"], git2::IndexAddOption::DEFAULT, None).unwrap();
    index.write().unwrap();

    let clean = serde_json::json!({ "issues": [], "summary": "ok", "score": 100 }).to_string();
    let stub = spawn_stub_ollama(HashMap::new(), clean, Some(Duration::from_secs(1))).await;

    let cache_dir = tempfile::tempdir().unwrap();
    let mut config = base_config(&fixture.repo_path, cache_dir.path(), &stub.base_url);
    config.review.max_concurrency = 10;
    config.provider.timeout_secs = 30;
    let provider = provider_for(&config);
    let rules = critique_rules::Rules::default();
    let cache = CacheHandle::new(&config.cache);

    let cancel = CancellationToken::new();
    let cancel_trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        cancel_trigger.cancel();
    });

    let started = std::time::Instant::now();
    let result = run_review(&config, ReviewInput::Staged, &provider, &rules, &cache, None, None, None, cancel).await.expect("run_review returns instead of hanging");

    assert!(started.elapsed() < Duration::from_secs(1), "cancellation must abort in-flight provider calls, not wait them out");
    assert!(result.files.iter().any(|f| f.error.as_deref() == Some("task cancelled")), "at least one file should be marked cancelled");
}
