//! End-to-end tests for esrun against a mock cluster.
//!
//! Config file → retriever → topics file → TREC run, with the cluster
//! replaced by a wiremock server.

use esrun::{EsrunConfig, RunFormat};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_cluster() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cluster_name": "e2e",
            "version": {"number": "8.13.0"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/news/_search"))
        .and(body_partial_json(json!({"query": {"multi_match": {"query": "solar eclipse"}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": {"hits": [
                {"_id": "n1", "_score": 1.5, "_source": {"meta": {"title": "Partial"}}},
                {"_id": "n2", "_score": 6.0, "_source": {"meta": {"title": "Total"}}}
            ]}
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/news/_search"))
        .and(body_partial_json(json!({"query": {"multi_match": {"query": "unknown"}}})))
        .respond_with(ResponseTemplate::new(500).set_body_string("shard failure"))
        .mount(&server)
        .await;

    server
}

fn write_config(dir: &TempDir, url: &str) -> EsrunConfig {
    let path = dir.path().join("esrun.toml");
    let text = format!(
        r#"
        [connection]
        url = "{url}"

        [retrieve]
        index = "news"
        fields = ["headline", "body"]
        num_results = 5

        [retrieve.columns]
        "meta.title" = "title"
        "#
    );
    std::fs::write(&path, text).expect("write config");
    EsrunConfig::from_file(&path).expect("load config")
}

#[tokio::test]
async fn tsv_topics_to_trec_run() {
    let server = mock_cluster().await;
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(&dir, &server.uri());

    let topics_path = dir.path().join("topics.tsv");
    std::fs::write(&topics_path, "401\tsolar eclipse\n").expect("write topics");
    let topics = esrun::topics::read_topics(&topics_path).expect("topics");

    let retriever = esrun::build_retriever(&config).await.expect("retriever");
    let mut out = Vec::new();
    let rows = esrun::run_topics(&retriever, &topics, &mut out, RunFormat::Trec, "bm25", false)
        .await
        .expect("run");

    assert_eq!(rows, 2);
    assert_eq!(
        String::from_utf8(out).expect("utf8"),
        "401 Q0 n2 0 6.0 bm25\n401 Q0 n1 1 1.5 bm25\n"
    );
}

#[tokio::test]
async fn failing_query_aborts_unless_isolated() {
    let server = mock_cluster().await;
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(&dir, &server.uri());
    let topics = esrun::topics::parse_tsv("1\tunknown\n2\tsolar eclipse\n").expect("topics");
    let retriever = esrun::build_retriever(&config).await.expect("retriever");

    let mut out = Vec::new();
    let err = esrun::run_topics(&retriever, &topics, &mut out, RunFormat::Trec, "t", false)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("500"));
    assert!(out.is_empty());

    let mut out = Vec::new();
    let rows = esrun::run_topics(&retriever, &topics, &mut out, RunFormat::Jsonl, "t", true)
        .await
        .expect("isolated run");
    assert_eq!(rows, 2);
    let first: serde_json::Value =
        serde_json::from_str(String::from_utf8(out).expect("utf8").lines().next().unwrap_or_default())
            .expect("json");
    assert_eq!(first["qid"], "2");
    assert_eq!(first["title"], "Total");
}

#[tokio::test]
async fn fingerprint_is_stable_across_connections() {
    let server = mock_cluster().await;
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(&dir, &server.uri());

    let a = esrun::build_retriever(&config).await.expect("retriever");
    let b = esrun::build_retriever(&config).await.expect("retriever");
    assert_eq!(a.fingerprint(), b.fingerprint());
}
