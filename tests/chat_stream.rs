use std::collections::HashMap;
use std::sync::Arc;

use fixit_agent::handlers::create_app_router;
use fixit_agent::{AppState, Config};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FALLBACK: &str = "Follow the images carefully for this step.";

/// Serves the app on an ephemeral port against the given upstream.
async fn spawn_app(upstream: &MockServer) -> String {
    let vars: HashMap<&str, String> = HashMap::from([
        ("IFIXIT_API_URL", upstream.uri()),
        ("IFIXIT_IMAGE_URL", "https://img.test/igi".to_string()),
    ]);
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    let state = Arc::new(AppState::new(&config).unwrap());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_app_router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Splits an SSE body into the text of each `data:` event.
fn sse_events(body: &str) -> Vec<String> {
    body.split("\n\n")
        .filter_map(|frame| {
            let data: Vec<&str> = frame
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
                .collect();
            (!data.is_empty()).then(|| data.join("\n"))
        })
        .collect()
}

async fn post_query(base: &str, body: serde_json::Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/chat/stream", base))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn streams_guide_end_to_end() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/iPhone%2012"))
        .and(query_param("filter", "device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "title": "iPhone 12",
                "url": "https://www.ifixit.com/Device/iPhone_12",
                "dataType": "wiki"
            }]
        })))
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/wikis/CATEGORY/iPhone_12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "guides": [{
                "guideid": 4242,
                "title": "iPhone 12 Screen Replacement",
                "url": "https://www.ifixit.com/Guide/iPhone+12+Screen+Replacement/4242"
            }]
        })))
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/guides/4242"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "guideid": 4242,
            "steps": [
                {
                    "title": "Remove the pentalobe screws",
                    "tasks": [{
                        "body": "Power off your iPhone before you begin.",
                        "lines": [
                            { "text_raw": "Remove the two screws.", "media": { "type": "image", "data": [{ "guid": "screws" }] } },
                            { "media": { "type": "image", "data": [{ "guid": "screws" }, { "guid": "bottom" }] } }
                        ]
                    }]
                },
                { "summary": "" }
            ]
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let base = spawn_app(&upstream).await;
    let resp = post_query(&base, json!({ "query": "iPhone 12 screen" })).await;

    assert_eq!(resp.status(), 200);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let events = sse_events(&resp.text().await.unwrap());
    assert_eq!(events.len(), 6, "events: {:#?}", events);

    assert!(events[0].starts_with("🔍") && events[0].contains("iPhone 12"));
    assert!(events[1].contains("Found device") && events[1].contains("iPhone 12"));
    assert!(events[2].contains("Loading guide") && events[2].contains("iPhone 12 Screen Replacement"));

    assert!(events[3].starts_with("### Step 1: Remove the pentalobe screws"));
    assert!(events[3].contains("Power off your iPhone before you begin.\nRemove the two screws."));
    let image_lines: Vec<&str> = events[3].lines().filter(|l| l.starts_with("![image](")).collect();
    assert_eq!(
        image_lines,
        vec![
            "![image](https://img.test/igi/screws.full)",
            "![image](https://img.test/igi/bottom.full)"
        ]
    );

    assert!(events[4].starts_with("### Step 2: Step 2"));
    assert!(events[4].contains(FALLBACK));
    assert!(!events[4].contains("![image]"));

    assert!(events[5].contains("completed"));
}

#[tokio::test]
async fn not_found_is_single_terminal_chunk() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/search/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/(guides|wikis)/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let base = spawn_app(&upstream).await;
    let resp = post_query(&base, json!({ "query": "Zune HD dead pixel" })).await;
    assert_eq!(resp.status(), 200);

    let events = sse_events(&resp.text().await.unwrap());
    assert_eq!(events.len(), 2, "events: {:#?}", events);
    assert!(events[1].contains("No repair guides found"));
}

#[tokio::test]
async fn upstream_failure_sends_explanation_and_closes() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&upstream)
        .await;

    let base = spawn_app(&upstream).await;
    let resp = post_query(&base, json!({ "query": "Pixel 7" })).await;
    assert_eq!(resp.status(), 200);

    let events = sse_events(&resp.text().await.unwrap());
    assert_eq!(events.len(), 2, "events: {:#?}", events);
    assert!(events[1].contains("Could not load the repair guide"));
}

#[tokio::test]
async fn rejects_missing_or_blank_query() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;
    let base = spawn_app(&upstream).await;

    for body in [json!({}), json!({ "query": "   " }), json!({ "query": 12 })] {
        let resp = post_query(&base, body.clone()).await;
        assert_eq!(resp.status(), 400, "body: {}", body);
        let error: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(error["error"]["code"], "BadRequest");
    }
}

#[tokio::test]
async fn health_check_reports_ok() {
    let upstream = MockServer::start().await;
    let base = spawn_app(&upstream).await;

    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}
