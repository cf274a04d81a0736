use httpmock::prelude::*;
use simple_cards::adapters::quizlet::DEFAULT_USER_AGENT;
use simple_cards::core::{QuizletCard, QuizletModuleParser};
use simple_cards::{CardsError, QuizletParser, QuizletSettings};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const ITEMS_PATH: &str = "/webapi/3.4/studiable-item-documents";

fn settings(base_url: String, fetch_attempts: u32) -> QuizletSettings {
    QuizletSettings {
        base_url,
        fetch_attempts,
        retry_delay: Duration::from_millis(10),
        timeout: Duration::from_secs(5),
        ..QuizletSettings::default()
    }
}

fn studiable_items_body() -> serde_json::Value {
    serde_json::json!({
        "responses": [{
            "models": {
                "studiableItem": [
                    {
                        "id": 1,
                        "cardSides": [
                            { "sideId": 0, "label": "word", "media": [{ "type": 1, "plainText": "cat" }] },
                            { "sideId": 1, "label": "definition", "media": [{ "type": 1, "plainText": "gato" }] }
                        ]
                    },
                    {
                        "id": 2,
                        "cardSides": [
                            { "sideId": 0, "label": "word", "media": [{ "type": 1, "plainText": "orphan" }] }
                        ]
                    }
                ]
            }
        }]
    })
}

#[tokio::test]
async fn test_parse_extracts_cards() {
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path(ITEMS_PATH)
            .query_param("filters[studiableContainerId]", "768736583")
            .query_param("filters[studiableContainerType]", "1")
            .query_param("perPage", "1000")
            .query_param("page", "1")
            .header("user-agent", DEFAULT_USER_AGENT);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(studiable_items_body());
    });

    let parser = QuizletParser::with_settings(settings(server.url("/webapi/3.4"), 10)).unwrap();
    let cards = parser
        .parse("768736583", &CancellationToken::new())
        .await
        .unwrap();

    api_mock.assert();
    assert_eq!(
        cards,
        vec![QuizletCard {
            front: "cat".to_string(),
            back: "gato".to_string()
        }]
    );
}

#[tokio::test]
async fn test_empty_responses_is_parse_error() {
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(GET).path(ITEMS_PATH);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "responses": [] }));
    });

    let parser = QuizletParser::with_settings(settings(server.url("/webapi/3.4"), 10)).unwrap();
    let result = parser.parse("42", &CancellationToken::new()).await;

    api_mock.assert();
    assert!(matches!(result, Err(CardsError::ModuleParseError { id }) if id == "42"));
}

#[tokio::test]
async fn test_forbidden_exhausts_attempt_budget() {
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(GET).path(ITEMS_PATH);
        then.status(403);
    });

    let parser = QuizletParser::with_settings(settings(server.url("/webapi/3.4"), 3)).unwrap();
    let result = parser.parse("42", &CancellationToken::new()).await;

    api_mock.assert_hits(3);
    assert!(matches!(result, Err(CardsError::ModuleFetchError { id }) if id == "42"));
}

#[tokio::test]
async fn test_other_error_status_is_not_retried() {
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(GET).path(ITEMS_PATH);
        then.status(500).body("internal error");
    });

    let parser = QuizletParser::with_settings(settings(server.url("/webapi/3.4"), 5)).unwrap();
    let result = parser.parse("42", &CancellationToken::new()).await;

    api_mock.assert_hits(1);
    assert!(matches!(result, Err(CardsError::ApiError(_))));
}

#[tokio::test]
async fn test_cancellation_interrupts_retry_sleep() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path(ITEMS_PATH);
        then.status(403);
    });

    let parser = QuizletParser::with_settings(QuizletSettings {
        retry_delay: Duration::from_secs(30),
        ..settings(server.url("/webapi/3.4"), 10)
    })
    .unwrap();

    let cancel = CancellationToken::new();
    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        })
    };

    let result = tokio::time::timeout(Duration::from_secs(5), parser.parse("42", &cancel))
        .await
        .expect("parse did not observe cancellation");

    canceller.await.unwrap();
    assert!(matches!(result, Err(CardsError::Cancelled)));
}

/// Minimal HTTP/1.1 server answering one canned response per connection, in order.
async fn spawn_stub_server(responses: Vec<String>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/webapi/3.4", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));

    let seen = Arc::clone(&requests);
    tokio::spawn(async move {
        for response in responses {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let read = socket.read(&mut chunk).await.unwrap();
                if read == 0 {
                    break;
                }
                head.extend_from_slice(&chunk[..read]);
            }
            seen.lock()
                .unwrap()
                .push(String::from_utf8_lossy(&head).to_lowercase());

            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
    });

    (base_url, requests)
}

fn forbidden_with_cookie() -> String {
    "HTTP/1.1 403 Forbidden\r\nSet-Cookie: qlts=1_abc; Path=/\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        .to_string()
}

fn ok_json(body: &serde_json::Value) -> String {
    let body = body.to_string();
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

#[tokio::test]
async fn test_retry_then_success_uses_three_attempts_and_keeps_cookies() {
    let (base_url, requests) = spawn_stub_server(vec![
        forbidden_with_cookie(),
        forbidden_with_cookie(),
        ok_json(&studiable_items_body()),
    ])
    .await;

    let parser = QuizletParser::with_settings(settings(base_url, 10)).unwrap();
    let cards = parser.parse("768736583", &CancellationToken::new()).await.unwrap();

    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].front, "cat");

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].starts_with("get /webapi/3.4/studiable-item-documents?"));
    assert!(requests[0].contains(&format!("user-agent: {}", DEFAULT_USER_AGENT.to_lowercase())));
    assert!(!requests[0].contains("qlts=1_abc"));
    assert!(requests[1].contains("qlts=1_abc"));
    assert!(requests[2].contains("qlts=1_abc"));
}
