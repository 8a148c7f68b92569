use std::time::{Duration, Instant};

use serde_json::json;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::oneshot,
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use folio::profile::{
    GithubHttpSource, ProfileErrorKind, ProfileSource, Username, credentials::ResolvedCredential,
};

struct StubResponse {
    status_line: &'static str,
    extra_headers: Vec<(&'static str, String)>,
    body: String,
    delay: Duration,
}

impl StubResponse {
    fn json(status_line: &'static str, body: serde_json::Value) -> Self {
        Self {
            status_line,
            extra_headers: Vec::new(),
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }
}

struct StubServer {
    base_url: String,
    request: oneshot::Receiver<String>,
    task: JoinHandle<()>,
}

/// Serves exactly one HTTP/1.1 response and hands back the raw request head.
async fn serve_once(response: StubResponse) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub listener address");
    let (request_tx, request_rx) = oneshot::channel();

    let task = tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };

        let mut head = Vec::new();
        let mut buf = [0_u8; 1024];
        while !head.windows(4).any(|window| window == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(read) => head.extend_from_slice(&buf[..read]),
            }
        }
        let _ = request_tx.send(String::from_utf8_lossy(&head).into_owned());

        tokio::time::sleep(response.delay).await;

        let mut raw = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n",
            response.status_line,
            response.body.len()
        );
        for (name, value) in &response.extra_headers {
            raw.push_str(&format!("{name}: {value}\r\n"));
        }
        raw.push_str("\r\n");
        raw.push_str(&response.body);
        let _ = socket.write_all(raw.as_bytes()).await;
        let _ = socket.shutdown().await;
    });

    StubServer {
        base_url: format!("http://{addr}"),
        request: request_rx,
        task,
    }
}

fn source(base_url: &str, timeout: Duration, credential: ResolvedCredential) -> GithubHttpSource {
    GithubHttpSource::new(base_url, timeout, credential).expect("http source builds")
}

fn octocat() -> Username {
    Username::parse("octocat").expect("valid username")
}

#[tokio::test]
async fn given_success_response_when_fetching_then_payload_and_headers_are_sent() {
    let server = serve_once(StubResponse::json(
        "200 OK",
        json!({"login": "octocat", "name": "The Octocat"}),
    ))
    .await;
    let source = source(
        &server.base_url,
        Duration::from_secs(5),
        ResolvedCredential::bearer("ghp_test"),
    )
    .with_user_agent("folio-test");

    let payload = source
        .fetch_profile(&octocat(), &CancellationToken::new())
        .await
        .expect("fetch should succeed");
    assert_eq!(payload["login"], "octocat");

    let request = server
        .request
        .await
        .expect("stub captured the request")
        .to_ascii_lowercase();
    assert!(request.starts_with("get /users/octocat http/1.1"), "{request}");
    assert!(request.contains("authorization: bearer ghp_test"));
    assert!(request.contains("accept: application/vnd.github+json"));
    assert!(request.contains("user-agent: folio-test"));
    server.task.abort();
}

#[tokio::test]
async fn given_anonymous_credential_when_fetching_then_no_authorization_header_is_sent() {
    let server = serve_once(StubResponse::json("200 OK", json!({"login": "octocat"}))).await;
    let source = source(
        &server.base_url,
        Duration::from_secs(5),
        ResolvedCredential::none(),
    );

    source
        .fetch_profile(&octocat(), &CancellationToken::new())
        .await
        .expect("fetch should succeed");

    let request = server
        .request
        .await
        .expect("stub captured the request")
        .to_ascii_lowercase();
    assert!(!request.contains("authorization:"));
    server.task.abort();
}

#[tokio::test]
async fn given_forbidden_with_reset_header_when_fetching_then_error_is_rate_limited() {
    let mut response = StubResponse::json(
        "403 Forbidden",
        json!({"message": "API rate limit exceeded for 127.0.0.1."}),
    );
    response
        .extra_headers
        .push(("x-ratelimit-reset", "1700000000".to_string()));
    let server = serve_once(response).await;
    let source = source(
        &server.base_url,
        Duration::from_secs(5),
        ResolvedCredential::none(),
    );

    let err = source
        .fetch_profile(&octocat(), &CancellationToken::new())
        .await
        .expect_err("403 is an error");

    assert_eq!(err.kind, ProfileErrorKind::RateLimited);
    assert_eq!(err.http_status, Some(403));
    assert_eq!(err.rate_limit_reset, Some(1_700_000_000));
    assert!(err.message.contains("API rate limit exceeded"));
    server.task.abort();
}

#[tokio::test]
async fn given_not_found_when_fetching_then_error_is_not_found() {
    let server = serve_once(StubResponse::json(
        "404 Not Found",
        json!({"message": "Not Found"}),
    ))
    .await;
    let source = source(
        &server.base_url,
        Duration::from_secs(5),
        ResolvedCredential::none(),
    );

    let err = source
        .fetch_profile(&octocat(), &CancellationToken::new())
        .await
        .expect_err("404 is an error");

    assert_eq!(err.kind, ProfileErrorKind::NotFound);
    assert_eq!(err.http_status, Some(404));
    server.task.abort();
}

#[tokio::test]
async fn given_invalid_json_body_when_fetching_then_error_is_malformed_response() {
    let server = serve_once(StubResponse {
        status_line: "200 OK",
        extra_headers: Vec::new(),
        body: "{not json".to_string(),
        delay: Duration::ZERO,
    })
    .await;
    let source = source(
        &server.base_url,
        Duration::from_secs(5),
        ResolvedCredential::none(),
    );

    let err = source
        .fetch_profile(&octocat(), &CancellationToken::new())
        .await
        .expect_err("body is not json");

    assert_eq!(err.kind, ProfileErrorKind::MalformedResponse);
    server.task.abort();
}

#[tokio::test]
async fn given_slow_server_when_timeout_elapses_then_error_is_timeout() {
    let mut response = StubResponse::json("200 OK", json!({"login": "octocat"}));
    response.delay = Duration::from_secs(2);
    let server = serve_once(response).await;
    let source = source(
        &server.base_url,
        Duration::from_millis(100),
        ResolvedCredential::none(),
    );

    let err = source
        .fetch_profile(&octocat(), &CancellationToken::new())
        .await
        .expect_err("request should time out");

    assert_eq!(err.kind, ProfileErrorKind::Timeout);
    server.task.abort();
}

#[tokio::test]
async fn given_slow_server_when_token_is_cancelled_then_fetch_returns_cancelled_promptly() {
    let mut response = StubResponse::json("200 OK", json!({"login": "octocat"}));
    response.delay = Duration::from_secs(5);
    let server = serve_once(response).await;
    let source = source(
        &server.base_url,
        Duration::from_secs(10),
        ResolvedCredential::none(),
    );
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = source
        .fetch_profile(&octocat(), &cancel)
        .await
        .expect_err("cancelled fetch is an error");

    assert_eq!(err.kind, ProfileErrorKind::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(2));
    server.task.abort();
}
