use reqwest::StatusCode;
use std::time::Duration;
use trawl_http::{HttpClient, HttpError, RequestOpts};
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    HttpClient::new(&format!("{}/", server.uri())).expect("mock base url parses")
}

#[tokio::test]
async fn returns_body_text_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(query_param("lang", "en"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Title\n\nbody"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let body = client
        .get_text("page?lang=en", RequestOpts::default())
        .await
        .unwrap();

    assert_eq!(body, "# Title\n\nbody");
}

#[tokio::test]
async fn empty_success_body_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let body = client.get_text("empty", RequestOpts::default()).await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn non_success_status_maps_to_api_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("x-request-id", "abc-123")
                .set_body_string(r#"{"message":"slow down"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_text("limited", RequestOpts::default())
        .await
        .unwrap_err();

    match &err {
        HttpError::Api {
            status,
            message,
            request_id,
        } => {
            assert_eq!(*status, StatusCode::TOO_MANY_REQUESTS);
            assert_eq!(message, "slow down");
            assert_eq!(request_id, "abc-123");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    // Nothing listens on port 1; the connection is refused.
    let client = HttpClient::new("http://127.0.0.1:1/").unwrap();
    let err = client
        .get_text("gone", RequestOpts::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Network(_)), "got {err:?}");
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn absolute_target_ignores_base() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new("http://127.0.0.1:1/").unwrap();
    let body = client
        .get_text(&format!("{}/direct", server.uri()), RequestOpts::absolute())
        .await
        .unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn slow_response_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).with_timeout(Duration::from_millis(100));
    let err = client
        .get_text("slow", RequestOpts::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Network(_)), "got {err:?}");
}

#[test]
fn rejects_invalid_base() {
    let err = HttpClient::new("not a url").unwrap_err();
    assert!(matches!(err, HttpError::Url(_)));
}
