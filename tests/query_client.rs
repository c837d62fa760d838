//! Wire contract of the HTTP query service client.

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trace_web::config::QueryServiceConfig;
use trace_web::query::service::{QueryError, QueryService};
use trace_web::query::types::{Adjuster, QueryRequest, TraceId};
use trace_web::query::HttpQueryClient;

async fn client(server: &MockServer) -> HttpQueryClient {
    let config = QueryServiceConfig {
        base_url: format!("{}/query", server.uri()),
        ..Default::default()
    };
    HttpQueryClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_trace_ids_posts_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query/trace-ids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "traceIds": [1000, 2000],
            "endTs": 42
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = QueryRequest::new("web", 1_000_000, 10);
    let response = client(&server).await.get_trace_ids(&query).await.unwrap();

    assert_eq!(response.trace_ids, vec![TraceId(1000), TraceId(2000)]);
    assert_eq!(response.end_ts, 42);

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["serviceName"], "web");
    assert_eq!(body["endTs"], 1_000_000);
}

#[tokio::test]
async fn test_summaries_send_ids_and_adjusters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query/trace-summaries"))
        .and(body_json(json!({
            "traceIds": [1000],
            "adjusters": ["TIME_SKEW"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "traceId": 1000,
            "startTimestamp": 10,
            "endTimestamp": 30,
            "durationMicros": 20,
            "serviceCounts": {"web": 1}
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let summaries = client(&server)
        .await
        .get_trace_summaries_by_ids(&[TraceId(1000)], &[Adjuster::TimeSkew])
        .await
        .unwrap();

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].duration_micros, 20);
    assert_eq!(summaries[0].service_counts["web"], 1);
}

#[tokio::test]
async fn test_span_names_by_service() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query/spans"))
        .and(query_param("serviceName", "web"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["get", "put"])))
        .mount(&server)
        .await;

    let names = client(&server).await.get_span_names("web").await.unwrap();

    assert_eq!(names.len(), 2);
    assert!(names.contains("put"));
}

#[tokio::test]
async fn test_ttl_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/query/ttl/00000000000003e8"))
        .and(body_json(json!({"ttlSeconds": 5_184_000})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/query/data-ttl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(604_800)))
        .mount(&server)
        .await;

    let client = client(&server).await;
    client
        .set_trace_time_to_live(TraceId(1000), 5_184_000)
        .await
        .unwrap();
    assert_eq!(client.get_data_time_to_live().await.unwrap(), 604_800);
}

#[tokio::test]
async fn test_error_status_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query/services"))
        .respond_with(ResponseTemplate::new(503).set_body_string("storage offline"))
        .mount(&server)
        .await;

    let err = client(&server).await.get_service_names().await.unwrap_err();

    match err {
        QueryError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "storage offline");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query/dependencies"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).await.get_dependencies(None, None).await.unwrap_err();
    assert!(matches!(err, QueryError::Decode(_)));
}
