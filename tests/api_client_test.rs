use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use porssisahko::PorssisahkoError;
use porssisahko::api::{PorssisahkoClient, PriceSource};
use porssisahko::config::ApiConfig;

const BODY: &str = r#"{"prices":[
    {"price": 5.01, "startDate": "2024-11-06T21:00:00.000Z", "endDate": "2024-11-06T22:00:00.000Z"},
    {"price": 7.25, "startDate": "2024-11-06T20:00:00.000Z", "endDate": "2024-11-06T21:00:00.000Z"}
]}"#;

/// Serve a fake price API on an ephemeral port and return its base URL
async fn fake_api() -> String {
    let router = Router::new()
        .route("/v1/latest-prices.json", get(|| async { BODY }))
        .route(
            "/down",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/moved", get(|| async { (StatusCode::NO_CONTENT, "") }))
        .route("/garbage", get(|| async { "{\"prices\": [" }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(url: String) -> PorssisahkoClient {
    let cfg = ApiConfig {
        url,
        ..ApiConfig::default()
    };
    PorssisahkoClient::new(&cfg).unwrap()
}

#[tokio::test]
async fn fetches_and_parses_records_in_order() {
    let base = fake_api().await;
    let c = client(format!("{base}/v1/latest-prices.json"));
    let records = c.latest_prices().await.unwrap();
    assert_eq!(records.len(), 2);
    assert!((records[0].price_cents_per_kwh - 5.01).abs() < 1e-9);
    assert!(records[0].start_time > records[1].start_time);
}

#[tokio::test]
async fn server_error_is_an_error() {
    let base = fake_api().await;
    let err = client(format!("{base}/down")).latest_prices().await.unwrap_err();
    assert!(matches!(err, PorssisahkoError::HttpStatus { status: 500 }));
}

#[tokio::test]
async fn any_non_200_is_an_error() {
    let base = fake_api().await;
    let err = client(format!("{base}/moved")).latest_prices().await.unwrap_err();
    assert!(matches!(err, PorssisahkoError::HttpStatus { status: 204 }));

    let err = client(format!("{base}/missing")).latest_prices().await.unwrap_err();
    assert!(matches!(err, PorssisahkoError::HttpStatus { status: 404 }));
}

#[tokio::test]
async fn malformed_json_is_an_error() {
    let base = fake_api().await;
    let err = client(format!("{base}/garbage")).latest_prices().await.unwrap_err();
    assert!(matches!(err, PorssisahkoError::Serialization { .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    // Bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let err = client(format!("http://{addr}/x")).latest_prices().await.unwrap_err();
    assert!(matches!(err, PorssisahkoError::Network { .. }));
}
