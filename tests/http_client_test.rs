mod common;

use accrual_reconciler::model::Accrual;
use accrual_reconciler::oracle::{
    AccrualOracle, AccrualStatus, HttpAccrualClient, OracleError, OracleResponse, Resolution,
    DEFAULT_RETRY_AFTER,
};
use accrual_reconciler::retry::MAX_RETRY_AFTER;
use common::{closed_address, order, StubResponse, StubServer};
use rust_decimal_macros::dec;
use std::time::Duration;

fn client(address: &str) -> HttpAccrualClient {
    HttpAccrualClient::new(address, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_processed_order() {
    let server = StubServer::start(vec![StubResponse::json(
        r#"{"order":"12345678903","status":"PROCESSED","accrual":500}"#,
    )])
    .await;

    let response = client(&server.address)
        .fetch_status(&order("12345678903"))
        .await
        .unwrap();

    assert_eq!(
        response,
        OracleResponse::Resolved(Resolution {
            status: AccrualStatus::Processed,
            accrual: Some(Accrual::new(dec!(500)).unwrap()),
        })
    );
    assert_eq!(server.requests(), ["/api/orders/12345678903"]);
}

#[tokio::test]
async fn test_registered_order_without_accrual() {
    let server = StubServer::start(vec![StubResponse::json(
        r#"{"order":"9278923470","status":"REGISTERED"}"#,
    )])
    .await;

    let response = client(&format!("http://{}/", server.address))
        .fetch_status(&order("9278923470"))
        .await
        .unwrap();

    assert_eq!(
        response,
        OracleResponse::Resolved(Resolution {
            status: AccrualStatus::Registered,
            accrual: None,
        })
    );
}

#[tokio::test]
async fn test_rate_limited_honors_retry_after() {
    let server = StubServer::start(vec![
        StubResponse::status(429).with_header("Retry-After", "45"),
        StubResponse::status(429),
    ])
    .await;
    let client = client(&server.address);

    let first = client.fetch_status(&order("12345678903")).await.unwrap();
    assert_eq!(
        first,
        OracleResponse::RateLimited {
            retry_after: Duration::from_secs(45)
        }
    );

    // Without a usable header the default window applies.
    let second = client.fetch_status(&order("12345678903")).await.unwrap();
    assert_eq!(
        second,
        OracleResponse::RateLimited {
            retry_after: DEFAULT_RETRY_AFTER
        }
    );
}

#[tokio::test]
async fn test_oversized_retry_after_is_capped() {
    let server = StubServer::start(vec![
        StubResponse::status(429).with_header("Retry-After", "18446744073709551615"),
    ])
    .await;

    let response = client(&server.address)
        .fetch_status(&order("12345678903"))
        .await
        .unwrap();

    assert_eq!(
        response,
        OracleResponse::RateLimited {
            retry_after: MAX_RETRY_AFTER
        }
    );
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let server = StubServer::start(vec![StubResponse::status(500)]).await;

    let err = client(&server.address)
        .fetch_status(&order("12345678903"))
        .await
        .unwrap_err();

    assert_eq!(err, OracleError::UnexpectedStatus(500));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_no_content_is_transient() {
    let server = StubServer::start(vec![StubResponse::status(204)]).await;

    let err = client(&server.address)
        .fetch_status(&order("12345678903"))
        .await
        .unwrap_err();

    assert_eq!(err, OracleError::UnexpectedStatus(204));
}

#[tokio::test]
async fn test_malformed_bodies() {
    let server = StubServer::start(vec![
        StubResponse::json("not json"),
        StubResponse::json(r#"{"order":"12345678903","status":"DONE"}"#),
        StubResponse::json(r#"{"order":"79927398713","status":"PROCESSED","accrual":1}"#),
    ])
    .await;
    let client = client(&server.address);
    let number = order("12345678903");

    assert!(matches!(
        client.fetch_status(&number).await,
        Err(OracleError::MalformedBody(_))
    ));
    assert!(matches!(
        client.fetch_status(&number).await,
        Err(OracleError::MalformedBody(_))
    ));
    assert_eq!(
        client.fetch_status(&number).await,
        Err(OracleError::OrderMismatch {
            requested: "12345678903".into(),
            returned: "79927398713".into(),
        })
    );
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let address = closed_address().await;

    let err = client(&address)
        .fetch_status(&order("12345678903"))
        .await
        .unwrap_err();

    assert!(matches!(err, OracleError::Transport(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_request_timeout_is_transport_error() {
    let server = StubServer::start(vec![StubResponse::hang()]).await;
    let client = HttpAccrualClient::new(&server.address, Duration::from_millis(200)).unwrap();

    let err = client
        .fetch_status(&order("12345678903"))
        .await
        .unwrap_err();

    assert!(matches!(err, OracleError::Transport(_)));
}
