#![allow(dead_code)]

use accrual_reconciler::model::OrderNumber;
use axum::extract::{Path, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub fn order(raw: &str) -> OrderNumber {
    OrderNumber::parse(raw).unwrap()
}

/// A scripted reply of the stub accrual system.
pub struct StubResponse {
    status: StatusCode,
    headers: Vec<(&'static str, String)>,
    body: String,
    hang: bool,
}

impl StubResponse {
    pub fn status(status: u16) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            headers: Vec::new(),
            body: String::new(),
            hang: false,
        }
    }

    pub fn json(body: &str) -> Self {
        Self {
            body: body.to_string(),
            ..Self::status(200)
        }
        .with_header("content-type", "application/json")
    }

    /// The request is accepted and never answered.
    pub fn hang() -> Self {
        Self {
            hang: true,
            ..Self::status(200)
        }
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }
}

impl IntoResponse for StubResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        for (name, value) in self.headers {
            response.headers_mut().insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(&value).unwrap(),
            );
        }
        response
    }
}

#[derive(Clone, Default)]
struct StubState {
    replies: Arc<Mutex<VecDeque<StubResponse>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

async fn order_status(State(state): State<StubState>, Path(number): Path<String>) -> Response {
    state
        .requests
        .lock()
        .unwrap()
        .push(format!("/api/orders/{number}"));
    let reply = state.replies.lock().unwrap().pop_front();
    match reply {
        Some(reply) if reply.hang => std::future::pending::<Response>().await,
        Some(reply) => reply.into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Accrual system stand-in serving scripted replies in order, one per request.
/// Requests past the end of the script get a 500.
pub struct StubServer {
    pub address: String,
    state: StubState,
    handle: JoinHandle<()>,
}

impl StubServer {
    pub async fn start(replies: Vec<StubResponse>) -> Self {
        let state = StubState::default();
        state.replies.lock().unwrap().extend(replies);

        let app = Router::new()
            .route("/api/orders/:number", get(order_status))
            .with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let address = listener.local_addr().unwrap().to_string();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            address,
            state,
            handle,
        }
    }

    /// Paths requested so far, e.g. `/api/orders/12345678903`.
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// An address nothing is listening on.
pub async fn closed_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    drop(listener);
    address
}
