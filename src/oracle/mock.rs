//! # Mock Oracle & Testing Guide
//!
//! [`MockAccrualOracle`] implements [`AccrualOracle`] entirely in memory. Tests queue
//! up the replies the oracle should give, hand the mock to a worker, and afterwards
//! check which orders were actually requested.
//!
//! ## When to use the Mock vs the HTTP client
//!
//! | Feature | MockAccrualOracle | HttpAccrualClient + stub server |
//! |---------|-------------------|---------------------------------|
//! | **Speed** | Instant | Real sockets |
//! | **Time control** | Works with paused tokio time | Real timeouts |
//! | **Use case** | Worker, retry and reconciler behaviour | Wire format and status-code mapping |
//! | **Error injection** | `return_err`, `hang` | Requires canned HTTP responses |
//!
//! ## Example
//!
//! ```rust
//! use accrual_reconciler::model::OrderNumber;
//! use accrual_reconciler::oracle::mock::MockAccrualOracle;
//! use accrual_reconciler::oracle::{AccrualOracle, AccrualStatus, OracleResponse};
//!
//! #[tokio::main]
//! async fn main() {
//!     let order = OrderNumber::parse("12345678903").unwrap();
//!     let mock = MockAccrualOracle::new();
//!     mock.expect_fetch(order.clone())
//!         .return_resolved(AccrualStatus::Processing, None);
//!
//!     let response = mock.fetch_status(&order).await.unwrap();
//!     assert!(matches!(response, OracleResponse::Resolved(_)));
//!
//!     mock.verify();
//! }
//! ```
//!
//! Replies are queued per order and consumed in the order they were queued, so
//! tests with several orders do not depend on which one a worker polls first.
//! Requests for an order with no reply left are answered with a transient [`OracleError::Transport`] and
//! reported by [`MockAccrualOracle::verify`].

use crate::model::{Accrual, OrderNumber};
use crate::oracle::{AccrualOracle, AccrualStatus, OracleError, OracleResponse, Resolution};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

enum Reply {
    Respond(Result<OracleResponse, OracleError>),
    /// Never answers; the caller has to give up on its own.
    Hang,
}

struct Expectation {
    order: OrderNumber,
    reply: Reply,
}

#[derive(Default)]
struct MockState {
    expectations: VecDeque<Expectation>,
    calls: Vec<OrderNumber>,
    unexpected: Vec<OrderNumber>,
}

/// An [`AccrualOracle`] with expectation tracking for fluent testing.
///
/// Clones share state, so a test can keep one handle while a worker owns another.
#[derive(Clone, Default)]
pub struct MockAccrualOracle {
    state: Arc<Mutex<MockState>>,
}

impl MockAccrualOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for the next request for `order`.
    pub fn expect_fetch(&self, order: OrderNumber) -> FetchExpectationBuilder {
        FetchExpectationBuilder {
            order,
            state: self.state.clone(),
        }
    }

    /// Every order requested so far, in request order.
    pub fn calls(&self) -> Vec<OrderNumber> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    /// Verifies that all expectations were met and nothing unexpected was requested.
    pub fn verify(&self) {
        let state = self.state.lock().unwrap();
        if !state.unexpected.is_empty() {
            panic!("Unexpected oracle requests: {:?}", state.unexpected);
        }
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }
}

#[async_trait]
impl AccrualOracle for MockAccrualOracle {
    async fn fetch_status(&self, order: &OrderNumber) -> Result<OracleResponse, OracleError> {
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(order.clone());
            let position = state
                .expectations
                .iter()
                .position(|exp| &exp.order == order);
            match position {
                Some(index) => state.expectations.remove(index).map(|exp| exp.reply),
                None => {
                    state.unexpected.push(order.clone());
                    None
                }
            }
        };

        match reply {
            Some(Reply::Respond(response)) => response,
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(OracleError::Transport(format!(
                "no mock expectation for order {order}"
            ))),
        }
    }
}

/// Builder for `fetch_status` expectations.
pub struct FetchExpectationBuilder {
    order: OrderNumber,
    state: Arc<Mutex<MockState>>,
}

impl FetchExpectationBuilder {
    fn push(self, reply: Reply) {
        let mut state = self.state.lock().unwrap();
        state.expectations.push_back(Expectation {
            order: self.order,
            reply,
        });
    }

    /// Answers with a 200 carrying `status` and `accrual`.
    pub fn return_resolved(self, status: AccrualStatus, accrual: Option<Accrual>) {
        self.push(Reply::Respond(Ok(OracleResponse::Resolved(Resolution {
            status,
            accrual,
        }))));
    }

    /// Answers with a 429 and `Retry-After: seconds`.
    pub fn return_rate_limited(self, seconds: u64) {
        self.push(Reply::Respond(Ok(OracleResponse::RateLimited {
            retry_after: Duration::from_secs(seconds),
        })));
    }

    pub fn return_err(self, error: OracleError) {
        self.push(Reply::Respond(Err(error)));
    }

    /// The request never completes.
    pub fn hang(self) {
        self.push(Reply::Hang);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(raw: &str) -> OrderNumber {
        OrderNumber::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_mock_with_expectations() {
        let mock = MockAccrualOracle::new();
        mock.expect_fetch(order("12345678903")).return_rate_limited(45);
        mock.expect_fetch(order("12345678903"))
            .return_err(OracleError::UnexpectedStatus(500));

        let first = mock.fetch_status(&order("12345678903")).await.unwrap();
        assert_eq!(
            first,
            OracleResponse::RateLimited {
                retry_after: Duration::from_secs(45)
            }
        );
        let second = mock.fetch_status(&order("12345678903")).await;
        assert_eq!(second, Err(OracleError::UnexpectedStatus(500)));

        assert_eq!(mock.call_count(), 2);
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected oracle requests")]
    async fn test_mock_flags_unexpected_requests() {
        let mock = MockAccrualOracle::new();
        mock.expect_fetch(order("12345678903")).return_rate_limited(1);

        let result = mock.fetch_status(&order("79927398713")).await;
        assert!(matches!(result, Err(OracleError::Transport(_))));
        mock.verify();
    }
}
