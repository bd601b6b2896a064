use crate::model::OrderNumber;
use crate::sink::{OrderRecord, ResolutionSink, SinkError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory ledger of order statuses.
///
/// Clones share the same map. A record that reached a terminal status is never
/// moved back to a nonterminal one; such writes fail with
/// [`SinkError::TerminalDowngrade`].
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    records: Arc<RwLock<HashMap<OrderNumber, OrderRecord>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ResolutionSink for InMemoryLedger {
    async fn upsert(&self, record: OrderRecord) -> Result<(), SinkError> {
        let mut records = self.records.write().await;
        if let Some(stored) = records.get(&record.number) {
            if stored.status.is_terminal() && !record.status.is_terminal() {
                return Err(SinkError::TerminalDowngrade {
                    order: record.number.to_string(),
                    stored: stored.status,
                    incoming: record.status,
                });
            }
        }
        records.insert(record.number.clone(), record);
        Ok(())
    }

    async fn get(&self, number: &OrderNumber) -> Result<Option<OrderRecord>, SinkError> {
        let records = self.records.read().await;
        Ok(records.get(number).cloned())
    }

    async fn all(&self) -> Result<Vec<OrderRecord>, SinkError> {
        let records = self.records.read().await;
        let mut all: Vec<OrderRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(all)
    }
}
