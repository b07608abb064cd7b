use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::aggregator::AggregationController;
use crate::model::Aggregation;

/// Last-query-wins wrapper for interactive callers.
///
/// Every request takes a generation ticket; a response whose ticket has been
/// superseded by a newer request is dropped.
pub struct SearchSession {
    controller: Arc<AggregationController>,
    generation: AtomicU64,
}

impl SearchSession {
    pub fn new(controller: Arc<AggregationController>) -> Self {
        Self {
            controller,
            generation: AtomicU64::new(0),
        }
    }

    pub fn controller(&self) -> &AggregationController {
        &self.controller
    }

    fn ticket(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// `None` when a newer request started before this one finished.
    pub async fn search_latest(&self, query: &str) -> Option<Aggregation> {
        let ticket = self.ticket();
        let result = self.controller.search(query).await;
        if self.is_current(ticket) {
            Some(result)
        } else {
            debug!(query, ticket, "discarding superseded search result");
            None
        }
    }

    pub async fn popular_latest(&self) -> Option<Aggregation> {
        let ticket = self.ticket();
        let result = self.controller.load_popular().await;
        if self.is_current(ticket) {
            Some(result)
        } else {
            debug!(ticket, "discarding superseded popular result");
            None
        }
    }
}
