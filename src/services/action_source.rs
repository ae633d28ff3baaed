use async_trait::async_trait;

use crate::domain::query::QueryResponse;
use crate::error::AppResult;

/// Systems-management platform answering relevance queries.
///
/// Transport failures are errors; any HTTP status comes back as a response
/// so the caller can record it before deciding what to do.
#[async_trait]
pub trait ActionSource: Send + Sync {
    async fn run_query(&self, relevance: &str) -> AppResult<QueryResponse>;
}
