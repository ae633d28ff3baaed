use async_trait::async_trait;

use crate::domain::ticket::{IncidentReceipt, TicketPayload};
use crate::error::AppResult;

/// Service desk that turns a payload into an incident.
///
/// A non-2xx answer is an `AppError::Ticketing`, never a receipt.
#[async_trait]
pub trait IncidentTracker: Send + Sync {
    async fn create_incident(&self, payload: &TicketPayload) -> AppResult<IncidentReceipt>;
}
