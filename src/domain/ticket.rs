use serde::{Deserialize, Serialize};

use crate::domain::failure::FailureRecord;

pub const INCIDENT_URGENCY: &str = "2";

/// Body of a ServiceNow incident creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPayload {
    pub description: String,
    pub short_description: String,
    pub urgency: String,
    pub cmdb_ci: String,
}

impl TicketPayload {
    pub fn for_failure(record: &FailureRecord) -> Self {
        let description = format!(
            "BigFix action failed for endpoint {computer}. The BigFix action {action} id {action_id} \
             failed for computer {computer} id {computer_id} with status {status}. \
             Sub action {sub_action} id {sub_action_id} was the first failed item.",
            computer = record.computer_name,
            action = record.action_name,
            action_id = record.action_id,
            computer_id = record.computer_id,
            status = record.status,
            sub_action = record.sub_action_name,
            sub_action_id = record.sub_action_id,
        );

        Self {
            description,
            short_description: format!(
                "Action ({}){} failed for {}",
                record.action_id, record.action_name, record.computer_name
            ),
            urgency: INCIDENT_URGENCY.to_string(),
            cmdb_ci: record.computer_name.clone(),
        }
    }
}

/// What the service desk answered to a successful creation request.
#[derive(Debug, Clone)]
pub struct IncidentReceipt {
    pub status: u16,
    pub body: String,
}
