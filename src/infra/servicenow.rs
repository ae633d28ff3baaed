use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};

use crate::config::ServiceNowSettings;
use crate::domain::ticket::{IncidentReceipt, TicketPayload};
use crate::error::{AppError, AppResult};
use crate::infra::basic_auth_header;
use crate::services::IncidentTracker;

pub struct ServiceNowClient {
    http: Client,
    base_url: String,
    auth: String,
}

impl ServiceNowClient {
    pub fn new(http: Client, settings: &ServiceNowSettings) -> Self {
        Self {
            http,
            base_url: settings.base_url.clone(),
            auth: basic_auth_header(&settings.username, settings.password.expose()),
        }
    }

    fn incident_endpoint(base_url: &str) -> String {
        format!("{}/api/now/table/incident", base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl IncidentTracker for ServiceNowClient {
    async fn create_incident(&self, payload: &TicketPayload) -> AppResult<IncidentReceipt> {
        let response = self
            .http
            .post(Self::incident_endpoint(&self.base_url))
            .header(AUTHORIZATION, &self.auth)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|err| AppError::Ticketing(format!("failed to call ServiceNow: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read response>".to_string());

        if !status.is_success() {
            return Err(AppError::Ticketing(format!(
                "ServiceNow responded with {status}: {body}"
            )));
        }

        Ok(IncidentReceipt {
            status: status.as_u16(),
            body,
        })
    }
}
