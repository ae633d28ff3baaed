use std::fmt;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::context::AppContext;
use crate::domain::failure::FailureRecord;
use crate::domain::query::{QueryResponse, failed_actions_query, parse_query_result};
use crate::domain::ticket::TicketPayload;
use crate::error::{AppError, AppResult};
use crate::run_log::{RunLog, append_ticket_artifact};
use crate::store::DedupStore;

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub already_ticketed: usize,
    pub submitted: usize,
    pub submission_failures: usize,
    pub malformed_rows: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows: {} submitted, {} submission failures, {} already ticketed, {} malformed",
            self.rows,
            self.submitted,
            self.submission_failures,
            self.already_ticketed,
            self.malformed_rows
        )
    }
}

/// Queries failed actions, files an incident for each failure not yet in
/// `store`, and records what was handled.
///
/// The transcript always ends with the termination marker, also when the
/// query fails and the error is returned.
pub async fn generate_tickets(
    ctx: &AppContext,
    store: &mut DedupStore,
    log: &RunLog,
) -> AppResult<RunSummary> {
    let result = process(ctx, store, log).await;
    match &result {
        Ok(summary) => {
            info!(%summary, "run complete");
            log.write(&format!("Summary: {summary}"));
        }
        Err(err) => {
            error!("run stopped: {err}");
            log.write(&format!("Run stopped: {err}"));
        }
    }
    log.finish();
    result
}

async fn process(
    ctx: &AppContext,
    store: &mut DedupStore,
    log: &RunLog,
) -> AppResult<RunSummary> {
    let query = failed_actions_query(ctx.config.days);
    info!(days = ctx.config.days, "querying BigFix for failed actions");

    let response = match ctx.action_source.run_query(&query).await {
        Ok(response) => response,
        Err(err) => {
            log.section(
                "BigFix query and results:",
                &format!("Query:\n{query}\nNo response: {err}"),
            );
            log.write(&format!("Query [{query}] failed."));
            return Err(err);
        }
    };

    log.section("BigFix query and results:", &describe_exchange(&query, &response));

    if !response.is_success() {
        log.write(&format!("Query [{query}] failed."));
        return Err(AppError::Source(format!(
            "BigFix query answered with status {}",
            response.status
        )));
    }

    let rows = parse_query_result(&response.body)?;
    info!(rows = rows.len(), "BigFix returned failed actions");

    let mut summary = RunSummary::default();
    for row in &rows {
        summary.rows += 1;
        log.write(&format!("\n{SEPARATOR_ROW}\n{}", pretty(row)));

        let record = match FailureRecord::from_row(row) {
            Ok(record) => record,
            Err(err) => {
                error!("skipping row: {err}");
                log.write(&format!("Skipping row: {err}"));
                summary.malformed_rows += 1;
                continue;
            }
        };

        let key = record.dedup_key();
        debug!(
            %key,
            status = %record.status,
            started = %record.start_time,
            ended = %record.end_time,
            multiple_action_group = record.multiple_action_group,
            "failure found"
        );
        if store.contains(&key) {
            debug!(%key, "failure already ticketed");
            summary.already_ticketed += 1;
            continue;
        }

        let payload = TicketPayload::for_failure(&record);
        let accepted = match ctx.incident_tracker.create_incident(&payload).await {
            Ok(receipt) => {
                info!(%key, status = receipt.status, "incident created");
                log.write(&format!(
                    "\nTicket for {key} submitted successfully\nStatus: {}\n{}",
                    receipt.status, receipt.body
                ));
                summary.submitted += 1;
                true
            }
            Err(err) => {
                warn!(%key, "incident submission failed: {err}");
                log.write(&format!("\nTicket submission for {key} FAILED\n{err}"));
                summary.submission_failures += 1;
                false
            }
        };

        if accepted || ctx.config.record_failed_submissions {
            store.record_and_persist(&key, unix_now())?;
        }

        if let Err(err) = append_ticket_artifact(&ctx.config.data_dir, &key, &payload) {
            warn!(%key, "failed to write ticket artifact: {err}");
        }
    }

    Ok(summary)
}

const SEPARATOR_ROW: &str = "-----------------------------------";

fn describe_exchange(query: &str, response: &QueryResponse) -> String {
    format!(
        "Query:\n{query}\nRequest: POST {url}\nForm fields: relevance=<query above>, output=json\n\
         Response status: {status}\nResponse body:\n{body}",
        url = response.url,
        status = response.status,
        body = response.body,
    )
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn unix_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
