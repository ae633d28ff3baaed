use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use clap::builder::BoolishValueParser;
use tracing::info;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::infra::bigfix::BigFixClient;
use crate::infra::http_client;
use crate::infra::servicenow::ServiceNowClient;
use crate::run_log::RunLog;
use crate::store::DedupStore;
use crate::workflow::genticket::{RunSummary, generate_tickets};

#[derive(Args, Debug, Clone)]
pub struct GenticketArgs {
    /// address:port of the BigFix server.
    #[arg(short = 's', long, env = "GENTICKET_BF_SERVER")]
    pub bfserver: String,
    /// BigFix REST API username.
    #[arg(short = 'u', long, env = "GENTICKET_BF_USER")]
    pub bfuser: String,
    /// BigFix REST API password.
    #[arg(short = 'p', long, env = "GENTICKET_BF_PASS", hide_env_values = true)]
    pub bfpass: String,
    /// ServiceNow API base URL.
    #[arg(short = 'S', long, env = "GENTICKET_SN_URL")]
    pub snurl: String,
    /// ServiceNow API username.
    #[arg(short = 'U', long, env = "GENTICKET_SN_USER")]
    pub snuser: String,
    /// ServiceNow API password.
    #[arg(short = 'P', long, env = "GENTICKET_SN_PASS", hide_env_values = true)]
    pub snpass: String,
    /// Skip TLS certificate verification (self-signed BigFix servers).
    #[arg(long, env = "GENTICKET_INSECURE", value_parser = BoolishValueParser::new())]
    pub insecure: bool,
    /// Timeout in seconds for each HTTP request.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
    /// Directory for the run log, dedup store and ticket artifacts.
    #[arg(long, default_value = ".")]
    pub data_dir: PathBuf,
    /// Remember failures even when the incident could not be created.
    #[arg(long)]
    pub record_failed_submissions: bool,
    /// Number of days to look back.
    pub days: u32,
}

pub async fn run(args: GenticketArgs) -> AppResult<RunSummary> {
    let config = AppConfig::from_args(&args)?;

    let log = RunLog::start(&config.run_log_path())?;
    let mut store = DedupStore::load(&config.dedup_store_path()).map_err(|err| stop(&log, err))?;
    if !store.is_empty() {
        info!(
            entries = store.len(),
            log = %log.path().display(),
            "dedup store loaded"
        );
    }

    let http = http_client(&config.http).map_err(|err| stop(&log, err))?;
    let action_source = Arc::new(BigFixClient::new(http.clone(), &config.bigfix));
    let incident_tracker = Arc::new(ServiceNowClient::new(http, &config.servicenow));
    let context = AppContext::new(config, action_source, incident_tracker);

    generate_tickets(&context, &mut store, &log).await
}

/// Closes the transcript of a run that fails before the workflow starts.
fn stop(log: &RunLog, err: AppError) -> AppError {
    log.write(&format!("Run stopped: {err}"));
    log.finish();
    err
}
