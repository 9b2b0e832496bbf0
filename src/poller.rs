//! One poll cycle, from stored token to published records
//!
//! ```text
//! Start → TokenValid → DeviceResolved → MeasurementsExtracted → Published → (LivenessNotified) → Done
//! ```
//!
//! Stages run strictly in order and the first failure aborts the cycle. The
//! liveness ping only runs after a successful publish and its failure is
//! swallowed.

use crate::auth::{TokenRefresher, TokenStore};
use crate::client::{HttpTransport, ReqwestTransport};
use crate::config::AppConfig;
use crate::error::{PollerError, Result};
use crate::health::{HealthcheckPinger, LivenessOutcome};
use crate::monitoring::{self, MetricsSink, RecordBatch};
use crate::services::{self, DeviceResolver};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Progress of a poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Start,
    TokenValid,
    DeviceResolved,
    MeasurementsExtracted,
    Published,
    LivenessNotified,
    Done,
}

impl RunStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStage::Start => "start",
            RunStage::TokenValid => "token_valid",
            RunStage::DeviceResolved => "device_resolved",
            RunStage::MeasurementsExtracted => "measurements_extracted",
            RunStage::Published => "published",
            RunStage::LivenessNotified => "liveness_notified",
            RunStage::Done => "done",
        }
    }

    /// Step that runs next from this stage; a failure there is reported under this name
    pub fn next_step(&self) -> &'static str {
        match self {
            RunStage::Start => "refresh",
            RunStage::TokenValid => "resolve",
            RunStage::DeviceResolved => "extract",
            RunStage::MeasurementsExtracted => "publish",
            RunStage::Published => "ping",
            RunStage::LivenessNotified | RunStage::Done => "done",
        }
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a successful poll cycle
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub device_id: String,
    pub measurement_count: usize,
    /// False for dry runs
    pub published: bool,
    pub liveness: LivenessOutcome,
}

/// Runs poll cycles against the vendor API
pub struct Poller {
    store: Arc<dyn TokenStore>,
    refresher: TokenRefresher,
    resolver: DeviceResolver,
    sink: Arc<dyn MetricsSink>,
    pinger: Option<HealthcheckPinger>,
    dry_run: bool,
}

impl Poller {
    pub fn new(
        store: Arc<dyn TokenStore>,
        refresher: TokenRefresher,
        resolver: DeviceResolver,
        sink: Arc<dyn MetricsSink>,
        pinger: Option<HealthcheckPinger>,
    ) -> Self {
        Self {
            store,
            refresher,
            resolver,
            sink,
            pinger,
            dry_run: false,
        }
    }

    /// Wire up the vendor components from configuration
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn TokenStore>,
        sink: Arc<dyn MetricsSink>,
    ) -> Result<Self> {
        let transport: Arc<dyn HttpTransport> =
            Arc::new(ReqwestTransport::new(config.honeywell.timeout)?);
        let base_url = config.honeywell.api_base()?;

        let refresher = TokenRefresher::new(
            transport.clone(),
            &base_url,
            config.honeywell.authorization.clone(),
        )?;
        let resolver = DeviceResolver::new(transport, base_url, config.honeywell.apikey.clone());
        let pinger = config
            .healthchecks
            .as_ref()
            .map(HealthcheckPinger::from_config)
            .transpose()?;

        Ok(Self::new(store, refresher, resolver, sink, pinger))
    }

    /// Stop after extraction: nothing is written and no ping is sent
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run one poll cycle
    pub async fn run(&self) -> Result<RunReport> {
        let mut stage = RunStage::Start;
        debug!(stage = %stage, "Starting poll cycle");

        let token = self
            .refresher
            .refresh_stored(self.store.as_ref())
            .await
            .map_err(|e| abort(stage, e))?;
        stage = advance(stage, RunStage::TokenValid);

        let status = self
            .resolver
            .resolve(&token)
            .await
            .map_err(|e| abort(stage, e))?;
        stage = advance(stage, RunStage::DeviceResolved);

        let tags = services::extract_tags(&status).map_err(|e| abort(stage, e))?;
        let measurements = services::extract(&status).map_err(|e| abort(stage, e))?;
        let batch = RecordBatch::now(tags, measurements);
        stage = advance(stage, RunStage::MeasurementsExtracted);

        let mut report = RunReport {
            device_id: batch.tags().device_id.clone(),
            measurement_count: batch.len(),
            published: false,
            liveness: LivenessOutcome::Skipped,
        };

        if self.dry_run {
            for measurement in batch.measurements() {
                info!(name = %measurement.name, value = %measurement.value, "dry run");
            }
            advance(stage, RunStage::Done);
            return Ok(report);
        }

        monitoring::publish(self.sink.as_ref(), &batch)
            .await
            .map_err(|e| abort(stage, e))?;
        stage = advance(stage, RunStage::Published);
        report.published = true;

        report.liveness = self.notify_liveness().await;
        if report.liveness == LivenessOutcome::Notified {
            stage = advance(stage, RunStage::LivenessNotified);
        }

        advance(stage, RunStage::Done);
        Ok(report)
    }

    async fn notify_liveness(&self) -> LivenessOutcome {
        let Some(pinger) = &self.pinger else {
            debug!("No liveness endpoint configured");
            return LivenessOutcome::Skipped;
        };

        match pinger.ping().await {
            Ok(()) => LivenessOutcome::Notified,
            Err(e) => {
                warn!(stage = RunStage::Published.next_step(), "Ping failed: {e}");
                LivenessOutcome::Failed(e.to_string())
            }
        }
    }
}

fn advance(from: RunStage, to: RunStage) -> RunStage {
    info!(from = %from, to = %to, "stage transition");
    to
}

fn abort(reached: RunStage, error: PollerError) -> PollerError {
    error!(
        stage = reached.next_step(),
        reached = %reached,
        category = error.category(),
        exit_code = error.exit_code(),
        retryable = error.is_retryable(),
        "Poll cycle aborted: {error}"
    );
    error
}
