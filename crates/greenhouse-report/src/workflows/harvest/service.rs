use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::error;

use super::client::{ApiKey, HarvestHttpClient};
use super::context::{ExtractionContext, ExtractionStage, ProgressReporter};
use super::endpoints::HarvestEndpoints;
use super::pagination::PageSource;
use super::report::HarvestReport;
use super::{run_stages, ExtractionError};
use crate::config::HarvestConfig;

/// Opens a page source authenticated with the caller's key.
pub trait HarvestConnector: Send + Sync {
    type Source: PageSource;

    fn connect(&self, api_key: &ApiKey) -> Self::Source;
}

/// Connects to the live Harvest API over HTTP.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpConnector;

impl HarvestConnector for HttpConnector {
    type Source = HarvestHttpClient;

    fn connect(&self, api_key: &ApiKey) -> Self::Source {
        HarvestHttpClient::new(api_key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunOutcome {
    Running,
    Succeeded { rows: usize },
    Failed,
}

/// Snapshot of the most recent extraction attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStatus {
    pub attempt: u64,
    pub stage: Option<ExtractionStage>,
    pub percent: u8,
    pub label: Option<&'static str>,
    pub outcome: RunOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub attempts: u64,
    pub last_run: Option<RunStatus>,
}

/// Shares configuration and the attempt counter between extraction requests.
pub struct ExtractionService<C> {
    connector: C,
    config: HarvestConfig,
    attempts: AtomicU64,
    last_run: Mutex<Option<RunStatus>>,
}

impl<C> ExtractionService<C>
where
    C: HarvestConnector,
{
    pub fn new(connector: C, config: HarvestConfig) -> Self {
        Self {
            connector,
            config,
            attempts: AtomicU64::new(0),
            last_run: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Draws the next attempt number and returns a fresh, unused context for it.
    pub fn context(&self) -> ExtractionContext {
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        ExtractionContext::new(attempt)
    }

    pub fn extract(
        &self,
        context: &mut ExtractionContext,
        api_key: &ApiKey,
        progress: &dyn ProgressReporter,
    ) -> Result<HarvestReport, ExtractionError> {
        self.extract_at(context, api_key, progress, Utc::now())
    }

    /// Like [`ExtractionService::extract`] with activity windows measured back from `now`.
    pub fn extract_at(
        &self,
        context: &mut ExtractionContext,
        api_key: &ApiKey,
        progress: &dyn ProgressReporter,
        now: DateTime<Utc>,
    ) -> Result<HarvestReport, ExtractionError> {
        if !context.begin() {
            return Err(ExtractionError::AlreadyRan {
                attempt: context.attempt(),
            });
        }

        self.store(RunStatus {
            attempt: context.attempt(),
            stage: None,
            percent: 0,
            label: None,
            outcome: RunOutcome::Running,
            started_at: now,
            finished_at: None,
        });

        let recorder = |attempt: u64, stage: ExtractionStage| {
            self.update(attempt, |status| {
                status.stage = Some(stage);
                status.percent = stage.percent();
                status.label = Some(stage.label());
            });
            progress.report(attempt, stage);
        };

        let result = HarvestEndpoints::build(&self.config, now)
            .map_err(ExtractionError::from)
            .and_then(|endpoints| {
                let source = self.connector.connect(api_key);
                run_stages(&source, &endpoints, &self.config, context, &recorder)
            });

        let outcome = match &result {
            Ok(report) => RunOutcome::Succeeded { rows: report.len() },
            Err(err) => {
                error!(attempt = context.attempt(), error = %err, "extraction failed");
                RunOutcome::Failed
            }
        };
        self.update(context.attempt(), |status| {
            status.outcome = outcome;
            status.finished_at = Some(Utc::now());
        });

        result
    }

    pub fn status(&self) -> StatusView {
        StatusView {
            attempts: self.attempts.load(Ordering::Relaxed),
            last_run: self
                .last_run
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    fn store(&self, status: RunStatus) {
        *self.last_run.lock().unwrap_or_else(PoisonError::into_inner) = Some(status);
    }

    /// Applies `change` only while `attempt` is still the latest recorded run.
    fn update(&self, attempt: u64, change: impl FnOnce(&mut RunStatus)) {
        let mut guard = self.last_run.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(status) = guard.as_mut().filter(|status| status.attempt == attempt) {
            change(status);
        }
    }
}
