//! Recruiting report extraction from the Greenhouse Harvest API.

mod client;
mod context;
mod endpoints;
#[cfg(test)]
mod fixtures;
pub mod mapping;
mod normalizer;
mod pagination;
pub mod records;
mod report;
mod router;
mod service;
pub mod tables;

pub use client::{ApiKey, HarvestHttpClient};
pub use context::{ExtractionContext, ExtractionStage, ProgressReporter, TracingProgress};
pub use endpoints::HarvestEndpoints;
pub use normalizer::NormalizeError;
pub use pagination::{
    fetch_all, fetch_records, page_number, parse_link_header, starting_point, with_page,
    FetchError, Page, PageLinks, PageSource,
};
pub use report::{
    assemble_report, profile_url, ExportError, HarvestReport, NormalizedTables, ReportRow,
};
pub use router::{extraction_router, GENERIC_FAILURE_MESSAGE};
pub use service::{
    ExtractionService, HarvestConnector, HttpConnector, RunOutcome, RunStatus, StatusView,
};

use std::collections::HashSet;
use std::fmt;
use tracing::info;

use crate::config::HarvestConfig;
use records::{RawApplication, RawCandidate, RawInterview, RawJob, RawScorecard, RawStage};

#[derive(Debug)]
pub enum ExtractionError {
    Fetch(FetchError),
    Normalize(NormalizeError),
    Export(ExportError),
    AlreadyRan { attempt: u64 },
    MissingApiKey,
    Worker(tokio::task::JoinError),
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionError::Fetch(err) => write!(f, "failed to fetch records: {}", err),
            ExtractionError::Normalize(err) => write!(f, "failed to normalize records: {}", err),
            ExtractionError::Export(err) => write!(f, "{}", err),
            ExtractionError::AlreadyRan { attempt } => {
                write!(f, "extraction attempt {} has already run", attempt)
            }
            ExtractionError::MissingApiKey => write!(f, "a Harvest API key is required"),
            ExtractionError::Worker(err) => write!(f, "extraction worker failed: {}", err),
        }
    }
}

impl std::error::Error for ExtractionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractionError::Fetch(err) => Some(err),
            ExtractionError::Normalize(err) => Some(err),
            ExtractionError::Export(err) => Some(err),
            ExtractionError::Worker(err) => Some(err),
            ExtractionError::AlreadyRan { .. } | ExtractionError::MissingApiKey => None,
        }
    }
}

impl From<FetchError> for ExtractionError {
    fn from(value: FetchError) -> Self {
        Self::Fetch(value)
    }
}

impl From<NormalizeError> for ExtractionError {
    fn from(value: NormalizeError) -> Self {
        Self::Normalize(value)
    }
}

impl From<ExportError> for ExtractionError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<tokio::task::JoinError> for ExtractionError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Worker(value)
    }
}

/// Runs the full pipeline: fetch every entity, normalize, and join into one report.
///
/// Requests are issued one at a time. Progress is reported after each group of
/// endpoints, and the first failure aborts the run without producing a report.
pub fn run_extraction<S: PageSource>(
    source: &S,
    endpoints: &HarvestEndpoints,
    config: &HarvestConfig,
    context: &mut ExtractionContext,
    progress: &dyn ProgressReporter,
) -> Result<HarvestReport, ExtractionError> {
    if !context.begin() {
        return Err(ExtractionError::AlreadyRan {
            attempt: context.attempt(),
        });
    }
    run_stages(source, endpoints, config, context, progress)
}

/// Pipeline body for a context that has already been marked as started.
pub(crate) fn run_stages<S: PageSource>(
    source: &S,
    endpoints: &HarvestEndpoints,
    config: &HarvestConfig,
    context: &mut ExtractionContext,
    progress: &dyn ProgressReporter,
) -> Result<HarvestReport, ExtractionError> {
    context.advance(ExtractionStage::Starting, progress);

    let history = config.history_pages;
    let zone = config.timezone;

    let raw_jobs: Vec<RawJob> = fetch_records(source, &endpoints.jobs, history)?;
    let jobs = tables::normalize_jobs(&raw_jobs)?;
    let raw_stages: Vec<RawStage> = fetch_records(source, &endpoints.job_stages, history)?;
    let stages = tables::normalize_stages(&raw_stages, &jobs)?;
    context.advance(ExtractionStage::JobsExtracted, progress);

    let raw_applications: Vec<RawApplication> =
        fetch_records(source, &endpoints.applications, history)?;
    let applications = tables::normalize_applications(&raw_applications, zone)?;
    let valid_applications: HashSet<u64> = applications
        .iter()
        .map(|application| application.application_id)
        .collect();
    context.advance(ExtractionStage::ApplicationsExtracted, progress);

    let raw_candidates: Vec<RawCandidate> =
        fetch_records(source, &endpoints.candidates, history)?;
    let candidates = tables::normalize_candidates(&raw_candidates, &valid_applications, zone)?;
    context.advance(ExtractionStage::CandidatesExtracted, progress);

    let raw_interviews: Vec<RawInterview> =
        fetch_records(source, &endpoints.scheduled_interviews, history)?;
    let interviews = tables::normalize_interviews(&raw_interviews, &valid_applications, zone)?;
    context.advance(ExtractionStage::InterviewsExtracted, progress);

    let raw_scorecards: Vec<RawScorecard> =
        fetch_records(source, &endpoints.scorecards, history)?;
    let scorecards = tables::normalize_scorecards(&raw_scorecards)?;
    context.advance(ExtractionStage::DataExtracted, progress);

    let normalized = NormalizedTables {
        jobs,
        stages,
        applications,
        candidates,
        interviews,
        scorecards,
    };
    let report = assemble_report(&normalized, &config.profile_url_base);
    info!(
        attempt = context.attempt(),
        applications = normalized.applications.len(),
        rows = report.len(),
        "report assembled"
    );
    context.advance(ExtractionStage::ReportPrepared, progress);

    Ok(report)
}
