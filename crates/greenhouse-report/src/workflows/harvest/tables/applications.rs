use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, error};

use super::super::mapping::{is_archived, job_location};
use super::super::normalizer::{NormalizeError, RecordRef};
use super::super::records::{NamedRef, RawApplication};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationRow {
    pub application_id: u64,
    pub candidate_id: u64,
    pub updated: DateTime<Tz>,
    pub job_id: u64,
    pub job_name: String,
    pub status: Option<String>,
    pub source: Option<String>,
    pub stage: String,
    pub location: Option<&'static str>,
}

/// Keeps active, unrejected, non-prospect applications attached to a live job.
///
/// Records missing any of `id`, `prospect`, `rejected_at`, `current_stage` or `jobs` are
/// skipped outright. A null `prospect` counts as "not a prospect".
pub fn normalize_applications(
    applications: &[RawApplication],
    zone: Tz,
) -> Result<Vec<ApplicationRow>, NormalizeError> {
    let mut rows = Vec::new();

    for application in applications {
        let (Some(id), Some(prospect), Some(rejected_at), Some(current_stage), Some(jobs)) = (
            application.id,
            application.prospect,
            application.rejected_at.as_ref(),
            application.current_stage.as_ref(),
            application.jobs.as_ref(),
        ) else {
            debug!(application_id = ?application.id.flatten(), "skipping incomplete application");
            continue;
        };

        if prospect.unwrap_or(false) || rejected_at.is_some() {
            continue;
        }
        let (Some(application_id), Some(current_stage), Some(jobs)) = (id, current_stage, jobs)
        else {
            continue;
        };

        let record = RecordRef::new("application", Some(application_id));
        let live_jobs = live_jobs(&record, jobs)?;
        let Some((job_id, job_name)) = live_jobs.first().cloned() else {
            continue;
        };
        if live_jobs.len() > 1 {
            let job_ids: Vec<u64> = live_jobs.iter().map(|(id, _)| *id).collect();
            error!(application_id, ?job_ids, "found multiple job ids; keeping the first");
        }

        rows.push(ApplicationRow {
            application_id,
            candidate_id: record.require(application.candidate_id, "candidate_id")?,
            updated: record.local_time(
                application.last_activity_at.as_deref(),
                "last_activity_at",
                zone,
            )?,
            location: job_location(&job_name),
            job_id,
            job_name,
            status: application.status.clone(),
            source: application
                .source
                .as_ref()
                .and_then(|source| source.public_name.clone()),
            stage: record.require(current_stage.name.clone(), "current_stage.name")?,
        });
    }

    Ok(rows)
}

fn live_jobs(
    record: &RecordRef,
    jobs: &[NamedRef],
) -> Result<Vec<(u64, String)>, NormalizeError> {
    let mut live = Vec::new();
    for job in jobs {
        let name = record.require(job.name.as_ref(), "jobs.name")?;
        if is_archived(name) {
            continue;
        }
        live.push((record.require(job.id, "jobs.id")?, name.clone()));
    }
    Ok(live)
}
