use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

use super::super::normalizer::{NormalizeError, RecordRef};
use super::super::records::RawCandidate;

const ORG_LEVEL_FIELD: &str = "organizational_level";
const ORG_LEVEL_ABSENT: &str = "Unknown";
const ORG_LEVEL_NULL: &str = "Unspecified";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRow {
    pub candidate_id: u64,
    pub candidate_name: String,
    pub created: DateTime<Tz>,
    pub updated: DateTime<Tz>,
    pub recruiter_name: Option<String>,
    pub coordinator_name: Option<String>,
    pub current_company: Option<String>,
    pub application_id: u64,
    pub org_level: String,
}

/// Emits one row per candidate application that is part of `valid_applications`.
pub fn normalize_candidates(
    candidates: &[RawCandidate],
    valid_applications: &HashSet<u64>,
    zone: Tz,
) -> Result<Vec<CandidateRow>, NormalizeError> {
    let mut rows = Vec::new();

    for candidate in candidates {
        let Some(applications) = candidate.applications.as_ref() else {
            continue;
        };

        let record = RecordRef::new("candidate", candidate.id);
        for application in applications {
            let Some(application_id) = application
                .id
                .filter(|id| valid_applications.contains(id))
            else {
                continue;
            };
            if record.require(application.prospect, "applications.prospect")? {
                continue;
            }

            rows.push(CandidateRow {
                candidate_id: record.require(candidate.id, "id")?,
                candidate_name: full_name(candidate),
                created: record.local_time(candidate.created_at.as_deref(), "created_at", zone)?,
                updated: record.local_time(
                    candidate.last_activity.as_deref(),
                    "last_activity",
                    zone,
                )?,
                recruiter_name: candidate
                    .recruiter
                    .as_ref()
                    .and_then(|user| user.name.clone()),
                coordinator_name: candidate
                    .coordinator
                    .as_ref()
                    .and_then(|user| user.name.clone()),
                current_company: candidate.company.clone(),
                application_id,
                org_level: org_level(candidate),
            });
        }
    }

    rows.sort_by_key(|row| (row.candidate_id, row.application_id));
    Ok(rows)
}

fn full_name(candidate: &RawCandidate) -> String {
    [candidate.first_name.as_deref(), candidate.last_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
}

fn org_level(candidate: &RawCandidate) -> String {
    let field = candidate
        .custom_fields
        .as_ref()
        .and_then(|fields| fields.get(ORG_LEVEL_FIELD));

    match field {
        None => ORG_LEVEL_ABSENT.to_string(),
        Some(Value::Null) => ORG_LEVEL_NULL.to_string(),
        Some(Value::String(level)) => level.clone(),
        Some(other) => other.to_string(),
    }
}
