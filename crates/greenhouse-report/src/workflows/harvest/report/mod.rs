//! Joins the normalized tables into the denormalized interview report.

mod export;

pub use export::ExportError;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

use super::mapping::is_reported_stage;
use super::tables::{
    ApplicationRow, CandidateRow, InterviewRow, JobRow, ScorecardGroup, StageRow,
};

/// Output of the normalization stage, handed to [`assemble_report`].
#[derive(Debug, Clone, Default)]
pub struct NormalizedTables {
    pub jobs: Vec<JobRow>,
    pub stages: Vec<StageRow>,
    pub applications: Vec<ApplicationRow>,
    pub candidates: Vec<CandidateRow>,
    pub interviews: Vec<InterviewRow>,
    pub scorecards: Vec<ScorecardGroup>,
}

/// One interview of one application, with its candidate, job, scorecards and stage.
///
/// Timestamps are local wall-clock values; the zone has been dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub application_id: u64,
    pub candidate_id: u64,
    pub updated_app: NaiveDateTime,
    pub job_id: u64,
    pub status: Option<String>,
    pub source: Option<String>,
    pub stage: String,
    pub location_app: Option<&'static str>,
    pub candidate_name: String,
    pub created: NaiveDateTime,
    pub updated_cand: NaiveDateTime,
    pub recruiter_name: Option<String>,
    pub coordinator_name: Option<String>,
    pub current_company: Option<String>,
    pub org_level: String,
    pub job_name: String,
    pub office: String,
    pub department: String,
    pub location_job: &'static str,
    pub interview_id: u64,
    pub interview_date: NaiveDate,
    pub interviewers: Vec<String>,
    pub interview_type: String,
    pub scorecard_ids: Option<Vec<u64>>,
    pub scorecard_authors: Option<Vec<String>>,
    pub overall_recommendations: Option<Vec<String>>,
    pub profile_url: String,
    pub stage_name: String,
}

impl ReportRow {
    pub const COLUMNS: [&'static str; 28] = [
        "application_id",
        "candidate_id",
        "updated_app",
        "job_id",
        "status",
        "source",
        "stage",
        "location_app",
        "candidate_name",
        "created",
        "updated_cand",
        "recruiter_name",
        "coordinator_name",
        "current_company",
        "org_level",
        "job_name",
        "office",
        "department",
        "location_job",
        "interview_id",
        "interview_date",
        "interviewers",
        "type",
        "scorecard_id",
        "scorecard_author",
        "overall_recommendation",
        "profile_url",
        "stage_name",
    ];

    /// Cells in [`ReportRow::COLUMNS`] order. Nulls become empty cells and lists become
    /// JSON arrays.
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.application_id.to_string(),
            self.candidate_id.to_string(),
            format_timestamp(&self.updated_app),
            self.job_id.to_string(),
            optional(self.status.as_deref()),
            optional(self.source.as_deref()),
            self.stage.clone(),
            optional(self.location_app),
            self.candidate_name.clone(),
            format_timestamp(&self.created),
            format_timestamp(&self.updated_cand),
            optional(self.recruiter_name.as_deref()),
            optional(self.coordinator_name.as_deref()),
            optional(self.current_company.as_deref()),
            self.org_level.clone(),
            self.job_name.clone(),
            self.office.clone(),
            self.department.clone(),
            self.location_job.to_string(),
            self.interview_id.to_string(),
            self.interview_date.format("%Y-%m-%d").to_string(),
            json_list(&self.interviewers),
            self.interview_type.clone(),
            self.scorecard_ids.as_deref().map(json_list).unwrap_or_default(),
            self.scorecard_authors
                .as_deref()
                .map(json_list)
                .unwrap_or_default(),
            self.overall_recommendations
                .as_deref()
                .map(json_list)
                .unwrap_or_default(),
            self.profile_url.clone(),
            self.stage_name.clone(),
        ]
    }
}

fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

fn optional(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn json_list<T: Serialize>(values: &[T]) -> String {
    serde_json::to_string(values).unwrap_or_default()
}

/// The joined report, held in memory until it is delivered.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HarvestReport {
    pub rows: Vec<ReportRow>,
}

impl HarvestReport {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builds the candidate profile link shown in the report.
pub fn profile_url(base: &str, candidate_id: u64, application_id: u64) -> String {
    format!(
        "{}/{candidate_id}?application_id={application_id}",
        base.trim_end_matches('/')
    )
}

fn index_by<T, K, F>(rows: &[T], key: F) -> HashMap<K, Vec<&T>>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, Vec<&T>> = HashMap::new();
    for row in rows {
        index.entry(key(row)).or_default().push(row);
    }
    index
}

/// Joins the tables:
///
/// 1. applications ⋈ candidates on (application id, candidate id)
/// 2. ⋈ jobs on job id
/// 3. interviews ⟕ scorecards on (application id, interview type)
/// 4. (2) ⋈ (3) on application id
/// 5. ⋈ whitelisted stages on (job id, interview type)
///
/// Left-side order is preserved and each left row expands to all of its matches.
pub fn assemble_report(tables: &NormalizedTables, profile_url_base: &str) -> HarvestReport {
    let candidates = index_by(&tables.candidates, |row| {
        (row.application_id, row.candidate_id)
    });
    let jobs = index_by(&tables.jobs, |row| row.job_id);
    let scorecards = index_by(&tables.scorecards, |group| {
        (group.application_id, group.interview.clone())
    });
    let interviews = index_by(&tables.interviews, |row| row.application_id);
    let reported_stages: Vec<StageRow> = tables
        .stages
        .iter()
        .filter(|stage| is_reported_stage(&stage.stage_name))
        .cloned()
        .collect();
    let stages = index_by(&reported_stages, |row| {
        (row.job_id, row.interview_name.clone())
    });

    let mut rows = Vec::new();
    for application in &tables.applications {
        let Some(candidate_rows) =
            candidates.get(&(application.application_id, application.candidate_id))
        else {
            continue;
        };
        let Some(job_rows) = jobs.get(&application.job_id) else {
            continue;
        };
        let Some(interview_rows) = interviews.get(&application.application_id) else {
            continue;
        };

        for candidate in candidate_rows {
            for job in job_rows {
                for interview in interview_rows {
                    let Some(stage_rows) =
                        stages.get(&(application.job_id, interview.interview_type.clone()))
                    else {
                        continue;
                    };
                    let scorecard_groups = scorecards
                        .get(&(
                            application.application_id,
                            interview.interview_type.clone(),
                        ))
                        .map(|groups| groups.as_slice())
                        .unwrap_or_default();
                    let scorecard_matches: Vec<Option<&ScorecardGroup>> =
                        if scorecard_groups.is_empty() {
                            vec![None]
                        } else {
                            scorecard_groups.iter().copied().map(Some).collect()
                        };

                    for scorecard in scorecard_matches.iter().copied() {
                        for stage in stage_rows {
                            rows.push(ReportRow {
                                application_id: application.application_id,
                                candidate_id: application.candidate_id,
                                updated_app: application.updated.naive_local(),
                                job_id: application.job_id,
                                status: application.status.clone(),
                                source: application.source.clone(),
                                stage: application.stage.clone(),
                                location_app: application.location,
                                candidate_name: candidate.candidate_name.clone(),
                                created: candidate.created.naive_local(),
                                updated_cand: candidate.updated.naive_local(),
                                recruiter_name: candidate.recruiter_name.clone(),
                                coordinator_name: candidate.coordinator_name.clone(),
                                current_company: candidate.current_company.clone(),
                                org_level: candidate.org_level.clone(),
                                job_name: job.job_name.clone(),
                                office: job.office.clone(),
                                department: job.department.clone(),
                                location_job: job.location,
                                interview_id: interview.interview_id,
                                interview_date: interview.interview_date,
                                interviewers: interview.interviewers.clone(),
                                interview_type: interview.interview_type.clone(),
                                scorecard_ids: scorecard.map(|group| group.scorecard_ids.clone()),
                                scorecard_authors: scorecard.map(|group| group.authors.clone()),
                                overall_recommendations: scorecard
                                    .map(|group| group.recommendations.clone()),
                                profile_url: profile_url(
                                    profile_url_base,
                                    application.candidate_id,
                                    application.application_id,
                                ),
                                stage_name: stage.stage_name.clone(),
                            });
                        }
                    }
                }
            }
        }
    }

    HarvestReport { rows }
}
