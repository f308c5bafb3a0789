//! Raw Harvest API payloads.
//!
//! Every field is optional because the upstream records are loosely shaped. Fields whose
//! "present but null" state means something different from "missing" are modelled as
//! `Option<Option<T>>`: the outer option tracks key presence, the inner one the value.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Objects that only matter for their id and display name (offices, stages, users, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJob {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub offices: Option<Vec<NamedRef>>,
    #[serde(default)]
    pub departments: Option<Vec<NamedRef>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStage {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub job_id: Option<u64>,
    #[serde(default)]
    pub interviews: Option<Vec<NamedRef>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawApplicationSource {
    #[serde(default)]
    pub public_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawApplication {
    #[serde(default, deserialize_with = "present")]
    pub id: Option<Option<u64>>,
    #[serde(default)]
    pub candidate_id: Option<u64>,
    #[serde(default, deserialize_with = "present")]
    pub prospect: Option<Option<bool>>,
    #[serde(default, deserialize_with = "present")]
    pub rejected_at: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub current_stage: Option<Option<NamedRef>>,
    #[serde(default, deserialize_with = "present")]
    pub jobs: Option<Option<Vec<NamedRef>>>,
    #[serde(default)]
    pub last_activity_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub source: Option<RawApplicationSource>,
}

/// Application summary embedded in a candidate record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCandidateApplication {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub prospect: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCandidate {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_activity: Option<String>,
    #[serde(default)]
    pub recruiter: Option<NamedRef>,
    #[serde(default)]
    pub coordinator: Option<NamedRef>,
    #[serde(default)]
    pub applications: Option<Vec<RawCandidateApplication>>,
    #[serde(default)]
    pub custom_fields: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInterviewStart {
    #[serde(default)]
    pub date_time: Option<String>,
}

/// Entry of the `scheduled_interviews` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInterview {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub application_id: Option<u64>,
    #[serde(default)]
    pub start: Option<RawInterviewStart>,
    #[serde(default)]
    pub interview: Option<NamedRef>,
    #[serde(default)]
    pub interviewers: Option<Vec<NamedRef>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawScorecard {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub application_id: Option<u64>,
    #[serde(default)]
    pub interview_step: Option<NamedRef>,
    #[serde(default)]
    pub interviewer: Option<NamedRef>,
    #[serde(default)]
    pub overall_recommendation: Option<String>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn application_distinguishes_missing_from_null() {
        let missing: RawApplication =
            serde_json::from_value(json!({ "id": 1, "prospect": false })).expect("decodes");
        assert_eq!(missing.id, Some(Some(1)));
        assert_eq!(missing.rejected_at, None);
        assert!(missing.current_stage.is_none());

        let null: RawApplication = serde_json::from_value(json!({
            "id": 1,
            "rejected_at": null,
            "current_stage": null,
            "jobs": null
        }))
        .expect("decodes");
        assert_eq!(null.rejected_at, Some(None));
        assert_eq!(null.current_stage, Some(None));
        assert!(matches!(null.jobs, Some(None)));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let job: RawJob = serde_json::from_value(json!({
            "id": 7,
            "name": "CHI-Engineer",
            "status": "open",
            "hiring_team": { "recruiters": [] },
            "offices": [{ "id": 1, "name": "Chicago", "location": { "name": "IL" } }]
        }))
        .expect("decodes");
        assert_eq!(job.offices.expect("offices")[0].name.as_deref(), Some("Chicago"));
        assert!(job.departments.is_none());
    }
}
