use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::HashSet;

use super::super::normalizer::{sorted_by_surname, NormalizeError, RecordRef};
use super::super::records::RawInterview;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterviewRow {
    pub interview_id: u64,
    pub application_id: u64,
    pub interview_date: NaiveDate,
    /// Sorted by surname.
    pub interviewers: Vec<String>,
    pub interview_type: String,
}

pub fn normalize_interviews(
    interviews: &[RawInterview],
    valid_applications: &HashSet<u64>,
    zone: Tz,
) -> Result<Vec<InterviewRow>, NormalizeError> {
    let mut rows = Vec::new();

    for interview in interviews {
        let Some(application_id) = interview
            .application_id
            .filter(|id| valid_applications.contains(id))
        else {
            continue;
        };

        let record = RecordRef::new("scheduled interview", interview.id);
        let start = record.require(interview.start.as_ref(), "start")?;
        let starts_at = record.local_time(start.date_time.as_deref(), "start.date_time", zone)?;
        let interview_type = record.require(
            interview.interview.as_ref().and_then(|kind| kind.name.clone()),
            "interview.name",
        )?;

        let mut interviewers = Vec::new();
        for person in interview.interviewers.iter().flatten() {
            interviewers.push(record.require(person.name.clone(), "interviewers.name")?);
        }

        rows.push(InterviewRow {
            interview_id: record.require(interview.id, "id")?,
            application_id,
            interview_date: starts_at.date_naive(),
            interviewers: sorted_by_surname(interviewers),
            interview_type,
        });
    }

    rows.sort_by_key(|row| (row.interview_id, row.application_id));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_valid_applications_and_sorts_interviewers() {
        let raw: Vec<RawInterview> = serde_json::from_value(json!([
            {
                "id": 2,
                "application_id": 11,
                "start": { "date_time": "2026-09-02T03:30:00Z" },
                "interview": { "id": 5, "name": "Technical" },
                "interviewers": [
                    { "name": "Zed van Buren" },
                    { "name": "amy adams" },
                    { "name": "Carl ADAMSON" }
                ]
            },
            {
                "id": 1,
                "application_id": 99,
                "start": { "date_time": "2026-09-01T15:00:00Z" },
                "interview": { "id": 5, "name": "Technical" }
            },
            {
                "id": 3,
                "start": { "date_time": "2026-09-01T15:00:00Z" },
                "interview": { "id": 6, "name": "Culture" }
            }
        ]))
        .expect("fixture decodes");

        let valid: HashSet<u64> = [11].into_iter().collect();
        let rows = normalize_interviews(&raw, &valid, chrono_tz::America::Chicago)
            .expect("interviews normalize");

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.interview_type, "Technical");
        assert_eq!(
            row.interview_date,
            NaiveDate::from_ymd_opt(2026, 9, 1).expect("valid date"),
            "03:30 UTC is still the previous evening in Chicago"
        );
        assert_eq!(
            row.interviewers,
            vec!["Carl ADAMSON", "Zed van Buren", "amy adams"]
        );
    }

    #[test]
    fn interviews_without_interviewers_have_an_empty_panel() {
        let raw: Vec<RawInterview> = serde_json::from_value(json!([{
            "id": 4,
            "application_id": 11,
            "start": { "date_time": "2026-09-01T15:00:00Z" },
            "interview": { "name": "Phone Screen" }
        }]))
        .expect("fixture decodes");
        let valid: HashSet<u64> = [11].into_iter().collect();
        let rows = normalize_interviews(&raw, &valid, chrono_tz::America::Chicago)
            .expect("interviews normalize");
        assert!(rows[0].interviewers.is_empty());
    }

    #[test]
    fn missing_start_is_fatal() {
        let raw: Vec<RawInterview> = serde_json::from_value(json!([{
            "id": 4,
            "application_id": 11,
            "interview": { "name": "Phone Screen" }
        }]))
        .expect("fixture decodes");
        let valid: HashSet<u64> = [11].into_iter().collect();
        let error = normalize_interviews(&raw, &valid, chrono_tz::America::Chicago)
            .expect_err("missing start");
        assert!(matches!(error, NormalizeError::MissingField { field: "start", .. }));
    }
}
