use serde::Serialize;
use tracing::debug;

use super::super::mapping::office_location;
use super::super::normalizer::{NormalizeError, RecordRef};
use super::super::records::RawJob;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRow {
    pub job_id: u64,
    pub job_name: String,
    pub office: String,
    pub department: String,
    pub location: &'static str,
}

/// Keeps open jobs, flattened to their first office and department.
///
/// Open jobs without any office or department entry are structural errors; entries whose
/// names are null only drop the row.
pub fn normalize_jobs(jobs: &[RawJob]) -> Result<Vec<JobRow>, NormalizeError> {
    let mut rows = Vec::new();

    for job in jobs {
        let record = RecordRef::new("job", job.id);
        let status = record.require(job.status.as_deref(), "status")?;
        if !status.eq_ignore_ascii_case("open") {
            continue;
        }

        let office = record.require(
            job.offices.as_ref().and_then(|offices| offices.first()),
            "offices",
        )?;
        let department = record.require(
            job.departments
                .as_ref()
                .and_then(|departments| departments.first()),
            "departments",
        )?;

        let (Some(job_id), Some(job_name), Some(office), Some(department)) = (
            job.id,
            job.name.clone(),
            office.name.clone(),
            department.name.clone(),
        ) else {
            debug!(job_id = ?job.id, "dropping open job with null attributes");
            continue;
        };

        rows.push(JobRow {
            job_id,
            location: office_location(&office),
            job_name,
            office,
            department,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jobs(value: serde_json::Value) -> Vec<RawJob> {
        serde_json::from_value(value).expect("job fixture decodes")
    }

    #[test]
    fn keeps_only_open_jobs_with_first_office_and_department() {
        let rows = normalize_jobs(&jobs(json!([
            {
                "id": 1, "name": "CHI-Engineer", "status": "Open",
                "offices": [{ "name": "123 N Michigan, Chicago" }, { "name": "Dallas" }],
                "departments": [{ "name": "Engineering" }, { "name": "Ops" }]
            },
            {
                "id": 2, "name": "DET-Analyst", "status": "closed",
                "offices": [{ "name": "Detroit" }],
                "departments": [{ "name": "Finance" }]
            },
            {
                "id": 3, "name": "Remote", "status": "open",
                "offices": [{ "name": "Nowhere, USA" }],
                "departments": [{ "name": "Sales" }]
            }
        ])))
        .expect("jobs normalize");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].job_id, 1);
        assert_eq!(rows[0].office, "123 N Michigan, Chicago");
        assert_eq!(rows[0].department, "Engineering");
        assert_eq!(rows[0].location, "CHI");
        assert_eq!(rows[1].location, "UNKNOWN");
    }

    #[test]
    fn null_office_name_drops_the_row() {
        let rows = normalize_jobs(&jobs(json!([{
            "id": 4, "name": "ATL-Recruiter", "status": "open",
            "offices": [{ "name": null }],
            "departments": [{ "name": "People" }]
        }])))
        .expect("jobs normalize");
        assert!(rows.is_empty());
    }

    #[test]
    fn open_job_without_offices_is_an_error() {
        let error = normalize_jobs(&jobs(json!([{
            "id": 5, "name": "KOS-Dev", "status": "open",
            "offices": [],
            "departments": [{ "name": "Engineering" }]
        }])))
        .expect_err("structural error");
        assert!(matches!(
            error,
            NormalizeError::MissingField { field: "offices", .. }
        ));
    }
}
