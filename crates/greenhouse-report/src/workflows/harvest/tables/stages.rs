use serde::Serialize;
use std::collections::HashSet;

use super::super::normalizer::{NormalizeError, RecordRef};
use super::super::records::RawStage;
use super::JobRow;

/// One (stage, interview type) pair of a job's hiring plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRow {
    pub stage_id: u64,
    pub stage_name: String,
    pub interview_id: u64,
    pub interview_name: String,
    pub job_id: u64,
}

pub fn normalize_stages(
    stages: &[RawStage],
    jobs: &[JobRow],
) -> Result<Vec<StageRow>, NormalizeError> {
    let known_jobs: HashSet<u64> = jobs.iter().map(|job| job.job_id).collect();
    let mut rows = Vec::new();

    for stage in stages {
        let Some(job_id) = stage.job_id.filter(|id| known_jobs.contains(id)) else {
            continue;
        };
        let Some(interviews) = stage.interviews.as_ref() else {
            continue;
        };

        let record = RecordRef::new("job stage", stage.id);
        let stage_id = record.require(stage.id, "id")?;
        let stage_name = record.require(stage.name.as_ref(), "name")?;

        for interview in interviews {
            rows.push(StageRow {
                stage_id,
                stage_name: stage_name.clone(),
                interview_id: record.require(interview.id, "interviews.id")?,
                interview_name: record.require(interview.name.clone(), "interviews.name")?,
                job_id,
            });
        }
    }

    rows.sort_by_key(|row| (row.stage_id, row.interview_id));
    Ok(rows)
}
