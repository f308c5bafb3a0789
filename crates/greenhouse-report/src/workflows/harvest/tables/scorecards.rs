use serde::Serialize;
use std::collections::BTreeMap;

use super::super::normalizer::{permute, surname_order, NormalizeError, RecordRef};
use super::super::records::RawScorecard;

pub const NO_DECISION: &str = "no_decision";

/// Scorecards of one interview type for one application, as parallel lists ordered by
/// author surname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScorecardGroup {
    pub application_id: u64,
    pub interview: String,
    pub scorecard_ids: Vec<u64>,
    pub authors: Vec<String>,
    pub recommendations: Vec<String>,
}

pub fn normalize_scorecards(
    scorecards: &[RawScorecard],
) -> Result<Vec<ScorecardGroup>, NormalizeError> {
    let mut grouped: BTreeMap<(u64, String), Vec<(u64, String, String)>> = BTreeMap::new();

    for scorecard in scorecards {
        let record = RecordRef::new("scorecard", scorecard.id);
        let scorecard_id = record.require(scorecard.id, "id")?;
        let application_id = record.require(scorecard.application_id, "application_id")?;
        let interview = record.require(
            scorecard
                .interview_step
                .as_ref()
                .and_then(|step| step.name.clone()),
            "interview_step.name",
        )?;
        let author = record.require(
            scorecard
                .interviewer
                .as_ref()
                .and_then(|user| user.name.clone()),
            "interviewer.name",
        )?;
        let recommendation = scorecard
            .overall_recommendation
            .clone()
            .unwrap_or_else(|| NO_DECISION.to_string());

        grouped
            .entry((application_id, interview))
            .or_default()
            .push((scorecard_id, author, recommendation));
    }

    Ok(grouped
        .into_iter()
        .map(|((application_id, interview), entries)| {
            let mut scorecard_ids = Vec::with_capacity(entries.len());
            let mut authors = Vec::with_capacity(entries.len());
            let mut recommendations = Vec::with_capacity(entries.len());
            for (id, author, recommendation) in entries {
                scorecard_ids.push(id);
                authors.push(author);
                recommendations.push(recommendation);
            }

            let order = surname_order(&authors);
            ScorecardGroup {
                application_id,
                interview,
                scorecard_ids: permute(scorecard_ids, &order),
                authors: permute(authors, &order),
                recommendations: permute(recommendations, &order),
            }
        })
        .collect())
}
