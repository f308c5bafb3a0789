use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::client::ApiKey;
use super::pagination::{FetchError, Page, PageLinks, PageSource};
use super::service::HarvestConnector;

/// Serves one page per endpoint, keyed by the last path segment of the request URL.
#[derive(Clone, Default)]
pub(crate) struct FixtureSource {
    resources: HashMap<&'static str, Vec<Value>>,
    reject_with: Option<u16>,
    requests: Arc<AtomicUsize>,
}

impl FixtureSource {
    pub(crate) fn recruiting() -> Self {
        let mut resources = HashMap::new();
        resources.insert(
            "jobs",
            vec![
                json!({
                    "id": 1,
                    "name": "CHI-Engineer",
                    "status": "open",
                    "offices": [{ "id": 3, "name": "Chicago HQ" }],
                    "departments": [{ "id": 4, "name": "Engineering" }]
                }),
                json!({
                    "id": 2,
                    "name": "ATL-Closed Role",
                    "status": "closed",
                    "offices": [],
                    "departments": []
                }),
            ],
        );
        resources.insert(
            "job_stages",
            vec![json!({
                "id": 10,
                "name": "Stage 1",
                "job_id": 1,
                "interviews": [{ "id": 100, "name": "Technical" }]
            })],
        );
        resources.insert(
            "applications",
            vec![
                json!({
                    "id": 11,
                    "candidate_id": 5,
                    "prospect": false,
                    "rejected_at": null,
                    "last_activity_at": "2026-09-01T14:00:00Z",
                    "status": "active",
                    "source": { "public_name": "Referral" },
                    "current_stage": { "id": 10, "name": "Stage 1" },
                    "jobs": [{ "id": 1, "name": "CHI-Engineer" }]
                }),
                json!({
                    "id": 12,
                    "candidate_id": 6,
                    "prospect": false,
                    "rejected_at": "2026-09-02T10:00:00Z",
                    "last_activity_at": "2026-09-02T10:00:00Z",
                    "status": "rejected",
                    "source": null,
                    "current_stage": { "id": 10, "name": "Stage 1" },
                    "jobs": [{ "id": 1, "name": "CHI-Engineer" }]
                }),
            ],
        );
        resources.insert(
            "candidates",
            vec![
                json!({
                    "id": 5,
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                    "company": "Analytical Engines",
                    "created_at": "2026-08-01T12:00:00Z",
                    "last_activity": "2026-09-01T14:00:00Z",
                    "recruiter": { "id": 20, "name": "Rita Recruiter" },
                    "coordinator": null,
                    "applications": [{ "id": 11, "prospect": false }],
                    "custom_fields": { "organizational_level": "Senior" }
                }),
                json!({
                    "id": 6,
                    "first_name": "Grace",
                    "last_name": "Hopper",
                    "created_at": "2026-08-01T12:00:00Z",
                    "last_activity": "2026-09-02T10:00:00Z",
                    "applications": [{ "id": 12, "prospect": false }]
                }),
            ],
        );
        resources.insert(
            "scheduled_interviews",
            vec![
                json!({
                    "id": 1,
                    "application_id": 11,
                    "start": { "date_time": "2026-09-03T15:00:00Z" },
                    "interview": { "id": 100, "name": "Technical" },
                    "interviewers": [
                        { "id": 30, "name": "Zed Young" },
                        { "id": 31, "name": "Amy Baker" }
                    ]
                }),
                json!({
                    "id": 2,
                    "application_id": 12,
                    "start": { "date_time": "2026-09-04T15:00:00Z" },
                    "interview": { "id": 100, "name": "Technical" },
                    "interviewers": []
                }),
            ],
        );
        resources.insert(
            "scorecards",
            vec![json!({
                "id": 7,
                "application_id": 11,
                "interview_step": { "id": 100, "name": "Technical" },
                "interviewer": { "id": 30, "name": "Zed Young" },
                "overall_recommendation": "yes"
            })],
        );

        Self {
            resources,
            ..Self::default()
        }
    }

    pub(crate) fn rejecting(status: u16) -> Self {
        Self {
            reject_with: Some(status),
            ..Self::default()
        }
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl PageSource for FixtureSource {
    fn get_page(&self, url: &str) -> Result<Page, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.reject_with {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let path = url.split('?').next().unwrap_or(url);
        let resource = path.rsplit('/').next().unwrap_or(path);
        Ok(Page {
            records: self.resources.get(resource).cloned().unwrap_or_default(),
            links: PageLinks::default(),
        })
    }
}

/// Hands every caller a clone of the same fixture, sharing its request counter.
pub(crate) struct FixtureConnector(pub(crate) FixtureSource);

impl HarvestConnector for FixtureConnector {
    type Source = FixtureSource;

    fn connect(&self, _api_key: &ApiKey) -> Self::Source {
        self.0.clone()
    }
}
