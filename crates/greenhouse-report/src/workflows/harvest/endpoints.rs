use chrono::{DateTime, Months, SecondsFormat, Utc};
use url::Url;

use super::pagination::FetchError;
use crate::config::HarvestConfig;

/// Fully-qualified list endpoints for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestEndpoints {
    pub jobs: String,
    pub job_stages: String,
    pub applications: String,
    pub candidates: String,
    pub scheduled_interviews: String,
    pub scorecards: String,
}

impl HarvestEndpoints {
    /// Builds the endpoints with activity windows measured back from `now`.
    pub fn build(config: &HarvestConfig, now: DateTime<Utc>) -> Result<Self, FetchError> {
        let activity_after = months_before(now, config.lookback_months);
        let jobs_after = months_before(now, config.job_lookback_months);
        let per_page = config.per_page.to_string();

        let endpoint = |path: &str, filter: Option<(&str, &str)>| -> Result<String, FetchError> {
            let raw = format!("{}/{}", config.base_url, path);
            let mut url = Url::parse(&raw).map_err(|source| FetchError::InvalidUrl {
                url: raw.clone(),
                source,
            })?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("per_page", &per_page);
                if let Some((key, value)) = filter {
                    query.append_pair(key, value);
                }
            }
            Ok(url.into())
        };

        Ok(Self {
            jobs: endpoint("jobs", Some(("updated_after", jobs_after.as_str())))?,
            job_stages: endpoint("job_stages", None)?,
            applications: endpoint(
                "applications",
                Some(("last_activity_after", activity_after.as_str())),
            )?,
            candidates: endpoint(
                "candidates",
                Some(("updated_after", activity_after.as_str())),
            )?,
            scheduled_interviews: endpoint(
                "scheduled_interviews",
                Some(("updated_after", activity_after.as_str())),
            )?,
            scorecards: endpoint(
                "scorecards",
                Some(("updated_after", activity_after.as_str())),
            )?,
        })
    }
}

fn months_before(now: DateTime<Utc>, months: u32) -> String {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(now)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 15, 30, 0)
            .single()
            .expect("valid instant")
    }

    #[test]
    fn endpoints_carry_activity_windows() {
        let config = HarvestConfig::default();
        let endpoints = HarvestEndpoints::build(&config, fixed_now()).expect("endpoints build");

        assert_eq!(
            endpoints.jobs,
            "https://harvest.greenhouse.io/v1/jobs?per_page=500&updated_after=2025-10-19T15%3A30%3A00Z"
        );
        assert_eq!(
            endpoints.applications,
            "https://harvest.greenhouse.io/v1/applications?per_page=500&last_activity_after=2026-07-19T15%3A30%3A00Z"
        );
        assert_eq!(
            endpoints.job_stages,
            "https://harvest.greenhouse.io/v1/job_stages?per_page=500"
        );
        assert!(endpoints
            .scorecards
            .ends_with("scorecards?per_page=500&updated_after=2026-07-19T15%3A30%3A00Z"));
        assert!(endpoints
            .scheduled_interviews
            .contains("/v1/scheduled_interviews?"));
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let config = HarvestConfig {
            base_url: "not a url".to_string(),
            ..HarvestConfig::default()
        };
        let error = HarvestEndpoints::build(&config, fixed_now()).expect_err("invalid base");
        assert!(matches!(error, FetchError::InvalidUrl { .. }));
    }
}
