use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use std::fmt;

use super::pagination::{parse_link_header, FetchError, Page, PageSource};

/// Harvest API key. Debug output is redacted so keys never reach the logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Harvest uses the key as the basic-auth user name with an empty password.
    pub fn basic_auth_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:", self.0)))
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// Blocking HTTP page source backed by a `ureq` agent.
pub struct HarvestHttpClient {
    agent: ureq::Agent,
    authorization: String,
}

impl HarvestHttpClient {
    pub fn new(api_key: &ApiKey) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("greenhouse-report/", env!("CARGO_PKG_VERSION")))
            .build();

        Self {
            agent,
            authorization: api_key.basic_auth_header(),
        }
    }
}

impl PageSource for HarvestHttpClient {
    fn get_page(&self, url: &str) -> Result<Page, FetchError> {
        let response = self
            .agent
            .get(url)
            .set("Authorization", &self.authorization)
            .set("Content-Type", "application/json")
            .call()
            .map_err(|err| fetch_error_from_ureq(url, err))?;

        let status = response.status();
        if !(200..=299).contains(&status) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let links = response
            .header("link")
            .map(parse_link_header)
            .unwrap_or_default();
        let records: Vec<Value> =
            response
                .into_json()
                .map_err(|err| FetchError::InvalidBody {
                    url: url.to_string(),
                    detail: err.to_string(),
                })?;

        Ok(Page { records, links })
    }
}

fn fetch_error_from_ureq(url: &str, err: ureq::Error) -> FetchError {
    match err {
        ureq::Error::Status(status, _) => FetchError::Status {
            url: url.to_string(),
            status,
        },
        ureq::Error::Transport(transport) => FetchError::Transport {
            url: url.to_string(),
            detail: transport.to_string(),
        },
    }
}
