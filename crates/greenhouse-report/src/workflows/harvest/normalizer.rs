use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Structural problems found while flattening raw records.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("{entity} record {id} is missing required field '{field}'")]
    MissingField {
        entity: &'static str,
        id: String,
        field: &'static str,
    },
    #[error("{entity} record {id} has an unparseable timestamp '{value}'")]
    InvalidTimestamp {
        entity: &'static str,
        id: String,
        value: String,
    },
}

/// Identifies the record that failed so errors stay actionable without the payload.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RecordRef {
    pub(crate) entity: &'static str,
    pub(crate) id: Option<u64>,
}

impl RecordRef {
    pub(crate) fn new(entity: &'static str, id: Option<u64>) -> Self {
        Self { entity, id }
    }

    fn label(&self) -> String {
        self.id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "<no id>".to_string())
    }

    pub(crate) fn require<T>(
        &self,
        value: Option<T>,
        field: &'static str,
    ) -> Result<T, NormalizeError> {
        value.ok_or_else(|| NormalizeError::MissingField {
            entity: self.entity,
            id: self.label(),
            field,
        })
    }

    /// Parses an ISO-8601 timestamp and converts it into `zone`.
    pub(crate) fn local_time(
        &self,
        value: Option<&str>,
        field: &'static str,
        zone: Tz,
    ) -> Result<DateTime<Tz>, NormalizeError> {
        let raw = self.require(value, field)?;
        parse_timestamp(raw)
            .map(|instant| instant.with_timezone(&zone))
            .ok_or_else(|| NormalizeError::InvalidTimestamp {
                entity: self.entity,
                id: self.label(),
                value: raw.to_string(),
            })
    }
}

/// Accepts RFC 3339 and offset-less timestamps, the latter read as UTC.
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn surname_key(name: &str) -> &str {
    name.split_whitespace().last().unwrap_or_default()
}

/// Permutation ordering `names` by last word in codepoint order, so capitalised surnames
/// sort ahead of lowercase ones. Ties keep input order.
pub(crate) fn surname_order(names: &[String]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..names.len()).collect();
    order.sort_by_key(|&index| surname_key(&names[index]));
    order
}

pub(crate) fn sorted_by_surname(names: Vec<String>) -> Vec<String> {
    let order = surname_order(&names);
    permute(names, &order)
}

pub(crate) fn permute<T: Clone>(values: Vec<T>, order: &[usize]) -> Vec<T> {
    order.iter().map(|&index| values[index].clone()).collect()
}
