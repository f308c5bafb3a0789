/// Office-name fragments mapped to location codes; the first match wins.
const OFFICE_CODES: &[(&str, &str)] = &[
    ("chicago", "CHI"),
    ("minn", "MSP"),
    ("atlanta", "ATL"),
    ("kosovo", "KOS"),
    ("detroit", "DET"),
    ("macedonia", "MAC"),
    ("dallas", "DAL"),
];

pub const UNKNOWN_LOCATION: &str = "UNKNOWN";

/// Job-name prefixes recognised as location codes, with their canonical code.
const JOB_PREFIXES: &[(&str, &str)] = &[
    ("KOS", "KOS"),
    ("CHI", "CHI"),
    ("ATL", "ATL"),
    ("MSP", "MSP"),
    ("ALB", "ALB"),
    ("DET", "DET"),
    ("DAL", "DAL"),
    ("DFW", "DAL"),
];

/// Pipeline stages whose interviews make it into the report.
pub const REPORTED_STAGES: [&str; 4] = [
    "Preliminary Phone Screen",
    "Stage 1",
    "Stage 2",
    "Stage 3",
];

pub fn office_location(office: &str) -> &'static str {
    let lowered = office.to_lowercase();
    OFFICE_CODES
        .iter()
        .find(|(fragment, _)| lowered.contains(fragment))
        .map(|(_, code)| *code)
        .unwrap_or(UNKNOWN_LOCATION)
}

pub(crate) fn is_archived(job_name: &str) -> bool {
    job_name.to_lowercase().contains("archive")
}

pub fn job_location(job_name: &str) -> Option<&'static str> {
    if is_archived(job_name) {
        return None;
    }

    let prefix = job_name.get(..3)?;
    JOB_PREFIXES
        .iter()
        .find(|(candidate, _)| *candidate == prefix)
        .map(|(_, code)| *code)
}

pub fn is_reported_stage(stage_name: &str) -> bool {
    REPORTED_STAGES.contains(&stage_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn office_location_matches_case_insensitive_fragments() {
        assert_eq!(office_location("123 N Michigan, Chicago"), "CHI");
        assert_eq!(office_location("remote detroit"), "DET");
        assert_eq!(office_location("Minneapolis"), "MSP");
        assert_eq!(office_location("Skopje, MACEDONIA"), "MAC");
        assert_eq!(office_location("Nowhere, USA"), "UNKNOWN");
    }

    #[test]
    fn office_location_prefers_earlier_entries() {
        assert_eq!(office_location("Chicago / Dallas hybrid"), "CHI");
    }

    #[test]
    fn job_location_reads_prefix_codes() {
        assert_eq!(job_location("DFWSomething"), Some("DAL"));
        assert_eq!(job_location("CHI-Senior Engineer"), Some("CHI"));
        assert_eq!(job_location("ALB Analyst"), Some("ALB"));
        assert_eq!(job_location("ATL-Archived Req"), None);
        assert_eq!(job_location("XYZ-role"), None);
        assert_eq!(job_location("chi-lowercase"), None);
        assert_eq!(job_location("CH"), None);
    }

    #[test]
    fn reported_stages_are_exact_names() {
        assert!(is_reported_stage("Stage 2"));
        assert!(is_reported_stage("Preliminary Phone Screen"));
        assert!(!is_reported_stage("stage 2"));
        assert!(!is_reported_stage("Offer"));
    }
}
