//! Filter-then-project passes turning raw Harvest records into flat rows.

mod applications;
mod candidates;
mod interviews;
mod jobs;
mod scorecards;
mod stages;

pub use applications::{normalize_applications, ApplicationRow};
pub use candidates::{normalize_candidates, CandidateRow};
pub use interviews::{normalize_interviews, InterviewRow};
pub use jobs::{normalize_jobs, JobRow};
pub use scorecards::{normalize_scorecards, ScorecardGroup, NO_DECISION};
pub use stages::{normalize_stages, StageRow};
