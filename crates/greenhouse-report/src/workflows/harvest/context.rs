use serde::Serialize;
use tracing::info;

/// Checkpoints reported while an extraction runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStage {
    Starting,
    JobsExtracted,
    ApplicationsExtracted,
    CandidatesExtracted,
    InterviewsExtracted,
    DataExtracted,
    ReportPrepared,
}

impl ExtractionStage {
    pub const fn percent(self) -> u8 {
        match self {
            ExtractionStage::Starting => 0,
            ExtractionStage::JobsExtracted => 20,
            ExtractionStage::ApplicationsExtracted => 50,
            ExtractionStage::CandidatesExtracted => 80,
            ExtractionStage::InterviewsExtracted => 85,
            ExtractionStage::DataExtracted => 98,
            ExtractionStage::ReportPrepared => 100,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ExtractionStage::Starting => "Starting extraction",
            ExtractionStage::JobsExtracted => "Job data extracted",
            ExtractionStage::ApplicationsExtracted => "Application data extracted",
            ExtractionStage::CandidatesExtracted => "Candidate data extracted",
            ExtractionStage::InterviewsExtracted => "Interview data extracted",
            ExtractionStage::DataExtracted => "Data extracted",
            ExtractionStage::ReportPrepared => "Report prepared",
        }
    }

    pub const fn ordered() -> [ExtractionStage; 7] {
        [
            ExtractionStage::Starting,
            ExtractionStage::JobsExtracted,
            ExtractionStage::ApplicationsExtracted,
            ExtractionStage::CandidatesExtracted,
            ExtractionStage::InterviewsExtracted,
            ExtractionStage::DataExtracted,
            ExtractionStage::ReportPrepared,
        ]
    }
}

/// Receives progress updates between pipeline stages.
pub trait ProgressReporter {
    fn report(&self, attempt: u64, stage: ExtractionStage);
}

impl<F> ProgressReporter for F
where
    F: Fn(u64, ExtractionStage),
{
    fn report(&self, attempt: u64, stage: ExtractionStage) {
        self(attempt, stage)
    }
}

/// Logs each stage at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn report(&self, attempt: u64, stage: ExtractionStage) {
        info!(
            attempt,
            percent = stage.percent(),
            stage = stage.label(),
            "extraction progress"
        );
    }
}

/// State owned by a single extraction attempt. A context runs at most once.
#[derive(Debug)]
pub struct ExtractionContext {
    attempt: u64,
    ran: bool,
    stage: Option<ExtractionStage>,
}

impl ExtractionContext {
    pub fn new(attempt: u64) -> Self {
        Self {
            attempt,
            ran: false,
            stage: None,
        }
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn stage(&self) -> Option<ExtractionStage> {
        self.stage
    }

    pub fn has_run(&self) -> bool {
        self.ran
    }

    /// Marks the context as used. Returns `false` if it had already run.
    pub(crate) fn begin(&mut self) -> bool {
        !std::mem::replace(&mut self.ran, true)
    }

    pub(crate) fn advance(&mut self, stage: ExtractionStage, reporter: &dyn ProgressReporter) {
        self.stage = Some(stage);
        reporter.report(self.attempt, stage);
    }
}
