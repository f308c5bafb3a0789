use clap::{Args, ValueEnum};
use greenhouse_report::config::AppConfig;
use greenhouse_report::error::AppError;
use greenhouse_report::telemetry;
use greenhouse_report::workflows::harvest::{
    ApiKey, ExtractionError, ExtractionService, ExtractionStage, HarvestReport, HttpConnector,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ReportFormat {
    pub(crate) const fn extension(self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Xlsx => "xlsx",
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ExtractArgs {
    /// Harvest API key (falls back to HARVEST_API_KEY)
    #[arg(long)]
    pub(crate) api_key: Option<String>,
    /// Destination file (defaults to Results.csv or Results.xlsx)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = ReportFormat::Csv)]
    pub(crate) format: ReportFormat,
    /// Only walk the trailing N pages of each endpoint
    #[arg(long)]
    pub(crate) history_pages: Option<u32>,
}

pub(crate) fn progress_line(stage: ExtractionStage) -> String {
    format!("[{:>3}%] {}", stage.percent(), stage.label())
}

/// Zero pages means "no bound", matching `HARVEST_HISTORY_PAGES`.
pub(crate) fn history_bound(pages: u32) -> Option<u32> {
    Some(pages).filter(|pages| *pages > 0)
}

pub(crate) fn output_path(output: Option<PathBuf>, format: ReportFormat) -> PathBuf {
    output.unwrap_or_else(|| PathBuf::from(format!("Results.{}", format.extension())))
}

pub(crate) fn write_report(
    report: &HarvestReport,
    path: &Path,
    format: ReportFormat,
) -> Result<(), AppError> {
    match format {
        ReportFormat::Csv => {
            let file = File::create(path)?;
            report
                .write_csv(BufWriter::new(file))
                .map_err(ExtractionError::from)?;
        }
        ReportFormat::Xlsx => report.write_xlsx(path).map_err(ExtractionError::from)?,
    }
    Ok(())
}

pub(crate) async fn run_extract(args: ExtractArgs) -> Result<(), AppError> {
    let ExtractArgs {
        api_key,
        output,
        format,
        history_pages,
    } = args;

    let mut config = AppConfig::load()?;
    if let Some(pages) = history_pages {
        config.harvest.history_pages = history_bound(pages);
    }
    telemetry::init(&config.telemetry)?;

    let api_key = api_key
        .or_else(|| config.harvest.api_key.clone())
        .as_deref()
        .and_then(ApiKey::new)
        .ok_or(ExtractionError::MissingApiKey)?;
    let path = output_path(output, format);

    let service = Arc::new(ExtractionService::new(HttpConnector, config.harvest));
    let report = tokio::task::spawn_blocking(move || {
        let mut context = service.context();
        let progress = |_attempt: u64, stage: ExtractionStage| eprintln!("{}", progress_line(stage));
        service.extract(&mut context, &api_key, &progress)
    })
    .await
    .map_err(ExtractionError::from)??;

    write_report(&report, &path, format)?;
    info!(rows = report.len(), path = %path.display(), "report written");
    println!("Wrote {} rows to {}", report.len(), path.display());
    Ok(())
}
