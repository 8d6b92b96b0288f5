//! The `analyze` subcommand.

use std::time::Duration;

use clap::Args;
use futures::StreamExt as _;

use crate::{
    async_utils::io::{read_json_or_toml, write_output},
    batch::{SheetCounterExt as _, SheetCounters, extract_sheets},
    export::{ExportFormat, ReportSection, Sections, render},
    extraction::{
        ExtractionService, cache::ExtractionCache,
        engines::synthetic::{DEFAULT_LATENCY, SyntheticRosterEngine},
    },
    merge::{MissingSubjectPolicy, merge},
    prelude::*,
    stats::{AnalysisConfig, report::AnalysisReport},
    ui::{ProgressConfig, Ui},
};

/// Analyze command line arguments.
#[derive(Debug, Args)]
pub struct AnalyzeOpts {
    /// Mark sheet images to analyze. Their rosters are merged in this order.
    #[clap(required = true, value_name = "IMAGES")]
    pub image_paths: Vec<PathBuf>,

    /// A TOML or JSON file with analysis settings.
    #[clap(long = "config", value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    /// The highest mark available in each subject [default: 50].
    #[clap(long = "max-marks", value_name = "N")]
    pub max_marks_per_subject: Option<u32>,

    /// The minimum overall percentage needed to pass [default: 40].
    #[clap(long, value_name = "P")]
    pub pass_threshold: Option<f64>,

    /// How to record subjects that only some sheets have.
    #[clap(long = "missing-subjects", value_enum, default_value_t)]
    pub missing_subjects: MissingSubjectPolicy,

    /// Output format.
    #[clap(long, value_enum, default_value_t)]
    pub format: ExportFormat,

    /// Report sections to include. May be repeated or comma-separated. The
    /// class summary and student marks are always included. [default: all]
    #[clap(long = "sections", value_enum, value_delimiter = ',', value_name = "SECTION")]
    pub sections: Vec<ReportSection>,

    /// The output path to write the report to. Defaults to stdout.
    #[clap(short = 'o', long = "out")]
    pub output_path: Option<PathBuf>,

    /// Max number of sheets to analyze at a time.
    #[clap(short = 'j', long = "jobs", default_value = "8")]
    pub job_count: usize,

    /// Simulated time taken to analyze each sheet, in milliseconds.
    #[clap(long, value_name = "MS")]
    pub latency_ms: Option<u64>,
}

impl AnalyzeOpts {
    /// Work out our analysis settings. Command-line flags override the
    /// config file, which overrides the defaults.
    async fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config_path {
            Some(path) => read_json_or_toml::<AnalysisConfig>(path).await?,
            None => AnalysisConfig::default(),
        };
        if let Some(max_marks) = self.max_marks_per_subject {
            config.max_marks_per_subject = max_marks;
        }
        if let Some(threshold) = self.pass_threshold {
            config.pass_threshold = threshold;
        }
        config.validate().context("invalid analysis settings")?;
        Ok(config)
    }

    fn latency(&self) -> Duration {
        self.latency_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_LATENCY)
    }
}

/// The `analyze` subcommand.
#[instrument(level = "debug", skip_all, fields(sheets = opts.image_paths.len()))]
pub async fn cmd_analyze(ui: Ui, opts: &AnalyzeOpts) -> Result<()> {
    let config = opts.analysis_config().await?;
    debug!(?config, "Using analysis settings");

    let service = Arc::new(ExtractionService::new(
        Arc::new(SyntheticRosterEngine::new(opts.latency())),
        Arc::new(ExtractionCache::new()),
    ));

    // Configure our progress bar.
    let pb = ui.new_progress_bar(
        &ProgressConfig {
            emoji: "📝",
            msg: "Analyzing sheets",
            done_msg: "Analyzed sheets",
        },
        opts.image_paths.len() as u64,
    );

    let job_count = opts.job_count.max(1);
    let outcomes =
        extract_sheets(service.clone(), opts.image_paths.clone()).buffered(job_count);
    let (outcomes, counters) = SheetCounters::wrap_stream(pb.wrap_stream(outcomes).boxed());
    let outcomes = outcomes.collect::<Vec<_>>().await;
    drop(pb);
    debug!(cached = service.cache().len(), "Finished extracting rosters");
    counters.finish(&ui);

    let rosters = outcomes
        .into_iter()
        .filter_map(|outcome| outcome.roster)
        .collect::<Vec<_>>();
    let roster = merge(&rosters, opts.missing_subjects)
        .context("no mark sheets could be analyzed")?;
    info!(
        students = roster.students().len(),
        subjects = roster.subjects().len(),
        "Merged rosters"
    );

    let report = AnalysisReport::build(roster, config);
    let sections = Sections::from_selected(&opts.sections);
    let output = render(&report, opts.format, &sections)?;
    write_output(opts.output_path.as_deref(), &output).await
}
