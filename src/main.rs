use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use jerc_merge::engine::check::JobChecker;
use jerc_merge::engine::manifest::ManifestStore;
use jerc_merge::engine::merge::{HaddCombiner, MergeAggregator, RunState};
use jerc_merge::engine::pipeline::{PipelineRunner, Stage};
use jerc_merge::engine::validate::{CommandExtractor, CountValidator, LevelLocator, Verdict};
use jerc_merge::logging;
use jerc_merge::shared::config::{Settings, load_settings};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "jerc_merge")]
#[command(about = "Merge, validate and check JERC histogram outputs", long_about = None)]
struct Args {
    /// Config file (defaults to $JERC_MERGE_CONFIG, then ./config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Only process these channels
    #[arg(long = "channel", global = true)]
    channels: Vec<String>,

    /// Only process these years
    #[arg(long = "year", global = true)]
    years: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge job outputs into one file per era sample
    MergeJobs,
    /// Merge era outputs into one file per year group
    MergeEras,
    /// Merge yearly outputs into one file per run period group
    MergeYears,
    /// Run the three merge stages in order
    MergeAll,
    /// Check that a sample's event count is conserved across levels
    Validate {
        #[arg(long = "sample", required = true)]
        samples: Vec<String>,
    },
    /// List unfinished job outputs for resubmission
    CheckJobs,
}

fn extractor(settings: &Settings) -> anyhow::Result<Arc<CommandExtractor>> {
    let Some(program) = &settings.validate.extractor_program else {
        bail!("validate.extractor_program is not configured");
    };
    Ok(Arc::new(CommandExtractor::new(
        program,
        settings.validate.extractor_args.clone(),
        settings.validate.not_found_exit_code,
    )))
}

async fn merge(settings: &Settings, stages: &[Stage], run_state: RunState) -> anyhow::Result<ExitCode> {
    let combiner = Arc::new(HaddCombiner::new(
        &settings.merge.combiner_program,
        settings.merge.combiner_args.clone(),
    ));
    let aggregator = MergeAggregator::new(combiner, settings.aggregator_options());
    let runner = PipelineRunner::new(settings.pipeline_config(), aggregator, run_state);

    let summary = match runner.run_all(stages).await {
        Ok(summary) => summary,
        Err(e) => {
            e.log_error();
            return Err(e.into());
        }
    };

    println!("{}", summary);
    Ok(ExitCode::from(summary.exit_code()))
}

fn validate(settings: &Settings, samples: &[String]) -> anyhow::Result<ExitCode> {
    let extractor = extractor(settings)?;
    let validator = CountValidator::new(&settings.validate.hist_locator, settings.validate.tolerance);

    let mut failed = false;
    for channel in &settings.run.channels {
        let locator = LevelLocator::new(
            &settings.paths.hist_dir,
            channel,
            settings.run.years.clone(),
            &settings.run.run_period,
        );
        for result in validator.validate_samples(samples, &locator, extractor.as_ref()) {
            failed |= result.verdict != Verdict::Pass;
            println!("[{}] {}", locator.channel(), result);
        }
    }
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn check_jobs(settings: &Settings) -> anyhow::Result<ExitCode> {
    let mut checker = JobChecker::new(settings.check.min_size_bytes);
    if let Some(locator) = &settings.check.cutflow_locator {
        checker = checker.with_cutflow(locator, extractor(settings)?);
    }

    let store = ManifestStore::new(&settings.paths.manifest_dir);
    for channel in &settings.run.channels {
        for year in &settings.run.years {
            match checker.run(&store, channel, year)? {
                Some(report) => println!(
                    "{} {}: {} of {} job outputs unfinished",
                    channel,
                    year,
                    report.unfinished_count(),
                    report.checked
                ),
                None => warn!(%channel, %year, "No job manifest, skipping"),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref()).context("Failed to load configuration")?;
    settings.narrow(&args.channels, &args.years);
    settings.absolutize_paths();
    logging::init(&settings.logging)?;

    info!(
        channels = ?settings.run.channels,
        years = ?settings.run.years,
        "JERC merge starting"
    );

    let run_state = RunState::new();
    {
        let run_state = run_state.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, finishing in-flight merges and stopping");
                run_state.cancel();
            }
        });
    }

    match args.command {
        Command::MergeJobs => merge(&settings, &[Stage::JobsToEra], run_state).await,
        Command::MergeEras => merge(&settings, &[Stage::EraToYear], run_state).await,
        Command::MergeYears => merge(&settings, &[Stage::YearToRunPeriod], run_state).await,
        Command::MergeAll => merge(&settings, &Stage::ALL, run_state).await,
        Command::Validate { samples } => validate(&settings, &samples),
        Command::CheckJobs => check_jobs(&settings),
    }
}
