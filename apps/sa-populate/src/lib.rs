use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use sa_service::{PopulateReport, SmartActionService};

/// Rebuilds the labeled-example index from a dataset file.
#[derive(Debug, Parser)]
#[command(
	version = sa_cli::VERSION,
	rename_all = "kebab",
	styles = sa_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Overrides `[dataset].path` from the config.
	#[arg(long, value_name = "FILE")]
	pub dataset: Option<PathBuf>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = sa_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let dataset_path = dataset_path(&args, &config)?;
	let dataset = sa_service::load_dataset(&dataset_path)?;

	tracing::info!(path = %dataset_path.display(), messages = dataset.len(), "Dataset loaded.");

	let service = SmartActionService::connect(config)?;
	let report = service.populate(&dataset).await?;

	check_report(&report)?;

	tracing::info!(examples = report.examples, upserted = report.upserted, "Populate finished.");

	Ok(())
}

pub fn dataset_path(args: &Args, config: &sa_config::Config) -> color_eyre::Result<PathBuf> {
	args.dataset
		.clone()
		.or_else(|| config.dataset.path.as_ref().map(PathBuf::from))
		.ok_or_else(|| eyre::eyre!("No dataset given. Pass --dataset or set [dataset].path."))
}

/// Nothing written for a non-empty dataset means the index is unusable.
pub fn check_report(report: &PopulateReport) -> color_eyre::Result<()> {
	if report.examples > 0 && report.upserted == 0 {
		return Err(eyre::eyre!(
			"Unable to push embeddings to the index ({} examples, none written).",
			report.examples
		));
	}

	Ok(())
}
