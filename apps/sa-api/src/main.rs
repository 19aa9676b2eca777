use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = sa_api::Args::parse();

	sa_api::run(args).await
}
