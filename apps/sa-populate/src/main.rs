use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = sa_populate::Args::parse();

	sa_populate::run(args).await
}
