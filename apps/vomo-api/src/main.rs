use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = vomo_api::Args::parse();
	vomo_api::run(args).await
}
