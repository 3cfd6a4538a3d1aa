use ambient_fx::cli::Cli;
use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    ambient_fx::init_logging(cli.log_file.as_deref())?;
    log::info!("starting {} at intensity {:?}", cli.default_effect().label(), cli.intensity);
    ambient_fx::run(cli).await
}
