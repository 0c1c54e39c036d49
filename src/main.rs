use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use rostercal::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with custom format
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use chrono::Local;
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let cli = Cli::parse();
    info!("Starting rostercal");

    if let Err(err) = rostercal::commands::run(cli).await {
        error!("Command failed: {:?}", err);
        return Err(err);
    }
    Ok(())
}
