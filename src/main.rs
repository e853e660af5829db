mod configuration;
mod monitor;
mod scheduler;
mod twitch;

use std::io;
use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use configuration::Configuration;
use monitor::Monitor;
use scheduler::Scheduler;
use twitch::TwitchHelixAPI;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = match Configuration::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let api = TwitchHelixAPI::new(
        config.client_id,
        config.client_secret,
        config.token_url,
        config.helix_url,
        config.request_timeout,
    )?;
    let monitor = Monitor::new(api, config.channel_name);
    let scheduler = Scheduler::new(config.poll_interval, CancellationToken::new());

    let shutdown = scheduler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            shutdown.cancel();
        }
    });

    info!(channel = monitor.channel_name(), "monitoring channel");
    let monitor = &monitor;
    scheduler
        .run(move || async move {
            monitor.run_cycle(&mut io::stdout()).await;
        })
        .await;

    Ok(ExitCode::SUCCESS)
}
