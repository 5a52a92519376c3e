use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{
	fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use watcher::{
	config::{Cli, Config},
	interface::{dispatch, Method},
	watcher::Watcher,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::registry()
		.with(fmt::layer())
		.with(EnvFilter::from_default_env())
		.init();

	let args = Cli::parse();
	let config = Config::from_args(args)?;
	let watcher = Watcher::from_config(&config);

	match dispatch(&watcher, Method::Start).await {
		Ok(message) => info!("{}", message),
		Err(message) => anyhow::bail!(message),
	}

	loop {
		tokio::select! {
			_ = tokio::signal::ctrl_c() => {
				match dispatch(&watcher, Method::Stop).await {
					Ok(message) => info!("{}", message),
					Err(message) => error!("{}", message),
				}
				break;
			}
			_ = tokio::time::sleep(Duration::from_secs(1)) => {
				if dispatch(&watcher, Method::IsPolling).await.as_deref() != Ok("true") {
					break;
				}
			}
		}
	}

	let state = watcher.state().await;
	info!("Finished after {} polls", state.poll_count);

	match dispatch(&watcher, Method::Get).await {
		Ok(logs) => println!("{}", logs),
		Err(message) => anyhow::bail!(message),
	}

	Ok(())
}
