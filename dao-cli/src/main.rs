//! BTC DAO CLI creates BTC proposals on the DAO contract and votes on them.
//!
//! Every command prints JSON to stdout. Writes wait until the transaction
//! is mined and print it along with the refreshed proposal board.
use std::{io::stdout, path::PathBuf};

use clap::{Parser, Subcommand};
use dao_cli::{
	commands::{
		create::{create_proposal, CreateArgs},
		init::init,
		proposals::list_proposals,
		utils::connect_board,
		vote::{vote, VoteArgs},
	},
	config::{default_config_path, read_config},
};
use tracing_subscriber::{
	fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
	/// Config file to use instead of ~/.config/btc-dao/config.toml
	#[arg(short, long, global = true, value_name = "FILE")]
	config_file: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
	/// Write a config template
	Init,
	/// List the proposals
	Proposals,
	/// Create a proposal
	Create(CreateArgs),
	/// Vote in favor of a proposal
	Vote(VoteArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
	tracing_subscriber::registry()
		.with(fmt::layer().with_writer(std::io::stderr))
		.with(EnvFilter::from_default_env())
		.init();

	let args = Cli::parse();

	let config_path = match args.config_file {
		Some(config_path) => config_path,
		None => default_config_path()?,
	};

	if let Command::Init = args.command {
		return init(&config_path);
	}

	let config = read_config(&config_path)?;
	let mut board = connect_board(&config).await?;

	match args.command {
		Command::Init => Ok(()),
		Command::Proposals => {
			let view = list_proposals(&mut board).await?;
			serde_json::to_writer_pretty(stdout(), &view)?;
			Ok(())
		}
		Command::Create(create_args) => {
			let report = create_proposal(&mut board, &create_args).await?;
			serde_json::to_writer_pretty(stdout(), &report)?;
			Ok(())
		}
		Command::Vote(vote_args) => {
			let report = vote(&mut board, &vote_args).await?;
			serde_json::to_writer_pretty(stdout(), &report)?;
			Ok(())
		}
	}
}
