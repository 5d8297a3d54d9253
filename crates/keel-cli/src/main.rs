// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `keel` - operator command line for tenancy provisioning.
//!
//! Results are printed to stdout as JSON. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use keel_config::{KeelConfig, LogFormat};
use keel_core::{EntityFactory, OsRandom, SystemClock};
use keel_db::{create_pool, run_migrations, Datastore, SqliteDatastore};
use keel_provisioning::{
	GenesisRequest, GenesisService, OrgKindService, OrgService, PingService,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "keel", about = "Keel tenancy provisioning", version)]
struct Args {
	/// Config file; defaults to /etc/keel/keel.toml
	#[arg(long, global = true, env = "KEEL_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Create the schema if it does not exist
	Migrate,
	/// Check that the database answers
	Ping,
	/// Run the one-time genesis bootstrap
	Seed {
		#[arg(long)]
		username: String,
		#[arg(long)]
		first_name: String,
		#[arg(long)]
		last_name: String,
	},
	/// Inspect orgs
	Orgs {
		#[command(subcommand)]
		command: OrgsCommand,
	},
	/// Inspect org kinds
	Kinds {
		#[command(subcommand)]
		command: KindsCommand,
	},
}

#[derive(Subcommand, Debug)]
enum OrgsCommand {
	List,
	Show { external_id: String },
}

#[derive(Subcommand, Debug)]
enum KindsCommand {
	List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => keel_config::load_config_with_file(path),
		None => keel_config::load_config(),
	}
	.context("failed to load configuration")?;

	init_tracing(&config);
	tracing::debug!(database = %config.database.url, command = ?args.command, "starting keel");

	let pool = create_pool(&config.database.url)
		.await
		.context("failed to open database")?;
	let datastore: Arc<dyn Datastore> = Arc::new(SqliteDatastore::new(pool.clone()));

	match args.command {
		Command::Migrate => {
			run_migrations(&pool).await.context("migration failed")?;
			print_json(&serde_json::json!({ "migrated": true }))?;
		}
		Command::Ping => {
			print_json(&PingService::new(datastore).ping().await)?;
		}
		Command::Seed {
			username,
			first_name,
			last_name,
		} => {
			let service = GenesisService::new(datastore, factory(&config)?, Arc::new(SystemClock));
			let response = service
				.seed(&GenesisRequest {
					seed_username: username,
					seed_user_first_name: first_name,
					seed_user_last_name: last_name,
				})
				.await
				.context("genesis failed")?;
			print_json(&response)?;
		}
		Command::Orgs { command } => {
			let service = OrgService::new(datastore, factory(&config)?);
			match command {
				OrgsCommand::List => print_json(&service.find_all().await?)?,
				OrgsCommand::Show { external_id } => {
					print_json(&service.find_by_external_id(&external_id).await?)?
				}
			}
		}
		Command::Kinds {
			command: KindsCommand::List,
		} => {
			let service = OrgKindService::new(datastore, factory(&config)?);
			print_json(&service.find_all().await?)?;
		}
	}

	pool.close().await;
	Ok(())
}

fn init_tracing(config: &KeelConfig) {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());
	let registry = tracing_subscriber::registry().with(filter);

	match config.logging.format {
		LogFormat::Json => registry
			.with(
				tracing_subscriber::fmt::layer()
					.json()
					.with_writer(std::io::stderr),
			)
			.init(),
		LogFormat::Pretty => registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init(),
	}
}

fn factory(config: &KeelConfig) -> anyhow::Result<EntityFactory> {
	let key = config
		.security
		.encryption_key
		.clone()
		.context("an encryption key is required; set KEEL_ENCRYPTION_KEY or security.encryption_key")?;
	Ok(EntityFactory::new(Arc::new(OsRandom), key))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn cli_definition_is_consistent() {
		Args::command().debug_assert();
	}

	#[test]
	fn seed_takes_the_seed_user() {
		let args = Args::try_parse_from([
			"keel",
			"seed",
			"--username",
			"root",
			"--first-name",
			"Ada",
			"--last-name",
			"Lovelace",
		])
		.unwrap();
		match args.command {
			Command::Seed {
				username,
				first_name,
				last_name,
			} => {
				assert_eq!(username, "root");
				assert_eq!(first_name, "Ada");
				assert_eq!(last_name, "Lovelace");
			}
			other => panic!("unexpected command {other:?}"),
		}
	}

	#[test]
	fn orgs_show_takes_an_external_id() {
		let args = Args::try_parse_from(["keel", "--config", "/tmp/k.toml", "orgs", "show", "abc"])
			.unwrap();
		assert_eq!(args.config, Some(PathBuf::from("/tmp/k.toml")));
		assert!(matches!(
			args.command,
			Command::Orgs {
				command: OrgsCommand::Show { .. }
			}
		));
	}

	#[test]
	fn seed_requires_every_name() {
		assert!(Args::try_parse_from(["keel", "seed", "--username", "root"]).is_err());
	}
}
