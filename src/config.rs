use clap::Parser;
use std::{path::PathBuf, time::Duration};

/// Process configuration, read once at start-up from flags, the environment and `.env`.
#[derive(Parser, Debug, Clone)]
#[command(name = "wallet-service", version, about = "Users and wallets over a pooled Postgres")]
pub struct Config {
	#[arg(long, env = "DB_HOST", default_value = "localhost")]
	pub db_host: String,

	#[arg(long, env = "DB_PORT", default_value_t = 5432)]
	pub db_port: u16,

	#[arg(long, env = "DB_USER", default_value = "postgres")]
	pub db_user: String,

	#[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
	pub db_password: String,

	#[arg(long, env = "DB_NAME", default_value = "testdb3")]
	pub db_name: String,

	/// Full connection string; takes precedence over the individual `--db-*` parts.
	#[arg(long, env = "DATABASE_URL", hide_env_values = true)]
	pub database_url: Option<String>,

	/// Upper bound on leased connections. Callers beyond it wait for a release.
	#[arg(long, env = "DB_POOL_SIZE", default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
	pub pool_size: u32,

	#[arg(long, env = "DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 30)]
	pub acquire_timeout_secs: u64,

	/// Server side statement timeout in milliseconds, 0 disables it.
	#[arg(long, env = "DB_STATEMENT_TIMEOUT_MS", default_value_t = 5000)]
	pub statement_timeout_ms: u64,

	#[arg(long, env = "SOCKET_URL", default_value = "127.0.0.1:5000")]
	pub socket_url: String,

	#[arg(long, env = "LOG_FILE", default_value = "logs/server.log")]
	pub log_file: PathBuf,
}

impl Config {
	pub fn database_url(&self) -> String {
		match &self.database_url {
			Some(url) => url.clone(),
			None => connection_string(
				&self.db_host,
				self.db_port,
				&self.db_user,
				&self.db_password,
				&self.db_name,
			),
		}
	}

	pub fn acquire_timeout(&self) -> Duration {
		Duration::from_secs(self.acquire_timeout_secs)
	}

	pub fn statement_timeout(&self) -> Duration {
		Duration::from_millis(self.statement_timeout_ms)
	}
}

/// Builds a libpq key/value connection string.
pub fn connection_string(host: &str, port: u16, user: &str, password: &str, dbname: &str) -> String {
	format!(
		"host={} port={} user={} password={} dbname={}",
		quote(host),
		port,
		quote(user),
		quote(password),
		quote(dbname)
	)
}

fn quote(value: &str) -> String {
	let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
	format!("'{}'", escaped)
}
