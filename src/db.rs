use crate::{config::Config, errors::DbError};
use diesel::{
	prelude::*,
	r2d2::{self, ConnectionManager, CustomizeConnection, PoolError},
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// A leased connection. Dropping it hands the connection back to the pool.
pub type DbConn = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Applies per-session settings to every physical connection the pool opens.
#[derive(Debug, Clone, Copy)]
struct SessionSettings {
	statement_timeout: Duration,
}

impl CustomizeConnection<PgConnection, r2d2::Error> for SessionSettings {
	fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), r2d2::Error> {
		if self.statement_timeout.is_zero() {
			return Ok(());
		}
		let millis = self.statement_timeout.as_millis();
		diesel::sql_query(format!("SET statement_timeout = {}", millis))
			.execute(conn)
			.map(|_| ())
			.map_err(r2d2::Error::QueryError)
	}
}

fn pool_builder(config: &Config) -> r2d2::Builder<ConnectionManager<PgConnection>> {
	r2d2::Pool::builder()
		.max_size(config.pool_size)
		.connection_timeout(config.acquire_timeout())
		.connection_customizer(Box::new(SessionSettings {
			statement_timeout: config.statement_timeout(),
		}))
}

/// Builds the pool and opens its first connection, failing fast when the
/// database is unreachable.
pub fn get_db_pool(config: &Config) -> Result<DbPool, PoolError> {
	let manager = ConnectionManager::<PgConnection>::new(config.database_url());
	let pool = pool_builder(config).build(manager)?;
	log::info!("Database connected successfully (pool size {})", config.pool_size);
	Ok(pool)
}

/// Builds the pool without opening any connection.
#[cfg(test)]
pub fn lazy_db_pool(config: &Config) -> DbPool {
	let manager = ConnectionManager::<PgConnection>::new(config.database_url());
	pool_builder(config).build_unchecked(manager)
}

/// Leases a connection, waiting up to the configured acquire timeout while the
/// pool is exhausted.
pub fn acquire(pool: &DbPool) -> Result<DbConn, DbError> {
	pool.get().map_err(|e| {
		log::error!("Database connection error: {:?}", e);
		DbError::Pool(e)
	})
}

pub fn init(pool: &DbPool) -> anyhow::Result<()> {
	let mut lease = acquire(pool)?;
	let conn: &mut PgConnection = &mut lease;
	let applied = conn
		.run_pending_migrations(MIGRATIONS)
		.map_err(|e| anyhow::anyhow!("failed to run migrations: {}", e))?;
	for version in applied {
		log::info!("Applied migration {}", version);
	}
	Ok(())
}
