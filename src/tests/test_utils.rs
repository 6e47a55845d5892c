use crate::{
	activity::ActivitySink,
	config::Config,
	db::{self, DbPool},
	executor::{self, SqlParam},
	handler, user_routes, wallet_routes,
	models::{UserId, Wallet},
};
use actix_web::web;
use bigdecimal::BigDecimal;
use clap::Parser;
use rand::Rng;
use std::sync::{Arc, Mutex};

/// Collects activity messages so tests can assert on them.
#[derive(Default)]
pub struct RecordingSink {
	messages: Mutex<Vec<String>>,
}

impl RecordingSink {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn messages(&self) -> Vec<String> {
		self.messages.lock().unwrap().clone()
	}

	pub fn contains(&self, needle: &str) -> bool {
		self.messages().iter().any(|m| m.contains(needle))
	}
}

impl ActivitySink for RecordingSink {
	fn log(&self, message: &str) {
		self.messages.lock().unwrap().push(message.to_string());
	}
}

/// A pool pointed at a closed port. Nothing connects until a lease is requested,
/// and then the lease fails after a short timeout.
pub fn unreachable_pool() -> DbPool {
	let config = Config::try_parse_from([
		"wallet-service",
		"--database-url",
		"postgres://nobody@127.0.0.1:1/none",
		"--pool-size",
		"1",
		"--acquire-timeout-secs",
		"1",
	])
	.unwrap();
	db::lazy_db_pool(&config)
}

/// A pool against the Postgres configured by `DATABASE_URL` / `DB_*`, with
/// migrations applied.
pub fn live_pool() -> DbPool {
	dotenv::dotenv().ok();
	let config = Config::try_parse_from(["wallet-service"]).unwrap();
	let pool = db::get_db_pool(&config).expect("a running Postgres is required");
	db::init(&pool).expect("migrations failed");
	pool
}

pub fn random_user_id() -> UserId {
	let id: i32 = rand::thread_rng().gen_range(100_000..1_000_000);
	UserId::new(id).unwrap()
}

pub fn clear_wallet(pool: &DbPool, user_id: UserId) {
	executor::execute(pool, "DELETE FROM users_wallet1 WHERE user_id = $1", &[SqlParam::from(user_id)])
		.unwrap();
}

pub fn wallet_of(pool: &DbPool, user_id: UserId) -> Option<Wallet> {
	executor::fetch::<Wallet>(
		pool,
		"SELECT id, user_id, balance FROM users_wallet1 WHERE user_id = $1",
		&[SqlParam::from(user_id)],
	)
	.unwrap()
	.into_iter()
	.next()
}

pub fn balance_of(pool: &DbPool, user_id: UserId) -> Option<BigDecimal> {
	wallet_of(pool, user_id).map(|w| w.balance)
}

/// Registers the same data, body config and routes as the server.
pub fn wiring(pool: DbPool, activity: Arc<RecordingSink>) -> impl FnOnce(&mut web::ServiceConfig) {
	move |cfg| {
		let activity: Arc<dyn ActivitySink> = activity;
		cfg.app_data(web::Data::new(pool))
			.app_data(web::Data::from(activity))
			.app_data(handler::json_config());
		user_routes::init(cfg);
		wallet_routes::init(cfg);
	}
}
