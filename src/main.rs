mod activity;
mod config;
mod db;
mod errors;
mod executor;
mod handler;
mod models;
mod repo;
mod schema;
#[cfg(test)]
mod tests;
mod user_routes;
mod wallet;
mod wallet_routes;
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clap::Parser;

use activity::{ActivitySink, FileActivityLog};
use config::Config;
use dotenv::dotenv;
use env_logger::Env;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
	dotenv().ok();
	env_logger::init_from_env(Env::default().default_filter_or("info"));
	let config = Config::parse();

	let pool = db::get_db_pool(&config).context("Unable to connect to the database")?;
	db::init(&pool).context("Unable to initialize the db")?;

	let activity_log = FileActivityLog::open(&config.log_file)
		.with_context(|| format!("Unable to open log file {}", config.log_file.display()))?;
	let activity: web::Data<dyn ActivitySink> =
		web::Data::from(Arc::new(activity_log) as Arc<dyn ActivitySink>);

	log::info!("Listening on: {}..", config.socket_url);

	HttpServer::new(move || {
		App::new()
			.app_data(web::Data::new(pool.clone()))
			.app_data(activity.clone())
			.app_data(handler::json_config())
			.wrap(
				Cors::default()
					.allow_any_origin()
					.allow_any_method()
					.allow_any_header()
					.max_age(3600),
			)
			.wrap(actix_web::middleware::Logger::default())
			.configure(user_routes::init)
			.configure(wallet_routes::init)
	})
	.bind(&config.socket_url)?
	.run()
	.await?;

	Ok(())
}
