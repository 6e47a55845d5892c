use crate::handler::WalletHandler;
use actix_web::web;

pub fn init(cfg: &mut web::ServiceConfig) {
	cfg.service(
		web::scope("/api/v1/wallet")
			.route("/{id}", web::get().to(WalletHandler::get_wallet_handler))
			.route("/{id}/credit", web::post().to(WalletHandler::credit_handler))
			.route("/{id}/debit", web::post().to(WalletHandler::debit_handler)),
	);
}
