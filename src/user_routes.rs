use crate::handler::UserHandler;
use actix_web::web;

pub fn init(cfg: &mut web::ServiceConfig) {
	cfg.service(
		web::scope("/api/v1/users")
			// user mgmt routes
			.route("", web::get().to(UserHandler::list_users_handler))
			.route("", web::post().to(UserHandler::create_user_handler))
			.route("/{id}", web::get().to(UserHandler::get_user_handler))
			.route("/{id}", web::put().to(UserHandler::update_user_handler))
			.route("/{id}", web::delete().to(UserHandler::delete_user_handler))
			.route("/{id}/recover", web::patch().to(UserHandler::recover_user_handler)),
	);
}
