use crate::{
	activity::ActivitySink,
	db::DbPool,
	errors::AppError,
	models::{
		Amount, AmountRequest, ApiResponse, DeletedUser, User, UserFields, UserId, UserPayload,
		Wallet,
	},
	repo::UserRepo,
	wallet,
};
use actix_web::{web, HttpResponse};

type Activity = web::Data<dyn ActivitySink>;

/// Parses the path id, recording the rejection before anything touches storage.
fn user_id_from_path(activity: &Activity, raw: &str, action: &str) -> Result<UserId, AppError> {
	UserId::parse(raw).inspect_err(|_| {
		activity.log(&format!("{} failed for ID (Invalid ID, must be a positive number): {}", action, raw))
	})
}

fn user_fields(activity: &Activity, payload: UserPayload, action: &str) -> Result<UserFields, AppError> {
	UserFields::try_from(payload)
		.inspect_err(|_| activity.log(&format!("{} failed (Invalid data)", action)))
}

fn amount_from_body(activity: &Activity, req: &AmountRequest, action: &str) -> Result<Amount, AppError> {
	Amount::parse(req.amount.as_ref())
		.inspect_err(|_| activity.log(&format!("{} failed (Invalid amount)", action)))
}

pub struct UserHandler {}

impl UserHandler {
	pub async fn list_users_handler(
		pool: web::Data<DbPool>,
		activity: Activity,
	) -> Result<HttpResponse, AppError> {
		let users = web::block(move || UserRepo::list_active(&pool, &**activity)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::<Vec<User>>::ok(
			"Users fetched successfully",
			"The resource has been fetched and transmitted in the message body.",
			users,
		)))
	}

	pub async fn get_user_handler(
		pool: web::Data<DbPool>,
		activity: Activity,
		path: web::Path<String>,
	) -> Result<HttpResponse, AppError> {
		let user_id = user_id_from_path(&activity, &path, "Fetching user")?;
		let user = web::block(move || UserRepo::find_active(&pool, &**activity, user_id)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::<User>::ok(
			"User fetched successfully",
			"The resource has been fetched and transmitted in the message body.",
			user,
		)))
	}

	pub async fn create_user_handler(
		pool: web::Data<DbPool>,
		activity: Activity,
		req: web::Json<UserPayload>,
	) -> Result<HttpResponse, AppError> {
		let fields = user_fields(&activity, req.into_inner(), "User creation")?;
		let user = web::block(move || UserRepo::create(&pool, &**activity, fields)).await??;
		Ok(HttpResponse::Created().json(ApiResponse::<User>::ok(
			"User created successfully",
			"The request has been fulfilled and has resulted in one or more new resources being created.",
			user,
		)))
	}

	pub async fn update_user_handler(
		pool: web::Data<DbPool>,
		activity: Activity,
		path: web::Path<String>,
		req: web::Json<UserPayload>,
	) -> Result<HttpResponse, AppError> {
		let user_id = user_id_from_path(&activity, &path, "User update")?;
		let fields = user_fields(&activity, req.into_inner(), "User update")?;
		let user =
			web::block(move || UserRepo::update(&pool, &**activity, user_id, fields)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::<User>::ok(
			"User updated successfully",
			"The request has been fulfilled and has resulted in one or more existing resources being modified.",
			user,
		)))
	}

	pub async fn delete_user_handler(
		pool: web::Data<DbPool>,
		activity: Activity,
		path: web::Path<String>,
	) -> Result<HttpResponse, AppError> {
		let user_id = user_id_from_path(&activity, &path, "User deletion")?;
		let user = web::block(move || UserRepo::soft_delete(&pool, &**activity, user_id)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::<DeletedUser>::ok(
			"User deleted successfully",
			"The request has been fulfilled and has resulted in one or more existing resources being modified.",
			DeletedUser { id: user.id },
		)))
	}

	pub async fn recover_user_handler(
		pool: web::Data<DbPool>,
		activity: Activity,
		path: web::Path<String>,
	) -> Result<HttpResponse, AppError> {
		let user_id = user_id_from_path(&activity, &path, "User recovery")?;
		let user = web::block(move || UserRepo::recover(&pool, &**activity, user_id)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::<User>::ok(
			"User recovered successfully",
			"The request has been fulfilled and has resulted in one or more existing resources being modified.",
			user,
		)))
	}
}

pub struct WalletHandler {}

impl WalletHandler {
	pub async fn get_wallet_handler(
		pool: web::Data<DbPool>,
		activity: Activity,
		path: web::Path<String>,
	) -> Result<HttpResponse, AppError> {
		let user_id = user_id_from_path(&activity, &path, "Fetching wallet")?;
		let wallet =
			web::block(move || wallet::find_by_user(&pool, &**activity, user_id)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::<Wallet>::ok(
			"Wallet fetched successfully",
			"Balance details",
			wallet,
		)))
	}

	pub async fn credit_handler(
		pool: web::Data<DbPool>,
		activity: Activity,
		path: web::Path<String>,
		req: web::Json<AmountRequest>,
	) -> Result<HttpResponse, AppError> {
		let user_id = user_id_from_path(&activity, &path, "Credit wallet")?;
		let amount = amount_from_body(&activity, &req, "Credit wallet")?;
		let wallet =
			web::block(move || wallet::credit(&pool, &**activity, user_id, &amount)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::<Wallet>::ok(
			"Amount credited successfully",
			"Wallet updated.",
			wallet,
		)))
	}

	pub async fn debit_handler(
		pool: web::Data<DbPool>,
		activity: Activity,
		path: web::Path<String>,
		req: web::Json<AmountRequest>,
	) -> Result<HttpResponse, AppError> {
		let user_id = user_id_from_path(&activity, &path, "Debit wallet")?;
		let amount = amount_from_body(&activity, &req, "Debit wallet")?;
		let wallet =
			web::block(move || wallet::debit(&pool, &**activity, user_id, &amount)).await??;
		Ok(HttpResponse::Ok().json(ApiResponse::<Wallet>::ok(
			"Amount debited successfully",
			"Wallet updated.",
			wallet,
		)))
	}
}

/// Renders malformed JSON bodies with the same envelope as every other rejection.
pub fn json_config() -> web::JsonConfig {
	web::JsonConfig::default().error_handler(|err, _req| {
		log::warn!("Rejected request body: {}", err);
		AppError::invalid_data().into()
	})
}
