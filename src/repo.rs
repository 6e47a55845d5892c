use crate::{
	activity::ActivitySink,
	db::DbPool,
	errors::{AppError, DbError},
	executor::{self, SqlParam},
	models::{User, UserFields, UserId},
};

const SELECT_ACTIVE_USERS: &str =
	"SELECT id, name, email, is_active FROM users WHERE is_active = $1 ORDER BY id";
const SELECT_ACTIVE_USER: &str =
	"SELECT id, name, email, is_active FROM users WHERE id = $1 AND is_active = TRUE";
const INSERT_USER: &str =
	"INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id, name, email, is_active";
const UPDATE_USER: &str = "UPDATE users SET name = $1, email = $2 \
	WHERE id = $3 AND is_active = TRUE RETURNING id, name, email, is_active";
const DEACTIVATE_USER: &str = "UPDATE users SET is_active = FALSE \
	WHERE id = $1 AND is_active = TRUE RETURNING id, name, email, is_active";
const REACTIVATE_USER: &str = "UPDATE users SET is_active = TRUE \
	WHERE id = $1 AND is_active = FALSE RETURNING id, name, email, is_active";

/// Single-statement user operations. Each one leases a connection for its one
/// statement only.
pub struct UserRepo;

impl UserRepo {
	pub fn list_active(pool: &DbPool, activity: &dyn ActivitySink) -> Result<Vec<User>, AppError> {
		match executor::fetch::<User>(pool, SELECT_ACTIVE_USERS, &[SqlParam::Bool(true)]) {
			Ok(users) => {
				activity.log("Fetched users successfully");
				Ok(users)
			},
			Err(e) => Err(storage_failure(activity, "Failed to fetch users", e)),
		}
	}

	pub fn find_active(
		pool: &DbPool,
		activity: &dyn ActivitySink,
		user_id: UserId,
	) -> Result<User, AppError> {
		let rows = executor::fetch::<User>(pool, SELECT_ACTIVE_USER, &[SqlParam::from(user_id)])
			.map_err(|e| storage_failure(activity, "Failed to fetch user", e))?;
		match rows.into_iter().next() {
			Some(user) => {
				activity.log(&format!("Fetched user successfully for ID: {}", user_id));
				Ok(user)
			},
			None => {
				activity.log(&format!("Fetching user failed for ID {}: User not found", user_id));
				Err(AppError::user_not_found())
			},
		}
	}

	pub fn create(
		pool: &DbPool,
		activity: &dyn ActivitySink,
		fields: UserFields,
	) -> Result<User, AppError> {
		let params = [SqlParam::Text(fields.name), SqlParam::Text(fields.email)];
		let rows = executor::fetch::<User>(pool, INSERT_USER, &params)
			.map_err(|e| storage_failure(activity, "Failed to create user", e))?;
		let user = rows.into_iter().next().ok_or_else(|| {
			activity.log("Error creating user: insert returned no row");
			AppError::Internal("insert returned no row".to_string())
		})?;
		activity.log(&format!("User created successfully with ID: {}", user.id));
		Ok(user)
	}

	/// Updates an active user. A missing or inactive user yields "User not found"
	/// and nothing is written.
	pub fn update(
		pool: &DbPool,
		activity: &dyn ActivitySink,
		user_id: UserId,
		fields: UserFields,
	) -> Result<User, AppError> {
		let params =
			[SqlParam::Text(fields.name), SqlParam::Text(fields.email), SqlParam::from(user_id)];
		let rows = executor::fetch::<User>(pool, UPDATE_USER, &params)
			.map_err(|e| storage_failure(activity, "Failed to update user", e))?;
		Self::single(activity, rows, user_id, "User updated successfully", "Error updating user")
	}

	pub fn soft_delete(
		pool: &DbPool,
		activity: &dyn ActivitySink,
		user_id: UserId,
	) -> Result<User, AppError> {
		let rows = executor::fetch::<User>(pool, DEACTIVATE_USER, &[SqlParam::from(user_id)])
			.map_err(|e| storage_failure(activity, "Failed to delete user", e))?;
		Self::single(activity, rows, user_id, "User deleted successfully", "Error deleting user")
	}

	/// Reactivates a soft-deleted user.
	pub fn recover(
		pool: &DbPool,
		activity: &dyn ActivitySink,
		user_id: UserId,
	) -> Result<User, AppError> {
		let rows = executor::fetch::<User>(pool, REACTIVATE_USER, &[SqlParam::from(user_id)])
			.map_err(|e| storage_failure(activity, "Failed to recover user", e))?;
		Self::single(activity, rows, user_id, "User recovered successfully", "Error recovering user")
	}

	fn single(
		activity: &dyn ActivitySink,
		rows: Vec<User>,
		user_id: UserId,
		success: &str,
		failure: &str,
	) -> Result<User, AppError> {
		match rows.into_iter().next() {
			Some(user) => {
				activity.log(&format!("{} for ID: {}", success, user_id));
				Ok(user)
			},
			None => {
				activity.log(&format!("{} {}: User not found", failure, user_id));
				Err(AppError::user_not_found())
			},
		}
	}
}

fn storage_failure(activity: &dyn ActivitySink, message: &'static str, source: DbError) -> AppError {
	activity.log(&format!("{}: {}", message, source));
	AppError::Storage { message, source }
}
