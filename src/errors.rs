use crate::models::{ApiResponse, Empty};
use actix_web::{error::BlockingError, http::StatusCode, HttpResponse, ResponseError};
use diesel::r2d2::PoolError;
use std::fmt;
use thiserror::Error;

/// Failures of the storage layer: the pool, or a statement run through it.
#[derive(Debug, Error)]
pub enum DbError {
	#[error("SQL query is required")]
	InvalidQuery,

	#[error("Unable to acquire a database connection: {0}")]
	Pool(#[from] PoolError),

	#[error(transparent)]
	Query(#[from] diesel::result::Error),
}

#[derive(Debug, Error)]
pub enum WalletError {
	#[error("Wallet not found")]
	NotFound,

	#[error("Insufficient funds")]
	InsufficientFunds,

	#[error(transparent)]
	Storage(#[from] DbError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletOp {
	Credit,
	Debit,
}

impl fmt::Display for WalletOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			WalletOp::Credit => f.write_str("Credit failed"),
			WalletOp::Debit => f.write_str("Debit failed"),
		}
	}
}

#[derive(Debug, Error)]
pub enum AppError {
	/// Bad input shape, caught before storage is touched.
	#[error("{message}")]
	Validation { message: &'static str, detail: &'static str },

	#[error("{message}")]
	NotFound { message: &'static str, detail: &'static str },

	#[error("{message}: {source}")]
	Storage {
		message: &'static str,
		#[source]
		source: DbError,
	},

	#[error("{op}: {source}")]
	Wallet {
		op: WalletOp,
		#[source]
		source: WalletError,
	},

	#[error("Internal error: {0}")]
	Internal(String),
}

impl AppError {
	pub fn invalid_user_id() -> Self {
		AppError::Validation {
			message: "Invalid user ID",
			detail: "User ID must be a positive number.",
		}
	}

	pub fn invalid_amount() -> Self {
		AppError::Validation {
			message: "Invalid amount",
			detail: "Amount must be a number greater than zero.",
		}
	}

	pub fn invalid_data() -> Self {
		AppError::Validation {
			message: "Invalid data",
			detail: "The request could not be performed as the data is invalid.",
		}
	}

	pub fn user_not_found() -> Self {
		AppError::NotFound { message: "User not found", detail: "The requested user does not exist." }
	}

	pub fn wallet_not_found() -> Self {
		AppError::NotFound { message: "Wallet not found", detail: "No wallet exists for this user." }
	}

	/// Short message for the envelope's `message` field.
	pub fn message(&self) -> String {
		match self {
			AppError::Validation { message, .. } |
			AppError::NotFound { message, .. } |
			AppError::Storage { message, .. } => message.to_string(),
			AppError::Wallet { op, .. } => op.to_string(),
			AppError::Internal(_) => "Internal server error".to_string(),
		}
	}

	/// Longer explanation for the envelope's `statusMessage` field.
	pub fn status_message(&self) -> String {
		match self {
			AppError::Validation { detail, .. } | AppError::NotFound { detail, .. } =>
				detail.to_string(),
			AppError::Storage { source, .. } =>
				format!("The server encountered an internal error: {}", source),
			AppError::Wallet { source, .. } => source.to_string(),
			AppError::Internal(reason) => reason.clone(),
		}
	}
}

impl From<BlockingError> for AppError {
	fn from(err: BlockingError) -> Self {
		AppError::Internal(err.to_string())
	}
}

impl ResponseError for AppError {
	fn status_code(&self) -> StatusCode {
		match self {
			AppError::Validation { .. } => StatusCode::BAD_REQUEST,
			AppError::NotFound { .. } => StatusCode::NOT_FOUND,
			AppError::Wallet { source: WalletError::NotFound, .. } => StatusCode::NOT_FOUND,
			AppError::Wallet { source: WalletError::InsufficientFunds, .. } =>
				StatusCode::BAD_REQUEST,
			AppError::Wallet { source: WalletError::Storage(_), .. } |
			AppError::Storage { .. } |
			AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn error_response(&self) -> HttpResponse {
		let status = self.status_code();
		if status.is_server_error() {
			log::error!("Request failed: {}", self);
		} else {
			log::warn!("Request rejected: {}", self);
		}
		HttpResponse::build(status)
			.json(ApiResponse::<Empty>::failure(self.message(), self.status_message()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::body::to_bytes;

	#[test]
	fn status_codes_follow_the_taxonomy() {
		assert_eq!(AppError::invalid_user_id().status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(AppError::user_not_found().status_code(), StatusCode::NOT_FOUND);
		assert_eq!(
			AppError::Wallet { op: WalletOp::Debit, source: WalletError::InsufficientFunds }
				.status_code(),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			AppError::Wallet { op: WalletOp::Debit, source: WalletError::NotFound }.status_code(),
			StatusCode::NOT_FOUND
		);
		assert_eq!(
			AppError::Storage { message: "Failed to fetch users", source: DbError::InvalidQuery }
				.status_code(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}

	#[test]
	fn wallet_failures_carry_the_underlying_message() {
		let err = AppError::Wallet {
			op: WalletOp::Credit,
			source: WalletError::Storage(DbError::InvalidQuery),
		};
		assert_eq!(err.message(), "Credit failed");
		assert_eq!(err.status_message(), "SQL query is required");
		assert_eq!(err.to_string(), "Credit failed: SQL query is required");
	}

	#[actix_web::test]
	async fn error_response_renders_the_envelope() {
		let resp = AppError::Wallet { op: WalletOp::Debit, source: WalletError::InsufficientFunds }
			.error_response();
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

		let body = to_bytes(resp.into_body()).await.unwrap();
		let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
		assert_eq!(
			json,
			serde_json::json!({
				"success": false,
				"message": "Debit failed",
				"statusMessage": "Insufficient funds",
				"data": {}
			})
		);
	}
}
