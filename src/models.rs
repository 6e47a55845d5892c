use crate::{errors::AppError, schema::*};
use bigdecimal::{BigDecimal, Zero};
use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use validator::Validate;

#[derive(QueryableByName, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(Pg))]
pub struct User {
	pub id: i32,
	pub name: String,
	pub email: String,
	#[serde(rename = "isActive")]
	pub is_active: bool,
}

#[derive(QueryableByName, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = users_wallet1)]
#[diesel(check_for_backend(Pg))]
pub struct Wallet {
	pub id: i32,
	pub user_id: i32,
	pub balance: BigDecimal,
}

/// Body of `POST /users` and `PUT /users/{id}`.
#[derive(Serialize, Deserialize, Validate, Debug, Default)]
pub struct UserPayload {
	#[validate(required, length(min = 1, max = 255))]
	pub name: Option<String>,
	#[validate(required, length(min = 1, max = 255))]
	pub email: Option<String>,
}

/// A validated name/email pair.
#[derive(Debug, Clone, PartialEq)]
pub struct UserFields {
	pub name: String,
	pub email: String,
}

impl TryFrom<UserPayload> for UserFields {
	type Error = AppError;

	fn try_from(payload: UserPayload) -> Result<Self, Self::Error> {
		if let Err(e) = payload.validate() {
			log::debug!("User payload rejected: {}", e);
			return Err(AppError::invalid_data());
		}
		match (payload.name, payload.email) {
			(Some(name), Some(email)) => Ok(UserFields { name, email }),
			_ => Err(AppError::invalid_data()),
		}
	}
}

/// Body of the wallet credit/debit endpoints. `amount` may be a JSON number or a
/// numeric string.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct AmountRequest {
	pub amount: Option<serde_json::Value>,
}

/// A storage-assigned user identifier, always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(i32);

impl UserId {
	pub fn new(id: i32) -> Option<Self> {
		(id > 0).then_some(UserId(id))
	}

	pub fn parse(raw: &str) -> Result<Self, AppError> {
		raw.trim().parse::<i32>().ok().and_then(UserId::new).ok_or_else(AppError::invalid_user_id)
	}

	pub fn get(self) -> i32 {
		self.0
	}
}

impl fmt::Display for UserId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// Most digits a NUMERIC column holds after the decimal point.
pub const MAX_FRACTIONAL_DIGITS: i64 = 16383;
/// Most digits a NUMERIC column holds before the decimal point.
pub const MAX_INTEGER_DIGITS: i64 = 131072;

/// A strictly positive monetary amount that fits a NUMERIC column.
#[derive(Debug, Clone, PartialEq)]
pub struct Amount(BigDecimal);

impl Amount {
	/// Bounds are checked on the raw digits and exponent before any arithmetic.
	pub fn new(value: BigDecimal) -> Option<Self> {
		let (_, scale) = value.as_bigint_and_scale();
		let integer_digits = (value.digits() as i64).saturating_sub(scale);
		if scale > MAX_FRACTIONAL_DIGITS || integer_digits > MAX_INTEGER_DIGITS {
			return None;
		}
		(value > BigDecimal::zero()).then_some(Amount(value))
	}

	pub fn parse(raw: Option<&serde_json::Value>) -> Result<Self, AppError> {
		let value = match raw {
			Some(serde_json::Value::Number(n)) => BigDecimal::from_str(&n.to_string()).ok(),
			Some(serde_json::Value::String(s)) => BigDecimal::from_str(s.trim()).ok(),
			_ => None,
		};
		value.and_then(Amount::new).ok_or_else(AppError::invalid_amount)
	}

	pub fn value(&self) -> &BigDecimal {
		&self.0
	}
}

impl fmt::Display for Amount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// Serializes as `{}`, the envelope's `data` when there is nothing to return.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Empty {}

#[derive(Serialize, Deserialize, Debug)]
pub struct DeletedUser {
	pub id: i32,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
	pub success: bool,
	pub message: String,
	#[serde(rename = "statusMessage")]
	pub status_message: String,
	pub data: T,
}

impl<T> ApiResponse<T> {
	pub fn ok(message: &str, status_message: &str, data: T) -> Self {
		ApiResponse {
			success: true,
			message: message.to_string(),
			status_message: status_message.to_string(),
			data,
		}
	}
}

impl ApiResponse<Empty> {
	pub fn failure(message: String, status_message: String) -> Self {
		ApiResponse { success: false, message, status_message, data: Empty {} }
	}
}
