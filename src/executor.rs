//! Parameterized statement execution.
//!
//! Every dynamic value travels as a bound [`SqlParam`]; statements use Postgres
//! `$n` placeholders and are never assembled from user input.
//!
//! Two modes are offered. The pool-managed functions ([`execute`], [`fetch`])
//! lease a connection for the one statement and hand it back on every exit path.
//! The caller-managed functions ([`execute_on`], [`fetch_on`]) run on a connection
//! the caller already holds, so several statements can share one transaction.

use crate::{
	db::{self, DbPool},
	errors::DbError,
	models::UserId,
};
use bigdecimal::BigDecimal;
use diesel::{
	pg::Pg,
	prelude::*,
	query_builder::{BoxedSqlQuery, SqlQuery},
	sql_types::{Bool, Integer, Numeric, Text},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
	Int(i32),
	Text(String),
	Bool(bool),
	Numeric(BigDecimal),
}

impl From<i32> for SqlParam {
	fn from(v: i32) -> Self {
		SqlParam::Int(v)
	}
}

impl From<UserId> for SqlParam {
	fn from(v: UserId) -> Self {
		SqlParam::Int(v.get())
	}
}

impl From<&str> for SqlParam {
	fn from(v: &str) -> Self {
		SqlParam::Text(v.to_string())
	}
}

impl From<String> for SqlParam {
	fn from(v: String) -> Self {
		SqlParam::Text(v)
	}
}

impl From<bool> for SqlParam {
	fn from(v: bool) -> Self {
		SqlParam::Bool(v)
	}
}

impl From<BigDecimal> for SqlParam {
	fn from(v: BigDecimal) -> Self {
		SqlParam::Numeric(v)
	}
}

impl From<&BigDecimal> for SqlParam {
	fn from(v: &BigDecimal) -> Self {
		SqlParam::Numeric(v.clone())
	}
}

fn prepare(statement: &str, params: &[SqlParam]) -> Result<BoxedSqlQuery<'static, Pg, SqlQuery>, DbError> {
	if statement.trim().is_empty() {
		return Err(DbError::InvalidQuery);
	}
	let mut query = diesel::sql_query(statement).into_boxed::<Pg>();
	for param in params {
		query = match param {
			SqlParam::Int(v) => query.bind::<Integer, _>(*v),
			SqlParam::Text(v) => query.bind::<Text, _>(v.clone()),
			SqlParam::Bool(v) => query.bind::<Bool, _>(*v),
			SqlParam::Numeric(v) => query.bind::<Numeric, _>(v.clone()),
		};
	}
	Ok(query)
}

/// Runs a statement on a caller-held connection and returns the affected row count.
#[cfg_attr(not(test), allow(dead_code))]
pub fn execute_on(conn: &mut PgConnection, statement: &str, params: &[SqlParam]) -> Result<usize, DbError> {
	let query = prepare(statement, params)?;
	Ok(query.execute(conn)?)
}

/// Runs a row-returning statement on a caller-held connection.
pub fn fetch_on<T>(conn: &mut PgConnection, statement: &str, params: &[SqlParam]) -> Result<Vec<T>, DbError>
where
	T: QueryableByName<Pg> + 'static,
{
	let query = prepare(statement, params)?;
	Ok(query.load::<T>(conn)?)
}

#[cfg_attr(not(test), allow(dead_code))]
pub fn execute(pool: &DbPool, statement: &str, params: &[SqlParam]) -> Result<usize, DbError> {
	let query = prepare(statement, params)?;
	let mut conn = db::acquire(pool)?;
	Ok(query.execute(&mut *conn)?)
}

pub fn fetch<T>(pool: &DbPool, statement: &str, params: &[SqlParam]) -> Result<Vec<T>, DbError>
where
	T: QueryableByName<Pg> + 'static,
{
	let query = prepare(statement, params)?;
	let mut conn = db::acquire(pool)?;
	Ok(query.load::<T>(&mut *conn)?)
}
