//! Wallet credit and debit.
//!
//! Each mutation leases one connection and runs begin, read, compute, write and
//! commit on it, rolling back on any failure. The wallet row is read with
//! `FOR UPDATE`, so concurrent mutations of the same wallet queue on the row lock
//! instead of both reading the same starting balance. A first credit inserts with
//! `ON CONFLICT (user_id)`, which folds a racing insert into an increment.

use crate::{
	activity::ActivitySink,
	db::{self, DbPool},
	errors::{AppError, DbError, WalletError, WalletOp},
	executor::{self, SqlParam},
	models::{Amount, UserId, Wallet},
};
use bigdecimal::BigDecimal;
use diesel::{
	connection::{AnsiTransactionManager, TransactionManager},
	pg::PgConnection,
};

const SELECT_WALLET: &str = "SELECT id, user_id, balance FROM users_wallet1 WHERE user_id = $1";
const SELECT_WALLET_FOR_UPDATE: &str =
	"SELECT id, user_id, balance FROM users_wallet1 WHERE user_id = $1 FOR UPDATE";
const INSERT_OR_ADD: &str = "INSERT INTO users_wallet1 (user_id, balance) VALUES ($1, $2) \
	ON CONFLICT (user_id) DO UPDATE SET balance = users_wallet1.balance + EXCLUDED.balance \
	RETURNING id, user_id, balance";
const UPDATE_BALANCE: &str = "UPDATE users_wallet1 SET balance = $1 WHERE user_id = $2 \
	RETURNING id, user_id, balance";

/// Where a wallet mutation stands. Release of the lease is not a state here: it
/// happens when the lease is dropped, on every path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
	Begun,
	BalanceRead,
	BalanceWritten,
	Committed,
	RolledBack,
}

/// An open transaction on a leased connection.
///
/// Holding `&mut PgConnection` means no second transaction can be opened on the
/// same lease while this one is alive. Dropping it without [`commit`] or
/// [`rollback`] rolls back.
///
/// [`commit`]: WalletTx::commit
/// [`rollback`]: WalletTx::rollback
pub struct WalletTx<'c> {
	conn: &'c mut PgConnection,
	state: TxState,
}

impl<'c> WalletTx<'c> {
	pub fn begin(conn: &'c mut PgConnection) -> Result<Self, DbError> {
		AnsiTransactionManager::begin_transaction(&mut *conn)?;
		Ok(Self { conn, state: TxState::Begun })
	}

	#[cfg_attr(not(test), allow(dead_code))]
	pub fn state(&self) -> TxState {
		self.state
	}

	fn transition(&mut self, next: TxState) {
		log::debug!("wallet tx {:?} -> {:?}", self.state, next);
		self.state = next;
	}

	/// Reads and locks the wallet row for `user_id`.
	pub fn read_wallet(&mut self, user_id: UserId) -> Result<Option<Wallet>, DbError> {
		let rows = executor::fetch_on::<Wallet>(
			&mut *self.conn,
			SELECT_WALLET_FOR_UPDATE,
			&[SqlParam::from(user_id)],
		)?;
		self.transition(TxState::BalanceRead);
		Ok(rows.into_iter().next())
	}

	pub fn write_balance(&mut self, user_id: UserId, balance: &BigDecimal) -> Result<Wallet, DbError> {
		let rows = executor::fetch_on::<Wallet>(
			&mut *self.conn,
			UPDATE_BALANCE,
			&[SqlParam::from(balance), SqlParam::from(user_id)],
		)?;
		let wallet = rows.into_iter().next().ok_or(diesel::result::Error::NotFound)?;
		self.transition(TxState::BalanceWritten);
		Ok(wallet)
	}

	/// Creates the wallet with `amount`, or adds `amount` if a concurrent request
	/// created it first.
	pub fn create_or_add(&mut self, user_id: UserId, amount: &BigDecimal) -> Result<Wallet, DbError> {
		let rows = executor::fetch_on::<Wallet>(
			&mut *self.conn,
			INSERT_OR_ADD,
			&[SqlParam::from(user_id), SqlParam::from(amount)],
		)?;
		let wallet = rows.into_iter().next().ok_or(diesel::result::Error::NotFound)?;
		self.transition(TxState::BalanceWritten);
		Ok(wallet)
	}

	pub fn commit(mut self) -> Result<(), DbError> {
		AnsiTransactionManager::commit_transaction(&mut *self.conn)?;
		self.transition(TxState::Committed);
		Ok(())
	}

	pub fn rollback(mut self) -> Result<(), DbError> {
		self.rollback_in_place()
	}

	fn rollback_in_place(&mut self) -> Result<(), DbError> {
		AnsiTransactionManager::rollback_transaction(&mut *self.conn)?;
		self.transition(TxState::RolledBack);
		Ok(())
	}

	fn is_open(&self) -> bool {
		!matches!(self.state, TxState::Committed | TxState::RolledBack)
	}
}

impl Drop for WalletTx<'_> {
	fn drop(&mut self) {
		if self.is_open() {
			log::warn!("wallet tx dropped in state {:?}, rolling back", self.state);
			if let Err(e) = self.rollback_in_place() {
				log::error!("Rollback on drop failed: {}", e);
			}
		}
	}
}

/// Runs `steps` inside one transaction on one leased connection: commit on `Ok`,
/// rollback on `Err`. The lease is released when this returns.
pub(crate) fn run_in_transaction<T, F>(pool: &DbPool, steps: F) -> Result<T, WalletError>
where
	F: FnOnce(&mut WalletTx<'_>) -> Result<T, WalletError>,
{
	let mut lease = db::acquire(pool)?;
	let mut tx = WalletTx::begin(&mut lease)?;
	match steps(&mut tx) {
		Ok(value) => {
			tx.commit()?;
			Ok(value)
		},
		Err(e) => {
			if let Err(rb) = tx.rollback() {
				log::error!("Rollback failed after '{}': {}", e, rb);
			}
			Err(e)
		},
	}
}

pub(crate) fn credit_steps(
	tx: &mut WalletTx<'_>,
	user_id: UserId,
	amount: &Amount,
) -> Result<Wallet, WalletError> {
	let wallet = match tx.read_wallet(user_id)? {
		None => tx.create_or_add(user_id, amount.value())?,
		Some(current) => {
			let new_balance = current.balance + amount.value();
			tx.write_balance(user_id, &new_balance)?
		},
	};
	Ok(wallet)
}

fn debit_steps(tx: &mut WalletTx<'_>, user_id: UserId, amount: &Amount) -> Result<Wallet, WalletError> {
	let current = tx.read_wallet(user_id)?.ok_or(WalletError::NotFound)?;
	if &current.balance < amount.value() {
		return Err(WalletError::InsufficientFunds);
	}
	let new_balance = current.balance - amount.value();
	Ok(tx.write_balance(user_id, &new_balance)?)
}

/// Adds `amount` to the wallet of `user_id`, creating the wallet on first credit.
pub fn credit(
	pool: &DbPool,
	activity: &dyn ActivitySink,
	user_id: UserId,
	amount: &Amount,
) -> Result<Wallet, AppError> {
	match run_in_transaction(pool, |tx| credit_steps(tx, user_id, amount)) {
		Ok(wallet) => {
			activity.log(&format!("Wallet credited successfully for user ID: {}", user_id));
			Ok(wallet)
		},
		Err(e) => {
			activity.log(&format!("Credit wallet failed for user ID {}: {}", user_id, e));
			Err(AppError::Wallet { op: WalletOp::Credit, source: e })
		},
	}
}

/// Takes `amount` from the wallet of `user_id`. Fails without writing when the
/// wallet is missing or holds less than `amount`.
pub fn debit(
	pool: &DbPool,
	activity: &dyn ActivitySink,
	user_id: UserId,
	amount: &Amount,
) -> Result<Wallet, AppError> {
	match run_in_transaction(pool, |tx| debit_steps(tx, user_id, amount)) {
		Ok(wallet) => {
			activity.log(&format!("Wallet debited successfully for user ID: {}", user_id));
			Ok(wallet)
		},
		Err(e) => {
			activity.log(&format!("Debit wallet failed for user ID {}: {}", user_id, e));
			Err(AppError::Wallet { op: WalletOp::Debit, source: e })
		},
	}
}

pub fn find_by_user(
	pool: &DbPool,
	activity: &dyn ActivitySink,
	user_id: UserId,
) -> Result<Wallet, AppError> {
	let rows = executor::fetch::<Wallet>(pool, SELECT_WALLET, &[SqlParam::from(user_id)])
		.map_err(|e| {
			activity.log(&format!("Failed to fetch wallet: {}", e));
			AppError::Storage { message: "Database error", source: e }
		})?;
	match rows.into_iter().next() {
		Some(wallet) => {
			activity.log(&format!("Wallet fetched successfully for user ID: {}", user_id));
			Ok(wallet)
		},
		None => {
			activity.log(&format!("Wallet not found for user ID: {}", user_id));
			Err(AppError::wallet_not_found())
		},
	}
}
