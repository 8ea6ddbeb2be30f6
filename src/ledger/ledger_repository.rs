use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::get_connection;
use crate::ledger::ledger_errors::{LedgerError, Result};
use crate::ledger::ledger_model::*;
use crate::ledger::ledger_traits::TransactionRepositoryTrait;
use crate::schema::{schemes, transactions};

/// Repository for managing ledger rows in the database
pub struct TransactionRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository instance
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<crate::db::DbConnection> {
        get_connection(&self.pool).map_err(|e| LedgerError::DatabaseError(e.to_string()))
    }

    fn create_internal(
        conn: &mut SqliteConnection,
        new_transaction: NewTransaction,
    ) -> Result<Transaction> {
        new_transaction.validate()?;

        let now = Utc::now().naive_utc();
        let transaction_db = TransactionDB {
            id: new_transaction
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            scheme_code: new_transaction.scheme_code.clone(),
            account_name: new_transaction.account_name.clone(),
            txn_type: new_transaction.txn_type.clone(),
            plan_kind: new_transaction.plan_kind.clone(),
            amount: new_transaction.amount,
            units: new_transaction.resolved_units(),
            nav_price: new_transaction.nav_price,
            txn_date: new_transaction.txn_date,
            remarks: new_transaction.remarks.clone(),
            created_at: now,
            updated_at: now,
        };

        diesel::insert_into(transactions::table)
            .values(&transaction_db)
            .get_result::<TransactionDB>(conn)
            .map(Transaction::from)
            .map_err(LedgerError::from)
    }

    fn update_internal(
        conn: &mut SqliteConnection,
        update: TransactionUpdate,
    ) -> Result<Transaction> {
        update.validate()?;

        let existing = transactions::table
            .find(&update.id)
            .first::<TransactionDB>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => LedgerError::NotFound(format!(
                    "Transaction with id {} not found",
                    update.id
                )),
                _ => LedgerError::DatabaseError(e.to_string()),
            })?;

        let transaction_db = TransactionDB {
            id: existing.id.clone(),
            scheme_code: update.scheme_code,
            account_name: update.account_name,
            txn_type: update.txn_type,
            plan_kind: update.plan_kind,
            amount: update.amount,
            // Edits keep the ledger identity by re-deriving units.
            units: update.amount / update.nav_price,
            nav_price: update.nav_price,
            txn_date: update.txn_date,
            remarks: update.remarks,
            created_at: existing.created_at,
            updated_at: Utc::now().naive_utc(),
        };

        diesel::update(transactions::table.find(&existing.id))
            .set(&transaction_db)
            .get_result::<TransactionDB>(conn)
            .map(Transaction::from)
            .map_err(LedgerError::from)
    }
}

impl TransactionRepositoryTrait for TransactionRepository {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = self.conn()?;

        transactions::table
            .find(transaction_id)
            .first::<TransactionDB>(&mut conn)
            .map(Transaction::from)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => LedgerError::NotFound(format!(
                    "Transaction with id {} not found",
                    transaction_id
                )),
                _ => LedgerError::DatabaseError(e.to_string()),
            })
    }

    /// Retrieves all transactions, oldest first with stable tie-breaking
    fn get_transactions(&self) -> Result<Vec<Transaction>> {
        let mut conn = self.conn()?;

        transactions::table
            .order((
                transactions::txn_date.asc(),
                transactions::created_at.asc(),
                transactions::id.asc(),
            ))
            .load::<TransactionDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Transaction::from).collect())
            .map_err(LedgerError::from)
    }

    fn filter_transactions(
        &self,
        scheme_code: Option<&str>,
        account_name: Option<&str>,
        txn_type: Option<&str>,
        plan_kind: Option<&str>,
    ) -> Result<Vec<Transaction>> {
        let mut conn = self.conn()?;

        let mut query = transactions::table.into_boxed();

        if let Some(scheme) = scheme_code {
            query = query.filter(transactions::scheme_code.eq(scheme.to_string()));
        }
        if let Some(account) = account_name {
            query = query.filter(transactions::account_name.eq(account.to_string()));
        }
        if let Some(kind) = txn_type {
            query = query.filter(transactions::txn_type.eq(kind.to_string()));
        }
        if let Some(plan) = plan_kind {
            query = query.filter(transactions::plan_kind.eq(plan.to_string()));
        }

        query
            .order((
                transactions::txn_date.asc(),
                transactions::created_at.asc(),
                transactions::id.asc(),
            ))
            .load::<TransactionDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Transaction::from).collect())
            .map_err(LedgerError::from)
    }

    fn get_transactions_for_holding(
        &self,
        scheme_code: &str,
        account_name: &str,
    ) -> Result<Vec<Transaction>> {
        let mut conn = self.conn()?;
        self.get_transactions_for_holding_in_transaction(&mut conn, scheme_code, account_name)
    }

    fn get_transactions_for_holding_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        scheme_code: &str,
        account_name: &str,
    ) -> Result<Vec<Transaction>> {
        transactions::table
            .filter(transactions::scheme_code.eq(scheme_code))
            .filter(transactions::account_name.eq(account_name))
            .order((
                transactions::txn_date.asc(),
                transactions::created_at.asc(),
                transactions::id.asc(),
            ))
            .load::<TransactionDB>(conn)
            .map(|rows| rows.into_iter().map(Transaction::from).collect())
            .map_err(LedgerError::from)
    }

    /// BUY rows for one holding, newest first — the reconciliation walk order
    fn get_buys_newest_first_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        scheme_code: &str,
        account_name: &str,
    ) -> Result<Vec<Transaction>> {
        transactions::table
            .filter(transactions::scheme_code.eq(scheme_code))
            .filter(transactions::account_name.eq(account_name))
            .filter(transactions::txn_type.eq(TransactionType::Buy.as_str()))
            .order((
                transactions::txn_date.desc(),
                transactions::created_at.desc(),
                transactions::id.desc(),
            ))
            .load::<TransactionDB>(conn)
            .map(|rows| rows.into_iter().map(Transaction::from).collect())
            .map_err(LedgerError::from)
    }

    /// Display-ready rows with scheme metadata joined on
    fn get_transaction_details(
        &self,
        scheme_code: Option<&str>,
        account_name: Option<&str>,
        plan_kind: Option<&str>,
    ) -> Result<Vec<TransactionDetails>> {
        let mut conn = self.conn()?;

        let mut query = transactions::table
            .inner_join(schemes::table.on(schemes::scheme_code.eq(transactions::scheme_code)))
            .select((
                transactions::id,
                transactions::scheme_code,
                transactions::account_name,
                transactions::txn_type,
                transactions::plan_kind,
                transactions::amount,
                transactions::units,
                transactions::nav_price,
                transactions::txn_date,
                transactions::remarks,
                schemes::scheme_name,
                schemes::category,
                schemes::fund_house,
            ))
            .into_boxed();

        if let Some(scheme) = scheme_code {
            query = query.filter(transactions::scheme_code.eq(scheme.to_string()));
        }
        if let Some(account) = account_name {
            query = query.filter(transactions::account_name.eq(account.to_string()));
        }
        if let Some(plan) = plan_kind {
            query = query.filter(transactions::plan_kind.eq(plan.to_string()));
        }

        query
            .order(transactions::txn_date.desc())
            .load::<TransactionDetails>(&mut conn)
            .map_err(LedgerError::from)
    }

    fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        let mut conn = self.conn()?;
        Self::create_internal(&mut conn, new_transaction)
    }

    fn create_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        new_transaction: NewTransaction,
    ) -> Result<Transaction> {
        Self::create_internal(conn, new_transaction)
    }

    fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction> {
        let mut conn = self.conn()?;
        Self::update_internal(&mut conn, update)
    }

    fn update_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        update: TransactionUpdate,
    ) -> Result<Transaction> {
        Self::update_internal(conn, update)
    }

    fn delete_transaction(&self, transaction_id: &str) -> Result<()> {
        let mut conn = self.conn()?;
        self.delete_in_transaction(&mut conn, transaction_id)
    }

    fn delete_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        transaction_id: &str,
    ) -> Result<()> {
        let affected = diesel::delete(transactions::table.find(transaction_id))
            .execute(conn)
            .map_err(LedgerError::from)?;

        if affected == 0 {
            return Err(LedgerError::NotFound(format!(
                "Transaction with id {} not found",
                transaction_id
            )));
        }
        Ok(())
    }

    /// Wipes every transaction of a scheme across all accounts
    fn delete_for_scheme(&self, scheme_code: &str) -> Result<usize> {
        let mut conn = self.conn()?;
        self.delete_for_scheme_in_transaction(&mut conn, scheme_code)
    }

    fn delete_for_scheme_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        scheme_code: &str,
    ) -> Result<usize> {
        diesel::delete(transactions::table.filter(transactions::scheme_code.eq(scheme_code)))
            .execute(conn)
            .map_err(LedgerError::from)
    }

    /// Removes the SIP buys a mandate generated for its (scheme, account) pair
    fn delete_for_mandate_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        scheme_code: &str,
        account_name: &str,
    ) -> Result<usize> {
        diesel::delete(
            transactions::table
                .filter(transactions::scheme_code.eq(scheme_code))
                .filter(transactions::account_name.eq(account_name))
                .filter(transactions::plan_kind.eq(PlanKind::Sip.as_str())),
        )
        .execute(conn)
        .map_err(LedgerError::from)
    }

    /// Shrinks a BUY in place during reconciliation, keeping its NAV.
    fn shrink_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        transaction_id: &str,
        new_amount: f64,
        new_units: f64,
    ) -> Result<Transaction> {
        diesel::update(transactions::table.find(transaction_id))
            .set((
                transactions::amount.eq(new_amount),
                transactions::units.eq(new_units),
                transactions::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<TransactionDB>(conn)
            .map(Transaction::from)
            .map_err(LedgerError::from)
    }

    /// Relabels a mandate's SIP buys as lumpsum purchases
    fn convert_plan_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        scheme_code: &str,
        account_name: &str,
    ) -> Result<usize> {
        diesel::update(
            transactions::table
                .filter(transactions::scheme_code.eq(scheme_code))
                .filter(transactions::account_name.eq(account_name))
                .filter(transactions::plan_kind.eq(PlanKind::Sip.as_str())),
        )
        .set((
            transactions::plan_kind.eq(Some(PlanKind::Lumpsum.as_str().to_string())),
            transactions::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)
        .map_err(LedgerError::from)
    }

    fn rename_account_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        old_name: &str,
        new_name: &str,
    ) -> Result<usize> {
        diesel::update(transactions::table.filter(transactions::account_name.eq(old_name)))
            .set((
                transactions::account_name.eq(new_name),
                transactions::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)
            .map_err(LedgerError::from)
    }

    fn count_for_account(&self, account_name: &str) -> Result<i64> {
        let mut conn = self.conn()?;

        transactions::table
            .filter(transactions::account_name.eq(account_name))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(LedgerError::from)
    }
}
