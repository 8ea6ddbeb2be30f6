use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::accounts::accounts_errors::{AccountError, Result};
use crate::accounts::accounts_model::{Account, NewAccount};
use crate::accounts::accounts_traits::AccountRepositoryTrait;
use crate::db::get_connection;
use crate::schema::accounts;

/// Repository for managing account entities in the database
pub struct AccountRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl AccountRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<crate::db::DbConnection> {
        get_connection(&self.pool).map_err(|e| AccountError::DatabaseError(e.to_string()))
    }
}

impl AccountRepositoryTrait for AccountRepository {
    fn get_account(&self, account_id: &str) -> Result<Account> {
        let mut conn = self.conn()?;

        accounts::table
            .find(account_id)
            .first::<Account>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    AccountError::NotFound(format!("Account with id {} not found", account_id))
                }
                _ => AccountError::DatabaseError(e.to_string()),
            })
    }

    fn get_account_by_name(&self, name: &str) -> Result<Account> {
        let mut conn = self.conn()?;

        accounts::table
            .filter(accounts::name.eq(name))
            .first::<Account>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    AccountError::NotFound(format!("Account '{}' not found", name))
                }
                _ => AccountError::DatabaseError(e.to_string()),
            })
    }

    /// All accounts, default first, then alphabetically
    fn get_accounts(&self) -> Result<Vec<Account>> {
        let mut conn = self.conn()?;

        accounts::table
            .order((accounts::is_default.desc(), accounts::name.asc()))
            .load::<Account>(&mut conn)
            .map_err(AccountError::from)
    }

    fn create_account(&self, new_account: NewAccount) -> Result<Account> {
        new_account.validate()?;
        let mut conn = self.conn()?;

        let now = Utc::now().naive_utc();
        let account = Account {
            id: new_account
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: new_account.name.trim().to_string(),
            is_default: false,
            created_at: now,
            updated_at: now,
        };

        diesel::insert_into(accounts::table)
            .values(&account)
            .get_result::<Account>(&mut conn)
            .map_err(AccountError::from)
    }

    fn rename_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        account_id: &str,
        new_name: &str,
    ) -> Result<Account> {
        diesel::update(accounts::table.find(account_id))
            .set((
                accounts::name.eq(new_name),
                accounts::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<Account>(conn)
            .map_err(AccountError::from)
    }

    fn delete_account(&self, account_id: &str) -> Result<()> {
        let mut conn = self.conn()?;

        let affected = diesel::delete(accounts::table.find(account_id))
            .execute(&mut conn)
            .map_err(AccountError::from)?;
        if affected == 0 {
            return Err(AccountError::NotFound(format!(
                "Account with id {} not found",
                account_id
            )));
        }
        Ok(())
    }
}
