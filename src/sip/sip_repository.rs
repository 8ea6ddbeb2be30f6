use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::get_connection;
use crate::schema::sip_mandates;
use crate::sip::sip_errors::{Result, SipError};
use crate::sip::sip_model::{NewSipMandate, SipMandate, SipMandateUpdate, SipStatus};
use crate::sip::sip_traits::SipRepositoryTrait;

/// Repository for managing SIP mandates in the database
pub struct SipRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl SipRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<crate::db::DbConnection> {
        get_connection(&self.pool).map_err(|e| SipError::DatabaseError(e.to_string()))
    }
}

impl SipRepositoryTrait for SipRepository {
    fn get_mandate(&self, mandate_id: &str) -> Result<SipMandate> {
        let mut conn = self.conn()?;

        sip_mandates::table
            .find(mandate_id)
            .first::<SipMandate>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    SipError::NotFound(format!("SIP mandate with id {} not found", mandate_id))
                }
                _ => SipError::DatabaseError(e.to_string()),
            })
    }

    fn get_mandates(&self, account_name: Option<&str>) -> Result<Vec<SipMandate>> {
        let mut conn = self.conn()?;

        let mut query = sip_mandates::table.into_boxed();
        if let Some(account) = account_name {
            query = query.filter(sip_mandates::account_name.eq(account.to_string()));
        }

        query
            .order(sip_mandates::start_date.asc())
            .load::<SipMandate>(&mut conn)
            .map_err(SipError::from)
    }

    fn create_mandate(&self, new_mandate: NewSipMandate) -> Result<SipMandate> {
        new_mandate.validate()?;
        let mut conn = self.conn()?;

        let now = Utc::now().naive_utc();
        let mandate = SipMandate {
            id: new_mandate
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            scheme_code: new_mandate.scheme_code,
            account_name: new_mandate.account_name,
            sip_amount: new_mandate.sip_amount,
            start_date: new_mandate.start_date,
            duration_years: new_mandate.duration_years,
            status: SipStatus::Active.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };

        diesel::insert_into(sip_mandates::table)
            .values(&mandate)
            .get_result::<SipMandate>(&mut conn)
            .map_err(SipError::from)
    }

    fn update_mandate(&self, update: SipMandateUpdate) -> Result<SipMandate> {
        update.validate()?;
        let mut conn = self.conn()?;

        SipStatus::from_str(&update.status)?;

        diesel::update(sip_mandates::table.find(&update.id))
            .set((
                sip_mandates::sip_amount.eq(update.sip_amount),
                sip_mandates::start_date.eq(update.start_date),
                sip_mandates::duration_years.eq(update.duration_years),
                sip_mandates::status.eq(update.status.clone()),
                sip_mandates::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<SipMandate>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    SipError::NotFound(format!("SIP mandate with id {} not found", update.id))
                }
                _ => SipError::DatabaseError(e.to_string()),
            })
    }

    fn set_status_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        mandate_id: &str,
        status: SipStatus,
    ) -> Result<SipMandate> {
        diesel::update(sip_mandates::table.find(mandate_id))
            .set((
                sip_mandates::status.eq(status.as_str()),
                sip_mandates::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<SipMandate>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    SipError::NotFound(format!("SIP mandate with id {} not found", mandate_id))
                }
                _ => SipError::DatabaseError(e.to_string()),
            })
    }

    fn delete_in_transaction(&self, conn: &mut SqliteConnection, mandate_id: &str) -> Result<()> {
        let affected = diesel::delete(sip_mandates::table.find(mandate_id))
            .execute(conn)
            .map_err(SipError::from)?;
        if affected == 0 {
            return Err(SipError::NotFound(format!(
                "SIP mandate with id {} not found",
                mandate_id
            )));
        }
        Ok(())
    }

    fn rename_account_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        old_name: &str,
        new_name: &str,
    ) -> Result<usize> {
        diesel::update(sip_mandates::table.filter(sip_mandates::account_name.eq(old_name)))
            .set((
                sip_mandates::account_name.eq(new_name),
                sip_mandates::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)
            .map_err(SipError::from)
    }

    fn count_for_account(&self, account_name: &str) -> Result<i64> {
        let mut conn = self.conn()?;

        sip_mandates::table
            .filter(sip_mandates::account_name.eq(account_name))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(SipError::from)
    }
}
