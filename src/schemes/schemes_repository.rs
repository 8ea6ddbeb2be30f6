use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::get_connection;
use crate::schema::{nav_history, schemes};
use crate::schemes::schemes_errors::{Result, SchemeError};
use crate::schemes::schemes_model::{NavPoint, Scheme, SchemeUpsert};
use crate::schemes::schemes_traits::SchemeRepositoryTrait;

/// Repository for the scheme catalog and NAV history
pub struct SchemeRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl SchemeRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<crate::db::DbConnection> {
        get_connection(&self.pool).map_err(|e| SchemeError::DatabaseError(e.to_string()))
    }
}

impl SchemeRepositoryTrait for SchemeRepository {
    fn get_scheme(&self, scheme_code: &str) -> Result<Scheme> {
        let mut conn = self.conn()?;

        schemes::table
            .find(scheme_code)
            .first::<Scheme>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    SchemeError::NotFound(format!("Scheme {} not found", scheme_code))
                }
                _ => SchemeError::DatabaseError(e.to_string()),
            })
    }

    fn get_schemes(&self) -> Result<Vec<Scheme>> {
        let mut conn = self.conn()?;

        schemes::table
            .order(schemes::scheme_name.asc())
            .load::<Scheme>(&mut conn)
            .map_err(SchemeError::from)
    }

    fn search_schemes(&self, query: &str, limit: Option<i64>) -> Result<Vec<Scheme>> {
        let mut conn = self.conn()?;
        let pattern = format!("%{}%", query.trim());

        let mut q = schemes::table
            .filter(
                schemes::scheme_name
                    .like(pattern.clone())
                    .or(schemes::scheme_code.like(pattern)),
            )
            .order(schemes::scheme_name.asc())
            .into_boxed();
        if let Some(limit) = limit {
            q = q.limit(limit);
        }

        q.load::<Scheme>(&mut conn).map_err(SchemeError::from)
    }

    fn upsert_scheme(&self, upsert: SchemeUpsert) -> Result<Scheme> {
        upsert.validate()?;
        let mut conn = self.conn()?;

        let row = Scheme {
            scheme_code: upsert.scheme_code,
            scheme_name: upsert.scheme_name,
            category: upsert.category,
            fund_house: upsert.fund_house,
            net_asset_value: upsert.net_asset_value,
            nav_date: upsert.nav_date,
            last_updated: Utc::now().naive_utc(),
        };

        diesel::insert_into(schemes::table)
            .values(&row)
            .on_conflict(schemes::scheme_code)
            .do_update()
            .set(&row)
            .get_result::<Scheme>(&mut conn)
            .map_err(SchemeError::from)
    }

    fn update_nav(
        &self,
        scheme_code: &str,
        net_asset_value: f64,
        nav_date: Option<NaiveDate>,
    ) -> Result<Scheme> {
        let mut conn = self.conn()?;

        diesel::update(schemes::table.find(scheme_code))
            .set((
                schemes::net_asset_value.eq(net_asset_value),
                schemes::nav_date.eq(nav_date),
                schemes::last_updated.eq(Utc::now().naive_utc()),
            ))
            .get_result::<Scheme>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    SchemeError::NotFound(format!("Scheme {} not found", scheme_code))
                }
                _ => SchemeError::DatabaseError(e.to_string()),
            })
    }

    fn delete_scheme_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        scheme_code: &str,
    ) -> Result<()> {
        diesel::delete(nav_history::table.filter(nav_history::scheme_code.eq(scheme_code)))
            .execute(conn)
            .map_err(SchemeError::from)?;

        let affected = diesel::delete(schemes::table.find(scheme_code))
            .execute(conn)
            .map_err(SchemeError::from)?;
        if affected == 0 {
            return Err(SchemeError::NotFound(format!(
                "Scheme {} not found",
                scheme_code
            )));
        }
        Ok(())
    }

    /// Records one NAV observation; a second write for the same day
    /// overwrites the first.
    fn add_nav_point(
        &self,
        scheme_code: &str,
        date: NaiveDate,
        net_asset_value: f64,
    ) -> Result<NavPoint> {
        let mut conn = self.conn()?;

        let point = NavPoint {
            id: Uuid::new_v4().to_string(),
            scheme_code: scheme_code.to_string(),
            date,
            net_asset_value,
        };

        diesel::insert_into(nav_history::table)
            .values(&point)
            .on_conflict((nav_history::scheme_code, nav_history::date))
            .do_update()
            .set(nav_history::net_asset_value.eq(net_asset_value))
            .get_result::<NavPoint>(&mut conn)
            .map_err(SchemeError::from)
    }

    fn get_nav_history(
        &self,
        scheme_code: &str,
        since: Option<NaiveDate>,
    ) -> Result<Vec<NavPoint>> {
        let mut conn = self.conn()?;

        let mut query = nav_history::table
            .filter(nav_history::scheme_code.eq(scheme_code))
            .into_boxed();
        if let Some(since) = since {
            query = query.filter(nav_history::date.ge(since));
        }

        query
            .order(nav_history::date.asc())
            .load::<NavPoint>(&mut conn)
            .map_err(SchemeError::from)
    }
}
