use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::get_connection;
use crate::schema::{watchlist_groups, watchlist_items};
use crate::watchlist::watchlist_errors::{Result, WatchlistError};
use crate::watchlist::watchlist_model::{
    NewWatchlistItem, WatchlistGroup, WatchlistItem, WatchlistItemUpdate,
};
use crate::watchlist::watchlist_traits::WatchlistRepositoryTrait;

/// Repository for watchlist groups and items
pub struct WatchlistRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl WatchlistRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<crate::db::DbConnection> {
        get_connection(&self.pool).map_err(|e| WatchlistError::DatabaseError(e.to_string()))
    }
}

impl WatchlistRepositoryTrait for WatchlistRepository {
    fn get_groups(&self) -> Result<Vec<WatchlistGroup>> {
        let mut conn = self.conn()?;

        watchlist_groups::table
            .order(watchlist_groups::name.asc())
            .load::<WatchlistGroup>(&mut conn)
            .map_err(WatchlistError::from)
    }

    fn create_group(&self, name: &str) -> Result<WatchlistGroup> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WatchlistError::InvalidData(
                "Group name cannot be empty".to_string(),
            ));
        }
        let mut conn = self.conn()?;

        let group = WatchlistGroup {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now().naive_utc(),
        };

        diesel::insert_into(watchlist_groups::table)
            .values(&group)
            .get_result::<WatchlistGroup>(&mut conn)
            .map_err(WatchlistError::from)
    }

    /// Deletes a group together with every item filed under it.
    fn delete_group_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        group_id: &str,
    ) -> Result<usize> {
        let items_removed =
            diesel::delete(watchlist_items::table.filter(watchlist_items::group_id.eq(group_id)))
                .execute(conn)
                .map_err(WatchlistError::from)?;

        let affected = diesel::delete(watchlist_groups::table.find(group_id))
            .execute(conn)
            .map_err(WatchlistError::from)?;
        if affected == 0 {
            return Err(WatchlistError::NotFound(format!(
                "Watchlist group with id {} not found",
                group_id
            )));
        }
        Ok(items_removed)
    }

    fn get_item(&self, item_id: &str) -> Result<WatchlistItem> {
        let mut conn = self.conn()?;

        watchlist_items::table
            .find(item_id)
            .first::<WatchlistItem>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => WatchlistError::NotFound(format!(
                    "Watchlist item with id {} not found",
                    item_id
                )),
                _ => WatchlistError::DatabaseError(e.to_string()),
            })
    }

    fn get_items(
        &self,
        group_id: Option<&str>,
        include_sold: bool,
    ) -> Result<Vec<WatchlistItem>> {
        let mut conn = self.conn()?;

        let mut query = watchlist_items::table.into_boxed();
        if let Some(group) = group_id {
            query = query.filter(watchlist_items::group_id.eq(group.to_string()));
        }
        if !include_sold {
            query = query.filter(watchlist_items::is_sold.eq(false));
        }

        query
            .order(watchlist_items::added_on.asc())
            .load::<WatchlistItem>(&mut conn)
            .map_err(WatchlistError::from)
    }

    fn create_item(&self, new_item: NewWatchlistItem) -> Result<WatchlistItem> {
        new_item.validate()?;
        let mut conn = self.conn()?;

        let item = WatchlistItem {
            id: new_item
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            scheme_code: new_item.scheme_code,
            group_id: new_item.group_id,
            target_nav: new_item.target_nav,
            units: new_item.units,
            invested_amount: new_item.invested_amount,
            is_sold: false,
            sold_nav: None,
            sold_date: None,
            added_on: new_item
                .added_on
                .unwrap_or_else(|| Utc::now().date_naive()),
        };

        diesel::insert_into(watchlist_items::table)
            .values(&item)
            .get_result::<WatchlistItem>(&mut conn)
            .map_err(WatchlistError::from)
    }

    fn update_item(&self, update: WatchlistItemUpdate) -> Result<WatchlistItem> {
        let mut conn = self.conn()?;

        diesel::update(watchlist_items::table.find(&update.id))
            .set((
                watchlist_items::group_id.eq(update.group_id),
                watchlist_items::target_nav.eq(update.target_nav),
                watchlist_items::units.eq(update.units),
                watchlist_items::invested_amount.eq(update.invested_amount),
            ))
            .get_result::<WatchlistItem>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => WatchlistError::NotFound(format!(
                    "Watchlist item with id {} not found",
                    update.id
                )),
                _ => WatchlistError::DatabaseError(e.to_string()),
            })
    }

    fn mark_sold(&self, item_id: &str, sold_nav: f64, sold_date: NaiveDate) -> Result<WatchlistItem> {
        let mut conn = self.conn()?;

        diesel::update(watchlist_items::table.find(item_id))
            .set((
                watchlist_items::is_sold.eq(true),
                watchlist_items::sold_nav.eq(Some(sold_nav)),
                watchlist_items::sold_date.eq(Some(sold_date)),
            ))
            .get_result::<WatchlistItem>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => WatchlistError::NotFound(format!(
                    "Watchlist item with id {} not found",
                    item_id
                )),
                _ => WatchlistError::DatabaseError(e.to_string()),
            })
    }

    /// Restarts the since-tracking clock on an entry
    fn update_added_on(&self, item_id: &str, added_on: NaiveDate) -> Result<WatchlistItem> {
        let mut conn = self.conn()?;

        diesel::update(watchlist_items::table.find(item_id))
            .set(watchlist_items::added_on.eq(added_on))
            .get_result::<WatchlistItem>(&mut conn)
            .map_err(WatchlistError::from)
    }

    fn delete_item(&self, item_id: &str) -> Result<()> {
        let mut conn = self.conn()?;

        let affected = diesel::delete(watchlist_items::table.find(item_id))
            .execute(&mut conn)
            .map_err(WatchlistError::from)?;
        if affected == 0 {
            return Err(WatchlistError::NotFound(format!(
                "Watchlist item with id {} not found",
                item_id
            )));
        }
        Ok(())
    }
}
