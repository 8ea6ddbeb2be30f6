use chrono::{Duration, NaiveDate, Utc};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::{DbPool, DbTransactionExecutor};
use crate::errors::{Error, Result};
use crate::schemes::{NavBand, NavPoint, Scheme, SchemeRepositoryTrait};
use crate::watchlist::signal::classify_signal;
use crate::watchlist::watchlist_model::{
    NewWatchlistItem, WatchlistGroup, WatchlistItem, WatchlistItemUpdate, WatchlistItemView,
};
use crate::watchlist::watchlist_traits::{WatchlistRepositoryTrait, WatchlistServiceTrait};

const WEEKS_52: i64 = 364;

/// Service for the watchlist: tracked schemes, groups and buy/sell signals
pub struct WatchlistService {
    pool: Arc<DbPool>,
    repository: Arc<dyn WatchlistRepositoryTrait>,
    scheme_repository: Arc<dyn SchemeRepositoryTrait>,
}

impl WatchlistService {
    pub fn new(
        pool: Arc<DbPool>,
        repository: Arc<dyn WatchlistRepositoryTrait>,
        scheme_repository: Arc<dyn SchemeRepositoryTrait>,
    ) -> Self {
        Self {
            pool,
            repository,
            scheme_repository,
        }
    }

    fn build_view(&self, item: WatchlistItem, scheme: Option<&Scheme>) -> Result<WatchlistItemView> {
        let current_nav = scheme.map_or(0.0, |s| s.net_asset_value);
        let current_value = current_nav * item.units;
        let return_pct = if item.invested_amount > 0.0 {
            (current_value - item.invested_amount) / item.invested_amount * 100.0
        } else {
            0.0
        };

        let since = Utc::now().date_naive() - Duration::days(WEEKS_52);
        let window_start = since.min(item.added_on);
        let history = self
            .scheme_repository
            .get_nav_history(&item.scheme_code, Some(window_start))?;

        let week52_points: Vec<NavPoint> =
            history.iter().filter(|p| p.date >= since).cloned().collect();
        let week52 = NavBand::from_points(&item.scheme_code, &week52_points, current_nav);

        let added_points: Vec<NavPoint> = history
            .iter()
            .filter(|p| p.date >= item.added_on)
            .cloned()
            .collect();
        let since_added = if added_points.is_empty() {
            None
        } else {
            Some(NavBand::from_points(
                &item.scheme_code,
                &added_points,
                current_nav,
            ))
        };

        let signal = classify_signal(
            current_nav,
            item.units,
            item.invested_amount,
            item.target_nav,
        );

        Ok(WatchlistItemView {
            scheme_name: scheme.map_or_else(|| item.scheme_code.clone(), |s| s.scheme_name.clone()),
            current_nav,
            current_value,
            return_pct,
            week52,
            since_added,
            signal,
            item,
        })
    }
}

impl WatchlistServiceTrait for WatchlistService {
    fn list_groups(&self) -> Result<Vec<WatchlistGroup>> {
        Ok(self.repository.get_groups()?)
    }

    fn create_group(&self, name: &str) -> Result<WatchlistGroup> {
        Ok(self.repository.create_group(name)?)
    }

    /// Deletes a group and every entry filed under it, atomically.
    /// Returns the number of entries removed with it.
    fn delete_group(&self, group_id: &str) -> Result<usize> {
        debug!("Deleting watchlist group {}", group_id);
        let repository = self.repository.clone();
        self.pool.execute(move |conn| -> Result<usize> {
            Ok(repository.delete_group_in_transaction(conn, group_id)?)
        })
    }

    fn list_items(
        &self,
        group_id: Option<&str>,
        include_sold: bool,
    ) -> Result<Vec<WatchlistItemView>> {
        let items = self.repository.get_items(group_id, include_sold)?;

        let schemes: HashMap<String, Scheme> = self
            .scheme_repository
            .get_schemes()?
            .into_iter()
            .map(|s| (s.scheme_code.clone(), s))
            .collect();

        items
            .into_iter()
            .map(|item| {
                let scheme = schemes.get(&item.scheme_code);
                self.build_view(item, scheme)
            })
            .collect()
    }

    fn add_item(&self, new_item: NewWatchlistItem) -> Result<WatchlistItem> {
        // The entry must point at a catalog scheme; a dangling code would
        // render with a zero NAV forever.
        self.scheme_repository
            .get_scheme(&new_item.scheme_code)
            .map_err(Error::Scheme)?;
        Ok(self.repository.create_item(new_item)?)
    }

    fn update_item(&self, update: WatchlistItemUpdate) -> Result<WatchlistItem> {
        Ok(self.repository.update_item(update)?)
    }

    fn mark_sold(
        &self,
        item_id: &str,
        sold_nav: f64,
        sold_date: NaiveDate,
    ) -> Result<WatchlistItem> {
        debug!("Marking watchlist item {} sold at {}", item_id, sold_nav);
        Ok(self.repository.mark_sold(item_id, sold_nav, sold_date)?)
    }

    fn update_added_on(&self, item_id: &str, added_on: NaiveDate) -> Result<WatchlistItem> {
        Ok(self.repository.update_added_on(item_id, added_on)?)
    }

    fn delete_item(&self, item_id: &str) -> Result<()> {
        Ok(self.repository.delete_item(item_id)?)
    }
}
