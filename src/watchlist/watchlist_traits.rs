use chrono::NaiveDate;
use diesel::sqlite::SqliteConnection;

use crate::watchlist::watchlist_errors::Result;
use crate::watchlist::watchlist_model::{
    NewWatchlistItem, WatchlistGroup, WatchlistItem, WatchlistItemUpdate, WatchlistItemView,
};

/// Trait defining the contract for watchlist repository implementations
pub trait WatchlistRepositoryTrait: Send + Sync {
    fn get_groups(&self) -> Result<Vec<WatchlistGroup>>;
    fn create_group(&self, name: &str) -> Result<WatchlistGroup>;
    fn delete_group_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        group_id: &str,
    ) -> Result<usize>;
    fn get_item(&self, item_id: &str) -> Result<WatchlistItem>;
    fn get_items(&self, group_id: Option<&str>, include_sold: bool)
        -> Result<Vec<WatchlistItem>>;
    fn create_item(&self, new_item: NewWatchlistItem) -> Result<WatchlistItem>;
    fn update_item(&self, update: WatchlistItemUpdate) -> Result<WatchlistItem>;
    fn mark_sold(&self, item_id: &str, sold_nav: f64, sold_date: NaiveDate)
        -> Result<WatchlistItem>;
    fn update_added_on(&self, item_id: &str, added_on: NaiveDate) -> Result<WatchlistItem>;
    fn delete_item(&self, item_id: &str) -> Result<()>;
}

/// Trait defining the contract for watchlist service implementations
pub trait WatchlistServiceTrait: Send + Sync {
    fn list_groups(&self) -> crate::errors::Result<Vec<WatchlistGroup>>;
    fn create_group(&self, name: &str) -> crate::errors::Result<WatchlistGroup>;
    fn delete_group(&self, group_id: &str) -> crate::errors::Result<usize>;
    fn list_items(
        &self,
        group_id: Option<&str>,
        include_sold: bool,
    ) -> crate::errors::Result<Vec<WatchlistItemView>>;
    fn add_item(&self, new_item: NewWatchlistItem) -> crate::errors::Result<WatchlistItem>;
    fn update_item(&self, update: WatchlistItemUpdate) -> crate::errors::Result<WatchlistItem>;
    fn mark_sold(
        &self,
        item_id: &str,
        sold_nav: f64,
        sold_date: NaiveDate,
    ) -> crate::errors::Result<WatchlistItem>;
    fn update_added_on(
        &self,
        item_id: &str,
        added_on: NaiveDate,
    ) -> crate::errors::Result<WatchlistItem>;
    fn delete_item(&self, item_id: &str) -> crate::errors::Result<()>;
}
