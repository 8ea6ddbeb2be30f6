use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schemes::NavBand;
use crate::watchlist::signal::WatchSignal;
use crate::watchlist::watchlist_errors::{Result, WatchlistError};

/// A named bucket of watchlist entries
#[derive(
    Queryable,
    Selectable,
    Identifiable,
    Insertable,
    Serialize,
    Deserialize,
    PartialEq,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::watchlist_groups)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct WatchlistGroup {
    pub id: String,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// A scheme kept under observation with an optional paper position and
/// exit target.
#[derive(
    Queryable,
    Selectable,
    Identifiable,
    Insertable,
    AsChangeset,
    Serialize,
    Deserialize,
    PartialEq,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::watchlist_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    pub id: String,
    pub scheme_code: String,
    pub group_id: Option<String>,
    pub target_nav: Option<f64>,
    pub units: f64,
    pub invested_amount: f64,
    pub is_sold: bool,
    pub sold_nav: Option<f64>,
    pub sold_date: Option<NaiveDate>,
    pub added_on: NaiveDate,
}

/// Input model for adding a watchlist entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWatchlistItem {
    pub id: Option<String>,
    pub scheme_code: String,
    pub group_id: Option<String>,
    pub target_nav: Option<f64>,
    pub units: f64,
    pub invested_amount: f64,
    pub added_on: Option<NaiveDate>,
}

impl NewWatchlistItem {
    pub fn validate(&self) -> Result<()> {
        if self.scheme_code.trim().is_empty() {
            return Err(WatchlistError::InvalidData(
                "Scheme code cannot be empty".to_string(),
            ));
        }
        if self.units < 0.0 || self.invested_amount < 0.0 {
            return Err(WatchlistError::InvalidData(
                "Units and invested amount cannot be negative".to_string(),
            ));
        }
        if let Some(target) = self.target_nav {
            if target <= 0.0 {
                return Err(WatchlistError::InvalidData(
                    "Target NAV must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Input model for editing a watchlist entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItemUpdate {
    pub id: String,
    pub group_id: Option<String>,
    pub target_nav: Option<f64>,
    pub units: f64,
    pub invested_amount: f64,
}

/// Watchlist entry enriched with live NAV, dated NAV bands and signal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItemView {
    #[serde(flatten)]
    pub item: WatchlistItem,
    pub scheme_name: String,
    pub current_nav: f64,
    pub current_value: f64,
    pub return_pct: f64,
    pub week52: NavBand,
    /// NAV band since the entry was added; absent until the first
    /// post-add observation lands in history.
    pub since_added: Option<NavBand>,
    pub signal: WatchSignal,
}
