use chrono::NaiveDate;
use diesel::sqlite::SqliteConnection;

use crate::schemes::schemes_errors::Result;
use crate::schemes::schemes_model::{NavBand, NavPoint, Scheme, SchemeUpsert};

/// Trait defining the contract for scheme repository implementations
pub trait SchemeRepositoryTrait: Send + Sync {
    fn get_scheme(&self, scheme_code: &str) -> Result<Scheme>;
    fn get_schemes(&self) -> Result<Vec<Scheme>>;
    fn search_schemes(&self, query: &str, limit: Option<i64>) -> Result<Vec<Scheme>>;
    fn upsert_scheme(&self, upsert: SchemeUpsert) -> Result<Scheme>;
    fn update_nav(
        &self,
        scheme_code: &str,
        net_asset_value: f64,
        nav_date: Option<NaiveDate>,
    ) -> Result<Scheme>;
    fn delete_scheme_in_transaction(
        &self,
        conn: &mut SqliteConnection,
        scheme_code: &str,
    ) -> Result<()>;
    fn add_nav_point(
        &self,
        scheme_code: &str,
        date: NaiveDate,
        net_asset_value: f64,
    ) -> Result<NavPoint>;
    fn get_nav_history(
        &self,
        scheme_code: &str,
        since: Option<NaiveDate>,
    ) -> Result<Vec<NavPoint>>;
}

/// Trait defining the contract for scheme service implementations
pub trait SchemeServiceTrait: Send + Sync {
    fn get_scheme(&self, scheme_code: &str) -> crate::errors::Result<Scheme>;
    fn list_schemes(&self) -> crate::errors::Result<Vec<Scheme>>;
    fn search_schemes(
        &self,
        query: &str,
        limit: Option<i64>,
    ) -> crate::errors::Result<Vec<Scheme>>;
    fn upsert_scheme(&self, upsert: SchemeUpsert) -> crate::errors::Result<Scheme>;
    fn record_nav(
        &self,
        scheme_code: &str,
        net_asset_value: f64,
        nav_date: NaiveDate,
    ) -> crate::errors::Result<Scheme>;
    fn get_nav_history(
        &self,
        scheme_code: &str,
        since: Option<NaiveDate>,
    ) -> crate::errors::Result<Vec<NavPoint>>;
    fn get_52_week_band(&self, scheme_code: &str) -> crate::errors::Result<NavBand>;
    fn list_amcs(&self) -> crate::errors::Result<Vec<String>>;
    fn delete_scheme(&self, scheme_code: &str) -> crate::errors::Result<usize>;
}
