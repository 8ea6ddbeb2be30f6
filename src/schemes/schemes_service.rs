use chrono::{Duration, NaiveDate, Utc};
use log::debug;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::db::{DbPool, DbTransactionExecutor};
use crate::errors::{Error, Result};
use crate::ledger::TransactionRepositoryTrait;
use crate::schemes::amc::extract_amc;
use crate::schemes::schemes_model::{NavBand, NavPoint, Scheme, SchemeUpsert};
use crate::schemes::schemes_traits::{SchemeRepositoryTrait, SchemeServiceTrait};

const WEEKS_52: i64 = 364;

/// Service for the scheme catalog, NAV history and AMC grouping
pub struct SchemeService {
    pool: Arc<DbPool>,
    repository: Arc<dyn SchemeRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
}

impl SchemeService {
    pub fn new(
        pool: Arc<DbPool>,
        repository: Arc<dyn SchemeRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    ) -> Self {
        Self {
            pool,
            repository,
            transaction_repository,
        }
    }
}

impl SchemeServiceTrait for SchemeService {
    fn get_scheme(&self, scheme_code: &str) -> Result<Scheme> {
        Ok(self.repository.get_scheme(scheme_code)?)
    }

    fn list_schemes(&self) -> Result<Vec<Scheme>> {
        Ok(self.repository.get_schemes()?)
    }

    fn search_schemes(&self, query: &str, limit: Option<i64>) -> Result<Vec<Scheme>> {
        Ok(self.repository.search_schemes(query, limit)?)
    }

    fn upsert_scheme(&self, upsert: SchemeUpsert) -> Result<Scheme> {
        debug!("Upserting scheme {}", upsert.scheme_code);
        Ok(self.repository.upsert_scheme(upsert)?)
    }

    /// Stores a fresh NAV on the catalog entry and appends it to the
    /// history series used for 52-week stats.
    fn record_nav(
        &self,
        scheme_code: &str,
        net_asset_value: f64,
        nav_date: NaiveDate,
    ) -> Result<Scheme> {
        self.repository
            .add_nav_point(scheme_code, nav_date, net_asset_value)?;
        Ok(self
            .repository
            .update_nav(scheme_code, net_asset_value, Some(nav_date))?)
    }

    fn get_nav_history(
        &self,
        scheme_code: &str,
        since: Option<NaiveDate>,
    ) -> Result<Vec<NavPoint>> {
        Ok(self.repository.get_nav_history(scheme_code, since)?)
    }

    /// 52-week high/low from NAV history, with the dates they were hit,
    /// falling back to the live NAV when no observations exist in the
    /// window.
    fn get_52_week_band(&self, scheme_code: &str) -> Result<NavBand> {
        let scheme = self.repository.get_scheme(scheme_code)?;
        let since = Utc::now().date_naive() - Duration::days(WEEKS_52);
        let history = self.repository.get_nav_history(scheme_code, Some(since))?;

        Ok(NavBand::from_points(
            scheme_code,
            &history,
            scheme.net_asset_value,
        ))
    }

    /// Distinct AMC labels across the catalog, sorted.
    fn list_amcs(&self) -> Result<Vec<String>> {
        let amcs: BTreeSet<String> = self
            .repository
            .get_schemes()?
            .into_iter()
            .map(|s| extract_amc(s.fund_house.as_deref(), &s.scheme_name))
            .collect();
        Ok(amcs.into_iter().collect())
    }

    /// Removes a scheme with everything hanging off it: its ledger rows
    /// and its NAV history, in one database transaction. Returns the
    /// number of ledger rows removed.
    fn delete_scheme(&self, scheme_code: &str) -> Result<usize> {
        debug!("Deleting scheme {} with full history", scheme_code);
        let repository = self.repository.clone();
        let transaction_repository = self.transaction_repository.clone();

        self.pool.execute(|conn| -> Result<usize> {
            let removed =
                transaction_repository.delete_for_scheme_in_transaction(conn, scheme_code)?;
            repository
                .delete_scheme_in_transaction(conn, scheme_code)
                .map_err(Error::Scheme)?;
            Ok(removed)
        })
    }
}
