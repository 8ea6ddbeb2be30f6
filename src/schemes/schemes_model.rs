use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schemes::schemes_errors::{Result, SchemeError};

/// Catalog entry for a mutual fund scheme, keyed by its AMFI code.
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
#[diesel(table_name = crate::schema::schemes)]
#[diesel(primary_key(scheme_code))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Scheme {
    pub scheme_code: String,
    pub scheme_name: String,
    pub category: Option<String>,
    pub fund_house: Option<String>,
    pub net_asset_value: f64,
    pub nav_date: Option<NaiveDate>,
    pub last_updated: NaiveDateTime,
}

/// Input model for creating or refreshing a scheme catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeUpsert {
    pub scheme_code: String,
    pub scheme_name: String,
    pub category: Option<String>,
    pub fund_house: Option<String>,
    pub net_asset_value: f64,
    pub nav_date: Option<NaiveDate>,
}

impl SchemeUpsert {
    pub fn validate(&self) -> Result<()> {
        if self.scheme_code.trim().is_empty() {
            return Err(SchemeError::InvalidData(
                "Scheme code cannot be empty".to_string(),
            ));
        }
        if self.scheme_name.trim().is_empty() {
            return Err(SchemeError::InvalidData(
                "Scheme name cannot be empty".to_string(),
            ));
        }
        if self.net_asset_value < 0.0 {
            return Err(SchemeError::InvalidData(
                "NAV cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// One historical NAV observation
#[derive(
    Queryable, Selectable, Identifiable, Insertable, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::nav_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct NavPoint {
    pub id: String,
    pub scheme_code: String,
    pub date: NaiveDate,
    pub net_asset_value: f64,
}

/// 52-week NAV band for a scheme.
///
/// Falls back to the live NAV on both sides when no history exists yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavBand {
    pub scheme_code: String,
    pub high: f64,
    pub low: f64,
    pub high_date: Option<NaiveDate>,
    pub low_date: Option<NaiveDate>,
    pub from_history: bool,
}

impl NavBand {
    /// Builds a band from history observations, falling back to the live
    /// NAV on both sides when the window is empty.
    pub fn from_points(scheme_code: &str, points: &[NavPoint], fallback_nav: f64) -> Self {
        let highest = points
            .iter()
            .max_by(|a, b| a.net_asset_value.total_cmp(&b.net_asset_value));
        let lowest = points
            .iter()
            .min_by(|a, b| a.net_asset_value.total_cmp(&b.net_asset_value));

        match (highest, lowest) {
            (Some(high), Some(low)) => NavBand {
                scheme_code: scheme_code.to_string(),
                high: high.net_asset_value,
                low: low.net_asset_value,
                high_date: Some(high.date),
                low_date: Some(low.date),
                from_history: true,
            },
            _ => NavBand {
                scheme_code: scheme_code.to_string(),
                high: fallback_nav,
                low: fallback_nav,
                high_date: None,
                low_date: None,
                from_history: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(date: &str, nav: f64) -> NavPoint {
        NavPoint {
            id: date.to_string(),
            scheme_code: "120503".to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            net_asset_value: nav,
        }
    }

    #[test]
    fn band_picks_the_extremes_with_their_dates() {
        let points = vec![
            point("2024-01-02", 101.0),
            point("2024-03-15", 118.5),
            point("2024-07-01", 96.2),
        ];
        let band = NavBand::from_points("120503", &points, 100.0);

        assert!(band.from_history);
        assert_eq!(band.high, 118.5);
        assert_eq!(band.high_date, Some(point("2024-03-15", 0.0).date));
        assert_eq!(band.low, 96.2);
        assert_eq!(band.low_date, Some(point("2024-07-01", 0.0).date));
    }

    #[test]
    fn empty_window_falls_back_to_the_live_nav() {
        let band = NavBand::from_points("120503", &[], 42.5);

        assert!(!band.from_history);
        assert_eq!(band.high, 42.5);
        assert_eq!(band.low, 42.5);
        assert_eq!(band.high_date, None);
    }
}
