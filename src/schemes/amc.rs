use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// AMC names checked against scheme names, longest first so that
    /// "Bank of India" wins over a bare "Bank" prefix.
    static ref KNOWN_AMCS: Vec<&'static str> = {
        let mut names = vec![
            "Aditya Birla Sun Life",
            "Axis",
            "Bajaj Finserv",
            "Bandhan",
            "Bank of India",
            "Baroda BNP Paribas",
            "Canara Robeco",
            "DSP",
            "Edelweiss",
            "Franklin Templeton",
            "Groww",
            "HDFC",
            "Helios",
            "HSBC",
            "ICICI Prudential",
            "IDBI",
            "Invesco",
            "ITI",
            "JM Financial",
            "Kotak",
            "LIC",
            "Mahindra Manulife",
            "Mirae Asset",
            "Motilal Oswal",
            "Navi",
            "Nippon India",
            "NJ",
            "Old Bridge",
            "Parag Parikh",
            "PGIM India",
            "Quant",
            "Quantum",
            "Samco",
            "SBI",
            "Shriram",
            "Sundaram",
            "Tata",
            "Taurus",
            "Trust",
            "UTI",
            "Union",
            "WhiteOak Capital",
            "Zerodha",
            "360 ONE",
        ];
        names.sort_by_key(|n| std::cmp::Reverse(n.len()));
        names
    };
    static ref MUTUAL_FUND_SUFFIX: Regex = Regex::new(r"(?i)\s*mutual\s+fund\s*$").unwrap();
    static ref CATEGORY_INNER: Regex = Regex::new(r"\(([^)]+)\)").unwrap();
}

const STOP_WORDS: &[&str] = &["fund", "scheme", "yojana", "plan", "mutual"];

/// Derives the asset-management-company label used to group holdings.
///
/// Prefers the catalog's fund house (minus the "Mutual Fund" suffix), then
/// a known AMC prefix in the scheme name, then the part before " - ", and
/// finally the leading words of the name up to a generic stop word.
pub fn extract_amc(fund_house: Option<&str>, scheme_name: &str) -> String {
    if let Some(house) = fund_house {
        let trimmed = MUTUAL_FUND_SUFFIX.replace(house, "").trim().to_string();
        if !trimmed.is_empty() {
            return trimmed;
        }
    }

    let name = scheme_name.trim();
    for amc in KNOWN_AMCS.iter() {
        if let Some(prefix) = name.get(..amc.len()) {
            if prefix.eq_ignore_ascii_case(amc) {
                return (*amc).to_string();
            }
        }
    }

    if let Some((head, _)) = name.split_once(" - ") {
        if !head.trim().is_empty() {
            return head.trim().to_string();
        }
    }

    let mut leading = Vec::new();
    for word in name.split_whitespace() {
        if STOP_WORDS.contains(&word.to_lowercase().as_str()) {
            break;
        }
        leading.push(word);
    }
    if leading.is_empty() {
        leading = name.split_whitespace().take(2).collect();
    }
    leading.join(" ")
}

/// Broad asset class inferred from the AMFI category string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetClass {
    Equity,
    Debt,
    Hybrid,
    Other,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Equity => "Equity",
            AssetClass::Debt => "Debt",
            AssetClass::Hybrid => "Hybrid",
            AssetClass::Other => "Other",
        }
    }

    pub fn classify(category: Option<&str>) -> Self {
        let Some(category) = category else {
            return AssetClass::Other;
        };
        let lower = category.to_lowercase();
        if lower.contains("hybrid") || lower.contains("balanced") {
            AssetClass::Hybrid
        } else if lower.contains("equity") || lower.contains("elss") {
            AssetClass::Equity
        } else if lower.contains("debt")
            || lower.contains("income")
            || lower.contains("gilt")
            || lower.contains("liquid")
            || lower.contains("money market")
            || lower.contains("overnight")
            || lower.contains("bond")
        {
            AssetClass::Debt
        } else {
            AssetClass::Other
        }
    }
}

/// Pulls the fine-grained label out of an AMFI category string, e.g.
/// "Open Ended Schemes(Equity Scheme - Large Cap Fund)" yields
/// "Large Cap Fund".
pub fn sub_category(category: Option<&str>) -> Option<String> {
    let category = category?;
    let inner = CATEGORY_INNER
        .captures(category)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(category);
    let label = inner.rsplit_once(" - ").map_or(inner, |(_, tail)| tail);
    let label = label.trim();
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fund_house_wins_and_drops_the_suffix() {
        assert_eq!(
            extract_amc(Some("Nippon India Mutual Fund"), "Nippon India Growth Fund"),
            "Nippon India"
        );
    }

    #[test]
    fn known_amc_prefix_is_matched_case_insensitively() {
        assert_eq!(extract_amc(None, "sbi Bluechip Fund"), "SBI");
        assert_eq!(
            extract_amc(None, "ICICI Prudential Technology Fund"),
            "ICICI Prudential"
        );
    }

    #[test]
    fn longer_amc_names_beat_shorter_prefixes() {
        assert_eq!(
            extract_amc(None, "Bank of India Small Cap Fund"),
            "Bank of India"
        );
    }

    #[test]
    fn dash_split_fallback() {
        assert_eq!(
            extract_amc(None, "Obscure House - Flexi Cap Growth"),
            "Obscure House"
        );
    }

    #[test]
    fn stop_word_fallback() {
        assert_eq!(extract_amc(None, "Obscure Fund Direct Growth"), "Obscure");
    }

    #[test]
    fn asset_class_keywords() {
        assert_eq!(
            AssetClass::classify(Some("Open Ended Schemes(Equity Scheme - Large Cap Fund)")),
            AssetClass::Equity
        );
        assert_eq!(
            AssetClass::classify(Some("Open Ended Schemes(Debt Scheme - Liquid Fund)")),
            AssetClass::Debt
        );
        assert_eq!(
            AssetClass::classify(Some("Hybrid Scheme - Aggressive Hybrid Fund")),
            AssetClass::Hybrid
        );
        assert_eq!(AssetClass::classify(None), AssetClass::Other);
    }

    #[test]
    fn sub_category_comes_from_the_parenthesised_tail() {
        assert_eq!(
            sub_category(Some("Open Ended Schemes(Equity Scheme - Large Cap Fund)")),
            Some("Large Cap Fund".to_string())
        );
        assert_eq!(sub_category(None), None);
    }
}
