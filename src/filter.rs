//! Filter predicates over the dataset.

use crate::error::FormError;
use crate::types::{Category, FilterState, Record, Selection};
use serde::Deserialize;

/// Sentinel value the selectors use for "no restriction".
pub const ALL: &str = "all";

/// Raw values of the four filter controls, as the UI sends them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterForm {
    pub category: String,
    pub server: String,
    pub https: String,
    pub population: String,
}

impl FilterState {
    pub fn matches(&self, record: &Record) -> bool {
        self.category.accepts(&record.category)
            && self.server.accepts(&record.server)
            && self.https.accepts(&record.https)
            && match self.min_population {
                None => true,
                Some(threshold) => record
                    .population
                    .is_some_and(|p| i128::from(p) >= i128::from(threshold)),
            }
    }

    pub fn from_form(form: &FilterForm) -> Result<Self, FormError> {
        let category = match selection(&form.category) {
            Selection::All => Selection::All,
            Selection::Only(value) => Selection::Only(value.parse::<Category>()?),
        };

        Ok(Self {
            category,
            server: selection(&form.server),
            https: selection(&form.https),
            min_population: parse_threshold(&form.population),
        })
    }
}

fn selection(raw: &str) -> Selection<String> {
    if raw.is_empty() || raw == ALL {
        Selection::All
    } else {
        Selection::Only(raw.to_string())
    }
}

/// Leading-integer parse of the population box: optional whitespace and sign,
/// then digits; trailing junk is ignored. No digits means no threshold.
pub fn parse_threshold(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude = rest[..digits_len].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Indices of the records kept by `filter`, in dataset order.
pub fn apply_filters(records: &[Record], filter: &FilterState) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| filter.matches(r))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{record, sample_records};

    #[test]
    fn default_state_keeps_everything() {
        let records = sample_records(23);
        let kept = apply_filters(&records, &FilterState::default());
        assert_eq!(kept, (0..23).collect::<Vec<_>>());
    }

    #[test]
    fn every_kept_record_matches_and_every_dropped_one_fails() {
        let records = sample_records(40);
        let filter = FilterState {
            category: Selection::Only(Category::UpToDate),
            server: Selection::Only("nginx".to_string()),
            https: Selection::All,
            min_population: Some(5000),
        };

        let kept = apply_filters(&records, &filter);
        for (i, r) in records.iter().enumerate() {
            let expected = r.category == Category::UpToDate
                && r.server == "nginx"
                && r.population.is_some_and(|p| p >= 5000);
            assert_eq!(kept.contains(&i), expected, "record {i}");
        }
    }

    #[test]
    fn applying_twice_is_identical() {
        let records = sample_records(30);
        let filter = FilterState {
            https: Selection::Only("Oui".to_string()),
            ..FilterState::default()
        };
        assert_eq!(apply_filters(&records, &filter), apply_filters(&records, &filter));
    }

    #[test]
    fn unknown_population_fails_active_threshold_only() {
        let mut r = record(1, "Apache", Category::Outdated, 0);
        r.population = None;

        assert!(FilterState::default().matches(&r));
        let negative = FilterState { min_population: Some(-10), ..FilterState::default() };
        assert!(!negative.matches(&r));
    }

    #[test]
    fn threshold_parses_leading_integer() {
        assert_eq!(parse_threshold(""), None);
        assert_eq!(parse_threshold("   "), None);
        assert_eq!(parse_threshold("abc"), None);
        assert_eq!(parse_threshold("5000"), Some(5000));
        assert_eq!(parse_threshold(" 12abc"), Some(12));
        assert_eq!(parse_threshold("-5"), Some(-5));
        assert_eq!(parse_threshold("+7"), Some(7));
        assert_eq!(parse_threshold("3.9"), Some(3));
        assert_eq!(parse_threshold("-"), None);
    }

    #[test]
    fn form_with_sentinels_is_all_inclusive() {
        let form = FilterForm {
            category: ALL.to_string(),
            server: ALL.to_string(),
            https: ALL.to_string(),
            population: String::new(),
        };
        assert_eq!(FilterState::from_form(&form).unwrap(), FilterState::default());
    }

    #[test]
    fn form_accepts_category_variant_or_label() {
        let mut form = FilterForm { category: "UpToDate".to_string(), ..FilterForm::default() };
        let state = FilterState::from_form(&form).unwrap();
        assert_eq!(state.category, Selection::Only(Category::UpToDate));

        form.category = "Partiellement à jour".to_string();
        let state = FilterState::from_form(&form).unwrap();
        assert_eq!(state.category, Selection::Only(Category::PartiallyUpToDate));

        form.category = "Bientôt".to_string();
        assert!(FilterState::from_form(&form).is_err());
    }
}
