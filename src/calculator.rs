//! Purchase cost breakdown: stamp duty, registration, metro cess and
//! brokerage on top of the agreed price.
//!
//! Rate selection prefers the most specific row for the buyer's
//! jurisdiction: city and property type, then city only, then property type
//! only, then the state-wide row. Among equally specific rows the most recent
//! effective date wins. Rows dated in the future are ignored. A listing type
//! such as `office` is looked up under its rate category (`commercial`).
//!
//! Every component is rounded half away from zero to paise before it is
//! summed, so `total_charges` always equals the sum of the printed parts.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{CalculatorRate, CostBreakdown, CostQuery, PropertyType};
use crate::validation::ValidationError;

/// Brokerage charged when neither the request nor the rate row names one.
pub const DEFAULT_BROKERAGE_PCT: f64 = 1.0;

#[derive(Debug, Error, PartialEq)]
pub enum CalculatorError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("No calculator rates configured for {0}")]
    NoRate(String),
}

/// Rounds a rupee amount to paise.
pub fn round_paise(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn matches_key(column: Option<&str>, requested: Option<&str>) -> Option<bool> {
    match (column, requested) {
        (None, _) => Some(false),
        (Some(col), Some(req)) if col.eq_ignore_ascii_case(req.trim()) => Some(true),
        _ => None,
    }
}

/// How specific `rate` is for the query, or `None` if it does not apply.
fn specificity(rate: &CalculatorRate, query: &CostQuery) -> Option<u8> {
    let city = matches_key(rate.city.as_deref(), query.city.as_deref())?;
    let requested_type = query.property_type.as_deref().map(|kind| {
        kind.trim()
            .to_ascii_lowercase()
            .parse::<PropertyType>()
            .map_or(kind, |parsed| parsed.rate_category())
    });
    let property_type = matches_key(rate.property_type.as_deref(), requested_type)?;

    Some(match (city, property_type) {
        (true, true) => 3,
        (true, false) => 2,
        (false, true) => 1,
        (false, false) => 0,
    })
}

pub fn select_rate<'a>(
    rates: &'a [CalculatorRate],
    query: &CostQuery,
    as_of: NaiveDate,
) -> Option<&'a CalculatorRate> {
    rates
        .iter()
        .filter(|rate| rate.state.eq_ignore_ascii_case(query.state.trim()))
        .filter(|rate| rate.effective_from <= as_of)
        .filter_map(|rate| specificity(rate, query).map(|score| (score, rate)))
        .max_by_key(|(score, rate)| (*score, rate.effective_from))
        .map(|(_, rate)| rate)
}

fn percent_of(amount: f64, pct: f64) -> f64 {
    round_paise(amount * pct.max(0.0) / 100.0)
}

/// Applies `rate` to the query's price.
pub fn breakdown(rate: &CalculatorRate, query: &CostQuery) -> CostBreakdown {
    let price = round_paise(query.price);

    let stamp_duty = percent_of(price, rate.stamp_duty_pct);
    let female_discount = match rate.female_discount_pct {
        Some(pct) if query.female_buyer => percent_of(stamp_duty, pct.min(100.0)),
        _ => 0.0,
    };
    let stamp_duty_payable = round_paise(stamp_duty - female_discount).max(0.0);

    let mut registration_fee = percent_of(price, rate.registration_pct);
    if let Some(cap) = rate.registration_cap {
        registration_fee = registration_fee.min(round_paise(cap));
    }

    let metro_cess = rate
        .metro_cess_pct
        .map(|pct| percent_of(price, pct))
        .unwrap_or(0.0);

    let brokerage = if query.include_brokerage {
        let pct = query
            .brokerage_pct
            .or(rate.brokerage_pct)
            .unwrap_or(DEFAULT_BROKERAGE_PCT);
        percent_of(price, pct)
    } else {
        0.0
    };

    let total_charges = round_paise(stamp_duty_payable + registration_fee + metro_cess + brokerage);

    CostBreakdown {
        rate_id: rate.id,
        price,
        stamp_duty,
        female_discount,
        stamp_duty_payable,
        registration_fee,
        metro_cess,
        brokerage,
        total_charges,
        total: round_paise(price + total_charges),
    }
}

/// Validates the query, picks the applicable rate and computes the costs.
pub fn calculate(
    rates: &[CalculatorRate],
    query: &CostQuery,
    as_of: NaiveDate,
) -> Result<CostBreakdown, CalculatorError> {
    query.validate()?;

    let rate = select_rate(rates, query, as_of).ok_or_else(|| {
        let place = match query.city.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(city) => format!("{}, {}", city.trim(), query.state.trim()),
            None => query.state.trim().to_string(),
        };
        CalculatorError::NoRate(place)
    })?;

    Ok(breakdown(rate, query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rate(city: Option<&str>, property_type: Option<&str>, from: NaiveDate) -> CalculatorRate {
        CalculatorRate {
            id: Uuid::new_v4(),
            state: "Maharashtra".into(),
            city: city.map(Into::into),
            property_type: property_type.map(Into::into),
            stamp_duty_pct: 5.0,
            registration_pct: 1.0,
            registration_cap: Some(30_000.0),
            metro_cess_pct: None,
            female_discount_pct: Some(20.0),
            brokerage_pct: None,
            effective_from: from,
        }
    }

    fn query(city: Option<&str>, property_type: Option<&str>) -> CostQuery {
        CostQuery {
            price: 5_000_000.0,
            state: "Maharashtra".into(),
            city: city.map(Into::into),
            property_type: property_type.map(Into::into),
            female_buyer: false,
            include_brokerage: false,
            brokerage_pct: None,
        }
    }

    fn today() -> NaiveDate {
        date(2026, 6, 1)
    }

    #[test]
    fn most_specific_rate_wins() {
        let state = rate(None, None, date(2020, 1, 1));
        let by_type = rate(None, Some("residential"), date(2020, 1, 1));
        let by_city = rate(Some("Pune"), None, date(2020, 1, 1));
        let exact = rate(Some("Pune"), Some("residential"), date(2020, 1, 1));
        let rates = vec![state.clone(), by_type.clone(), by_city.clone(), exact.clone()];

        let q = query(Some("pune"), Some("Residential"));
        assert_eq!(select_rate(&rates, &q, today()).unwrap().id, exact.id);

        let q = query(Some("Pune"), Some("commercial"));
        assert_eq!(select_rate(&rates, &q, today()).unwrap().id, by_city.id);

        let q = query(Some("Nagpur"), Some("residential"));
        assert_eq!(select_rate(&rates, &q, today()).unwrap().id, by_type.id);

        let q = query(None, None);
        assert_eq!(select_rate(&rates, &q, today()).unwrap().id, state.id);
    }

    #[test]
    fn listing_types_use_their_rate_category() {
        let residential = rate(Some("Mumbai"), Some("residential"), date(2020, 1, 1));
        let commercial = rate(Some("Mumbai"), Some("commercial"), date(2020, 1, 1));
        let rates = vec![residential.clone(), commercial.clone()];

        let q = query(Some("Mumbai"), Some("office"));
        assert_eq!(select_rate(&rates, &q, today()).unwrap().id, commercial.id);

        let q = query(Some("Mumbai"), Some("Independent_House"));
        assert_eq!(select_rate(&rates, &q, today()).unwrap().id, residential.id);
    }

    #[test]
    fn latest_effective_date_breaks_ties() {
        let old = rate(Some("Pune"), None, date(2019, 4, 1));
        let new = rate(Some("Pune"), None, date(2024, 4, 1));
        let future = rate(Some("Pune"), None, date(2030, 4, 1));
        let rates = vec![old, new.clone(), future];

        let selected = select_rate(&rates, &query(Some("Pune"), None), today()).unwrap();
        assert_eq!(selected.id, new.id);
    }

    #[test]
    fn other_states_never_match() {
        let rates = vec![rate(None, None, date(2020, 1, 1))];
        let mut q = query(None, None);
        q.state = "Karnataka".into();
        assert_eq!(
            calculate(&rates, &q, today()),
            Err(CalculatorError::NoRate("Karnataka".into()))
        );
    }

    #[test]
    fn pune_residential_total_covers_price() {
        let mut pune = rate(Some("Pune"), None, date(2020, 1, 1));
        pune.metro_cess_pct = Some(1.0);
        let rates = vec![rate(None, None, date(2020, 1, 1)), pune];

        let costs = calculate(&rates, &query(Some("Pune"), Some("residential")), today()).unwrap();
        assert_eq!(costs.stamp_duty, 250_000.0);
        assert_eq!(costs.registration_fee, 30_000.0);
        assert_eq!(costs.metro_cess, 50_000.0);
        assert_eq!(costs.brokerage, 0.0);
        assert_eq!(costs.total_charges, 330_000.0);
        assert_eq!(costs.total, 5_330_000.0);
        assert!(costs.total >= costs.price);
    }

    #[test]
    fn female_discount_reduces_stamp_duty_only() {
        let rates = vec![rate(None, None, date(2020, 1, 1))];
        let plain = calculate(&rates, &query(None, None), today()).unwrap();

        let mut q = query(None, None);
        q.female_buyer = true;
        let discounted = calculate(&rates, &q, today()).unwrap();

        assert!(discounted.stamp_duty_payable < plain.stamp_duty_payable);
        assert_eq!(discounted.female_discount, 50_000.0);
        assert_eq!(discounted.registration_fee, plain.registration_fee);
        assert!(discounted.total >= discounted.price);
    }

    #[test]
    fn brokerage_falls_back_to_default() {
        let rates = vec![rate(None, None, date(2020, 1, 1))];
        let mut q = query(None, None);
        q.include_brokerage = true;
        assert_eq!(calculate(&rates, &q, today()).unwrap().brokerage, 50_000.0);

        q.brokerage_pct = Some(2.0);
        assert_eq!(calculate(&rates, &q, today()).unwrap().brokerage, 100_000.0);
    }

    #[test]
    fn components_are_rounded_to_paise() {
        let mut odd = rate(None, None, date(2020, 1, 1));
        odd.stamp_duty_pct = 5.5;
        odd.registration_cap = None;
        let mut q = query(None, None);
        q.price = 1_234_567.89;

        let costs = calculate(&[odd], &q, today()).unwrap();
        assert_eq!(costs.stamp_duty, 67_901.23);
        assert_eq!(costs.registration_fee, 12_345.68);
        assert_eq!(costs.total_charges, 80_246.91);
    }

    #[test]
    fn rejects_non_positive_price() {
        let rates = vec![rate(None, None, date(2020, 1, 1))];
        let mut q = query(None, None);
        q.price = 0.0;
        assert!(matches!(
            calculate(&rates, &q, today()),
            Err(CalculatorError::Invalid(_))
        ));
    }
}
