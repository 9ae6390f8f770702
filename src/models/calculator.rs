use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{self, ValidationError};

/// Fee percentages for one jurisdiction. All `_pct` fields are percents
/// (6.0 means 6%).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalculatorRate {
    pub id: Uuid,
    pub state: String,
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub stamp_duty_pct: f64,
    pub registration_pct: f64,
    pub registration_cap: Option<f64>,
    pub metro_cess_pct: Option<f64>,
    pub female_discount_pct: Option<f64>,
    pub brokerage_pct: Option<f64>,
    pub effective_from: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewRate {
    pub state: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    pub stamp_duty_pct: f64,
    pub registration_pct: f64,
    #[serde(default)]
    pub registration_cap: Option<f64>,
    #[serde(default)]
    pub metro_cess_pct: Option<f64>,
    #[serde(default)]
    pub female_discount_pct: Option<f64>,
    #[serde(default)]
    pub brokerage_pct: Option<f64>,
    pub effective_from: NaiveDate,
}

impl NewRate {
    pub fn into_rate(self, id: Uuid) -> CalculatorRate {
        CalculatorRate {
            id,
            state: self.state,
            city: self.city,
            property_type: self.property_type,
            stamp_duty_pct: self.stamp_duty_pct,
            registration_pct: self.registration_pct,
            registration_cap: self.registration_cap,
            metro_cess_pct: self.metro_cess_pct,
            female_discount_pct: self.female_discount_pct,
            brokerage_pct: self.brokerage_pct,
            effective_from: self.effective_from,
        }
    }
}

/// Body of `POST /calculator/calculate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostQuery {
    pub price: f64,
    pub state: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub female_buyer: bool,
    #[serde(default)]
    pub include_brokerage: bool,
    #[serde(default)]
    pub brokerage_pct: Option<f64>,
}

impl CostQuery {
    pub fn validate(&self) -> validation::Result {
        validation::positive("price", self.price)?;
        validation::required("state", &self.state)?;
        if let Some(pct) = self.brokerage_pct {
            if !(0.0..=100.0).contains(&pct) {
                return Err(ValidationError::invalid(
                    "brokerage_pct",
                    "must be between 0 and 100",
                ));
            }
        }
        Ok(())
    }
}

/// Rupee amounts, each rounded to paise
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostBreakdown {
    pub rate_id: Uuid,
    pub price: f64,
    pub stamp_duty: f64,
    pub female_discount: f64,
    pub stamp_duty_payable: f64,
    pub registration_fee: f64,
    pub metro_cess: f64,
    pub brokerage: f64,
    pub total_charges: f64,
    pub total: f64,
}
