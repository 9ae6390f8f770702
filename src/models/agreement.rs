use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use uuid::Uuid;

use super::{non_blank, Contact, RequestStatus};
use crate::validation::{self, ValidationError};

pub const MAX_DURATION_MONTHS: u32 = 60;

/// A generated leave-and-licence agreement plus the request that produced it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agreement {
    pub id: Uuid,
    #[serde(flatten)]
    pub contact: Contact,
    pub landlord_name: String,
    pub tenant_name: String,
    pub property_address: String,
    pub city: String,
    pub monthly_rent: f64,
    pub security_deposit: f64,
    pub start_date: NaiveDate,
    pub duration_months: u32,
    pub notice_period_months: u32,
    pub remarks: Option<String>,
    pub document: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAgreement {
    #[serde(flatten)]
    pub contact: Contact,
    pub landlord_name: String,
    pub tenant_name: String,
    pub property_address: String,
    pub city: String,
    pub monthly_rent: f64,
    #[serde(default)]
    pub security_deposit: f64,
    pub start_date: NaiveDate,
    pub duration_months: u32,
    #[serde(default = "default_notice_period")]
    pub notice_period_months: u32,
    #[serde(default)]
    pub remarks: Option<String>,
}

fn default_notice_period() -> u32 {
    1
}

impl NewAgreement {
    pub fn validate(&self) -> validation::Result {
        self.contact.validate()?;
        validation::required("landlord_name", &self.landlord_name)?;
        validation::required("tenant_name", &self.tenant_name)?;
        validation::required("property_address", &self.property_address)?;
        validation::required("city", &self.city)?;
        validation::positive("monthly_rent", self.monthly_rent)?;
        validation::non_negative("security_deposit", self.security_deposit)?;
        if !(1..=MAX_DURATION_MONTHS).contains(&self.duration_months) {
            return Err(ValidationError::invalid(
                "duration_months",
                format!("must be between 1 and {MAX_DURATION_MONTHS}"),
            ));
        }
        if self.notice_period_months > self.duration_months {
            return Err(ValidationError::invalid(
                "notice_period_months",
                "must not exceed duration_months",
            ));
        }
        Ok(())
    }

    /// Last day the licence is in force.
    pub fn end_date(&self) -> NaiveDate {
        self.start_date
            .checked_add_months(Months::new(self.duration_months))
            .and_then(|d| d.pred_opt())
            .unwrap_or(self.start_date)
    }

    /// Renders the agreement text. Output depends only on the request.
    pub fn render(&self) -> String {
        let mut doc = String::new();
        let _ = writeln!(doc, "LEAVE AND LICENCE AGREEMENT");
        let _ = writeln!(doc);
        let _ = writeln!(
            doc,
            "This agreement is made at {} between {} (the Licensor) and {} (the Licensee).",
            self.city.trim(),
            self.landlord_name.trim(),
            self.tenant_name.trim()
        );
        let _ = writeln!(doc);
        let _ = writeln!(doc, "1. Premises: {}", self.property_address.trim());
        let _ = writeln!(
            doc,
            "2. Term: {} months, from {} to {}.",
            self.duration_months,
            self.start_date.format("%d %B %Y"),
            self.end_date().format("%d %B %Y")
        );
        let _ = writeln!(
            doc,
            "3. Licence fee: Rs. {:.2} per month, payable in advance on or before the 5th of each month.",
            self.monthly_rent
        );
        let _ = writeln!(
            doc,
            "4. Security deposit: Rs. {:.2}, refundable without interest at the end of the term.",
            self.security_deposit
        );
        let _ = writeln!(
            doc,
            "5. Either party may terminate this agreement with {} month(s) written notice.",
            self.notice_period_months
        );
        let _ = writeln!(
            doc,
            "6. The Licensee shall use the premises for residential purposes only and shall not sub-let."
        );
        if let Some(remarks) = non_blank(self.remarks.clone()) {
            let _ = writeln!(doc, "7. Additional terms: {remarks}");
        }
        let _ = writeln!(doc);
        let _ = writeln!(doc, "Licensor: {}", self.landlord_name.trim());
        let _ = write!(doc, "Licensee: {}", self.tenant_name.trim());
        doc
    }

    pub fn into_agreement(self, now: DateTime<Utc>) -> Agreement {
        let document = self.render();
        Agreement {
            id: Uuid::new_v4(),
            contact: self.contact.normalized(),
            landlord_name: self.landlord_name.trim().to_string(),
            tenant_name: self.tenant_name.trim().to_string(),
            property_address: self.property_address.trim().to_string(),
            city: self.city.trim().to_string(),
            monthly_rent: self.monthly_rent,
            security_deposit: self.security_deposit,
            start_date: self.start_date,
            duration_months: self.duration_months,
            notice_period_months: self.notice_period_months,
            remarks: non_blank(self.remarks),
            document,
            status: RequestStatus::Pending,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NewAgreement {
        NewAgreement {
            contact: Contact {
                name: "Anil Deshpande".into(),
                email: "anil@example.in".into(),
                phone: "9890012345".into(),
            },
            landlord_name: "Anil Deshpande".into(),
            tenant_name: "Sara Thomas".into(),
            property_address: "B-402, Green Meadows, Wakad".into(),
            city: "Pune".into(),
            monthly_rent: 25000.0,
            security_deposit: 75000.0,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            duration_months: 11,
            notice_period_months: 1,
            remarks: None,
        }
    }

    #[test]
    fn end_date_is_inclusive() {
        assert_eq!(
            request().end_date(),
            NaiveDate::from_ymd_opt(2026, 11, 30).unwrap()
        );
    }

    #[test]
    fn render_is_deterministic() {
        let doc = request().render();
        assert_eq!(doc, request().render());
        assert!(doc.contains("between Anil Deshpande (the Licensor) and Sara Thomas"));
        assert!(doc.contains("11 months, from 01 January 2026 to 30 November 2026"));
        assert!(doc.contains("Rs. 25000.00 per month"));
        assert!(!doc.contains("Additional terms"));
    }

    #[test]
    fn remarks_become_a_clause() {
        let mut req = request();
        req.remarks = Some("Pets allowed".into());
        assert!(req.render().contains("7. Additional terms: Pets allowed"));
    }

    #[test]
    fn duration_bounds() {
        let mut req = request();
        req.duration_months = 0;
        assert!(req.validate().is_err());
        req.duration_months = 61;
        assert!(req.validate().is_err());
        req.duration_months = 11;
        req.notice_period_months = 12;
        assert!(req.validate().is_err());
    }
}
