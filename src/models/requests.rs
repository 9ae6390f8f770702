//! Intake forms for the side services: legal help, packers and movers,
//! and ownership transfer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::{non_blank, Contact, RequestStatus};
use crate::validation::{self, ValidationError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LegalServiceType {
    SaleDeed,
    RentalAgreement,
    PropertyVerification,
    TitleSearch,
    Registration,
    PowerOfAttorney,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegalServiceRequest {
    pub id: Uuid,
    #[serde(flatten)]
    pub contact: Contact,
    pub service_type: LegalServiceType,
    pub property_address: Option<String>,
    pub city: String,
    pub remarks: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLegalServiceRequest {
    #[serde(flatten)]
    pub contact: Contact,
    pub service_type: LegalServiceType,
    #[serde(default)]
    pub property_address: Option<String>,
    pub city: String,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl NewLegalServiceRequest {
    pub fn validate(&self) -> validation::Result {
        self.contact.validate()?;
        validation::required("city", &self.city)
    }

    pub fn into_request(self, now: DateTime<Utc>) -> LegalServiceRequest {
        LegalServiceRequest {
            id: Uuid::new_v4(),
            contact: self.contact.normalized(),
            service_type: self.service_type,
            property_address: non_blank(self.property_address),
            city: self.city.trim().to_string(),
            remarks: non_blank(self.remarks),
            status: RequestStatus::Pending,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HouseSize {
    #[serde(rename = "1rk")]
    #[strum(serialize = "1rk")]
    OneRk,
    #[serde(rename = "1bhk")]
    #[strum(serialize = "1bhk")]
    OneBhk,
    #[serde(rename = "2bhk")]
    #[strum(serialize = "2bhk")]
    TwoBhk,
    #[serde(rename = "3bhk")]
    #[strum(serialize = "3bhk")]
    ThreeBhk,
    #[serde(rename = "4bhk_plus")]
    #[strum(serialize = "4bhk_plus")]
    FourBhkPlus,
    Villa,
    Office,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovingRequest {
    pub id: Uuid,
    #[serde(flatten)]
    pub contact: Contact,
    pub from_city: String,
    pub from_address: String,
    pub to_city: String,
    pub to_address: String,
    pub moving_date: NaiveDate,
    pub house_size: HouseSize,
    pub remarks: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMovingRequest {
    #[serde(flatten)]
    pub contact: Contact,
    pub from_city: String,
    #[serde(default)]
    pub from_address: String,
    pub to_city: String,
    #[serde(default)]
    pub to_address: String,
    pub moving_date: NaiveDate,
    pub house_size: HouseSize,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl NewMovingRequest {
    /// `today` is the earliest acceptable moving date.
    pub fn validate(&self, today: NaiveDate) -> validation::Result {
        self.contact.validate()?;
        validation::required("from_city", &self.from_city)?;
        validation::required("to_city", &self.to_city)?;
        if self.moving_date < today {
            return Err(ValidationError::invalid("moving_date", "must not be in the past"));
        }
        Ok(())
    }

    pub fn into_request(self, now: DateTime<Utc>) -> MovingRequest {
        MovingRequest {
            id: Uuid::new_v4(),
            contact: self.contact.normalized(),
            from_city: self.from_city.trim().to_string(),
            from_address: self.from_address.trim().to_string(),
            to_city: self.to_city.trim().to_string(),
            to_address: self.to_address.trim().to_string(),
            moving_date: self.moving_date,
            house_size: self.house_size,
            remarks: non_blank(self.remarks),
            status: RequestStatus::Pending,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransferType {
    Sale,
    Gift,
    Inheritance,
    Partition,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyTransfer {
    pub id: Uuid,
    #[serde(flatten)]
    pub contact: Contact,
    pub transfer_type: TransferType,
    pub seller_name: String,
    pub buyer_name: String,
    pub property_address: String,
    pub city: String,
    pub state: String,
    pub property_value: Option<f64>,
    pub remarks: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPropertyTransfer {
    #[serde(flatten)]
    pub contact: Contact,
    pub transfer_type: TransferType,
    pub seller_name: String,
    pub buyer_name: String,
    pub property_address: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub property_value: Option<f64>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl NewPropertyTransfer {
    pub fn validate(&self) -> validation::Result {
        self.contact.validate()?;
        validation::required("seller_name", &self.seller_name)?;
        validation::required("buyer_name", &self.buyer_name)?;
        validation::required("property_address", &self.property_address)?;
        validation::required("city", &self.city)?;
        validation::required("state", &self.state)?;
        if let Some(value) = self.property_value {
            validation::positive("property_value", value)?;
        }
        Ok(())
    }

    pub fn into_transfer(self, now: DateTime<Utc>) -> PropertyTransfer {
        PropertyTransfer {
            id: Uuid::new_v4(),
            contact: self.contact.normalized(),
            transfer_type: self.transfer_type,
            seller_name: self.seller_name.trim().to_string(),
            buyer_name: self.buyer_name.trim().to_string(),
            property_address: self.property_address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            property_value: self.property_value,
            remarks: non_blank(self.remarks),
            status: RequestStatus::Pending,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn house_size_wire_names() {
        assert_eq!(serde_json::to_value(HouseSize::TwoBhk).unwrap(), json!("2bhk"));
        assert_eq!("4bhk_plus".parse::<HouseSize>().unwrap(), HouseSize::FourBhkPlus);
        assert_eq!(HouseSize::OneRk.to_string(), "1rk");
    }

    #[test]
    fn moving_date_cannot_be_past() {
        let request: NewMovingRequest = serde_json::from_value(json!({
            "name": "Kiran",
            "email": "kiran@example.in",
            "phone": "9811122233",
            "from_city": "Pune",
            "to_city": "Bengaluru",
            "moving_date": "2026-03-01",
            "house_size": "2bhk"
        }))
        .unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert!(request.validate(today).is_err());
        let earlier = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        assert!(request.validate(earlier).is_ok());
    }

    #[test]
    fn transfer_requires_both_parties() {
        let request: NewPropertyTransfer = serde_json::from_value(json!({
            "name": "Kiran",
            "email": "kiran@example.in",
            "phone": "9811122233",
            "transfer_type": "gift",
            "seller_name": "Kiran",
            "buyer_name": "",
            "property_address": "Flat 4, Shanti Niwas",
            "city": "Nashik",
            "state": "Maharashtra"
        }))
        .unwrap();
        assert_eq!(
            request.validate(),
            Err(ValidationError::Required("buyer_name"))
        );
    }
}
