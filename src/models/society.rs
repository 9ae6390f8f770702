use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::clean_list;
use crate::validation::{self, ValidationError};

/// An apartment complex that listings can point at for shared metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Society {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub locality: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub total_floors: Option<i32>,
    pub total_towers: Option<i32>,
    pub build_year: Option<i32>,
    pub amenities: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSociety {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub locality: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub total_floors: Option<i32>,
    #[serde(default)]
    pub total_towers: Option<i32>,
    #[serde(default)]
    pub build_year: Option<i32>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl NewSociety {
    pub fn validate(&self, now: DateTime<Utc>) -> validation::Result {
        validation::required("name", &self.name)?;
        validation::required("address", &self.address)?;
        validation::required("city", &self.city)?;
        validation::required("state", &self.state)?;
        validation::pincode(&self.pincode)?;
        if self.total_floors.is_some_and(|f| f <= 0) {
            return Err(ValidationError::invalid("total_floors", "must be greater than zero"));
        }
        if self.total_towers.is_some_and(|t| t <= 0) {
            return Err(ValidationError::invalid("total_towers", "must be greater than zero"));
        }
        // under-construction complexes may list a completion year a few years out
        let latest = now.year() + 5;
        if self.build_year.is_some_and(|y| !(1800..=latest).contains(&y)) {
            return Err(ValidationError::invalid(
                "build_year",
                format!("must be between 1800 and {latest}"),
            ));
        }
        Ok(())
    }

    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
            locality: self.locality.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            pincode: self.pincode.trim().to_string(),
            amenities: clean_list(self.amenities),
            ..self
        }
    }

    pub fn into_society(self, id: Uuid, created_at: DateTime<Utc>, now: DateTime<Utc>) -> Society {
        Society {
            id,
            name: self.name,
            address: self.address,
            locality: self.locality,
            city: self.city,
            state: self.state,
            pincode: self.pincode,
            total_floors: self.total_floors,
            total_towers: self.total_towers,
            build_year: self.build_year,
            amenities: self.amenities,
            created_at,
            updated_at: now,
        }
    }
}
