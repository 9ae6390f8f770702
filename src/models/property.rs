use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::{clean_list, non_blank};
use crate::validation::{self, ValidationError};

/// Decides which detail table a listing joins to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ListingType {
    Rent,
    Resale,
    New,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    Villa,
    IndependentHouse,
    Plot,
    Commercial,
    Office,
}

impl PropertyType {
    /// Rate-table category used by the cost calculator.
    pub fn rate_category(&self) -> &'static str {
        match self {
            PropertyType::Apartment
            | PropertyType::Villa
            | PropertyType::IndependentHouse
            | PropertyType::Plot => "residential",
            PropertyType::Commercial | PropertyType::Office => "commercial",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PropertyStatus {
    #[default]
    Active,
    Inactive,
    Sold,
    Rented,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Furnishing {
    Unfurnished,
    SemiFurnished,
    Furnished,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OwnershipType {
    Freehold,
    Leasehold,
    CooperativeSociety,
    PowerOfAttorney,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RentDetails {
    pub monthly_rent: f64,
    pub security_deposit: f64,
    pub maintenance: Option<f64>,
    pub available_from: Option<NaiveDate>,
    pub preferred_tenants: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResaleDetails {
    pub ownership_type: OwnershipType,
    pub property_age_years: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProjectDetails {
    pub builder_name: String,
    pub project_name: Option<String>,
    pub possession_date: Option<NaiveDate>,
    pub rera_id: Option<String>,
}

/// Type-specific fields, tagged by `listing_type` on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "listing_type", rename_all = "snake_case")]
pub enum ListingDetails {
    Rent(RentDetails),
    Resale(ResaleDetails),
    New(NewProjectDetails),
}

impl ListingDetails {
    pub fn listing_type(&self) -> ListingType {
        match self {
            ListingDetails::Rent(_) => ListingType::Rent,
            ListingDetails::Resale(_) => ListingType::Resale,
            ListingDetails::New(_) => ListingType::New,
        }
    }

    pub fn validate(&self) -> validation::Result {
        match self {
            ListingDetails::Rent(rent) => {
                validation::positive("monthly_rent", rent.monthly_rent)?;
                validation::non_negative("security_deposit", rent.security_deposit)?;
                if let Some(maintenance) = rent.maintenance {
                    validation::non_negative("maintenance", maintenance)?;
                }
                Ok(())
            }
            ListingDetails::Resale(resale) => match resale.property_age_years {
                Some(age) if age < 0 => Err(ValidationError::invalid(
                    "property_age_years",
                    "must not be negative",
                )),
                _ => Ok(()),
            },
            ListingDetails::New(project) => validation::required("builder_name", &project.builder_name),
        }
    }

    fn normalized(self) -> Self {
        match self {
            ListingDetails::Rent(rent) => ListingDetails::Rent(RentDetails {
                preferred_tenants: non_blank(rent.preferred_tenants),
                ..rent
            }),
            ListingDetails::Resale(resale) => ListingDetails::Resale(resale),
            ListingDetails::New(project) => ListingDetails::New(NewProjectDetails {
                builder_name: project.builder_name.trim().to_string(),
                project_name: non_blank(project.project_name),
                possession_date: project.possession_date,
                rera_id: non_blank(project.rera_id),
            }),
        }
    }
}

/// Who is looking at a listing. Owner contact details are only shown to
/// registered partners.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Viewer {
    #[default]
    Public,
    Partner,
}

/// A listed property together with its listing-type details
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    #[serde(flatten)]
    pub details: ListingDetails,
    pub price: f64,
    pub area_sqft: f64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub address: String,
    pub locality: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub floor_number: Option<i32>,
    pub total_floors: Option<i32>,
    pub furnishing: Option<Furnishing>,
    pub amenities: Vec<String>,
    pub photos: Vec<String>,
    pub status: PropertyStatus,
    pub society_id: Option<Uuid>,
    pub partner_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn listing_type(&self) -> ListingType {
        self.details.listing_type()
    }

    /// Strips the owner's contact details, which only partners may see.
    pub fn without_contact(mut self) -> Self {
        self.owner_name = None;
        self.owner_phone = None;
        self.owner_email = None;
        self
    }
}

/// Full create payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProperty {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub property_type: PropertyType,
    #[serde(flatten)]
    pub details: ListingDetails,
    pub price: f64,
    pub area_sqft: f64,
    #[serde(default)]
    pub bedrooms: i32,
    #[serde(default)]
    pub bathrooms: i32,
    pub address: String,
    #[serde(default)]
    pub locality: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub floor_number: Option<i32>,
    #[serde(default)]
    pub total_floors: Option<i32>,
    #[serde(default)]
    pub furnishing: Option<Furnishing>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub status: PropertyStatus,
    #[serde(default)]
    pub society_id: Option<Uuid>,
    #[serde(default)]
    pub partner_id: Option<Uuid>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub owner_phone: Option<String>,
    #[serde(default)]
    pub owner_email: Option<String>,
}

impl NewProperty {
    pub fn validate(&self) -> validation::Result {
        validation::required("title", &self.title)?;
        validation::required("address", &self.address)?;
        validation::required("city", &self.city)?;
        validation::required("state", &self.state)?;
        validation::positive("price", self.price)?;
        validation::positive("area_sqft", self.area_sqft)?;
        counts(self.bedrooms, self.bathrooms)?;
        validation::pincode(&self.pincode)?;
        coordinates(self.latitude, self.longitude)?;
        floors(self.floor_number, self.total_floors)?;
        validation::optional_email(self.owner_email.as_deref())?;
        validation::optional_phone(self.owner_phone.as_deref())?;
        self.details.validate()
    }

    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            details: self.details.normalized(),
            address: self.address.trim().to_string(),
            locality: self.locality.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            pincode: self.pincode.trim().to_string(),
            amenities: clean_list(self.amenities),
            photos: clean_list(self.photos),
            owner_name: non_blank(self.owner_name),
            owner_phone: non_blank(self.owner_phone),
            owner_email: non_blank(self.owner_email).map(|e| e.to_lowercase()),
            ..self
        }
    }

    pub fn into_property(self, id: Uuid, now: DateTime<Utc>) -> Property {
        Property {
            id,
            title: self.title,
            description: self.description,
            property_type: self.property_type,
            details: self.details,
            price: self.price,
            area_sqft: self.area_sqft,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            address: self.address,
            locality: self.locality,
            city: self.city,
            state: self.state,
            pincode: self.pincode,
            latitude: self.latitude,
            longitude: self.longitude,
            floor_number: self.floor_number,
            total_floors: self.total_floors,
            furnishing: self.furnishing,
            amenities: self.amenities,
            photos: self.photos,
            status: self.status,
            society_id: self.society_id,
            partner_id: self.partner_id,
            owner_name: self.owner_name,
            owner_phone: self.owner_phone,
            owner_email: self.owner_email,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<Property> for NewProperty {
    fn from(p: Property) -> Self {
        Self {
            title: p.title,
            description: p.description,
            property_type: p.property_type,
            details: p.details,
            price: p.price,
            area_sqft: p.area_sqft,
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            address: p.address,
            locality: p.locality,
            city: p.city,
            state: p.state,
            pincode: p.pincode,
            latitude: p.latitude,
            longitude: p.longitude,
            floor_number: p.floor_number,
            total_floors: p.total_floors,
            furnishing: p.furnishing,
            amenities: p.amenities,
            photos: p.photos,
            status: p.status,
            society_id: p.society_id,
            partner_id: p.partner_id,
            owner_name: p.owner_name,
            owner_phone: p.owner_phone,
            owner_email: p.owner_email,
        }
    }
}

/// Sparse update: only the fields that are `Some` change.
///
/// Optional columns cannot be cleared through a patch, only overwritten.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PropertyPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ListingDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_sqft: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_number: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_floors: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furnishing: Option<Furnishing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PropertyStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub society_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
}

// Copies a field into the patch when it differs between snapshot and draft.
macro_rules! diff_fields {
    ($patch:ident, $before:ident, $after:ident; $($field:ident),+ $(,)?) => {
        $(
            if $before.$field != $after.$field {
                $patch.$field = Some($after.$field.clone());
            }
        )+
    };
}

// Same as `diff_fields` for columns that are nullable on both sides.
macro_rules! diff_optional_fields {
    ($patch:ident, $before:ident, $after:ident; $($field:ident),+ $(,)?) => {
        $(
            if $before.$field != $after.$field {
                $patch.$field = $after.$field.clone();
            }
        )+
    };
}

macro_rules! apply_fields {
    ($patch:ident, $target:ident; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$patch.$field {
                $target.$field = value.clone();
            }
        )+
    };
}

macro_rules! apply_optional_fields {
    ($patch:ident, $target:ident; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$patch.$field {
                $target.$field = Some(value.clone());
            }
        )+
    };
}

impl PropertyPatch {
    /// Fields of `after` that differ from the loaded `before` snapshot.
    pub fn diff(before: &Property, after: &NewProperty) -> Self {
        let mut patch = Self::default();
        diff_fields!(patch, before, after;
            title, description, property_type, details, price, area_sqft, bedrooms,
            bathrooms, address, locality, city, state, pincode, amenities, photos, status,
        );
        diff_optional_fields!(patch, before, after;
            latitude, longitude, floor_number, total_floors, furnishing, society_id,
            partner_id, owner_name, owner_phone, owner_email,
        );
        patch
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Checks only the fields present in the patch.
    pub fn validate(&self) -> validation::Result {
        if let Some(title) = &self.title {
            validation::required("title", title)?;
        }
        if let Some(address) = &self.address {
            validation::required("address", address)?;
        }
        if let Some(city) = &self.city {
            validation::required("city", city)?;
        }
        if let Some(state) = &self.state {
            validation::required("state", state)?;
        }
        if let Some(price) = self.price {
            validation::positive("price", price)?;
        }
        if let Some(area) = self.area_sqft {
            validation::positive("area_sqft", area)?;
        }
        counts(self.bedrooms.unwrap_or(0), self.bathrooms.unwrap_or(0))?;
        if let Some(pincode) = &self.pincode {
            validation::pincode(pincode)?;
        }
        coordinates(self.latitude, self.longitude)?;
        floors(self.floor_number, self.total_floors)?;
        validation::optional_email(self.owner_email.as_deref())?;
        validation::optional_phone(self.owner_phone.as_deref())?;
        if let Some(details) = &self.details {
            details.validate()?;
        }
        Ok(())
    }

    /// Same cleanup as [`NewProperty::normalized`], for the fields present.
    pub fn normalized(self) -> Self {
        let trimmed = |value: Option<String>| value.map(|v| v.trim().to_string());
        Self {
            title: trimmed(self.title),
            description: trimmed(self.description),
            details: self.details.map(ListingDetails::normalized),
            address: trimmed(self.address),
            locality: trimmed(self.locality),
            city: trimmed(self.city),
            state: trimmed(self.state),
            pincode: trimmed(self.pincode),
            amenities: self.amenities.map(clean_list),
            photos: self.photos.map(clean_list),
            owner_name: non_blank(self.owner_name),
            owner_phone: non_blank(self.owner_phone),
            owner_email: non_blank(self.owner_email).map(|e| e.to_lowercase()),
            ..self
        }
    }

    /// Applies the patch to a copy of `current` and checks the result as a
    /// whole listing, so cross-field rules hold after partial updates.
    pub fn merged_into(&self, current: &Property) -> validation::Result<Property> {
        let mut merged = current.clone();
        self.apply_to(&mut merged);
        NewProperty::from(merged.clone()).validate()?;
        Ok(merged)
    }

    pub fn apply_to(&self, target: &mut Property) {
        apply_fields!(self, target;
            title, description, property_type, details, price, area_sqft, bedrooms,
            bathrooms, address, locality, city, state, pincode, amenities, photos, status,
        );
        apply_optional_fields!(self, target;
            latitude, longitude, floor_number, total_floors, furnishing, society_id,
            partner_id, owner_name, owner_phone, owner_email,
        );
    }
}

fn counts(bedrooms: i32, bathrooms: i32) -> validation::Result {
    if bedrooms < 0 {
        return Err(ValidationError::invalid("bedrooms", "must not be negative"));
    }
    if bathrooms < 0 {
        return Err(ValidationError::invalid("bathrooms", "must not be negative"));
    }
    Ok(())
}

fn coordinates(latitude: Option<f64>, longitude: Option<f64>) -> validation::Result {
    if latitude.is_some_and(|lat| !(-90.0..=90.0).contains(&lat)) {
        return Err(ValidationError::invalid("latitude", "must be between -90 and 90"));
    }
    if longitude.is_some_and(|lng| !(-180.0..=180.0).contains(&lng)) {
        return Err(ValidationError::invalid("longitude", "must be between -180 and 180"));
    }
    Ok(())
}

fn floors(floor_number: Option<i32>, total_floors: Option<i32>) -> validation::Result {
    if total_floors.is_some_and(|t| t <= 0) {
        return Err(ValidationError::invalid("total_floors", "must be greater than zero"));
    }
    if let (Some(floor), Some(total)) = (floor_number, total_floors) {
        if floor > total {
            return Err(ValidationError::invalid(
                "floor_number",
                "must not exceed total_floors",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> NewProperty {
        serde_json::from_value(json!({
            "title": "2BHK near Baner Road",
            "property_type": "apartment",
            "listing_type": "rent",
            "monthly_rent": 28000.0,
            "security_deposit": 100000.0,
            "price": 28000.0,
            "area_sqft": 950.0,
            "bedrooms": 2,
            "bathrooms": 2,
            "address": "Baner Road",
            "city": "Pune",
            "state": "Maharashtra"
        }))
        .unwrap()
    }

    #[test]
    fn listing_type_comes_from_the_details_tag() {
        let property = sample();
        assert_eq!(property.details.listing_type(), ListingType::Rent);
        assert!(property.validate().is_ok());

        let value = serde_json::to_value(&property).unwrap();
        assert_eq!(value["listing_type"], "rent");
        assert_eq!(value["monthly_rent"], 28000.0);
    }

    #[test]
    fn new_project_needs_a_builder() {
        let mut property = sample();
        property.details = ListingDetails::New(NewProjectDetails {
            builder_name: "  ".into(),
            project_name: None,
            possession_date: None,
            rera_id: None,
        });
        assert_eq!(
            property.validate(),
            Err(ValidationError::Required("builder_name"))
        );
    }

    #[test]
    fn floor_cannot_exceed_total() {
        let mut property = sample();
        property.floor_number = Some(12);
        property.total_floors = Some(10);
        assert!(property.validate().is_err());
    }

    #[test]
    fn diff_only_carries_changed_fields() {
        let snapshot = sample().into_property(Uuid::new_v4(), Utc::now());
        let mut draft = NewProperty::from(snapshot.clone());
        draft.price = 30000.0;
        draft.amenities = vec!["Gym".into()];
        draft.owner_phone = Some("9876543210".into());

        let patch = PropertyPatch::diff(&snapshot, &draft);
        assert_eq!(patch.price, Some(30000.0));
        assert_eq!(patch.amenities, Some(vec!["Gym".to_string()]));
        assert_eq!(patch.owner_phone.as_deref(), Some("9876543210"));
        assert!(patch.title.is_none());
        assert!(patch.details.is_none());

        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body.as_object().unwrap().len(), 3);
    }

    #[test]
    fn unchanged_draft_gives_empty_patch() {
        let snapshot = sample().into_property(Uuid::new_v4(), Utc::now());
        let draft = NewProperty::from(snapshot.clone());
        assert!(PropertyPatch::diff(&snapshot, &draft).is_empty());
    }

    #[test]
    fn apply_overwrites_present_fields() {
        let mut property = sample().into_property(Uuid::new_v4(), Utc::now());
        let patch = PropertyPatch {
            city: Some("Mumbai".into()),
            floor_number: Some(3),
            ..Default::default()
        };
        patch.apply_to(&mut property);
        assert_eq!(property.city, "Mumbai");
        assert_eq!(property.floor_number, Some(3));
        assert_eq!(property.state, "Maharashtra");
    }

    #[test]
    fn patch_is_checked_against_the_stored_listing() {
        let mut new = sample();
        new.floor_number = Some(5);
        new.total_floors = Some(10);
        let property = new.into_property(Uuid::new_v4(), Utc::now());

        let too_high = PropertyPatch {
            floor_number: Some(50),
            ..Default::default()
        };
        assert!(too_high.validate().is_ok());
        assert!(too_high.merged_into(&property).is_err());

        let fine = PropertyPatch {
            floor_number: Some(9),
            ..Default::default()
        };
        assert_eq!(fine.merged_into(&property).unwrap().floor_number, Some(9));
    }

    #[test]
    fn patch_is_cleaned_like_a_new_listing() {
        let patch = PropertyPatch {
            title: Some("  padded again  ".into()),
            owner_email: Some("LAKSHMI@EXAMPLE.IN".into()),
            owner_name: Some("   ".into()),
            amenities: Some(vec!["  ".into(), "Gym ".into()]),
            ..Default::default()
        }
        .normalized();

        assert_eq!(patch.title.as_deref(), Some("padded again"));
        assert_eq!(patch.owner_email.as_deref(), Some("lakshmi@example.in"));
        assert!(patch.owner_name.is_none());
        assert_eq!(patch.amenities, Some(vec!["Gym".to_string()]));
    }

    #[test]
    fn contact_is_hidden_from_public_views() {
        let mut new = sample();
        new.owner_name = Some("Ravi".into());
        new.owner_phone = Some("9876543210".into());
        let property = new.into_property(Uuid::new_v4(), Utc::now()).without_contact();
        let value = serde_json::to_value(&property).unwrap();
        assert!(value.get("owner_phone").is_none());
        assert!(value.get("owner_name").is_none());
    }
}
