//! Demo data for a fresh database: a calculator rate table, a handful of
//! societies and sample listings across listing types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::models::{
    Furnishing, ListingDetails, NewProjectDetails, NewProperty, NewRate, NewSociety,
    OwnershipType, PropertyStatus, PropertyType, RentDetails, ResaleDetails,
};
use crate::store::{MarketStore, StoreError};

/// Counts of rows inserted by one seeding run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedReport {
    pub rates: usize,
    pub societies: usize,
    pub properties: usize,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn rate(state: &str, city: Option<&str>, property_type: Option<&str>) -> NewRate {
    NewRate {
        state: state.into(),
        city: city.map(Into::into),
        property_type: property_type.map(Into::into),
        stamp_duty_pct: 5.0,
        registration_pct: 1.0,
        registration_cap: None,
        metro_cess_pct: None,
        female_discount_pct: None,
        brokerage_pct: None,
        effective_from: date(2024, 4, 1),
    }
}

pub fn default_rates() -> Vec<NewRate> {
    vec![
        NewRate {
            registration_cap: Some(30_000.0),
            female_discount_pct: Some(20.0),
            ..rate("Maharashtra", None, None)
        },
        NewRate {
            registration_cap: Some(30_000.0),
            metro_cess_pct: Some(1.0),
            female_discount_pct: Some(20.0),
            ..rate("Maharashtra", Some("Mumbai"), None)
        },
        NewRate {
            registration_cap: Some(30_000.0),
            metro_cess_pct: Some(1.0),
            female_discount_pct: Some(20.0),
            ..rate("Maharashtra", Some("Pune"), None)
        },
        NewRate {
            registration_cap: Some(30_000.0),
            metro_cess_pct: Some(1.0),
            brokerage_pct: Some(2.0),
            ..rate("Maharashtra", Some("Mumbai"), Some("commercial"))
        },
        NewRate {
            stamp_duty_pct: 6.0,
            female_discount_pct: Some(33.33),
            ..rate("Delhi", None, None)
        },
        rate("Karnataka", None, None),
        NewRate {
            stamp_duty_pct: 7.0,
            registration_pct: 2.0,
            ..rate("Tamil Nadu", None, None)
        },
        NewRate {
            stamp_duty_pct: 5.5,
            registration_pct: 0.5,
            ..rate("Telangana", None, None)
        },
    ]
}

pub fn sample_societies() -> Vec<NewSociety> {
    vec![
        NewSociety {
            name: "Green Valley Residency".into(),
            address: "Baner Road, near Balewadi Phata".into(),
            locality: "Baner".into(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            pincode: "411045".into(),
            total_floors: Some(14),
            total_towers: Some(4),
            build_year: Some(2016),
            amenities: vec!["Gym".into(), "Swimming Pool".into(), "Clubhouse".into()],
        },
        NewSociety {
            name: "Sea Breeze Towers".into(),
            address: "Lokhandwala Complex, Andheri West".into(),
            locality: "Andheri West".into(),
            city: "Mumbai".into(),
            state: "Maharashtra".into(),
            pincode: "400053".into(),
            total_floors: Some(22),
            total_towers: Some(2),
            build_year: Some(2011),
            amenities: vec!["Lift".into(), "Power Backup".into(), "Security".into()],
        },
        NewSociety {
            name: "Prestige Lakeside".into(),
            address: "Varthur Main Road".into(),
            locality: "Whitefield".into(),
            city: "Bengaluru".into(),
            state: "Karnataka".into(),
            pincode: "560066".into(),
            total_floors: Some(18),
            total_towers: Some(6),
            build_year: Some(2019),
            amenities: vec!["Gym".into(), "Children's Play Area".into()],
        },
    ]
}

fn listing(title: &str, property_type: PropertyType, details: ListingDetails) -> NewProperty {
    NewProperty {
        title: title.into(),
        description: String::new(),
        property_type,
        details,
        price: 0.0,
        area_sqft: 0.0,
        bedrooms: 0,
        bathrooms: 0,
        address: String::new(),
        locality: String::new(),
        city: String::new(),
        state: String::new(),
        pincode: String::new(),
        latitude: None,
        longitude: None,
        floor_number: None,
        total_floors: None,
        furnishing: None,
        amenities: vec![],
        photos: vec![],
        status: PropertyStatus::Active,
        society_id: None,
        partner_id: None,
        owner_name: None,
        owner_phone: None,
        owner_email: None,
    }
}

/// `society_id` links the first listing to a seeded society when one exists.
pub fn sample_properties(society_id: Option<Uuid>) -> Vec<NewProperty> {
    vec![
        NewProperty {
            description: "Corner flat with two balconies, covered parking and 24x7 security."
                .into(),
            price: 28_000.0,
            area_sqft: 1_050.0,
            bedrooms: 2,
            bathrooms: 2,
            address: "Green Valley Residency, Baner Road".into(),
            locality: "Baner".into(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            pincode: "411045".into(),
            latitude: Some(18.5590),
            longitude: Some(73.7868),
            floor_number: Some(6),
            total_floors: Some(14),
            furnishing: Some(Furnishing::SemiFurnished),
            amenities: vec!["Gym".into(), "Swimming Pool".into()],
            society_id,
            owner_name: Some("Rohit Kulkarni".into()),
            owner_phone: Some("9822012345".into()),
            owner_email: Some("rohit.kulkarni@example.in".into()),
            ..listing(
                "2 BHK in Baner",
                PropertyType::Apartment,
                ListingDetails::Rent(RentDetails {
                    monthly_rent: 28_000.0,
                    security_deposit: 84_000.0,
                    maintenance: Some(2_500.0),
                    available_from: Some(date(2025, 1, 1)),
                    preferred_tenants: Some("Family".into()),
                }),
            )
        },
        NewProperty {
            description: "Sea-facing apartment, walking distance from the metro.".into(),
            price: 24_500_000.0,
            area_sqft: 1_250.0,
            bedrooms: 3,
            bathrooms: 3,
            address: "Sea Breeze Towers, Lokhandwala Complex".into(),
            locality: "Andheri West".into(),
            city: "Mumbai".into(),
            state: "Maharashtra".into(),
            pincode: "400053".into(),
            floor_number: Some(15),
            total_floors: Some(22),
            furnishing: Some(Furnishing::Furnished),
            amenities: vec!["Lift".into(), "Power Backup".into()],
            owner_name: Some("Farah Shaikh".into()),
            owner_phone: Some("9820098765".into()),
            ..listing(
                "3 BHK sea view in Andheri West",
                PropertyType::Apartment,
                ListingDetails::Resale(ResaleDetails {
                    ownership_type: OwnershipType::CooperativeSociety,
                    property_age_years: Some(13),
                }),
            )
        },
        NewProperty {
            description: "Gated villa community with private gardens. Possession by 2026."
                .into(),
            price: 32_000_000.0,
            area_sqft: 3_200.0,
            bedrooms: 4,
            bathrooms: 5,
            address: "Sarjapur Road".into(),
            locality: "Sarjapur".into(),
            city: "Bengaluru".into(),
            state: "Karnataka".into(),
            pincode: "562125".into(),
            total_floors: Some(3),
            amenities: vec!["Clubhouse".into(), "Private Garden".into()],
            ..listing(
                "4 BHK villa off Sarjapur Road",
                PropertyType::Villa,
                ListingDetails::New(NewProjectDetails {
                    builder_name: "Sobha Developers".into(),
                    project_name: Some("Sobha Dream Gardens".into()),
                    possession_date: Some(date(2026, 12, 31)),
                    rera_id: Some("PRM/KA/RERA/1251/310/PR/180123/001234".into()),
                }),
            )
        },
        NewProperty {
            description: "Ready office space with 40 workstations and two cabins.".into(),
            price: 185_000.0,
            area_sqft: 2_400.0,
            bathrooms: 2,
            address: "Cyber Towers, HITEC City".into(),
            locality: "Madhapur".into(),
            city: "Hyderabad".into(),
            state: "Telangana".into(),
            pincode: "500081".into(),
            floor_number: Some(7),
            total_floors: Some(12),
            furnishing: Some(Furnishing::Furnished),
            amenities: vec!["Power Backup".into(), "Cafeteria".into()],
            ..listing(
                "Furnished office in HITEC City",
                PropertyType::Office,
                ListingDetails::Rent(RentDetails {
                    monthly_rent: 185_000.0,
                    security_deposit: 1_110_000.0,
                    maintenance: None,
                    available_from: None,
                    preferred_tenants: None,
                }),
            )
        },
    ]
}

/// Rates and societies are inserted only into empty tables. Sample listings
/// are added on every run.
#[tracing::instrument(skip(store))]
pub async fn seed(store: &dyn MarketStore) -> Result<SeedReport, StoreError> {
    let mut report = SeedReport::default();

    if store.count_rates().await? == 0 {
        report.rates = store.insert_rates(default_rates()).await?;
    } else {
        info!("calculator rates already present, skipping");
    }

    let mut first_society = None;
    if store.count_societies().await? == 0 {
        for society in sample_societies() {
            let society = store.create_society(society).await?;
            first_society.get_or_insert(society.id);
            report.societies += 1;
        }
    } else {
        info!("societies already present, skipping");
    }

    for property in sample_properties(first_society) {
        store.create_property(property).await?;
        report.properties += 1;
    }

    info!(
        rates = report.rates,
        societies = report.societies,
        properties = report.properties,
        "seeded demo data"
    );
    Ok(report)
}
