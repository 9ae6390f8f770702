//! Process-local store for development and tests. Contents are lost on
//! restart.

use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Reverse;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::error::{Result, StoreError};
use super::filter::PropertyFilter;
use super::traits::{IntakeStore, PartnerStore, PropertyStore, RateStore, SocietyStore};
use crate::models::{
    Agreement, BankDetails, CalculatorRate, Inquiry, InquiryFilter, LegalServiceRequest,
    MovingRequest, NewProperty, NewRate, NewSociety, Partner, PartnerStatus, Property,
    PropertyPatch, PropertyTransfer, RegistrationStep, RequestStatus, Society, WorkDetails,
};

#[derive(Default)]
struct Tables {
    properties: HashMap<Uuid, Property>,
    societies: HashMap<Uuid, Society>,
    partners: HashMap<Uuid, Partner>,
    // intake records are kept in insertion order
    inquiries: Vec<Inquiry>,
    legal_requests: Vec<LegalServiceRequest>,
    moving_requests: Vec<MovingRequest>,
    agreements: Vec<Agreement>,
    transfers: Vec<PropertyTransfer>,
    rates: Vec<CalculatorRate>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T: Clone>(rows: &[T], keep: impl Fn(&T) -> bool) -> Vec<T> {
    rows.iter().rev().filter(|r| keep(r)).cloned().collect()
}

/// Mirrors the `properties.partner_id` foreign key.
fn ensure_partner(tables: &Tables, partner_id: Option<Uuid>) -> Result<()> {
    match partner_id {
        Some(id) if !tables.partners.contains_key(&id) => Err(StoreError::NotFound("Partner")),
        _ => Ok(()),
    }
}

fn status_matches(wanted: Option<RequestStatus>, actual: RequestStatus) -> bool {
    wanted.map_or(true, |s| s == actual)
}

#[async_trait]
impl PropertyStore for MemoryStore {
    async fn create_property(&self, property: NewProperty) -> Result<Property> {
        let mut tables = self.tables.write().await;
        ensure_partner(&tables, property.partner_id)?;
        let property = property.into_property(Uuid::new_v4(), Utc::now());
        tables.properties.insert(property.id, property.clone());
        Ok(property)
    }

    async fn get_property(&self, id: Uuid) -> Result<Option<Property>> {
        Ok(self.tables.read().await.properties.get(&id).cloned())
    }

    async fn search_properties(&self, filter: &PropertyFilter) -> Result<Vec<Property>> {
        let tables = self.tables.read().await;
        let mut hits: Vec<&Property> = tables
            .properties
            .values()
            .filter(|p| filter.matches(p))
            .collect();
        hits.sort_by_key(|p| Reverse((p.created_at, p.id)));

        Ok(hits
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    async fn update_property(&self, id: Uuid, patch: PropertyPatch) -> Result<Option<Property>> {
        let mut tables = self.tables.write().await;
        let Some(current) = tables.properties.get(&id) else {
            return Ok(None);
        };
        let mut merged = patch.merged_into(current)?;
        ensure_partner(&tables, patch.partner_id)?;

        merged.updated_at = Utc::now();
        tables.properties.insert(id, merged.clone());
        Ok(Some(merged))
    }

    async fn delete_property(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.properties.remove(&id).is_some())
    }
}

#[async_trait]
impl SocietyStore for MemoryStore {
    async fn create_society(&self, society: NewSociety) -> Result<Society> {
        let now = Utc::now();
        let society = society.into_society(Uuid::new_v4(), now, now);
        let mut tables = self.tables.write().await;
        tables.societies.insert(society.id, society.clone());
        Ok(society)
    }

    async fn get_society(&self, id: Uuid) -> Result<Option<Society>> {
        Ok(self.tables.read().await.societies.get(&id).cloned())
    }

    async fn list_societies(&self, city: Option<&str>) -> Result<Vec<Society>> {
        let needle = city.map(|c| c.trim().to_lowercase());
        let tables = self.tables.read().await;
        let mut societies: Vec<Society> = tables
            .societies
            .values()
            .filter(|s| {
                needle
                    .as_deref()
                    .map_or(true, |n| s.city.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        societies.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(societies)
    }

    async fn replace_society(&self, id: Uuid, society: NewSociety) -> Result<Option<Society>> {
        let mut tables = self.tables.write().await;
        let Some(existing) = tables.societies.get_mut(&id) else {
            return Ok(None);
        };
        *existing = society.into_society(id, existing.created_at, Utc::now());
        Ok(Some(existing.clone()))
    }

    async fn delete_society(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.societies.remove(&id).is_some())
    }

    async fn count_societies(&self) -> Result<i64> {
        Ok(self.tables.read().await.societies.len() as i64)
    }
}

impl MemoryStore {
    async fn update_partner(
        &self,
        id: Uuid,
        update: impl FnOnce(&mut Partner),
    ) -> Result<Option<Partner>> {
        let mut tables = self.tables.write().await;
        let Some(partner) = tables.partners.get_mut(&id) else {
            return Ok(None);
        };
        update(partner);
        partner.updated_at = Utc::now();
        Ok(Some(partner.clone()))
    }
}

#[async_trait]
impl PartnerStore for MemoryStore {
    async fn create_partner(&self, partner: Partner) -> Result<Partner> {
        let mut tables = self.tables.write().await;
        if tables
            .partners
            .values()
            .any(|p| p.email.eq_ignore_ascii_case(&partner.email))
        {
            return Err(StoreError::Conflict(
                "A partner with this email already exists".into(),
            ));
        }
        tables.partners.insert(partner.id, partner.clone());
        Ok(partner)
    }

    async fn get_partner(&self, id: Uuid) -> Result<Option<Partner>> {
        Ok(self.tables.read().await.partners.get(&id).cloned())
    }

    async fn find_partner_by_email(&self, email: &str) -> Result<Option<Partner>> {
        let email = email.trim();
        Ok(self
            .tables
            .read()
            .await
            .partners
            .values()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_partners(&self, status: Option<PartnerStatus>) -> Result<Vec<Partner>> {
        let tables = self.tables.read().await;
        let mut partners: Vec<Partner> = tables
            .partners
            .values()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .cloned()
            .collect();
        partners.sort_by_key(|p| Reverse((p.created_at, p.id)));
        Ok(partners)
    }

    async fn save_work_details(&self, id: Uuid, details: WorkDetails) -> Result<Option<Partner>> {
        self.update_partner(id, |partner| {
            partner.company_name = details.company_name;
            partner.experience_years = details.experience_years;
            partner.operating_cities = details.operating_cities;
            partner.specialization = details.specialization;
            partner.rera_number = details.rera_number;
            partner.reach(RegistrationStep::WorkDetails);
        })
        .await
    }

    async fn save_documents(&self, id: Uuid, documents: Vec<String>) -> Result<Option<Partner>> {
        self.update_partner(id, |partner| {
            partner.documents = documents;
            partner.reach(RegistrationStep::Documents);
        })
        .await
    }

    async fn save_bank_details(&self, id: Uuid, bank: BankDetails) -> Result<Option<Partner>> {
        self.update_partner(id, |partner| {
            partner.bank = Some(bank);
            partner.reach(RegistrationStep::BankDetails);
        })
        .await
    }

    async fn set_partner_status(
        &self,
        id: Uuid,
        status: PartnerStatus,
    ) -> Result<Option<Partner>> {
        self.update_partner(id, |partner| partner.status = status).await
    }
}

#[async_trait]
impl IntakeStore for MemoryStore {
    async fn create_inquiry(&self, inquiry: Inquiry) -> Result<Inquiry> {
        let mut tables = self.tables.write().await;
        if !tables.properties.contains_key(&inquiry.property_id) {
            return Err(StoreError::NotFound("Property"));
        }
        tables.inquiries.push(inquiry.clone());
        Ok(inquiry)
    }

    async fn list_inquiries(&self, filter: &InquiryFilter) -> Result<Vec<Inquiry>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.inquiries, |i| filter.matches(i)))
    }

    async fn set_inquiry_status(
        &self,
        id: Uuid,
        status: RequestStatus,
    ) -> Result<Option<Inquiry>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .inquiries
            .iter_mut()
            .find(|i| i.id == id)
            .map(|inquiry| {
                inquiry.status = status;
                inquiry.clone()
            }))
    }

    async fn create_legal_request(
        &self,
        request: LegalServiceRequest,
    ) -> Result<LegalServiceRequest> {
        self.tables.write().await.legal_requests.push(request.clone());
        Ok(request)
    }

    async fn list_legal_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<LegalServiceRequest>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.legal_requests, |r| {
            status_matches(status, r.status)
        }))
    }

    async fn create_moving_request(&self, request: MovingRequest) -> Result<MovingRequest> {
        self.tables.write().await.moving_requests.push(request.clone());
        Ok(request)
    }

    async fn list_moving_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<MovingRequest>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.moving_requests, |r| {
            status_matches(status, r.status)
        }))
    }

    async fn create_agreement(&self, agreement: Agreement) -> Result<Agreement> {
        self.tables.write().await.agreements.push(agreement.clone());
        Ok(agreement)
    }

    async fn get_agreement(&self, id: Uuid) -> Result<Option<Agreement>> {
        let tables = self.tables.read().await;
        Ok(tables.agreements.iter().find(|a| a.id == id).cloned())
    }

    async fn list_agreements(&self, status: Option<RequestStatus>) -> Result<Vec<Agreement>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.agreements, |a| {
            status_matches(status, a.status)
        }))
    }

    async fn create_transfer(&self, transfer: PropertyTransfer) -> Result<PropertyTransfer> {
        self.tables.write().await.transfers.push(transfer.clone());
        Ok(transfer)
    }

    async fn list_transfers(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<PropertyTransfer>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.transfers, |t| {
            status_matches(status, t.status)
        }))
    }
}

#[async_trait]
impl RateStore for MemoryStore {
    async fn list_rates(&self, state: Option<&str>) -> Result<Vec<CalculatorRate>> {
        let tables = self.tables.read().await;
        let mut rates: Vec<CalculatorRate> = tables
            .rates
            .iter()
            .filter(|r| state.map_or(true, |s| r.state.eq_ignore_ascii_case(s.trim())))
            .cloned()
            .collect();
        rates.sort_by(|a, b| {
            a.state
                .cmp(&b.state)
                .then_with(|| a.city.cmp(&b.city))
                .then_with(|| a.property_type.cmp(&b.property_type))
                .then_with(|| b.effective_from.cmp(&a.effective_from))
        });
        Ok(rates)
    }

    async fn insert_rates(&self, rates: Vec<NewRate>) -> Result<usize> {
        let mut tables = self.tables.write().await;
        let count = rates.len();
        tables
            .rates
            .extend(rates.into_iter().map(|r| r.into_rate(Uuid::new_v4())));
        Ok(count)
    }

    async fn count_rates(&self) -> Result<i64> {
        Ok(self.tables.read().await.rates.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListingDetails, PropertyStatus, PropertyType, RentDetails};
    use crate::store::filter::SearchParams;

    fn listing(title: &str, bedrooms: i32) -> NewProperty {
        NewProperty {
            title: title.into(),
            description: String::new(),
            property_type: PropertyType::Apartment,
            details: ListingDetails::Rent(RentDetails {
                monthly_rent: 20000.0,
                security_deposit: 60000.0,
                maintenance: None,
                available_from: None,
                preferred_tenants: None,
            }),
            price: 20000.0,
            area_sqft: 700.0,
            bedrooms,
            bathrooms: 1,
            address: "Aundh".into(),
            locality: "Aundh".into(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
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

    #[tokio::test]
    async fn search_pages_newest_first() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.create_property(listing(&format!("Flat {i}"), i)).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let filter = PropertyFilter::try_from(SearchParams {
            limit: Some(2),
            offset: Some(1),
            ..Default::default()
        })
        .unwrap();
        let page = store.search_properties(&filter).await.unwrap();
        let titles: Vec<&str> = page.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Flat 3", "Flat 2"]);
    }

    #[tokio::test]
    async fn invalid_update_leaves_the_listing_untouched() {
        let store = MemoryStore::new();
        let mut new = listing("Flat", 2);
        new.floor_number = Some(5);
        new.total_floors = Some(10);
        let created = store.create_property(new).await.unwrap();

        let patch = PropertyPatch {
            floor_number: Some(50),
            ..Default::default()
        };
        assert!(matches!(
            store.update_property(created.id, patch).await,
            Err(StoreError::Invalid(_))
        ));

        let stored = store.get_property(created.id).await.unwrap().unwrap();
        assert_eq!(stored.floor_number, Some(5));
    }

    #[tokio::test]
    async fn listing_partner_must_exist() {
        let store = MemoryStore::new();
        let mut new = listing("Flat", 2);
        new.partner_id = Some(Uuid::new_v4());
        assert!(matches!(
            store.create_property(new).await,
            Err(StoreError::NotFound("Partner"))
        ));

        let created = store.create_property(listing("Flat", 2)).await.unwrap();
        let patch = PropertyPatch {
            partner_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_property(created.id, patch).await,
            Err(StoreError::NotFound("Partner"))
        ));
    }

    #[tokio::test]
    async fn inquiry_needs_existing_property() {
        let store = MemoryStore::new();
        let inquiry = crate::models::NewInquiry {
            property_id: Uuid::new_v4(),
            contact: crate::models::Contact {
                name: "Tara".into(),
                email: "tara@example.in".into(),
                phone: "9876500000".into(),
            },
            message: None,
        }
        .into_inquiry(Utc::now());
        assert!(matches!(
            store.create_inquiry(inquiry).await,
            Err(StoreError::NotFound("Property"))
        ));
    }

    #[tokio::test]
    async fn partner_email_is_unique_ignoring_case() {
        let store = MemoryStore::new();
        let signup = crate::models::PartnerSignup {
            full_name: "Dev".into(),
            email: "dev@example.in".into(),
            phone: "9876500001".into(),
            password: "password1".into(),
            confirm_password: "password1".into(),
        };
        store
            .create_partner(Partner::new(&signup, "h".into(), Utc::now()))
            .await
            .unwrap();

        let shouty = crate::models::PartnerSignup {
            email: "DEV@example.in".into(),
            ..signup
        };
        let mut duplicate = Partner::new(&shouty, "h".into(), Utc::now());
        duplicate.email = shouty.email.clone();
        assert!(matches!(
            store.create_partner(duplicate).await,
            Err(StoreError::Conflict(_))
        ));
    }
}
