use async_trait::async_trait;
use uuid::Uuid;

use super::error::Result;
use super::filter::PropertyFilter;
use crate::models::{
    Agreement, BankDetails, CalculatorRate, Inquiry, InquiryFilter, LegalServiceRequest,
    MovingRequest, NewProperty, NewRate, NewSociety, Partner, PartnerStatus, Property,
    PropertyPatch, PropertyTransfer, RequestStatus, Society, WorkDetails,
};

/// Listings and their listing-type detail rows
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Inserts the property and its detail row together.
    async fn create_property(&self, property: NewProperty) -> Result<Property>;

    async fn get_property(&self, id: Uuid) -> Result<Option<Property>>;

    /// Newest first, paged by the filter's offset/limit.
    async fn search_properties(&self, filter: &PropertyFilter) -> Result<Vec<Property>>;

    /// `None` when no property has this id.
    async fn update_property(&self, id: Uuid, patch: PropertyPatch) -> Result<Option<Property>>;

    /// `false` when no property has this id.
    async fn delete_property(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait SocietyStore: Send + Sync {
    async fn create_society(&self, society: NewSociety) -> Result<Society>;

    async fn get_society(&self, id: Uuid) -> Result<Option<Society>>;

    /// Sorted by name; `city` is a case-insensitive substring match.
    async fn list_societies(&self, city: Option<&str>) -> Result<Vec<Society>>;

    async fn replace_society(&self, id: Uuid, society: NewSociety) -> Result<Option<Society>>;

    async fn delete_society(&self, id: Uuid) -> Result<bool>;

    async fn count_societies(&self) -> Result<i64>;
}

/// Broker accounts. Emails are unique regardless of case.
#[async_trait]
pub trait PartnerStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`](super::StoreError::Conflict) on a
    /// duplicate email.
    async fn create_partner(&self, partner: Partner) -> Result<Partner>;

    async fn get_partner(&self, id: Uuid) -> Result<Option<Partner>>;

    async fn find_partner_by_email(&self, email: &str) -> Result<Option<Partner>>;

    async fn list_partners(&self, status: Option<PartnerStatus>) -> Result<Vec<Partner>>;

    async fn save_work_details(&self, id: Uuid, details: WorkDetails) -> Result<Option<Partner>>;

    async fn save_documents(&self, id: Uuid, documents: Vec<String>) -> Result<Option<Partner>>;

    async fn save_bank_details(&self, id: Uuid, bank: BankDetails) -> Result<Option<Partner>>;

    async fn set_partner_status(&self, id: Uuid, status: PartnerStatus)
        -> Result<Option<Partner>>;
}

/// Write-once intake records
#[async_trait]
pub trait IntakeStore: Send + Sync {
    /// Fails with [`StoreError::NotFound`](super::StoreError::NotFound) when
    /// the referenced property does not exist.
    async fn create_inquiry(&self, inquiry: Inquiry) -> Result<Inquiry>;

    async fn list_inquiries(&self, filter: &InquiryFilter) -> Result<Vec<Inquiry>>;

    async fn set_inquiry_status(&self, id: Uuid, status: RequestStatus)
        -> Result<Option<Inquiry>>;

    async fn create_legal_request(
        &self,
        request: LegalServiceRequest,
    ) -> Result<LegalServiceRequest>;

    async fn list_legal_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<LegalServiceRequest>>;

    async fn create_moving_request(&self, request: MovingRequest) -> Result<MovingRequest>;

    async fn list_moving_requests(&self, status: Option<RequestStatus>)
        -> Result<Vec<MovingRequest>>;

    async fn create_agreement(&self, agreement: Agreement) -> Result<Agreement>;

    async fn get_agreement(&self, id: Uuid) -> Result<Option<Agreement>>;

    async fn list_agreements(&self, status: Option<RequestStatus>) -> Result<Vec<Agreement>>;

    async fn create_transfer(&self, transfer: PropertyTransfer) -> Result<PropertyTransfer>;

    async fn list_transfers(&self, status: Option<RequestStatus>)
        -> Result<Vec<PropertyTransfer>>;
}

/// Read-mostly calculator rate table
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Rates for `state` (all states when `None`), case-insensitive.
    async fn list_rates(&self, state: Option<&str>) -> Result<Vec<CalculatorRate>>;

    async fn insert_rates(&self, rates: Vec<NewRate>) -> Result<usize>;

    async fn count_rates(&self) -> Result<i64>;
}

/// Everything the HTTP layer needs from storage
pub trait MarketStore: PropertyStore + SocietyStore + PartnerStore + IntakeStore + RateStore {}

impl<T> MarketStore for T where T: PropertyStore + SocietyStore + PartnerStore + IntakeStore + RateStore
{}
